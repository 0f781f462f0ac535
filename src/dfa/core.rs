// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::iter;

use itertools::Itertools;
use log::{debug, trace};

use crate::fsa::core::{FSAError, Label, Result, State, Symbol, TransitionTable, FSA, SEPARATOR};

/// The type `DFA` represents a Deterministic Finite Automaton obtained from a
/// `FSA` by the powerset construction. Each state of the DFA is a set of
/// states of the source automaton, labelled by its sorted members joined with
/// `,` (`Ø` for the empty set).
///
/// Only the subsets reachable from the start state are built. They are listed
/// in the order of `FSA::powerset_of_states`. Every state has exactly one
/// destination per symbol of the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DFA {
    fsa: FSA,
}

fn subset_label(subset: &[State]) -> State {
    State::new(subset.iter().join(SEPARATOR))
}

impl DFA {
    /// Builds the DFA equivalent to `nfa`, walking the subsets of states
    /// reachable from the epsilon closure of its start state. The cost is
    /// bounded by the number of reachable subsets, which may still be
    /// exponential in the number of states.
    ///
    /// An automaton without a start state gives a DFA without any state.
    ///
    /// # Errors
    ///
    /// Return a FSAError::ReservedState if a state label of `nfa` is the empty
    /// set label or contains the set separator, since the labels of the subsets
    /// would be ambiguous.
    ///
    /// Return a FSAError::UnknownState if the start state or the transitions of
    /// `nfa` refer to a state it does not declare.
    ///
    /// # Examples
    ///
    /// ```
    /// use nfa_dfa::fsa::core::*;
    /// use nfa_dfa::dfa::core::DFA;
    ///
    /// // (a|ab)
    /// let nfa = FSABuilder::new()
    ///     .add_state("0")
    ///     .add_state("1")
    ///     .add_state("2")
    ///     .add_symbol("a")
    ///     .add_symbol("b")
    ///     .add_start("0")
    ///     .add_accept("1")
    ///     .add_accept("2")
    ///     .add_transition("a", "0", "1")
    ///     .add_transition("a", "0", "2")
    ///     .add_transition("b", "1", "2")
    ///     .finalize()
    ///     .unwrap();
    /// let dfa = DFA::from_fsa(&nfa).unwrap();
    /// assert!(dfa.test(["a"]).unwrap());
    /// assert!(dfa.test(["a", "b"]).unwrap());
    /// assert!(!dfa.test(["b"]).unwrap());
    /// ```
    pub fn from_fsa(nfa: &FSA) -> Result<DFA> {
        debug!("from_fsa(|states| = {}, |alphabet| = {})", nfa.states().len(), nfa.alphabet().len());
        if let Some(state) = nfa.states().iter().find(|state| state.is_reserved()) {
            return Err(FSAError::ReservedState(state.clone()));
        }
        let alphabet = nfa.alphabet().to_vec();
        let start = match nfa.start_state() {
            Some(start) => nfa.epsilon_closure_states(start)?,
            None => return Ok(DFA{fsa: FSA::new(vec![], alphabet, TransitionTable::new(), None, vec![])}),
        };

        // Subsets are keyed by the positions of their members, highest first,
        // which sorts them like the binary counting of the powerset.
        let positions: BTreeMap<&State, usize> = nfa.states()
            .iter()
            .enumerate()
            .map(|(i, state)| (state, i))
            .collect();
        let key = |subset: &[State]| -> Vec<usize> {
            subset.iter().filter_map(|state| positions.get(state).copied()).sorted().rev().collect()
        };

        let mut subsets: BTreeMap<Vec<usize>, Vec<State>> = BTreeMap::new();
        let mut transitions = TransitionTable::new();
        let mut queue = VecDeque::new();
        queue.push_back(start.clone());
        while let Some(subset) = queue.pop_front() {
            let subset_key = key(&subset);
            if subsets.contains_key(&subset_key) {
                continue;
            }
            let label = subset_label(&subset);
            let mut row = BTreeMap::new();
            for symbol in alphabet.iter() {
                let dest = nfa.reachable_states_from_set(&subset, symbol)?;
                trace!("from_fsa: ({},{}) => {}", symbol, label, subset_label(&dest));
                row.insert(Label::Symbol(symbol.clone()), Some(iter::once(subset_label(&dest)).collect()));
                queue.push_back(dest);
            }
            row.insert(Label::Epsilon, None);
            transitions.insert(label, row);
            subsets.insert(subset_key, subset);
        }
        debug!("from_fsa: {} reachable subsets", subsets.len());

        let states: Vec<State> = subsets.values().map(|subset| subset_label(subset)).collect();
        let accepts: Vec<State> = subsets
            .values()
            .filter(|subset| subset.iter().any(|state| nfa.accept_states().contains(state)))
            .map(|subset| subset_label(subset))
            .collect();
        let fsa = FSA::new(states, alphabet, transitions, Some(subset_label(&start)), accepts);
        Ok(DFA{fsa})
    }

    /// The DFA seen as a finite state automaton without epsilon transitions.
    pub fn as_fsa(&self) -> &FSA {
        &self.fsa
    }

    /// Consumes the DFA, returning the underlying automaton.
    pub fn into_fsa(self) -> FSA {
        self.fsa
    }

    /// Returns the state reached from `state` with `symbol`.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownState if `state` is not a state of the DFA.
    ///
    /// Return a FSAError::UnknownSymbol if `symbol` is not part of the alphabet.
    pub fn next(&self, state: &State, symbol: &Symbol) -> Result<State> {
        let dests = self.fsa.reachable_states(state, symbol)?;
        Ok(dests.into_iter().next().unwrap_or_else(State::empty_set))
    }

    /// Test if a word, given as a sequence of symbol labels, is accepted by the
    /// DFA.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownSymbol if a symbol of the word is not part of
    /// the alphabet.
    pub fn test<'a, I>(&self, word: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let word: Vec<Symbol> = word.into_iter().map(Symbol::new).collect();
        if let Some(symbol) = word.iter().find(|symbol| !self.fsa.alphabet().contains(*symbol)) {
            return Err(FSAError::UnknownSymbol(symbol.clone()));
        }
        let mut current = match self.fsa.start_state() {
            Some(start) => start.clone(),
            None => return Ok(false),
        };
        for symbol in word.iter() {
            current = self.next(&current, symbol)?;
        }
        Ok(self.fsa.accept_states().contains(&current))
    }
}

impl fmt::Display for DFA {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fsa)
    }
}
