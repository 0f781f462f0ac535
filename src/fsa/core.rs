// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::{BTreeMap, BTreeSet};
use std::error;
use std::fmt; // Formatter, format!, Display, Debug, write!
use std::iter;
use std::result;

use itertools::Itertools;
use log::{debug, trace};

use crate::util::remove_duplicates;

/// Label of the epsilon transitions. It can not be part of an alphabet.
pub const EPSILON: &str = "ε";

/// Label standing for the empty set of states.
pub const EMPTY_SET: &str = "Ø";

/// Separator of the members of a set of states in the label of that set. It
/// can not be part of a state label.
pub const SEPARATOR: &str = ",";

/// The `FSAError` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FSAError {
    /// The state is not a state of the automaton.
    UnknownState(State),
    /// The symbol is not part of the alphabet of the automaton.
    UnknownSymbol(Symbol),
    /// The symbol is reserved (epsilon) and can not be added to an alphabet.
    ReservedSymbol(Symbol),
    /// The state label is reserved (empty set, or containing the set
    /// separator) and can not name a state.
    ReservedState(State),
}

impl fmt::Display for FSAError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FSAError::UnknownState(ref state) => write!(f, "Unknown state '{}'.", state),
            FSAError::UnknownSymbol(ref symb) => write!(f, "Unknown symbol '{}'.", symb),
            FSAError::ReservedSymbol(ref symb) => write!(f, "Reserved symbol '{}'.", symb),
            FSAError::ReservedState(ref state) => write!(f, "Reserved state '{}'.", state),
        }
    }
}

impl error::Error for FSAError {}

/// Alias for result::Result<T,FSAError>.
pub type Result<T> = result::Result<T, FSAError>;

/// A state of an automaton, identified by its label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(String);

impl State {
    /// Creates a state labelled `label`.
    pub fn new<S: Into<String>>(label: S) -> State {
        State(label.into())
    }

    /// The state standing for the empty set of states.
    pub fn empty_set() -> State {
        State::new(EMPTY_SET)
    }

    /// Whether this is the empty set sentinel.
    pub fn is_empty_set(&self) -> bool {
        self.0 == EMPTY_SET
    }

    /// Whether the label can not name a state of a `FSA`: it is the empty set
    /// sentinel or it contains the set separator.
    pub fn is_reserved(&self) -> bool {
        self.is_empty_set() || self.0.contains(SEPARATOR)
    }

    /// The label of the state.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> From<&'a str> for State {
    fn from(label: &'a str) -> State {
        State::new(label)
    }
}

impl From<String> for State {
    fn from(label: String) -> State {
        State(label)
    }
}

/// A symbol of an alphabet, identified by its label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol labelled `label`.
    pub fn new<S: Into<String>>(label: S) -> Symbol {
        Symbol(label.into())
    }

    /// The label of the symbol.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> From<&'a str> for Symbol {
    fn from(label: &'a str) -> Symbol {
        Symbol::new(label)
    }
}

/// The label of a transition: either a symbol of the alphabet or epsilon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// A transition consuming `Symbol`.
    Symbol(Symbol),
    /// A transition consuming nothing.
    Epsilon,
}

impl<'a> From<&'a str> for Label {
    fn from(label: &'a str) -> Label {
        if label == EPSILON {
            Label::Epsilon
        } else {
            Label::Symbol(Symbol::new(label))
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Label::Symbol(ref symb) => write!(f, "{}", symb),
            Label::Epsilon => f.write_str(EPSILON),
        }
    }
}

/// Destinations of the transitions leaving one state with one label. `None`
/// means there is no such transition.
pub type Destinations = Option<BTreeSet<State>>;

/// The transition relation: source state, then label, then destinations.
pub type TransitionTable = BTreeMap<State, BTreeMap<Label, Destinations>>;

/// The type `FSA` represents a finite state automaton, possibly nondeterministic
/// and possibly with epsilon transitions.
///
/// Once built, the only way to change an `FSA` is `remove_state`, which keeps
/// the start state, the accepting states and the transitions consistent with
/// the remaining states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FSA {
    states        : Vec<State>,
    alphabet      : Vec<Symbol>,
    transitions   : TransitionTable,
    start_state   : Option<State>,
    accept_states : Vec<State>,
}

/// Returns the empty set sentinel in place of an empty list of states.
fn or_empty_set(states: Vec<State>) -> Vec<State> {
    if states.is_empty() {
        vec![State::empty_set()]
    } else {
        states
    }
}

impl FSA {
    /// Creates an automaton from its full definition. The definition is
    /// trusted: invalid states or symbols are reported by the operations that
    /// query them. Use `FSABuilder` to get a validated automaton.
    pub fn new(states: Vec<State>,
               alphabet: Vec<Symbol>,
               transitions: TransitionTable,
               start_state: Option<State>,
               accept_states: Vec<State>) -> FSA {
        FSA{states, alphabet, transitions, start_state, accept_states}
    }

    /// The states, in their insertion order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The alphabet, in its insertion order.
    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    /// The transition relation.
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// The start state, if any.
    pub fn start_state(&self) -> Option<&State> {
        self.start_state.as_ref()
    }

    /// The accepting states.
    pub fn accept_states(&self) -> &[State] {
        &self.accept_states
    }

    fn check_state(&self, state: &State) -> Result<()> {
        if self.states.contains(state) {
            Ok(())
        } else {
            Err(FSAError::UnknownState(state.clone()))
        }
    }

    fn check_symbol(&self, symbol: &Symbol) -> Result<()> {
        if self.alphabet.contains(symbol) {
            Ok(())
        } else {
            Err(FSAError::UnknownSymbol(symbol.clone()))
        }
    }

    fn destinations<'a>(&'a self, state: &State, label: &Label) -> impl Iterator<Item = &'a State> + 'a {
        self.transitions
            .get(state)
            .and_then(|row| row.get(label))
            .and_then(|dests| dests.as_ref())
            .into_iter()
            .flatten()
    }

    // Smallest superset of `seeds` closed under the epsilon transitions. Every
    // state met on the way must be declared.
    fn closure<I: IntoIterator<Item = State>>(&self, seeds: I) -> Result<BTreeSet<State>> {
        let mut closure = BTreeSet::new();
        for seed in seeds {
            self.check_state(&seed)?;
            closure.insert(seed);
        }
        loop {
            let added: Vec<State> = closure
                .iter()
                .flat_map(|state| self.destinations(state, &Label::Epsilon))
                .filter(|dest| !closure.contains(*dest))
                .cloned()
                .collect();
            if added.is_empty() {
                return Ok(closure);
            }
            for state in added.iter() {
                self.check_state(state)?;
            }
            trace!("closure: adding {:?}", added);
            closure.extend(added);
        }
    }

    /// Enumerates every subset of the states. Subset `k` holds the `i`-th
    /// state iff the bit `i` of `k` is set, so the first subset is the empty
    /// set (`["Ø"]`) and the last one holds every state. Each subset is sorted.
    ///
    /// # Panics
    ///
    /// Panics if the automaton has at least as many states as a `usize` has
    /// bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use nfa_dfa::fsa::core::*;
    ///
    /// let fsa = FSABuilder::new()
    ///     .add_state("1")
    ///     .add_state("2")
    ///     .finalize()
    ///     .unwrap();
    /// let powerset: Vec<Vec<String>> = fsa
    ///     .powerset_of_states()
    ///     .iter()
    ///     .map(|subset| subset.iter().map(|s| s.to_string()).collect())
    ///     .collect();
    /// assert_eq!(powerset, vec![vec!["Ø"], vec!["1"], vec!["2"], vec!["1", "2"]]);
    /// ```
    pub fn powerset_of_states(&self) -> Vec<Vec<State>> {
        debug!("powerset_of_states(|states| = {})", self.states.len());
        (0..1usize << self.states.len())
            .map(|k| {
                let subset = self.states
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| k & (1 << i) != 0)
                    .map(|(_, state)| state.clone());
                or_empty_set(remove_duplicates(subset))
            })
            .collect()
    }

    /// Returns the states reachable from `state` through epsilon transitions
    /// only, `state` included, sorted.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownState if `state`, or a state its epsilon
    /// transitions lead to, is not a state of the automaton.
    pub fn epsilon_closure_states(&self, state: &State) -> Result<Vec<State>> {
        debug!("epsilon_closure_states(state = {})", state);
        self.check_state(state)?;
        Ok(self.closure(iter::once(state.clone()))?.into_iter().collect())
    }

    /// Returns the states reached by following the `symbol` transitions
    /// leaving `state`, closed under epsilon transitions, sorted. The result is
    /// `["Ø"]` when no state is reached.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownState if `state`, or a state its transitions
    /// lead to, is not a state of the automaton.
    ///
    /// Return a FSAError::UnknownSymbol if `symbol` is not part of the alphabet.
    pub fn reachable_states(&self, state: &State, symbol: &Symbol) -> Result<Vec<State>> {
        debug!("reachable_states(state = {}, symbol = {})", state, symbol);
        self.check_state(state)?;
        self.check_symbol(symbol)?;
        let label = Label::Symbol(symbol.clone());
        let targets: Vec<State> = self.destinations(state, &label).cloned().collect();
        Ok(or_empty_set(self.closure(targets)?.into_iter().collect()))
    }

    /// Union of `reachable_states` over `states`. The empty set sentinel is
    /// ignored as a member of `states`. The result is `["Ø"]` when no state is
    /// reached.
    ///
    /// # Errors
    ///
    /// Same as `reachable_states`, for any of the states.
    pub fn reachable_states_from_set(&self, states: &[State], symbol: &Symbol) -> Result<Vec<State>> {
        debug!("reachable_states_from_set(states = {:?}, symbol = {})", states, symbol);
        self.check_symbol(symbol)?;
        let mut reached = Vec::new();
        for state in states.iter().filter(|state| !state.is_empty_set()) {
            let targets = self.reachable_states(state, symbol)?;
            reached.extend(targets.into_iter().filter(|target| !target.is_empty_set()));
        }
        Ok(or_empty_set(remove_duplicates(reached)))
    }

    /// Removes `state` from the automaton, together with its transitions, the
    /// transitions leading to it, its accepting status and its start status.
    /// Removing a state that does not exist does nothing.
    pub fn remove_state(&mut self, state: &State) {
        if !self.states.contains(state) {
            debug!("remove_state(state = {}): absent", state);
            return;
        }
        debug!("remove_state(state = {})", state);
        self.states.retain(|s| s != state);
        self.accept_states.retain(|s| s != state);
        if self.start_state.as_ref() == Some(state) {
            self.start_state = None;
        }
        self.transitions.remove(state);
        for row in self.transitions.values_mut() {
            for dests in row.values_mut() {
                let emptied = dests.as_mut().map_or(false, |set| {
                    set.remove(state);
                    set.is_empty()
                });
                if emptied {
                    *dests = None;
                }
            }
        }
    }

    /// Test if a word, given as a sequence of symbol labels, is accepted by the
    /// automaton. An automaton without a start state accepts no word.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownSymbol if a symbol of the word is not part of
    /// the alphabet.
    ///
    /// Return a FSAError::UnknownState if the start state, or a state the
    /// transitions lead to, is not a state of the automaton. This only happens
    /// with an automaton created by `FSA::new`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nfa_dfa::fsa::core::*;
    ///
    /// // a*b
    /// let fsa = FSABuilder::new()
    ///     .add_state("0")
    ///     .add_state("1")
    ///     .add_symbol("a")
    ///     .add_symbol("b")
    ///     .add_start("0")
    ///     .add_accept("1")
    ///     .add_transition("a", "0", "0")
    ///     .add_transition("b", "0", "1")
    ///     .finalize()
    ///     .unwrap();
    /// assert!(fsa.test(["a", "a", "b"]).unwrap());
    /// assert!(!fsa.test(["b", "a"]).unwrap());
    /// assert!(fsa.test(["c"]).is_err());
    /// ```
    pub fn test<'a, I>(&self, word: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let word: Vec<Symbol> = word.into_iter().map(Symbol::new).collect();
        for symbol in &word {
            self.check_symbol(symbol)?;
        }
        let start = match self.start_state {
            Some(ref start) => start,
            None => return Ok(false),
        };
        let mut current = self.epsilon_closure_states(start)?;
        for symbol in &word {
            current = self.reachable_states_from_set(&current, symbol)?;
        }
        Ok(current.iter().any(|state| self.accept_states.contains(state)))
    }
}

impl fmt::Display for FSA {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.start_state {
            Some(ref start) => writeln!(f, "START: {}", start)?,
            None => writeln!(f, "START: -")?,
        }
        writeln!(f, "STATES: {}", self.states.iter().join(" "))?;
        writeln!(f, "ALPHABET: {}", self.alphabet.iter().join(" "))?;
        writeln!(f, "FINALS:")?;
        for fi in self.accept_states.iter() {
            writeln!(f, "  {}", fi)?;
        }
        writeln!(f, "TRANSITIONS:")?;
        for (src, row) in self.transitions.iter() {
            for (label, dests) in row.iter() {
                if let Some(ref dests) = *dests {
                    writeln!(f, "  ({},{}) => {{{}}}", label, src, dests.iter().join(","))?;
                }
            }
        }
        Ok(())
    }
}

/// The `FSABuilder` follows the builder pattern and allows to create a finite
/// state automaton whose definition is checked. The builder is moved at each
/// call so it is necessary to bind to a new variable the return value for each
/// function of the builder.
///
/// # Errors
///
/// Return an error if a transition, the start state or an accepting state
/// refers to an undeclared state or symbol.
///
/// # Examples
///
/// ```
/// use nfa_dfa::fsa::core::*;
///
/// let fsa = FSABuilder::new()
///     .add_state("1")
///     .add_state("2")
///     .add_symbol("a")
///     .add_start("1")
///     .add_accept("2")
///     .add_transition("a", "1", "2")
///     .add_e_transition("2", "1")
///     .finalize();
/// assert!(fsa.is_ok());
/// ```
///
/// ```
/// use nfa_dfa::fsa::core::*;
///
/// let fsa = FSABuilder::new()
///     .add_state("1")
///     .add_transition("a", "1", "1")
///     .finalize();
/// match fsa {
///     Err(FSAError::UnknownSymbol(symb)) => assert_eq!(symb.as_str(), "a"),
///     _ => panic!("UnknownSymbol expected."),
/// }
/// ```
#[derive(Debug, Default)]
pub struct FSABuilder {
    states        : Vec<State>,
    alphabet      : Vec<Symbol>,
    transitions   : TransitionTable,
    start_state   : Option<State>,
    accept_states : Vec<State>,
}

/// FSABuilding is the trait associated to the FSABuilder type.
///
/// # Errors
///
/// If self contains a FSAError then each function should transfer this error.
pub trait FSABuilding {
    /// Add a state to the FSA. Adding a state twice does nothing.
    ///
    /// # Errors
    ///
    /// Return a FSAError::ReservedState if `state` is the empty set label or
    /// contains the set separator.
    fn add_state(self, state: &str) -> Result<FSABuilder>;

    /// Add a symbol to the alphabet. Adding a symbol twice does nothing.
    ///
    /// # Errors
    ///
    /// Return a FSAError::ReservedSymbol if `symb` is the epsilon label.
    fn add_symbol(self, symb: &str) -> Result<FSABuilder>;

    /// Add a transition to the FSA.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownSymbol or a FSAError::UnknownState if the
    /// symbol or one of the states has not been added.
    fn add_transition(self, symb: &str, src: &str, dest: &str) -> Result<FSABuilder>;

    /// Add an epsilon transition to the FSA.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownState if one of the states has not been added.
    fn add_e_transition(self, src: &str, dest: &str) -> Result<FSABuilder>;

    /// Set the start state of the FSA.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownState if the state has not been added.
    fn add_start(self, state: &str) -> Result<FSABuilder>;

    /// Add an accepting state to the FSA.
    ///
    /// # Errors
    ///
    /// Return a FSAError::UnknownState if the state has not been added.
    fn add_accept(self, state: &str) -> Result<FSABuilder>;

    /// Finalize the building of the FSA.
    fn finalize(self) -> Result<FSA>;
}

impl FSABuilder {
    /// Creates a new FSABuilder.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Result<FSABuilder> {
        Ok(FSABuilder::default())
    }

    fn known_state(&self, state: &str) -> Result<State> {
        let state = State::new(state);
        if self.states.contains(&state) {
            Ok(state)
        } else {
            Err(FSAError::UnknownState(state))
        }
    }

    fn insert(&mut self, label: Label, src: State, dest: State) {
        self.transitions
            .entry(src)
            .or_default()
            .entry(label)
            .or_insert(None)
            .get_or_insert_with(BTreeSet::new)
            .insert(dest);
    }
}

impl FSABuilding for FSABuilder {
    fn add_state(self, state: &str) -> Result<FSABuilder> {
        Ok(self).add_state(state)
    }

    fn add_symbol(self, symb: &str) -> Result<FSABuilder> {
        Ok(self).add_symbol(symb)
    }

    fn add_transition(self, symb: &str, src: &str, dest: &str) -> Result<FSABuilder> {
        Ok(self).add_transition(symb, src, dest)
    }

    fn add_e_transition(self, src: &str, dest: &str) -> Result<FSABuilder> {
        Ok(self).add_e_transition(src, dest)
    }

    fn add_start(self, state: &str) -> Result<FSABuilder> {
        Ok(self).add_start(state)
    }

    fn add_accept(self, state: &str) -> Result<FSABuilder> {
        Ok(self).add_accept(state)
    }

    fn finalize(self) -> Result<FSA> {
        Ok(self).finalize()
    }
}

/// Implementing FSABuilding trait for Result<FSABuilder> allows
/// to chain the return value of the FSABuilder instead of unwrapping them
/// at each stage of the building process.
impl FSABuilding for Result<FSABuilder> {
    fn add_state(self, state: &str) -> Result<FSABuilder> {
        self.and_then(|mut fsa| {
            let state = State::new(state);
            if state.is_reserved() {
                return Err(FSAError::ReservedState(state));
            }
            if !fsa.states.contains(&state) {
                fsa.states.push(state);
            }
            Ok(fsa)
        })
    }

    fn add_symbol(self, symb: &str) -> Result<FSABuilder> {
        self.and_then(|mut fsa| {
            let symb = Symbol::new(symb);
            if symb.as_str() == EPSILON {
                return Err(FSAError::ReservedSymbol(symb));
            }
            if !fsa.alphabet.contains(&symb) {
                fsa.alphabet.push(symb);
            }
            Ok(fsa)
        })
    }

    fn add_transition(self, symb: &str, src: &str, dest: &str) -> Result<FSABuilder> {
        self.and_then(|mut fsa| {
            let symb = Symbol::new(symb);
            if !fsa.alphabet.contains(&symb) {
                return Err(FSAError::UnknownSymbol(symb));
            }
            let src = fsa.known_state(src)?;
            let dest = fsa.known_state(dest)?;
            fsa.insert(Label::Symbol(symb), src, dest);
            Ok(fsa)
        })
    }

    fn add_e_transition(self, src: &str, dest: &str) -> Result<FSABuilder> {
        self.and_then(|mut fsa| {
            let src = fsa.known_state(src)?;
            let dest = fsa.known_state(dest)?;
            fsa.insert(Label::Epsilon, src, dest);
            Ok(fsa)
        })
    }

    fn add_start(self, state: &str) -> Result<FSABuilder> {
        self.and_then(|mut fsa| {
            fsa.start_state = Some(fsa.known_state(state)?);
            Ok(fsa)
        })
    }

    fn add_accept(self, state: &str) -> Result<FSABuilder> {
        self.and_then(|mut fsa| {
            let state = fsa.known_state(state)?;
            if !fsa.accept_states.contains(&state) {
                fsa.accept_states.push(state);
            }
            Ok(fsa)
        })
    }

    fn finalize(self) -> Result<FSA> {
        self.map(|mut fsa| {
            // Every state gets a row listing every label, absent transitions as None.
            let labels: Vec<Label> = fsa.alphabet
                .iter()
                .cloned()
                .map(Label::Symbol)
                .chain(iter::once(Label::Epsilon))
                .collect();
            for state in fsa.states.iter() {
                let row = fsa.transitions.entry(state.clone()).or_default();
                for label in labels.iter() {
                    row.entry(label.clone()).or_insert(None);
                }
            }
            FSA::new(fsa.states, fsa.alphabet, fsa.transitions, fsa.start_state, fsa.accept_states)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn labels(states: &[State]) -> Vec<&str> {
        states.iter().map(State::as_str).collect()
    }

    fn state(label: &str) -> State {
        State::new(label)
    }

    fn symbol(label: &str) -> Symbol {
        Symbol::new(label)
    }

    // Builds a transition table from (src, label, dests) rows, `dests` being
    // space separated. An empty `dests` stands for an absent transition.
    fn table(rows: &[(&str, &str, &str)]) -> TransitionTable {
        let mut table = TransitionTable::new();
        for &(src, label, dests) in rows {
            let dests = if dests.is_empty() {
                None
            } else {
                Some(dests.split_whitespace().map(state).collect())
            };
            table.entry(state(src)).or_default().insert(Label::from(label), dests);
        }
        table
    }

    fn fsa1() -> FSA {
        FSA::new(
            vec![state("1"), state("2"), state("3")],
            vec![symbol("a"), symbol("b")],
            table(&[
                ("1", "a", ""),
                ("1", "b", "2"),
                ("1", "ε", "3"),
                ("2", "a", "2 3"),
                ("2", "b", "3"),
                ("2", "ε", ""),
                ("3", "a", "1"),
                ("3", "b", ""),
                ("3", "ε", "2"),
            ]),
            Some(state("1")),
            vec![state("1")],
        )
    }

    fn fsa2() -> FSA {
        FSABuilder::new()
            .add_state("q1")
            .add_state("q2")
            .add_state("q3")
            .add_symbol("0")
            .add_symbol("1")
            .add_transition("0", "q1", "q3")
            .add_transition("1", "q1", "q2")
            .add_transition("1", "q1", "q3")
            .add_transition("0", "q2", "q2")
            .add_transition("1", "q2", "q2")
            .add_e_transition("q2", "q3")
            .add_transition("0", "q3", "q2")
            .add_transition("1", "q3", "q1")
            .add_transition("1", "q3", "q2")
            .add_start("q1")
            .add_accept("q1")
            .add_accept("q3")
            .finalize()
            .unwrap()
    }

    fn assert_no_reference(fsa: &FSA, removed: &State) {
        assert!(!fsa.transitions().contains_key(removed));
        for row in fsa.transitions().values() {
            for dests in row.values() {
                if let Some(dests) = dests {
                    assert!(!dests.contains(removed), "{} still referenced", removed);
                    assert!(!dests.is_empty(), "empty destination set left behind");
                }
            }
        }
    }

    #[test]
    fn test_powerset() {
        let powerset = fsa1().powerset_of_states();
        let powerset: Vec<Vec<&str>> = powerset.iter().map(|subset| labels(subset)).collect();
        assert_eq!(powerset, vec![
            vec!["Ø"],
            vec!["1"],
            vec!["2"],
            vec!["1", "2"],
            vec!["3"],
            vec!["1", "3"],
            vec!["2", "3"],
            vec!["1", "2", "3"],
        ]);
    }

    #[test]
    fn test_powerset_size() {
        for fsa in [fsa1(), fsa2()] {
            let powerset = fsa.powerset_of_states();
            assert_eq!(powerset.len(), 1 << fsa.states().len());
            assert_eq!(labels(&powerset[0]), vec!["Ø"]);
            assert_eq!(powerset[powerset.len() - 1], remove_duplicates(fsa.states().to_vec()));
        }
    }

    #[test]
    fn test_powerset_sorts_subsets() {
        let fsa = FSA::new(vec![state("b"), state("a")], vec![], TransitionTable::new(), None, vec![]);
        let powerset = fsa.powerset_of_states();
        let powerset: Vec<Vec<&str>> = powerset.iter().map(|subset| labels(subset)).collect();
        assert_eq!(powerset, vec![vec!["Ø"], vec!["b"], vec!["a"], vec!["a", "b"]]);
    }

    #[test]
    fn test_powerset_without_states() {
        let fsa = FSABuilder::new().finalize().unwrap();
        let powerset = fsa.powerset_of_states();
        assert_eq!(powerset.len(), 1);
        assert_eq!(labels(&powerset[0]), vec!["Ø"]);
    }

    #[test]
    fn test_epsilon_closure() {
        let fsa = fsa1();
        assert_eq!(labels(&fsa.epsilon_closure_states(&state("1")).unwrap()), vec!["1", "2", "3"]);
        assert_eq!(labels(&fsa.epsilon_closure_states(&state("2")).unwrap()), vec!["2"]);
        assert_eq!(labels(&fsa.epsilon_closure_states(&state("3")).unwrap()), vec!["2", "3"]);

        let fsa = fsa2();
        assert_eq!(labels(&fsa.epsilon_closure_states(&state("q1")).unwrap()), vec!["q1"]);
        assert_eq!(labels(&fsa.epsilon_closure_states(&state("q2")).unwrap()), vec!["q2", "q3"]);
        assert_eq!(labels(&fsa.epsilon_closure_states(&state("q3")).unwrap()), vec!["q3"]);
    }

    #[test]
    fn test_epsilon_closure_is_fixpoint() {
        for fsa in [fsa1(), fsa2()] {
            for s in fsa.states() {
                let closure = fsa.epsilon_closure_states(s).unwrap();
                assert!(closure.contains(s));
                for t in closure.iter() {
                    let inner = fsa.epsilon_closure_states(t).unwrap();
                    assert!(inner.iter().all(|u| closure.contains(u)));
                }
            }
        }
    }

    #[test]
    fn test_epsilon_closure_long_chain() {
        let fsa = FSABuilder::new()
            .add_state("0")
            .add_state("1")
            .add_state("2")
            .add_state("3")
            .add_e_transition("0", "1")
            .add_e_transition("1", "2")
            .add_e_transition("2", "3")
            .add_e_transition("3", "0")
            .finalize()
            .unwrap();
        assert_eq!(labels(&fsa.epsilon_closure_states(&state("2")).unwrap()), vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn test_reachable_states() {
        let fsa = fsa1();
        let reachable = |s: &str, a: &str| fsa.reachable_states(&state(s), &symbol(a)).unwrap();
        assert_eq!(labels(&reachable("1", "a")), vec!["Ø"]);
        assert_eq!(labels(&reachable("1", "b")), vec!["2"]);
        assert_eq!(labels(&reachable("2", "a")), vec!["2", "3"]);
        assert_eq!(labels(&reachable("2", "b")), vec!["2", "3"]);
        assert_eq!(labels(&reachable("3", "a")), vec!["1", "2", "3"]);
        assert_eq!(labels(&reachable("3", "b")), vec!["Ø"]);
    }

    #[test]
    fn test_reachable_states_fsa2() {
        let fsa = fsa2();
        let reachable = |s: &str, a: &str| fsa.reachable_states(&state(s), &symbol(a)).unwrap();
        assert_eq!(labels(&reachable("q1", "0")), vec!["q3"]);
        assert_eq!(labels(&reachable("q1", "1")), vec!["q2", "q3"]);
        assert_eq!(labels(&reachable("q2", "0")), vec!["q2", "q3"]);
        assert_eq!(labels(&reachable("q2", "1")), vec!["q2", "q3"]);
        assert_eq!(labels(&reachable("q3", "0")), vec!["q2", "q3"]);
        assert_eq!(labels(&reachable("q3", "1")), vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_reachable_states_never_empty() {
        for fsa in [fsa1(), fsa2()] {
            for s in fsa.states() {
                for a in fsa.alphabet() {
                    assert!(!fsa.reachable_states(s, a).unwrap().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_reachable_states_from_set() {
        let fsa = fsa1();
        let from = |states: &[&str], a: &str| {
            let states: Vec<State> = states.iter().map(|&s| state(s)).collect();
            fsa.reachable_states_from_set(&states, &symbol(a)).unwrap()
        };
        assert_eq!(labels(&from(&["1", "2", "3"], "a")), vec!["1", "2", "3"]);
        assert_eq!(labels(&from(&["1", "2", "3"], "b")), vec!["2", "3"]);
        assert_eq!(labels(&from(&["Ø"], "a")), vec!["Ø"]);
        assert_eq!(labels(&from(&[], "b")), vec!["Ø"]);
        assert_eq!(
            fsa.reachable_states_from_set(&[], &symbol("z")),
            Err(FSAError::UnknownSymbol(symbol("z")))
        );
    }

    #[test]
    fn test_remove_state() {
        let mut fsa = fsa1();
        fsa.remove_state(&state("1"));
        assert_eq!(labels(fsa.states()), vec!["2", "3"]);
        assert!(fsa.start_state().is_none());
        assert!(fsa.accept_states().is_empty());
        assert_eq!(labels(&fsa.reachable_states(&state("3"), &symbol("a")).unwrap()), vec!["Ø"]);
        assert_no_reference(&fsa, &state("1"));
    }

    #[test]
    fn test_remove_state_fsa2() {
        let mut fsa = fsa2();
        fsa.remove_state(&state("q1"));
        assert_eq!(labels(fsa.states()), vec!["q2", "q3"]);
        assert!(fsa.start_state().is_none());
        assert_eq!(labels(fsa.accept_states()), vec!["q3"]);
        assert_eq!(labels(&fsa.reachable_states(&state("q3"), &symbol("1")).unwrap()), vec!["q2", "q3"]);
        assert_no_reference(&fsa, &state("q1"));
    }

    #[test]
    fn test_remove_state_keeps_start() {
        let mut fsa = fsa2();
        fsa.remove_state(&state("q3"));
        assert_eq!(fsa.start_state(), Some(&state("q1")));
        assert_eq!(labels(fsa.accept_states()), vec!["q1"]);
        assert_eq!(labels(&fsa.reachable_states(&state("q1"), &symbol("0")).unwrap()), vec!["Ø"]);
        assert_eq!(labels(&fsa.reachable_states(&state("q1"), &symbol("1")).unwrap()), vec!["q2"]);
        assert_no_reference(&fsa, &state("q3"));
    }

    #[test]
    fn test_remove_state_idempotent() {
        let mut fsa = fsa1();
        fsa.remove_state(&state("2"));
        let once = fsa.clone();
        fsa.remove_state(&state("2"));
        assert_eq!(fsa, once);
        fsa.remove_state(&state("4"));
        assert_eq!(fsa, once);
    }

    #[test]
    fn test_unknown_state() {
        let fsa = fsa1();
        assert_eq!(fsa.epsilon_closure_states(&state("4")), Err(FSAError::UnknownState(state("4"))));
        assert_eq!(fsa.reachable_states(&state("4"), &symbol("a")), Err(FSAError::UnknownState(state("4"))));
    }

    #[test]
    fn test_unknown_symbol() {
        let fsa = fsa1();
        assert_eq!(fsa.reachable_states(&state("2"), &symbol("z")), Err(FSAError::UnknownSymbol(symbol("z"))));
        assert_eq!(fsa.reachable_states(&state("2"), &symbol(EPSILON)), Err(FSAError::UnknownSymbol(symbol(EPSILON))));
    }

    #[test]
    fn test_unknown_after_removal() {
        let mut fsa = fsa2();
        fsa.remove_state(&state("q1"));
        assert_eq!(fsa.epsilon_closure_states(&state("q1")), Err(FSAError::UnknownState(state("q1"))));
        assert_eq!(fsa.reachable_states(&state("q4"), &symbol("0")), Err(FSAError::UnknownState(state("q4"))));
        assert_eq!(fsa.reachable_states(&state("q2"), &symbol("2")), Err(FSAError::UnknownSymbol(symbol("2"))));
    }

    fn fsa_with_undeclared_destinations() -> FSA {
        FSA::new(
            vec![state("0"), state("1")],
            vec![symbol("a")],
            table(&[
                ("0", "a", "9"),
                ("0", "ε", "8"),
                ("1", "a", "0"),
                ("1", "ε", "0"),
            ]),
            Some(state("7")),
            vec![],
        )
    }

    #[test]
    fn test_unknown_destination() {
        let fsa = fsa_with_undeclared_destinations();
        assert_eq!(fsa.reachable_states(&state("0"), &symbol("a")), Err(FSAError::UnknownState(state("9"))));
        assert_eq!(fsa.epsilon_closure_states(&state("0")), Err(FSAError::UnknownState(state("8"))));
        // Reached through a declared state first.
        assert_eq!(fsa.epsilon_closure_states(&state("1")), Err(FSAError::UnknownState(state("8"))));
        assert_eq!(fsa.reachable_states(&state("1"), &symbol("a")), Err(FSAError::UnknownState(state("8"))));
    }

    #[test]
    fn test_fsa_unknown_start() {
        let fsa = fsa_with_undeclared_destinations();
        assert_eq!(fsa.test(["a"]), Err(FSAError::UnknownState(state("7"))));
        assert_eq!(fsa.test(["b"]), Err(FSAError::UnknownSymbol(symbol("b"))));
    }

    #[test]
    fn test_fsa() {
        let fsa = fsa1();
        let samples: Vec<(Vec<&str>, bool)> = vec![
            (vec![], true),
            (vec!["a"], true),
            (vec!["b"], false),
            (vec!["b", "a"], true),
            (vec!["b", "b", "b"], false),
        ];
        for (word, expected_result) in samples {
            assert!(fsa.test(word.iter().copied()).unwrap() == expected_result, "input false for: {:?}", word);
        }
        assert_eq!(fsa.test(["a", "c"]), Err(FSAError::UnknownSymbol(symbol("c"))));
    }

    #[test]
    fn test_fsa_without_start() {
        let mut fsa = fsa1();
        fsa.remove_state(&state("1"));
        assert!(!fsa.test(["a"]).unwrap());
        assert!(fsa.test(["z"]).is_err());
    }

    #[test]
    fn test_fsa_builder_rows() {
        let fsa = fsa2();
        let row = &fsa.transitions()[&state("q1")];
        assert_eq!(row.len(), 3);
        assert_eq!(row[&Label::Epsilon], None);
        assert_eq!(row[&Label::from("0")], Some(iter::once(state("q3")).collect::<BTreeSet<_>>()));
    }

    #[test]
    fn test_fsa_builder_duplicates() {
        let fsa = FSABuilder::new()
            .add_state("1")
            .add_state("1")
            .add_symbol("a")
            .add_symbol("a")
            .add_accept("1")
            .add_accept("1")
            .finalize()
            .unwrap();
        assert_eq!(labels(fsa.states()), vec!["1"]);
        assert_eq!(fsa.alphabet().len(), 1);
        assert_eq!(labels(fsa.accept_states()), vec!["1"]);
    }

    #[test]
    fn test_fsa_builder_reserved() {
        let fsa = FSABuilder::new().add_symbol("ε").finalize();
        assert_eq!(fsa, Err(FSAError::ReservedSymbol(symbol("ε"))));
        let fsa = FSABuilder::new().add_state("Ø").finalize();
        assert_eq!(fsa, Err(FSAError::ReservedState(state("Ø"))));
        let fsa = FSABuilder::new().add_state("1").add_state("1,2").finalize();
        assert_eq!(fsa, Err(FSAError::ReservedState(state("1,2"))));
    }

    #[test]
    fn test_fsa_builder_unknown_state() {
        let fsa = FSABuilder::new()
            .add_state("1")
            .add_symbol("a")
            .add_transition("a", "1", "2")
            .finalize();
        assert_eq!(fsa, Err(FSAError::UnknownState(state("2"))));
        let fsa = FSABuilder::new().add_start("1").finalize();
        assert_eq!(fsa, Err(FSAError::UnknownState(state("1"))));
        let fsa = FSABuilder::new().add_state("1").add_e_transition("0", "1").finalize();
        assert_eq!(fsa, Err(FSAError::UnknownState(state("0"))));
    }

    #[test]
    fn test_fsa_builder_first_error_wins() {
        let fsa = FSABuilder::new()
            .add_start("x")
            .add_symbol("ε")
            .finalize();
        assert_eq!(fsa, Err(FSAError::UnknownState(state("x"))));
    }

    #[test]
    fn test_display() {
        let mut fsa = fsa1();
        let text = fsa.to_string();
        assert!(text.starts_with("START: 1\n"));
        assert!(text.contains("  (ε,1) => {3}\n"));
        assert!(text.contains("  (a,2) => {2,3}\n"));
        fsa.remove_state(&state("1"));
        assert!(fsa.to_string().starts_with("START: -\n"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(FSAError::UnknownState(state("4")).to_string(), "Unknown state '4'.");
        assert_eq!(FSAError::UnknownSymbol(symbol("z")).to_string(), "Unknown symbol 'z'.");
    }
}
