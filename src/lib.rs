// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(missing_docs)]

//! Finite state automata, possibly nondeterministic and with epsilon
//! transitions, together with the primitives of the powerset construction:
//! epsilon closures, reachable states per symbol, enumeration of the subsets
//! of states and state removal.
//!
//! # Examples
//!
//! ```
//! use nfa_dfa::fsa::core::*;
//! use nfa_dfa::dfa::core::DFA;
//!
//! let nfa = FSABuilder::new()
//!     .add_state("1")
//!     .add_state("2")
//!     .add_symbol("a")
//!     .add_start("1")
//!     .add_accept("2")
//!     .add_transition("a", "1", "2")
//!     .add_e_transition("2", "1")
//!     .finalize()
//!     .unwrap();
//! let closure = nfa.epsilon_closure_states(&State::new("2")).unwrap();
//! assert_eq!(closure, vec![State::new("1"), State::new("2")]);
//!
//! let dfa = DFA::from_fsa(&nfa).unwrap();
//! assert!(dfa.test(["a", "a"]).unwrap());
//! ```

/// fsa api
pub mod fsa;
/// dfa api
pub mod dfa;
/// helpers shared by the automata
pub mod util;
