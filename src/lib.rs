//! # Unilog
//!
//! A minimal logic programming engine: Prolog-style unification with
//! automatic chronological backtracking, embedded as a library.
//!
//! Programs are built directly from goal combinators; there is no
//! surface syntax. A goal is a lazy recipe for a stream of solutions,
//! and the driver pulls that stream, snapshotting the named query
//! variables at every yield. Search is depth-first and left-to-right,
//! and every binding made along a failed or abandoned branch is undone
//! through a trail of recorded bindings.
//!
//! ## Example
//!
//! ```rust
//! use unilog::{and, eq, member, run_all, Term, Var};
//!
//! let x = Var::named("X");
//! let y = Var::named("Y");
//!
//! // Pairs from [1,2,3] x [1,2,3] where both sides are equal.
//! let goal = and(vec![
//!     member(x.clone(), Term::seq([1, 2, 3])),
//!     member(y.clone(), Term::seq([1, 2, 3])),
//!     eq(x.clone(), y.clone()),
//! ]);
//!
//! let solutions = run_all(goal, &[("x", x), ("y", y)]).unwrap();
//! assert_eq!(solutions.len(), 3);
//! assert_eq!(solutions[0].get("x"), Some(&Term::from(1)));
//! ```

#![warn(missing_docs)]

/// Terms: host values, logic variables, sequences.
pub mod term;

/// The binding store: trail-based bind/rollback and unification.
pub mod store;

/// Solution streams, goals, and the AND/OR combinators.
pub mod solve;

/// Built-in predicates: lists, arithmetic, comparisons, ranges.
pub mod predicates;

/// The query driver: `run` and friends.
pub mod query;

pub use predicates::{
    append, between, findall, gt, gte, last, length, lt, lte, member, minus, nth, plus,
    reverse, succ, times,
};
pub use query::{run, run_all, run_one, Solution, Solutions};
pub use solve::{and, eq, fail, or, succeed, Error, Goal, Step, Stream};
pub use store::Store;
pub use term::{Term, Value, Var};
