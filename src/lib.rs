//! An exact solver for systems of linear equations.
//!
//! Equations are parsed from text, collected into a [`SystemOfEquations`],
//! then solved step by step using row reduction and back-substitution. All
//! arithmetic is done with exact fractions ([`Rational`]), so a solution is
//! either exact, parameterized in terms of free variables, or a proof that no
//! solution exists.
//!
//! ```rust
//! use linsolve::{Outcome, Rational, SystemOfEquations};
//!
//! let mut system =
//!     SystemOfEquations::from_equations(&["2x + 3y = 13", "x - y = -1"])?;
//!
//! match system.solve()? {
//!     Outcome::Solved(solution) => {
//!         assert_eq!(solution.value_of("x"), Some(Rational::from(2)));
//!         assert_eq!(solution.value_of("y"), Some(Rational::from(3)));
//!     },
//!     other => panic!("Unexpected outcome: {:?}", other),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod equations;
mod ordering;
mod parse;
mod rational;
mod solve;
mod term;

pub use equations::{DirectSolution, Equation, SystemOfEquations};
pub use ordering::{
    Alphabetical, Descending, OrderingPolicy, TermOrdering, VariablePriority,
};
pub use parse::{parse, ParseError};
pub use rational::{Rational, RationalError};
pub use solve::{
    Outcome, ReductionStep, Solution, SolveError, SubstitutionResult,
};
pub use term::Term;
