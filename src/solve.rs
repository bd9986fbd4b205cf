//! Gaussian-style elimination and back-substitution over a
//! [`SystemOfEquations`].

use crate::{
    DirectSolution, Equation, Rational, RationalError, SystemOfEquations, Term,
};
use smol_str::SmolStr;
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};
use thiserror::Error;

/// What happened during a round of
/// [`SystemOfEquations::substitute_equations()`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubstitutionResult {
    NoSubstitution,
    SubstitutionOccurred,
    /// The system can never be satisfied.
    Contradiction,
}

/// A single row operation performed by
/// [`SystemOfEquations::reduce_equation()`], equivalent to
/// `destination_row += coefficient * source_row`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReductionStep {
    pub source_row: usize,
    pub destination_row: usize,
    pub coefficient: Rational,
}

impl Display for ReductionStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} * p_{{{}}} + p_{{{}}}",
            self.coefficient, self.source_row, self.destination_row
        )
    }
}

/// The overall result of [`SystemOfEquations::solve()`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The equations contradict each other.
    Contradiction,
    /// Every unknown has exactly one value.
    Solved(Solution),
    /// There are infinitely many solutions. Some variables are expressed in
    /// terms of others, any variable not mentioned in the [`Solution`] is
    /// free.
    Parameterized(Solution),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Solution {
    pub known_values: BTreeMap<SmolStr, Rational>,
    /// Variables which depend on the value of other variables, e.g.
    /// `x = -2 y`.
    pub expressed: BTreeMap<SmolStr, Vec<Term>>,
}

impl Solution {
    pub fn value_of(&self, variable: &str) -> Option<Rational> {
        self.known_values.get(variable).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("Arithmetic failed while solving")]
    Arithmetic(#[from] RationalError),
}

/// Check every equation with a direct solution against the rest of the
/// system, plugging its value into every equation that isn't solved yet.
pub(crate) fn substitute_equations(
    equations: &mut [Equation],
) -> SubstitutionResult {
    let mut result = SubstitutionResult::NoSubstitution;

    for i in 0..equations.len() {
        if equations[i].is_invalid() {
            return SubstitutionResult::Contradiction;
        }

        let (variable, value) = match equations[i].solution() {
            Some(DirectSolution::Assignment { variable, value }) => {
                (variable, value)
            },
            _ => continue,
        };

        for j in 0..equations.len() {
            if i == j {
                continue;
            }

            let other = &mut equations[j];

            if other.is_invalid() {
                return SubstitutionResult::Contradiction;
            }

            match other.solution() {
                Some(DirectSolution::Assignment {
                    variable: other_variable,
                    value: other_value,
                }) => {
                    if other_variable == variable && other_value != value {
                        tracing::debug!(
                            target: "linsolve",
                            %variable,
                            first = %value,
                            second = %other_value,
                            "conflicting solutions"
                        );
                        return SubstitutionResult::Contradiction;
                    }
                },
                Some(DirectSolution::Trivial) => {},
                None => {
                    if other.substitute(&variable, value) {
                        tracing::trace!(
                            target: "linsolve",
                            %variable,
                            %value,
                            row = j,
                            equation = %other,
                            "substituted"
                        );
                        result = SubstitutionResult::SubstitutionOccurred;
                    }
                },
            }
        }
    }

    result
}

/// Do one step of Gaussian elimination, using the first pair of unsolved
/// equations which share a leading variable.
pub(crate) fn reduce_equation(
    equations: &mut [Equation],
) -> Result<Option<ReductionStep>, SolveError> {
    for i in 0..equations.len() {
        let source = match leading_term_if_unsolved(&equations[i]) {
            Some(term) => term.clone(),
            None => continue,
        };

        for j in i + 1..equations.len() {
            let destination = match leading_term_if_unsolved(&equations[j]) {
                Some(term) => term,
                None => continue,
            };

            if source.variable() != destination.variable() {
                continue;
            }

            let factor = -source
                .coefficient()
                .checked_div(destination.coefficient())?;
            let coefficient =
                factor.recip().ok_or(RationalError::DivisionByZero)?;

            let mut scaled = equations[i].clone();
            scaled.unscale(factor)?;

            let destination = &mut equations[j];
            destination.extend(scaled.terms().iter().cloned());
            destination.simplify();

            let step = ReductionStep {
                source_row: i,
                destination_row: j,
                coefficient,
            };
            tracing::debug!(
                target: "linsolve",
                %step,
                variable = source.variable(),
                result = %destination,
                "reduced"
            );

            return Ok(Some(step));
        }
    }

    Ok(None)
}

fn leading_term_if_unsolved(equation: &Equation) -> Option<&Term> {
    if equation.is_invalid() || equation.solution().is_some() {
        None
    } else {
        equation.leading_term()
    }
}

/// Alternate between reduction and substitution until neither makes any more
/// progress, returning `true` if a contradiction was found. Every reduction
/// is passed to `on_step` as it happens.
///
/// Substituting a value can give two equations the same leading variable, so
/// we keep going after the last reduction as long as substitution is still
/// changing things.
pub(crate) fn direct_solve<F>(
    equations: &mut [Equation],
    mut on_step: F,
) -> Result<bool, SolveError>
where
    F: FnMut(&ReductionStep),
{
    loop {
        let step = reduce_equation(equations)?;
        if let Some(ref step) = step {
            on_step(step);
        }

        let mut rounds = 0;
        let mut result = substitute_equations(equations);
        while result == SubstitutionResult::SubstitutionOccurred {
            rounds += 1;
            result = substitute_equations(equations);
        }

        if rounds > 0 {
            tracing::debug!(
                target: "linsolve",
                rounds,
                "substitution finished"
            );
        }

        if result == SubstitutionResult::Contradiction {
            return Ok(true);
        }
        if step.is_none() && rounds == 0 {
            return Ok(false);
        }
    }
}

pub(crate) fn solve<F>(
    system: &mut SystemOfEquations,
    on_step: F,
) -> Result<Outcome, SolveError>
where
    F: FnMut(&ReductionStep),
{
    let unknowns = system.unknowns();

    if direct_solve(&mut system.equations, on_step)? {
        return Ok(Outcome::Contradiction);
    }

    let mut solution = Solution::default();
    let mut complete = true;

    for equation in system.equations() {
        if equation.is_invalid() {
            return Ok(Outcome::Contradiction);
        }

        match equation.solution() {
            Some(DirectSolution::Assignment { variable, value }) => {
                solution.known_values.insert(variable, value);
            },
            Some(DirectSolution::Trivial) => {},
            None => {
                complete = false;

                if let Some(leading) = equation.leading_term() {
                    if let Some(expression) =
                        equation.express_variable(leading.variable())
                    {
                        let name = leading.variable_name().clone();
                        solution.expressed.insert(name, expression);
                    }
                }
            },
        }
    }

    let every_unknown_known = unknowns
        .iter()
        .all(|name| solution.known_values.contains_key(name));

    if complete && every_unknown_known {
        Ok(Outcome::Solved(solution))
    } else {
        Ok(Outcome::Parameterized(solution))
    }
}
