use crate::{
    parse, OrderingPolicy, Outcome, ParseError, Rational, RationalError,
    ReductionStep, SolveError, SubstitutionResult, Term,
};
use num_integer::Integer;
use smol_str::SmolStr;
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    iter::{Extend, FromIterator},
    str::FromStr,
};

/// A linear equation, stored as a sum of [`Term`]s which equals zero.
///
/// There is at most one term per variable (plus at most one constant), terms
/// with a zero coefficient are never kept, and the terms are always sorted
/// according to the equation's [`OrderingPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Equation {
    terms: Vec<Term>,
    ordering: OrderingPolicy,
}

/// What an equation tells you directly, without looking at the rest of the
/// system.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectSolution {
    /// Everything cancelled out (`0 = 0`).
    Trivial,
    /// `variable = value`.
    Assignment { variable: SmolStr, value: Rational },
}

impl Equation {
    pub fn new() -> Self { Equation::default() }

    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = Term>,
    {
        let mut equation = Equation::new();
        equation.extend(terms);
        equation
    }

    /// Use a different [`OrderingPolicy`], re-sorting the existing terms.
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.set_ordering(ordering);
        self
    }

    pub fn set_ordering(&mut self, ordering: OrderingPolicy) {
        self.ordering = ordering;
        self.ordering.sort(&mut self.terms);
    }

    pub fn ordering(&self) -> &OrderingPolicy { &self.ordering }

    pub fn terms(&self) -> &[Term] { &self.terms }

    /// The first term in canonical order.
    pub fn leading_term(&self) -> Option<&Term> { self.terms.first() }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// The constant term's coefficient (i.e. the negated right-hand side).
    pub fn constant(&self) -> Rational {
        self.terms
            .iter()
            .find(|t| t.is_constant())
            .map(Term::coefficient)
            .unwrap_or(Rational::ZERO)
    }

    pub fn coefficient_of(&self, variable: &str) -> Rational {
        self.position_of(variable)
            .map(|ix| self.terms[ix].coefficient())
            .unwrap_or(Rational::ZERO)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms
            .iter()
            .filter(|t| !t.is_constant())
            .map(Term::variable)
    }

    pub fn numerators(&self) -> impl Iterator<Item = i64> + '_ {
        self.terms.iter().map(|t| t.coefficient().numerator())
    }

    pub fn denominators(&self) -> impl Iterator<Item = i64> + '_ {
        self.terms.iter().map(|t| t.coefficient().denominator())
    }

    /// Does this equation say something impossible, like `5 = 0`?
    pub fn is_invalid(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].is_constant()
    }

    pub fn is_valid(&self) -> bool { !self.is_invalid() }

    fn position_of(&self, variable: &str) -> Option<usize> {
        let variable = variable.trim();
        self.terms.iter().position(|t| t.variable() == variable)
    }

    /// Add a term to the equation, merging it with any existing term for the
    /// same variable.
    pub fn add_term(&mut self, term: Term) {
        if term.coefficient().is_zero() {
            return;
        }

        match self.position_of(term.variable()) {
            Some(ix) => {
                let sum = self.terms[ix].coefficient() + term.coefficient();

                if sum.is_zero() {
                    self.terms.remove(ix);
                } else {
                    self.terms[ix].set_coefficient(sum);
                }
            },
            None => {
                self.terms.push(term);
                self.ordering.sort(&mut self.terms);
            },
        }
    }

    /// Multiply every term by `factor`.
    pub fn scale(&mut self, factor: Rational) -> Result<(), RationalError> {
        if factor.is_zero() {
            return Err(RationalError::DivisionByZero);
        }

        self.map_coefficients(|c| c * factor);
        Ok(())
    }

    /// Divide every term by `factor`.
    pub fn unscale(&mut self, factor: Rational) -> Result<(), RationalError> {
        let reciprocal = factor.recip().ok_or(RationalError::DivisionByZero)?;
        self.map_coefficients(|c| c * reciprocal);
        Ok(())
    }

    fn map_coefficients<F>(&mut self, mut func: F)
    where
        F: FnMut(Rational) -> Rational,
    {
        for term in &mut self.terms {
            let coefficient = func(term.coefficient());
            debug_assert!(!coefficient.is_zero());
            term.set_coefficient(coefficient);
        }
    }

    /// Rewrite the equation with whole, collectively co-prime coefficients
    /// where possible, by dividing through by the GCD of the numerators and
    /// multiplying through by the GCD of the denominators.
    pub fn simplify(&mut self) {
        if self.terms.is_empty() {
            return;
        }

        let numerator_gcd = self.numerators().fold(0, |acc, n| acc.gcd(&n));
        let denominator_gcd =
            self.denominators().fold(0, |acc, d| acc.gcd(&d));

        // terms never have a zero coefficient, so the numerator GCD is at
        // least 1
        let factor = match Rational::new(denominator_gcd, numerator_gcd) {
            Ok(factor) => factor,
            Err(_) => unreachable!(
                "Internal invariant violated: \"{}\" has a zero coefficient",
                self
            ),
        };

        if factor != Rational::ONE {
            self.map_coefficients(|c| c * factor);
        }
    }

    /// Replace `variable` with a known `value`, folding it into the constant
    /// term. Returns `false` if the variable doesn't appear in this equation.
    pub fn substitute(&mut self, variable: &str, value: Rational) -> bool {
        match self.position_of(variable) {
            Some(ix) => {
                let term = self.terms.remove(ix);
                self.add_term(Term::constant(term.coefficient() * value));
                self.simplify();
                true
            },
            None => false,
        }
    }

    /// Check whether this equation solves for a variable by itself.
    ///
    /// # Panics
    ///
    /// It's a bug to ask for the solution of an equation that
    /// [`Equation::is_invalid()`], that case needs to be handled first.
    pub fn solution(&self) -> Option<DirectSolution> {
        assert!(
            !self.is_invalid(),
            "Internal invariant violated: \"{}\" is a contradiction and has \
             no solution",
            self
        );

        let variables: Vec<&Term> =
            self.terms.iter().filter(|t| !t.is_constant()).collect();

        match (self.terms.len(), variables.as_slice()) {
            (0, _) => Some(DirectSolution::Trivial),
            // e.g. "1/2 x = 0"
            (1, [term]) => Some(DirectSolution::Assignment {
                variable: term.variable_name().clone(),
                value: Rational::ZERO,
            }),
            // e.g. "1/2 x + 2 = 0"
            (2, [term]) => {
                let value = (-self.constant())
                    .checked_div(term.coefficient())
                    .ok()?;

                Some(DirectSolution::Assignment {
                    variable: term.variable_name().clone(),
                    value,
                })
            },
            // no constant or too many variables, the solution is parameterized
            _ => None,
        }
    }

    /// Like [`Equation::solution()`], except contradictions are treated as
    /// "no solution".
    pub fn has_solution(&self) -> bool {
        self.is_valid() && self.solution().is_some()
    }

    /// Isolate `variable`, returning the terms on the other side of the
    /// equals sign (e.g. `a = -5/3 b + 2`). Returns `None` if the variable
    /// doesn't appear in this equation.
    pub fn express_variable(&self, variable: &str) -> Option<Vec<Term>> {
        let ix = self.position_of(variable)?;
        let factor = -self.terms[ix].coefficient().recip()?;

        let expressed = self
            .terms
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ix)
            .map(|(_, t)| t.with_coefficient(t.coefficient() * factor))
            .collect();

        Some(expressed)
    }
}

impl PartialEq for Equation {
    fn eq(&self, other: &Equation) -> bool { self.terms == other.terms }
}

impl Eq for Equation {}

/// Equations are compared term by term using the natural [`Term`] order. If
/// one equation runs out of terms first it is the smaller one.
impl Ord for Equation {
    fn cmp(&self, other: &Equation) -> Ordering {
        for (left, right) in self.terms.iter().zip(&other.terms) {
            match left.cmp(right) {
                Ordering::Equal => continue,
                other => return other,
            }
        }

        self.terms.len().cmp(&other.terms.len())
    }
}

impl PartialOrd for Equation {
    fn partial_cmp(&self, other: &Equation) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Extend<Term> for Equation {
    fn extend<T: IntoIterator<Item = Term>>(&mut self, iter: T) {
        for term in iter {
            self.add_term(term);
        }
    }
}

impl FromIterator<Term> for Equation {
    fn from_iter<T: IntoIterator<Item = Term>>(iter: T) -> Self {
        Equation::from_terms(iter)
    }
}

impl FromStr for Equation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return Ok(());
        }
        if self.is_invalid() {
            return write!(f, "{} = 0", self.terms[0].coefficient().abs());
        }

        let mut first = true;

        for term in self.terms.iter().filter(|t| !t.is_constant()) {
            if first {
                write!(f, "{}", term)?;
                first = false;
            } else if term.is_positive() {
                write!(f, " + {}", term)?;
            } else {
                let flipped = term.with_coefficient(-term.coefficient());
                write!(f, " - {}", flipped)?;
            }
        }

        // the constant moves over to the right hand side
        write!(f, " = {}", -self.constant())
    }
}

/// A builder for constructing a system of equations and solving them.
#[derive(Debug, Default, Clone)]
pub struct SystemOfEquations {
    pub(crate) equations: Vec<Equation>,
    ordering: OrderingPolicy,
}

impl SystemOfEquations {
    pub fn new() -> Self { SystemOfEquations::default() }

    pub fn with(mut self, equation: Equation) -> Self {
        self.push(equation);
        self
    }

    /// Add another equation to the system. This should only be done before
    /// solving starts.
    pub fn push(&mut self, mut equation: Equation) {
        equation.set_ordering(self.ordering.clone());
        self.equations.push(equation);
    }

    pub fn from_equations<E, S>(equations: E) -> Result<Self, ParseError>
    where
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut system = SystemOfEquations::new();

        for equation in equations {
            system.push(equation.as_ref().parse()?);
        }

        Ok(system)
    }

    pub fn equations(&self) -> &[Equation] { &self.equations }

    pub fn len(&self) -> usize { self.equations.len() }

    pub fn is_empty(&self) -> bool { self.equations.is_empty() }

    pub fn ordering(&self) -> &OrderingPolicy { &self.ordering }

    /// Switch to another [`OrderingPolicy`], applying it to every equation.
    pub fn set_ordering(&mut self, ordering: OrderingPolicy) {
        for equation in &mut self.equations {
            equation.set_ordering(ordering.clone());
        }
        self.ordering = ordering;
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.set_ordering(ordering);
        self
    }

    /// Every variable mentioned by the system, in alphabetical order.
    pub fn unknowns(&self) -> Vec<SmolStr> {
        let mut unknowns: Vec<_> = self
            .equations
            .iter()
            .flat_map(|eq| eq.terms())
            .filter(|t| !t.is_constant())
            .map(|t| t.variable_name().clone())
            .collect();
        unknowns.sort();
        unknowns.dedup();

        unknowns
    }

    pub fn num_unknowns(&self) -> usize { self.unknowns().len() }

    /// Plug every directly solved variable into the rest of the system.
    pub fn substitute_equations(&mut self) -> SubstitutionResult {
        crate::solve::substitute_equations(&mut self.equations)
    }

    /// Do a single row reduction, returning `None` when there is nothing left
    /// to reduce.
    pub fn reduce_equation(
        &mut self,
    ) -> Result<Option<ReductionStep>, SolveError> {
        crate::solve::reduce_equation(&mut self.equations)
    }

    /// Reduce and substitute until the system stops changing. Returns `true`
    /// if the system contains a contradiction.
    pub fn direct_solve(&mut self) -> Result<bool, SolveError> {
        crate::solve::direct_solve(&mut self.equations, |_| {})
    }

    /// Solve the system, leaving the equations in their fully reduced form.
    pub fn solve(&mut self) -> Result<Outcome, SolveError> {
        crate::solve::solve(self, |_| {})
    }

    /// Like [`SystemOfEquations::solve()`], except every row reduction is
    /// passed to `on_step` in the order it is performed.
    pub fn solve_with<F>(&mut self, on_step: F) -> Result<Outcome, SolveError>
    where
        F: FnMut(&ReductionStep),
    {
        crate::solve::solve(self, on_step)
    }

    /// Put the equations in canonical order, greatest first. This is only
    /// cosmetic and should be done before solving, because the solving steps
    /// refer to equations by index.
    pub fn sort_equations(&mut self) {
        self.equations.sort_by(|left, right| right.cmp(left));
    }
}

impl PartialEq for SystemOfEquations {
    fn eq(&self, other: &SystemOfEquations) -> bool {
        self.equations == other.equations
    }
}

impl Extend<Equation> for SystemOfEquations {
    fn extend<T: IntoIterator<Item = Equation>>(&mut self, iter: T) {
        for equation in iter {
            self.push(equation);
        }
    }
}

impl FromIterator<Equation> for SystemOfEquations {
    fn from_iter<T: IntoIterator<Item = Equation>>(iter: T) -> Self {
        let mut system = SystemOfEquations::new();
        system.extend(iter);
        system
    }
}

impl<'a> IntoIterator for &'a SystemOfEquations {
    type IntoIter = <&'a [Equation] as IntoIterator>::IntoIter;
    type Item = &'a Equation;

    fn into_iter(self) -> Self::IntoIter { self.equations.iter() }
}

impl IntoIterator for SystemOfEquations {
    type IntoIter = <Vec<Equation> as IntoIterator>::IntoIter;
    type Item = Equation;

    fn into_iter(self) -> Self::IntoIter { self.equations.into_iter() }
}

impl Display for SystemOfEquations {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, equation) in self.equations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", equation)?;
        }

        Ok(())
    }
}
