use crate::Rational;
use smol_str::SmolStr;
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

/// A coefficient multiplied by a variable, or a bare constant when the
/// variable name is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    coefficient: Rational,
    variable: SmolStr,
}

impl Term {
    /// Create a new [`Term`]. Surrounding whitespace is trimmed from the
    /// variable's name, so a blank name makes this the constant term.
    pub fn new<S: AsRef<str>>(coefficient: Rational, variable: S) -> Self {
        Term {
            coefficient,
            variable: SmolStr::new(variable.as_ref().trim()),
        }
    }

    pub fn constant(value: Rational) -> Self {
        Term {
            coefficient: value,
            variable: SmolStr::new(""),
        }
    }

    pub fn coefficient(&self) -> Rational { self.coefficient }

    pub fn variable(&self) -> &str { &self.variable }

    pub(crate) fn variable_name(&self) -> &SmolStr { &self.variable }

    pub fn is_constant(&self) -> bool { self.variable.is_empty() }

    pub fn is_positive(&self) -> bool { self.coefficient.is_positive() }

    /// Get a copy of this term with a different coefficient.
    pub fn with_coefficient(&self, coefficient: Rational) -> Self {
        Term {
            coefficient,
            variable: self.variable.clone(),
        }
    }

    pub(crate) fn set_coefficient(&mut self, coefficient: Rational) {
        self.coefficient = coefficient;
    }
}

/// The natural ordering: by variable name, then by coefficient. The constant
/// has an empty name so it sorts before any variable.
impl Ord for Term {
    fn cmp(&self, other: &Term) -> Ordering {
        self.variable
            .as_str()
            .cmp(other.variable.as_str())
            .then_with(|| self.coefficient.compare(other.coefficient))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Term) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            write!(f, "{}", self.coefficient)
        } else if self.coefficient == Rational::ONE {
            write!(f, "{}", self.variable)
        } else if self.coefficient == -Rational::ONE {
            write!(f, "-{}", self.variable)
        } else {
            write!(f, "{} {}", self.coefficient, self.variable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(numerator: i64, denominator: i64) -> Rational {
        Rational::new(numerator, denominator).unwrap()
    }

    #[test]
    fn equality_is_structural() {
        assert_ne!(Term::new(r(1, 2), "x"), Term::new(r(1, 2), "y"));
        assert_ne!(Term::new(r(1, 2), "x"), Term::new(r(1, 3), "x"));
        assert_eq!(Term::new(r(1, 2), "x"), Term::new(r(2, 4), "x"));
    }

    #[test]
    fn blank_variables_are_constants() {
        for blank in &["", " ", "\t", "\r\n", " \t\n "] {
            let term = Term::new(Rational::ONE, blank);

            assert!(term.is_constant(), "{:?}", blank);
            assert_eq!(term, Term::constant(Rational::ONE));
        }

        assert_eq!(Term::new(Rational::ONE, " x ").variable(), "x");
    }

    #[test]
    fn natural_ordering() {
        let mut terms = vec![
            Term::new(r(i64::MAX, i64::MAX), "z"),
            Term::new(r(1, 2), "x"),
            Term::new(r(i64::MIN, i64::MIN), "y"),
            Term::constant(Rational::ZERO),
        ];

        terms.sort();

        let should_be = vec![
            Term::constant(Rational::ZERO),
            Term::new(r(1, 2), "x"),
            Term::new(Rational::ONE, "y"),
            Term::new(Rational::ONE, "z"),
        ];
        assert_eq!(terms, should_be);
    }

    #[test]
    fn same_variable_falls_back_to_the_coefficient() {
        let small = Term::new(r(-1, 2), "x");
        let big = Term::new(r(1, 2), "x");

        assert_eq!(small.cmp(&big), Ordering::Less);
        assert_eq!(big.cmp(&small), Ordering::Greater);
        assert_eq!(big.cmp(&big.clone()), Ordering::Equal);
    }

    #[test]
    fn display() {
        let inputs = vec![
            (Term::constant(r(-5, 2)), "-5/2"),
            (Term::constant(Rational::ZERO), "0"),
            (Term::new(Rational::ONE, "x"), "x"),
            (Term::new(-Rational::ONE, "x"), "-x"),
            (Term::new(r(2, 3), "x"), "2/3 x"),
            (Term::new(r(-4, 1), "я"), "-4 я"),
        ];

        for (term, should_be) in inputs {
            assert_eq!(term.to_string(), should_be);
        }
    }
}
