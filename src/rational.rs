//! Exact fractions.

use num_integer::Integer;
use std::{
    cmp::Ordering,
    convert::TryFrom,
    fmt::{self, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
};
use thiserror::Error;

/// An exact fraction with a 64-bit numerator and denominator.
///
/// Values are always stored in lowest terms with the sign carried by the
/// numerator. Zero has exactly one representation, `0/0`, which is also what
/// a "not set yet" coefficient looks like. Always use [`Rational::is_zero()`]
/// to check for it instead of poking at the denominator.
///
/// # Panics
///
/// Intermediate results are calculated using 128-bit integers, but any
/// arithmetic whose *reduced* result doesn't fit back into an `i64` will
/// panic. Overflow is considered a bug in the caller, not something to
/// recover from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

/// Things that can go wrong when doing arithmetic with a [`Rational`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum RationalError {
    #[error("Attempted to divide by zero")]
    DivisionByZero,
}

impl Rational {
    pub const ONE: Rational = Rational {
        numerator: 1,
        denominator: 1,
    };
    pub const ZERO: Rational = Rational {
        numerator: 0,
        denominator: 0,
    };

    /// Create a new [`Rational`], reducing it to lowest terms.
    ///
    /// `0/0` is accepted and gives you [`Rational::ZERO`], any other fraction
    /// with a zero denominator is an error.
    pub fn new(
        numerator: i64,
        denominator: i64,
    ) -> Result<Self, RationalError> {
        if denominator == 0 {
            if numerator == 0 {
                Ok(Rational::ZERO)
            } else {
                Err(RationalError::DivisionByZero)
            }
        } else {
            Ok(Rational::reduce(
                i128::from(numerator),
                i128::from(denominator),
            ))
        }
    }

    pub const fn integer(value: i64) -> Self {
        Rational {
            numerator: value,
            denominator: if value == 0 { 0 } else { 1 },
        }
    }

    /// Normalise a fraction whose denominator is known to be non-zero.
    fn reduce(numerator: i128, denominator: i128) -> Self {
        debug_assert_ne!(denominator, 0, "Callers must check the denominator");

        if numerator == 0 {
            return Rational::ZERO;
        }

        let gcd = numerator.gcd(&denominator);
        let mut numerator = numerator / gcd;
        let mut denominator = denominator / gcd;

        if denominator < 0 {
            numerator = -numerator;
            denominator = -denominator;
        }

        Rational {
            numerator: narrow(numerator),
            denominator: narrow(denominator),
        }
    }

    pub fn numerator(self) -> i64 { self.numerator }

    pub fn denominator(self) -> i64 { self.denominator }

    /// Is this the (unique) zero value?
    pub fn is_zero(self) -> bool { self.denominator == 0 }

    pub fn is_positive(self) -> bool { self.numerator > 0 }

    pub fn is_negative(self) -> bool { self.numerator < 0 }

    /// Does this fraction represent a whole number? Zero counts.
    pub fn is_integer(self) -> bool { self.denominator <= 1 }

    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    /// Get `1/self`, or `None` if this is zero.
    pub fn recip(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Rational::reduce(
                i128::from(self.denominator),
                i128::from(self.numerator),
            ))
        }
    }

    /// Divide by another [`Rational`].
    ///
    /// Dividing zero by zero is allowed and gives zero, dividing anything else
    /// by zero is an error.
    pub fn checked_div(self, divisor: Rational) -> Result<Self, RationalError> {
        match divisor.recip() {
            Some(reciprocal) => Ok(self * reciprocal),
            None if self.is_zero() => Ok(Rational::ZERO),
            None => Err(RationalError::DivisionByZero),
        }
    }

    /// Compare two fractions exactly by bringing them over a common
    /// denominator.
    pub fn compare(self, other: Rational) -> Ordering {
        let (left_numerator, left_denominator) = self.widened();
        let (right_numerator, right_denominator) = other.widened();

        let lcm = left_denominator.lcm(&right_denominator);
        let left = left_numerator * (lcm / left_denominator);
        let right = right_numerator * (lcm / right_denominator);

        left.cmp(&right)
    }

    /// An approximation of this fraction, only useful for display and numeric
    /// sanity checks.
    pub fn to_f64(self) -> f64 {
        if self.is_zero() {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }

    /// The numerator and denominator as 128-bit integers, with zero given a
    /// denominator of `1` so it can take part in cross-multiplication.
    fn widened(self) -> (i128, i128) {
        if self.is_zero() {
            (0, 1)
        } else {
            (i128::from(self.numerator), i128::from(self.denominator))
        }
    }
}

fn narrow(value: i128) -> i64 {
    i64::try_from(value).unwrap_or_else(|_| {
        panic!("Rational overflow: {} doesn't fit in 64 bits", value)
    })
}

impl Default for Rational {
    fn default() -> Self { Rational::ZERO }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self { Rational::integer(value) }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        // 0/0 would poison the cross-multiplication
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }

        let (a, b) = self.widened();
        let (c, d) = rhs.widened();

        Rational::reduce(a * d + c * b, b * d)
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational { self + -rhs }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        if self.is_zero() || rhs.is_zero() {
            return Rational::ZERO;
        }

        let (a, b) = self.widened();
        let (c, d) = rhs.widened();

        Rational::reduce(a * c, b * d)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numerator: narrow(-i128::from(self.numerator)),
            denominator: self.denominator,
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Rational) -> Ordering { self.compare(*other) }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "0")
        } else if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn r(numerator: i64, denominator: i64) -> Rational {
        Rational::new(numerator, denominator).unwrap()
    }

    #[test]
    fn construction_reduces_to_lowest_terms() {
        let inputs = vec![
            ((0, 0), (0, 0)),
            ((0, 18), (0, 0)),
            ((0, -1237), (0, 0)),
            ((1, 2), (1, 2)),
            ((-1, -2), (1, 2)),
            ((2, 8), (1, 4)),
            ((18, 3), (6, 1)),
            ((-21, 7), (-3, 1)),
            ((-12, -6), (2, 1)),
            ((99, -9), (-11, 1)),
            ((i64::MAX, i64::MAX), (1, 1)),
            ((i64::MIN, i64::MIN), (1, 1)),
        ];

        for ((numerator, denominator), (n, d)) in inputs {
            let got = r(numerator, denominator);

            assert_eq!(
                (got.numerator(), got.denominator()),
                (n, d),
                "{}/{}",
                numerator,
                denominator
            );
        }
    }

    #[test]
    fn non_zero_over_zero_is_an_error() {
        assert_eq!(Rational::new(5, 0), Err(RationalError::DivisionByZero));
        assert_eq!(Rational::new(-12, 0), Err(RationalError::DivisionByZero));
        assert_eq!(Rational::new(0, 0), Ok(Rational::ZERO));
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!(r(7, 6) + r(5, 6), r(2, 1));
        assert_eq!(r(1, 2) + r(5, 6), r(4, 3));
        assert_eq!(r(3, 7) + r(8, 3), r(65, 21));
        assert_eq!(r(1, 2) - r(2, 1), -r(3, 2));
        assert_eq!(r(7, 7) - r(3, 3), Rational::ZERO);
        assert_eq!(r(3, 9) * r(4, 7), r(12, 63));
        assert_eq!(r(5, 9).checked_div(r(9, 3)), Ok(r(15, 81)));
    }

    #[test]
    fn operations_with_one() {
        let one = Rational::ONE;

        assert_eq!(one * r(5, 3), r(5, 3));
        assert_eq!(one.checked_div(r(5, 3)), Ok(r(3, 5)));
        assert_eq!(one + r(5, 3), r(8, 3));
        assert_eq!(one - r(5, 3), -r(2, 3));
    }

    #[test]
    fn operations_with_zero() {
        let zero = Rational::ZERO;
        let one = Rational::ONE;

        assert_eq!(one * zero, zero);
        assert_eq!(r(i64::MAX, i64::MAX) * zero, zero);
        assert_eq!(one + zero, one);
        assert_eq!(zero + one, one);
        assert_eq!(one - zero, one);
        assert_eq!(zero - one, -one);
        assert_eq!(zero - zero, zero);
        assert_eq!(zero - zero - one, r(1, -1));
        assert_eq!(zero.checked_div(r(3, 4)), Ok(zero));
    }

    #[test]
    fn dividing_by_zero() {
        assert_eq!(
            r(1, 2).checked_div(Rational::ZERO),
            Err(RationalError::DivisionByZero)
        );
        assert_eq!(
            Rational::ONE.checked_div(Rational::ZERO),
            Err(RationalError::DivisionByZero)
        );
        // the odd one out, kept for compatibility
        assert_eq!(
            Rational::ZERO.checked_div(Rational::ZERO),
            Ok(Rational::ZERO)
        );
    }

    #[test]
    fn comparisons() {
        let negative = r(-6, 9);
        let positive = r(6, 9);

        assert_eq!(negative.compare(positive), Ordering::Less);
        assert!(negative < positive);
        assert!(negative <= positive);
        assert!(!(negative > positive));

        let flipped = negative * -Rational::ONE;
        assert_eq!(flipped.compare(positive), Ordering::Equal);
        assert_eq!(flipped, positive);

        assert!(Rational::ZERO < r(1, 1_000_000));
        assert!(Rational::ZERO > r(-1, 1_000_000));
        assert_eq!(Rational::ZERO.compare(Rational::ZERO), Ordering::Equal);
        assert!(r(i64::MAX, 3) > r(i64::MAX - 1, 3));
    }

    #[test]
    fn predicates() {
        assert!(r(1, 2).is_positive());
        assert!(!Rational::ZERO.is_positive());
        assert!(r(-1, 2).is_negative());
        assert!(r(4, 2).is_integer());
        assert!(Rational::ZERO.is_integer());
        assert!(!r(1, 2).is_integer());
        assert_eq!(r(-3, 4).abs(), r(3, 4));
        assert_eq!(r(-3, 4).recip(), Some(r(-4, 3)));
        assert_eq!(Rational::ZERO.recip(), None);
    }

    #[test]
    fn display() {
        let inputs = vec![
            (Rational::ZERO, "0"),
            (r(5, 1), "5"),
            (r(-5, 1), "-5"),
            (r(1, 2), "1/2"),
            (r(2, -6), "-1/3"),
        ];

        for (value, should_be) in inputs {
            assert_eq!(value.to_string(), should_be);
        }
    }

    #[test]
    #[should_panic(expected = "Rational overflow")]
    fn overflow_is_a_bug() { let _ = r(i64::MAX, 1) + r(i64::MAX, 1); }

    fn any_rational() -> impl Strategy<Value = Rational> {
        (-10_000_i64..10_000, 1_i64..10_000).prop_map(|(n, d)| r(n, d))
    }

    proptest! {
        #[test]
        fn always_normalised(
            n in -1_000_000_i64..1_000_000,
            d in 1_i64..1_000_000,
        ) {
            let value = r(n, d);

            if value.is_zero() {
                prop_assert_eq!(value.numerator(), 0);
            } else {
                prop_assert!(value.denominator() > 0);
                prop_assert_eq!(value.numerator().gcd(&value.denominator()), 1);
            }
        }

        #[test]
        fn scaling_both_parts_gives_the_same_value(
            n in -10_000_i64..10_000,
            d in 1_i64..10_000,
            k in prop_oneof![-1_000_i64..-1, 1_i64..1_000],
        ) {
            prop_assert_eq!(r(n, d), r(k * n, k * d));
        }

        #[test]
        fn zero_is_the_additive_identity(x in any_rational()) {
            prop_assert_eq!(Rational::ZERO + x, x);
            prop_assert_eq!(x + Rational::ZERO, x);
            prop_assert_eq!(x - Rational::ZERO, x);
        }

        #[test]
        fn operands_are_left_untouched(
            a in any_rational(),
            b in any_rational(),
        ) {
            let (a_before, b_before) = (a, b);

            let _ = a + b;
            let _ = a - b;
            let _ = a * b;
            let _ = a.checked_div(b);

            prop_assert_eq!(a, a_before);
            prop_assert_eq!(b, b_before);
        }

        #[test]
        fn division_undoes_multiplication(
            a in any_rational(),
            b in any_rational(),
        ) {
            prop_assume!(!b.is_zero());

            prop_assert_eq!((a * b).checked_div(b), Ok(a));
        }

        #[test]
        fn compare_agrees_with_subtraction(
            a in any_rational(),
            b in any_rational(),
        ) {
            let difference = a - b;
            let expected = if difference.is_zero() {
                Ordering::Equal
            } else if difference.is_positive() {
                Ordering::Greater
            } else {
                Ordering::Less
            };

            prop_assert_eq!(a.compare(b), expected);
        }
    }
}
