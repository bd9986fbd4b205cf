//! Strategies for deciding which order an [`Equation`]'s terms are kept in.
//!
//! The order never changes *what* a system solves to, but it decides which
//! variable leads each equation. That in turn decides which rows get reduced
//! against each other and how the final equations read.
//!
//! [`Equation`]: crate::Equation

use crate::Term;
use smol_str::SmolStr;
use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Something which can compare two [`Term`]s.
///
/// Terms which compare as [`Ordering::Less`] are placed first. Implementations
/// only need to worry about variable terms, the constant term is always moved
/// to the end by [`OrderingPolicy`] before an implementation is consulted.
pub trait TermOrdering: Debug {
    fn compare(&self, left: &Term, right: &Term) -> Ordering;
}

/// The default order, the natural [`Term`] order reversed (`z`, `y`, `x`).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Descending;

impl TermOrdering for Descending {
    fn compare(&self, left: &Term, right: &Term) -> Ordering {
        right.cmp(left)
    }
}

/// Variables in alphabetical order (`x`, `y`, `z`).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Alphabetical;

impl TermOrdering for Alphabetical {
    fn compare(&self, left: &Term, right: &Term) -> Ordering { left.cmp(right) }
}

/// Place variables with a higher priority first.
///
/// Variables without a priority come after every variable that has one, in
/// [`Descending`] order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VariablePriority {
    priorities: HashMap<SmolStr, i64>,
}

impl VariablePriority {
    pub fn new<I, S>(priorities: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        VariablePriority {
            priorities: priorities
                .into_iter()
                .map(|(name, priority)| (SmolStr::new(name.as_ref()), priority))
                .collect(),
        }
    }

    /// Give each variable a priority so they're placed in the order they were
    /// listed.
    pub fn from_order<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variables: Vec<S> = variables.into_iter().collect();
        let count = variables.len() as i64;

        VariablePriority::new(
            variables
                .into_iter()
                .enumerate()
                .map(|(i, name)| (name, count - i as i64)),
        )
    }

    pub fn priority_of(&self, variable: &str) -> Option<i64> {
        self.priorities.get(variable).copied()
    }
}

impl TermOrdering for VariablePriority {
    fn compare(&self, left: &Term, right: &Term) -> Ordering {
        match (
            self.priority_of(left.variable()),
            self.priority_of(right.variable()),
        ) {
            (Some(l), Some(r)) => r.cmp(&l).then_with(|| right.cmp(left)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Descending.compare(left, right),
        }
    }
}

/// A cheaply cloned handle to the [`TermOrdering`] an equation or system is
/// using.
#[derive(Clone)]
pub struct OrderingPolicy(Arc<dyn TermOrdering + Send + Sync>);

impl OrderingPolicy {
    pub fn new<O>(ordering: O) -> Self
    where
        O: TermOrdering + Send + Sync + 'static,
    {
        OrderingPolicy(Arc::new(ordering))
    }

    pub fn descending() -> Self { OrderingPolicy::new(Descending) }

    pub fn alphabetical() -> Self { OrderingPolicy::new(Alphabetical) }

    pub fn by_priority<I, S>(priorities: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        OrderingPolicy::new(VariablePriority::new(priorities))
    }

    /// Place variables in the order they're listed, e.g. `["x", "y", "z"]`.
    pub fn variable_order<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        OrderingPolicy::new(VariablePriority::from_order(variables))
    }

    /// Compare two terms, always placing the constant term last.
    pub fn compare(&self, left: &Term, right: &Term) -> Ordering {
        match (left.is_constant(), right.is_constant()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => left.coefficient().compare(right.coefficient()),
            (false, false) => self.0.compare(left, right),
        }
    }

    pub(crate) fn sort(&self, terms: &mut [Term]) {
        terms.sort_by(|left, right| self.compare(left, right));
    }
}

impl Default for OrderingPolicy {
    fn default() -> Self { OrderingPolicy::descending() }
}

impl Debug for OrderingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OrderingPolicy").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rational;
    use proptest::prelude::*;

    fn term(coefficient: i64, variable: &str) -> Term {
        Term::new(Rational::from(coefficient), variable)
    }

    fn sorted(policy: &OrderingPolicy, mut terms: Vec<Term>) -> Vec<String> {
        policy.sort(&mut terms);
        terms.iter().map(|t| t.variable().to_string()).collect()
    }

    fn sample() -> Vec<Term> {
        vec![
            term(1, "x"),
            term(-2, ""),
            term(3, "w"),
            term(4, "z"),
            term(5, "y"),
        ]
    }

    #[test]
    fn descending_is_the_default() {
        let got = sorted(&OrderingPolicy::default(), sample());

        assert_eq!(got, vec!["z", "y", "x", "w", ""]);
    }

    #[test]
    fn alphabetical_still_puts_the_constant_last() {
        let got = sorted(&OrderingPolicy::alphabetical(), sample());

        assert_eq!(got, vec!["w", "x", "y", "z", ""]);
    }

    #[test]
    fn explicit_priorities() {
        let policy = OrderingPolicy::by_priority(vec![
            ("x", 5),
            ("y", 4),
            ("z", 3),
            ("w", 2),
        ]);

        let got = sorted(&policy, sample());

        assert_eq!(got, vec!["x", "y", "z", "w", ""]);
    }

    #[test]
    fn unprioritised_variables_go_after_prioritised_ones() {
        let policy = OrderingPolicy::variable_order(vec!["w", "x"]);

        let got = sorted(&policy, sample());

        assert_eq!(got, vec!["w", "x", "z", "y", ""]);
    }

    fn any_policy() -> impl Strategy<Value = OrderingPolicy> {
        prop_oneof![
            Just(OrderingPolicy::descending()),
            Just(OrderingPolicy::alphabetical()),
            Just(OrderingPolicy::variable_order(vec!["c", "a", "e"])),
        ]
    }

    fn any_terms() -> impl Strategy<Value = Vec<Term>> {
        proptest::collection::btree_map("[a-f]?", -20_i64..20, 1..6).prop_map(
            |map| {
                map.into_iter()
                    .map(|(name, coefficient)| term(coefficient, &name))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn orderings_are_strict_weak_orderings(
            policy in any_policy(),
            terms in any_terms(),
        ) {
            for a in &terms {
                prop_assert_eq!(policy.compare(a, a), Ordering::Equal);

                for b in &terms {
                    let forwards = policy.compare(a, b);
                    prop_assert_eq!(forwards, policy.compare(b, a).reverse());

                    for c in &terms {
                        if forwards == Ordering::Less
                            && policy.compare(b, c) == Ordering::Less
                        {
                            prop_assert_eq!(
                                policy.compare(a, c),
                                Ordering::Less
                            );
                        }
                    }
                }
            }
        }
    }
}
