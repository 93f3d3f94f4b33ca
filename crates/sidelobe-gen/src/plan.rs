//! Resolved production plans and the lazy test-case cursor.

use std::ops::Range;

use sidelobe_types::{Case, ConstraintSet};

use crate::{CaseGenerator, GeneratorError};

/// A validated production plan.
///
/// Holds the constraint snapshot the cases will be produced from and the
/// derived parameter range. Each of the `count` repetitions yields one case
/// per point in `variants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePlan {
    constraints: ConstraintSet,
    variants: Range<i64>,
    count: usize,
}

impl CasePlan {
    pub fn new(constraints: ConstraintSet, variants: Range<i64>, count: usize) -> Self {
        Self {
            constraints,
            variants,
            count,
        }
    }

    /// The merged constraint snapshot.
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn variants(&self) -> Range<i64> {
        self.variants.clone()
    }

    /// Number of points in the derived parameter range.
    pub fn range_size(&self) -> usize {
        usize::try_from(self.variants.end.saturating_sub(self.variants.start)).unwrap_or(0)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Total cases: `count × range_size`, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.count.saturating_mul(self.range_size())
    }

    /// Whether `variant` is a point of this plan's range.
    pub fn covers(&self, variant: i64) -> bool {
        self.variants.contains(&variant)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Variant for the `index`-th case of the plan.
    fn variant_at(&self, index: usize) -> i64 {
        self.variants.start + (index % self.range_size()) as i64
    }
}

/// Lazy, count-bounded sequence of test cases.
///
/// The cursor does not borrow its generator: each [`TestCases::next_case`]
/// call takes it explicitly, so the caller can interleave control cases
/// between test cases while every emitted frame still draws the next
/// sequence number.
#[derive(Debug, Clone)]
pub struct TestCases {
    plan: CasePlan,
    emitted: usize,
}

impl TestCases {
    pub fn new(plan: CasePlan) -> Self {
        Self { plan, emitted: 0 }
    }

    pub fn plan(&self) -> &CasePlan {
        &self.plan
    }

    /// Total number of cases this cursor yields.
    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.plan.len().saturating_sub(self.emitted)
    }

    /// Produces the next case, or `None` once the plan is exhausted.
    pub fn next_case<G>(&mut self, generator: &mut G) -> Option<Result<Case, GeneratorError>>
    where
        G: CaseGenerator + ?Sized,
    {
        if self.emitted >= self.plan.len() {
            return None;
        }
        let variant = self.plan.variant_at(self.emitted);
        self.emitted += 1;
        Some(generator.produce(&self.plan, variant))
    }
}

/// Eagerly produces every case of `test_cases(count, constraints)`.
pub fn collect_cases<G>(
    generator: &mut G,
    count: usize,
    constraints: &ConstraintSet,
) -> Result<Vec<Case>, GeneratorError>
where
    G: CaseGenerator + ?Sized,
{
    let mut cursor = generator.test_cases(count, constraints)?;
    let mut cases = Vec::with_capacity(cursor.len());
    while let Some(case) = cursor.next_case(generator) {
        cases.push(case?);
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_count_times_range() {
        let plan = CasePlan::new(ConstraintSet::new(), 2..7, 3);
        assert_eq!(plan.range_size(), 5);
        assert_eq!(plan.len(), 15);
        assert_eq!(plan.variant_at(0), 2);
        assert_eq!(plan.variant_at(4), 6);
        assert_eq!(plan.variant_at(5), 2);
    }

    #[test]
    fn huge_counts_saturate() {
        let plan = CasePlan::new(ConstraintSet::new(), 0..9, usize::MAX);
        assert_eq!(plan.len(), usize::MAX);
        let cursor = TestCases::new(plan);
        assert_eq!(cursor.remaining(), usize::MAX);
        assert!(!cursor.is_empty());
    }

    #[test]
    fn covers_only_the_range() {
        let plan = CasePlan::new(ConstraintSet::new(), 0..9, 1);
        assert!(plan.covers(0));
        assert!(plan.covers(8));
        assert!(!plan.covers(9));
        assert!(!plan.covers(-1));
    }

    #[test]
    fn inverted_range_is_empty() {
        let plan = CasePlan::new(ConstraintSet::new(), 5..3, 4);
        assert_eq!(plan.range_size(), 0);
        assert!(plan.is_empty());
        assert_eq!(TestCases::new(plan).remaining(), 0);
    }
}
