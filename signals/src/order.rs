use std::cmp::Ordering;

/// Orders group keys. Must be a strict weak ordering: keys comparing `Equal` share one group.
pub trait GroupOrder<G>: Send + Sync + 'static {
    fn compare(&self, a: &G, b: &G) -> Ordering;
}

/// Groups run from the smallest key to the largest.
///
/// Keys must be totally ordered by `PartialOrd`. Floating-point NaN keys break that and place their group
/// unpredictably; use [`CompareFn`] with `f64::total_cmp` when NaN can occur.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ascending;

impl<G: PartialOrd> GroupOrder<G> for Ascending {
    fn compare(&self, a: &G, b: &G) -> Ordering { a.partial_cmp(b).unwrap_or(Ordering::Equal) }
}

/// Groups run from the largest key to the smallest. Has the same key requirement as [`Ascending`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Descending;

impl<G: PartialOrd> GroupOrder<G> for Descending {
    fn compare(&self, a: &G, b: &G) -> Ordering { b.partial_cmp(a).unwrap_or(Ordering::Equal) }
}

/// Adapts a comparison closure into a [`GroupOrder`].
#[derive(Clone, Copy)]
pub struct CompareFn<F>(pub F);

impl<G, F> GroupOrder<G> for CompareFn<F>
where F: Fn(&G, &G) -> Ordering + Send + Sync + 'static
{
    fn compare(&self, a: &G, b: &G) -> Ordering { (self.0)(a, b) }
}

impl<F> std::fmt::Debug for CompareFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("CompareFn") }
}
