use std::marker::PhantomData;

/// Aggregates the results of one signal invocation into a single value.
///
/// `results` is lazy: each call to `next` runs the next slot. A combiner may stop early,
/// and slots it never reaches are never run.
pub trait Combiner<R>: Send + Sync + 'static {
    type Output;

    fn combine<I>(&self, results: I) -> Self::Output
    where I: Iterator<Item = R>;
}

/// Runs every slot and returns the value of the last one, or `None` if no slot ran.
pub struct OptionalLastValue<T>(PhantomData<fn() -> T>);

impl<T> OptionalLastValue<T> {
    pub fn new() -> Self { Self(PhantomData) }
}

impl<T> Default for OptionalLastValue<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Clone for OptionalLastValue<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for OptionalLastValue<T> {}

impl<T> PartialEq for OptionalLastValue<T> {
    fn eq(&self, _: &Self) -> bool { true }
}

impl<T> std::fmt::Debug for OptionalLastValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "OptionalLastValue<{}>", std::any::type_name::<T>()) }
}

impl<T: 'static> Combiner<T> for OptionalLastValue<T> {
    type Output = Option<T>;

    fn combine<I>(&self, results: I) -> Option<T>
    where I: Iterator<Item = T> {
        results.last()
    }
}

/// Runs every slot for its side effects and returns nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Discard;

impl<T> Combiner<T> for Discard {
    type Output = ();

    fn combine<I>(&self, results: I)
    where I: Iterator<Item = T> {
        results.for_each(drop)
    }
}

/// Runs every slot and returns all of their values in invocation order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectAll;

impl<T> Combiner<T> for CollectAll {
    type Output = Vec<T>;

    fn combine<I>(&self, results: I) -> Vec<T>
    where I: Iterator<Item = T> {
        results.collect()
    }
}
