use crate::{
    combiner::{Combiner, OptionalLastValue},
    connection::Connection,
    error::ExpiredSlot,
    lock::{LockFamily, StdMutex},
    order::{Ascending, GroupOrder},
    position::Position,
    registry::SlotRegistry,
    signature::Signature,
    slot::{IntoExtendedSlot, IntoSlot},
    tracking::Tracker,
};

/// A signal: the point slots connect to, and the thing that gets emitted.
///
/// `Signal` owns exactly one [`SlotRegistry`]. Cloning makes an independent deep copy,
/// [`std::mem::take`] moves the registry out and leaves an empty signal behind,
/// and [`Signal::swap`] exchanges registries together with their issued connections.
///
/// ```rust
/// use sigslot::*;
///
/// let signal = Signal::<fn(i32) -> i32>::new();
/// signal.connect(|x: i32| x + 1, Position::AtBack);
/// let doubled = signal.connect(|x: i32| x * 2, Position::AtBack);
/// assert_eq!(signal.emit((5,)), Some(10));
///
/// doubled.disconnect();
/// assert_eq!(signal.emit((5,)), Some(6));
/// ```
pub struct Signal<S, C = OptionalLastValue<<S as Signature>::Output>, G = i32, O = Ascending, L = StdMutex>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    registry: SlotRegistry<S, C, G, O, L>,
}

impl<S, C, G, O, L> Signal<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    /// Number of call arguments
    pub const ARITY: usize = S::ARITY;

    pub fn new() -> Self
    where
        C: Default,
        O: Default,
    {
        Self { registry: SlotRegistry::new() }
    }

    pub fn with_combiner(combiner: C) -> Self
    where O: Default {
        Self { registry: SlotRegistry::with_combiner(combiner) }
    }

    pub fn with_combiner_and_order(combiner: C, order: O) -> Self { Self { registry: SlotRegistry::with_combiner_and_order(combiner, order) } }

    pub fn connect<M>(&self, slot: impl IntoSlot<S, M>, position: Position) -> Connection { self.registry.connect(slot, position) }

    pub fn connect_grouped<M>(&self, group: G, slot: impl IntoSlot<S, M>, position: Position) -> Connection {
        self.registry.connect_grouped(group, slot, position)
    }

    pub fn connect_extended<M>(&self, slot: impl IntoExtendedSlot<S, M>, position: Position) -> Connection {
        self.registry.connect_extended(slot, position)
    }

    pub fn connect_extended_grouped<M>(&self, group: G, slot: impl IntoExtendedSlot<S, M>, position: Position) -> Connection {
        self.registry.connect_extended_grouped(group, slot, position)
    }

    pub fn disconnect_group(&self, group: &G) { self.registry.disconnect_group(group) }

    pub fn disconnect_all_slots(&self) { self.registry.disconnect_all_slots() }

    pub fn num_slots(&self) -> usize { self.registry.num_slots() }

    pub fn is_empty(&self) -> bool { self.registry.is_empty() }

    /// See [`SlotRegistry::emit`]
    pub fn emit(&self, args: S::Args) -> C::Output { self.registry.emit(args) }

    /// See [`SlotRegistry::try_emit`]
    pub fn try_emit(&self, args: S::Args) -> Result<C::Output, ExpiredSlot> { self.registry.try_emit(args) }

    pub fn combiner(&self) -> C
    where C: Clone {
        self.registry.combiner()
    }

    pub fn set_combiner(&self, combiner: C) { self.registry.set_combiner(combiner) }

    pub fn swap(&mut self, other: &mut Self) { self.registry.swap(&mut other.registry) }

    /// Liveness token of the registry this signal currently owns
    pub fn get_tracker(&self) -> Tracker { self.registry.tracker() }

    pub fn registry(&self) -> &SlotRegistry<S, C, G, O, L> { &self.registry }
}

impl<S, C, G, O, L> Default for Signal<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output> + Default,
    G: Send + Sync + 'static,
    O: GroupOrder<G> + Default,
    L: LockFamily,
{
    fn default() -> Self { Self::new() }
}

impl<S, C, G, O, L> Clone for Signal<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Clone + Send + Sync + 'static,
    O: GroupOrder<G> + Clone,
    L: LockFamily,
{
    fn clone(&self) -> Self { Self { registry: self.registry.duplicate() } }
}

impl<S, C, G, O, L> From<SlotRegistry<S, C, G, O, L>> for Signal<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    fn from(registry: SlotRegistry<S, C, G, O, L>) -> Self { Self { registry } }
}

impl<S, C, G, O, L> std::fmt::Debug for Signal<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("signature", &std::any::type_name::<S>()).field("slots", &self.num_slots()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert_eq!(Signal::<fn(f64, f32, char, bool) -> i32>::ARITY, 4);
        assert_eq!(Signal::<fn() -> i32>::ARITY, 0);
        assert_eq!(Signal::<fn()>::ARITY, 0);
        assert_eq!(Signal::<fn(i32, f64)>::ARITY, 2);
    }

    #[test]
    fn test_tracker_follows_registry() {
        let mut signal = Signal::<fn(char) -> i32>::new();
        signal.connect(|_: char| 6, Position::AtBack);
        let tracker = signal.get_tracker();
        assert!(!tracker.expired());

        let moved = std::mem::take(&mut signal);
        assert!(!tracker.expired());
        drop(signal);
        assert!(!tracker.expired());
        drop(moved);
        assert!(tracker.expired());
    }

    #[test]
    fn test_default_combiner() {
        let signal = Signal::<fn(i32) -> i32>::default();
        assert_eq!(signal.combiner(), OptionalLastValue::<i32>::new());
    }
}
