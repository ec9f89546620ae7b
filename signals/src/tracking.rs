use std::sync::{Arc, Weak};

/// The weak side of a strong/weak ownership pair: can only answer whether the owner is still alive.
pub trait Liveness: Send + Sync {
    fn is_alive(&self) -> bool;
}

impl<T: ?Sized + Send + Sync> Liveness for Weak<T> {
    fn is_alive(&self) -> bool { self.strong_count() > 0 }
}

/// A type-erased observation of an externally owned object.
///
/// A tracker never keeps its object alive. Slots holding a tracker refuse to run once it has expired.
#[derive(Clone)]
pub struct Tracker(Arc<dyn Liveness>);

impl Tracker {
    pub fn new<W: Liveness + 'static>(weak: W) -> Self { Self(Arc::new(weak)) }

    /// True once every strong owner of the tracked object has been dropped
    pub fn expired(&self) -> bool { !self.0.is_alive() }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Tracker").field("expired", &self.expired()).finish() }
}

/// Types that can hand out a [`Tracker`] for themselves.
pub trait Track {
    fn tracker(&self) -> Tracker;
}

impl<T: ?Sized + Send + Sync + 'static> Track for Arc<T> {
    fn tracker(&self) -> Tracker { Tracker::new(Arc::downgrade(self)) }
}

impl<T: ?Sized + Send + Sync + 'static> Track for Weak<T> {
    fn tracker(&self) -> Tracker { Tracker::new(self.clone()) }
}

impl Track for Tracker {
    fn tracker(&self) -> Tracker { self.clone() }
}
