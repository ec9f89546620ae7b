use std::sync::Arc;

use crate::{
    bind::{BindFront, Callable},
    combiner::Combiner,
    connection::Connection,
    error::ExpiredSlot,
    lock::LockFamily,
    order::GroupOrder,
    signal::Signal,
    signature::Signature,
    tracking::{Track, Tracker},
};

/// Type-erased callable matching a signature
pub(crate) type SlotFn<S> = Arc<dyn Fn(<S as Signature>::Args) -> <S as Signature>::Output + Send + Sync + 'static>;

/// Type-erased callable for extended slots, which receive their own connection first
pub(crate) struct ExtendedFn<S: Signature>(Arc<dyn Fn(&Connection, S::Args) -> S::Output + Send + Sync + 'static>);

impl<S: Signature> Clone for ExtendedFn<S> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<S: Signature> BindFront<Connection, S::Args, S::Output> for ExtendedFn<S> {
    fn invoke_with(&self, first: &Connection, args: S::Args) -> S::Output { (self.0)(first, args) }
}

fn check_trackers(tracked: &[Tracker]) -> Result<(), ExpiredSlot> {
    if tracked.iter().any(Tracker::expired) { Err(ExpiredSlot) } else { Ok(()) }
}

/// A callable that can be connected to a signal with signature `S`, plus the objects it tracks.
///
/// ```rust
/// use sigslot::*;
/// use std::sync::Arc;
///
/// let owner = Arc::new(5);
/// let mut slot = Slot::<fn(i32) -> i32>::new(|x: i32| x + 1);
/// slot.track(&owner);
/// assert_eq!(slot.call((1,)), Ok(2));
///
/// drop(owner);
/// assert_eq!(slot.call((1,)), Err(ExpiredSlot));
/// ```
pub struct Slot<S: Signature> {
    function: SlotFn<S>,
    tracked: Vec<Tracker>,
}

impl<S: Signature> Clone for Slot<S> {
    fn clone(&self) -> Self { Self { function: self.function.clone(), tracked: self.tracked.clone() } }
}

impl<S: Signature> Slot<S> {
    pub fn new<F>(function: F) -> Self
    where F: Callable<S::Args, S::Output> {
        Self::from_fn(move |args| function.invoke(args))
    }

    pub(crate) fn from_fn(function: impl Fn(S::Args) -> S::Output + Send + Sync + 'static) -> Self {
        Self { function: Arc::new(function), tracked: Vec::new() }
    }

    /// A slot that invokes `signal` and returns its combined result.
    ///
    /// The slot holds a copy of `signal` taken now: slots connected to `signal` afterwards are not seen by it.
    /// It also tracks `signal` itself, so it expires once the original is dropped.
    pub fn forward<T, C, G, O, L>(signal: &Signal<T, C, G, O, L>) -> Self
    where
        T: Signature<Args = S::Args>,
        C: Combiner<T::Output, Output = S::Output>,
        G: Clone + Send + Sync + 'static,
        O: GroupOrder<G> + Clone,
        L: LockFamily,
    {
        let tracker = signal.get_tracker();
        let copy = signal.clone();
        let mut slot = Self::from_fn(move |args| copy.emit(args));
        slot.tracked.push(tracker);
        slot
    }

    /// Tracks an object owned elsewhere; the slot expires once it is dropped.
    /// Repeated calls accumulate.
    pub fn track<T: Track + ?Sized>(&mut self, handle: &T) -> &mut Self {
        self.tracked.push(handle.tracker());
        self
    }

    pub fn tracked(&self) -> &[Tracker] { &self.tracked }

    /// Whether any tracked object has been dropped
    pub fn expired(&self) -> bool { check_trackers(&self.tracked).is_err() }

    /// Invoke the slot directly, failing if any tracked object has been dropped
    pub fn call(&self, args: S::Args) -> Result<S::Output, ExpiredSlot> {
        check_trackers(&self.tracked)?;
        Ok((self.function)(args))
    }

    pub(crate) fn into_parts(self) -> (SlotFn<S>, Vec<Tracker>) { (self.function, self.tracked) }
}

impl<S, T, C, G, O, L> From<&Signal<T, C, G, O, L>> for Slot<S>
where
    S: Signature,
    T: Signature<Args = S::Args>,
    C: Combiner<T::Output, Output = S::Output>,
    G: Clone + Send + Sync + 'static,
    O: GroupOrder<G> + Clone,
    L: LockFamily,
{
    fn from(signal: &Signal<T, C, G, O, L>) -> Self { Self::forward(signal) }
}

impl<S: Signature> std::fmt::Debug for Slot<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("signature", &std::any::type_name::<S>()).field("tracked", &self.tracked).finish()
    }
}

/// A slot whose callable receives its own [`Connection`] ahead of the signal's arguments,
/// so it can inspect or end its own registration.
pub struct ExtendedSlot<S: Signature> {
    function: ExtendedFn<S>,
    tracked: Vec<Tracker>,
}

impl<S: Signature> Clone for ExtendedSlot<S> {
    fn clone(&self) -> Self { Self { function: self.function.clone(), tracked: self.tracked.clone() } }
}

impl<S: Signature> ExtendedSlot<S> {
    pub fn new<F>(function: F) -> Self
    where F: BindFront<Connection, S::Args, S::Output> {
        Self { function: ExtendedFn(Arc::new(move |connection: &Connection, args: S::Args| function.invoke_with(connection, args))), tracked: Vec::new() }
    }

    pub fn track<T: Track + ?Sized>(&mut self, handle: &T) -> &mut Self {
        self.tracked.push(handle.tracker());
        self
    }

    pub fn tracked(&self) -> &[Tracker] { &self.tracked }

    pub fn expired(&self) -> bool { check_trackers(&self.tracked).is_err() }

    pub fn call(&self, connection: &Connection, args: S::Args) -> Result<S::Output, ExpiredSlot> {
        check_trackers(&self.tracked)?;
        Ok(self.function.invoke_with(connection, args))
    }

    pub(crate) fn into_parts(self) -> (ExtendedFn<S>, Vec<Tracker>) { (self.function, self.tracked) }
}

impl<S: Signature> std::fmt::Debug for ExtendedSlot<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedSlot").field("signature", &std::any::type_name::<S>()).field("tracked", &self.tracked).finish()
    }
}

/// Conversion into a [`Slot`] when connecting.
///
/// `Marker` only disambiguates the blanket implementations and is always inferred.
pub trait IntoSlot<S: Signature, Marker> {
    fn into_slot(self) -> Slot<S>;
}

/// Conversion into an [`ExtendedSlot`] when connecting.
pub trait IntoExtendedSlot<S: Signature, Marker> {
    fn into_extended_slot(self) -> ExtendedSlot<S>;
}

#[doc(hidden)]
pub struct IsSlot;
#[doc(hidden)]
pub struct IsSlotRef;
#[doc(hidden)]
pub struct IsClosure;
#[doc(hidden)]
pub struct IsSender;

impl<S: Signature> IntoSlot<S, IsSlot> for Slot<S> {
    fn into_slot(self) -> Slot<S> { self }
}

impl<S: Signature> IntoSlot<S, IsSlotRef> for &Slot<S> {
    fn into_slot(self) -> Slot<S> { self.clone() }
}

impl<S: Signature, F> IntoSlot<S, IsClosure> for F
where F: Callable<S::Args, S::Output>
{
    fn into_slot(self) -> Slot<S> { Slot::new(self) }
}

// Channel senders forward the call arguments and ignore send errors
impl<S> IntoSlot<S, IsSender> for std::sync::mpsc::Sender<S::Args>
where
    S: Signature<Output = ()>,
    S::Args: Send,
{
    fn into_slot(self) -> Slot<S> {
        Slot::from_fn(move |args| {
            let _ = self.send(args);
        })
    }
}

#[cfg(feature = "tokio")]
impl<S> IntoSlot<S, IsSender> for tokio::sync::mpsc::UnboundedSender<S::Args>
where
    S: Signature<Output = ()>,
    S::Args: Send,
{
    fn into_slot(self) -> Slot<S> {
        Slot::from_fn(move |args| {
            let _ = self.send(args);
        })
    }
}

impl<S: Signature> IntoExtendedSlot<S, IsSlot> for ExtendedSlot<S> {
    fn into_extended_slot(self) -> ExtendedSlot<S> { self }
}

impl<S: Signature> IntoExtendedSlot<S, IsSlotRef> for &ExtendedSlot<S> {
    fn into_extended_slot(self) -> ExtendedSlot<S> { self.clone() }
}

impl<S: Signature, F> IntoExtendedSlot<S, IsClosure> for F
where F: BindFront<Connection, S::Args, S::Output>
{
    fn into_extended_slot(self) -> ExtendedSlot<S> { ExtendedSlot::new(self) }
}
