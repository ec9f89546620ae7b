use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use crate::{
    bind::bind_front,
    combiner::{Combiner, OptionalLastValue},
    connection::{Connection, ConnectionState, Detach, SlotId},
    error::ExpiredSlot,
    lock::{Lock, LockFamily, StdMutex},
    order::{Ascending, GroupOrder},
    position::Position,
    signature::Signature,
    slot::{ExtendedFn, IntoExtendedSlot, IntoSlot, SlotFn},
    tracking::Tracker,
};

/// The ordered, thread-safe store of slots behind a signal, and the engine that invokes them.
///
/// Slots live in three sections, invoked in this order:
/// - the front section (ungrouped slots connected [`Position::AtFront`])
/// - the groups, ascending by `O`
/// - the back section (ungrouped slots connected [`Position::AtBack`])
///
/// The lock is only held for bookkeeping. Invocation takes a snapshot of the connected slots under the lock
/// and runs them after releasing it, so slots may connect, disconnect (themselves included) or emit again.
pub struct SlotRegistry<S, C = OptionalLastValue<<S as Signature>::Output>, G = i32, O = Ascending, L = StdMutex>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    shared: Arc<Shared<S, C, G, O, L>>,
}

struct Shared<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    state: L::Lock<State<S, C, G>>,
    order: O,
    next_id: AtomicU64,
}

struct State<S: Signature, C, G> {
    front: VecDeque<Entry<S>>,
    // kept sorted by the registry's GroupOrder, never holds an empty group
    groups: Vec<(G, VecDeque<Entry<S>>)>,
    back: VecDeque<Entry<S>>,
    combiner: Arc<C>,
}

enum SlotFunction<S: Signature> {
    Plain(SlotFn<S>),
    // `bound` is `unbound` with the entry's own connection fixed as its first argument
    Extended { unbound: ExtendedFn<S>, bound: SlotFn<S> },
}

struct Entry<S: Signature> {
    id: SlotId,
    state: Arc<ConnectionState>,
    function: SlotFunction<S>,
    tracked: Arc<[Tracker]>,
}

impl<S: Signature> Entry<S> {
    fn callable(&self) -> &SlotFn<S> {
        match &self.function {
            SlotFunction::Plain(function) => function,
            SlotFunction::Extended { bound, .. } => bound,
        }
    }
}

/// Where an entry is stored
enum Section<G> {
    Front,
    Group(G),
    Back,
}

impl<G> Section<G> {
    fn name(&self) -> &'static str {
        match self {
            Section::Front => "front",
            Section::Group(_) => "group",
            Section::Back => "back",
        }
    }
}

/// Unbound callable of an existing entry, used to rebuild it in a copied registry
enum Blueprint<S: Signature> {
    Plain(SlotFn<S>),
    Extended(ExtendedFn<S>),
}

/// One slot captured for a single invocation
struct Pending<S: Signature> {
    function: SlotFn<S>,
    tracked: Arc<[Tracker]>,
    connection: Connection,
}

impl<S: Signature, C, G> State<S, C, G> {
    fn new(combiner: Arc<C>) -> Self { Self { front: VecDeque::new(), groups: Vec::new(), back: VecDeque::new(), combiner } }

    fn len(&self) -> usize { self.front.len() + self.groups.iter().map(|(_, members)| members.len()).sum::<usize>() + self.back.len() }

    fn entries(&self) -> impl Iterator<Item = &Entry<S>> {
        self.front.iter().chain(self.groups.iter().flat_map(|(_, members)| members.iter())).chain(self.back.iter())
    }

    // the only caller code run under the lock; nothing is mutated until it returns
    fn group_index<O: GroupOrder<G>>(&self, order: &O, group: &G) -> Result<usize, usize> {
        self.groups.binary_search_by(|(key, _)| order.compare(key, group))
    }

    fn insert<O: GroupOrder<G>>(&mut self, order: &O, section: Section<G>, position: Position, entry: Entry<S>) {
        let members = match section {
            Section::Front => &mut self.front,
            Section::Back => &mut self.back,
            Section::Group(group) => {
                let index = match self.group_index(order, &group) {
                    Ok(index) => index,
                    Err(index) => {
                        self.groups.insert(index, (group, VecDeque::new()));
                        index
                    }
                };
                &mut self.groups[index].1
            }
        };
        match position {
            Position::AtFront => members.push_front(entry),
            Position::AtBack => members.push_back(entry),
        }
    }

    fn remove(&mut self, id: SlotId) -> Option<Entry<S>> {
        fn take<S: Signature>(members: &mut VecDeque<Entry<S>>, id: SlotId) -> Option<Entry<S>> {
            let index = members.iter().position(|entry| entry.id == id)?;
            members.remove(index)
        }

        let entry = match take(&mut self.front, id).or_else(|| take(&mut self.back, id)) {
            Some(entry) => entry,
            None => {
                let index = self.groups.iter().position(|(_, members)| members.iter().any(|entry| entry.id == id))?;
                let entry = take(&mut self.groups[index].1, id)?;
                if self.groups[index].1.is_empty() {
                    self.groups.remove(index);
                }
                entry
            }
        };
        entry.state.mark_disconnected();
        Some(entry)
    }

    fn snapshot(&self) -> Vec<Pending<S>> {
        self.entries()
            .filter(|entry| entry.state.is_connected())
            .map(|entry| Pending {
                function: entry.callable().clone(),
                tracked: entry.tracked.clone(),
                connection: Connection::new(entry.state.clone()),
            })
            .collect()
    }

    fn blueprints(&self) -> Vec<(Section<G>, Blueprint<S>, Vec<Tracker>)>
    where G: Clone {
        fn describe<S: Signature, G>(section: Section<G>, entry: &Entry<S>) -> (Section<G>, Blueprint<S>, Vec<Tracker>) {
            let blueprint = match &entry.function {
                SlotFunction::Plain(function) => Blueprint::Plain(function.clone()),
                SlotFunction::Extended { unbound, .. } => Blueprint::Extended(unbound.clone()),
            };
            (section, blueprint, entry.tracked.to_vec())
        }

        let front = self.front.iter().map(|entry| describe(Section::Front, entry));
        let groups =
            self.groups.iter().flat_map(|(group, members)| members.iter().map(move |entry| describe(Section::Group(group.clone()), entry)));
        let back = self.back.iter().map(|entry| describe(Section::Back, entry));
        front.chain(groups).chain(back).collect()
    }

    fn drain(&mut self) -> Vec<Entry<S>> {
        let mut removed: Vec<Entry<S>> = self.front.drain(..).collect();
        removed.extend(self.groups.drain(..).flat_map(|(_, members)| members));
        removed.extend(self.back.drain(..));
        for entry in &removed {
            entry.state.mark_disconnected();
        }
        removed
    }
}

impl<S, C, G, O, L> Detach for Shared<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    fn detach(&self, id: SlotId) {
        // the entry is dropped after the lock is released, its callable may own connections to this registry
        let removed = self.state.with(|state| state.remove(id));
        if removed.is_some() {
            debug!("slot {} disconnected", id);
        }
    }
}

impl<S, C, G, O, L> SlotRegistry<S, C, G, O, L>
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
        Self::with_combiner_and_order(C::default(), O::default())
    }

    pub fn with_combiner(combiner: C) -> Self
    where O: Default {
        Self::with_combiner_and_order(combiner, O::default())
    }

    pub fn with_combiner_and_order(combiner: C, order: O) -> Self { Self::from_parts(Arc::new(combiner), order) }

    fn from_parts(combiner: Arc<C>, order: O) -> Self {
        let state = <L::Lock<State<S, C, G>> as Lock<State<S, C, G>>>::new(State::new(combiner));
        Self { shared: Arc::new(Shared { state, order, next_id: AtomicU64::new(0) }) }
    }

    /// Connect an ungrouped slot: `AtFront` joins the front section ahead of its members,
    /// `AtBack` joins the back section behind its members.
    pub fn connect<M>(&self, slot: impl IntoSlot<S, M>, position: Position) -> Connection {
        let section = match position {
            Position::AtFront => Section::Front,
            Position::AtBack => Section::Back,
        };
        let (function, tracked) = slot.into_slot().into_parts();
        self.insert(section, position, Blueprint::Plain(function), tracked)
    }

    /// Connect a slot into `group`, at the front or back of that group
    pub fn connect_grouped<M>(&self, group: G, slot: impl IntoSlot<S, M>, position: Position) -> Connection {
        let (function, tracked) = slot.into_slot().into_parts();
        self.insert(Section::Group(group), position, Blueprint::Plain(function), tracked)
    }

    /// Like [`connect`](Self::connect), for a slot that receives its own connection as first argument
    pub fn connect_extended<M>(&self, slot: impl IntoExtendedSlot<S, M>, position: Position) -> Connection {
        let section = match position {
            Position::AtFront => Section::Front,
            Position::AtBack => Section::Back,
        };
        let (function, tracked) = slot.into_extended_slot().into_parts();
        self.insert(section, position, Blueprint::Extended(function), tracked)
    }

    /// Like [`connect_grouped`](Self::connect_grouped), for a slot that receives its own connection as first argument
    pub fn connect_extended_grouped<M>(&self, group: G, slot: impl IntoExtendedSlot<S, M>, position: Position) -> Connection {
        let (function, tracked) = slot.into_extended_slot().into_parts();
        self.insert(Section::Group(group), position, Blueprint::Extended(function), tracked)
    }

    fn insert(&self, section: Section<G>, position: Position, blueprint: Blueprint<S>, tracked: Vec<Tracker>) -> Connection {
        let (entry, connection) = self.new_entry(blueprint, tracked);
        let id = entry.id;
        let name = section.name();
        self.shared.state.with(|state| state.insert(&self.shared.order, section, position, entry));
        debug!("slot {} connected to {} section {}", id, name, position);
        connection
    }

    // The entry's connection state exists before its callable, so an extended callable can be bound to it
    fn new_entry(&self, blueprint: Blueprint<S>, tracked: Vec<Tracker>) -> (Entry<S>, Connection) {
        let id = SlotId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let registry: Weak<dyn Detach> = Arc::downgrade(&self.shared) as Weak<dyn Detach>;
        let state = Arc::new(ConnectionState::new(id, registry));
        let connection = Connection::new(state.clone());
        let function = match blueprint {
            Blueprint::Plain(function) => SlotFunction::Plain(function),
            Blueprint::Extended(unbound) => {
                let bound: SlotFn<S> = Arc::new(bind_front(connection.clone(), unbound.clone()));
                SlotFunction::Extended { unbound, bound }
            }
        };
        (Entry { id, state, function, tracked: tracked.into() }, connection)
    }

    /// Disconnect every slot in `group`. Does nothing if the group has no slots.
    pub fn disconnect_group(&self, group: &G) {
        let removed = self.shared.state.with(|state| match state.group_index(&self.shared.order, group) {
            Ok(index) => {
                let (_, members) = state.groups.remove(index);
                members.iter().for_each(|entry| entry.state.mark_disconnected());
                members
            }
            Err(_) => VecDeque::new(),
        });
        if !removed.is_empty() {
            debug!("group disconnected, {} slots removed", removed.len());
        }
    }

    pub fn disconnect_all_slots(&self) {
        let removed = self.shared.state.with(|state| state.drain());
        debug!("all slots disconnected, {} slots removed", removed.len());
    }

    /// Number of connected slots
    pub fn num_slots(&self) -> usize { self.shared.state.with(|state| state.len()) }

    pub fn is_empty(&self) -> bool { self.num_slots() == 0 }

    /// Invoke every connected slot and combine their results.
    ///
    /// A slot whose tracked objects have been dropped produces no result and is disconnected;
    /// the remaining slots still run.
    pub fn emit(&self, args: S::Args) -> C::Output {
        let (combiner, mut calls) = self.prepare(args, false);
        combiner.combine(&mut calls)
    }

    /// Invoke every connected slot and combine their results, stopping at the first expired slot.
    ///
    /// When a slot has expired, the combiner only sees the results produced before it,
    /// the expired slot is disconnected and the call fails. A combiner that stops before
    /// reaching the expired slot is unaffected.
    pub fn try_emit(&self, args: S::Args) -> Result<C::Output, ExpiredSlot> {
        let (combiner, mut calls) = self.prepare(args, true);
        let output = combiner.combine(&mut calls);
        match calls.expired {
            Some(err) => Err(err),
            None => Ok(output),
        }
    }

    fn prepare(&self, args: S::Args, fail_fast: bool) -> (Arc<C>, SlotCalls<S>) {
        let (combiner, pending) = self.shared.state.with(|state| (state.combiner.clone(), state.snapshot()));
        trace!("emit to {} slots", pending.len());
        (combiner, SlotCalls { pending: pending.into_iter(), args: Some(args), fail_fast, expired: None })
    }

    pub fn combiner(&self) -> C
    where C: Clone {
        let combiner = self.shared.state.with(|state| state.combiner.clone());
        C::clone(&combiner)
    }

    /// Replace the combiner used by subsequent invocations
    pub fn set_combiner(&self, combiner: C) {
        let combiner = Arc::new(combiner);
        let previous = self.shared.state.with(|state| std::mem::replace(&mut state.combiner, combiner));
        drop(previous);
    }

    /// Exchange everything, including issued connections, with `other`
    pub fn swap(&mut self, other: &mut Self) { std::mem::swap(&mut self.shared, &mut other.shared) }

    /// A tracker that expires once this registry is dropped
    pub fn tracker(&self) -> Tracker { Tracker::new(Arc::downgrade(&self.shared)) }

    /// A deep copy with the same slots, groups, order, combiner and comparator.
    ///
    /// Every copied slot gets a fresh connection; connections issued by `self` keep referring to `self`.
    pub fn duplicate(&self) -> Self
    where
        G: Clone,
        O: Clone,
    {
        let (combiner, blueprints) = self.shared.state.with(|state| (state.combiner.clone(), state.blueprints()));
        let copy = Self::from_parts(combiner, self.shared.order.clone());
        let entries: Vec<_> =
            blueprints.into_iter().map(|(section, blueprint, tracked)| (section, copy.new_entry(blueprint, tracked).0)).collect();
        copy.shared.state.with(|state| {
            for (section, entry) in entries {
                state.insert(&copy.shared.order, section, Position::AtBack, entry);
            }
        });
        copy
    }
}

impl<S, C, G, O, L> Default for SlotRegistry<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output> + Default,
    G: Send + Sync + 'static,
    O: GroupOrder<G> + Default,
    L: LockFamily,
{
    fn default() -> Self { Self::new() }
}

impl<S, C, G, O, L> Clone for SlotRegistry<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Clone + Send + Sync + 'static,
    O: GroupOrder<G> + Clone,
    L: LockFamily,
{
    fn clone(&self) -> Self { self.duplicate() }
}

impl<S, C, G, O, L> std::fmt::Debug for SlotRegistry<S, C, G, O, L>
where
    S: Signature,
    C: Combiner<S::Output>,
    G: Send + Sync + 'static,
    O: GroupOrder<G>,
    L: LockFamily,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotRegistry").field("signature", &std::any::type_name::<S>()).field("slots", &self.num_slots()).finish()
    }
}

/// The lazy sequence of slot results handed to a combiner.
///
/// Each call to `next` runs one slot of the snapshot, after checking its tracked objects.
pub struct SlotCalls<S: Signature> {
    pending: std::vec::IntoIter<Pending<S>>,
    // taken by the last slot of the snapshot, cloned for every other one
    args: Option<S::Args>,
    fail_fast: bool,
    expired: Option<ExpiredSlot>,
}

impl<S: Signature> Iterator for SlotCalls<S> {
    type Item = S::Output;

    fn next(&mut self) -> Option<S::Output> {
        if self.expired.is_some() {
            return None;
        }
        loop {
            let pending = self.pending.next()?;
            if pending.tracked.iter().any(Tracker::expired) {
                debug!("expired slot skipped and disconnected");
                pending.connection.disconnect();
                if self.fail_fast {
                    self.expired = Some(ExpiredSlot);
                    return None;
                }
                continue;
            }
            let args = if self.pending.as_slice().is_empty() { self.args.take() } else { self.args.clone() };
            return args.map(|args| (pending.function)(args));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.expired.is_some() { (0, Some(0)) } else { (0, Some(self.pending.len())) }
    }
}
