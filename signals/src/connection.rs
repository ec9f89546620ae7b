use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Identifies one slot entry within its registry.
/// Only unique per registry; connections pair it with the registry they came from.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct SlotId(pub(crate) u64);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Implemented by registries so a connection can remove its entry without knowing the registry's type.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SlotId);
}

/// State shared by a registry entry and every [`Connection`] handed out for it.
/// The `connected` flag is the single source of truth for the entry's liveness.
pub(crate) struct ConnectionState {
    id: SlotId,
    connected: AtomicBool,
    registry: Weak<dyn Detach>,
}

impl ConnectionState {
    pub(crate) fn new(id: SlotId, registry: Weak<dyn Detach>) -> Self { Self { id, connected: AtomicBool::new(true), registry } }

    pub(crate) fn is_connected(&self) -> bool { self.connected.load(Ordering::Acquire) }

    /// Flip the flag without touching the registry. Callers must already hold the registry lock
    /// or have removed the entry themselves.
    pub(crate) fn mark_disconnected(&self) { self.connected.store(false, Ordering::Release) }
}

/// A handle to one connected slot.
///
/// Connections are cheap to clone; all clones refer to the same entry. A default-constructed
/// connection refers to nothing: it is never connected, disconnecting it does nothing,
/// and it compares equal to every other empty connection.
#[derive(Clone, Default)]
pub struct Connection(Option<Arc<ConnectionState>>);

impl Connection {
    pub(crate) fn new(state: Arc<ConnectionState>) -> Self { Self(Some(state)) }

    /// Whether the slot behind this handle is still registered
    pub fn connected(&self) -> bool { self.0.as_ref().is_some_and(|state| state.is_connected()) }

    /// Remove the slot from its registry. Idempotent, and safe to call from inside a running slot:
    /// the invocation in progress keeps its snapshot, later invocations no longer see the slot.
    pub fn disconnect(&self) {
        let Some(state) = &self.0 else { return };
        match state.registry.upgrade() {
            Some(registry) => registry.detach(state.id),
            None => state.mark_disconnected(),
        }
    }

    /// Wrap this connection in a guard that disconnects when dropped
    pub fn scoped(self) -> ScopedConnection { ScopedConnection(self) }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Connection {}

impl std::hash::Hash for Connection {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) { self.0.as_ref().map(|s| Arc::as_ptr(s) as usize).hash(state) }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(state) => f.debug_struct("Connection").field("id", &state.id).field("connected", &state.is_connected()).finish(),
            None => f.write_str("Connection(null)"),
        }
    }
}

/// A connection that disconnects its slot when dropped.
#[derive(Debug, Default)]
pub struct ScopedConnection(Connection);

impl ScopedConnection {
    /// Give up the guard without disconnecting
    pub fn release(mut self) -> Connection { std::mem::take(&mut self.0) }
}

impl std::ops::Deref for ScopedConnection {
    type Target = Connection;
    fn deref(&self) -> &Connection { &self.0 }
}

impl From<Connection> for ScopedConnection {
    fn from(connection: Connection) -> Self { Self(connection) }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) { self.0.disconnect(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<SlotId>>);

    impl Detach for Recorder {
        fn detach(&self, id: SlotId) { self.0.lock().unwrap().push(id); }
    }

    fn connection_for(registry: &Arc<Recorder>, id: u64) -> Connection {
        let weak: Weak<dyn Detach> = Arc::downgrade(registry) as Weak<dyn Detach>;
        Connection::new(Arc::new(ConnectionState::new(SlotId(id), weak)))
    }

    #[test]
    fn test_null_connection() {
        let conn = Connection::default();
        assert!(!conn.connected());
        conn.disconnect();
        assert_eq!(conn, Connection::default());
    }

    #[test]
    fn test_equality_is_identity() {
        let registry = Arc::new(Recorder::default());
        let a = connection_for(&registry, 1);
        let b = connection_for(&registry, 1);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a, Connection::default());
    }

    #[test]
    fn test_disconnect_forwards_to_registry() {
        let registry = Arc::new(Recorder::default());
        let conn = connection_for(&registry, 4);
        conn.disconnect();
        assert_eq!(*registry.0.lock().unwrap(), vec![SlotId(4)]);
    }

    #[test]
    fn test_disconnect_after_registry_dropped() {
        let registry = Arc::new(Recorder::default());
        let conn = connection_for(&registry, 2);
        drop(registry);
        assert!(conn.connected());
        conn.disconnect();
        assert!(!conn.connected());
    }

    #[test]
    fn test_scoped_connection_disconnects_on_drop() {
        let registry = Arc::new(Recorder::default());
        {
            let _guard = connection_for(&registry, 9).scoped();
        }
        assert_eq!(*registry.0.lock().unwrap(), vec![SlotId(9)]);

        let released = connection_for(&registry, 10).scoped().release();
        assert!(released.connected());
        assert_eq!(registry.0.lock().unwrap().len(), 1);
    }
}
