use std::sync::{Arc, Mutex};
use tracing::warn;

use super::{Session, SessionStorage};

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`]; pass it back to
/// [`SessionStore::unsubscribe`] to deregister the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Process-wide holder of the current authentication session.
///
/// The store is the single entry point for session reads and writes. Every
/// mutation replaces the session as a whole, persists it, and synchronously
/// notifies subscribers in registration order.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    current: Mutex<Session>,
    registry: Mutex<Registry>,
}

impl SessionStore {
    /// Open the store, hydrating from durable storage. A missing, malformed,
    /// or invariant-violating persisted value hydrates as unauthenticated.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let initial = match storage.load() {
            Ok(Some(session)) if session.is_valid() => session,
            Ok(Some(_)) => {
                warn!("Persisted session violates invariants, starting unauthenticated");
                Session::anonymous()
            }
            Ok(None) => Session::anonymous(),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session, starting unauthenticated");
                Session::anonymous()
            }
        };

        Self {
            storage,
            current: Mutex::new(initial),
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Snapshot of the current session
    pub fn get(&self) -> Session {
        self.current.lock().unwrap().clone()
    }

    /// Register a listener invoked with the new session on every mutation,
    /// in registration order.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        SubscriptionId(id)
    }

    /// Deregister a listener. Safe to call from inside a listener: a listener
    /// removed mid-delivery is not called again in that pass.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut registry = self.registry.lock().unwrap();
        registry.listeners.retain(|(existing, _)| *existing != id.0);
    }

    /// Replace the session, persist it, and notify all currently-registered
    /// listeners once each, in order. Each call runs its own full notification
    /// pass. Persistence failure is non-fatal: the in-memory state still
    /// updates and listeners still fire.
    pub fn set(&self, next: Session) {
        {
            let mut current = self.current.lock().unwrap();
            *current = next.clone();
        }

        if let Err(e) = self.storage.save(&next) {
            warn!(error = %e, "Failed to persist session; in-memory state updated anyway");
        }

        let snapshot: Vec<(u64, Listener)> = self.registry.lock().unwrap().listeners.clone();
        for (id, listener) in snapshot {
            // The registry lock is not held across the callback, so listeners
            // may subscribe or unsubscribe during delivery.
            let still_registered = self
                .registry
                .lock()
                .unwrap()
                .listeners
                .iter()
                .any(|(existing, _)| *existing == id);
            if still_registered {
                listener(&next);
            }
        }
    }
}
