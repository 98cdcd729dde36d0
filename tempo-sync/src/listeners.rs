//! Listener registries for sync-status and history-change fan-out.
//!
//! Delivery is synchronous, in registration order, to the listeners
//! registered at the moment of emission. The registry is snapshotted
//! before delivery, so a listener added while an event is being
//! delivered does not receive that event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A subscribe/unsubscribe registry delivering events to callbacks.
pub struct ListenerSet<T> {
    inner: Arc<Mutex<Vec<(u64, Callback<T>)>>>,
    next_id: AtomicU64,
}

impl<T> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a callback; the returned handle removes it again.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().unwrap().push((id, Arc::new(callback)));
        Subscription {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Delivers `event` to every currently-registered listener, in
    /// registration order.
    pub fn emit(&self, event: &T) {
        let callbacks: Vec<Callback<T>> = {
            let listeners = self.inner.lock().unwrap();
            listeners.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in callbacks {
            cb(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for removing a registered listener.
///
/// `unsubscribe` is idempotent; dropping the handle without calling it
/// leaves the listener registered.
pub struct Subscription<T> {
    id: u64,
    registry: Arc<Mutex<Vec<(u64, Callback<T>)>>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(&self) {
        self.registry.lock().unwrap().retain(|(id, _)| *id != self.id);
    }
}
