//! Pending operation queue.
//!
//! An ordered list of not-yet-acknowledged remote mutations, persisted
//! through the local store after every change so it survives process
//! restarts. Drained best-effort in enqueue order; each confirmed item
//! is removed individually, so partial drains are valid.

use tempo_storage::LocalStore;
use tempo_types::{PendingAction, PendingOperation};
use tracing::debug;

const PENDING_OPS_KEY: &str = "sync.pending_ops";

/// Durable queue of remote mutations awaiting acknowledgment.
pub struct PendingQueue {
    store: LocalStore,
    ops: Vec<PendingOperation>,
}

impl PendingQueue {
    /// Loads the persisted queue (empty when none survives).
    pub fn load(store: LocalStore) -> Self {
        let ops: Vec<PendingOperation> = store.get(PENDING_OPS_KEY, Vec::new());
        if !ops.is_empty() {
            debug!("restored {} pending operations from local store", ops.len());
        }
        Self { store, ops }
    }

    /// Appends an operation and persists. A push matching an existing
    /// `(id, action)` pair is dropped; the queue keeps one entry per
    /// pair in steady state and replay is idempotent anyway.
    pub fn push(&mut self, op: PendingOperation) {
        if self
            .ops
            .iter()
            .any(|existing| existing.id == op.id && existing.action == op.action)
        {
            debug!("pending {} for {} already queued, skipping", op.action, op.id);
            return;
        }
        self.ops.push(op);
        self.persist();
    }

    /// The queue contents in enqueue order.
    pub fn snapshot(&self) -> Vec<PendingOperation> {
        self.ops.clone()
    }

    /// Removes every entry matching `(id, action)` and persists.
    pub fn remove(&mut self, id: &str, action: PendingAction) {
        let before = self.ops.len();
        self.ops.retain(|op| !(op.id == id && op.action == action));
        if self.ops.len() != before {
            self.persist();
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn persist(&self) {
        // LocalStore absorbs write failures; a lost persist costs
        // durability across restart, not correctness within the run.
        self.store.set(PENDING_OPS_KEY, &self.ops);
    }
}
