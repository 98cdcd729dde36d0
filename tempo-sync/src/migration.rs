//! One-time migration of local-only records to the remote store.
//!
//! Runs once per `(user, device)` pair, gated by a persisted flag
//! namespaced by user id, so a shared device with multiple accounts
//! migrates each account exactly once.

use crate::codec;
use crate::remote::RecordStore;
use std::collections::HashSet;
use tempo_storage::LocalStore;
use tempo_types::{HistoryRecord, TimerMode};
use tracing::{info, warn};

fn migrated_flag_key(user_id: &str) -> String {
    format!("sync.migrated.{user_id}")
}

/// Copies local records the remote store does not already have, in
/// fixed-size batches, then marks the user migrated on this device.
///
/// The flag is set after attempting all modes even if some batches
/// failed: a transient failure during migration is not re-attempted
/// automatically. Records it missed stay local until a manual resync.
/// Known limitation, accepted in favor of idempotent-insert semantics
/// over retry bookkeeping. Returns the number of records migrated.
pub async fn run(
    store: &LocalStore,
    remote: &dyn RecordStore,
    user_id: &str,
    batch_size: usize,
) -> usize {
    let flag_key = migrated_flag_key(user_id);
    if store.get(&flag_key, false) {
        return 0;
    }

    let mut migrated = 0usize;

    for mode in TimerMode::ALL {
        let local: Vec<HistoryRecord> = store.get(&codec::history_key(mode), Vec::new());
        if local.is_empty() {
            continue;
        }

        let remote_ids: HashSet<String> = match remote.fetch_ids(user_id, mode).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!("migration: failed to fetch remote ids for {mode}: {e}");
                continue;
            }
        };

        let missing: Vec<&HistoryRecord> = local
            .iter()
            .filter(|record| !remote_ids.contains(&record.id))
            .collect();
        if missing.is_empty() {
            continue;
        }

        for chunk in missing.chunks(batch_size) {
            let rows: Vec<_> = chunk
                .iter()
                .map(|record| codec::to_remote(record, user_id))
                .collect();
            match remote.insert_batch(&rows).await {
                Ok(()) => migrated += rows.len(),
                Err(e) => {
                    warn!(
                        "migration: batch of {} records for {mode} failed: {e}",
                        rows.len()
                    );
                }
            }
        }
    }

    store.set(&flag_key, &true);
    info!("migration for user {user_id} complete, {migrated} records copied");
    migrated
}
