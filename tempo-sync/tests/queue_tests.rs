use tempo_storage::LocalStore;
use tempo_sync::queue::PendingQueue;
use tempo_types::{HistoryRecord, PendingAction, PendingOperation, TimerMode};

fn insert_op(id: &str) -> PendingOperation {
    let mut record = HistoryRecord::new(TimerMode::Stopwatch, 60);
    record.id = id.to_string();
    PendingOperation::insert(record)
}

#[test]
fn starts_empty() {
    let queue = PendingQueue::load(LocalStore::open_in_memory());
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn push_preserves_enqueue_order() {
    let mut queue = PendingQueue::load(LocalStore::open_in_memory());
    queue.push(insert_op("a"));
    queue.push(PendingOperation::delete("b"));
    queue.push(insert_op("c"));

    let ops = queue.snapshot();
    assert_eq!(ops.len(), 3);
    assert_eq!(ops[0].id, "a");
    assert_eq!(ops[1].id, "b");
    assert_eq!(ops[2].id, "c");
}

#[test]
fn push_dedupes_same_id_and_action() {
    let mut queue = PendingQueue::load(LocalStore::open_in_memory());
    queue.push(insert_op("a"));
    queue.push(insert_op("a"));
    assert_eq!(queue.len(), 1);
}

#[test]
fn same_id_different_action_both_kept() {
    let mut queue = PendingQueue::load(LocalStore::open_in_memory());
    queue.push(insert_op("a"));
    queue.push(PendingOperation::delete("a"));
    assert_eq!(queue.len(), 2);
}

#[test]
fn remove_targets_one_pair() {
    let mut queue = PendingQueue::load(LocalStore::open_in_memory());
    queue.push(insert_op("a"));
    queue.push(PendingOperation::delete("a"));
    queue.push(insert_op("b"));

    queue.remove("a", PendingAction::Insert);

    let ops = queue.snapshot();
    assert_eq!(ops.len(), 2);
    assert!(ops.iter().any(|op| op.id == "a" && op.action == PendingAction::Delete));
    assert!(ops.iter().any(|op| op.id == "b"));
}

#[test]
fn remove_missing_is_noop() {
    let mut queue = PendingQueue::load(LocalStore::open_in_memory());
    queue.push(insert_op("a"));
    queue.remove("zzz", PendingAction::Delete);
    assert_eq!(queue.len(), 1);
}

#[test]
fn delete_ops_carry_no_record() {
    let op = PendingOperation::delete("gone");
    assert_eq!(op.action, PendingAction::Delete);
    assert!(op.record.is_none());
}

// ── Durability ───────────────────────────────────────────────────

#[test]
fn survives_reload_from_same_store() {
    let store = LocalStore::open_in_memory();
    {
        let mut queue = PendingQueue::load(store.clone());
        queue.push(insert_op("a"));
        queue.push(PendingOperation::delete("b"));
    }

    let reloaded = PendingQueue::load(store);
    let ops = reloaded.snapshot();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].id, "a");
    assert_eq!(ops[0].action, PendingAction::Insert);
    assert!(ops[0].record.is_some());
    assert_eq!(ops[1].id, "b");
}

#[test]
fn survives_process_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = LocalStore::open(dir.path()).unwrap();
        let mut queue = PendingQueue::load(store);
        queue.push(insert_op("persisted"));
    }

    let store = LocalStore::open(dir.path()).unwrap();
    let queue = PendingQueue::load(store);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.snapshot()[0].id, "persisted");
}

#[test]
fn removal_is_persisted_too() {
    let store = LocalStore::open_in_memory();
    {
        let mut queue = PendingQueue::load(store.clone());
        queue.push(insert_op("a"));
        queue.push(insert_op("b"));
        queue.remove("a", PendingAction::Insert);
    }
    let reloaded = PendingQueue::load(store);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.snapshot()[0].id, "b");
}
