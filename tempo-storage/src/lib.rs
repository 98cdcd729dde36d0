//! Integrity-checked local key/value store for tempo.
//!
//! Every value is serialized to JSON and written inside an envelope
//! carrying a SHA-256 checksum of the payload. Reads verify the
//! checksum and fall back to a caller-supplied default on any failure:
//! missing key, unreadable file, malformed envelope, checksum mismatch,
//! or payload that no longer deserializes.
//!
//! This is the one layer that absorbs "storage unavailable". Callers
//! above it never see an error: `get` always returns a value, `set`
//! reports success as a boolean, `remove` is best-effort.

mod error;
mod local_store;

pub use error::{StorageError, StorageResult};
pub use local_store::LocalStore;
