//! Checksummed key/value persistence.

use crate::error::StorageResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// On-disk envelope: the serialized payload plus a checksum over it.
#[derive(Serialize, Deserialize)]
struct Envelope {
    checksum: String,
    payload: String,
}

/// Local key/value store with per-entry integrity checking.
///
/// One file per key when opened against a directory; a plain map when
/// opened in memory (tests). Cheap to clone; clones share state.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<Inner>,
}

struct Inner {
    dir: Option<PathBuf>,
    mem: Mutex<HashMap<String, String>>,
}

impl LocalStore {
    /// Opens or creates a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            inner: Arc::new(Inner {
                dir: Some(dir),
                mem: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                dir: None,
                mem: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Reads the value for `key`, returning `default` on missing key,
    /// corrupted payload, or failed checksum. Never fails.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.read_raw(key) {
            Some(raw) => raw,
            None => return default,
        };

        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(env) => env,
            Err(e) => {
                warn!("malformed envelope for key {key}, using default: {e}");
                return default;
            }
        };

        if checksum(&envelope.payload) != envelope.checksum {
            warn!("checksum mismatch for key {key}, using default");
            return default;
        }

        match serde_json::from_str(&envelope.payload) {
            Ok(value) => value,
            Err(e) => {
                warn!("undecodable payload for key {key}, using default: {e}");
                default
            }
        }
    }

    /// Writes the value for `key`. Returns `false` (and logs) on any
    /// failure instead of propagating it.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                warn!("failed to serialize value for key {key}: {e}");
                return false;
            }
        };
        let envelope = Envelope {
            checksum: checksum(&payload),
            payload,
        };
        let raw = match serde_json::to_string(&envelope) {
            Ok(r) => r,
            Err(e) => {
                warn!("failed to serialize envelope for key {key}: {e}");
                return false;
            }
        };

        match &self.inner.dir {
            Some(dir) => {
                let path = dir.join(file_name(key));
                if let Err(e) = std::fs::write(&path, raw) {
                    warn!("failed to write key {key} to {}: {e}", path.display());
                    return false;
                }
                true
            }
            None => {
                self.inner.mem.lock().unwrap().insert(key.to_string(), raw);
                true
            }
        }
    }

    /// Removes `key`. Best-effort; errors are swallowed.
    pub fn remove(&self, key: &str) {
        match &self.inner.dir {
            Some(dir) => {
                let path = dir.join(file_name(key));
                if let Err(e) = std::fs::remove_file(&path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        debug!("failed to remove key {key}: {e}");
                    }
                }
            }
            None => {
                self.inner.mem.lock().unwrap().remove(key);
            }
        }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match &self.inner.dir {
            Some(dir) => {
                let path = dir.join(file_name(key));
                match std::fs::read_to_string(&path) {
                    Ok(raw) => Some(raw),
                    Err(e) => {
                        if e.kind() != std::io::ErrorKind::NotFound {
                            warn!("failed to read key {key}: {e}");
                        }
                        None
                    }
                }
            }
            None => self.inner.mem.lock().unwrap().get(key).cloned(),
        }
    }
}

fn checksum(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// Maps a key to a stable filename. Keys use dotted segments
/// (`history.stopwatch`, `sync.pending_ops`); anything outside
/// `[A-Za-z0-9._-]` is replaced.
fn file_name(key: &str) -> String {
    let safe: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}.json")
}
