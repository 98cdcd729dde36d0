//! Tiered history sync engine for tempo.
//!
//! Keeps a per-user history of timed sessions consistent between an
//! always-available local cache and a remote record store:
//! - Offline-first writes (local cache lands and notifies before any
//!   network I/O)
//! - Durable pending-operation queue replayed on reconnect, made safe
//!   through idempotent upserts
//! - One-time migration of local-only records on first login
//! - Sync-status and history-change fan-out for the UI
//!
//! The remote store is the eventual source of truth for a logged-in
//! user; local writes stay authoritative until explicitly refreshed.

pub mod codec;
pub mod config;
pub mod error;
pub mod listeners;
pub mod migration;
pub mod queue;
pub mod remote;
pub mod service;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use remote::{HttpRecordStore, RecordStore, RemoteRecord};
pub use service::SyncService;
