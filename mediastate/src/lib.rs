//! Per-user media state behind one pluggable storage backend.
//!
//! The process picks its backend once, from a single configuration value,
//! and every domain operation — play records, favorites, skip configs,
//! search history, users, admin config — goes through one
//! [`StorageManager`] facade that forwards to it.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use mediastate::{MemoryProvider, StorageManager, StorageOptions};
//!
//! # async fn example() -> mediastate::Result<()> {
//! // `local` by default; set MEDIASTATE_STORAGE_TYPE to pick a backend.
//! let manager = StorageManager::new(StorageOptions::from_env(), Arc::new(MemoryProvider::new()));
//!
//! manager.register_user("alice", "secret").await?;
//! manager.add_search_history("alice", "cosmos").await?;
//! assert!(manager.get_play_record("alice", "douban", "1292052").await?.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! Remote deployments implement [`BackendProvider`] to wire in their
//! Redis-compatible store clients and choose a [`FallbackPolicy`] matching
//! what the deployment can reach; the substitution table is explicit and
//! testable on its own.

pub mod config;
pub mod manager;
pub mod select;

pub use config::{FallbackPolicy, Resolution, StorageKind, STORAGE_TYPE_ENV};
pub use manager::{StorageManager, StorageOptions};
pub use select::{select_remote, BackendProvider, MemoryProvider};

// Contract and entity types, re-exported so most applications only depend
// on this crate.
pub use mediastate_storage::{
    compose_key, split_key, AdminConfig, Capability, CapabilitySet, Favorite, MediaStorage,
    MemoryStorage, PlayRecord, Result, SkipConfig, StorageError, User, KEY_DELIMITER,
    MAX_SEARCH_HISTORY,
};
