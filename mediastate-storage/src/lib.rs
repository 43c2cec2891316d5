//! Storage contract for per-user media state.
//!
//! This crate defines the [`MediaStorage`] trait that every mediastate
//! backend satisfies — play records, favorites, skip configs, search
//! history, users, and the process-wide admin config — plus the in-process
//! [`MemoryStorage`] backend behind the `local` storage kind. Remote
//! backends (Redis-compatible stores) live with the embedding application;
//! they only need to implement the trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  Facade (mediastate crate)                      │
//! │                      │                          │
//! │                      ▼                          │
//! │            ┌─────────────────┐                  │
//! │            │  MediaStorage   │  ← Unified trait │
//! │            └────────┬────────┘                  │
//! │                     │                           │
//! │        ┌────────────┼────────────┐              │
//! │        ▼            ▼            ▼              │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐         │
//! │  │  Memory  │ │  Redis   │ │ Upstash  │         │
//! │  │ (bundled)│ │(external)│ │(external)│         │
//! │  └──────────┘ └──────────┘ └──────────┘         │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Keys
//!
//! Play records and favorites are addressed by a composite key derived from
//! the content source and item identifiers:
//!
//! ```text
//! source + "+" + id
//!
//! douban+1292052
//! ```
//!
//! Skip configs are the exception — their identity reaches the backend as
//! separate `source` and `id` fields.
//!
//! # Quick Start
//!
//! ```
//! use mediastate_storage::{compose_key, MediaStorage, MemoryStorage};
//!
//! # async fn example() -> mediastate_storage::Result<()> {
//! let storage = MemoryStorage::new();
//!
//! storage.register_user("alice", "secret").await?;
//! assert!(storage.verify_user("alice", "secret").await?);
//!
//! let key = compose_key("douban", "1292052");
//! assert_eq!(storage.get_play_record("alice", &key).await?, None);
//! # Ok(())
//! # }
//! ```
//!
//! # Optional capabilities
//!
//! A backend may omit the optional surface (user enumeration, admin config,
//! skip configs, whole-store reset). Omission is visible through
//! [`MediaStorage::supports`] and through the defaulted trait methods
//! returning [`StorageError::Unsupported`]; callers resolve a
//! [`CapabilitySet`] once per backend instance instead of probing per call.

pub mod error;
pub mod key;
pub mod model;

mod memory;
mod traits;

pub use error::{Result, StorageError};
pub use key::{compose_key, split_key, KEY_DELIMITER};
pub use memory::MemoryStorage;
pub use model::{AdminConfig, Favorite, PlayRecord, SkipConfig, User, MAX_SEARCH_HISTORY};
pub use traits::{Capability, CapabilitySet, MediaStorage};
