//! Core storage trait definitions.
//!
//! The [`MediaStorage`] trait is the contract every backend (in-process
//! memory, Redis-compatible remote stores) satisfies. It is split into a
//! required surface — play records, favorites, users, search history — and
//! an optional surface that a backend opts into by overriding both
//! [`MediaStorage::supports`] and the corresponding default methods.
//!
//! Callers that need to branch on optional operations should resolve a
//! [`CapabilitySet`] once per backend instance rather than querying
//! [`MediaStorage::supports`] on every call.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Result, StorageError};
use crate::model::{AdminConfig, Favorite, PlayRecord, SkipConfig};

/// Optional backend capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Enumerating all registered usernames
    UserList,
    /// Reading and writing the process-wide admin config
    AdminConfig,
    /// Per-content skip interval storage
    SkipConfig,
    /// Destructive whole-store reset
    DataReset,
}

/// Snapshot of a backend's optional capabilities.
///
/// Resolved once per backend instance via [`CapabilitySet::probe`]; the
/// answers are fixed for the lifetime of the backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilitySet {
    /// Backend can enumerate all users
    pub user_list: bool,
    /// Backend stores the admin config
    pub admin_config: bool,
    /// Backend stores skip configs
    pub skip_config: bool,
    /// Backend can clear all data
    pub data_reset: bool,
}

impl CapabilitySet {
    /// Query the backend once for every optional capability.
    pub fn probe(backend: &dyn MediaStorage) -> Self {
        Self {
            user_list: backend.supports(Capability::UserList),
            admin_config: backend.supports(Capability::AdminConfig),
            skip_config: backend.supports(Capability::SkipConfig),
            data_reset: backend.supports(Capability::DataReset),
        }
    }
}

/// Unified contract for all mediastate backends.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; the facade shares one
/// instance across concurrent async tasks and does not serialize calls.
///
/// # Keys
///
/// `key` arguments are composite keys produced by
/// [`compose_key`](crate::key::compose_key). Skip-config operations are the
/// exception: they receive `source` and `id` disaggregated and the backend
/// owns their combination.
///
/// # Optional operations
///
/// The default bodies of the optional methods return
/// [`StorageError::Unsupported`]. A backend implementing one must override
/// [`MediaStorage::supports`] for the matching [`Capability`] as well, or
/// capability-aware callers will never invoke it.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    // -- play records -------------------------------------------------------

    /// Get one play record, or `None` if absent.
    async fn get_play_record(&self, user: &str, key: &str) -> Result<Option<PlayRecord>>;

    /// Insert or overwrite a play record.
    async fn save_play_record(&self, user: &str, key: &str, record: &PlayRecord) -> Result<()>;

    /// Delete a play record. No-op if absent (idempotent).
    async fn delete_play_record(&self, user: &str, key: &str) -> Result<()>;

    /// All play records for a user, keyed by composite key.
    async fn get_all_play_records(&self, user: &str) -> Result<HashMap<String, PlayRecord>>;

    // -- favorites ----------------------------------------------------------

    /// Get one favorite, or `None` if absent.
    async fn get_favorite(&self, user: &str, key: &str) -> Result<Option<Favorite>>;

    /// Insert or overwrite a favorite.
    async fn save_favorite(&self, user: &str, key: &str, favorite: &Favorite) -> Result<()>;

    /// Delete a favorite. No-op if absent (idempotent).
    async fn delete_favorite(&self, user: &str, key: &str) -> Result<()>;

    /// All favorites for a user, keyed by composite key.
    async fn get_all_favorites(&self, user: &str) -> Result<HashMap<String, Favorite>>;

    // -- users --------------------------------------------------------------

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AlreadyExists`] if the username is taken.
    async fn register_user(&self, user: &str, password: &str) -> Result<()>;

    /// Check a credential pair. `false` for unknown users.
    async fn verify_user(&self, user: &str, password: &str) -> Result<bool>;

    /// Whether a username is registered.
    async fn check_user_exist(&self, user: &str) -> Result<bool>;

    /// Replace a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown users.
    async fn change_password(&self, user: &str, new_password: &str) -> Result<()>;

    /// Delete a user and everything stored under that user.
    async fn delete_user(&self, user: &str) -> Result<()>;

    // -- search history -----------------------------------------------------

    /// Search history for a user, most recent first.
    async fn get_search_history(&self, user: &str) -> Result<Vec<String>>;

    /// Record a searched keyword. Re-searching an existing keyword moves it
    /// to the front; the history is bounded by
    /// [`MAX_SEARCH_HISTORY`](crate::model::MAX_SEARCH_HISTORY).
    async fn add_search_history(&self, user: &str, keyword: &str) -> Result<()>;

    /// Delete one keyword, or the whole history when `keyword` is `None`.
    async fn delete_search_history(&self, user: &str, keyword: Option<&str>) -> Result<()>;

    // -- optional surface ---------------------------------------------------

    /// Whether this backend implements the given optional capability.
    fn supports(&self, capability: Capability) -> bool {
        let _ = capability;
        false
    }

    /// All registered usernames. Requires [`Capability::UserList`].
    async fn get_all_users(&self) -> Result<Vec<String>> {
        Err(StorageError::Unsupported("get_all_users"))
    }

    /// The process-wide admin config, or `None` if none has been saved.
    /// Requires [`Capability::AdminConfig`].
    async fn get_admin_config(&self) -> Result<Option<AdminConfig>> {
        Err(StorageError::Unsupported("get_admin_config"))
    }

    /// Replace the process-wide admin config.
    /// Requires [`Capability::AdminConfig`].
    async fn set_admin_config(&self, config: &AdminConfig) -> Result<()> {
        let _ = config;
        Err(StorageError::Unsupported("set_admin_config"))
    }

    /// Skip config for `(user, source, id)`, or `None` if absent.
    /// Requires [`Capability::SkipConfig`].
    async fn get_skip_config(
        &self,
        user: &str,
        source: &str,
        id: &str,
    ) -> Result<Option<SkipConfig>> {
        let _ = (user, source, id);
        Err(StorageError::Unsupported("get_skip_config"))
    }

    /// Insert or overwrite a skip config.
    /// Requires [`Capability::SkipConfig`].
    async fn set_skip_config(
        &self,
        user: &str,
        source: &str,
        id: &str,
        config: &SkipConfig,
    ) -> Result<()> {
        let _ = (user, source, id, config);
        Err(StorageError::Unsupported("set_skip_config"))
    }

    /// Delete a skip config. Requires [`Capability::SkipConfig`].
    async fn delete_skip_config(&self, user: &str, source: &str, id: &str) -> Result<()> {
        let _ = (user, source, id);
        Err(StorageError::Unsupported("delete_skip_config"))
    }

    /// All skip configs for a user, keyed by `source+id`.
    /// Requires [`Capability::SkipConfig`].
    async fn get_all_skip_configs(&self, user: &str) -> Result<HashMap<String, SkipConfig>> {
        let _ = user;
        Err(StorageError::Unsupported("get_all_skip_configs"))
    }

    /// Drop every record in the store. Requires [`Capability::DataReset`].
    async fn clear_all_data(&self) -> Result<()> {
        Err(StorageError::Unsupported("clear_all_data"))
    }

    /// Get a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;
}
