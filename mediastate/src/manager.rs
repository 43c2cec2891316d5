//! The storage facade.
//!
//! [`StorageManager`] is the single entry point for every per-user media
//! state operation. It owns the one backend the process talks to: the
//! backend is constructed lazily on first use, the construction future
//! itself is memoized, and every caller — concurrent or later — attaches to
//! that same construction. Success and failure are both cached for the
//! process lifetime.
//!
//! Construct one manager at startup and pass it by reference (it is `Clone`
//! and cheap to clone; clones share the same backend).
//!
//! # Forwarding
//!
//! Record and favorite operations compose the storage key from
//! `(source, id)` before forwarding; skip-config operations pass `source`
//! and `id` through disaggregated. Backend errors propagate unchanged — no
//! retries, no translation. Operations the backend does not implement
//! resolve to benign defaults as documented per method, except
//! [`StorageManager::clear_all_data`], which refuses loudly.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use tracing::debug;

use mediastate_storage::{
    compose_key, AdminConfig, CapabilitySet, Favorite, MediaStorage, PlayRecord, Result,
    SkipConfig, StorageError,
};

use crate::config::{FallbackPolicy, StorageKind};
use crate::select::{select_remote, BackendProvider};

/// Selection inputs for [`StorageManager::new`].
#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Configured storage kind
    pub kind: StorageKind,
    /// Substitution table for kinds the deployment cannot reach
    pub policy: FallbackPolicy,
}

impl StorageOptions {
    /// Options for a kind, with no substitutions.
    pub fn new(kind: StorageKind) -> Self {
        Self {
            kind,
            policy: FallbackPolicy::direct(),
        }
    }

    /// Options read from the environment, with no substitutions.
    pub fn from_env() -> Self {
        Self::new(StorageKind::from_env())
    }

    /// Replace the fallback policy.
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self::new(StorageKind::Local)
    }
}

/// The constructed backend with its capabilities resolved once.
#[derive(Clone)]
struct ActiveBackend {
    storage: Arc<dyn MediaStorage>,
    capabilities: CapabilitySet,
}

type ConstructFuture = Shared<BoxFuture<'static, std::result::Result<ActiveBackend, Arc<StorageError>>>>;

/// Facade over the process's one storage backend.
#[derive(Clone)]
pub struct StorageManager {
    backend: ConstructFuture,
}

impl StorageManager {
    /// Create a manager that selects and constructs its backend on first
    /// use.
    ///
    /// Construction runs at most once; its outcome (including failure) is
    /// shared by all callers. A failed construction surfaces as
    /// [`StorageError::Init`] on every subsequent call.
    pub fn new(options: StorageOptions, provider: Arc<dyn BackendProvider>) -> Self {
        let backend = async move {
            let storage =
                match select_remote(options.kind, &options.policy, provider.as_ref()).await? {
                    Some(remote) => remote,
                    None => provider.local().ok_or_else(|| {
                        StorageError::Config(format!(
                            "storage kind '{}' requires an in-process backend from the provider",
                            options.kind
                        ))
                    })?,
                };
            let capabilities = CapabilitySet::probe(storage.as_ref());
            debug!(backend = storage.backend_name(), "storage backend ready");
            Ok(ActiveBackend {
                storage,
                capabilities,
            })
        }
        .map_err(Arc::new)
        .boxed()
        .shared();
        Self { backend }
    }

    /// Create a manager over an already-constructed backend.
    pub fn with_backend(storage: Arc<dyn MediaStorage>) -> Self {
        let capabilities = CapabilitySet::probe(storage.as_ref());
        let active = ActiveBackend {
            storage,
            capabilities,
        };
        Self {
            backend: async move { Ok(active) }.boxed().shared(),
        }
    }

    /// Await the memoized backend.
    async fn active(&self) -> Result<ActiveBackend> {
        self.backend.clone().await.map_err(StorageError::Init)
    }

    /// Name of the active backend.
    pub async fn backend_name(&self) -> Result<&'static str> {
        Ok(self.active().await?.storage.backend_name())
    }

    // -- play records -------------------------------------------------------

    /// Get the play record for `(user, source, id)`.
    pub async fn get_play_record(
        &self,
        user: &str,
        source: &str,
        id: &str,
    ) -> Result<Option<PlayRecord>> {
        let active = self.active().await?;
        active
            .storage
            .get_play_record(user, &compose_key(source, id))
            .await
    }

    /// Insert or overwrite the play record for `(user, source, id)`.
    pub async fn save_play_record(
        &self,
        user: &str,
        source: &str,
        id: &str,
        record: &PlayRecord,
    ) -> Result<()> {
        let active = self.active().await?;
        active
            .storage
            .save_play_record(user, &compose_key(source, id), record)
            .await
    }

    /// Delete the play record for `(user, source, id)`.
    pub async fn delete_play_record(&self, user: &str, source: &str, id: &str) -> Result<()> {
        let active = self.active().await?;
        active
            .storage
            .delete_play_record(user, &compose_key(source, id))
            .await
    }

    /// All play records for a user, keyed by composite key.
    pub async fn get_all_play_records(&self, user: &str) -> Result<HashMap<String, PlayRecord>> {
        let active = self.active().await?;
        active.storage.get_all_play_records(user).await
    }

    // -- favorites ----------------------------------------------------------

    /// Get the favorite for `(user, source, id)`.
    pub async fn get_favorite(
        &self,
        user: &str,
        source: &str,
        id: &str,
    ) -> Result<Option<Favorite>> {
        let active = self.active().await?;
        active
            .storage
            .get_favorite(user, &compose_key(source, id))
            .await
    }

    /// Insert or overwrite the favorite for `(user, source, id)`.
    pub async fn save_favorite(
        &self,
        user: &str,
        source: &str,
        id: &str,
        favorite: &Favorite,
    ) -> Result<()> {
        let active = self.active().await?;
        active
            .storage
            .save_favorite(user, &compose_key(source, id), favorite)
            .await
    }

    /// Delete the favorite for `(user, source, id)`.
    pub async fn delete_favorite(&self, user: &str, source: &str, id: &str) -> Result<()> {
        let active = self.active().await?;
        active
            .storage
            .delete_favorite(user, &compose_key(source, id))
            .await
    }

    /// All favorites for a user, keyed by composite key.
    pub async fn get_all_favorites(&self, user: &str) -> Result<HashMap<String, Favorite>> {
        let active = self.active().await?;
        active.storage.get_all_favorites(user).await
    }

    /// Whether `(user, source, id)` has a favorite saved.
    pub async fn is_favorited(&self, user: &str, source: &str, id: &str) -> Result<bool> {
        Ok(self.get_favorite(user, source, id).await?.is_some())
    }

    // -- users --------------------------------------------------------------

    /// Register a new user. Fails with
    /// [`StorageError::AlreadyExists`] if the username is taken.
    pub async fn register_user(&self, user: &str, password: &str) -> Result<()> {
        let active = self.active().await?;
        active.storage.register_user(user, password).await
    }

    /// Check a credential pair.
    pub async fn verify_user(&self, user: &str, password: &str) -> Result<bool> {
        let active = self.active().await?;
        active.storage.verify_user(user, password).await
    }

    /// Whether a username is registered.
    pub async fn check_user_exist(&self, user: &str) -> Result<bool> {
        let active = self.active().await?;
        active.storage.check_user_exist(user).await
    }

    /// Replace a user's password.
    pub async fn change_password(&self, user: &str, new_password: &str) -> Result<()> {
        let active = self.active().await?;
        active.storage.change_password(user, new_password).await
    }

    /// Delete a user and everything stored under that user.
    pub async fn delete_user(&self, user: &str) -> Result<()> {
        let active = self.active().await?;
        active.storage.delete_user(user).await
    }

    /// All registered usernames. Empty when the backend cannot enumerate
    /// users.
    pub async fn get_all_users(&self) -> Result<Vec<String>> {
        let active = self.active().await?;
        if !active.capabilities.user_list {
            return Ok(Vec::new());
        }
        active.storage.get_all_users().await
    }

    // -- search history -----------------------------------------------------

    /// Search history for a user, most recent first.
    pub async fn get_search_history(&self, user: &str) -> Result<Vec<String>> {
        let active = self.active().await?;
        active.storage.get_search_history(user).await
    }

    /// Record a searched keyword.
    pub async fn add_search_history(&self, user: &str, keyword: &str) -> Result<()> {
        let active = self.active().await?;
        active.storage.add_search_history(user, keyword).await
    }

    /// Delete one keyword, or the whole history when `keyword` is `None`.
    pub async fn delete_search_history(&self, user: &str, keyword: Option<&str>) -> Result<()> {
        let active = self.active().await?;
        active.storage.delete_search_history(user, keyword).await
    }

    // -- admin config -------------------------------------------------------

    /// The process-wide admin config. `None` when none has been saved or
    /// when the backend does not store one.
    pub async fn get_admin_config(&self) -> Result<Option<AdminConfig>> {
        let active = self.active().await?;
        if !active.capabilities.admin_config {
            return Ok(None);
        }
        active.storage.get_admin_config().await
    }

    /// Replace the process-wide admin config. Silently does nothing when
    /// the backend does not store one.
    pub async fn set_admin_config(&self, config: &AdminConfig) -> Result<()> {
        let active = self.active().await?;
        if !active.capabilities.admin_config {
            return Ok(());
        }
        active.storage.set_admin_config(config).await
    }

    // -- skip configs -------------------------------------------------------

    /// Skip config for `(user, source, id)`. `None` when absent or when the
    /// backend does not store skip configs.
    pub async fn get_skip_config(
        &self,
        user: &str,
        source: &str,
        id: &str,
    ) -> Result<Option<SkipConfig>> {
        let active = self.active().await?;
        if !active.capabilities.skip_config {
            return Ok(None);
        }
        active.storage.get_skip_config(user, source, id).await
    }

    /// Insert or overwrite a skip config. No-op when the backend does not
    /// store skip configs.
    pub async fn set_skip_config(
        &self,
        user: &str,
        source: &str,
        id: &str,
        config: &SkipConfig,
    ) -> Result<()> {
        let active = self.active().await?;
        if !active.capabilities.skip_config {
            return Ok(());
        }
        active
            .storage
            .set_skip_config(user, source, id, config)
            .await
    }

    /// Delete a skip config. No-op when the backend does not store skip
    /// configs.
    pub async fn delete_skip_config(&self, user: &str, source: &str, id: &str) -> Result<()> {
        let active = self.active().await?;
        if !active.capabilities.skip_config {
            return Ok(());
        }
        active.storage.delete_skip_config(user, source, id).await
    }

    /// All skip configs for a user, keyed by `source+id`. Empty when the
    /// backend does not store skip configs.
    pub async fn get_all_skip_configs(&self, user: &str) -> Result<HashMap<String, SkipConfig>> {
        let active = self.active().await?;
        if !active.capabilities.skip_config {
            return Ok(HashMap::new());
        }
        active.storage.get_all_skip_configs(user).await
    }

    // -- maintenance --------------------------------------------------------

    /// Drop every record in the store.
    ///
    /// # Errors
    ///
    /// Unlike the other optional operations, an unsupported backend fails
    /// loudly with [`StorageError::Unsupported`] — destructive intent never
    /// resolves to a silent no-op.
    pub async fn clear_all_data(&self) -> Result<()> {
        let active = self.active().await?;
        if !active.capabilities.data_reset {
            return Err(StorageError::Unsupported("clear_all_data"));
        }
        active.storage.clear_all_data().await
    }
}
