//! Backend selection.
//!
//! [`select_remote`] turns the configured [`StorageKind`] into at most one
//! remote backend: remote kinds are resolved through the
//! [`FallbackPolicy`] and constructed by the [`BackendProvider`], while
//! `local` (and anything unrecognized, which the config layer already
//! collapsed to `local`) yields `None` — the in-process backend is supplied
//! by the provider, never constructed here.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use mediastate_storage::{MediaStorage, MemoryStorage, Result, StorageError};

use crate::config::{FallbackPolicy, StorageKind};

/// Constructs backends for the selector.
///
/// The embedding application implements this to wire in its remote-store
/// clients. `connect` is only ever called with a remote kind, after policy
/// resolution.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    /// Construct (or connect to) the backend for a remote kind.
    async fn connect(&self, kind: StorageKind) -> Result<Arc<dyn MediaStorage>>;

    /// The in-process backend used for [`StorageKind::Local`], if any.
    fn local(&self) -> Option<Arc<dyn MediaStorage>> {
        None
    }
}

/// Provider backed solely by one in-process [`MemoryStorage`].
///
/// The out-of-the-box wiring: `local` works, every remote kind is a
/// configuration error.
pub struct MemoryProvider {
    local: Arc<MemoryStorage>,
}

impl MemoryProvider {
    /// Create a provider with a fresh in-process store.
    pub fn new() -> Self {
        Self {
            local: Arc::new(MemoryStorage::new()),
        }
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendProvider for MemoryProvider {
    async fn connect(&self, kind: StorageKind) -> Result<Arc<dyn MediaStorage>> {
        Err(StorageError::Config(format!(
            "no remote backend configured for storage kind '{}'",
            kind
        )))
    }

    fn local(&self) -> Option<Arc<dyn MediaStorage>> {
        Some(self.local.clone())
    }
}

/// Select and construct the remote backend for the configured kind.
///
/// Returns `Ok(None)` for [`StorageKind::Local`]. For remote kinds the
/// requested kind is first resolved through `policy`; a substitution is
/// logged as a warning before the effective kind is constructed.
/// Construction errors propagate unchanged.
pub async fn select_remote(
    kind: StorageKind,
    policy: &FallbackPolicy,
    provider: &dyn BackendProvider,
) -> Result<Option<Arc<dyn MediaStorage>>> {
    if !kind.is_remote() {
        debug!("storage kind 'local': no remote backend");
        return Ok(None);
    }

    let resolution = policy.resolve(kind);
    if resolution.fell_back {
        warn!(
            requested = %resolution.requested,
            effective = %resolution.effective,
            "storage kind unavailable in this deployment, substituting"
        );
    }

    let backend = provider.connect(resolution.effective).await?;
    debug!(kind = %resolution.effective, backend = backend.backend_name(), "remote backend ready");
    Ok(Some(backend))
}
