//! Storage backend selection configuration.
//!
//! The backend is chosen by a single process-wide value read once at
//! startup, usually from the `MEDIASTATE_STORAGE_TYPE` environment
//! variable:
//!
//! ```text
//! MEDIASTATE_STORAGE_TYPE=local      # in-process store (default)
//! MEDIASTATE_STORAGE_TYPE=redis     # self-hosted Redis over TCP
//! MEDIASTATE_STORAGE_TYPE=kvrocks   # Kvrocks over the Redis protocol
//! MEDIASTATE_STORAGE_TYPE=upstash   # Upstash over its REST API
//! ```
//!
//! Deployments that cannot open raw TCP connections cannot reach `redis` or
//! `kvrocks`; the [`FallbackPolicy`] table maps each requested kind to the
//! kind that is actually constructed there, so the substitution is explicit
//! and testable rather than buried in selection branches.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Environment variable holding the configured storage kind.
pub const STORAGE_TYPE_ENV: &str = "MEDIASTATE_STORAGE_TYPE";

/// Which storage backend the process uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// In-process store, injected by the embedding application
    Local,
    /// Self-hosted Redis reached over TCP
    Redis,
    /// Kvrocks reached over the Redis wire protocol
    Kvrocks,
    /// Upstash reached over its REST API
    Upstash,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Local => write!(f, "local"),
            StorageKind::Redis => write!(f, "redis"),
            StorageKind::Kvrocks => write!(f, "kvrocks"),
            StorageKind::Upstash => write!(f, "upstash"),
        }
    }
}

impl StorageKind {
    /// Parse a kind from its configuration string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" | "localstorage" => Some(StorageKind::Local),
            "redis" => Some(StorageKind::Redis),
            "kvrocks" => Some(StorageKind::Kvrocks),
            "upstash" => Some(StorageKind::Upstash),
            _ => None,
        }
    }

    /// Read the configured kind from [`STORAGE_TYPE_ENV`].
    ///
    /// Unset or unrecognized values select [`StorageKind::Local`], the
    /// documented default.
    pub fn from_env() -> Self {
        match std::env::var(STORAGE_TYPE_ENV) {
            Ok(value) => Self::from_str(&value).unwrap_or_else(|| {
                debug!(value = %value, "unrecognized storage kind, defaulting to local");
                StorageKind::Local
            }),
            Err(_) => StorageKind::Local,
        }
    }

    /// Whether this kind names a remote store.
    pub fn is_remote(&self) -> bool {
        !matches!(self, StorageKind::Local)
    }
}

/// Outcome of resolving a requested kind against a [`FallbackPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The kind named by configuration
    pub requested: StorageKind,
    /// The kind that will actually be constructed
    pub effective: StorageKind,
    /// True when `effective` differs from `requested`
    pub fell_back: bool,
}

/// Requested-kind → effective-kind substitution table.
///
/// An empty table resolves every kind to itself. Entries substitute kinds
/// that the current deployment cannot reach.
#[derive(Debug, Clone, Default)]
pub struct FallbackPolicy {
    entries: Vec<(StorageKind, StorageKind)>,
}

impl FallbackPolicy {
    /// Policy for deployments with direct TCP connectivity: every kind is
    /// available, nothing is substituted.
    pub fn direct() -> Self {
        Self::default()
    }

    /// Policy for deployments restricted to outbound HTTPS: the TCP kinds
    /// are substituted with their REST-reachable equivalent.
    pub fn rest_only() -> Self {
        Self {
            entries: vec![
                (StorageKind::Redis, StorageKind::Upstash),
                (StorageKind::Kvrocks, StorageKind::Upstash),
            ],
        }
    }

    /// Build a policy from explicit substitution entries.
    pub fn from_entries(entries: Vec<(StorageKind, StorageKind)>) -> Self {
        Self { entries }
    }

    /// Resolve a requested kind. Pure; emits no logs.
    pub fn resolve(&self, requested: StorageKind) -> Resolution {
        let effective = self
            .entries
            .iter()
            .find(|(from, _)| *from == requested)
            .map(|(_, to)| *to)
            .unwrap_or(requested);
        Resolution {
            requested,
            effective,
            fell_back: effective != requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!(StorageKind::from_str("redis"), Some(StorageKind::Redis));
        assert_eq!(StorageKind::from_str("REDIS"), Some(StorageKind::Redis));
        assert_eq!(StorageKind::from_str("upstash"), Some(StorageKind::Upstash));
        assert_eq!(StorageKind::from_str("kvrocks"), Some(StorageKind::Kvrocks));
        assert_eq!(
            StorageKind::from_str("localstorage"),
            Some(StorageKind::Local)
        );
        assert_eq!(StorageKind::from_str("cassandra"), None);
    }

    #[test]
    fn test_kind_display_roundtrip() {
        for kind in [
            StorageKind::Local,
            StorageKind::Redis,
            StorageKind::Kvrocks,
            StorageKind::Upstash,
        ] {
            assert_eq!(StorageKind::from_str(&kind.to_string()), Some(kind));
        }
    }

    #[test]
    fn test_from_env_defaults_to_local() {
        std::env::remove_var(STORAGE_TYPE_ENV);
        assert_eq!(StorageKind::from_env(), StorageKind::Local);

        std::env::set_var(STORAGE_TYPE_ENV, "not-a-backend");
        assert_eq!(StorageKind::from_env(), StorageKind::Local);

        std::env::set_var(STORAGE_TYPE_ENV, "upstash");
        assert_eq!(StorageKind::from_env(), StorageKind::Upstash);
        std::env::remove_var(STORAGE_TYPE_ENV);
    }

    #[test]
    fn test_direct_policy_is_identity() {
        let policy = FallbackPolicy::direct();
        for kind in [StorageKind::Redis, StorageKind::Kvrocks, StorageKind::Upstash] {
            let resolution = policy.resolve(kind);
            assert_eq!(resolution.effective, kind);
            assert!(!resolution.fell_back);
        }
    }

    #[test]
    fn test_rest_only_policy_substitutes_tcp_kinds() {
        let policy = FallbackPolicy::rest_only();

        let redis = policy.resolve(StorageKind::Redis);
        assert_eq!(redis.effective, StorageKind::Upstash);
        assert!(redis.fell_back);

        let kvrocks = policy.resolve(StorageKind::Kvrocks);
        assert_eq!(kvrocks.effective, StorageKind::Upstash);
        assert!(kvrocks.fell_back);

        // Requesting the substitute directly is not a fallback.
        let upstash = policy.resolve(StorageKind::Upstash);
        assert_eq!(upstash.effective, StorageKind::Upstash);
        assert!(!upstash.fell_back);

        // redis and upstash requests end at the same effective kind.
        assert_eq!(redis.effective, upstash.effective);
    }
}
