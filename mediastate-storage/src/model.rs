//! Entity shapes persisted by storage backends.
//!
//! All entities are plain serde-serializable records; backends choose their
//! own persistence encoding. Play records and favorites are addressed by
//! `(user, composite key)`, skip configs by `(user, source, id)`, search
//! history by user, and the admin config is a single process-wide record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of retained search-history keywords per user.
///
/// Inserts beyond the cap evict the oldest entry.
pub const MAX_SEARCH_HISTORY: usize = 20;

/// Per-user playback progress for one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    /// Content title as shown to the user
    pub title: String,
    /// Human-readable name of the content source
    pub source_name: String,
    /// Cover image URL
    pub cover: String,
    /// Release year
    pub year: String,
    /// Episode currently being played (1-based)
    pub index: u32,
    /// Total number of episodes
    pub total_episodes: u32,
    /// Playback position in seconds
    pub play_time: u64,
    /// Total duration in seconds
    pub total_time: u64,
    /// When this record was last written
    pub saved_at: DateTime<Utc>,
    /// Title to use when re-searching for this content, if it differs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_title: Option<String>,
}

/// Per-user favorite marker for one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    /// Content title
    pub title: String,
    /// Human-readable name of the content source
    pub source_name: String,
    /// Cover image URL
    pub cover: String,
    /// Release year
    pub year: String,
    /// Total number of episodes
    pub total_episodes: u32,
    /// When the favorite was saved
    pub saved_at: DateTime<Utc>,
}

/// Per-user, per-content skip intervals (intro/outro).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipConfig {
    /// Whether skipping is active for this content
    pub enable: bool,
    /// End of the intro in seconds from the start of an episode
    pub intro_time: u64,
    /// Start of the outro in seconds from the start of an episode
    pub outro_time: u64,
}

/// Process-wide site configuration, not scoped to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Site display name
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Announcement banner text
    #[serde(default)]
    pub announcement: String,
    /// Whether self-service registration is open
    #[serde(default = "default_true")]
    pub enable_register: bool,
    /// Whether cover images are fetched through the site image proxy
    #[serde(default)]
    pub image_proxy: bool,
}

fn default_site_name() -> String {
    "MediaState".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            announcement: String::new(),
            enable_register: true,
            image_proxy: false,
        }
    }
}

/// Credential record. Usernames are unique across the system.
///
/// The password is stored as provided; credential-at-rest hardening is the
/// backend's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique username
    pub username: String,
    /// Password as provided at registration
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PlayRecord {
        PlayRecord {
            title: "Cosmos".to_string(),
            source_name: "provider-a".to_string(),
            cover: "https://img.example/cosmos.jpg".to_string(),
            year: "2014".to_string(),
            index: 3,
            total_episodes: 13,
            play_time: 1245,
            total_time: 2700,
            saved_at: Utc::now(),
            search_title: None,
        }
    }

    #[test]
    fn test_play_record_json_shape() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["title"], "Cosmos");
        assert_eq!(json["total_episodes"], 13);
        // Absent search_title is omitted from the wire shape entirely.
        assert!(json.get("search_title").is_none());
    }

    #[test]
    fn test_admin_config_defaults() {
        let config = AdminConfig::default();
        assert_eq!(config.site_name, "MediaState");
        assert!(config.enable_register);
        assert!(!config.image_proxy);

        // Missing fields fall back to the same defaults when deserializing.
        let parsed: AdminConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_skip_config_roundtrip() {
        let skip = SkipConfig {
            enable: true,
            intro_time: 90,
            outro_time: 2580,
        };
        let json = serde_json::to_string(&skip).unwrap();
        let back: SkipConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, skip);
    }
}
