//! In-process storage backend.
//!
//! This is the backend behind the `local` storage kind: state lives in the
//! process and is lost on restart. Single-user and development deployments
//! use it directly; it also serves as the reference implementation of the
//! full [`MediaStorage`] contract, optional surface included.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::key::compose_key;
use crate::model::{AdminConfig, Favorite, PlayRecord, SkipConfig, MAX_SEARCH_HISTORY};
use crate::traits::{Capability, MediaStorage};

/// Mutable store contents, guarded by one lock.
#[derive(Default)]
struct MemoryState {
    /// username -> password
    users: HashMap<String, String>,
    /// username -> composite key -> record
    play_records: HashMap<String, HashMap<String, PlayRecord>>,
    /// username -> composite key -> favorite
    favorites: HashMap<String, HashMap<String, Favorite>>,
    /// username -> composite key -> skip config
    skip_configs: HashMap<String, HashMap<String, SkipConfig>>,
    /// username -> keywords, most recent first
    search_history: HashMap<String, Vec<String>>,
    admin_config: Option<AdminConfig>,
}

/// Process-local storage backend.
#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    /// Create an empty in-process store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaStorage for MemoryStorage {
    async fn get_play_record(&self, user: &str, key: &str) -> Result<Option<PlayRecord>> {
        let state = self.state.read();
        Ok(state
            .play_records
            .get(user)
            .and_then(|records| records.get(key))
            .cloned())
    }

    async fn save_play_record(&self, user: &str, key: &str, record: &PlayRecord) -> Result<()> {
        debug!(user, key, "saving play record");
        let mut state = self.state.write();
        state
            .play_records
            .entry(user.to_string())
            .or_default()
            .insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn delete_play_record(&self, user: &str, key: &str) -> Result<()> {
        let mut state = self.state.write();
        if let Some(records) = state.play_records.get_mut(user) {
            records.remove(key);
        }
        Ok(())
    }

    async fn get_all_play_records(&self, user: &str) -> Result<HashMap<String, PlayRecord>> {
        let state = self.state.read();
        Ok(state.play_records.get(user).cloned().unwrap_or_default())
    }

    async fn get_favorite(&self, user: &str, key: &str) -> Result<Option<Favorite>> {
        let state = self.state.read();
        Ok(state
            .favorites
            .get(user)
            .and_then(|favorites| favorites.get(key))
            .cloned())
    }

    async fn save_favorite(&self, user: &str, key: &str, favorite: &Favorite) -> Result<()> {
        debug!(user, key, "saving favorite");
        let mut state = self.state.write();
        state
            .favorites
            .entry(user.to_string())
            .or_default()
            .insert(key.to_string(), favorite.clone());
        Ok(())
    }

    async fn delete_favorite(&self, user: &str, key: &str) -> Result<()> {
        let mut state = self.state.write();
        if let Some(favorites) = state.favorites.get_mut(user) {
            favorites.remove(key);
        }
        Ok(())
    }

    async fn get_all_favorites(&self, user: &str) -> Result<HashMap<String, Favorite>> {
        let state = self.state.read();
        Ok(state.favorites.get(user).cloned().unwrap_or_default())
    }

    async fn register_user(&self, user: &str, password: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.users.contains_key(user) {
            return Err(StorageError::AlreadyExists(user.to_string()));
        }
        debug!(user, "registering user");
        state.users.insert(user.to_string(), password.to_string());
        Ok(())
    }

    async fn verify_user(&self, user: &str, password: &str) -> Result<bool> {
        let state = self.state.read();
        Ok(state.users.get(user).is_some_and(|stored| stored == password))
    }

    async fn check_user_exist(&self, user: &str) -> Result<bool> {
        let state = self.state.read();
        Ok(state.users.contains_key(user))
    }

    async fn change_password(&self, user: &str, new_password: &str) -> Result<()> {
        let mut state = self.state.write();
        match state.users.get_mut(user) {
            Some(password) => {
                *password = new_password.to_string();
                Ok(())
            }
            None => Err(StorageError::NotFound(user.to_string())),
        }
    }

    async fn delete_user(&self, user: &str) -> Result<()> {
        debug!(user, "deleting user and owned data");
        let mut state = self.state.write();
        state.users.remove(user);
        state.play_records.remove(user);
        state.favorites.remove(user);
        state.skip_configs.remove(user);
        state.search_history.remove(user);
        Ok(())
    }

    async fn get_search_history(&self, user: &str) -> Result<Vec<String>> {
        let state = self.state.read();
        Ok(state.search_history.get(user).cloned().unwrap_or_default())
    }

    async fn add_search_history(&self, user: &str, keyword: &str) -> Result<()> {
        let mut state = self.state.write();
        let history = state.search_history.entry(user.to_string()).or_default();
        history.retain(|existing| existing != keyword);
        history.insert(0, keyword.to_string());
        history.truncate(MAX_SEARCH_HISTORY);
        Ok(())
    }

    async fn delete_search_history(&self, user: &str, keyword: Option<&str>) -> Result<()> {
        let mut state = self.state.write();
        match keyword {
            Some(keyword) => {
                if let Some(history) = state.search_history.get_mut(user) {
                    history.retain(|existing| existing != keyword);
                }
            }
            None => {
                state.search_history.remove(user);
            }
        }
        Ok(())
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    async fn get_all_users(&self) -> Result<Vec<String>> {
        let state = self.state.read();
        let mut users: Vec<String> = state.users.keys().cloned().collect();
        users.sort();
        Ok(users)
    }

    async fn get_admin_config(&self) -> Result<Option<AdminConfig>> {
        let state = self.state.read();
        Ok(state.admin_config.clone())
    }

    async fn set_admin_config(&self, config: &AdminConfig) -> Result<()> {
        debug!("saving admin config");
        let mut state = self.state.write();
        state.admin_config = Some(config.clone());
        Ok(())
    }

    async fn get_skip_config(
        &self,
        user: &str,
        source: &str,
        id: &str,
    ) -> Result<Option<SkipConfig>> {
        let key = compose_key(source, id);
        let state = self.state.read();
        Ok(state
            .skip_configs
            .get(user)
            .and_then(|configs| configs.get(&key))
            .cloned())
    }

    async fn set_skip_config(
        &self,
        user: &str,
        source: &str,
        id: &str,
        config: &SkipConfig,
    ) -> Result<()> {
        let key = compose_key(source, id);
        debug!(user, key = %key, "saving skip config");
        let mut state = self.state.write();
        state
            .skip_configs
            .entry(user.to_string())
            .or_default()
            .insert(key, config.clone());
        Ok(())
    }

    async fn delete_skip_config(&self, user: &str, source: &str, id: &str) -> Result<()> {
        let key = compose_key(source, id);
        let mut state = self.state.write();
        if let Some(configs) = state.skip_configs.get_mut(user) {
            configs.remove(&key);
        }
        Ok(())
    }

    async fn get_all_skip_configs(&self, user: &str) -> Result<HashMap<String, SkipConfig>> {
        let state = self.state.read();
        Ok(state.skip_configs.get(user).cloned().unwrap_or_default())
    }

    async fn clear_all_data(&self) -> Result<()> {
        debug!("clearing all data");
        let mut state = self.state.write();
        *state = MemoryState::default();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(title: &str) -> PlayRecord {
        PlayRecord {
            title: title.to_string(),
            source_name: "provider-a".to_string(),
            cover: String::new(),
            year: "2020".to_string(),
            index: 1,
            total_episodes: 10,
            play_time: 60,
            total_time: 2400,
            saved_at: Utc::now(),
            search_title: None,
        }
    }

    fn favorite(title: &str) -> Favorite {
        Favorite {
            title: title.to_string(),
            source_name: "provider-a".to_string(),
            cover: String::new(),
            year: "2020".to_string(),
            total_episodes: 10,
            saved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_play_record_crud() {
        let storage = MemoryStorage::new();
        let rec = record("Cosmos");

        assert_eq!(storage.get_play_record("alice", "a+1").await.unwrap(), None);

        storage.save_play_record("alice", "a+1", &rec).await.unwrap();
        assert_eq!(
            storage.get_play_record("alice", "a+1").await.unwrap(),
            Some(rec.clone())
        );

        // Records are scoped per user.
        assert_eq!(storage.get_play_record("bob", "a+1").await.unwrap(), None);

        let all = storage.get_all_play_records("alice").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.get("a+1"), Some(&rec));

        storage.delete_play_record("alice", "a+1").await.unwrap();
        assert_eq!(storage.get_play_record("alice", "a+1").await.unwrap(), None);

        // Deleting again is a no-op.
        storage.delete_play_record("alice", "a+1").await.unwrap();
    }

    #[tokio::test]
    async fn test_favorite_crud() {
        let storage = MemoryStorage::new();
        let fav = favorite("Cosmos");

        storage.save_favorite("alice", "a+1", &fav).await.unwrap();
        assert_eq!(
            storage.get_favorite("alice", "a+1").await.unwrap(),
            Some(fav)
        );

        storage.delete_favorite("alice", "a+1").await.unwrap();
        assert_eq!(storage.get_favorite("alice", "a+1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let storage = MemoryStorage::new();

        assert!(!storage.check_user_exist("alice").await.unwrap());
        storage.register_user("alice", "secret").await.unwrap();
        assert!(storage.check_user_exist("alice").await.unwrap());

        // Usernames are unique.
        let err = storage.register_user("alice", "other").await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        assert!(storage.verify_user("alice", "secret").await.unwrap());
        assert!(!storage.verify_user("alice", "wrong").await.unwrap());
        assert!(!storage.verify_user("nobody", "secret").await.unwrap());

        storage.change_password("alice", "rotated").await.unwrap();
        assert!(storage.verify_user("alice", "rotated").await.unwrap());
        assert!(!storage.verify_user("alice", "secret").await.unwrap());

        let err = storage.change_password("nobody", "x").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_user_drops_owned_data() {
        let storage = MemoryStorage::new();
        storage.register_user("alice", "secret").await.unwrap();
        storage
            .save_play_record("alice", "a+1", &record("Cosmos"))
            .await
            .unwrap();
        storage
            .save_favorite("alice", "a+1", &favorite("Cosmos"))
            .await
            .unwrap();
        storage.add_search_history("alice", "cosmos").await.unwrap();

        storage.delete_user("alice").await.unwrap();

        assert!(!storage.check_user_exist("alice").await.unwrap());
        assert!(storage
            .get_all_play_records("alice")
            .await
            .unwrap()
            .is_empty());
        assert!(storage.get_all_favorites("alice").await.unwrap().is_empty());
        assert!(storage.get_search_history("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_history_order_dedupe_cap() {
        let storage = MemoryStorage::new();

        storage.add_search_history("alice", "first").await.unwrap();
        storage.add_search_history("alice", "second").await.unwrap();
        storage.add_search_history("alice", "first").await.unwrap();

        // Re-searching moves the keyword to the front without duplicating it.
        assert_eq!(
            storage.get_search_history("alice").await.unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );

        for i in 0..MAX_SEARCH_HISTORY + 5 {
            storage
                .add_search_history("alice", &format!("kw{}", i))
                .await
                .unwrap();
        }
        let history = storage.get_search_history("alice").await.unwrap();
        assert_eq!(history.len(), MAX_SEARCH_HISTORY);
        assert_eq!(history[0], format!("kw{}", MAX_SEARCH_HISTORY + 4));

        storage
            .delete_search_history("alice", Some(&history[0]))
            .await
            .unwrap();
        assert_eq!(
            storage.get_search_history("alice").await.unwrap().len(),
            MAX_SEARCH_HISTORY - 1
        );

        storage.delete_search_history("alice", None).await.unwrap();
        assert!(storage.get_search_history("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skip_config_uses_disaggregated_identity() {
        let storage = MemoryStorage::new();
        let skip = SkipConfig {
            enable: true,
            intro_time: 90,
            outro_time: 2580,
        };

        storage
            .set_skip_config("alice", "provider-a", "42", &skip)
            .await
            .unwrap();
        assert_eq!(
            storage
                .get_skip_config("alice", "provider-a", "42")
                .await
                .unwrap(),
            Some(skip.clone())
        );

        let all = storage.get_all_skip_configs("alice").await.unwrap();
        assert_eq!(all.get("provider-a+42"), Some(&skip));

        storage
            .delete_skip_config("alice", "provider-a", "42")
            .await
            .unwrap();
        assert_eq!(
            storage
                .get_skip_config("alice", "provider-a", "42")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_admin_config_and_clear() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get_admin_config().await.unwrap(), None);
        let config = AdminConfig {
            announcement: "maintenance tonight".to_string(),
            ..AdminConfig::default()
        };
        storage.set_admin_config(&config).await.unwrap();
        assert_eq!(storage.get_admin_config().await.unwrap(), Some(config));

        storage.register_user("alice", "secret").await.unwrap();
        storage.clear_all_data().await.unwrap();
        assert_eq!(storage.get_admin_config().await.unwrap(), None);
        assert!(storage.get_all_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_users_sorted() {
        let storage = MemoryStorage::new();
        storage.register_user("carol", "pw").await.unwrap();
        storage.register_user("alice", "pw").await.unwrap();
        storage.register_user("bob", "pw").await.unwrap();

        assert_eq!(
            storage.get_all_users().await.unwrap(),
            vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]
        );
    }
}
