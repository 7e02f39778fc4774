use crate::domain::models::{UserPreferences, UserStats};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::supabase_client::{ListOrder, RemoteStore, PARTITION_COLUMN};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const STATS_COLLECTION: &str = "user_stats";
pub const PREFERENCES_COLLECTION: &str = "user_preferences";

// Profile tables hold one row per partition, so any stable column works here.
const SINGLETON_ORDER: ListOrder = ListOrder {
    column: PARTITION_COLUMN,
    ascending: true,
};

/// Singleton-per-account rows: each partition holds at most one stats row
/// and one preferences row, written with upsert semantics.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn load_stats(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
    ) -> Result<Option<UserStats>, StoreError>;

    async fn save_stats(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
        stats: &UserStats,
    ) -> Result<(), StoreError>;

    async fn load_preferences(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
    ) -> Result<Option<UserPreferences>, StoreError>;

    async fn save_preferences(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
        preferences: &UserPreferences,
    ) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub struct RemoteProfileRepository<C: RemoteStore> {
    client: std::sync::Arc<C>,
}

impl<C: RemoteStore> RemoteProfileRepository<C> {
    pub fn new(client: std::sync::Arc<C>) -> Self {
        Self { client }
    }

    fn profile_row<T: serde::Serialize>(
        entity: &T,
        partition_key: &str,
    ) -> Result<serde_json::Value, StoreError> {
        let mut row = serde_json::to_value(entity)?;
        let Some(fields) = row.as_object_mut() else {
            return Err(StoreError::Backend(
                "profile entity did not serialize to an object".to_string(),
            ));
        };
        fields.insert(
            PARTITION_COLUMN.to_string(),
            serde_json::Value::String(partition_key.to_string()),
        );
        Ok(row)
    }

    fn decode_first<T: serde::de::DeserializeOwned>(
        rows: Vec<serde_json::Value>,
    ) -> Result<Option<T>, StoreError> {
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(row)?))
    }
}

#[async_trait]
impl<C: RemoteStore> ProfileRepository for RemoteProfileRepository<C> {
    async fn load_stats(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
    ) -> Result<Option<UserStats>, StoreError> {
        let rows = self
            .client
            .list_rows(access_token, STATS_COLLECTION, partition_key, SINGLETON_ORDER)
            .await?;
        Self::decode_first(rows)
    }

    async fn save_stats(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
        stats: &UserStats,
    ) -> Result<(), StoreError> {
        let row = Self::profile_row(stats, partition_key)?;
        self.client
            .upsert_row(access_token, STATS_COLLECTION, partition_key, row)
            .await?;
        Ok(())
    }

    async fn load_preferences(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
    ) -> Result<Option<UserPreferences>, StoreError> {
        let rows = self
            .client
            .list_rows(
                access_token,
                PREFERENCES_COLLECTION,
                partition_key,
                SINGLETON_ORDER,
            )
            .await?;
        Self::decode_first(rows)
    }

    async fn save_preferences(
        &self,
        access_token: Option<&str>,
        partition_key: &str,
        preferences: &UserPreferences,
    ) -> Result<(), StoreError> {
        let row = Self::profile_row(preferences, partition_key)?;
        self.client
            .upsert_row(access_token, PREFERENCES_COLLECTION, partition_key, row)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    stats: Mutex<HashMap<String, UserStats>>,
    preferences: Mutex<HashMap<String, UserPreferences>>,
}

impl InMemoryProfileRepository {
    fn lock_stats(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserStats>>, StoreError> {
        self.stats
            .lock()
            .map_err(|error| StoreError::Backend(format!("stats lock poisoned: {error}")))
    }

    fn lock_preferences(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserPreferences>>, StoreError> {
        self.preferences
            .lock()
            .map_err(|error| StoreError::Backend(format!("preferences lock poisoned: {error}")))
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn load_stats(
        &self,
        _access_token: Option<&str>,
        partition_key: &str,
    ) -> Result<Option<UserStats>, StoreError> {
        Ok(self.lock_stats()?.get(partition_key).cloned())
    }

    async fn save_stats(
        &self,
        _access_token: Option<&str>,
        partition_key: &str,
        stats: &UserStats,
    ) -> Result<(), StoreError> {
        self.lock_stats()?
            .insert(partition_key.to_string(), stats.clone());
        Ok(())
    }

    async fn load_preferences(
        &self,
        _access_token: Option<&str>,
        partition_key: &str,
    ) -> Result<Option<UserPreferences>, StoreError> {
        Ok(self.lock_preferences()?.get(partition_key).cloned())
    }

    async fn save_preferences(
        &self,
        _access_token: Option<&str>,
        partition_key: &str,
        preferences: &UserPreferences,
    ) -> Result<(), StoreError> {
        self.lock_preferences()?
            .insert(partition_key.to_string(), preferences.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::supabase_client::InMemoryRemoteStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn remote_repository_round_trips_stats_per_partition() {
        let repository = RemoteProfileRepository::new(Arc::new(InMemoryRemoteStore::default()));

        assert!(repository.load_stats(None, "alice").await.unwrap().is_none());

        let mut stats = UserStats::default();
        stats.total_focus_minutes = 90;
        stats.current_streak_days = 2;
        repository.save_stats(None, "alice", &stats).await.unwrap();

        let loaded = repository.load_stats(None, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.total_focus_minutes, 90);
        assert_eq!(loaded.current_streak_days, 2);
        assert!(repository.load_stats(None, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_stats_twice_keeps_single_row() {
        let client = Arc::new(InMemoryRemoteStore::default());
        let repository = RemoteProfileRepository::new(client.clone());

        let mut stats = UserStats::default();
        stats.total_sessions = 1;
        repository.save_stats(None, "alice", &stats).await.unwrap();
        stats.total_sessions = 2;
        repository.save_stats(None, "alice", &stats).await.unwrap();

        let rows = client
            .list_rows(None, STATS_COLLECTION, "alice", SINGLETON_ORDER)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let loaded = repository.load_stats(None, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.total_sessions, 2);
    }

    #[tokio::test]
    async fn preferences_round_trip_with_defaults() {
        let repository = InMemoryProfileRepository::default();

        assert!(repository
            .load_preferences(None, "guest")
            .await
            .unwrap()
            .is_none());

        let preferences = UserPreferences::default();
        repository
            .save_preferences(None, "guest", &preferences)
            .await
            .unwrap();

        let loaded = repository
            .load_preferences(None, "guest")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, preferences);
    }
}
