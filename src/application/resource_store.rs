use crate::application::fallback::{with_fallback, FallbackPolicy, Fetched};
use crate::domain::identity::Identity;
use crate::domain::models::{
    Achievement, CalendarEvent, Course, FocusSession, Note, Task, UserAchievement,
};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::event_log::EventLog;
use crate::infrastructure::mock_data;
use crate::infrastructure::supabase_client::{ListOrder, RemoteStore, ID_COLUMN, PARTITION_COLUMN};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// An entity kind that lives in its own remote collection, one row per
/// item, partitioned by account.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn validate(&self) -> Result<(), String>;

    fn list_order() -> ListOrder {
        ListOrder::created_descending()
    }

    fn demo_items() -> Vec<Self>;
}

impl Resource for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        Task::validate(self)
    }

    fn demo_items() -> Vec<Self> {
        mock_data::demo_tasks()
    }
}

impl Resource for Note {
    const COLLECTION: &'static str = "notes";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        Note::validate(self)
    }

    fn demo_items() -> Vec<Self> {
        mock_data::demo_notes()
    }
}

impl Resource for FocusSession {
    const COLLECTION: &'static str = "focus_sessions";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        FocusSession::validate(self)
    }

    fn list_order() -> ListOrder {
        ListOrder {
            column: "started_at",
            ascending: false,
        }
    }

    fn demo_items() -> Vec<Self> {
        mock_data::demo_focus_sessions()
    }
}

impl Resource for CalendarEvent {
    const COLLECTION: &'static str = "calendar_events";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        CalendarEvent::validate(self)
    }

    // The calendar reads forward in time, unlike the feed-style lists.
    fn list_order() -> ListOrder {
        ListOrder {
            column: "date",
            ascending: true,
        }
    }

    fn demo_items() -> Vec<Self> {
        mock_data::demo_calendar_events()
    }
}

impl Resource for Course {
    const COLLECTION: &'static str = "courses";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        Course::validate(self)
    }

    fn list_order() -> ListOrder {
        ListOrder {
            column: ID_COLUMN,
            ascending: true,
        }
    }

    fn demo_items() -> Vec<Self> {
        mock_data::demo_courses()
    }
}

impl Resource for Achievement {
    const COLLECTION: &'static str = "achievements";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        Achievement::validate(self)
    }

    fn list_order() -> ListOrder {
        ListOrder {
            column: ID_COLUMN,
            ascending: true,
        }
    }

    fn demo_items() -> Vec<Self> {
        mock_data::demo_achievements()
    }
}

impl Resource for UserAchievement {
    const COLLECTION: &'static str = "user_achievements";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), String> {
        UserAchievement::validate(self)
    }

    fn list_order() -> ListOrder {
        ListOrder {
            column: "earned_at",
            ascending: false,
        }
    }

    fn demo_items() -> Vec<Self> {
        mock_data::demo_user_achievements()
    }
}

/// Point-in-time view of one collection, cheap to clone out to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub degraded: bool,
}

impl<T> Default for CollectionSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            degraded: false,
        }
    }
}

pub struct ResourceStore<T, C>
where
    T: Resource,
    C: RemoteStore,
{
    client: Arc<C>,
    identity: Identity,
    access_token: Option<String>,
    fallback: FallbackPolicy,
    log: Arc<EventLog>,
    state: Mutex<CollectionSnapshot<T>>,
}

impl<T, C> ResourceStore<T, C>
where
    T: Resource,
    C: RemoteStore,
{
    pub fn new(client: Arc<C>, identity: Identity, log: Arc<EventLog>) -> Self {
        Self {
            client,
            identity,
            access_token: None,
            fallback: FallbackPolicy::default(),
            log,
            state: Mutex::new(CollectionSnapshot::default()),
        }
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn with_fallback_policy(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn snapshot(&self) -> Result<CollectionSnapshot<T>, StoreError> {
        Ok(self.lock_state()?.clone())
    }

    /// Replaces the snapshot with a fresh server read. A failed read does
    /// not leave the collection empty: it degrades to the bundled demo
    /// items and records the reason on the snapshot. Overlapping refetches
    /// are allowed and the last write wins.
    pub async fn refetch(&self) -> Result<(), StoreError> {
        {
            let mut state = self.lock_state()?;
            state.loading = true;
        }

        let fetched = with_fallback(
            self.fallback,
            T::COLLECTION,
            || self.list_from_server(),
            T::demo_items(),
        )
        .await;

        if let Fetched::Degraded { reason, .. } = &fetched {
            self.log.warn(T::COLLECTION, reason);
        }

        let mut state = self.lock_state()?;
        state.loading = false;
        match fetched {
            Fetched::Live(items) => {
                state.items = items;
                state.error = None;
                state.degraded = false;
            }
            Fetched::Degraded { value, reason } => {
                state.items = value;
                state.error = Some(reason);
                state.degraded = true;
            }
        }
        Ok(())
    }

    /// Validation failures reject the item before any network I/O; server
    /// failures leave the snapshot untouched.
    pub async fn create(&self, item: T) -> Result<T, StoreError> {
        item.validate().map_err(StoreError::InvalidInput)?;

        let row = self.encode_row(&item)?;
        let inserted = self
            .client
            .insert_row(
                self.access_token.as_deref(),
                T::COLLECTION,
                self.identity.partition_key(),
                row,
            )
            .await;

        match inserted {
            Ok(_) => {
                self.refetch().await?;
                Ok(item)
            }
            Err(error) => {
                self.log
                    .error(T::COLLECTION, &format!("create failed: {error}"));
                Err(error)
            }
        }
    }

    pub async fn update(&self, item_id: &str, patch: Value) -> Result<(), StoreError> {
        if item_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("item id must not be empty".to_string()));
        }

        let updated = self
            .client
            .update_row(
                self.access_token.as_deref(),
                T::COLLECTION,
                self.identity.partition_key(),
                item_id,
                patch,
            )
            .await;

        match updated {
            Ok(_) => self.refetch().await,
            Err(error) => {
                self.log
                    .error(T::COLLECTION, &format!("update failed: {error}"));
                Err(error)
            }
        }
    }

    /// Returns whether the item was present in the snapshot beforehand, so
    /// deleting an unknown id is a quiet no-op rather than an error.
    pub async fn delete(&self, item_id: &str) -> Result<bool, StoreError> {
        if item_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("item id must not be empty".to_string()));
        }

        let existed = self
            .lock_state()?
            .items
            .iter()
            .any(|item| item.id() == item_id);

        let deleted = self
            .client
            .delete_row(
                self.access_token.as_deref(),
                T::COLLECTION,
                self.identity.partition_key(),
                item_id,
            )
            .await;

        match deleted {
            Ok(()) => {
                self.refetch().await?;
                Ok(existed)
            }
            Err(error) => {
                self.log
                    .error(T::COLLECTION, &format!("delete failed: {error}"));
                Err(error)
            }
        }
    }

    async fn list_from_server(&self) -> Result<Vec<T>, StoreError> {
        let rows = self
            .client
            .list_rows(
                self.access_token.as_deref(),
                T::COLLECTION,
                self.identity.partition_key(),
                T::list_order(),
            )
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(serde_json::from_value(row)?);
        }
        Ok(items)
    }

    fn encode_row(&self, item: &T) -> Result<Value, StoreError> {
        let mut row = serde_json::to_value(item)?;
        let Some(fields) = row.as_object_mut() else {
            return Err(StoreError::Backend(format!(
                "{} item did not serialize to an object",
                T::COLLECTION
            )));
        };
        fields.insert(
            PARTITION_COLUMN.to_string(),
            Value::String(self.identity.partition_key().to_string()),
        );
        Ok(row)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, CollectionSnapshot<T>>, StoreError> {
        self.state
            .lock()
            .map_err(|error| StoreError::Backend(format!("collection state lock poisoned: {error}")))
    }
}
