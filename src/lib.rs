pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::app::{next_id, AppState, TimerSnapshot};
pub use application::chat::{ChatAssistant, ChatMessage, ChatRole};
pub use application::fallback::{with_fallback, FallbackPolicy, Fetched};
pub use application::focus_timer::{FocusTimer, TimerPhase};
pub use application::navigation::{NavIntent, Navigator, Screen};
pub use application::resource_store::{CollectionSnapshot, Resource, ResourceStore};
pub use application::session::{EnsureSessionResult, SessionManager};
pub use domain::identity::Identity;
pub use domain::models::{
    Achievement, AmbientSound, AuthSession, CalendarEvent, Course, FocusSession, Note, Priority,
    SessionKind, Task, Theme, UserAchievement, UserPreferences, UserStats,
};
pub use domain::stats::{task_completion, TaskCompletion};
pub use infrastructure::error::StoreError;
pub use infrastructure::supabase_client::{
    InMemoryRemoteStore, ListOrder, RemoteStore, ReqwestSupabaseStore, SupabaseConfig,
};
