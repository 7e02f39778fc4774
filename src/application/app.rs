use crate::application::bootstrap::bootstrap_workspace;
use crate::application::chat::ChatAssistant;
use crate::application::fallback::FallbackPolicy;
use crate::application::focus_timer::FocusTimer;
use crate::application::navigation::{NavIntent, Navigator, Screen};
use crate::application::resource_store::ResourceStore;
use crate::domain::identity::Identity;
use crate::domain::models::{
    Achievement, AmbientSound, CalendarEvent, Course, FocusSession, Note, SessionKind, Task,
    UserAchievement, UserPreferences, UserStats,
};
use crate::domain::stats::{apply_session_completion, task_completion, TaskCompletion};
use crate::infrastructure::config::{
    read_chat_reply_delay_ms, read_default_durations, read_fallback_delay_ms,
};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::event_log::EventLog;
use crate::infrastructure::mock_data;
use crate::infrastructure::profile_repository::{ProfileRepository, RemoteProfileRepository};
use crate::infrastructure::supabase_client::RemoteStore;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_id(prefix: &str) -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence}", Utc::now().timestamp_micros())
}

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub phase: String,
    pub kind: SessionKind,
    pub total_seconds: u32,
    pub remaining_seconds: u32,
}

#[derive(Debug, Clone, Copy)]
struct DayCounter {
    date: NaiveDate,
    count: u32,
}

/// Everything the UI layer talks to: one store per collection, the focus
/// timer, navigation, chat, and the per-account profile.
pub struct AppState<C: RemoteStore> {
    config_dir: PathBuf,
    identity: Identity,
    log: Arc<EventLog>,
    tasks: ResourceStore<Task, C>,
    notes: ResourceStore<Note, C>,
    sessions: ResourceStore<FocusSession, C>,
    calendar_events: ResourceStore<CalendarEvent, C>,
    courses: ResourceStore<Course, C>,
    achievements: ResourceStore<Achievement, C>,
    user_achievements: ResourceStore<UserAchievement, C>,
    profile: RemoteProfileRepository<C>,
    chat: ChatAssistant,
    timer: Mutex<FocusTimer>,
    navigator: Mutex<Navigator>,
    sessions_today: Mutex<DayCounter>,
    now_provider: NowProvider,
}

impl<C: RemoteStore> AppState<C> {
    pub fn new(
        workspace_root: &Path,
        client: Arc<C>,
        identity: Identity,
        access_token: Option<String>,
    ) -> Result<Self, StoreError> {
        let bootstrap = bootstrap_workspace(workspace_root)?;
        let log = Arc::new(EventLog::new(&bootstrap.logs_dir));
        let fallback = FallbackPolicy {
            delay_ms: read_fallback_delay_ms(&bootstrap.config_dir)?,
        };
        let chat = ChatAssistant::new(read_chat_reply_delay_ms(&bootstrap.config_dir)?);
        let now_provider: NowProvider = Arc::new(Utc::now);

        fn new_store<T, C>(
            client: &Arc<C>,
            identity: &Identity,
            log: &Arc<EventLog>,
            access_token: &Option<String>,
            fallback: FallbackPolicy,
        ) -> ResourceStore<T, C>
        where
            T: crate::application::resource_store::Resource,
            C: RemoteStore,
        {
            ResourceStore::new(Arc::clone(client), identity.clone(), Arc::clone(log))
                .with_access_token(access_token.clone())
                .with_fallback_policy(fallback)
        }

        let today = (now_provider)().date_naive();
        Ok(Self {
            config_dir: bootstrap.config_dir,
            log: Arc::clone(&log),
            tasks: new_store(&client, &identity, &log, &access_token, fallback),
            notes: new_store(&client, &identity, &log, &access_token, fallback),
            sessions: new_store(&client, &identity, &log, &access_token, fallback),
            calendar_events: new_store(&client, &identity, &log, &access_token, fallback),
            courses: new_store(&client, &identity, &log, &access_token, fallback),
            achievements: new_store(&client, &identity, &log, &access_token, fallback),
            user_achievements: new_store(&client, &identity, &log, &access_token, fallback),
            identity,
            profile: RemoteProfileRepository::new(client),
            chat,
            timer: Mutex::new(FocusTimer::default()),
            navigator: Mutex::new(Navigator::default()),
            sessions_today: Mutex::new(DayCounter {
                date: today,
                count: 0,
            }),
            now_provider,
        })
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn tasks(&self) -> &ResourceStore<Task, C> {
        &self.tasks
    }

    pub fn notes(&self) -> &ResourceStore<Note, C> {
        &self.notes
    }

    pub fn sessions(&self) -> &ResourceStore<FocusSession, C> {
        &self.sessions
    }

    pub fn calendar_events(&self) -> &ResourceStore<CalendarEvent, C> {
        &self.calendar_events
    }

    pub fn courses(&self) -> &ResourceStore<Course, C> {
        &self.courses
    }

    pub fn achievements(&self) -> &ResourceStore<Achievement, C> {
        &self.achievements
    }

    pub fn user_achievements(&self) -> &ResourceStore<UserAchievement, C> {
        &self.user_achievements
    }

    pub fn chat(&self) -> &ChatAssistant {
        &self.chat
    }

    /// Demo-only catalog; ambient sounds have no remote collection.
    pub fn ambient_sounds(&self) -> Vec<AmbientSound> {
        mock_data::demo_ambient_sounds()
    }

    /// Starts a focus countdown sized by the configured default duration.
    pub fn start_default_pomodoro(&self) -> Result<TimerSnapshot, StoreError> {
        let (focus_minutes, _) = read_default_durations(&self.config_dir)?;
        self.start_timer(SessionKind::Pomodoro, focus_minutes * 60)
    }

    /// Loads every collection. Failures degrade per collection, so one
    /// unreachable table never blanks the rest of the app.
    pub async fn refetch_all(&self) -> Result<(), StoreError> {
        self.tasks.refetch().await?;
        self.notes.refetch().await?;
        self.sessions.refetch().await?;
        self.calendar_events.refetch().await?;
        self.courses.refetch().await?;
        self.achievements.refetch().await?;
        self.user_achievements.refetch().await?;
        Ok(())
    }

    pub async fn toggle_task(&self, task_id: &str) -> Result<TaskCompletion, StoreError> {
        let completed = self
            .tasks
            .snapshot()?
            .items
            .iter()
            .find(|task| task.id == task_id)
            .map(|task| task.completed)
            .ok_or_else(|| StoreError::InvalidInput(format!("unknown task: {task_id}")))?;

        self.tasks
            .update(task_id, serde_json::json!({ "completed": !completed }))
            .await?;

        Ok(task_completion(&self.tasks.snapshot()?.items))
    }

    pub fn start_timer(
        &self,
        kind: SessionKind,
        duration_seconds: u32,
    ) -> Result<TimerSnapshot, StoreError> {
        let now = (self.now_provider)();
        let mut timer = self.lock_timer()?;
        timer.start(kind, duration_seconds, now)?;
        self.log.info(
            "start_timer",
            &format!("started {duration_seconds}s countdown"),
        );
        Ok(Self::timer_snapshot(&timer))
    }

    pub fn pause_timer(&self) -> Result<TimerSnapshot, StoreError> {
        let mut timer = self.lock_timer()?;
        timer.pause()?;
        Ok(Self::timer_snapshot(&timer))
    }

    pub fn resume_timer(&self) -> Result<TimerSnapshot, StoreError> {
        let mut timer = self.lock_timer()?;
        timer.resume()?;
        Ok(Self::timer_snapshot(&timer))
    }

    pub fn reset_timer(&self) -> Result<TimerSnapshot, StoreError> {
        let mut timer = self.lock_timer()?;
        timer.reset();
        Ok(Self::timer_snapshot(&timer))
    }

    pub fn timer_state(&self) -> Result<TimerSnapshot, StoreError> {
        let timer = self.lock_timer()?;
        Ok(Self::timer_snapshot(&timer))
    }

    /// Drives the countdown one second. When the session completes it is
    /// persisted and folded into the stats before the session is returned.
    pub async fn tick_timer(&self) -> Result<Option<FocusSession>, StoreError> {
        let completed = {
            let mut timer = self.lock_timer()?;
            timer.tick()
        };

        let Some(session) = completed else {
            return Ok(None);
        };
        self.record_completed_session(session.clone()).await?;
        Ok(Some(session))
    }

    /// Folds a finished session into the day counter, the session log and
    /// the stats. Persistence is best-effort: a completed session always
    /// counts for today even when the backend is unreachable.
    pub async fn record_completed_session(&self, session: FocusSession) -> Result<(), StoreError> {
        self.bump_sessions_today()?;
        if let Err(error) = self.sessions.create(session.clone()).await {
            self.log
                .error("record_session", &format!("session save failed: {error}"));
        }

        // Stats updates only apply on top of the real stored row. When the
        // load itself fails the update is skipped, never applied to demo
        // numbers and written back as authoritative.
        let partition_key = self.identity.partition_key();
        match self.profile.load_stats(None, partition_key).await {
            Ok(loaded) => {
                let mut stats = loaded.unwrap_or_default();
                apply_session_completion(&mut stats, &session);
                if let Err(error) = self.profile.save_stats(None, partition_key, &stats).await {
                    self.log
                        .error("record_session", &format!("stats save failed: {error}"));
                }
            }
            Err(error) => {
                self.log.warn(
                    "record_session",
                    &format!("stats load failed, update skipped: {error}"),
                );
            }
        }
        Ok(())
    }

    pub fn sessions_completed_today(&self) -> Result<u32, StoreError> {
        let today = (self.now_provider)().date_naive();
        let mut counter = self.lock_sessions_today()?;
        if counter.date != today {
            counter.date = today;
            counter.count = 0;
        }
        Ok(counter.count)
    }

    pub async fn stats(&self) -> Result<UserStats, StoreError> {
        let partition_key = self.identity.partition_key();
        let loaded = match self.profile.load_stats(None, partition_key).await {
            Ok(loaded) => loaded,
            Err(error) => {
                self.log.warn("stats", &format!("degraded to demo stats: {error}"));
                return Ok(mock_data::demo_stats());
            }
        };
        match loaded {
            Some(stats) => Ok(stats),
            None => {
                let defaults = UserStats::default();
                if let Err(error) = self.profile.save_stats(None, partition_key, &defaults).await {
                    self.log
                        .error("stats", &format!("default stats save failed: {error}"));
                }
                Ok(defaults)
            }
        }
    }

    pub async fn preferences(&self) -> Result<UserPreferences, StoreError> {
        let partition_key = self.identity.partition_key();
        let loaded = match self.profile.load_preferences(None, partition_key).await {
            Ok(loaded) => loaded,
            Err(error) => {
                self.log.warn(
                    "preferences",
                    &format!("degraded to default preferences: {error}"),
                );
                return Ok(mock_data::demo_preferences());
            }
        };
        match loaded {
            Some(preferences) => Ok(preferences),
            None => {
                let defaults = UserPreferences::default();
                if let Err(error) = self
                    .profile
                    .save_preferences(None, partition_key, &defaults)
                    .await
                {
                    self.log.error(
                        "preferences",
                        &format!("default preferences save failed: {error}"),
                    );
                }
                Ok(defaults)
            }
        }
    }

    pub async fn update_preferences(
        &self,
        preferences: UserPreferences,
    ) -> Result<UserPreferences, StoreError> {
        preferences.validate().map_err(StoreError::InvalidInput)?;
        self.profile
            .save_preferences(None, self.identity.partition_key(), &preferences)
            .await?;
        Ok(preferences)
    }

    pub fn navigate(&self, intent: NavIntent) -> Result<Screen, StoreError> {
        let mut navigator = self.lock_navigator()?;
        Ok(navigator.dispatch(intent))
    }

    pub fn current_screen(&self) -> Result<Screen, StoreError> {
        Ok(self.lock_navigator()?.current())
    }

    fn bump_sessions_today(&self) -> Result<(), StoreError> {
        let today = (self.now_provider)().date_naive();
        let mut counter = self.lock_sessions_today()?;
        if counter.date != today {
            counter.date = today;
            counter.count = 0;
        }
        counter.count += 1;
        Ok(())
    }

    fn timer_snapshot(timer: &FocusTimer) -> TimerSnapshot {
        TimerSnapshot {
            phase: timer.phase().as_str().to_string(),
            kind: timer.kind(),
            total_seconds: timer.total_seconds(),
            remaining_seconds: timer.remaining_seconds(),
        }
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, FocusTimer>, StoreError> {
        self.timer
            .lock()
            .map_err(|error| StoreError::Backend(format!("timer lock poisoned: {error}")))
    }

    fn lock_navigator(&self) -> Result<MutexGuard<'_, Navigator>, StoreError> {
        self.navigator
            .lock()
            .map_err(|error| StoreError::Backend(format!("navigator lock poisoned: {error}")))
    }

    fn lock_sessions_today(&self) -> Result<MutexGuard<'_, DayCounter>, StoreError> {
        self.sessions_today
            .lock()
            .map_err(|error| StoreError::Backend(format!("day counter lock poisoned: {error}")))
    }
}
