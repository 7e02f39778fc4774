use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Pomodoro,
    Custom,
    Focus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        validate_non_empty(&self.title, "task.title")?;
        if let Some(due_date) = self.due_date.as_deref() {
            validate_date(due_date, "task.due_date")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "note.id")?;
        validate_non_empty(&self.title, "note.title")?;
        validate_non_empty(&self.content, "note.content")?;
        if self.updated_at < self.created_at {
            return Err("note.updated_at must be >= note.created_at".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FocusSession {
    pub id: String,
    pub duration_seconds: u32,
    pub kind: SessionKind,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
}

impl FocusSession {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "session.id")?;
        if self.duration_seconds == 0 {
            return Err("session.duration_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CalendarEvent {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "event.id")?;
        validate_non_empty(&self.title, "event.title")?;
        validate_date(&self.date, "event.date")?;
        if let Some(time) = self.time.as_deref() {
            // Shape check only; the time is never validated against the date.
            validate_hhmm(time, "event.time")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub provider: Option<String>,
    pub progress_percent: u8,
    pub completed: bool,
}

impl Course {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "course.id")?;
        validate_non_empty(&self.title, "course.title")?;
        if self.progress_percent > 100 {
            return Err("course.progress_percent must be <= 100".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: u32,
}

impl Achievement {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "achievement.id")?;
        validate_non_empty(&self.title, "achievement.title")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAchievement {
    pub id: String,
    pub achievement_id: String,
    pub earned_at: DateTime<Utc>,
}

impl UserAchievement {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "user_achievement.id")?;
        validate_non_empty(&self.achievement_id, "user_achievement.achievement_id")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total_focus_minutes: u32,
    pub total_sessions: u32,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub courses_completed: u32,
    pub certifications_earned: u32,
    pub total_points: u32,
    pub last_session_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPreferences {
    pub theme: Theme,
    pub focus_duration_minutes: u32,
    pub break_duration_minutes: u32,
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
    pub auto_start_focus: bool,
    pub auto_start_break: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            focus_duration_minutes: 25,
            break_duration_minutes: 5,
            notifications_enabled: true,
            sound_enabled: true,
            auto_start_focus: false,
            auto_start_break: false,
        }
    }
}

impl UserPreferences {
    pub fn validate(&self) -> Result<(), String> {
        if self.focus_duration_minutes == 0 {
            return Err("preferences.focus_duration_minutes must be > 0".to_string());
        }
        if self.break_duration_minutes == 0 {
            return Err("preferences.break_duration_minutes must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmbientSound {
    pub id: String,
    pub name: String,
    pub stream_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub account_id: String,
}

impl AuthSession {
    pub fn is_valid_at(&self, now: DateTime<Utc>, leeway_seconds: i64) -> bool {
        self.expires_at > now + chrono::Duration::seconds(leeway_seconds)
            && !self.access_token.trim().is_empty()
    }
}

pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if normalized.iter().any(|seen: &String| seen == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}

pub(crate) fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_hhmm(value: &str, field_name: &str) -> Result<(), String> {
    let mut split = value.split(':');
    let Some(hour_str) = split.next() else {
        return Err(format!("{field_name} must be HH:MM"));
    };
    let Some(minute_str) = split.next() else {
        return Err(format!("{field_name} must be HH:MM"));
    };
    if split.next().is_some() {
        return Err(format!("{field_name} must be HH:MM"));
    }

    let hour = hour_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    let minute = minute_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    if hour > 23 || minute > 59 {
        return Err(format!("{field_name} must be HH:MM"));
    }
    Ok(())
}

pub(crate) fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field_name} must be YYYY-MM-DD"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_task() -> Task {
        Task {
            id: "tsk-1".to_string(),
            title: "Finish calculus problem set".to_string(),
            description: Some("chapters 3 and 4".to_string()),
            completed: false,
            priority: Priority::High,
            due_date: Some("2026-03-02".to_string()),
            category: Some("math".to_string()),
            tags: vec!["homework".to_string(), "calculus".to_string()],
            created_at: fixed_time("2026-03-01T08:00:00Z"),
        }
    }

    fn sample_note() -> Note {
        Note {
            id: "note-1".to_string(),
            title: "Lecture recap".to_string(),
            content: "Derivatives of inverse functions".to_string(),
            category: None,
            tags: vec!["math".to_string()],
            pinned: true,
            created_at: fixed_time("2026-03-01T08:00:00Z"),
            updated_at: fixed_time("2026-03-01T09:30:00Z"),
        }
    }

    fn sample_session() -> FocusSession {
        FocusSession {
            id: "ses-1".to_string(),
            duration_seconds: 1500,
            kind: SessionKind::Pomodoro,
            completed: true,
            started_at: fixed_time("2026-03-01T10:00:00Z"),
        }
    }

    fn sample_event() -> CalendarEvent {
        CalendarEvent {
            id: "evt-1".to_string(),
            title: "Study group".to_string(),
            date: "2026-03-03".to_string(),
            time: Some("16:30".to_string()),
            icon: Some("📚".to_string()),
            color: Some("#7c3aed".to_string()),
        }
    }

    #[test]
    fn task_validate_accepts_valid_task() {
        assert!(sample_task().validate().is_ok());
    }

    #[test]
    fn task_validate_rejects_empty_title() {
        let mut task = sample_task();
        task.title = "   ".to_string();
        assert!(task.validate().is_err());
    }

    #[test]
    fn task_validate_rejects_malformed_due_date() {
        let mut task = sample_task();
        task.due_date = Some("03/02/2026".to_string());
        assert!(task.validate().is_err());
    }

    #[test]
    fn note_validate_rejects_update_before_create() {
        let mut note = sample_note();
        note.updated_at = fixed_time("2026-03-01T07:00:00Z");
        assert!(note.validate().is_err());
    }

    #[test]
    fn note_validate_rejects_empty_content() {
        let mut note = sample_note();
        note.content = String::new();
        assert!(note.validate().is_err());
    }

    #[test]
    fn session_validate_rejects_zero_duration() {
        let mut session = sample_session();
        session.duration_seconds = 0;
        assert!(session.validate().is_err());
    }

    #[test]
    fn event_validate_rejects_malformed_time() {
        let mut event = sample_event();
        event.time = Some("25:99".to_string());
        assert!(event.validate().is_err());
        event.time = None;
        assert!(event.validate().is_ok());
    }

    #[test]
    fn course_validate_rejects_progress_over_100() {
        let course = Course {
            id: "crs-1".to_string(),
            title: "AWS Cloud Practitioner".to_string(),
            provider: Some("StudyHub".to_string()),
            progress_percent: 101,
            completed: false,
        };
        assert!(course.validate().is_err());
    }

    #[test]
    fn stats_default_is_all_zero() {
        let stats = UserStats::default();
        assert_eq!(stats.total_focus_minutes, 0);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.current_streak_days, 0);
        assert_eq!(stats.last_session_date, None);
    }

    #[test]
    fn preferences_default_validates() {
        let preferences = UserPreferences::default();
        assert!(preferences.validate().is_ok());
        assert_eq!(preferences.focus_duration_minutes, 25);
        assert_eq!(preferences.break_duration_minutes, 5);
    }

    #[test]
    fn auth_session_validity_respects_leeway() {
        let session = AuthSession {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: fixed_time("2026-03-01T10:00:00Z"),
            account_id: "acct-1".to_string(),
        };
        assert!(session.is_valid_at(fixed_time("2026-03-01T09:58:00Z"), 60));
        assert!(!session.is_valid_at(fixed_time("2026-03-01T09:59:30Z"), 60));
    }

    #[test]
    fn normalize_tags_drops_duplicates_and_blanks() {
        let tags = vec![
            "math".to_string(),
            "  math  ".to_string(),
            "".to_string(),
            "exam".to_string(),
        ];
        assert_eq!(
            normalize_tags(&tags),
            vec!["math".to_string(), "exam".to_string()]
        );
    }

    proptest! {
        #[test]
        fn normalize_tags_is_idempotent(tags in prop::collection::vec("[a-z ]{0,12}", 0..16)) {
            let once = normalize_tags(&tags);
            let twice = normalize_tags(&once);
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn domain_models_support_serde_roundtrip() {
        let task = sample_task();
        let note = sample_note();
        let session = sample_session();
        let event = sample_event();

        let task_roundtrip: Task =
            serde_json::from_str(&serde_json::to_string(&task).expect("serialize task"))
                .expect("deserialize task");
        let note_roundtrip: Note =
            serde_json::from_str(&serde_json::to_string(&note).expect("serialize note"))
                .expect("deserialize note");
        let session_roundtrip: FocusSession =
            serde_json::from_str(&serde_json::to_string(&session).expect("serialize session"))
                .expect("deserialize session");
        let event_roundtrip: CalendarEvent =
            serde_json::from_str(&serde_json::to_string(&event).expect("serialize event"))
                .expect("deserialize event");

        assert_eq!(task_roundtrip, task);
        assert_eq!(note_roundtrip, note);
        assert_eq!(session_roundtrip, session);
        assert_eq!(event_roundtrip, event);
    }
}
