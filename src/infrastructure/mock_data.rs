use crate::domain::models::{
    Achievement, AmbientSound, CalendarEvent, Course, FocusSession, Note, Priority, SessionKind,
    Task, UserAchievement, UserPreferences, UserStats,
};
use chrono::{DateTime, Utc};

// Demo data is served whenever the backend is unreachable; it must stay
// deterministic so degraded renders are stable across refetches.
const DEMO_DAY: &str = "2026-03-02";

fn demo_time(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("demo timestamps are fixed and valid")
        .with_timezone(&Utc)
}

pub fn demo_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "demo-task-1".to_string(),
            title: "Review biology flashcards".to_string(),
            description: Some("Chapters 5-7 before Friday's quiz".to_string()),
            completed: false,
            priority: Priority::High,
            due_date: Some(DEMO_DAY.to_string()),
            category: Some("biology".to_string()),
            tags: vec!["quiz".to_string(), "flashcards".to_string()],
            created_at: demo_time("2026-03-01T09:00:00Z"),
        },
        Task {
            id: "demo-task-2".to_string(),
            title: "Draft history essay outline".to_string(),
            description: None,
            completed: true,
            priority: Priority::Medium,
            due_date: None,
            category: Some("history".to_string()),
            tags: vec!["essay".to_string()],
            created_at: demo_time("2026-02-28T14:30:00Z"),
        },
        Task {
            id: "demo-task-3".to_string(),
            title: "Solve practice problems 1-10".to_string(),
            description: None,
            completed: false,
            priority: Priority::Low,
            due_date: None,
            category: Some("math".to_string()),
            tags: Vec::new(),
            created_at: demo_time("2026-02-27T18:15:00Z"),
        },
    ]
}

pub fn demo_notes() -> Vec<Note> {
    vec![
        Note {
            id: "demo-note-1".to_string(),
            title: "Photosynthesis summary".to_string(),
            content: "Light reactions happen in the thylakoid membrane.".to_string(),
            category: Some("biology".to_string()),
            tags: vec!["summary".to_string()],
            pinned: true,
            created_at: demo_time("2026-03-01T10:00:00Z"),
            updated_at: demo_time("2026-03-01T10:45:00Z"),
        },
        Note {
            id: "demo-note-2".to_string(),
            title: "Essay thesis ideas".to_string(),
            content: "Industrialization reshaped urban family structures.".to_string(),
            category: Some("history".to_string()),
            tags: Vec::new(),
            pinned: false,
            created_at: demo_time("2026-02-28T16:00:00Z"),
            updated_at: demo_time("2026-02-28T16:00:00Z"),
        },
    ]
}

pub fn demo_focus_sessions() -> Vec<FocusSession> {
    vec![
        FocusSession {
            id: "demo-session-1".to_string(),
            duration_seconds: 1500,
            kind: SessionKind::Pomodoro,
            completed: true,
            started_at: demo_time("2026-03-01T09:00:00Z"),
        },
        FocusSession {
            id: "demo-session-2".to_string(),
            duration_seconds: 2700,
            kind: SessionKind::Custom,
            completed: true,
            started_at: demo_time("2026-02-28T20:00:00Z"),
        },
    ]
}

pub fn demo_calendar_events() -> Vec<CalendarEvent> {
    vec![
        CalendarEvent {
            id: "demo-event-1".to_string(),
            title: "Biology quiz".to_string(),
            date: "2026-03-06".to_string(),
            time: Some("09:00".to_string()),
            icon: Some("🧪".to_string()),
            color: Some("#22c55e".to_string()),
        },
        CalendarEvent {
            id: "demo-event-2".to_string(),
            title: "Study group".to_string(),
            date: "2026-03-04".to_string(),
            time: Some("16:30".to_string()),
            icon: Some("📚".to_string()),
            color: Some("#7c3aed".to_string()),
        },
    ]
}

pub fn demo_courses() -> Vec<Course> {
    vec![
        Course {
            id: "demo-course-1".to_string(),
            title: "AWS Cloud Practitioner".to_string(),
            provider: Some("StudyHub".to_string()),
            progress_percent: 40,
            completed: false,
        },
        Course {
            id: "demo-course-2".to_string(),
            title: "Intro to Statistics".to_string(),
            provider: Some("StudyHub".to_string()),
            progress_percent: 100,
            completed: true,
        },
    ]
}

pub fn demo_achievements() -> Vec<Achievement> {
    vec![
        Achievement {
            id: "demo-achievement-1".to_string(),
            title: "First Focus".to_string(),
            description: "Complete your first focus session".to_string(),
            points: 10,
        },
        Achievement {
            id: "demo-achievement-2".to_string(),
            title: "Week Warrior".to_string(),
            description: "Keep a seven day study streak".to_string(),
            points: 50,
        },
    ]
}

pub fn demo_user_achievements() -> Vec<UserAchievement> {
    vec![UserAchievement {
        id: "demo-earned-1".to_string(),
        achievement_id: "demo-achievement-1".to_string(),
        earned_at: demo_time("2026-02-28T20:45:00Z"),
    }]
}

pub fn demo_ambient_sounds() -> Vec<AmbientSound> {
    vec![
        AmbientSound {
            id: "demo-sound-1".to_string(),
            name: "Rainfall".to_string(),
            stream_url: "https://cdn.example.com/sounds/rainfall.mp3".to_string(),
        },
        AmbientSound {
            id: "demo-sound-2".to_string(),
            name: "Coffee shop".to_string(),
            stream_url: "https://cdn.example.com/sounds/coffee-shop.mp3".to_string(),
        },
    ]
}

// Placeholder streak values mirror what an offline demo should show; real
// streaks come from the stats counter.
pub fn demo_stats() -> UserStats {
    UserStats {
        total_focus_minutes: 70,
        total_sessions: 2,
        current_streak_days: 3,
        longest_streak_days: 5,
        courses_completed: 1,
        certifications_earned: 0,
        total_points: 10,
        last_session_date: Some("2026-03-01".to_string()),
    }
}

pub fn demo_preferences() -> UserPreferences {
    UserPreferences::default()
}
