use crate::domain::models::{FocusSession, Task, UserStats};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TaskCompletion {
    pub total: u32,
    pub completed: u32,
    pub percentage: u8,
}

pub fn task_completion(tasks: &[Task]) -> TaskCompletion {
    let total = tasks.len() as u32;
    let completed = tasks.iter().filter(|task| task.completed).count() as u32;
    let percentage = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    };
    TaskCompletion {
        total,
        completed,
        percentage,
    }
}

pub fn total_focus_minutes(sessions: &[FocusSession]) -> u64 {
    let total_seconds: u64 = sessions
        .iter()
        .map(|session| session.duration_seconds as u64)
        .sum();
    total_seconds / 60
}

pub fn completed_session_count(sessions: &[FocusSession]) -> u32 {
    sessions.iter().filter(|session| session.completed).count() as u32
}

// The streak is an explicitly maintained counter keyed off last_session_date,
// never re-derived from session timestamps.
pub fn apply_session_completion(stats: &mut UserStats, session: &FocusSession) {
    stats.total_sessions = stats.total_sessions.saturating_add(1);
    stats.total_focus_minutes = stats
        .total_focus_minutes
        .saturating_add(session.duration_seconds / 60);

    let session_date = session.started_at.date_naive();
    advance_streak(stats, session_date);
}

pub fn advance_streak(stats: &mut UserStats, day: NaiveDate) {
    let previous = stats
        .last_session_date
        .as_deref()
        .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok());

    match previous {
        Some(last) if last == day => {}
        Some(last) if last.succ_opt() == Some(day) => {
            stats.current_streak_days = stats.current_streak_days.saturating_add(1);
        }
        _ => {
            stats.current_streak_days = 1;
        }
    }
    if stats.current_streak_days > stats.longest_streak_days {
        stats.longest_streak_days = stats.current_streak_days;
    }
    stats.last_session_date = Some(day.format("%Y-%m-%d").to_string());
}
