use crate::domain::models::{FocusSession, SessionKind};
use crate::infrastructure::error::StoreError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Completed => "completed",
        }
    }
}

/// Countdown state machine for one focus session. Owns no clock of its
/// own: the host drives it with `tick` once per second.
#[derive(Debug, Clone)]
pub struct FocusTimer {
    phase: TimerPhase,
    kind: SessionKind,
    total_seconds: u32,
    remaining_seconds: u32,
    started_at: Option<DateTime<Utc>>,
    session_counter: u64,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self {
            phase: TimerPhase::Idle,
            kind: SessionKind::Pomodoro,
            total_seconds: 0,
            remaining_seconds: 0,
            started_at: None,
            session_counter: 0,
        }
    }
}

impl FocusTimer {
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn start(
        &mut self,
        kind: SessionKind,
        duration_seconds: u32,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.phase != TimerPhase::Idle {
            return Err(StoreError::InvalidInput(format!(
                "timer cannot start from the {} phase",
                self.phase.as_str()
            )));
        }
        if duration_seconds == 0 {
            return Err(StoreError::InvalidInput(
                "duration_seconds must be > 0".to_string(),
            ));
        }

        self.phase = TimerPhase::Running;
        self.kind = kind;
        self.total_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        self.started_at = Some(now);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), StoreError> {
        if self.phase != TimerPhase::Running {
            return Err(StoreError::InvalidInput("timer is not running".to_string()));
        }
        self.phase = TimerPhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), StoreError> {
        if self.phase != TimerPhase::Paused {
            return Err(StoreError::InvalidInput("timer is not paused".to_string()));
        }
        self.phase = TimerPhase::Running;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self {
            session_counter: self.session_counter,
            ..Self::default()
        };
    }

    /// Advances the countdown by one second. Yields a completed session
    /// exactly once, on the tick that reaches zero; ticks in any other
    /// phase are no-ops.
    pub fn tick(&mut self) -> Option<FocusSession> {
        if self.phase != TimerPhase::Running {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return None;
        }

        self.phase = TimerPhase::Completed;
        self.session_counter += 1;
        let started_at = self.started_at.unwrap_or_else(Utc::now);
        Some(FocusSession {
            id: format!("ses-{}", self.session_counter),
            duration_seconds: self.total_seconds,
            kind: self.kind,
            completed: true,
            started_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    #[test]
    fn start_requires_idle() {
        let mut timer = FocusTimer::default();
        timer.start(SessionKind::Pomodoro, 1500, fixed_now()).unwrap();
        assert!(matches!(
            timer.start(SessionKind::Custom, 600, fixed_now()),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.remaining_seconds(), 1500);
    }

    #[test]
    fn start_rejects_zero_duration() {
        let mut timer = FocusTimer::default();
        assert!(timer.start(SessionKind::Focus, 0, fixed_now()).is_err());
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn pause_and_resume_only_from_matching_phase() {
        let mut timer = FocusTimer::default();
        assert!(timer.pause().is_err());
        assert!(timer.resume().is_err());

        timer.start(SessionKind::Pomodoro, 60, fixed_now()).unwrap();
        timer.pause().unwrap();
        assert_eq!(timer.phase(), TimerPhase::Paused);
        assert!(timer.pause().is_err());

        assert_eq!(timer.tick(), None);
        assert_eq!(timer.remaining_seconds(), 60);

        timer.resume().unwrap();
        assert_eq!(timer.phase(), TimerPhase::Running);
    }

    #[test]
    fn full_pomodoro_countdown_completes_exactly_once() {
        let mut timer = FocusTimer::default();
        timer.start(SessionKind::Pomodoro, 1500, fixed_now()).unwrap();

        let mut completed = Vec::new();
        for _ in 0..1500 {
            if let Some(session) = timer.tick() {
                completed.push(session);
            }
        }

        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(completed.len(), 1);
        let session = &completed[0];
        assert_eq!(session.duration_seconds, 1500);
        assert_eq!(session.kind, SessionKind::Pomodoro);
        assert!(session.completed);
        assert_eq!(session.started_at, fixed_now());

        // Further ticks stay silent.
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.phase(), TimerPhase::Completed);
    }

    #[test]
    fn completed_is_terminal_until_reset() {
        let mut timer = FocusTimer::default();
        timer.start(SessionKind::Custom, 2, fixed_now()).unwrap();
        timer.tick();
        let first = timer.tick().expect("first session completes");
        assert_eq!(timer.phase(), TimerPhase::Completed);

        assert!(matches!(
            timer.start(SessionKind::Custom, 1, fixed_now()),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(timer.phase(), TimerPhase::Completed);

        timer.reset();
        timer.start(SessionKind::Custom, 1, fixed_now()).unwrap();
        let second = timer.tick().expect("second session completes");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut timer = FocusTimer::default();
        timer.start(SessionKind::Focus, 300, fixed_now()).unwrap();
        timer.tick();
        timer.reset();

        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.started_at(), None);
    }

    proptest! {
        #[test]
        fn remaining_never_underflows(duration in 1u32..4000, extra_ticks in 0u32..100) {
            let mut timer = FocusTimer::default();
            timer.start(SessionKind::Pomodoro, duration, fixed_now()).expect("start");

            let mut completions = 0u32;
            for _ in 0..(duration + extra_ticks) {
                if timer.tick().is_some() {
                    completions += 1;
                }
            }

            prop_assert_eq!(completions, 1);
            prop_assert_eq!(timer.remaining_seconds(), 0);
            prop_assert_eq!(timer.phase(), TimerPhase::Completed);
        }
    }
}
