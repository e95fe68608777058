//! Pomodoro-style study countdown.
//!
//! The countdown is driven by `tick`, called once per second of running time
//! by the event loop. The recorded duration is wall-clock time since `start`.

use chrono::NaiveDateTime;

use crate::error::TrackerError;
use crate::models::{StudyData, StudySession, SubjectId};

/// Longest session that can be chosen for the countdown.
pub const MAX_SESSION_MINUTES: u32 = 180;

/// Accept a requested session length between one minute and `MAX_SESSION_MINUTES`.
pub fn check_minutes(minutes: u32) -> Result<u32, TrackerError> {
    if (1..=MAX_SESSION_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(TrackerError::validation(format!(
            "Session length must be between 1 and {} minutes",
            MAX_SESSION_MINUTES
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to advance (idle or paused).
    Idle,
    Running { remaining_secs: u32 },
    /// The countdown reached zero; the caller should `stop` the session.
    Completed,
}

#[derive(Debug, Clone)]
pub struct StudyTimer {
    state: TimerState,
    subject_id: Option<SubjectId>,
    duration_secs: u32,
    remaining_secs: u32,
    session_start: Option<NaiveDateTime>,
}

impl Default for StudyTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            subject_id: None,
            duration_secs: 0,
            remaining_secs: 0,
            session_start: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn subject_id(&self) -> Option<SubjectId> {
        self.subject_id
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn session_start(&self) -> Option<NaiveDateTime> {
        self.session_start
    }

    /// Fraction of the configured duration already counted down.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            0.0
        } else {
            1.0 - self.remaining_secs as f64 / self.duration_secs as f64
        }
    }

    pub fn start(
        &mut self,
        subject_id: Option<SubjectId>,
        minutes: u32,
        now: NaiveDateTime,
    ) -> Result<(), TrackerError> {
        if self.state != TimerState::Idle {
            return Err(TrackerError::validation("A study session is already in progress"));
        }
        let subject_id =
            subject_id.ok_or_else(|| TrackerError::validation("Select a subject to study"))?;
        if minutes == 0 {
            return Err(TrackerError::validation("Duration must be at least one minute"));
        }

        let secs = minutes
            .checked_mul(60)
            .ok_or_else(|| TrackerError::validation("Duration is too long"))?;

        self.state = TimerState::Running;
        self.subject_id = Some(subject_id);
        self.duration_secs = secs;
        self.remaining_secs = secs;
        self.session_start = Some(now);
        log::debug!("Timer started: subject {} for {} min", subject_id, minutes);
        Ok(())
    }

    /// Running -> Paused. Returns false when there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            true
        } else {
            false
        }
    }

    /// Paused -> Running, keeping the original session start.
    pub fn resume(&mut self) -> bool {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
            true
        } else {
            false
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// Advance one second of running time.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            TickOutcome::Completed
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// End the session, whether stopped early or completed.
    ///
    /// Whole elapsed wall-clock minutes since `start` are recorded into `data`;
    /// less than a minute records nothing. The timer always returns to idle.
    pub fn stop(&mut self, now: NaiveDateTime, data: &mut StudyData) -> Option<StudySession> {
        if self.state == TimerState::Idle {
            return None;
        }

        let recorded = match (self.session_start, self.subject_id) {
            (Some(start), Some(subject_id)) => {
                let minutes = (now - start).num_minutes();
                if minutes > 0 {
                    let session = StudySession {
                        subject_id,
                        date: now.date(),
                        duration_minutes: minutes as u32,
                    };
                    data.record_session(session.clone());
                    log::info!(
                        "Recorded {} min of study for subject {}",
                        session.duration_minutes,
                        subject_id
                    );
                    Some(session)
                } else {
                    None
                }
            }
            _ => None,
        };

        *self = Self::new();
        recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn data() -> StudyData {
        StudyData::with_goals(60, 300)
    }

    #[test]
    fn start_without_subject_is_rejected() {
        let mut timer = StudyTimer::new();
        let err = timer.start(None, 25, at(9, 0, 0)).unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.session_start(), None);
    }

    #[test]
    fn oversized_duration_is_rejected_without_starting() {
        let mut timer = StudyTimer::new();
        let err = timer.start(Some(1), u32::MAX / 2, at(9, 0, 0)).unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn session_length_bounds() {
        assert_eq!(check_minutes(1).unwrap(), 1);
        assert_eq!(check_minutes(MAX_SESSION_MINUTES).unwrap(), MAX_SESSION_MINUTES);
        assert!(check_minutes(0).is_err());
        assert!(check_minutes(MAX_SESSION_MINUTES + 1).is_err());
    }

    #[test]
    fn double_start_is_rejected() {
        let mut timer = StudyTimer::new();
        timer.start(Some(1), 25, at(9, 0, 0)).unwrap();
        assert!(timer.start(Some(2), 50, at(9, 0, 5)).is_err());
        assert_eq!(timer.subject_id(), Some(1));
        assert_eq!(timer.remaining_secs(), 25 * 60);

        timer.pause();
        assert!(timer.start(Some(2), 50, at(9, 0, 5)).is_err());
    }

    #[test]
    fn tick_decrements_only_while_running() {
        let mut timer = StudyTimer::new();
        assert_eq!(timer.tick(), TickOutcome::Idle);

        timer.start(Some(1), 1, at(9, 0, 0)).unwrap();
        assert_eq!(timer.tick(), TickOutcome::Running { remaining_secs: 59 });
        assert!(timer.pause());
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining_secs(), 59);
        assert!(timer.resume());
        assert_eq!(timer.tick(), TickOutcome::Running { remaining_secs: 58 });
        assert_eq!(timer.session_start(), Some(at(9, 0, 0)));
    }

    #[test]
    fn countdown_completes_at_zero() {
        let mut timer = StudyTimer::new();
        timer.start(Some(1), 1, at(9, 0, 0)).unwrap();
        for _ in 0..59 {
            assert!(matches!(timer.tick(), TickOutcome::Running { .. }));
        }
        assert_eq!(timer.tick(), TickOutcome::Completed);
        assert_eq!(timer.progress(), 1.0);

        let mut d = data();
        let session = timer.stop(at(9, 1, 0), &mut d).unwrap();
        assert_eq!(session.duration_minutes, 1);
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn stop_after_ninety_seconds_records_one_minute() {
        let mut timer = StudyTimer::new();
        let mut d = data();
        timer.start(Some(4), 25, at(9, 0, 0)).unwrap();
        let session = timer.stop(at(9, 1, 30), &mut d).unwrap();

        assert_eq!(session.subject_id, 4);
        assert_eq!(session.duration_minutes, 1);
        assert_eq!(d.sessions.len(), 1);
        assert_eq!(d.total_minutes, 1);
        assert_eq!(d.streak, 1);
    }

    #[test]
    fn stop_after_thirty_seconds_records_nothing() {
        let mut timer = StudyTimer::new();
        let mut d = data();
        timer.start(Some(4), 25, at(9, 0, 0)).unwrap();
        assert!(timer.stop(at(9, 0, 30), &mut d).is_none());

        assert!(d.sessions.is_empty());
        assert_eq!(d.streak, 0);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn recorded_duration_is_wall_clock_including_pauses() {
        let mut timer = StudyTimer::new();
        let mut d = data();
        timer.start(Some(1), 25, at(9, 0, 0)).unwrap();
        for _ in 0..120 {
            timer.tick();
        }
        timer.pause();
        let session = timer.stop(at(9, 10, 0), &mut d).unwrap();
        assert_eq!(session.duration_minutes, 10);
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let mut timer = StudyTimer::new();
        let mut d = data();
        assert!(timer.stop(at(9, 0, 0), &mut d).is_none());
        assert_eq!(d, data());
    }

    #[test]
    fn sessions_on_consecutive_days_build_a_streak() {
        let mut timer = StudyTimer::new();
        let mut d = data();
        let day1 = at(20, 0, 0);
        for offset in 0..3 {
            let start = day1 + Duration::days(offset);
            timer.start(Some(1), 25, start).unwrap();
            timer.stop(start + Duration::minutes(25), &mut d).unwrap();
        }
        assert_eq!(d.streak, 3);
        assert_eq!(d.total_minutes, 75);
    }
}
