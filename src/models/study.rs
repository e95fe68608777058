use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::SubjectId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    pub duration_minutes: u32,
}

/// Per-user study history. Sessions are kept in append (chronological) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyData {
    #[serde(default)]
    pub sessions: Vec<StudySession>,
    #[serde(default)]
    pub total_minutes: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_study_date: Option<NaiveDate>,
    pub daily_goal_minutes: u32,
    pub weekly_goal_minutes: u32,
}

impl StudyData {
    pub fn with_goals(daily_goal_minutes: u32, weekly_goal_minutes: u32) -> Self {
        Self {
            sessions: Vec::new(),
            total_minutes: 0,
            streak: 0,
            last_study_date: None,
            daily_goal_minutes,
            weekly_goal_minutes,
        }
    }

    /// Append a finished session and fold it into the totals and streak.
    pub fn record_session(&mut self, session: StudySession) {
        let day = session.date;
        match self.last_study_date {
            Some(last) if last == day => {}
            Some(last) if last.succ_opt() == Some(day) => self.streak += 1,
            _ => self.streak = 1,
        }
        self.last_study_date = Some(day);
        self.total_minutes += session.duration_minutes;
        self.sessions.push(session);
    }

    /// Streak as seen on `today`: a streak whose last day is before yesterday
    /// has lapsed even though it is only reset by the next session.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        match self.last_study_date {
            Some(last) if last == today || last.succ_opt() == Some(today) => self.streak,
            _ => 0,
        }
    }

    pub fn minutes_on(&self, date: NaiveDate) -> u32 {
        self.sessions
            .iter()
            .filter(|s| s.date == date)
            .map(|s| s.duration_minutes)
            .sum()
    }

    /// Minutes studied over the seven days ending on `date`.
    pub fn minutes_in_week(&self, date: NaiveDate) -> u32 {
        let start = date - Duration::days(WEEK_DAYS - 1);
        self.sessions
            .iter()
            .filter(|s| s.date >= start && s.date <= date)
            .map(|s| s.duration_minutes)
            .sum()
    }

    pub fn daily_progress(&self, today: NaiveDate) -> GoalProgress {
        GoalProgress::new(self.minutes_on(today), self.daily_goal_minutes)
    }

    pub fn weekly_progress(&self, today: NaiveDate) -> GoalProgress {
        GoalProgress::new(self.minutes_in_week(today), self.weekly_goal_minutes)
    }

    pub fn minutes_by_subject(&self) -> BTreeMap<SubjectId, u32> {
        let mut totals = BTreeMap::new();
        for s in &self.sessions {
            *totals.entry(s.subject_id).or_insert(0) += s.duration_minutes;
        }
        totals
    }

    /// The `n` most recent sessions, newest first.
    pub fn recent(&self, n: usize) -> Vec<&StudySession> {
        self.sessions.iter().rev().take(n).collect()
    }

    /// Sessions dated within the given bounds (both inclusive), newest first.
    pub fn sessions_between(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<&StudySession> {
        self.sessions
            .iter()
            .rev()
            .filter(|s| from.is_none_or(|f| s.date >= f))
            .filter(|s| to.is_none_or(|t| s.date <= t))
            .collect()
    }

    /// Minutes per day for the `days` days ending on `today`, oldest first.
    pub fn minutes_by_day(&self, today: NaiveDate, days: u32) -> Vec<(NaiveDate, u32)> {
        (0..days as i64)
            .rev()
            .map(|back| {
                let date = today - Duration::days(back);
                (date, self.minutes_on(date))
            })
            .collect()
    }
}

pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub done: u32,
    pub goal: u32,
}

impl GoalProgress {
    pub fn new(done: u32, goal: u32) -> Self {
        Self { done, goal }
    }

    pub fn ratio(&self) -> f64 {
        if self.goal == 0 {
            0.0
        } else {
            (self.done as f64 / self.goal as f64).min(1.0)
        }
    }

    pub fn reached(&self) -> bool {
        self.goal > 0 && self.done >= self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn session(date: &str, minutes: u32) -> StudySession {
        StudySession {
            subject_id: 1,
            date: day(date),
            duration_minutes: minutes,
        }
    }

    #[test]
    fn first_session_starts_streak_at_one() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 25));
        assert_eq!(data.streak, 1);
        assert_eq!(data.last_study_date, Some(day("2024-03-01")));
        assert_eq!(data.total_minutes, 25);
    }

    #[test]
    fn consecutive_days_increment_streak() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 25));
        data.record_session(session("2024-03-02", 25));
        data.record_session(session("2024-03-03", 10));
        assert_eq!(data.streak, 3);
        assert_eq!(data.total_minutes, 60);
    }

    #[test]
    fn second_session_same_day_keeps_streak() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 25));
        data.record_session(session("2024-03-02", 25));
        data.record_session(session("2024-03-02", 5));
        assert_eq!(data.streak, 2);
        assert_eq!(data.sessions.len(), 3);
    }

    #[test]
    fn skipped_day_resets_streak_to_one() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 25));
        data.record_session(session("2024-03-02", 25));
        data.record_session(session("2024-03-04", 25));
        assert_eq!(data.streak, 1);
        assert_eq!(data.last_study_date, Some(day("2024-03-04")));
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-02-29", 25));
        data.record_session(session("2024-03-01", 25));
        assert_eq!(data.streak, 2);
    }

    #[test]
    fn current_streak_lapses_after_a_missed_day() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 25));
        data.record_session(session("2024-03-02", 25));
        assert_eq!(data.current_streak(day("2024-03-02")), 2);
        assert_eq!(data.current_streak(day("2024-03-03")), 2);
        assert_eq!(data.current_streak(day("2024-03-04")), 0);
    }

    #[test]
    fn goal_progress_counts_today_and_the_last_seven_days() {
        let mut data = StudyData::with_goals(60, 240);
        data.record_session(session("2024-02-28", 20));
        data.record_session(session("2024-03-03", 90));
        data.record_session(session("2024-03-04", 30));
        data.record_session(session("2024-03-06", 45));

        let daily = data.daily_progress(day("2024-03-06"));
        assert_eq!(daily, GoalProgress::new(45, 60));
        assert!(!daily.reached());

        // 2024-02-29 .. 2024-03-06; the 28th falls outside.
        let weekly = data.weekly_progress(day("2024-03-06"));
        assert_eq!(weekly.done, 165);
        assert!((weekly.ratio() - 0.6875).abs() < 1e-9);
    }

    #[test]
    fn weekly_window_reaches_back_across_monday() {
        let mut data = StudyData::with_goals(60, 300);
        // 2024-03-05 is a Tuesday; the window starts on Wednesday 2024-02-28.
        data.record_session(session("2024-02-27", 50));
        data.record_session(session("2024-02-28", 40));
        data.record_session(session("2024-03-03", 25));
        data.record_session(session("2024-03-05", 10));
        assert_eq!(data.minutes_in_week(day("2024-03-05")), 75);
        assert_eq!(data.minutes_in_week(day("2024-03-04")), 115);
    }

    #[test]
    fn recent_lists_newest_first() {
        let mut data = StudyData::with_goals(60, 300);
        for (i, date) in ["2024-03-01", "2024-03-02", "2024-03-03"].iter().enumerate() {
            data.record_session(session(date, 10 + i as u32));
        }
        let recent = data.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, day("2024-03-03"));
        assert_eq!(recent[1].date, day("2024-03-02"));
        assert_eq!(data.recent(10).len(), 3);
    }

    #[test]
    fn sessions_between_applies_either_bound() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 10));
        data.record_session(session("2024-03-03", 20));
        data.record_session(session("2024-03-05", 30));

        let mid = data.sessions_between(Some(day("2024-03-02")), Some(day("2024-03-05")));
        let minutes: Vec<u32> = mid.iter().map(|s| s.duration_minutes).collect();
        assert_eq!(minutes, vec![30, 20]);

        assert_eq!(data.sessions_between(None, Some(day("2024-03-01"))).len(), 1);
        assert_eq!(data.sessions_between(Some(day("2024-03-04")), None).len(), 1);
        assert!(data
            .sessions_between(Some(day("2024-03-06")), None)
            .is_empty());
    }

    #[test]
    fn minutes_by_day_fills_empty_days() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-02-27", 99));
        data.record_session(session("2024-03-01", 25));
        data.record_session(session("2024-03-01", 5));
        data.record_session(session("2024-03-04", 40));

        let days = data.minutes_by_day(day("2024-03-04"), 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], (day("2024-02-27"), 99));
        assert_eq!(days[3], (day("2024-03-01"), 30));
        assert_eq!(days[5], (day("2024-03-03"), 0));
        assert_eq!(days[6], (day("2024-03-04"), 40));
    }

    #[test]
    fn ratio_is_capped_and_zero_goal_is_empty() {
        assert_eq!(GoalProgress::new(200, 100).ratio(), 1.0);
        assert_eq!(GoalProgress::new(50, 0).ratio(), 0.0);
        assert!(!GoalProgress::new(50, 0).reached());
    }

    #[test]
    fn minutes_grouped_by_subject() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 25));
        data.record_session(StudySession {
            subject_id: 2,
            date: day("2024-03-01"),
            duration_minutes: 40,
        });
        data.record_session(session("2024-03-02", 5));
        let totals = data.minutes_by_subject();
        assert_eq!(totals.get(&1), Some(&30));
        assert_eq!(totals.get(&2), Some(&40));
    }

    #[test]
    fn blob_uses_camel_case_fields() {
        let mut data = StudyData::with_goals(60, 300);
        data.record_session(session("2024-03-01", 25));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["totalMinutes"], 25);
        assert_eq!(json["lastStudyDate"], "2024-03-01");
        assert_eq!(json["sessions"][0]["durationMinutes"], 25);
    }
}
