use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TrackerError;
use crate::models::SubjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" | "p" => Ok(AttendanceStatus::Present),
            "absent" | "a" => Ok(AttendanceStatus::Absent),
            _ => Err(anyhow::anyhow!("Unknown attendance status: {}", s)),
        }
    }
}

/// Composite key identifying one class occurrence: `{subject}-{date}-{slot}`.
pub fn class_key(subject_id: SubjectId, date: NaiveDate, slot: &str) -> String {
    format!("{}-{}-{}", subject_id, date.format("%Y-%m-%d"), slot)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub key: String,
    pub status: AttendanceStatus,
}

/// Running counters for one subject. Only `mark` mutates them, which keeps
/// `total == records.len()` and `attended == present records`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectAttendance {
    pub total: u32,
    pub attended: u32,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

impl SubjectAttendance {
    /// Rebuild the counters from a record list (used when loading from storage).
    pub fn from_records(records: Vec<AttendanceRecord>) -> Self {
        let attended = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count() as u32;
        Self {
            total: records.len() as u32,
            attended,
            records,
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.records.iter().any(|r| r.key == key)
    }

    pub fn status_of(&self, key: &str) -> Option<AttendanceStatus> {
        self.records.iter().find(|r| r.key == key).map(|r| r.status)
    }

    pub fn mark(&mut self, key: String, status: AttendanceStatus) -> Result<(), TrackerError> {
        if self.has_key(&key) {
            return Err(TrackerError::DuplicateMarking { key });
        }
        self.total += 1;
        if status == AttendanceStatus::Present {
            self.attended += 1;
        }
        self.records.push(AttendanceRecord { key, status });
        Ok(())
    }

    /// Percentage attended, 0 when no classes have been held.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.attended as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn key_joins_subject_date_and_slot() {
        assert_eq!(
            class_key(3, date("2024-02-05"), "9:00-10:00"),
            "3-2024-02-05-9:00-10:00"
        );
    }

    #[test]
    fn mark_keeps_counters_in_sync() {
        let mut att = SubjectAttendance::default();
        att.mark("1-a".into(), AttendanceStatus::Present).unwrap();
        att.mark("1-b".into(), AttendanceStatus::Absent).unwrap();
        att.mark("1-c".into(), AttendanceStatus::Present).unwrap();

        assert_eq!(att.total, 3);
        assert_eq!(att.attended, 2);
        assert_eq!(att.total as usize, att.records.len());
        assert_eq!(att, SubjectAttendance::from_records(att.records.clone()));
    }

    #[test]
    fn second_mark_of_same_key_is_rejected() {
        let mut att = SubjectAttendance::default();
        att.mark("1-a".into(), AttendanceStatus::Present).unwrap();

        let err = att.mark("1-a".into(), AttendanceStatus::Absent).unwrap_err();
        assert_eq!(err, TrackerError::DuplicateMarking { key: "1-a".into() });
        assert_eq!(att.total, 1);
        assert_eq!(att.attended, 1);
        assert_eq!(att.status_of("1-a"), Some(AttendanceStatus::Present));
    }

    #[test]
    fn percentage_of_empty_subject_is_zero() {
        assert_eq!(SubjectAttendance::default().percentage(), 0.0);
    }

    #[test]
    fn status_parses_short_forms() {
        assert_eq!("P".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert_eq!("absent".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Absent);
        assert!("late".parse::<AttendanceStatus>().is_err());
    }
}
