use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::TrackerError;
use crate::models::{
    class_key, AttendanceStatus, Day, Subject, SubjectAttendance, SubjectId, Timetable,
};

/// Everything the student sets up and marks, in the `app_data` JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub roll_no: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub timetable: Timetable,
    #[serde(default)]
    pub attendance_data: BTreeMap<SubjectId, SubjectAttendance>,
}

/// One scheduled class on a given date.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledClass {
    pub slot: String,
    pub subject: Subject,
    pub key: String,
    pub status: Option<AttendanceStatus>,
}

impl AppState {
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Find a subject by name (case-insensitive) or numeric id.
    pub fn find_subject(&self, query: &str) -> Result<&Subject, TrackerError> {
        self.subjects
            .iter()
            .find(|s| s.matches(query))
            .ok_or_else(|| TrackerError::validation(format!("Unknown subject '{}'", query)))
    }

    pub fn add_subject(&mut self, name: &str) -> Result<&Subject, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::validation("Subject name is required"));
        }
        if self.subjects.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            return Err(TrackerError::validation(format!(
                "Subject '{}' already exists",
                name
            )));
        }
        let id = self.subjects.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        self.subjects.push(Subject::new(id, name));
        self.attendance_data.entry(id).or_default();
        Ok(&self.subjects[self.subjects.len() - 1])
    }

    pub fn add_time_slot(&mut self, label: &str) -> Result<(), TrackerError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(TrackerError::validation("Time slot label is required"));
        }
        if self.time_slots.iter().any(|s| s == label) {
            return Err(TrackerError::validation(format!(
                "Time slot '{}' already exists",
                label
            )));
        }
        self.time_slots.push(label.to_string());
        Ok(())
    }

    pub fn set_class(&mut self, day: Day, slot: &str, subject_id: SubjectId) -> Result<(), TrackerError> {
        if !self.time_slots.iter().any(|s| s == slot) {
            return Err(TrackerError::validation(format!("Unknown time slot '{}'", slot)));
        }
        if self.subject(subject_id).is_none() {
            return Err(TrackerError::validation(format!("Unknown subject id {}", subject_id)));
        }
        self.timetable
            .entry(day)
            .or_default()
            .insert(slot.to_string(), subject_id);
        Ok(())
    }

    pub fn clear_class(&mut self, day: Day, slot: &str) -> bool {
        let removed = self
            .timetable
            .get_mut(&day)
            .map(|cells| cells.remove(slot).is_some())
            .unwrap_or(false);
        if self.timetable.get(&day).is_some_and(|cells| cells.is_empty()) {
            self.timetable.remove(&day);
        }
        removed
    }

    /// Record one class occurrence. A key can only be marked once.
    pub fn mark(
        &mut self,
        subject_id: SubjectId,
        date: NaiveDate,
        slot: &str,
        status: AttendanceStatus,
    ) -> Result<String, TrackerError> {
        if self.subject(subject_id).is_none() {
            return Err(TrackerError::validation(format!("Unknown subject id {}", subject_id)));
        }
        let slot = slot.trim();
        if slot.is_empty() {
            return Err(TrackerError::validation("Time slot is required"));
        }
        if !self.time_slots.iter().any(|s| s == slot) {
            return Err(TrackerError::validation(format!("Unknown time slot '{}'", slot)));
        }
        let key = class_key(subject_id, date, slot);
        self.attendance_data
            .entry(subject_id)
            .or_default()
            .mark(key.clone(), status)?;
        log::info!("Marked {} as {}", key, status.as_str());
        Ok(key)
    }

    pub fn attendance(&self, subject_id: SubjectId) -> SubjectAttendance {
        self.attendance_data
            .get(&subject_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Timetable classes for the weekday of `date`, in slot order.
    pub fn classes_on(&self, date: NaiveDate) -> Vec<ScheduledClass> {
        let Some(cells) = self.timetable.get(&Day::of(date)) else {
            return Vec::new();
        };

        let mut classes: Vec<ScheduledClass> = cells
            .iter()
            .filter_map(|(slot, id)| {
                let subject = self.subject(*id)?.clone();
                let key = class_key(*id, date, slot);
                let status = self
                    .attendance_data
                    .get(id)
                    .and_then(|att| att.status_of(&key));
                Some(ScheduledClass {
                    slot: slot.clone(),
                    subject,
                    key,
                    status,
                })
            })
            .collect();

        let position = |slot: &str| {
            self.time_slots
                .iter()
                .position(|s| s == slot)
                .unwrap_or(usize::MAX)
        };
        classes.sort_by_key(|c| position(&c.slot));
        classes
    }

    /// Attendance across all subjects, 0 when nothing has been marked.
    pub fn overall_percentage(&self) -> f64 {
        let (attended, total) = self
            .attendance_data
            .values()
            .fold((0u32, 0u32), |(a, t), att| (a + att.attended, t + att.total));
        if total == 0 {
            0.0
        } else {
            attended as f64 / total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> AppState {
        let mut state = AppState::default();
        state.add_subject("Maths").unwrap();
        state.add_subject("Physics").unwrap();
        state.add_time_slot("9:00-10:00").unwrap();
        state.add_time_slot("10:00-11:00").unwrap();
        state
    }

    #[test]
    fn subject_ids_are_unique_and_stable() {
        let mut state = sample();
        assert_eq!(state.subjects[0].id, 1);
        assert_eq!(state.subjects[1].id, 2);
        let chem = state.add_subject("Chemistry").unwrap().id;
        assert_eq!(chem, 3);
        assert!(state.add_subject("maths").is_err());
        assert!(state.add_subject("  ").is_err());
    }

    #[test]
    fn find_subject_by_name_or_id() {
        let state = sample();
        assert_eq!(state.find_subject("physics").unwrap().id, 2);
        assert_eq!(state.find_subject("1").unwrap().name, "Maths");
        assert!(matches!(
            state.find_subject("History"),
            Err(TrackerError::Validation(_))
        ));
    }

    #[test]
    fn marking_twice_is_rejected_without_changes() {
        let mut state = sample();
        let d = date("2024-02-05");
        state.mark(1, d, "9:00-10:00", AttendanceStatus::Present).unwrap();

        let err = state
            .mark(1, d, "9:00-10:00", AttendanceStatus::Absent)
            .unwrap_err();
        assert!(matches!(err, TrackerError::DuplicateMarking { .. }));
        let att = state.attendance(1);
        assert_eq!((att.attended, att.total), (1, 1));

        // Same subject, different slot or date is a different class.
        state.mark(1, d, "10:00-11:00", AttendanceStatus::Absent).unwrap();
        state
            .mark(1, date("2024-02-06"), "9:00-10:00", AttendanceStatus::Present)
            .unwrap();
        let att = state.attendance(1);
        assert_eq!((att.attended, att.total), (2, 3));
    }

    #[test]
    fn slot_is_trimmed_before_building_the_key() {
        let mut state = sample();
        let d = date("2024-02-05");
        let key = state.mark(1, d, " 9:00-10:00 ", AttendanceStatus::Present).unwrap();
        assert_eq!(key, "1-2024-02-05-9:00-10:00");

        let err = state
            .mark(1, d, "9:00-10:00 ", AttendanceStatus::Present)
            .unwrap_err();
        assert!(matches!(err, TrackerError::DuplicateMarking { .. }));
        let att = state.attendance(1);
        assert_eq!((att.attended, att.total), (1, 1));
    }

    #[test]
    fn marking_unknown_slot_is_rejected() {
        let mut state = sample();
        let d = date("2024-02-05");
        state.mark(1, d, "9:00-10:00", AttendanceStatus::Present).unwrap();

        let err = state
            .mark(1, d, "not-a-slot", AttendanceStatus::Present)
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert!(state.mark(1, d, "   ", AttendanceStatus::Absent).is_err());
        let att = state.attendance(1);
        assert_eq!((att.attended, att.total), (1, 1));
    }

    #[test]
    fn marking_unknown_subject_is_a_validation_error() {
        let mut state = sample();
        let err = state
            .mark(42, date("2024-02-05"), "9:00-10:00", AttendanceStatus::Present)
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert!(state.attendance_data.get(&42).is_none());
    }

    #[test]
    fn classes_on_follow_timetable_and_slot_order() {
        let mut state = sample();
        // 2024-02-05 is a Monday.
        state.set_class(Day::Monday, "10:00-11:00", 2).unwrap();
        state.set_class(Day::Monday, "9:00-10:00", 1).unwrap();
        state
            .mark(2, date("2024-02-05"), "10:00-11:00", AttendanceStatus::Absent)
            .unwrap();

        let classes = state.classes_on(date("2024-02-05"));
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].subject.name, "Maths");
        assert_eq!(classes[0].status, None);
        assert_eq!(classes[1].subject.name, "Physics");
        assert_eq!(classes[1].status, Some(AttendanceStatus::Absent));

        assert!(state.classes_on(date("2024-02-06")).is_empty());
    }

    #[test]
    fn set_class_requires_known_slot_and_subject() {
        let mut state = sample();
        assert!(state.set_class(Day::Friday, "13:00-14:00", 1).is_err());
        assert!(state.set_class(Day::Friday, "9:00-10:00", 9).is_err());
        state.set_class(Day::Friday, "9:00-10:00", 1).unwrap();
        assert!(state.clear_class(Day::Friday, "9:00-10:00"));
        assert!(state.timetable.is_empty());
    }

    #[test]
    fn overall_percentage_spans_subjects() {
        let mut state = sample();
        let d = date("2024-02-05");
        let next = date("2024-02-06");
        state.mark(1, d, "9:00-10:00", AttendanceStatus::Present).unwrap();
        state.mark(2, d, "9:00-10:00", AttendanceStatus::Absent).unwrap();
        state.mark(2, d, "10:00-11:00", AttendanceStatus::Present).unwrap();
        state.mark(2, next, "9:00-10:00", AttendanceStatus::Present).unwrap();
        assert_eq!(state.overall_percentage(), 75.0);
        assert_eq!(AppState::default().overall_percentage(), 0.0);
    }

    #[test]
    fn app_data_json_round_trips() {
        let mut state = sample();
        state.student_name = "Asha".into();
        state.set_class(Day::Monday, "9:00-10:00", 1).unwrap();
        state
            .mark(1, date("2024-02-05"), "9:00-10:00", AttendanceStatus::Present)
            .unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["studentName"], "Asha");
        assert_eq!(json["attendanceData"]["1"]["attended"], 1);
        assert_eq!(
            json["attendanceData"]["1"]["records"][0]["key"],
            "1-2024-02-05-9:00-10:00"
        );
        let back: AppState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
