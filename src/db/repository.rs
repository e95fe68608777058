use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::{
    AttendanceRecord, AttendanceStatus, Day, StudyData, Subject, SubjectAttendance, SubjectId,
    Timetable,
};

// ─── Subjects ────────────────────────────────────────────────────────────────

pub struct SubjectRepo;

impl SubjectRepo {
    pub fn get_all(conn: &Connection) -> Result<Vec<Subject>> {
        let mut stmt = conn.prepare("SELECT id, name FROM subjects ORDER BY position, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn replace_all(conn: &Connection, subjects: &[Subject]) -> Result<()> {
        conn.execute("DELETE FROM subjects", [])?;
        for (position, subject) in subjects.iter().enumerate() {
            conn.execute(
                "INSERT INTO subjects (id, name, position) VALUES (?1, ?2, ?3)",
                params![subject.id, subject.name, position as i64],
            )
            .with_context(|| format!("Saving subject '{}'", subject.name))?;
        }
        Ok(())
    }
}

// ─── Time slots ──────────────────────────────────────────────────────────────

pub struct SlotRepo;

impl SlotRepo {
    pub fn get_all(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare("SELECT label FROM time_slots ORDER BY position, label")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn replace_all(conn: &Connection, slots: &[String]) -> Result<()> {
        conn.execute("DELETE FROM time_slots", [])?;
        for (position, label) in slots.iter().enumerate() {
            conn.execute(
                "INSERT INTO time_slots (label, position) VALUES (?1, ?2)",
                params![label, position as i64],
            )?;
        }
        Ok(())
    }
}

// ─── Timetable ───────────────────────────────────────────────────────────────

pub struct TimetableRepo;

impl TimetableRepo {
    pub fn get(conn: &Connection) -> Result<Timetable> {
        let mut stmt = conn.prepare("SELECT day, slot, subject_id FROM timetable")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, SubjectId>(2)?,
            ))
        })?;

        let mut timetable = Timetable::new();
        for r in rows {
            let (day, slot, subject_id) = r?;
            let day = Day::from_str(&day)
                .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?;
            timetable.entry(day).or_default().insert(slot, subject_id);
        }
        Ok(timetable)
    }

    pub fn replace_all(conn: &Connection, timetable: &Timetable) -> Result<()> {
        conn.execute("DELETE FROM timetable", [])?;
        for (day, cells) in timetable {
            for (slot, subject_id) in cells {
                conn.execute(
                    "INSERT INTO timetable (day, slot, subject_id) VALUES (?1, ?2, ?3)",
                    params![day.display_name(), slot, subject_id],
                )?;
            }
        }
        Ok(())
    }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Records grouped by subject, in the order they were marked.
    pub fn get_all(conn: &Connection) -> Result<BTreeMap<SubjectId, SubjectAttendance>> {
        let mut stmt = conn.prepare(
            "SELECT subject_id, key, status FROM attendance_records ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, SubjectId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut grouped: BTreeMap<SubjectId, Vec<AttendanceRecord>> = BTreeMap::new();
        for r in rows {
            let (subject_id, key, status) = r?;
            grouped.entry(subject_id).or_default().push(AttendanceRecord {
                key,
                status: AttendanceStatus::from_str(&status)
                    .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?,
            });
        }

        Ok(grouped
            .into_iter()
            .map(|(id, records)| (id, SubjectAttendance::from_records(records)))
            .collect())
    }

    pub fn replace_all(
        conn: &Connection,
        data: &BTreeMap<SubjectId, SubjectAttendance>,
    ) -> Result<()> {
        conn.execute("DELETE FROM attendance_records", [])?;
        for (subject_id, att) in data {
            for record in &att.records {
                conn.execute(
                    "INSERT INTO attendance_records (subject_id, key, status) VALUES (?1, ?2, ?3)",
                    params![subject_id, record.key, record.status.as_str()],
                )
                .with_context(|| format!("Saving attendance record {}", record.key))?;
            }
        }
        Ok(())
    }
}

// ─── Study data ──────────────────────────────────────────────────────────────

pub struct StudyRepo;

impl StudyRepo {
    pub fn get(conn: &Connection, username: &str) -> Result<Option<StudyData>> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT data FROM study_data WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            None => Ok(None),
            Some(raw) => {
                let data = serde_json::from_str(&raw)
                    .with_context(|| format!("Parsing study data for '{}'", username))?;
                Ok(Some(data))
            }
        }
    }

    pub fn put(conn: &Connection, username: &str, data: &StudyData) -> Result<()> {
        let raw = serde_json::to_string(data).context("Serializing study data")?;
        conn.execute(
            "INSERT INTO study_data (username, data, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(username) DO UPDATE SET data = ?2, updated_at = datetime('now')",
            params![username, raw],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, username: &str) -> Result<bool> {
        let n = conn.execute(
            "DELETE FROM study_data WHERE username = ?1",
            params![username],
        )?;
        Ok(n > 0)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}
