use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::migrations::run_migrations;
use crate::db::repository::{
    AttendanceRepo, MetaRepo, SlotRepo, StudyRepo, SubjectRepo, TimetableRepo,
};
use crate::error::TrackerError;
use crate::models::StudyData;
use crate::state::AppState;
use crate::store::Store;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an open connection, running migrations first.
    pub fn new(conn: Connection) -> Result<Self> {
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn read_state(&self) -> Result<AppState> {
        let mut attendance_data = AttendanceRepo::get_all(&self.conn)?;
        let subjects = SubjectRepo::get_all(&self.conn)?;
        for s in &subjects {
            attendance_data.entry(s.id).or_default();
        }

        Ok(AppState {
            student_name: MetaRepo::get(&self.conn, "student_name")?.unwrap_or_default(),
            roll_no: MetaRepo::get(&self.conn, "roll_no")?.unwrap_or_default(),
            subjects,
            time_slots: SlotRepo::get_all(&self.conn)?,
            timetable: TimetableRepo::get(&self.conn)?,
            attendance_data,
        })
    }

    fn write_state(&self, state: &AppState) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Starting transaction")?;
        MetaRepo::set(&tx, "student_name", &state.student_name)?;
        MetaRepo::set(&tx, "roll_no", &state.roll_no)?;
        SubjectRepo::replace_all(&tx, &state.subjects)?;
        SlotRepo::replace_all(&tx, &state.time_slots)?;
        TimetableRepo::replace_all(&tx, &state.timetable)?;
        AttendanceRepo::replace_all(&tx, &state.attendance_data)?;
        tx.commit().context("Committing state")?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn load_state(&self) -> Result<AppState, TrackerError> {
        let state = self.read_state().map_err(TrackerError::storage)?;
        log::debug!(
            "Loaded {} subjects, {} time slots",
            state.subjects.len(),
            state.time_slots.len()
        );
        Ok(state)
    }

    fn save_state(&self, state: &AppState) -> Result<(), TrackerError> {
        self.write_state(state).map_err(TrackerError::storage)?;
        log::debug!("Saved application state");
        Ok(())
    }

    fn load_study(&self, username: &str) -> Result<Option<StudyData>, TrackerError> {
        StudyRepo::get(&self.conn, username).map_err(TrackerError::storage)
    }

    fn save_study(&self, username: &str, data: &StudyData) -> Result<(), TrackerError> {
        StudyRepo::put(&self.conn, username, data).map_err(TrackerError::storage)?;
        log::debug!("Saved study data for '{}'", username);
        Ok(())
    }

    fn clear_study(&self, username: &str) -> Result<(), TrackerError> {
        StudyRepo::delete(&self.conn, username)
            .map(|_| ())
            .map_err(TrackerError::storage)
    }

    fn is_setup_done(&self) -> Result<bool, TrackerError> {
        let done = MetaRepo::get(&self.conn, "setup_done").map_err(TrackerError::storage)?;
        Ok(done.as_deref() == Some("1"))
    }

    fn set_setup_done(&self, done: bool) -> Result<(), TrackerError> {
        MetaRepo::set(&self.conn, "setup_done", if done { "1" } else { "0" })
            .map_err(TrackerError::storage)
    }
}
