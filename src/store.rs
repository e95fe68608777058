use crate::error::TrackerError;
use crate::models::StudyData;
use crate::state::AppState;

/// Persistence boundary for the application state and per-user study data.
///
/// Every write replaces what was stored before (last write wins).
pub trait Store {
    fn load_state(&self) -> Result<AppState, TrackerError>;
    fn save_state(&self, state: &AppState) -> Result<(), TrackerError>;

    /// Stored study data for `username`, if any has been saved.
    fn load_study(&self, username: &str) -> Result<Option<StudyData>, TrackerError>;
    fn save_study(&self, username: &str, data: &StudyData) -> Result<(), TrackerError>;
    fn clear_study(&self, username: &str) -> Result<(), TrackerError>;

    /// Drop subjects, timetable and attendance. Study data is kept.
    fn reset(&self) -> Result<(), TrackerError> {
        self.save_state(&AppState::default())
    }

    fn is_setup_done(&self) -> Result<bool, TrackerError>;
    fn set_setup_done(&self, done: bool) -> Result<(), TrackerError>;
}

/// Study data for `username`, seeded with the given goals the first time.
pub fn load_study_or_default(
    store: &dyn Store,
    username: &str,
    daily_goal_minutes: u32,
    weekly_goal_minutes: u32,
) -> Result<StudyData, TrackerError> {
    Ok(store
        .load_study(username)?
        .unwrap_or_else(|| StudyData::with_goals(daily_goal_minutes, weekly_goal_minutes)))
}
