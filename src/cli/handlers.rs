use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::cli::args::{SlotCommands, StudyCommands, SubjectCommands, TimetableCommands};
use crate::config::AppConfig;
use crate::error::TrackerError;
use crate::models::{AttendanceStatus, Day, StudyData, StudySession};
use crate::projector::{current_percentage, project_subject, Standing};
use crate::state::AppState;
use crate::store::{load_study_or_default, Store};
use crate::timer::check_minutes;
use crate::utils::format::{format_minutes, format_percent, pad, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const TEAL: &str = "\x1b[38;2;72;170;160m";

const HISTORY_LIMIT: usize = 10;

// ─── Setup ───────────────────────────────────────────────────────────────────

pub fn handle_setup(
    store: &dyn Store,
    config: &mut AppConfig,
    reset: bool,
    name: Option<String>,
    roll: Option<String>,
    username: Option<String>,
) -> Result<()> {
    let nothing_given = name.is_none() && roll.is_none() && username.is_none();
    if !reset && nothing_given && store.is_setup_done()? {
        println!("bunkwise is already configured. Use --reset to start over, or pass --name/--roll/--username.");
        return Ok(());
    }

    if reset {
        store.reset()?;
        println_colored!(AMBER, "  Subjects, timetable and attendance cleared");
    }

    let mut state = store.load_state()?;
    state.student_name = match name {
        Some(n) => n,
        None if nothing_given => prompt_default("  Student name", &state.student_name)?,
        None => state.student_name.clone(),
    };
    state.roll_no = match roll {
        Some(r) => r,
        None if nothing_given => prompt_default("  Roll number", &state.roll_no)?,
        None => state.roll_no.clone(),
    };
    if let Some(u) = username {
        let u = u.trim().to_string();
        if u.is_empty() {
            return Err(anyhow!("Username cannot be empty"));
        }
        config.profile.username = u;
    }

    store.save_state(&state)?;
    config.save().context("Saving config")?;
    store.set_setup_done(true)?;

    println!();
    println_colored!(GREEN, "  ✓ Profile saved for {}", display_name(&state));
    println_colored!(DIM, "  Study data is kept under '{}'", config.profile.username);
    if state.subjects.is_empty() {
        println!();
        println_colored!(DIM, "  Next: bunkwise subject add <name>");
        println_colored!(DIM, "        bunkwise slot add 9:00-10:00");
        println_colored!(DIM, "        bunkwise timetable set mon 9:00-10:00 <subject>");
    }
    println!();
    Ok(())
}

// ─── Subjects, slots, timetable ──────────────────────────────────────────────

pub fn handle_subject(store: &dyn Store, action: &SubjectCommands) -> Result<()> {
    let mut state = store.load_state()?;
    match action {
        SubjectCommands::Add { name } => {
            let subject = state.add_subject(name)?.clone();
            store.save_state(&state)?;
            println_colored!(GREEN, "  ✓ Added subject {} (id {})", subject.name, subject.id);
        }
        SubjectCommands::List => {
            println!();
            if state.subjects.is_empty() {
                println_colored!(DIM, "  No subjects yet. Add one with `bunkwise subject add <name>`");
            }
            for s in &state.subjects {
                println!("  {:>3}  {}", s.id, s.name);
            }
            println!();
        }
    }
    Ok(())
}

pub fn handle_slot(store: &dyn Store, action: &SlotCommands) -> Result<()> {
    let mut state = store.load_state()?;
    match action {
        SlotCommands::Add { label } => {
            state.add_time_slot(label)?;
            store.save_state(&state)?;
            println_colored!(GREEN, "  ✓ Added time slot {}", label.trim());
        }
        SlotCommands::List => {
            println!();
            if state.time_slots.is_empty() {
                println_colored!(DIM, "  No time slots yet. Add one with `bunkwise slot add 9:00-10:00`");
            }
            for slot in &state.time_slots {
                println!("  {}", slot);
            }
            println!();
        }
    }
    Ok(())
}

pub fn handle_timetable(store: &dyn Store, action: &TimetableCommands) -> Result<()> {
    let mut state = store.load_state()?;
    match action {
        TimetableCommands::Set { day, slot, subject } => {
            let day = Day::from_str(day)?;
            let subject = state.find_subject(subject)?.clone();
            state.set_class(day, slot, subject.id)?;
            store.save_state(&state)?;
            println_colored!(GREEN, "  ✓ {} {} → {}", day, slot, subject.name);
        }
        TimetableCommands::Clear { day, slot } => {
            let day = Day::from_str(day)?;
            if state.clear_class(day, slot) {
                store.save_state(&state)?;
                println_colored!(AMBER, "  Cleared {} {}", day, slot);
            } else {
                println_colored!(DIM, "  Nothing scheduled on {} at {}", day, slot);
            }
        }
        TimetableCommands::Show => print_timetable(&state),
    }
    Ok(())
}

fn print_timetable(state: &AppState) {
    println!();
    println_colored!(TEAL, "  Timetable");
    println!();
    if state.timetable.is_empty() {
        println_colored!(DIM, "  Nothing scheduled yet");
        println!();
        return;
    }
    let slot_width = state
        .time_slots
        .iter()
        .map(|s| unicode_width::UnicodeWidthStr::width(s.as_str()))
        .max()
        .unwrap_or(0);
    for day in Day::all() {
        let Some(cells) = state.timetable.get(&day) else {
            continue;
        };
        println_colored!(BOLD, "  {}", day);
        for slot in &state.time_slots {
            if let Some(id) = cells.get(slot) {
                let name = state.subject(*id).map(|s| s.name.as_str()).unwrap_or("?");
                println!("    {}  {}", pad(slot, slot_width), name);
            }
        }
    }
    println!();
}

// ─── Attendance ──────────────────────────────────────────────────────────────

pub fn handle_today(store: &dyn Store) -> Result<()> {
    let state = store.load_state()?;
    let today = Local::now().date_naive();
    let classes = state.classes_on(today);

    println!();
    println_colored!(TEAL, "  {} — {}", Day::of(today), today.format("%Y-%m-%d"));
    println!();
    if classes.is_empty() {
        println_colored!(DIM, "  No classes scheduled today");
    }
    for class in &classes {
        match class.status {
            Some(AttendanceStatus::Present) => {
                println_colored!(GREEN, "  ✓ {}  {}", class.slot, class.subject.name)
            }
            Some(AttendanceStatus::Absent) => {
                println_colored!(RED, "  ✗ {}  {}", class.slot, class.subject.name)
            }
            None => println!("  ○ {}  {}", class.slot, class.subject.name),
        }
    }
    println!();
    Ok(())
}

pub fn handle_mark(
    store: &dyn Store,
    subject: &str,
    slot: &str,
    absent: bool,
    date: Option<&str>,
) -> Result<()> {
    let mut state = store.load_state()?;
    let date = match date {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let subject = state.find_subject(subject)?.clone();
    let status = if absent {
        AttendanceStatus::Absent
    } else {
        AttendanceStatus::Present
    };

    state.mark(subject.id, date, slot, status)?;
    store.save_state(&state)?;

    let att = state.attendance(subject.id);
    let pct = format_percent(att.percentage());
    match status {
        AttendanceStatus::Present => println_colored!(
            GREEN,
            "  ✓ {} marked present ({} / {} — {})",
            subject.name,
            att.attended,
            att.total,
            pct
        ),
        AttendanceStatus::Absent => println_colored!(
            RED,
            "  ✗ {} marked absent ({} / {} — {})",
            subject.name,
            att.attended,
            att.total,
            pct
        ),
    }
    Ok(())
}

pub fn handle_bunk(
    store: &dyn Store,
    config: &AppConfig,
    subject: Option<&str>,
    target: Option<f64>,
) -> Result<()> {
    let state = store.load_state()?;
    let target = target.unwrap_or(config.attendance.target_percent);
    let limits = config.attendance.limits();

    let subjects = match subject {
        Some(q) => vec![state.find_subject(q)?.clone()],
        None => state.subjects.clone(),
    };

    println!();
    println_colored!(TEAL, "  Bunk calculator — target {}", format_percent(target));
    println!();
    for s in &subjects {
        let att = state.attendance(s.id);
        let outcome = project_subject(&att, target, limits)?;
        let color = match Standing::of(&outcome) {
            Standing::Safe => GREEN,
            Standing::AtRisk => AMBER,
            Standing::Short => RED,
        };
        println_colored!(
            BOLD,
            "  {}  {} / {} ({})",
            s.name,
            att.attended,
            att.total,
            format_percent(current_percentage(att.attended, att.total))
        );
        println_colored!(color, "    {}", outcome);
    }
    println!();
    Ok(())
}

pub fn handle_stats(store: &dyn Store, config: &AppConfig) -> Result<()> {
    let state = store.load_state()?;
    let target = config.attendance.target_percent;
    let limits = config.attendance.limits();

    println!();
    println_colored!(TEAL, "  Attendance — {}", display_name(&state));
    println!();

    let name_width = state
        .subjects
        .iter()
        .map(|s| unicode_width::UnicodeWidthStr::width(s.name.as_str()))
        .max()
        .unwrap_or(0);

    for s in &state.subjects {
        let att = state.attendance(s.id);
        let standing = Standing::of(&project_subject(&att, target, limits)?);
        let color = match standing {
            Standing::Safe => GREEN,
            Standing::AtRisk => AMBER,
            Standing::Short => RED,
        };
        println_colored!(
            color,
            "  {}  {}  {:>3}/{:<3}  {:>6}  {}",
            pad(&s.name, name_width),
            progress_bar(att.percentage() / 100.0, 12),
            att.attended,
            att.total,
            format_percent(att.percentage()),
            standing.label()
        );
    }

    println!();
    println_colored!(
        BOLD,
        "  Overall: {}  (target {})",
        format_percent(state.overall_percentage()),
        format_percent(target)
    );
    println!();
    Ok(())
}

// ─── Study ───────────────────────────────────────────────────────────────────

pub fn handle_study(store: &dyn Store, config: &AppConfig, action: &StudyCommands) -> Result<()> {
    let username = &config.profile.username;
    match action {
        StudyCommands::Timer { subject, minutes } => {
            let state = store.load_state()?;
            let subject = state.find_subject(subject)?.clone();
            let minutes = check_minutes(minutes.unwrap_or(config.study.default_minutes))?;
            crate::tui::app::run(store, config.clone(), Some((subject.id, minutes)))?;
        }
        StudyCommands::Stats => {
            let state = store.load_state()?;
            let data = load_study_or_default(
                store,
                username,
                config.study.daily_goal_minutes,
                config.study.weekly_goal_minutes,
            )?;
            let today = Local::now().date_naive();
            let daily = data.daily_progress(today);
            let weekly = data.weekly_progress(today);

            println!();
            println_colored!(TEAL, "  Study — {}", username);
            println!();
            println_colored!(
                BOLD,
                "  Streak:  {} days  |  Total: {}  |  Sessions: {}",
                data.current_streak(today),
                format_minutes(data.total_minutes),
                data.sessions.len()
            );
            println!(
                "  Today:   {}  {} / {}",
                progress_bar(daily.ratio(), 12),
                format_minutes(daily.done),
                format_minutes(daily.goal)
            );
            println!(
                "  Week:    {}  {} / {}",
                progress_bar(weekly.ratio(), 12),
                format_minutes(weekly.done),
                format_minutes(weekly.goal)
            );

            let by_subject = data.minutes_by_subject();
            if !by_subject.is_empty() {
                println!();
                for (id, minutes) in &by_subject {
                    let name = state
                        .subject(*id)
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| format!("subject {}", id));
                    println!("  {}  {}", pad(&name, 20), format_minutes(*minutes));
                }
            }
            println!();
        }
        StudyCommands::History { from, to } => {
            let state = store.load_state()?;
            let data = load_study_or_default(
                store,
                username,
                config.study.daily_goal_minutes,
                config.study.weekly_goal_minutes,
            )?;
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            let filtered = from.is_some() || to.is_some();
            let sessions = study_history(&data, from, to)?;

            println!();
            println_colored!(TEAL, "  Study history — {}", username);
            println!();
            if data.sessions.is_empty() {
                println_colored!(DIM, "  No study sessions recorded yet");
            } else if sessions.is_empty() {
                println_colored!(AMBER, "  No sessions found for the selected dates");
            }
            for session in &sessions {
                let name = state
                    .subject(session.subject_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                println!(
                    "  {}  {}  {}  {}",
                    session.date.format("%Y-%m-%d"),
                    pad(Day::of(session.date).display_name(), 9),
                    pad(&name, 20),
                    format_minutes(session.duration_minutes)
                );
            }
            if filtered && !sessions.is_empty() {
                println!();
                println_colored!(DIM, "  {} session(s) in range", sessions.len());
            } else if !filtered && data.sessions.len() > HISTORY_LIMIT {
                println!();
                println_colored!(
                    DIM,
                    "  Showing {} most recent of {} sessions",
                    HISTORY_LIMIT,
                    data.sessions.len()
                );
            }
            println!();
        }
        StudyCommands::Goal { daily, weekly } => {
            let mut data = load_study_or_default(
                store,
                username,
                config.study.daily_goal_minutes,
                config.study.weekly_goal_minutes,
            )?;
            if let Some(d) = daily {
                data.daily_goal_minutes = *d;
            }
            if let Some(w) = weekly {
                data.weekly_goal_minutes = *w;
            }
            store.save_study(username, &data)?;
            println_colored!(
                GREEN,
                "  ✓ Goals: {} a day, {} a week",
                format_minutes(data.daily_goal_minutes),
                format_minutes(data.weekly_goal_minutes)
            );
        }
        StudyCommands::Clear => {
            store.clear_study(username)?;
            println_colored!(AMBER, "  Study data cleared for '{}'", username);
        }
    }
    Ok(())
}

/// Without bounds the most recent sessions are listed; with either bound
/// every matching session is.
fn study_history(
    data: &StudyData,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<&StudySession>> {
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(TrackerError::validation(format!(
                "--from {} is after --to {}",
                f, t
            ))
            .into());
        }
    }
    Ok(match (from, to) {
        (None, None) => data.recent(HISTORY_LIMIT),
        _ => data.sessions_between(from, to),
    })
}

// ─── Export / import ─────────────────────────────────────────────────────────

pub fn handle_export(store: &dyn Store) -> Result<()> {
    let state = store.load_state()?;
    let json = serde_json::to_string_pretty(&state).context("Serializing application data")?;
    println!("{}", json);
    Ok(())
}

pub fn handle_import(store: &dyn Store, file: &str) -> Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("Reading {}", file))?;
    let state = parse_import(&raw)?;
    store.save_state(&state)?;
    println_colored!(
        GREEN,
        "  ✓ Imported {} subjects, {} attendance records",
        state.subjects.len(),
        state
            .attendance_data
            .values()
            .map(|a| a.records.len())
            .sum::<usize>()
    );
    Ok(())
}

/// Parse exported JSON, rebuilding counters from the records so that
/// hand-edited files cannot break the total/attended invariant.
pub fn parse_import(raw: &str) -> Result<AppState> {
    let mut state: AppState = serde_json::from_str(raw).context("Parsing application data")?;
    for att in state.attendance_data.values_mut() {
        let records = std::mem::take(&mut att.records);
        let mut rebuilt = crate::models::SubjectAttendance::default();
        for r in records {
            if let Err(e) = rebuilt.mark(r.key, r.status) {
                log::warn!("Skipping record on import: {}", e);
            }
        }
        *att = rebuilt;
    }
    Ok(state)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn display_name(state: &AppState) -> String {
    match (state.student_name.is_empty(), state.roll_no.is_empty()) {
        (true, _) => "student".to_string(),
        (false, true) => state.student_name.clone(),
        (false, false) => format!("{} ({})", state.student_name, state.roll_no),
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Bad date '{}', expected YYYY-MM-DD", s))
}

fn prompt_default(label: &str, current: &str) -> Result<String> {
    let message = if current.is_empty() {
        format!("{}: ", label)
    } else {
        format!("{} [{}]: ", label, current)
    };
    let answer = prompt(&message)?;
    Ok(if answer.trim().is_empty() {
        current.to_string()
    } else {
        answer.trim().to_string()
    })
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    fn store_with_subject() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        handle_subject(&store, &SubjectCommands::Add { name: "Maths".into() }).unwrap();
        handle_slot(&store, &SlotCommands::Add { label: "9:00-10:00".into() }).unwrap();
        store
    }

    #[test]
    fn mark_persists_and_rejects_duplicates() {
        let store = store_with_subject();
        handle_mark(&store, "maths", "9:00-10:00", false, Some("2024-02-05")).unwrap();

        let err = handle_mark(&store, "Maths", "9:00-10:00", true, Some("2024-02-05")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::DuplicateMarking { .. })
        ));

        let att = store.load_state().unwrap().attendance(1);
        assert_eq!((att.attended, att.total), (1, 1));
    }

    #[test]
    fn mark_for_unknown_slot_changes_nothing() {
        let store = store_with_subject();
        handle_mark(&store, "Maths", "9:00-10:00", false, Some("2024-02-05")).unwrap();

        let err = handle_mark(&store, "Maths", "9:30-10:30", false, Some("2024-02-05")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::Validation(_))
        ));
        let att = store.load_state().unwrap().attendance(1);
        assert_eq!((att.attended, att.total), (1, 1));
    }

    #[test]
    fn mark_with_bad_date_changes_nothing() {
        let store = store_with_subject();
        assert!(handle_mark(&store, "Maths", "9:00-10:00", false, Some("05/02/2024")).is_err());
        assert_eq!(store.load_state().unwrap().attendance(1).total, 0);
    }

    #[test]
    fn bunk_for_unknown_subject_is_an_error() {
        let store = store_with_subject();
        let config = AppConfig::default();
        assert!(handle_bunk(&store, &config, Some("History"), None).is_err());
        assert!(handle_bunk(&store, &config, None, Some(80.0)).is_ok());
    }

    #[test]
    fn timetable_set_and_clear() {
        let store = store_with_subject();
        handle_timetable(
            &store,
            &TimetableCommands::Set {
                day: "mon".into(),
                slot: "9:00-10:00".into(),
                subject: "maths".into(),
            },
        )
        .unwrap();
        let state = store.load_state().unwrap();
        assert_eq!(state.timetable[&Day::Monday]["9:00-10:00"], 1);

        handle_timetable(
            &store,
            &TimetableCommands::Clear {
                day: "monday".into(),
                slot: "9:00-10:00".into(),
            },
        )
        .unwrap();
        assert!(store.load_state().unwrap().timetable.is_empty());
    }

    #[test]
    fn study_goal_updates_stored_data() {
        let store = SqliteStore::open_in_memory().unwrap();
        let config = AppConfig::default();
        handle_study(
            &store,
            &config,
            &StudyCommands::Goal {
                daily: Some(45),
                weekly: None,
            },
        )
        .unwrap();
        let data = store.load_study("student").unwrap().unwrap();
        assert_eq!(data.daily_goal_minutes, 45);
        assert_eq!(data.weekly_goal_minutes, config.study.weekly_goal_minutes);

        handle_study(&store, &config, &StudyCommands::Clear).unwrap();
        assert!(store.load_study("student").unwrap().is_none());
    }

    #[test]
    fn study_history_limits_unfiltered_listing() {
        let mut data = StudyData::with_goals(60, 300);
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        for i in 0..12 {
            data.record_session(StudySession {
                subject_id: 1,
                date: start + chrono::Duration::days(i),
                duration_minutes: 25,
            });
        }

        let recent = study_history(&data, None, None).unwrap();
        assert_eq!(recent.len(), HISTORY_LIMIT);
        assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());

        let from = NaiveDate::from_ymd_opt(2024, 3, 2);
        assert_eq!(study_history(&data, from, None).unwrap().len(), 11);

        let to = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(study_history(&data, from, to).is_err());
    }

    #[test]
    fn study_timer_rejects_out_of_range_minutes() {
        let store = store_with_subject();
        let config = AppConfig::default();
        let err = handle_study(
            &store,
            &config,
            &StudyCommands::Timer {
                subject: "Maths".into(),
                minutes: Some(500),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::Validation(_))
        ));
    }

    #[test]
    fn import_rebuilds_counters_and_drops_duplicate_keys() {
        let raw = r#"{
            "studentName": "Asha",
            "subjects": [{"id": 1700000000000, "name": "Maths"}],
            "timeSlots": ["9:00-10:00"],
            "attendanceData": {
                "1700000000000": {
                    "total": 9,
                    "attended": 9,
                    "records": [
                        {"key": "k1", "status": "present"},
                        {"key": "k2", "status": "absent"},
                        {"key": "k1", "status": "absent"}
                    ]
                }
            }
        }"#;
        let state = parse_import(raw).unwrap();
        let att = state.attendance(1700000000000);
        assert_eq!((att.attended, att.total), (1, 2));
        assert_eq!(state.student_name, "Asha");
        assert!(state.timetable.is_empty());
    }

    #[test]
    fn dates_parse_strictly() {
        assert_eq!(
            parse_date("2024-02-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
        assert!(parse_date("2024-13-01").is_err());
    }
}
