use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS subjects (
            id        INTEGER PRIMARY KEY,
            name      TEXT NOT NULL UNIQUE COLLATE NOCASE,
            position  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS time_slots (
            label     TEXT PRIMARY KEY,
            position  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS timetable (
            day         TEXT NOT NULL CHECK(day IN ('Monday','Tuesday','Wednesday','Thursday',
                                                    'Friday','Saturday','Sunday')),
            slot        TEXT NOT NULL,
            subject_id  INTEGER NOT NULL,
            PRIMARY KEY (day, slot)
        );

        CREATE TABLE IF NOT EXISTS attendance_records (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id  INTEGER NOT NULL,
            key         TEXT NOT NULL UNIQUE,
            status      TEXT NOT NULL CHECK(status IN ('present','absent'))
        );

        CREATE TABLE IF NOT EXISTS study_data (
            username    TEXT PRIMARY KEY,
            data        TEXT NOT NULL,
            updated_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}
