use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bunkwise", version, author, about = "A terminal companion for class attendance and study tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// First-run setup: profile and study identity
    Setup {
        /// Wipe subjects, timetable and attendance before configuring
        #[arg(long)]
        reset: bool,
        /// Student name shown on the dashboard
        #[arg(long)]
        name: Option<String>,
        /// Roll number
        #[arg(long)]
        roll: Option<String>,
        /// Username that keys the study data
        #[arg(long)]
        username: Option<String>,
    },
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommands,
    },
    /// Manage daily time slots
    Slot {
        #[command(subcommand)]
        action: SlotCommands,
    },
    /// Weekly timetable
    Timetable {
        #[command(subcommand)]
        action: TimetableCommands,
    },
    /// Show today's classes and whether they are marked
    Today,
    /// Mark attendance for one class
    Mark {
        /// Subject name or id
        subject: String,
        /// Time slot label, e.g. 9:00-10:00
        slot: String,
        /// Mark as absent instead of present
        #[arg(long)]
        absent: bool,
        /// Class date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// How many classes can be skipped, or must be attended
    Bunk {
        /// Subject name or id; all subjects when omitted
        subject: Option<String>,
        /// Target percentage, defaults to the configured target
        #[arg(long)]
        target: Option<f64>,
    },
    /// Subject-wise attendance breakdown
    Stats,
    /// Study tracker
    Study {
        #[command(subcommand)]
        action: StudyCommands,
    },
    /// Print the application data as JSON
    Export,
    /// Replace the application data from a JSON file
    Import {
        /// Path to a JSON file produced by `export`
        file: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    /// Add a subject
    Add {
        /// Subject name
        name: String,
    },
    /// List subjects with their ids
    List,
}

#[derive(Subcommand, Debug)]
pub enum SlotCommands {
    /// Add a time slot
    Add {
        /// Slot label, e.g. 9:00-10:00
        label: String,
    },
    /// List time slots
    List,
}

#[derive(Subcommand, Debug)]
pub enum TimetableCommands {
    /// Assign a subject to a day and slot
    Set {
        /// Day of the week (mon..sun)
        day: String,
        /// Slot label
        slot: String,
        /// Subject name or id
        subject: String,
    },
    /// Remove the class at a day and slot
    Clear {
        /// Day of the week (mon..sun)
        day: String,
        /// Slot label
        slot: String,
    },
    /// Show the weekly timetable
    Show,
}

#[derive(Subcommand, Debug)]
pub enum StudyCommands {
    /// Run a study countdown in the terminal
    Timer {
        /// Subject name or id
        subject: String,
        /// Session length in minutes
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Show streak, goals and study time per subject
    Stats,
    /// List recorded sessions, newest first
    History {
        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Latest date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Set daily and weekly goals in minutes
    Goal {
        #[arg(long)]
        daily: Option<u32>,
        #[arg(long)]
        weekly: Option<u32>,
    },
    /// Delete all recorded study data for the current user
    Clear,
}
