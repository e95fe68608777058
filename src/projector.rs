//! Attendance projection: how many classes can be skipped while staying at or
//! above a target percentage, or how many must be attended to get there.

use crate::error::TrackerError;
use crate::models::SubjectAttendance;

pub const DEFAULT_BUNK_CAP: u32 = 100;
pub const DEFAULT_NEEDS_CAP: u32 = 1000;

/// Upper bounds on the two simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionLimits {
    pub bunk_cap: u32,
    pub needs_cap: u32,
}

impl Default for ProjectionLimits {
    fn default() -> Self {
        Self {
            bunk_cap: DEFAULT_BUNK_CAP,
            needs_cap: DEFAULT_NEEDS_CAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `count` more classes can be missed. `capped` means the search hit the
    /// bunk cap, so the real figure is `count` or more.
    CanBunk { count: u32, capped: bool },
    /// Attend the next `count` classes to reach the target.
    NeedsCount { count: u32 },
    /// The target is out of reach within the search cap.
    NeedsMany,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::CanBunk { count: 0, .. } => {
                write!(f, "No slack: attend every class to stay on target")
            }
            Outcome::CanBunk { count, capped: true } => {
                write!(f, "You can safely miss {} or more classes", count)
            }
            Outcome::CanBunk { count, capped: false } => {
                write!(f, "You can safely miss {} more class(es)", count)
            }
            Outcome::NeedsCount { count } => {
                write!(f, "Attend the next {} class(es) without fail", count)
            }
            Outcome::NeedsMany => write!(f, "Target is out of reach for now"),
        }
    }
}

/// Attendance percentage, with no classes held counting as 100%.
pub fn current_percentage(attended: u32, total: u32) -> f64 {
    if total > 0 {
        attended as f64 / total as f64 * 100.0
    } else {
        100.0
    }
}

/// Run the projection. Inputs are taken by value and never modified.
///
/// Comparisons are plain `>=`/`<` on `f64` percentages.
pub fn project(attended: u32, total: u32, target_percent: f64, limits: ProjectionLimits) -> Outcome {
    let current = current_percentage(attended, total);

    if current >= target_percent {
        let mut k = 0;
        while k < limits.bunk_cap {
            // With no classes held the 100% convention carries through every step.
            let next = if total == 0 {
                100.0
            } else {
                attended as f64 / (total + k + 1) as f64 * 100.0
            };
            if next < target_percent {
                return Outcome::CanBunk {
                    count: k,
                    capped: false,
                };
            }
            k += 1;
        }
        return Outcome::CanBunk {
            count: limits.bunk_cap,
            capped: true,
        };
    }

    let (mut a, mut t) = (attended, total);
    for n in 1..=limits.needs_cap {
        a += 1;
        t += 1;
        if a as f64 / t as f64 * 100.0 >= target_percent {
            return Outcome::NeedsCount { count: n };
        }
    }
    Outcome::NeedsMany
}

/// `project` with its preconditions checked.
pub fn try_project(
    attended: u32,
    total: u32,
    target_percent: f64,
    limits: ProjectionLimits,
) -> Result<Outcome, TrackerError> {
    if attended > total {
        return Err(TrackerError::validation(format!(
            "attended ({}) cannot exceed total ({})",
            attended, total
        )));
    }
    if !(0.0..=100.0).contains(&target_percent) {
        return Err(TrackerError::validation(format!(
            "target must be between 0 and 100, got {}",
            target_percent
        )));
    }
    Ok(project(attended, total, target_percent, limits))
}

pub fn project_subject(
    att: &SubjectAttendance,
    target_percent: f64,
    limits: ProjectionLimits,
) -> Result<Outcome, TrackerError> {
    try_project(att.attended, att.total, target_percent, limits)
}

/// Coarse band used by the subject-wise breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Safe,
    AtRisk,
    Short,
}

impl Standing {
    pub fn of(outcome: &Outcome) -> Standing {
        match outcome {
            Outcome::CanBunk { count: 0, .. } => Standing::AtRisk,
            Outcome::CanBunk { .. } => Standing::Safe,
            Outcome::NeedsCount { .. } | Outcome::NeedsMany => Standing::Short,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Standing::Safe => "safe",
            Standing::AtRisk => "at risk",
            Standing::Short => "short",
        }
    }
}
