use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::SubjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub fn all() -> [Day; 7] {
        [
            Day::Monday,
            Day::Tuesday,
            Day::Wednesday,
            Day::Thursday,
            Day::Friday,
            Day::Saturday,
            Day::Sunday,
        ]
    }

    pub fn of(date: NaiveDate) -> Day {
        Day::from(date.weekday())
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for Day {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Day {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mon" | "monday" => Ok(Day::Monday),
            "tue" | "tues" | "tuesday" => Ok(Day::Tuesday),
            "wed" | "wednesday" => Ok(Day::Wednesday),
            "thu" | "thurs" | "thursday" => Ok(Day::Thursday),
            "fri" | "friday" => Ok(Day::Friday),
            "sat" | "saturday" => Ok(Day::Saturday),
            "sun" | "sunday" => Ok(Day::Sunday),
            _ => Err(anyhow::anyhow!("Unknown day: {}", s)),
        }
    }
}

/// Weekly schedule: which subject occupies each time slot on each day.
pub type Timetable = BTreeMap<Day, BTreeMap<String, SubjectId>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_of_date() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert_eq!(Day::of(d), Day::Monday);
        assert_eq!(Day::of(d.succ_opt().unwrap()), Day::Tuesday);
    }

    #[test]
    fn day_parses_short_and_long_names() {
        assert_eq!("Thu".parse::<Day>().unwrap(), Day::Thursday);
        assert_eq!("saturday".parse::<Day>().unwrap(), Day::Saturday);
        assert!("someday".parse::<Day>().is_err());
    }

    #[test]
    fn timetable_serializes_days_as_keys() {
        let mut tt = Timetable::new();
        tt.entry(Day::Friday)
            .or_default()
            .insert("9:00-10:00".to_string(), 7);
        let json = serde_json::to_string(&tt).unwrap();
        assert_eq!(json, r#"{"Friday":{"9:00-10:00":7}}"#);
        let back: Timetable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tt);
    }
}
