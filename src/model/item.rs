// File: ./src/model/item.rs
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every lesson lasts two academic hours plus the short break between them.
pub const LESSON_DURATION: TimeDelta = TimeDelta::minutes(95);

/// Distance between the starts of two consecutive time slots.
pub const SLOT_SPACING_MINUTES: u32 = 115;

/// Start of a time slot, as printed in the row label ("8:30").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LessonTime {
    pub hour: u8,
    pub minute: u8,
}

impl LessonTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    pub fn as_delta(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes_since_midnight()))
    }
}

impl fmt::Display for LessonTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Short lesson name as shown in the cell.
    pub name: String,
    /// Always exactly one entry: the lesson type.
    pub categories: Vec<String>,
    /// Always exactly two entries: teacher, then full lesson name.
    pub contacts: Vec<String>,
    pub location: String,
    pub description: String,
    /// Local wall-clock time of the university.
    pub start: NaiveDateTime,
    pub duration: TimeDelta,
}

impl CalendarEvent {
    pub fn lesson(
        start: NaiveDateTime,
        short_name: &str,
        full_name: &str,
        kind: &str,
        teacher: &str,
        location: &str,
    ) -> Self {
        Self {
            name: short_name.to_string(),
            categories: vec![kind.to_string()],
            contacts: vec![teacher.to_string(), full_name.to_string()],
            location: location.to_string(),
            description: format!("Full name: {}\nType: {}", full_name, kind),
            start,
            duration: LESSON_DURATION,
        }
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + self.duration
    }

    pub fn kind(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("")
    }

    pub fn teacher(&self) -> &str {
        self.contacts.first().map(String::as_str).unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        self.contacts.get(1).map(String::as_str).unwrap_or("")
    }
}

/// One week (or several merged weeks) of lessons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    pub name: String,
    pub events: Vec<CalendarEvent>,
    /// Ascending slot start times of the page the calendar was built from.
    pub lessons_times: Vec<LessonTime>,
}
