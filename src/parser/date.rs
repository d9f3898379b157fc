// File: ./src/parser/date.rs
// Localized date and slot-time tokens found in the schedule table.
use crate::error::{RaspError, Result};
use crate::model::LessonTime;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})\b").expect("static regex"));

static WORDY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s+([а-яё]+)\.?\s+(\d{4})").expect("static regex")
});

static SLOT_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("static regex"));

const MONTH_PREFIXES: [&str; 12] = [
    "янв", "фев", "мар", "апр", "ма", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
];

fn month_from_word(word: &str) -> Option<u32> {
    let lower = word.to_lowercase();
    MONTH_PREFIXES
        .iter()
        .position(|p| lower.starts_with(p))
        .map(|i| i as u32 + 1)
}

/// Parses a date as printed in the header ("28.09.2020", "28.09.20",
/// "28 сентября 2020").
pub fn parse_header_date(raw: &str) -> Result<NaiveDate> {
    let text = raw.trim();

    if let Some(caps) = NUMERIC_DATE_RE.captures(text) {
        let day: u32 = caps[1].parse().map_err(|_| RaspError::parse(text, "bad day"))?;
        let month: u32 = caps[2]
            .parse()
            .map_err(|_| RaspError::parse(text, "bad month"))?;
        let mut year: i32 = caps[3]
            .parse()
            .map_err(|_| RaspError::parse(text, "bad year"))?;
        if caps[3].len() == 2 {
            year += 2000;
        }
        return NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| RaspError::parse(text, "no such calendar date"));
    }

    if let Some(caps) = WORDY_DATE_RE.captures(text) {
        let day: u32 = caps[1].parse().map_err(|_| RaspError::parse(text, "bad day"))?;
        let month =
            month_from_word(&caps[2]).ok_or_else(|| RaspError::parse(text, "unknown month name"))?;
        let year: i32 = caps[3]
            .parse()
            .map_err(|_| RaspError::parse(text, "bad year"))?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| RaspError::parse(text, "no such calendar date"));
    }

    Err(RaspError::parse(text, "no date found"))
}

/// First `H:MM` token of a row label.
pub fn parse_slot_time(label: &str) -> Result<LessonTime> {
    let caps = SLOT_TIME_RE
        .captures(label)
        .ok_or_else(|| RaspError::parse(label.trim(), "no H:MM time found"))?;
    let hour: u8 = caps[1]
        .parse()
        .map_err(|_| RaspError::parse(&caps[0], "bad hour"))?;
    let minute: u8 = caps[2]
        .parse()
        .map_err(|_| RaspError::parse(&caps[0], "bad minute"))?;
    LessonTime::new(hour, minute).ok_or_else(|| RaspError::parse(&caps[0], "time out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_dates() {
        assert_eq!(
            parse_header_date(" 28.09.2020 ").unwrap(),
            NaiveDate::from_ymd_opt(2020, 9, 28).unwrap()
        );
        assert_eq!(
            parse_header_date("Пн, 1.2.21").unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 1).unwrap()
        );
    }

    #[test]
    fn month_name_dates() {
        assert_eq!(
            parse_header_date("28 сентября 2020").unwrap(),
            NaiveDate::from_ymd_opt(2020, 9, 28).unwrap()
        );
        assert_eq!(
            parse_header_date("3 Мая 2021").unwrap(),
            NaiveDate::from_ymd_opt(2021, 5, 3).unwrap()
        );
    }

    #[test]
    fn bad_dates_are_parse_errors() {
        assert!(matches!(parse_header_date("Понедельник"), Err(RaspError::Parse { .. })));
        assert!(matches!(parse_header_date("31.02.2020"), Err(RaspError::Parse { .. })));
        assert!(matches!(parse_header_date("5 foo 2020"), Err(RaspError::Parse { .. })));
    }

    #[test]
    fn slot_times() {
        assert_eq!(parse_slot_time("\n 8:30 \n10:05").unwrap(), LessonTime::new(8, 30).unwrap());
        assert_eq!(parse_slot_time("18:05").unwrap(), LessonTime::new(18, 5).unwrap());
        assert!(matches!(parse_slot_time("утро"), Err(RaspError::Parse { .. })));
        assert!(matches!(parse_slot_time("25:10"), Err(RaspError::Parse { .. })));
        assert!(matches!(parse_slot_time("8:75"), Err(RaspError::Parse { .. })));
    }
}
