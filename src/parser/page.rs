// File: ./src/parser/page.rs
//! Walks the decrypted `#raspisanie-table` of one week page.
use crate::error::{RaspError, Result};
use crate::model::{Calendar, CalendarEvent, LessonTime, SLOT_SPACING_MINUTES};
use crate::parser::cell::parse_cell;
use crate::parser::date::{parse_header_date, parse_slot_time};
use crate::parser::dom::{DecryptedView, element_children, is_tag};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use regex::Regex;
use scraper::ElementRef;

pub const TABLE_ID: &str = "raspisanie-table";
pub const DAYS_PER_WEEK: usize = 6;

pub const DEFAULT_NAME_BOILERPLATE: &[&str] = &[
    "Расписание занятий",
    "Расписание",
    "группы",
    "группа",
    "преподавателя",
    "преподаватель",
    "аудитории",
];

/// One time-slot row as seen by the extractor.
struct SlotRow<'a> {
    time: LessonTime,
    cells: Vec<ElementRef<'a>>,
}

#[derive(Debug, Clone)]
pub struct ScheduleTableExtractor {
    boilerplate: Option<Regex>,
}

impl Default for ScheduleTableExtractor {
    fn default() -> Self {
        Self {
            boilerplate: boilerplate_regex(DEFAULT_NAME_BOILERPLATE),
        }
    }
}

fn boilerplate_regex<S: AsRef<str>>(phrases: &[S]) -> Option<Regex> {
    let mut escaped: Vec<String> = phrases
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return None;
    }
    // Longest first, so multi-word phrases win over their prefixes.
    escaped.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));
    Regex::new(&format!(r"(?i)\b(?:{})\b", escaped.join("|"))).ok()
}

impl ScheduleTableExtractor {
    pub fn new<S: AsRef<str>>(name_boilerplate: &[S]) -> Self {
        Self {
            boilerplate: boilerplate_regex(name_boilerplate),
        }
    }

    pub fn extract(&self, view: &DecryptedView<'_>) -> Result<Calendar> {
        let doc = view.document();
        let container = doc
            .first(&format!("#{}", TABLE_ID))?
            .ok_or_else(|| RaspError::Structure(format!("no #{} element", TABLE_ID)))?;
        let table = if is_tag(&container, "table") {
            container
        } else {
            element_children(container)
                .next()
                .ok_or_else(|| RaspError::Structure("schedule container is empty".into()))?
        };

        let head = element_children(table)
            .next()
            .ok_or_else(|| RaspError::Structure("table has no header section".into()))?;
        let body = element_children(table)
            .last()
            .ok_or_else(|| RaspError::Structure("table has no body section".into()))?;
        if head.id() == body.id() {
            return Err(RaspError::Structure(
                "table has a single section, expected header and body".into(),
            ));
        }

        let monday = week_start(view, head)?;
        let name = self.calendar_name(view)?;

        let rows: Vec<ElementRef<'_>> = element_children(body).collect();
        let holidays = holiday_days(&rows);

        let slots = rows
            .iter()
            .map(|row| slot_row(view, *row))
            .collect::<Result<Vec<_>>>()?;
        check_slot_spacing(&slots)?;

        let mut events = Vec::new();
        for (row_index, slot) in slots.iter().enumerate() {
            events.extend(row_events(view, slot, row_index, monday, &holidays)?);
        }

        let mut lessons_times: Vec<LessonTime> = slots.iter().map(|s| s.time).collect();
        lessons_times.sort();

        log::debug!(
            "Extracted '{}': {} rows, {} events, holidays {:?}",
            name,
            slots.len(),
            events.len(),
            holidays
        );

        Ok(Calendar {
            name,
            events,
            lessons_times,
        })
    }

    /// Page heading up to the first `/`, without boilerplate and guillemets.
    fn calendar_name(&self, view: &DecryptedView<'_>) -> Result<String> {
        let doc = view.document();
        let heading = match doc.first("h5.panel-title")? {
            Some(h) => h,
            None => doc
                .first("title")?
                .ok_or_else(|| RaspError::Structure("page has no title element".into()))?,
        };
        let raw = view.text(heading);
        let name = self.clean_name(&raw);
        if name.chars().count() < 2 {
            return Err(RaspError::Structure(format!(
                "calendar name '{}' is too short (from '{}')",
                name,
                raw.trim()
            )));
        }
        Ok(name)
    }

    pub fn clean_name(&self, raw: &str) -> String {
        let head = raw.split('/').next().unwrap_or_default();
        let without_quotes: String = head.chars().filter(|c| !matches!(c, '«' | '»')).collect();
        let stripped = match &self.boilerplate {
            Some(re) => re.replace_all(&without_quotes, " ").into_owned(),
            None => without_quotes,
        };
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn week_start(view: &DecryptedView<'_>, head: ElementRef<'_>) -> Result<NaiveDate> {
    // Header may be a <thead> wrapping the row, or the row itself.
    let header_row = if is_tag(&head, "tr") {
        head
    } else {
        element_children(head)
            .next()
            .ok_or_else(|| RaspError::Structure("header section has no row".into()))?
    };
    let monday_cell = element_children(header_row)
        .nth(1)
        .ok_or_else(|| RaspError::Structure("header row has no day cells".into()))?;

    let first = view.first_node_text(monday_cell).unwrap_or_default();
    parse_header_date(&first).or_else(|_| parse_header_date(&view.text(monday_cell)))
}

/// Day indexes whose first-row cell spans every row of the week.
fn holiday_days(rows: &[ElementRef<'_>]) -> Vec<usize> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let full_span = rows.len().max(2);
    element_children(*first)
        .skip(1)
        .take(DAYS_PER_WEEK)
        .enumerate()
        .filter(|(_, cell)| {
            cell.value()
                .attr("rowspan")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .is_some_and(|span| span >= full_span)
        })
        .map(|(day, _)| day)
        .collect()
}

fn slot_row<'a>(view: &DecryptedView<'_>, row: ElementRef<'a>) -> Result<SlotRow<'a>> {
    let cells: Vec<ElementRef<'a>> = element_children(row).collect();
    let label = cells
        .first()
        .ok_or_else(|| RaspError::Structure("schedule row has no cells".into()))?;
    let time = parse_slot_time(&view.text(*label))?;
    Ok(SlotRow { time, cells })
}

fn check_slot_spacing(slots: &[SlotRow<'_>]) -> Result<()> {
    for pair in slots.windows(2) {
        let (prev, next) = (pair[0].time, pair[1].time);
        let gap = i64::from(next.minutes_since_midnight()) - i64::from(prev.minutes_since_midnight());
        if gap != i64::from(SLOT_SPACING_MINUTES) {
            return Err(RaspError::parse(
                next.to_string(),
                format!(
                    "expected {} minutes after {}, got {}",
                    SLOT_SPACING_MINUTES, prev, gap
                ),
            ));
        }
    }
    Ok(())
}

/// Holiday cells use rowspan, so they only exist in the DOM of the first row.
fn row_events(
    view: &DecryptedView<'_>,
    slot: &SlotRow<'_>,
    row_index: usize,
    monday: NaiveDate,
    holidays: &[usize],
) -> Result<Vec<CalendarEvent>> {
    let lesson_start: NaiveDateTime = monday.and_time(chrono::NaiveTime::MIN) + slot.time.as_delta();

    let mut events = Vec::new();
    let mut cell_index = 0;
    for day in 0..DAYS_PER_WEEK {
        if holidays.contains(&day) {
            if row_index == 0 {
                cell_index += 1;
            }
            continue;
        }
        cell_index += 1;
        let cell = slot.cells.get(cell_index).ok_or_else(|| {
            RaspError::Structure(format!(
                "row {} ({}) has no cell for day {}",
                row_index, slot.time, day
            ))
        })?;
        let cell_start = lesson_start + TimeDelta::days(day as i64);
        events.extend(parse_cell(view, *cell, cell_start));
    }
    Ok(events)
}
