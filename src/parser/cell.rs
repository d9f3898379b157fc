// File: ./src/parser/cell.rs
//! Parsing of a single day cell into one event per sub-lesson.
//!
//! A cell may pack several classes for the same slot, separated by `<hr>`.
//! Multi-period entries often print the lesson name (`<span>`) and type (`<b>`)
//! only in their first group, so those two fields fall back to the nearest
//! preceding group that has them.
use crate::model::CalendarEvent;
use crate::parser::dom::{DecryptedView, element_children, is_tag};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static BUILDING_ROOM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:building|корпус|корп\.|к\.)\s*([^\s,]+)\s*,\s*(?:room|аудитория|ауд\.)\s*([^\s,]+)",
    )
    .expect("static regex")
});

/// Elements between two `<hr>` separators.
type Group<'a> = Vec<ElementRef<'a>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubLesson {
    pub short_name: String,
    pub full_name: String,
    pub kind: String,
    pub teacher: String,
    pub location: String,
}

/// Splits a cell's element children on `<hr>`. No elements, no groups.
fn split_groups(td: ElementRef<'_>) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for el in element_children(td) {
        if groups.is_empty() {
            groups.push(Vec::new());
        }
        if is_tag(&el, "hr") {
            groups.push(Vec::new());
        } else if let Some(last) = groups.last_mut() {
            last.push(el);
        }
    }
    groups
}

/// First direct child of the group's elements with the given tag.
fn first_child_tag<'a>(group: &Group<'a>, tag: &str) -> Option<ElementRef<'a>> {
    group
        .iter()
        .flat_map(|el| element_children(*el))
        .find(|child| is_tag(child, tag))
}

/// Walks groups `i, i-1, .., 0` and returns the first hit.
fn inherited<'a>(groups: &[Group<'a>], i: usize, tag: &str) -> Option<ElementRef<'a>> {
    groups[..=i]
        .iter()
        .rev()
        .find_map(|g| first_child_tag(g, tag))
}

fn location_of(view: &DecryptedView<'_>, group: &Group<'_>, links: &[ElementRef<'_>]) -> String {
    if links.len() >= 3 {
        return format!(
            "{}-{}",
            view.text(links[1]).trim(),
            view.text(links[2]).trim()
        );
    }
    let text = group
        .iter()
        .map(|el| view.text(*el))
        .collect::<Vec<_>>()
        .join(" ");
    BUILDING_ROOM_RE
        .captures(&text)
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
        .unwrap_or_default()
}

pub fn parse_sub_lessons(view: &DecryptedView<'_>, td: ElementRef<'_>) -> Vec<SubLesson> {
    let groups = split_groups(td);

    (0..groups.len())
        .map(|i| {
            let group = &groups[i];
            let span = inherited(&groups, i, "span");
            let bold = inherited(&groups, i, "b");
            let links: Vec<ElementRef<'_>> = group
                .iter()
                .flat_map(|el| element_children(*el))
                .filter(|child| is_tag(child, "a"))
                .collect();

            SubLesson {
                short_name: span
                    .map(|s| view.text(s).trim().to_string())
                    .unwrap_or_default(),
                full_name: span
                    .and_then(|s| view.attr(s, "title"))
                    .map(|t| t.trim().to_string())
                    .unwrap_or_default(),
                kind: bold
                    .map(|b| view.text(b).trim().to_string())
                    .unwrap_or_default(),
                teacher: links
                    .first()
                    .map(|a| view.text(*a).trim().to_string())
                    .unwrap_or_default(),
                location: location_of(view, group, &links),
            }
        })
        .collect()
}

/// Events of one day cell, all starting at `start`.
pub fn parse_cell(
    view: &DecryptedView<'_>,
    td: ElementRef<'_>,
    start: NaiveDateTime,
) -> Vec<CalendarEvent> {
    parse_sub_lessons(view, td)
        .into_iter()
        .map(|l| {
            CalendarEvent::lesson(
                start,
                &l.short_name,
                &l.full_name,
                &l.kind,
                &l.teacher,
                &l.location,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::decrypt::Plaintexts;
    use crate::parser::dom::RawDocument;
    use chrono::NaiveDate;

    fn with_cell<R>(inner: &str, f: impl FnOnce(&DecryptedView<'_>, ElementRef<'_>) -> R) -> R {
        let doc = RawDocument::parse(&format!(
            "<table><tbody><tr><td id=\"c\">{}</td></tr></tbody></table>",
            inner
        ));
        let plain = Plaintexts::default();
        let view = DecryptedView::new(&doc, &plain);
        let td = doc.first("#c").unwrap().unwrap();
        f(&view, td)
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 9, 28)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn empty_cell_has_no_events() {
        assert!(with_cell("", |v, td| parse_cell(v, td, start())).is_empty());
        assert!(with_cell("  \n ", |v, td| parse_cell(v, td, start())).is_empty());
    }

    #[test]
    fn single_group_fields() {
        let lessons = with_cell(
            r#"<div><span title="Математика 1">Матем.</span> <b>ЛК</b></div>
               <div><a href="/t">Иванов И.И.</a> <a href="/b">10</a> <a href="/r">101</a></div>"#,
            |v, td| parse_sub_lessons(v, td),
        );
        assert_eq!(
            lessons,
            vec![SubLesson {
                short_name: "Матем.".into(),
                full_name: "Математика 1".into(),
                kind: "ЛК".into(),
                teacher: "Иванов И.И.".into(),
                location: "10-101".into(),
            }]
        );
    }

    #[test]
    fn hr_separated_groups_inherit_name_and_type() {
        let lessons = with_cell(
            r#"<div><span title="Физика">Физ.</span> <b>ЛБ</b></div>
               <div><a>Петров</a> <a>19</a> <a>302</a></div>
               <hr>
               <div><a>Сидоров</a> <a>19</a> <a>303</a></div>
               <hr>
               <div><b>ПР</b></div>
               <div><a>Кузнецов</a></div>"#,
            |v, td| parse_sub_lessons(v, td),
        );
        assert_eq!(lessons.len(), 3);
        assert_eq!(lessons[1].short_name, "Физ.");
        assert_eq!(lessons[1].kind, "ЛБ");
        assert_eq!(lessons[1].teacher, "Сидоров");
        assert_eq!(lessons[1].location, "19-303");
        assert_eq!(lessons[2].full_name, "Физика");
        assert_eq!(lessons[2].kind, "ПР");
        assert_eq!(lessons[2].location, "");
    }

    #[test]
    fn n_separators_give_n_plus_one_events() {
        let events = with_cell(
            "<div><span>A</span></div><hr><div>x</div><hr><div>y</div><hr><div>z</div>",
            |v, td| parse_cell(v, td, start()),
        );
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.name == "A" && e.start == start()));
    }

    #[test]
    fn location_falls_back_to_building_room_text() {
        let lessons = with_cell(
            r#"<div><span>Хим.</span></div><div><a>Орлова</a> корпус 2, аудитория 118</div>"#,
            |v, td| parse_sub_lessons(v, td),
        );
        assert_eq!(lessons[0].location, "2-118");

        let lessons = with_cell(
            r#"<div><span>Chem</span></div><div>Building 4, room 12</div>"#,
            |v, td| parse_sub_lessons(v, td),
        );
        assert_eq!(lessons[0].location, "4-12");
    }
}
