// Builders for synthetic schedule pages shaped like rasp.tpu.ru week views.
#![allow(dead_code)]
use raspical::cipher::{CipherKey, encrypt_text};
use std::collections::HashMap;

pub const KEY: &str = "RG82tMS3FrNvOPCZ";
pub const REQUEST_KEY: &str = "req-4f1c";
pub const CSRF: &str = "csrf-9a7e";

pub const FULL_DAY: [&str; 7] = ["8:30", "10:25", "12:20", "14:15", "16:10", "18:05", "20:00"];

pub fn key() -> CipherKey {
    CipherKey::from_chars(KEY).unwrap()
}

#[derive(Debug, Clone)]
pub struct Lesson {
    pub short: &'static str,
    pub full: &'static str,
    pub kind: &'static str,
    pub teacher: &'static str,
    pub building: &'static str,
    pub room: &'static str,
}

pub fn lesson(short: &'static str, full: &'static str, kind: &'static str) -> Lesson {
    Lesson {
        short,
        full,
        kind,
        teacher: "Иванов И.И.",
        building: "10",
        room: "101",
    }
}

pub struct PageBuilder {
    heading: String,
    monday: String,
    times: Vec<String>,
    holidays: Vec<usize>,
    cells: HashMap<(usize, usize), Vec<Lesson>>,
    key: Option<CipherKey>,
}

impl PageBuilder {
    pub fn new(heading: &str, monday: &str) -> Self {
        Self {
            heading: heading.to_string(),
            monday: monday.to_string(),
            times: FULL_DAY.iter().map(|s| s.to_string()).collect(),
            holidays: Vec::new(),
            cells: HashMap::new(),
            key: None,
        }
    }

    pub fn times(mut self, times: &[&str]) -> Self {
        self.times = times.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn holiday(mut self, day: usize) -> Self {
        self.holidays.push(day);
        self
    }

    /// Several lessons in one cell are separated by `<hr>`.
    pub fn cell(mut self, row: usize, day: usize, lessons: Vec<Lesson>) -> Self {
        self.cells.insert((row, day), lessons);
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.key = Some(key());
        self
    }

    fn secret(&self, tag: &str, attrs: &str, text: &str, title: Option<&str>) -> String {
        match &self.key {
            Some(k) => {
                let title_attr = title
                    .map(|t| format!(" data-title=\"{}\"", encrypt_text(t, k).unwrap()))
                    .unwrap_or_default();
                format!(
                    "<{tag}{attrs} data-encrypt=\"{}\"{title_attr}>*****</{tag}>",
                    encrypt_text(text, k).unwrap()
                )
            }
            None => {
                let title_attr = title
                    .map(|t| format!(" title=\"{}\"", t))
                    .unwrap_or_default();
                format!("<{tag}{attrs}{title_attr}>{text}</{tag}>")
            }
        }
    }

    fn cell_html(&self, lessons: &[Lesson]) -> String {
        lessons
            .iter()
            .map(|l| {
                format!(
                    "<div>{} <b>{}</b></div><div><a href=\"/t\">{}</a> <a href=\"/b\">{}</a> <a href=\"/r\">{}</a></div>",
                    self.secret("span", "", l.short, Some(l.full)),
                    l.kind,
                    l.teacher,
                    l.building,
                    l.room
                )
            })
            .collect::<Vec<_>>()
            .join("<hr>")
    }

    pub fn build(&self) -> String {
        let mut html = String::from("<!DOCTYPE html><html><head><title>Расписание</title>");
        html.push_str(&format!(
            "<meta name=\"encrypt\" content=\"{}\"><meta name=\"csrf-token\" content=\"{}\">",
            REQUEST_KEY, CSRF
        ));
        html.push_str("</head><body>");
        html.push_str(&self.secret("h5", " class=\"panel-title\"", &self.heading, None));
        html.push_str("<div id=\"raspisanie-table\"><table><thead><tr><th></th>");
        html.push_str(&format!("<th>{}<br>Понедельник</th>", self.monday));
        for day in ["Вторник", "Среда", "Четверг", "Пятница", "Суббота"] {
            html.push_str(&format!("<th>{}</th>", day));
        }
        html.push_str("</tr></thead><tbody>");

        let rows = self.times.len();
        for (row, time) in self.times.iter().enumerate() {
            html.push_str(&format!("<tr><td>{}</td>", time));
            for day in 0..6 {
                if self.holidays.contains(&day) {
                    if row == 0 {
                        html.push_str(&format!("<td rowspan=\"{}\">Праздник</td>", rows));
                    }
                    continue;
                }
                let inner = self
                    .cells
                    .get(&(row, day))
                    .map(|l| self.cell_html(l))
                    .unwrap_or_default();
                html.push_str(&format!("<td>{}</td>", inner));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div></body></html>");
        html
    }
}
