// File: ./src/model/mod.rs
pub mod adapter;
pub mod item;

pub use item::{Calendar, CalendarEvent, LESSON_DURATION, LessonTime, SLOT_SPACING_MINUTES};
