// Crate root library declaration and module exports.
pub mod assembler;
pub mod cache;
pub mod cipher;
pub mod cli;
pub mod client;
pub mod config;
pub mod converter;
pub mod error;
pub mod model;
pub mod parser;
pub mod paths;
pub mod urls;

pub use crate::cipher::CipherKey;
pub use crate::converter::{RaspConverter, SearchResultItem};
pub use crate::error::{RaspError, Result};
pub use crate::model::{Calendar, CalendarEvent, LessonTime};
pub use crate::urls::WeekRange;
