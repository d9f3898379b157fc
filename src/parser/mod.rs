// File: ./src/parser/mod.rs
pub mod cell;
pub mod date;
pub mod dom;
pub mod page;

pub use dom::{DecryptedView, RawDocument};
pub use page::ScheduleTableExtractor;

use crate::cipher::CipherKey;
use crate::cipher::decrypt::{Plaintexts, decrypt_all};
use crate::error::{RaspError, Result};
use crate::model::Calendar;

/// Decrypts and extracts one page. CPU-bound, no I/O.
///
/// `key` may be `None` only for pages without encrypted nodes.
pub fn parse_page(
    html: &str,
    key: Option<&CipherKey>,
    extractor: &ScheduleTableExtractor,
) -> Result<Calendar> {
    let doc = RawDocument::parse(html);
    let plaintexts = match key {
        Some(key) => decrypt_all(&doc, key)?,
        None if doc.has_encrypted_nodes()? => {
            return Err(RaspError::KeyResolution(
                "page has encrypted nodes but no key was supplied".into(),
            ));
        }
        None => Plaintexts::default(),
    };
    let view = DecryptedView::new(&doc, &plaintexts);
    extractor.extract(&view)
}
