// File: ./src/parser/dom.rs
//! Thin layer over `scraper` used by the decryptor and the table walker.
use crate::cipher::decrypt::Plaintexts;
use crate::error::{RaspError, Result};
use scraper::{ElementRef, Html, Node, Selector};

/// Attribute holding base64 ciphertext of an element's text.
pub const ENCRYPTED_TEXT_ATTR: &str = "data-encrypt";
/// Attribute holding base64 ciphertext of an element's title.
pub const ENCRYPTED_TITLE_ATTR: &str = "data-title";

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| RaspError::Structure(format!("bad selector '{}': {}", css, e)))
}

/// Parsed HTML of one schedule page.
pub struct RawDocument {
    html: Html,
}

impl RawDocument {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    pub fn first(&self, css: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = selector(css)?;
        Ok(self.html.select(&sel).next())
    }

    pub fn all(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = selector(css)?;
        Ok(self.html.select(&sel).collect())
    }

    /// `content` of `<meta name="{name}">`, if present.
    pub fn meta_content(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .all("meta[name]")?
            .into_iter()
            .find(|m| m.value().attr("name") == Some(name))
            .and_then(|m| m.value().attr("content"))
            .map(str::to_string))
    }

    pub fn encrypted_nodes(&self) -> Result<Vec<ElementRef<'_>>> {
        self.all(&format!("[{}]", ENCRYPTED_TEXT_ATTR))
    }

    pub fn has_encrypted_nodes(&self) -> Result<bool> {
        Ok(self.first(&format!("[{}]", ENCRYPTED_TEXT_ATTR))?.is_some())
    }
}

/// Element children only, skipping text and comment nodes.
pub fn element_children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

pub fn is_tag(el: &ElementRef<'_>, name: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(name)
}

/// Read-only view of a document with decrypted plaintext laid over the
/// encrypted nodes. The tree itself is never touched.
#[derive(Clone, Copy)]
pub struct DecryptedView<'a> {
    doc: &'a RawDocument,
    plaintexts: &'a Plaintexts,
}

impl<'a> DecryptedView<'a> {
    pub fn new(doc: &'a RawDocument, plaintexts: &'a Plaintexts) -> Self {
        Self { doc, plaintexts }
    }

    pub fn document(&self) -> &'a RawDocument {
        self.doc
    }

    /// Concatenated text of an element and its descendants.
    pub fn text(&self, el: ElementRef<'_>) -> String {
        let mut out = String::new();
        self.push_text(el, &mut out);
        out
    }

    fn push_text(&self, el: ElementRef<'_>, out: &mut String) {
        if let Some(plain) = self.plaintexts.get(el.id()) {
            out.push_str(&plain.text);
            return;
        }
        for child in el.children() {
            match child.value() {
                Node::Text(t) => out.push_str(t),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.push_text(child_el, out);
                    }
                }
                _ => {}
            }
        }
    }

    /// Text of the first child node only (text node or element).
    pub fn first_node_text(&self, el: ElementRef<'_>) -> Option<String> {
        let first = el.first_child()?;
        match first.value() {
            Node::Text(t) => Some((**t).to_string()),
            Node::Element(_) => ElementRef::wrap(first).map(|e| self.text(e)),
            _ => None,
        }
    }

    /// Attribute value; a decrypted title takes precedence over `title`.
    pub fn attr(&self, el: ElementRef<'_>, name: &str) -> Option<String> {
        if name == "title"
            && let Some(title) = self
                .plaintexts
                .get(el.id())
                .and_then(|p| p.title.as_deref())
        {
            return Some(title.to_string());
        }
        el.value().attr(name).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_lookup_by_name() {
        let doc = RawDocument::parse(
            r#"<html><head><meta name="encrypt" content="abc"><meta name="csrf-token" content="tok"></head></html>"#,
        );
        assert_eq!(doc.meta_content("encrypt").unwrap().as_deref(), Some("abc"));
        assert_eq!(doc.meta_content("csrf-token").unwrap().as_deref(), Some("tok"));
        assert_eq!(doc.meta_content("missing").unwrap(), None);
    }

    #[test]
    fn view_without_plaintexts_reads_plain_text() {
        let doc = RawDocument::parse(r#"<div id="x">8:30<br><b>ЛК</b> <span title="Полное">Кр</span></div>"#);
        let plain = Plaintexts::default();
        let view = DecryptedView::new(&doc, &plain);
        let div = doc.first("#x").unwrap().unwrap();

        assert_eq!(view.text(div), "8:30ЛК Кр");
        assert_eq!(view.first_node_text(div).as_deref(), Some("8:30"));
        let span = doc.first("span").unwrap().unwrap();
        assert_eq!(view.attr(span, "title").as_deref(), Some("Полное"));
        assert_eq!(element_children(div).count(), 3);
    }
}
