// File: ./src/cipher/key.rs
//! Resolution of the per-page XOR key.
//!
//! Pages embed a request key (`<meta name="encrypt">`) and a CSRF token
//! (`<meta name="csrf-token">`). The site exchanges the pair for the actual
//! key through a form POST answering `{"Content": "...", "Message": "OK"}`.
use crate::cipher::CipherKey;
use crate::client::PageFetcher;
use crate::error::{RaspError, Result};
use crate::parser::dom::RawDocument;
use serde::Deserialize;

pub const REQUEST_KEY_META: &str = "encrypt";
pub const CSRF_TOKEN_META: &str = "csrf-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRequest {
    pub request_key: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
struct KeyResponse {
    #[serde(rename = "Content", default)]
    content: String,
    #[serde(rename = "Message", default)]
    message: String,
}

impl KeyRequest {
    pub fn from_document(doc: &RawDocument) -> Result<Self> {
        let meta = |name: &str| -> Result<String> {
            doc.meta_content(name)?.ok_or_else(|| {
                RaspError::KeyResolution(format!("page has no <meta name=\"{}\">", name))
            })
        };
        Ok(Self {
            request_key: meta(REQUEST_KEY_META)?,
            csrf_token: meta(CSRF_TOKEN_META)?,
        })
    }

    /// `None` when the page has nothing to decrypt.
    pub fn for_page(html: &str) -> Result<Option<Self>> {
        let doc = RawDocument::parse(html);
        if !doc.has_encrypted_nodes()? {
            return Ok(None);
        }
        Self::from_document(&doc).map(Some)
    }

    pub async fn issue<F: PageFetcher>(&self, fetcher: &F, endpoint: &str) -> Result<CipherKey> {
        let form = [("token", "token"), ("content", self.request_key.as_str())];
        let headers = [("x-csrf-token", self.csrf_token.as_str())];

        let body = fetcher
            .fetch_json(endpoint, &form, &headers)
            .await
            .map_err(|e| RaspError::KeyResolution(format!("key endpoint unreachable: {}", e)))?;
        let response: KeyResponse = serde_json::from_str(&body)
            .map_err(|e| RaspError::KeyResolution(format!("unexpected key response: {}", e)))?;
        if response.message != "OK" {
            return Err(RaspError::KeyResolution(format!(
                "key endpoint answered '{}'",
                response.message
            )));
        }
        CipherKey::from_chars(&response.content)
    }
}

/// Returns the override when given, otherwise asks the key endpoint.
/// `Ok(None)` means the page carries no encrypted nodes and needs no key.
pub async fn resolve_key<F: PageFetcher>(
    fetcher: &F,
    endpoint: &str,
    html: &str,
    key_override: Option<&CipherKey>,
) -> Result<Option<CipherKey>> {
    if let Some(key) = key_override {
        log::debug!("Using caller-supplied cipher key");
        return Ok(Some(key.clone()));
    }
    // The parsed document is dropped here, before any await.
    let Some(request) = KeyRequest::for_page(html)? else {
        log::debug!("Page has no encrypted nodes, skipping key request");
        return Ok(None);
    };
    log::debug!("Requesting cipher key from {}", endpoint);
    request.issue(fetcher, endpoint).await.map(Some)
}
