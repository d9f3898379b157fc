// File: ./src/client/mod.rs
//! Boundary with the network: everything the pipeline needs from HTTP.
pub mod core;
pub mod middleware;
pub mod redirect;

pub use crate::client::core::HttpFetcher;

use crate::error::Result;
use std::future::Future;

pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body. Non-2xx statuses are errors.
    fn fetch_document(&self, url: &str) -> impl Future<Output = Result<String>> + Send;

    /// Follow redirects from `url` and return where they lead. Returns `url`
    /// unchanged when the request fails.
    fn fetch_redirect_target(&self, url: &str) -> impl Future<Output = String> + Send;

    /// POST `form` (url-encoded) with extra `headers` and return the body.
    fn fetch_json(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<String>> + Send;
}
