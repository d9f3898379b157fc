// File: ./src/assembler.rs
//! Runs the per-page pipeline for several week pages and merges them.
use crate::cipher::{CipherKey, resolve_key};
use crate::client::PageFetcher;
use crate::error::{RaspError, Result};
use crate::model::Calendar;
use crate::parser::{ScheduleTableExtractor, parse_page};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Merges per-page calendars in fetch order.
///
/// Name and lesson times come from the first page only; events of every
/// page are concatenated as-is.
pub fn assemble(pages: Vec<Calendar>) -> Result<Calendar> {
    let mut pages = pages.into_iter();
    let mut merged = pages
        .next()
        .ok_or_else(|| RaspError::Structure("nothing to assemble: no pages".into()))?;
    for page in pages {
        merged.events.extend(page.events);
    }
    Ok(merged)
}

pub struct WeeklyCalendarAssembler<'a, F> {
    fetcher: &'a F,
    extractor: Arc<ScheduleTableExtractor>,
    key_endpoint: &'a str,
    concurrency: usize,
}

impl<'a, F: PageFetcher> WeeklyCalendarAssembler<'a, F> {
    pub fn new(
        fetcher: &'a F,
        extractor: Arc<ScheduleTableExtractor>,
        key_endpoint: &'a str,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            key_endpoint,
            concurrency: concurrency.max(1),
        }
    }

    /// Key resolution, then decryption and extraction on a blocking worker.
    pub async fn page_calendar(
        &self,
        html: String,
        key_override: Option<&CipherKey>,
    ) -> Result<Calendar> {
        let key = resolve_key(self.fetcher, self.key_endpoint, &html, key_override).await?;
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || parse_page(&html, key.as_ref(), &extractor))
            .await
            .map_err(|e| RaspError::Worker(e.to_string()))?
    }

    async fn fetch_page(&self, url: &str, key_override: Option<&CipherKey>) -> Result<Calendar> {
        let html = self.fetcher.fetch_document(url).await?;
        let calendar = self.page_calendar(html, key_override).await?;
        log::info!("Parsed {} ({} events)", url, calendar.events.len());
        Ok(calendar)
    }

    /// Fetches and parses all `urls` concurrently and merges them in URL
    /// order. The first page to fail, in completion order, aborts the
    /// request and drops the pages still in flight.
    pub async fn fetch_and_assemble(
        &self,
        urls: &[String],
        key_override: Option<&CipherKey>,
    ) -> Result<Calendar> {
        let mut pages: Vec<(usize, Calendar)> = stream::iter(urls.iter().enumerate())
            .map(|(index, url)| async move {
                self.fetch_page(url, key_override)
                    .await
                    .map(|calendar| (index, calendar))
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;
        pages.sort_by_key(|(index, _)| *index);
        log::debug!("Merging {} pages", pages.len());
        assemble(pages.into_iter().map(|(_, calendar)| calendar).collect())
    }
}
