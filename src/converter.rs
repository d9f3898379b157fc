// File: ./src/converter.rs
//! Entry points turning a page, link, hash or search query into a calendar.
use crate::assembler::WeeklyCalendarAssembler;
use crate::cipher::CipherKey;
use crate::client::PageFetcher;
use crate::config::Config;
use crate::error::Result;
use crate::model::Calendar;
use crate::parser::ScheduleTableExtractor;
use crate::urls::{SiteUrls, WeekRange, week_urls};
use serde::Deserialize;
use std::sync::Arc;

/// One hit of the site search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResultItem {
    #[serde(default, alias = "Id")]
    pub id: u64,
    #[serde(default, alias = "Text")]
    pub text: String,
    #[serde(default, alias = "Url")]
    pub url: String,
    #[serde(default, alias = "Html")]
    pub html: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default, alias = "Result")]
    result: Vec<SearchResultItem>,
}

pub struct RaspConverter<F> {
    fetcher: F,
    site: SiteUrls,
    key_endpoint: String,
    extractor: Arc<ScheduleTableExtractor>,
    concurrency: usize,
}

impl<F: PageFetcher> RaspConverter<F> {
    pub fn new(fetcher: F, config: &Config) -> Self {
        Self {
            fetcher,
            site: SiteUrls::new(&config.base_url),
            key_endpoint: config.key_endpoint(),
            extractor: Arc::new(ScheduleTableExtractor::new(config.name_boilerplate.as_slice())),
            concurrency: config.concurrency(),
        }
    }

    fn assembler(&self) -> WeeklyCalendarAssembler<'_, F> {
        WeeklyCalendarAssembler::new(
            &self.fetcher,
            Arc::clone(&self.extractor),
            &self.key_endpoint,
            self.concurrency,
        )
    }

    /// Calendar of a single already-downloaded page.
    pub async fn get_by_html(&self, html: &str, key_override: Option<&CipherKey>) -> Result<Calendar> {
        self.assembler()
            .page_calendar(html.to_string(), key_override)
            .await
    }

    /// `link` may be relative to the site root.
    pub async fn get_by_link(&self, link: &str, range: WeekRange) -> Result<Calendar> {
        let link = self.site.absolute(link);
        let urls = week_urls(&link, range)?;
        log::info!("Fetching {} week page(s) for {}", urls.len(), link);
        self.assembler().fetch_and_assemble(&urls, None).await
    }

    pub async fn get_by_hash(&self, hash: &str, range: WeekRange) -> Result<Calendar> {
        let hashed = self.site.from_hash(hash);
        let link = self.fetcher.fetch_redirect_target(&hashed).await;
        self.get_by_link(&link, range).await
    }

    pub async fn get_search_results(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        let body = self.fetcher.fetch_document(&self.site.search(query)).await?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response.result)
    }

    /// `Ok(None)` when no search hit matches `query` exactly (ignoring case).
    pub async fn get_by_query(&self, query: &str, range: WeekRange) -> Result<Option<Calendar>> {
        let wanted = query.trim().to_lowercase();
        let results = self.get_search_results(query).await?;
        let Some(hit) = results
            .into_iter()
            .find(|item| item.text.trim().to_lowercase() == wanted)
        else {
            log::info!("No exact search match for '{}'", query);
            return Ok(None);
        };

        let link = self
            .fetcher
            .fetch_redirect_target(&self.site.absolute(&hit.url))
            .await;
        self.get_by_link(&link, range).await.map(Some)
    }
}
