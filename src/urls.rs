// File: ./src/urls.rs
//! Addresses on the schedule site: week pages, hash redirects, search.
use crate::error::{RaspError, Result};
use url::Url;

/// Which neighbouring weeks to merge into the requested one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekRange {
    /// Weeks before the requested one.
    pub before: u8,
    /// Weeks after the requested one (counting it) left out.
    pub skip: u8,
    /// Last week offset after the requested one to include.
    pub after: u8,
}

impl WeekRange {
    pub fn new(before: u8, skip: u8, after: u8) -> Self {
        Self { before, skip, after }
    }

    pub fn is_single(&self) -> bool {
        self.before == 0 && self.skip == 0 && self.after == 0
    }
}

/// `{origin}/{id}/{year}/{week}/view.html`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleUrl {
    pub origin: String,
    pub id: String,
    pub year: u16,
    pub week: u8,
}

impl ScheduleUrl {
    pub fn parse(link: &str) -> Result<Self> {
        let url = Url::parse(link).map_err(|e| RaspError::parse(link, e.to_string()))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();
        let [id, year, week, page] = segments.as_slice() else {
            return Err(RaspError::parse(link, "expected /{id}/{year}/{week}/view.html"));
        };
        if *page != "view.html" {
            return Err(RaspError::parse(link, "not a week view page"));
        }
        Ok(Self {
            origin: url.origin().ascii_serialization(),
            id: id.to_string(),
            year: year
                .parse()
                .map_err(|_| RaspError::parse(*year, "bad year in schedule url"))?,
            week: week
                .parse()
                .map_err(|_| RaspError::parse(*week, "bad week in schedule url"))?,
        })
    }

    pub fn for_week(&self, delta: i32) -> String {
        format!(
            "{}/{}/{}/{}/view.html",
            self.origin,
            self.id,
            self.year,
            i32::from(self.week) + delta
        )
    }
}

/// URLs to fetch, in merge order: `link`, the `before` preceding weeks
/// (nearest first), then weeks `skip + 1 ..= after`. Duplicates are dropped.
pub fn week_urls(link: &str, range: WeekRange) -> Result<Vec<String>> {
    let mut urls = vec![link.to_string()];
    if range.is_single() {
        return Ok(urls);
    }

    let parsed = ScheduleUrl::parse(link)?;
    let before = (1..=i32::from(range.before)).map(|i| parsed.for_week(-i));
    let after = (i32::from(range.skip) + 1..=i32::from(range.after)).map(|i| parsed.for_week(i));
    for url in before.chain(after) {
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    Ok(urls)
}

/// Builders for the fixed endpoints of one site.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: String,
}

impl SiteUrls {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_absolute(link: &str) -> bool {
        Url::parse(link).is_ok()
    }

    pub fn absolute(&self, link: &str) -> String {
        if Self::is_absolute(link) {
            link.to_string()
        } else if link.starts_with('/') {
            format!("{}{}", self.base, link)
        } else {
            format!("{}/{}", self.base, link)
        }
    }

    pub fn from_hash(&self, hash: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(hash.as_bytes()).collect();
        format!("{}/redirect/kalendar.html?hash={}", self.base, encoded)
    }

    pub fn search(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}/select/search/main.html?q={}", self.base, encoded)
    }
}
