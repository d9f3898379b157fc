// In-memory TTL cache for fetched pages, keyed by URL.
//
// Only idempotent GETs are cached; the key endpoint POST always goes through
// because every page carries its own request key.
use crate::client::PageFetcher;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    value: String,
}

#[derive(Debug, Default)]
struct Store {
    documents: HashMap<String, Entry>,
    redirects: HashMap<String, Entry>,
}

impl Store {
    fn purge(&mut self, ttl: Duration) {
        self.documents.retain(|_, e| e.stored_at.elapsed() < ttl);
        self.redirects.retain(|_, e| e.stored_at.elapsed() < ttl);
    }
}

fn fresh(map: &HashMap<String, Entry>, key: &str, ttl: Duration) -> Option<String> {
    map.get(key)
        .filter(|e| e.stored_at.elapsed() < ttl)
        .map(|e| e.value.clone())
}

/// Wraps another fetcher and memoises its GET results.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    inner: F,
    ttl: Duration,
    store: Mutex<Store>,
}

impl<F: PageFetcher> CachedFetcher<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            store: Mutex::new(Store::default()),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }


    fn lookup(&self, redirects: bool, url: &str) -> Option<String> {
        let store = self.store.lock().ok()?;
        let map = if redirects { &store.redirects } else { &store.documents };
        fresh(map, url, self.ttl)
    }

    /// Stores a fresh entry. Expired entries are dropped on the way.
    fn remember(&self, redirects: bool, url: &str, value: &str) {
        if let Ok(mut store) = self.store.lock() {
            store.purge(self.ttl);
            let map = if redirects {
                &mut store.redirects
            } else {
                &mut store.documents
            };
            map.insert(
                url.to_string(),
                Entry {
                    stored_at: Instant::now(),
                    value: value.to_string(),
                },
            );
        }
    }
}

impl<F: PageFetcher> PageFetcher for CachedFetcher<F> {
    async fn fetch_document(&self, url: &str) -> Result<String> {
        if let Some(hit) = self.lookup(false, url) {
            log::debug!("Cache hit: {}", url);
            return Ok(hit);
        }
        let body = self.inner.fetch_document(url).await?;
        self.remember(false, url, &body);
        Ok(body)
    }

    async fn fetch_redirect_target(&self, url: &str) -> String {
        if let Some(hit) = self.lookup(true, url) {
            log::debug!("Cache hit (redirect): {}", url);
            return hit;
        }
        let target = self.inner.fetch_redirect_target(url).await;
        // A failed lookup echoes the input; don't pin that.
        if target != url {
            self.remember(true, url, &target);
        }
        target
    }

    async fn fetch_json(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String> {
        self.inner.fetch_json(url, form, headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RaspError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        gets: AtomicUsize,
    }

    impl PageFetcher for Counting {
        async fn fetch_document(&self, url: &str) -> Result<String> {
            let n = self.gets.fetch_add(1, Ordering::SeqCst);
            if url.contains("fail") {
                return Err(RaspError::fetch(url, "boom"));
            }
            Ok(format!("{}#{}", url, n))
        }

        async fn fetch_redirect_target(&self, url: &str) -> String {
            url.to_string()
        }

        async fn fetch_json(
            &self,
            _url: &str,
            _form: &[(&str, &str)],
            _headers: &[(&str, &str)],
        ) -> Result<String> {
            Ok("{}".into())
        }
    }

    #[tokio::test]
    async fn second_get_is_served_from_cache() {
        let cache = CachedFetcher::new(Counting::default(), Duration::from_secs(60));
        assert_eq!(cache.fetch_document("a").await.unwrap(), "a#0");
        assert_eq!(cache.fetch_document("a").await.unwrap(), "a#0");
        assert_eq!(cache.fetch_document("b").await.unwrap(), "b#1");
        assert_eq!(cache.inner().gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_and_expired_entries_are_not_served() {
        let cache = CachedFetcher::new(Counting::default(), Duration::ZERO);
        assert_eq!(cache.fetch_document("a").await.unwrap(), "a#0");
        assert_eq!(cache.fetch_document("a").await.unwrap(), "a#1");
        assert!(cache.fetch_document("fail").await.is_err());
        assert!(cache.fetch_document("fail").await.is_err());
        assert_eq!(cache.inner().gets.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn storing_drops_expired_entries() {
        let cache = CachedFetcher::new(Counting::default(), Duration::from_millis(50));
        cache.fetch_document("a").await.unwrap();
        cache.fetch_document("b").await.unwrap();
        assert_eq!(cache.store.lock().unwrap().documents.len(), 2);

        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.fetch_document("c").await.unwrap();

        let store = cache.store.lock().unwrap();
        assert_eq!(store.documents.len(), 1);
        assert!(store.documents.contains_key("c"));
    }
}
