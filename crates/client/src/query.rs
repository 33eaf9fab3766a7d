//! First-page query caching in front of a [`Fetcher`].
//!
//! First pages are served from a TTL cache keyed by query shape; later
//! pages always go to the fetcher. Every page that comes back feeds the
//! entity index.

use std::sync::Arc;

use promo_core::{CacheStats, Entity, EntityIndex, FetchError, Page, PageRequest, TtlCache};

use crate::source::Fetcher;

/// Cached, index-populating wrapper around a listing fetcher.
pub struct QueryService<E, F> {
    fetcher: F,
    cache: TtlCache<Page<E>>,
    index: Arc<EntityIndex<E>>,
}

impl<E, F> QueryService<E, F>
where
    E: Entity + Clone + Send + Sync,
    F: Fetcher<E>,
{
    pub fn new(fetcher: F, cache: TtlCache<Page<E>>, index: Arc<EntityIndex<E>>) -> Self {
        Self { fetcher, cache, index }
    }

    pub fn index(&self) -> &Arc<EntityIndex<E>> {
        &self.index
    }

    /// Fetch a page, answering first pages from the cache when fresh.
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<Page<E>, FetchError> {
        let key = request.shape.cache_key(request.is_first_page());

        if !key.is_empty()
            && let Some(page) = self.cache.get(&key).await
        {
            tracing::debug!(term = %request.shape.term, "query cache hit");
            self.index.add_all(page.items.iter().cloned());
            return Ok(page);
        }

        self.fetch_and_store(request, &key).await
    }

    /// Fetch a page from the source even if a cached copy exists.
    ///
    /// The fresh result still replaces the cached one.
    pub async fn refresh_page(&self, request: &PageRequest) -> Result<Page<E>, FetchError> {
        let key = request.shape.cache_key(request.is_first_page());
        self.fetch_and_store(request, &key).await
    }

    async fn fetch_and_store(&self, request: &PageRequest, key: &str) -> Result<Page<E>, FetchError> {
        tracing::debug!(term = %request.shape.term, first_page = request.is_first_page(), "query fetch");

        let page = self.fetcher.fetch(request).await.inspect_err(|e| {
            tracing::warn!(term = %request.shape.term, error = %e, "query fetch failed");
        })?;

        self.index.add_all(page.items.iter().cloned());
        self.cache.put(key, page.clone()).await;

        Ok(page)
    }

    /// Drop all cached pages. The entity index is left alone.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use promo_core::{ErrorKind, QueryShape, Service};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    pub(crate) fn service(id: &str) -> Service {
        Service { id: id.into(), name: id.to_uppercase(), category: None, logo_url: None, promo_code_count: 0 }
    }

    /// Returns one service per comma-separated word of the term.
    #[derive(Default)]
    pub(crate) struct WordFetcher {
        pub(crate) calls: AtomicUsize,
        pub(crate) fail_with: Mutex<Option<ErrorKind>>,
    }

    #[async_trait::async_trait]
    impl Fetcher<Service> for WordFetcher {
        async fn fetch(&self, request: &PageRequest) -> Result<Page<Service>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(kind) = *self.fail_with.lock().unwrap() {
                return Err(FetchError::new(kind, "stubbed failure"));
            }
            let items = request
                .shape
                .term
                .split(',')
                .filter(|w| !w.is_empty())
                .map(service)
                .collect();
            Ok(Page { items, next_cursor: Some("next".into()) })
        }
    }

    fn query_service(fetcher: WordFetcher) -> QueryService<Service, WordFetcher> {
        QueryService::new(fetcher, TtlCache::new(Duration::from_secs(60), 10), Arc::new(EntityIndex::new()))
    }

    #[tokio::test]
    async fn test_first_page_is_cached() {
        let svc = query_service(WordFetcher::default());
        let request = PageRequest::first(QueryShape::new("a,b"), 20);

        let first = svc.fetch_page(&request).await.unwrap();
        let second = svc.fetch_page(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(svc.fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.cache_stats().await.total, 1);
    }

    #[tokio::test]
    async fn test_later_pages_bypass_cache() {
        let svc = query_service(WordFetcher::default());
        let request = PageRequest { shape: QueryShape::new("a"), cursor: Some("next".into()), limit: 20 };

        svc.fetch_page(&request).await.unwrap();
        svc.fetch_page(&request).await.unwrap();

        assert_eq!(svc.fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(svc.cache_stats().await.total, 0);
        // still indexed
        assert!(svc.index().get("a").is_some());
    }

    #[tokio::test]
    async fn test_fetch_populates_index() {
        let svc = query_service(WordFetcher::default());
        svc.fetch_page(&PageRequest::first(QueryShape::new("x,y"), 20)).await.unwrap();
        assert_eq!(svc.index().get_many(&["x", "y"]).len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let fetcher = WordFetcher::default();
        *fetcher.fail_with.lock().unwrap() = Some(ErrorKind::Offline);
        let svc = query_service(fetcher);
        let request = PageRequest::first(QueryShape::new("a"), 20);

        let err = svc.fetch_page(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Offline);
        assert_eq!(svc.cache_stats().await.total, 0);

        *svc.fetcher.fail_with.lock().unwrap() = None;
        assert!(svc.fetch_page(&request).await.is_ok());
        assert_eq!(svc.fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache_and_invalidate_clears() {
        let svc = query_service(WordFetcher::default());
        let request = PageRequest::first(QueryShape::new("a"), 20);

        svc.fetch_page(&request).await.unwrap();
        svc.refresh_page(&request).await.unwrap();
        assert_eq!(svc.fetcher.calls.load(Ordering::SeqCst), 2);

        svc.invalidate().await;
        assert_eq!(svc.cache_stats().await.total, 0);
        assert!(svc.index().get("a").is_some());
    }
}
