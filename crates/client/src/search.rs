//! Debounced search reconciliation.
//!
//! A [`SearchCoordinator`] owns the live query. Each change bumps an epoch,
//! cancels the pending debounce timer and schedules a new one. When the
//! timer fires the query is dispatched: empty queries load the popular set,
//! anything else runs a first-page search. Results are applied only while
//! their epoch is still current, so a slow fetch for an old query can never
//! overwrite a newer one.
//!
//! Consumers read a single [`SearchSnapshot`] stream via [`SearchCoordinator::subscribe`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use promo_core::{
    AppConfig, Entity, EntityId, ErrorKind, FetchError, Page, PageRequest, QueryShape, ServiceFilter, SortMode,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::query::QueryService;
use crate::source::Fetcher;

/// Status of the search slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Error(ErrorKind),
    Success(Vec<EntityId>),
}

/// Status of the popular slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PopularStatus {
    #[default]
    Idle,
    Loading,
    Error(ErrorKind),
}

/// IDs returned for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub ids: Vec<EntityId>,
}

/// Results for non-empty queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    /// Query the status belongs to.
    pub query: String,
    pub status: SearchStatus,
    /// Most recent successful result, kept through later loads and failures.
    pub last_success: Option<SearchResults>,
}

/// The default result set shown for an empty query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularState {
    pub ids: Vec<EntityId>,
    pub status: PopularStatus,
    /// A popular fetch has succeeded; later empty queries reuse `ids`.
    pub loaded: bool,
}

/// Everything the coordinator publishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    /// Live query, echoed immediately on every update.
    pub query: String,
    pub search: SearchState,
    pub popular: PopularState,
}

impl SearchSnapshot {
    /// Whether the live query routes to the popular slice.
    pub fn is_popular(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// IDs to show for the live query, if any are known.
    pub fn visible_ids(&self) -> &[EntityId] {
        if self.is_popular() {
            return &self.popular.ids;
        }
        match &self.search.status {
            SearchStatus::Success(ids) if self.search.query == self.query => ids.as_slice(),
            _ => self
                .search
                .last_success
                .as_ref()
                .map(|r| r.ids.as_slice())
                .unwrap_or_default(),
        }
    }
}

/// Sort and filter applied to search queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub sort: SortMode,
    pub services: ServiceFilter,
    pub category: Option<String>,
}

struct Shared<E, F> {
    queries: Arc<QueryService<E, F>>,
    debounce: Duration,
    page_size: usize,
    /// Bumped on every query or filter change.
    epoch: AtomicU64,
    /// Bumped on every popular load.
    popular_generation: AtomicU64,
    filters: Mutex<SearchFilters>,
    pending: Mutex<Option<AbortHandle>>,
    state: watch::Sender<SearchSnapshot>,
}

/// Reconciles a live query with asynchronous fetch results.
///
/// Cloning is cheap and yields a handle to the same coordinator. Methods
/// that schedule work spawn onto the current tokio runtime.
pub struct SearchCoordinator<E, F> {
    shared: Arc<Shared<E, F>>,
}

impl<E, F> Clone for SearchCoordinator<E, F> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<E, F> SearchCoordinator<E, F>
where
    E: Entity + Clone + Send + Sync + 'static,
    F: Fetcher<E> + 'static,
{
    pub fn new(queries: Arc<QueryService<E, F>>) -> Self {
        Self::from_config(queries, &AppConfig::default())
    }

    pub fn from_config(queries: Arc<QueryService<E, F>>, config: &AppConfig) -> Self {
        Self::build(queries, config.debounce(), config.page_size)
    }

    fn build(queries: Arc<QueryService<E, F>>, debounce: Duration, page_size: usize) -> Self {
        let (state, _) = watch::channel(SearchSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                queries,
                debounce,
                page_size,
                epoch: AtomicU64::new(0),
                popular_generation: AtomicU64::new(0),
                filters: Mutex::new(SearchFilters::default()),
                pending: Mutex::new(None),
                state,
            }),
        }
    }

    /// Receiver for the reconciled state stream.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn filters(&self) -> SearchFilters {
        self.shared.filters.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Entities for the live query, resolved through the entity index.
    pub fn visible_items(&self) -> Vec<E> {
        let snapshot = self.snapshot();
        self.shared.queries.index().get_many(snapshot.visible_ids())
    }

    /// Set the live query and schedule a debounced dispatch.
    pub fn update_query(&self, text: impl Into<String>) {
        let text = text.into();
        // the epoch bump and the timer swap happen under one lock, so the
        // surviving timer always belongs to the newest epoch
        let mut pending = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let epoch = self.shared.bump_epoch(Some(text));

        let shared = Arc::clone(&self.shared);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(shared.debounce).await;
            if shared.is_current(epoch) {
                tokio::spawn(shared.dispatch(epoch));
            }
        });

        if let Some(previous) = pending.replace(timer.abort_handle()) {
            previous.abort();
        }
    }

    /// Same as `update_query("")`; loads the popular set unless already cached.
    pub fn clear_query(&self) {
        self.update_query(String::new());
    }

    /// Replace sort and filters and re-dispatch the live query immediately.
    pub async fn set_filters(&self, filters: SearchFilters) {
        let filters = SearchFilters { services: filters.services.normalized(), ..filters };
        *self.shared.filters.lock().unwrap_or_else(PoisonError::into_inner) = filters;
        self.redispatch().await;
    }

    /// Re-dispatch the live query now, skipping the debounce window.
    pub async fn retry(&self) {
        self.redispatch().await;
    }

    async fn redispatch(&self) {
        let epoch = {
            let mut pending = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = pending.take() {
                previous.abort();
            }
            self.shared.bump_epoch(None)
        };
        Arc::clone(&self.shared).dispatch(epoch).await;
    }

    /// Load the popular set if it has not been loaded yet.
    pub async fn load_popular(&self) {
        self.shared.load_popular(false).await;
    }

    /// Fetch the popular set again, bypassing every cache.
    pub async fn refresh_popular(&self) {
        self.shared.load_popular(true).await;
    }
}

impl<E, F> Shared<E, F>
where
    E: Entity + Clone + Send + Sync + 'static,
    F: Fetcher<E> + 'static,
{
    /// Start a new epoch, optionally replacing the live query.
    ///
    /// A search still loading for the old epoch can no longer land, so the
    /// slice falls back to the last completed result.
    fn bump_epoch(&self, query: Option<String>) -> u64 {
        let mut epoch = 0;
        self.state.send_modify(|snapshot| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(query) = query {
                snapshot.query = query;
            }
            let search = &mut snapshot.search;
            if search.status == SearchStatus::Loading {
                match &search.last_success {
                    Some(last) => {
                        search.query = last.query.clone();
                        search.status = SearchStatus::Success(last.ids.clone());
                    }
                    None => search.status = SearchStatus::Idle,
                }
            }
        });
        epoch
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn dispatch(self: Arc<Self>, epoch: u64) {
        let query = self.state.borrow().query.clone();

        if query.trim().is_empty() {
            self.load_popular(false).await;
            return;
        }

        let started = self.state.send_if_modified(|snapshot| {
            if !self.is_current(epoch) {
                return false;
            }
            snapshot.search.query = query.clone();
            snapshot.search.status = SearchStatus::Loading;
            true
        });
        if !started {
            return;
        }

        let filters = self.filters.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let shape = QueryShape::new(query.clone())
            .with_sort(filters.sort)
            .with_services(filters.services)
            .with_category(filters.category);

        tracing::debug!(query = %query, epoch, "dispatching search");
        let result = self.queries.fetch_page(&PageRequest::first(shape, self.page_size)).await;
        self.apply_search(epoch, &query, result);
    }

    /// Apply a search result if its query is still the live one.
    fn apply_search(&self, epoch: u64, query: &str, result: Result<Page<E>, FetchError>) {
        self.state.send_if_modified(|snapshot| {
            if !self.is_current(epoch) || snapshot.query != query {
                tracing::debug!(query, epoch, "discarding stale search result");
                return false;
            }

            snapshot.search.query = query.to_string();
            match result {
                Ok(page) => {
                    let ids = page.ids();
                    snapshot.search.last_success = Some(SearchResults { query: query.to_string(), ids: ids.clone() });
                    snapshot.search.status = SearchStatus::Success(ids);
                }
                Err(e) => {
                    tracing::warn!(query, error = %e, "search failed");
                    snapshot.search.status = SearchStatus::Error(e.kind());
                }
            }
            true
        });
    }

    async fn load_popular(&self, force: bool) {
        let mut generation = 0;
        let started = self.state.send_if_modified(|snapshot| {
            let popular = &mut snapshot.popular;
            if !force && (popular.loaded || popular.status == PopularStatus::Loading) {
                return false;
            }
            generation = self.popular_generation.fetch_add(1, Ordering::SeqCst) + 1;
            popular.status = PopularStatus::Loading;
            true
        });
        if !started {
            return;
        }

        let request = PageRequest::first(QueryShape::default().with_sort(SortMode::Popular), self.page_size);
        tracing::debug!(generation, force, "loading popular");
        let result = if force {
            self.queries.refresh_page(&request).await
        } else {
            self.queries.fetch_page(&request).await
        };

        self.state.send_if_modified(|snapshot| {
            if self.popular_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let popular = &mut snapshot.popular;
            match result {
                Ok(page) => {
                    popular.ids = page.ids();
                    popular.status = PopularStatus::Idle;
                    popular.loaded = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "popular load failed");
                    popular.status = PopularStatus::Error(e.kind());
                }
            }
            true
        });
    }
}
