//! Async coordination for promo-code clients.
//!
//! This crate wires the pure pieces of `promo-core` to injected
//! collaborators: first-page query caching, debounced search
//! reconciliation, entity backfill, and optimistic interactions.

pub mod interaction;
pub mod query;
pub mod resolve;
pub mod search;
pub mod source;

pub use interaction::{InteractionService, VoteOutcome};
pub use query::QueryService;
pub use resolve::EntityResolver;
pub use search::{
    PopularState, PopularStatus, SearchCoordinator, SearchFilters, SearchResults, SearchSnapshot, SearchState,
    SearchStatus,
};
pub use source::{AuthContext, Fetcher, PersistenceSink, SingleEntityFetcher};
