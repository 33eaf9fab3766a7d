//! Core types and pure state logic for promo-code clients.
//!
//! This crate provides:
//! - TTL-bounded query cache, cache keys and the entity index
//! - Selection and vote/bookmark engines
//! - Error taxonomy and configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod interaction;
pub mod model;
pub mod selection;

pub use cache::{CacheStats, Clock, EntityIndex, ManualClock, SystemClock, TtlCache};
pub use config::{AppConfig, ConfigError, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE};
pub use error::{ErrorKind, FetchError};
pub use interaction::{VoteUpdate, apply_vote_update, compute_bookmark_toggle, compute_vote_interaction, compute_vote_update};
pub use model::{
    Comment, ContentKind, Entity, EntityId, InteractionKey, Page, PageRequest, Post, PromoCode, QueryShape, Service,
    ServiceFilter, SortMode, UserInteraction, Votable, VoteState,
};
pub use selection::{SelectionAction, SelectionState, apply_action};
