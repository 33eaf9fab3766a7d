//! In-memory caches for query results and entities.
//!
//! - TTL-bounded query cache with lazy expiry and capacity eviction
//! - Deterministic, first-page-only cache keys
//! - Entity index for lookup by stable ID

pub mod clock;
pub mod entity;
pub mod key;
pub mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::EntityIndex;
pub use key::compute_cache_key;
pub use ttl::{CacheStats, TtlCache};
