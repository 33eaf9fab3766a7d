//! On-demand backfill of the entity index.

use std::sync::Arc;

use promo_core::{Entity, EntityIndex, FetchError};

use crate::source::SingleEntityFetcher;

/// Looks entities up in the index, fetching and caching on a miss.
pub struct EntityResolver<E, S> {
    fetcher: S,
    index: Arc<EntityIndex<E>>,
}

impl<E, S> EntityResolver<E, S>
where
    E: Entity + Clone + Send + Sync,
    S: SingleEntityFetcher<E>,
{
    pub fn new(fetcher: S, index: Arc<EntityIndex<E>>) -> Self {
        Self { fetcher, index }
    }

    /// Indexed copy if known, otherwise a remote lookup.
    ///
    /// A remotely missing entity is `Ok(None)`.
    pub async fn resolve(&self, id: &str) -> Result<Option<E>, FetchError> {
        if let Some(entity) = self.index.get(id) {
            return Ok(Some(entity));
        }

        tracing::debug!(id, "entity index miss, fetching");
        let fetched = self.fetcher.fetch_by_id(id).await?;
        if let Some(entity) = &fetched {
            self.index.insert(entity.clone());
        }
        Ok(fetched)
    }

    /// Resolve several IDs, keeping order and skipping unknown or failed ones.
    pub async fn resolve_many<I: AsRef<str>>(&self, ids: &[I]) -> Vec<E> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            match self.resolve(id).await {
                Ok(Some(entity)) => resolved.push(entity),
                Ok(None) => {}
                Err(e) => tracing::warn!(id, error = %e, "entity backfill failed"),
            }
        }
        resolved
    }
}
