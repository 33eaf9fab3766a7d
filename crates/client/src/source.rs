//! Collaborator contracts the coordination layer is built against.
//!
//! Implementations live in the application shell (document-store
//! repositories, auth session, interaction writer). The core only sees
//! these traits.

use std::sync::Arc;

use promo_core::{FetchError, Page, PageRequest, UserInteraction};

/// Paged listing source for one entity type.
#[async_trait::async_trait]
pub trait Fetcher<E>: Send + Sync {
    /// Fetch one page of results for the request's query shape.
    async fn fetch(&self, request: &PageRequest) -> Result<Page<E>, FetchError>;
}

/// Lookup of a single entity by ID.
#[async_trait::async_trait]
pub trait SingleEntityFetcher<E>: Send + Sync {
    /// `Ok(None)` when the entity does not exist remotely.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<E>, FetchError>;
}

/// Already-resolved identity of the signed-in user.
pub trait AuthContext: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// Durable storage for finalized interactions.
#[async_trait::async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn write_interaction(&self, interaction: UserInteraction) -> Result<(), FetchError>;
}

#[async_trait::async_trait]
impl<E, T> Fetcher<E> for Arc<T>
where
    E: Send + Sync + 'static,
    T: Fetcher<E> + ?Sized,
{
    async fn fetch(&self, request: &PageRequest) -> Result<Page<E>, FetchError> {
        self.as_ref().fetch(request).await
    }
}

#[async_trait::async_trait]
impl<E, T> SingleEntityFetcher<E> for Arc<T>
where
    E: Send + Sync + 'static,
    T: SingleEntityFetcher<E> + ?Sized,
{
    async fn fetch_by_id(&self, id: &str) -> Result<Option<E>, FetchError> {
        self.as_ref().fetch_by_id(id).await
    }
}

impl<T: AuthContext + ?Sized> AuthContext for Arc<T> {
    fn current_user_id(&self) -> Option<String> {
        self.as_ref().current_user_id()
    }
}

#[async_trait::async_trait]
impl<T: PersistenceSink + ?Sized> PersistenceSink for Arc<T> {
    async fn write_interaction(&self, interaction: UserInteraction) -> Result<(), FetchError> {
        self.as_ref().write_interaction(interaction).await
    }
}
