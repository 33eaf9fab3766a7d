//! Domain entities and query shapes shared by the caches and engines.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Opaque stable identifier of an entity.
pub type EntityId = String;

/// Anything addressable by a stable ID.
pub trait Entity {
    fn id(&self) -> &str;
}

/// Content that carries vote counters.
///
/// Updates never mutate in place: `with_votes` returns a replacement copy.
pub trait Votable: Entity + Sized {
    fn upvotes(&self) -> i64;
    fn downvotes(&self) -> i64;
    fn with_votes(&self, upvotes: i64, downvotes: i64) -> Self;
}

/// A merchant or platform that promo codes belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub promo_code_count: u32,
}

/// A user-submitted promo code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: EntityId,
    pub code: String,
    pub service_id: EntityId,
    pub description: String,
    pub author_id: EntityId,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    /// Expiry as epoch milliseconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// A community post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: EntityId,
    pub author_id: EntityId,
    pub body: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub comment_count: u32,
}

/// A comment under a post or promo code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: EntityId,
    pub parent_id: EntityId,
    pub author_id: EntityId,
    pub body: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
}

impl Entity for Service {
    fn id(&self) -> &str {
        &self.id
    }
}

macro_rules! votable_entity {
    ($($ty:ty),+) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }

            impl Votable for $ty {
                fn upvotes(&self) -> i64 {
                    self.upvotes
                }

                fn downvotes(&self) -> i64 {
                    self.downvotes
                }

                fn with_votes(&self, upvotes: i64, downvotes: i64) -> Self {
                    Self { upvotes, downvotes, ..self.clone() }
                }
            }
        )+
    };
}

votable_entity!(PromoCode, Post, Comment);

/// Kind of content an interaction refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    PromoCode,
    Post,
    Comment,
}

/// A user's vote on one piece of content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    #[default]
    None,
    Upvote,
    Downvote,
}

/// Identity of a (user, content) interaction record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionKey {
    pub item_id: EntityId,
    pub item_type: ContentKind,
    pub user_id: EntityId,
}

/// A user's vote and bookmark state for one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInteraction {
    pub item_id: EntityId,
    pub item_type: ContentKind,
    pub user_id: EntityId,
    pub vote_state: VoteState,
    pub is_bookmarked: bool,
}

impl UserInteraction {
    /// A fresh record with no vote and no bookmark.
    pub fn new(key: &InteractionKey) -> Self {
        Self {
            item_id: key.item_id.clone(),
            item_type: key.item_type,
            user_id: key.user_id.clone(),
            vote_state: VoteState::None,
            is_bookmarked: false,
        }
    }

    pub fn key(&self) -> InteractionKey {
        InteractionKey { item_id: self.item_id.clone(), item_type: self.item_type, user_id: self.user_id.clone() }
    }
}

/// Result ordering for listing queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Newest,
    Popular,
    ExpiringSoon,
}

/// Restriction of results to a set of services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFilter {
    #[default]
    All,
    Selected(BTreeSet<EntityId>),
}

impl ServiceFilter {
    /// Build a filter from a collection of IDs.
    ///
    /// An empty collection is not a valid `Selected` filter and yields `All`.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        let ids: BTreeSet<EntityId> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() { ServiceFilter::All } else { ServiceFilter::Selected(ids) }
    }

    /// Collapse an empty `Selected` into `All`.
    pub fn normalized(self) -> Self {
        match self {
            ServiceFilter::Selected(ids) if ids.is_empty() => ServiceFilter::All,
            other => other,
        }
    }

    pub fn matches(&self, service_id: &str) -> bool {
        match self {
            ServiceFilter::All => true,
            ServiceFilter::Selected(ids) => ids.contains(service_id),
        }
    }
}

/// Everything that determines a listing's content, apart from pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryShape {
    pub term: String,
    pub sort: SortMode,
    pub services: ServiceFilter,
    pub category: Option<String>,
}

impl QueryShape {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into(), ..Default::default() }
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_services(mut self, services: ServiceFilter) -> Self {
        self.services = services.normalized();
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }
}

/// A request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub shape: QueryShape,
    /// Opaque continuation token; `None` requests the first page.
    pub cursor: Option<String>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(shape: QueryShape, limit: usize) -> Self {
        Self { shape, cursor: None, limit }
    }

    pub fn is_first_page(&self) -> bool {
        self.cursor.is_none()
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<E> {
    pub items: Vec<E>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<E: Entity> Page<E> {
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|item| item.id().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(id: &str) -> PromoCode {
        PromoCode {
            id: id.into(),
            code: "SAVE10".into(),
            service_id: "svc".into(),
            description: "10% off".into(),
            author_id: "u1".into(),
            upvotes: 3,
            downvotes: 1,
            expires_at: None,
        }
    }

    #[test]
    fn test_service_filter_empty_collapses_to_all() {
        assert_eq!(ServiceFilter::from_ids(Vec::<String>::new()), ServiceFilter::All);
        assert_eq!(ServiceFilter::Selected(BTreeSet::new()).normalized(), ServiceFilter::All);
    }

    #[test]
    fn test_service_filter_matches() {
        let filter = ServiceFilter::from_ids(["netflix", "spotify"]);
        assert!(filter.matches("netflix"));
        assert!(!filter.matches("hulu"));
        assert!(ServiceFilter::All.matches("hulu"));
    }

    #[test]
    fn test_with_votes_replaces_counters_only() {
        let original = promo("p1");
        let updated = original.with_votes(4, 0);
        assert_eq!(updated.upvotes, 4);
        assert_eq!(updated.downvotes, 0);
        assert_eq!(updated.code, original.code);
        assert_eq!(original.upvotes, 3);
    }

    #[test]
    fn test_page_ids_preserve_order() {
        let page = Page { items: vec![promo("b"), promo("a")], next_cursor: None };
        assert_eq!(page.ids(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_vote_state_serde() {
        assert_eq!(serde_json::to_string(&VoteState::Upvote).unwrap(), "\"upvote\"");
        let kind: ContentKind = serde_json::from_str("\"promo_code\"").unwrap();
        assert_eq!(kind, ContentKind::PromoCode);
    }
}
