//! Deterministic cache keys for listing queries.

use sha2::{Digest, Sha256};

use crate::model::{QueryShape, ServiceFilter};

/// Compute the cache key for a query.
///
/// Only first-page queries are cacheable; any other page yields the empty
/// string, which the cache refuses to store.
pub fn compute_cache_key(shape: &QueryShape, is_first_page: bool) -> String {
    if !is_first_page {
        return String::new();
    }

    let services: Vec<&str> = match &shape.services {
        ServiceFilter::All => Vec::new(),
        ServiceFilter::Selected(ids) => ids.iter().map(String::as_str).collect(),
    };

    let params = serde_json::json!({
        "term": shape.term.trim().to_lowercase(),
        "sort": shape.sort,
        "services": services,
        "category": shape.category,
    });

    let mut hasher = Sha256::new();
    hasher.update(params.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

impl QueryShape {
    /// Cache key of this shape for the given page position.
    pub fn cache_key(&self, is_first_page: bool) -> String {
        compute_cache_key(self, is_first_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortMode;

    fn shape() -> QueryShape {
        QueryShape::new("pizza")
            .with_sort(SortMode::Popular)
            .with_services(ServiceFilter::from_ids(["dominos", "papa-johns"]))
            .with_category(Some("food".into()))
    }

    #[test]
    fn test_key_stability() {
        assert_eq!(compute_cache_key(&shape(), true), compute_cache_key(&shape(), true));
    }

    #[test]
    fn test_key_format() {
        let key = compute_cache_key(&shape(), true);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_non_first_page_is_empty() {
        assert_eq!(compute_cache_key(&shape(), false), "");
    }

    #[test]
    fn test_term_is_normalized() {
        let a = QueryShape::new("  Pizza ");
        let b = QueryShape::new("pizza");
        assert_eq!(a.cache_key(true), b.cache_key(true));
    }

    #[test]
    fn test_service_order_does_not_matter() {
        let a = QueryShape::new("x").with_services(ServiceFilter::from_ids(["b", "a"]));
        let b = QueryShape::new("x").with_services(ServiceFilter::from_ids(["a", "b"]));
        assert_eq!(a.cache_key(true), b.cache_key(true));
    }

    #[test]
    fn test_each_dimension_changes_key() {
        let base = shape().cache_key(true);
        assert_ne!(base, shape().with_sort(SortMode::Newest).cache_key(true));
        assert_ne!(base, shape().with_services(ServiceFilter::All).cache_key(true));
        assert_ne!(base, shape().with_category(None).cache_key(true));
        assert_ne!(base, QueryShape { term: "burger".into(), ..shape() }.cache_key(true));
    }
}
