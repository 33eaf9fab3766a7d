//! In-memory index from stable ID to the most recently seen entity.
//!
//! Filled opportunistically by every fetch. A miss means "not seen yet",
//! never an error.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::model::{Entity, EntityId};

/// Latest copy of each entity, keyed by ID.
///
/// Construct one per entity type in the composition root and share it
/// through `Arc`. Entries are replaced whole, never patched.
#[derive(Debug)]
pub struct EntityIndex<E> {
    entries: RwLock<HashMap<EntityId, E>>,
}

impl<E> Default for EntityIndex<E> {
    fn default() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }
}

impl<E: Entity + Clone> EntityIndex<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every entity, replacing any previous copy with the same ID.
    pub fn add_all<I>(&self, entities: I)
    where
        I: IntoIterator<Item = E>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for entity in entities {
            entries.insert(entity.id().to_string(), entity);
        }
    }

    /// Store one entity, replacing any previous copy.
    pub fn insert(&self, entity: E) {
        self.add_all(std::iter::once(entity));
    }

    pub fn get(&self, id: &str) -> Option<E> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Look up several IDs, skipping unknown ones and keeping request order.
    pub fn get_many<S: AsRef<str>>(&self, ids: &[S]) -> Vec<E> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        ids.iter()
            .filter_map(|id| entries.get(id.as_ref()).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl<E: Entity + Clone + PartialEq> EntityIndex<E> {
    /// Swap the entry for `id` to `replacement` only while it still equals
    /// `expected`. A `None` replacement removes the entry.
    ///
    /// Returns whether the swap happened.
    pub fn replace_if_unchanged(&self, id: &str, expected: &E, replacement: Option<E>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(id) != Some(expected) {
            return false;
        }
        match replacement {
            Some(entity) => entries.insert(id.to_string(), entity),
            None => entries.remove(id),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Service;

    fn service(id: &str, name: &str) -> Service {
        Service { id: id.into(), name: name.into(), category: None, logo_url: None, promo_code_count: 0 }
    }

    #[test]
    fn test_add_and_get() {
        let index = EntityIndex::new();
        index.add_all(vec![service("a", "Alpha"), service("b", "Beta")]);
        assert_eq!(index.get("a").unwrap().name, "Alpha");
        assert!(index.get("zzz").is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_latest_write_wins() {
        let index = EntityIndex::new();
        index.insert(Service { category: Some("video".into()), ..service("a", "Old") });
        index.insert(service("a", "New"));

        let stored = index.get("a").unwrap();
        assert_eq!(stored.name, "New");
        // replaced whole, not merged
        assert_eq!(stored.category, None);
    }

    #[test]
    fn test_get_many_skips_unknown_and_keeps_order() {
        let index = EntityIndex::new();
        index.add_all(vec![service("a", "Alpha"), service("b", "Beta")]);

        let found = index.get_many(&["b", "missing", "a"]);
        let names: Vec<_> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn test_replace_if_unchanged() {
        let index = EntityIndex::new();
        let original = service("a", "Alpha");
        index.insert(original.clone());

        assert!(!index.replace_if_unchanged("a", &service("a", "Other"), None));
        assert_eq!(index.get("a").unwrap(), original);

        assert!(index.replace_if_unchanged("a", &original, Some(service("a", "Beta"))));
        assert_eq!(index.get("a").unwrap().name, "Beta");

        assert!(index.replace_if_unchanged("a", &service("a", "Beta"), None));
        assert!(index.get("a").is_none());
        assert!(!index.replace_if_unchanged("a", &original, None));
    }

    #[test]
    fn test_clear() {
        let index = EntityIndex::new();
        index.insert(service("a", "Alpha"));
        index.clear();
        assert!(index.is_empty());
    }
}
