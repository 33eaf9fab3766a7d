//! Optimistic vote and bookmark flows.
//!
//! The new state is computed locally and published to the entity index
//! before the write goes out. If persistence fails the index is rolled back
//! and the error is returned so the caller can restore its own copy.

use promo_core::{
    ContentKind, EntityIndex, FetchError, InteractionKey, UserInteraction, Votable, VoteState, VoteUpdate,
    apply_vote_update, compute_bookmark_toggle, compute_vote_interaction, compute_vote_update,
};

use crate::source::{AuthContext, PersistenceSink};

/// Result of an accepted vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome<T> {
    pub item: T,
    pub interaction: UserInteraction,
    pub update: VoteUpdate,
}

/// Applies votes and bookmarks on behalf of the signed-in user.
pub struct InteractionService<A, P> {
    auth: A,
    sink: P,
}

impl<A: AuthContext, P: PersistenceSink> InteractionService<A, P> {
    pub fn new(auth: A, sink: P) -> Self {
        Self { auth, sink }
    }

    fn key(&self, item_id: &str, item_type: ContentKind) -> Result<InteractionKey, FetchError> {
        let user_id = self
            .auth
            .current_user_id()
            .ok_or_else(|| FetchError::PermissionDenied("no signed-in user".into()))?;
        Ok(InteractionKey { item_id: item_id.to_string(), item_type, user_id })
    }

    /// Vote on `item`, replacing it in `index` optimistically.
    ///
    /// A failed write restores the previous indexed copy, unless a newer
    /// write has already replaced the optimistic one.
    pub async fn vote<T>(
        &self, index: &EntityIndex<T>, item: &T, item_type: ContentKind, current: Option<&UserInteraction>,
        target: VoteState,
    ) -> Result<VoteOutcome<T>, FetchError>
    where
        T: Votable + Clone + PartialEq,
    {
        let key = self.key(item.id(), item_type)?;
        let current_state = current.map(|i| i.vote_state).unwrap_or_default();

        let update = compute_vote_update(item.upvotes(), item.downvotes(), current_state, target);
        let updated = apply_vote_update(item, &update);
        let interaction = compute_vote_interaction(current, &key, update.vote_state);

        let previous = index.get(item.id());
        index.insert(updated.clone());

        if let Err(e) = self.sink.write_interaction(interaction.clone()).await {
            let rolled_back = index.replace_if_unchanged(item.id(), &updated, previous);
            tracing::warn!(item_id = %key.item_id, rolled_back, error = %e, "vote write failed");
            return Err(e);
        }

        tracing::debug!(item_id = %key.item_id, state = ?update.vote_state, "vote applied");
        Ok(VoteOutcome { item: updated, interaction, update })
    }

    /// Flip the bookmark on an item and persist it.
    pub async fn toggle_bookmark(
        &self, item_id: &str, item_type: ContentKind, current: Option<&UserInteraction>,
    ) -> Result<UserInteraction, FetchError> {
        let key = self.key(item_id, item_type)?;
        let interaction = compute_bookmark_toggle(current, &key);

        self.sink.write_interaction(interaction.clone()).await.inspect_err(|e| {
            tracing::warn!(item_id, error = %e, "bookmark write failed");
        })?;

        Ok(interaction)
    }
}
