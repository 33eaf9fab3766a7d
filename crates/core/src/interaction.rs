//! Optimistic vote and bookmark computation.
//!
//! Everything here is pure. Callers apply the results to whatever content
//! is being voted on and hand the new interaction to persistence.

use serde::{Deserialize, Serialize};

use crate::model::{InteractionKey, UserInteraction, Votable, VoteState};

/// Counters and vote state after a vote click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteUpdate {
    pub upvotes: i64,
    pub downvotes: i64,
    pub vote_state: VoteState,
}

/// Compute the effect of clicking `target` while `current` is active.
///
/// | current      | target       | effect                          |
/// |--------------|--------------|---------------------------------|
/// | same         | same         | undo: counter -1, state `None`  |
/// | `None`       | up/down      | counter +1, state = target      |
/// | up/down      | the other    | target +1, previous -1          |
///
/// Counters never go below zero.
pub fn compute_vote_update(
    current_upvotes: i64, current_downvotes: i64, current: VoteState, target: VoteState,
) -> VoteUpdate {
    let (mut up, mut down) = (current_upvotes, current_downvotes);

    let vote_state = if target == current {
        match current {
            VoteState::Upvote => up = up.saturating_sub(1),
            VoteState::Downvote => down = down.saturating_sub(1),
            VoteState::None => {}
        }
        VoteState::None
    } else {
        match current {
            VoteState::Upvote => up = up.saturating_sub(1),
            VoteState::Downvote => down = down.saturating_sub(1),
            VoteState::None => {}
        }
        match target {
            VoteState::Upvote => up = up.saturating_add(1),
            VoteState::Downvote => down = down.saturating_add(1),
            VoteState::None => {}
        }
        target
    };

    VoteUpdate { upvotes: up.max(0), downvotes: down.max(0), vote_state }
}

/// Replacement copy of `item` carrying the updated counters.
pub fn apply_vote_update<T: Votable>(item: &T, update: &VoteUpdate) -> T {
    item.with_votes(update.upvotes, update.downvotes)
}

/// Interaction record after a vote, created lazily if none exists.
pub fn compute_vote_interaction(
    current: Option<&UserInteraction>, key: &InteractionKey, vote_state: VoteState,
) -> UserInteraction {
    let base = current.cloned().unwrap_or_else(|| UserInteraction::new(key));
    UserInteraction { vote_state, ..base }
}

/// Flip the bookmark flag.
///
/// With no prior interaction, the result is a new bookmarked record with no vote.
pub fn compute_bookmark_toggle(current: Option<&UserInteraction>, key: &InteractionKey) -> UserInteraction {
    match current {
        Some(existing) => UserInteraction { is_bookmarked: !existing.is_bookmarked, ..existing.clone() },
        None => UserInteraction { is_bookmarked: true, ..UserInteraction::new(key) },
    }
}
