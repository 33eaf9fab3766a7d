//! Service selection reducer.
//!
//! [`apply_action`] is pure and total: any state with any action yields a
//! valid state, and the single/multi mode chosen at construction survives
//! every transition.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{EntityId, ServiceFilter};

/// Current selection, in the mode fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionState {
    Single { selected_id: Option<EntityId> },
    Multi { selected_ids: BTreeSet<EntityId> },
}

/// User intents the reducer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Search text changed; selection is untouched.
    UpdateQuery(String),
    ToggleService(EntityId),
    ClearSelection,
}

impl SelectionState {
    pub fn single() -> Self {
        SelectionState::Single { selected_id: None }
    }

    pub fn multi() -> Self {
        SelectionState::Multi { selected_ids: BTreeSet::new() }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, SelectionState::Multi { .. })
    }

    pub fn is_selected(&self, id: &str) -> bool {
        match self {
            SelectionState::Single { selected_id } => selected_id.as_deref() == Some(id),
            SelectionState::Multi { selected_ids } => selected_ids.contains(id),
        }
    }

    /// Selected IDs in stable order.
    pub fn selected_ids(&self) -> Vec<EntityId> {
        match self {
            SelectionState::Single { selected_id } => selected_id.iter().cloned().collect(),
            SelectionState::Multi { selected_ids } => selected_ids.iter().cloned().collect(),
        }
    }

    /// Filter for listing queries. Nothing selected means `All`.
    pub fn to_filter(&self) -> ServiceFilter {
        ServiceFilter::from_ids(self.selected_ids())
    }

    /// Same mode, nothing selected.
    fn cleared(&self) -> Self {
        match self {
            SelectionState::Single { .. } => Self::single(),
            SelectionState::Multi { .. } => Self::multi(),
        }
    }
}

/// Apply one action to a selection state.
pub fn apply_action(state: &SelectionState, action: &SelectionAction) -> SelectionState {
    match action {
        SelectionAction::UpdateQuery(_) => state.clone(),
        SelectionAction::ClearSelection => state.cleared(),
        SelectionAction::ToggleService(id) => match state {
            SelectionState::Single { selected_id } => {
                let selected_id = if selected_id.as_deref() == Some(id.as_str()) { None } else { Some(id.clone()) };
                SelectionState::Single { selected_id }
            }
            SelectionState::Multi { selected_ids } => {
                let mut selected_ids = selected_ids.clone();
                if !selected_ids.remove(id) {
                    selected_ids.insert(id.clone());
                }
                SelectionState::Multi { selected_ids }
            }
        },
    }
}
