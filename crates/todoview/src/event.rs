#![forbid(unsafe_code)]

//! Semantic events raised by the binder.
//!
//! Handlers receive an [`AppEvent`], never a raw surface event. The binder
//! normalizes raw input (a change on the new-item input, a double-click on a
//! label, an Escape key in an edit field) into one of these intents.

use std::fmt;
use std::str::FromStr;

use todoview_template::ItemId;

use crate::error::ViewError;

/// Discriminant of [`AppEvent`]; the key handlers are bound under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AppEventKind {
    NewTodo,
    RemoveCompleted,
    ToggleAll,
    ItemEdit,
    ItemRemove,
    ItemToggle,
    ItemEditDone,
    ItemEditCancel,
}

impl AppEventKind {
    pub const ALL: [Self; 8] = [
        Self::NewTodo,
        Self::RemoveCompleted,
        Self::ToggleAll,
        Self::ItemEdit,
        Self::ItemRemove,
        Self::ItemToggle,
        Self::ItemEditDone,
        Self::ItemEditCancel,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NewTodo => "newTodo",
            Self::RemoveCompleted => "removeCompleted",
            Self::ToggleAll => "toggleAll",
            Self::ItemEdit => "itemEdit",
            Self::ItemRemove => "itemRemove",
            Self::ItemToggle => "itemToggle",
            Self::ItemEditDone => "itemEditDone",
            Self::ItemEditCancel => "itemEditCancel",
        }
    }
}

impl FromStr for AppEventKind {
    type Err = ViewError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ViewError::unknown_event(name))
    }
}

impl fmt::Display for AppEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user intent with its normalized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        tag = "event",
        content = "payload",
        rename_all = "camelCase",
        rename_all_fields = "camelCase"
    )
)]
pub enum AppEvent {
    /// The new-item input committed its value.
    NewTodo(String),
    RemoveCompleted,
    ToggleAll { completed: bool },
    ItemEdit { id: ItemId },
    ItemRemove { id: ItemId },
    ItemToggle { id: ItemId, completed: bool },
    /// An edit field lost focus without being cancelled.
    ItemEditDone { id: ItemId, title: String },
    ItemEditCancel { id: ItemId },
}

impl AppEvent {
    #[must_use]
    pub const fn kind(&self) -> AppEventKind {
        match self {
            Self::NewTodo(_) => AppEventKind::NewTodo,
            Self::RemoveCompleted => AppEventKind::RemoveCompleted,
            Self::ToggleAll { .. } => AppEventKind::ToggleAll,
            Self::ItemEdit { .. } => AppEventKind::ItemEdit,
            Self::ItemRemove { .. } => AppEventKind::ItemRemove,
            Self::ItemToggle { .. } => AppEventKind::ItemToggle,
            Self::ItemEditDone { .. } => AppEventKind::ItemEditDone,
            Self::ItemEditCancel { .. } => AppEventKind::ItemEditCancel,
        }
    }

    /// Item the event refers to, if any.
    #[must_use]
    pub const fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::ItemEdit { id }
            | Self::ItemRemove { id }
            | Self::ItemToggle { id, .. }
            | Self::ItemEditDone { id, .. }
            | Self::ItemEditCancel { id } => Some(*id),
            Self::NewTodo(_) | Self::RemoveCompleted | Self::ToggleAll { .. } => None,
        }
    }

    /// Encode as `{"event": "<name>", "payload": ...}`.
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn to_json(&self) -> String {
        // Every payload is plain data; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
