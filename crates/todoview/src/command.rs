#![forbid(unsafe_code)]

//! Command vocabulary of the dispatcher.
//!
//! Each variant names one UI mutation and carries exactly the parameter it
//! needs. With the `serde` feature commands use the adjacently tagged form
//! `{"command": "<name>", "parameter": <value>}`, e.g.
//! `{"command": "elementComplete", "parameter": {"id": 3, "completed": true}}`.

use std::fmt;
use std::str::FromStr;

use todoview_template::{Item, ItemId};

use crate::error::ViewError;

/// Filter page shown by the footer links (`#/`, `#/active`, `#/completed`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Filter {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = ""))]
    All,
    #[cfg_attr(feature = "serde", serde(rename = "active"))]
    Active,
    #[cfg_attr(feature = "serde", serde(rename = "completed"))]
    Completed,
}

impl Filter {
    /// Page name as it appears in the route (`""`, `"active"`, `"completed"`).
    #[must_use]
    pub const fn page(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Link target of the filter (`#/active`).
    #[must_use]
    pub fn href(self) -> String {
        format!("#/{}", self.page())
    }
}

impl FromStr for Filter {
    type Err = ViewError;

    fn from_str(page: &str) -> Result<Self, Self::Err> {
        match page {
            "" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(ViewError::unknown_filter(other)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.page())
    }
}

/// A named UI mutation with its parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        tag = "command",
        content = "parameter",
        rename_all = "camelCase",
        rename_all_fields = "camelCase"
    )
)]
pub enum Command {
    /// Replace the list content with the given items.
    ShowEntries(Vec<Item>),
    /// Remove the node of one item.
    RemoveItem(ItemId),
    /// Replace the "items left" counter.
    UpdateElementCount(usize),
    /// Relabel the clear-completed control and show or hide it.
    ClearCompletedButton { completed_count: usize, visible: bool },
    /// Show or hide the main and footer regions together.
    ContentBlockVisibility { visible: bool },
    /// Set the toggle-all checkbox.
    ToggleAll { checked: bool },
    /// Move the `selected` marker to the link of the given page.
    SetFilter(Filter),
    /// Empty the new-item input.
    ClearNewTodo,
    /// Reflect one item's completion state.
    ElementComplete { id: ItemId, completed: bool },
    /// Put one item into edit mode.
    EditItem { id: ItemId, title: String },
    /// Leave edit mode and show the committed title.
    EditItemDone { id: ItemId, title: String },
}

impl Command {
    /// Command name as used in the JSON form.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ShowEntries(_) => "showEntries",
            Self::RemoveItem(_) => "removeItem",
            Self::UpdateElementCount(_) => "updateElementCount",
            Self::ClearCompletedButton { .. } => "clearCompletedButton",
            Self::ContentBlockVisibility { .. } => "contentBlockVisibility",
            Self::ToggleAll { .. } => "toggleAll",
            Self::SetFilter(_) => "setFilter",
            Self::ClearNewTodo => "clearNewTodo",
            Self::ElementComplete { .. } => "elementComplete",
            Self::EditItem { .. } => "editItem",
            Self::EditItemDone { .. } => "editItemDone",
        }
    }

    /// Decode a JSON command. Unknown command names are rejected.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(ViewError::InvalidCommand)
    }
}
