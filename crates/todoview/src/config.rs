#![forbid(unsafe_code)]

//! View configuration: anchor selectors and marker class names.
//!
//! Defaults match the stock page structure and [`MarkupTemplate`] output.
//!
//! [`MarkupTemplate`]: todoview_template::MarkupTemplate

/// Selectors used to resolve the anchor reference set at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AnchorSelectors {
    pub todo_list: String,
    pub todo_count: String,
    pub clear_completed: String,
    pub main: String,
    pub footer: String,
    pub toggle_all: String,
    pub new_todo: String,
}

impl Default for AnchorSelectors {
    fn default() -> Self {
        Self {
            todo_list: ".todo-list".to_owned(),
            todo_count: ".todo-count".to_owned(),
            clear_completed: ".clear-completed".to_owned(),
            main: ".main".to_owned(),
            footer: ".footer".to_owned(),
            toggle_all: ".toggle-all".to_owned(),
            new_todo: ".new-todo".to_owned(),
        }
    }
}

/// Configuration of a [`View`](crate::View).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ViewConfig {
    pub anchors: AnchorSelectors,
    /// Tag (or selector) of one rendered item node.
    pub item_selector: String,
    /// Container of the filter links.
    pub filters_selector: String,
    pub completed_class: String,
    pub editing_class: String,
    pub selected_class: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            anchors: AnchorSelectors::default(),
            item_selector: "li".to_owned(),
            filters_selector: ".filters".to_owned(),
            completed_class: "completed".to_owned(),
            editing_class: "editing".to_owned(),
            selected_class: "selected".to_owned(),
        }
    }
}

impl ViewConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_anchors(mut self, anchors: AnchorSelectors) -> Self {
        self.anchors = anchors;
        self
    }

    #[must_use]
    pub fn with_item_selector(mut self, selector: impl Into<String>) -> Self {
        self.item_selector = selector.into();
        self
    }

    #[must_use]
    pub fn with_filters_selector(mut self, selector: impl Into<String>) -> Self {
        self.filters_selector = selector.into();
        self
    }

    #[must_use]
    pub fn with_completed_class(mut self, class: impl Into<String>) -> Self {
        self.completed_class = class.into();
        self
    }

    #[must_use]
    pub fn with_editing_class(mut self, class: impl Into<String>) -> Self {
        self.editing_class = class.into();
        self
    }

    #[must_use]
    pub fn with_selected_class(mut self, class: impl Into<String>) -> Self {
        self.selected_class = class.into();
        self
    }

    /// Selector of an item's label, relative to the list.
    pub(crate) fn label_selector(&self) -> String {
        format!("{} label", self.item_selector)
    }

    /// Selector of an item's edit field, relative to the list.
    pub(crate) fn edit_field_selector(&self) -> String {
        format!("{} .{}", self.item_selector, crate::edit::EDIT_CLASS)
    }
}
