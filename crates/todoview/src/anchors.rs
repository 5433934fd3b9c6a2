#![forbid(unsafe_code)]

//! The anchor reference set.
//!
//! Anchors are resolved once, when the view is constructed, and never
//! reassigned. A missing anchor is not an error: every operation that needs
//! it becomes a no-op.

use todoview_surface::Surface;

use crate::config::AnchorSelectors;

/// Cached handles to the fixed regions of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchors<N> {
    pub todo_list: Option<N>,
    pub todo_count: Option<N>,
    pub clear_completed: Option<N>,
    pub main: Option<N>,
    pub footer: Option<N>,
    pub toggle_all: Option<N>,
    pub new_todo: Option<N>,
}

impl<N: Clone> Anchors<N> {
    /// Look up every anchor on `surface`.
    pub fn resolve<S: Surface<Node = N>>(surface: &S, selectors: &AnchorSelectors) -> Self {
        let anchors = Self {
            todo_list: surface.query(&selectors.todo_list),
            todo_count: surface.query(&selectors.todo_count),
            clear_completed: surface.query(&selectors.clear_completed),
            main: surface.query(&selectors.main),
            footer: surface.query(&selectors.footer),
            toggle_all: surface.query(&selectors.toggle_all),
            new_todo: surface.query(&selectors.new_todo),
        };
        let missing = anchors.missing();
        if missing.is_empty() {
            tracing::debug!(message = "view.anchors.resolved");
        } else {
            tracing::debug!(message = "view.anchors.resolved", missing = ?missing);
        }
        anchors
    }

    /// Names of the anchors that were not found.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("todo_list", self.todo_list.is_none()),
            ("todo_count", self.todo_count.is_none()),
            ("clear_completed", self.clear_completed.is_none()),
            ("main", self.main.is_none()),
            ("footer", self.footer.is_none()),
            ("toggle_all", self.toggle_all.is_none()),
            ("new_todo", self.new_todo.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect()
    }
}
