#![forbid(unsafe_code)]

//! Inline-edit state machine for one item node.
//!
//! # State transitions
//!
//! ```text
//!            editItem                    blur (flag clear)
//!  ┌─────────┐ ───────▶ ┌─────────────────────┐ ──────────▶ itemEditDone
//!  │ Display │          │ Editing { cancelled }│
//!  └─────────┘ ◀─────── └─────────────────────┘ ──────────▶ itemEditCancel
//!            editItemDone                Escape: flag set, then blur
//! ```
//!
//! The session state lives on the surface: an item is editing while it
//! carries the editing class and an `input.edit` child. The cancellation
//! flag is the `data-iscanceled` attribute of that input. Escape sets the
//! flag *before* forcing the blur, so the blur handler observes it and the
//! commit event is suppressed.
//!
//! Cancelling does not restore the display representation; the controller
//! decides what to render next. Nothing prevents two items from editing at
//! the same time.

use todoview_surface::Surface;

/// Key code of Enter.
pub const ENTER_KEY: u32 = 13;
/// Key code of Escape.
pub const ESCAPE_KEY: u32 = 27;
/// Attribute carrying the cancellation flag on an edit field.
pub const CANCEL_FLAG: &str = "data-iscanceled";
/// Class of the edit field appended to an item.
pub const EDIT_CLASS: &str = "edit";

const EDIT_FIELD: &str = "input.edit";

/// Edit state of one item node, as read back from the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Display,
    Editing { cancelled: bool },
}

impl EditPhase {
    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}

/// Read the phase of `item`.
pub fn phase<S: Surface>(surface: &S, item: &S::Node, editing_class: &str) -> EditPhase {
    match surface.query_within(item, EDIT_FIELD) {
        Some(field) if surface.has_class(item, editing_class) => EditPhase::Editing {
            cancelled: is_cancelled(surface, &field),
        },
        _ => EditPhase::Display,
    }
}

/// Whether the edit field was cancelled with Escape.
pub fn is_cancelled<S: Surface>(surface: &S, field: &S::Node) -> bool {
    surface.attribute(field, CANCEL_FLAG).as_deref() == Some("true")
}

/// Display → Editing: mark the item, seed an edit field with `title`, and
/// focus it. An item that is already editing keeps its single field, which
/// is reseeded and has its cancellation flag cleared.
pub(crate) fn enter<S: Surface>(surface: &S, item: &S::Node, title: &str, editing_class: &str) {
    let field = match surface.query_within(item, EDIT_FIELD) {
        Some(existing) => {
            surface.remove_attribute(&existing, CANCEL_FLAG);
            existing
        }
        None => {
            let Some(field) = surface.create_element("input") else {
                return;
            };
            surface.add_class(&field, EDIT_CLASS);
            surface.append_child(item, &field);
            field
        }
    };
    surface.add_class(item, editing_class);
    surface.set_value(&field, title);
    surface.focus(&field);
    tracing::debug!(message = "view.edit.enter");
}

/// Editing → Display: drop the edit field, clear the editing class, and show
/// `title` in the item's labels.
pub(crate) fn commit<S: Surface>(surface: &S, item: &S::Node, title: &str, editing_class: &str) {
    for field in surface.query_all_within(item, EDIT_FIELD) {
        surface.remove(&field);
    }
    surface.remove_class(item, editing_class);
    for label in surface.query_all_within(item, "label") {
        surface.set_text(&label, title);
    }
    tracing::debug!(message = "view.edit.commit");
}

/// Escape: raise the cancellation flag, then force the blur.
pub(crate) fn cancel<S: Surface>(surface: &S, field: &S::Node) {
    surface.set_attribute(field, CANCEL_FLAG, "true");
    surface.blur(field);
    tracing::debug!(message = "view.edit.cancel");
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoview_surface::MemoryDocument;

    fn item_doc() -> (MemoryDocument, <MemoryDocument as Surface>::Node) {
        let doc = MemoryDocument::from_markup(
            "<ul><li data-id=\"1\"><div class=\"view\"><label>A</label></div></li></ul>",
        );
        let item = doc.query("li").unwrap();
        (doc, item)
    }

    #[test]
    fn enter_creates_one_focused_field() {
        let (doc, item) = item_doc();
        enter(&doc, &item, "A", "editing");
        enter(&doc, &item, "A2", "editing");

        let fields = doc.query_all_within(&item, "input.edit");
        assert_eq!(fields.len(), 1);
        assert_eq!(doc.value(&fields[0]), "A2");
        assert_eq!(doc.focused(), Some(fields[0]));
        assert_eq!(phase(&doc, &item, "editing"), EditPhase::Editing { cancelled: false });
    }

    #[test]
    fn cancel_sets_flag_and_blurs() {
        let (doc, item) = item_doc();
        enter(&doc, &item, "A", "editing");
        let field = doc.query_within(&item, "input.edit").unwrap();
        cancel(&doc, &field);
        assert!(is_cancelled(&doc, &field));
        assert_eq!(doc.focused(), None);
        assert_eq!(phase(&doc, &item, "editing"), EditPhase::Editing { cancelled: true });
    }

    #[test]
    fn reentering_clears_cancellation() {
        let (doc, item) = item_doc();
        enter(&doc, &item, "A", "editing");
        let field = doc.query_within(&item, "input.edit").unwrap();
        cancel(&doc, &field);
        enter(&doc, &item, "A", "editing");
        assert!(!is_cancelled(&doc, &field));
    }

    #[test]
    fn commit_restores_display_with_new_title() {
        let (doc, item) = item_doc();
        enter(&doc, &item, "A", "editing");
        commit(&doc, &item, "B", "editing");
        assert_eq!(phase(&doc, &item, "editing"), EditPhase::Display);
        assert!(doc.query_within(&item, "input.edit").is_none());
        assert!(!doc.has_class(&item, "editing"));
        assert_eq!(doc.text_content(item), "B");
    }

    #[test]
    fn phase_requires_both_class_and_field() {
        let (doc, item) = item_doc();
        doc.add_class(&item, "editing");
        assert_eq!(phase(&doc, &item, "editing"), EditPhase::Display);
        assert!(!phase(&doc, &item, "editing").is_editing());
    }
}
