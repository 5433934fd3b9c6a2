#![forbid(unsafe_code)]

//! Item model and markup templates for todoview.
//!
//! The view core never builds markup itself. It hands item collections and
//! counts to a [`Template`] and installs the returned markup on the surface.
//! [`MarkupTemplate`] is the stock implementation; its output is the contract
//! the view's selectors rely on:
//!
//! ```text
//! <li data-id="{id}" class="{completed}">
//!   <div class="view">
//!     <input class="toggle" type="checkbox" {checked}>
//!     <label>{title}</label>
//!     <button class="destroy"></button>
//!   </div>
//! </li>
//! ```

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of one item, rendered as the `data-id` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Canonical item as owned by the controller layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completed: bool,
}

impl Item {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Markup producer the view is constructed with.
pub trait Template {
    /// Markup for the whole item list.
    fn show(&self, items: &[Item]) -> String;

    /// Markup for the "items left" counter.
    fn item_counter(&self, active: usize) -> String;

    /// Label of the clear-completed control.
    fn clear_completed_button(&self, completed: usize) -> String;
}

impl<T: Template + ?Sized> Template for &T {
    fn show(&self, items: &[Item]) -> String {
        (**self).show(items)
    }

    fn item_counter(&self, active: usize) -> String {
        (**self).item_counter(active)
    }

    fn clear_completed_button(&self, completed: usize) -> String {
        (**self).clear_completed_button(completed)
    }
}

impl<T: Template + ?Sized> Template for Box<T> {
    fn show(&self, items: &[Item]) -> String {
        (**self).show(items)
    }

    fn item_counter(&self, active: usize) -> String {
        (**self).item_counter(active)
    }

    fn clear_completed_button(&self, completed: usize) -> String {
        (**self).clear_completed_button(completed)
    }
}

/// Stock markup template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupTemplate;

impl MarkupTemplate {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn write_item(out: &mut String, item: &Item) {
        use fmt::Write as _;

        let (class, checked) = if item.completed {
            ("completed", " checked")
        } else {
            ("", "")
        };
        let _ = write!(
            out,
            "<li data-id=\"{id}\" class=\"{class}\">\
             <div class=\"view\">\
             <input class=\"toggle\" type=\"checkbox\"{checked}>\
             <label>{title}</label>\
             <button class=\"destroy\"></button>\
             </div>\
             </li>",
            id = item.id,
            title = v_htmlescape::escape(&item.title),
        );
    }
}

impl Template for MarkupTemplate {
    fn show(&self, items: &[Item]) -> String {
        let mut out = String::with_capacity(items.len() * 160);
        for item in items {
            Self::write_item(&mut out, item);
        }
        out
    }

    fn item_counter(&self, active: usize) -> String {
        let plural = if active == 1 { "" } else { "s" };
        format!("<strong>{active}</strong> item{plural} left")
    }

    fn clear_completed_button(&self, completed: usize) -> String {
        if completed > 0 {
            "Clear completed".to_owned()
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn show_renders_one_entry_per_item() {
        let items = vec![Item::new(1, "Walk"), Item::new(2, "Read").completed(true)];
        assert_eq!(
            MarkupTemplate.show(&items),
            "<li data-id=\"1\" class=\"\"><div class=\"view\">\
             <input class=\"toggle\" type=\"checkbox\"><label>Walk</label>\
             <button class=\"destroy\"></button></div></li>\
             <li data-id=\"2\" class=\"completed\"><div class=\"view\">\
             <input class=\"toggle\" type=\"checkbox\" checked><label>Read</label>\
             <button class=\"destroy\"></button></div></li>"
        );
    }

    #[test]
    fn show_escapes_titles() {
        let out = MarkupTemplate.show(&[Item::new(3, "<script>&\"'")]);
        assert!(out.contains("<label>&lt;script&gt;&amp;&quot;&#x27;</label>"));
    }

    #[test]
    fn empty_collection_renders_nothing() {
        assert_eq!(MarkupTemplate.show(&[]), "");
    }

    #[test]
    fn counter_pluralizes() {
        assert_eq!(MarkupTemplate.item_counter(0), "<strong>0</strong> items left");
        assert_eq!(MarkupTemplate.item_counter(1), "<strong>1</strong> item left");
        assert_eq!(MarkupTemplate.item_counter(7), "<strong>7</strong> items left");
    }

    #[test]
    fn clear_button_label_depends_on_count() {
        assert_eq!(MarkupTemplate.clear_completed_button(0), "");
        assert_eq!(MarkupTemplate.clear_completed_button(2), "Clear completed");
    }

    #[test]
    fn item_id_parses_decimal_attribute() {
        assert_eq!("42".parse::<ItemId>(), Ok(ItemId(42)));
        assert_eq!(" 7 ".parse::<ItemId>(), Ok(ItemId(7)));
        assert!("x".parse::<ItemId>().is_err());
        assert!("".parse::<ItemId>().is_err());
        assert_eq!(ItemId(9).to_string(), "9");
    }

    #[test]
    fn templates_work_through_references_and_boxes() {
        let boxed: Box<dyn Template> = Box::new(MarkupTemplate);
        assert_eq!(boxed.item_counter(2), (&MarkupTemplate).item_counter(2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn items_deserialize_with_default_completion() {
        let item: Item = serde_json::from_str(r#"{"id": 4, "title": "Ship"}"#).unwrap();
        assert_eq!(item, Item::new(4, "Ship"));
    }
}
