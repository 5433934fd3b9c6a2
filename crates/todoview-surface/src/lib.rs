#![forbid(unsafe_code)]

//! Rendering-surface capability for todoview.
//!
//! The view core never talks to a concrete rendering API. Everything it needs
//! from the surface (element lookup, attribute and class helpers, focus,
//! direct and delegated subscription) is expressed by the [`Surface`] trait.
//!
//! Two implementations exist in the workspace:
//!
//! - [`MemoryDocument`] (this crate): a single-threaded document over a
//!   `scraper` tree, used by headless hosts and by every test in the
//!   workspace.
//! - `DomSurface` (`todoview-web`): the browser DOM through `web-sys`.
//!
//! # Delegation contract
//!
//! [`Surface::delegate`] subscribes once on a container. The handler fires
//! when the *original target* of a raw event matches the selector and lies
//! inside the container; the handler receives that element as
//! [`SurfaceEvent::current`]. Non-bubbling kinds ([`EventKind::Blur`],
//! [`EventKind::Focus`]) are delegated with capture semantics, so they are
//! covered as well. Elements added under the container after the call are
//! covered without re-subscription.
//!
//! # Subscriptions
//!
//! Both [`Surface::listen`] and [`Surface::delegate`] return an RAII guard.
//! Dropping the guard detaches the handler.

pub mod memory;

use std::fmt;

pub use memory::{MemoryDocument, MemorySubscription, NodeId};

/// Raw event kinds the surface can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    DoubleClick,
    Change,
    Blur,
    Focus,
    KeyPress,
    KeyUp,
}

impl EventKind {
    /// The event type name used by the DOM (`"dblclick"`, `"keyup"`, ...).
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DoubleClick => "dblclick",
            Self::Change => "change",
            Self::Blur => "blur",
            Self::Focus => "focus",
            Self::KeyPress => "keypress",
            Self::KeyUp => "keyup",
        }
    }

    /// Whether the event propagates from the target to its ancestors.
    #[must_use]
    pub const fn bubbles(self) -> bool {
        !matches!(self, Self::Blur | Self::Focus)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}

/// A raw event as seen by a surface handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEvent<N> {
    /// Kind of the raw event.
    pub kind: EventKind,
    /// Element the event was originally dispatched to.
    pub target: N,
    /// Element the handler is attached to (direct subscription) or the
    /// matching descendant (delegated subscription).
    pub current: N,
    /// Legacy key code for keyboard events.
    pub key_code: Option<u32>,
}

/// Boxed raw-event handler.
pub type Handler<N> = Box<dyn FnMut(&SurfaceEvent<N>)>;

/// Query, mutation, and subscription primitives over a rendering surface.
///
/// Implementations are cheap handles: cloning a surface yields another
/// handle to the same document, which is how handlers reach back into it.
/// Operations on detached or unknown nodes are no-ops.
pub trait Surface: Clone + 'static {
    /// Handle to one element of the surface.
    type Node: Clone + PartialEq + fmt::Debug + 'static;
    /// Guard returned by subscriptions; dropping it detaches the handler.
    type Subscription: 'static;

    /// First element in document order matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Node>;

    /// First descendant of `scope` matching `selector`.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// All descendants of `scope` matching `selector`, in document order.
    fn query_all_within(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// Nearest strict ancestor of `node` matching `selector`.
    fn closest_ancestor(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Replace the children of `node` with the parsed `markup`.
    fn set_inner_html(&self, node: &Self::Node, markup: &str);

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Option<Self::Node>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node);

    /// Detach `node` (and its subtree) from its parent.
    fn remove(&self, node: &Self::Node);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&self, node: &Self::Node, name: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Show (`display: block`) or hide (`display: none`) `node`.
    fn set_visible(&self, node: &Self::Node, visible: bool);

    /// Current value of a form control (empty for other elements).
    fn value(&self, node: &Self::Node) -> String;

    fn set_value(&self, node: &Self::Node, value: &str);

    /// Current checked state of a checkbox.
    fn checked(&self, node: &Self::Node) -> bool;

    fn set_checked(&self, node: &Self::Node, checked: bool);

    /// Replace all children of `node` with a single text node.
    fn set_text(&self, node: &Self::Node, text: &str);

    /// Give `node` input focus, blurring the previously focused element.
    fn focus(&self, node: &Self::Node);

    /// Remove focus from `node` if it holds it.
    fn blur(&self, node: &Self::Node);

    /// Subscribe `handler` to `kind` events on `node` itself.
    fn listen(
        &self,
        node: &Self::Node,
        kind: EventKind,
        handler: Handler<Self::Node>,
    ) -> Self::Subscription;

    /// Subscribe `handler` once on `container` for descendants matching
    /// `selector`.
    fn delegate(
        &self,
        container: &Self::Node,
        selector: &str,
        kind: EventKind,
        handler: Handler<Self::Node>,
    ) -> Self::Subscription;
}
