#![forbid(unsafe_code)]

//! In-memory document implementing [`Surface`].
//!
//! [`MemoryDocument`] is a `scraper` node tree behind `Rc<RefCell<..>>`.
//! Markup is parsed with the HTML5 fragment algorithm and selectors are
//! matched with [`scraper::Selector`], so lenient markup (optional end tags,
//! unquoted attributes) lands in the tree the way a browser would build it.
//! Cloning the document yields another handle to the same tree, which is how
//! event handlers reach back into it.
//!
//! Form-control state (`value`, `checked`) and visibility live beside the
//! tree. A control starts from its `value`/`checked` attributes and diverges
//! once it is written, like the DOM's dirty value flag.
//!
//! # Event dispatch
//!
//! Dispatch computes the path from the target to the root, collects the
//! matching listeners while the tree is borrowed, then releases the borrow
//! before invoking them. Handlers are therefore free to query and mutate the
//! document, and to trigger nested dispatch (an Escape handler forcing a
//! blur, for example). A handler that is already running is not re-entered;
//! the nested call is skipped and logged.
//!
//! # Invariants
//!
//! 1. At most one element holds focus, and it is connected to the root.
//! 2. Removing a subtree that holds focus clears focus without a blur event.
//! 3. Dropping a [`MemorySubscription`] stops its handler from being invoked,
//!    including for dispatches already in flight.
//!
//! Detached nodes stay in the tree's arena until the document is dropped.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use ego_tree::{NodeRef, Tree};
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element, Text};
use scraper::{CaseSensitivity, ElementRef, Html, Node, Selector, StrTendril};

use crate::{EventKind, Handler, Surface, SurfaceEvent};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Handle to a node of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(ego_tree::NodeId);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[derive(Debug, Default)]
struct Control {
    value: Option<String>,
    checked: Option<bool>,
}

type SharedHandler = Rc<RefCell<Handler<NodeId>>>;

struct ListenerEntry {
    id: u64,
    node: NodeId,
    kind: EventKind,
    selector: Option<Selector>,
    alive: Rc<Cell<bool>>,
    handler: SharedHandler,
}

struct DocumentInner {
    tree: Tree<Node>,
    focused: Option<NodeId>,
    controls: HashMap<NodeId, Control>,
    hidden: HashSet<NodeId>,
    listeners: Vec<ListenerEntry>,
    next_listener: u64,
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

fn element_name(tag: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag))
}

fn is_checkbox(element: &ElementRef<'_>) -> bool {
    element.value().name() == "input" && element.attr("type") == Some("checkbox")
}

impl DocumentInner {
    fn root(&self) -> NodeId {
        NodeId(self.tree.root().id())
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.tree.get(id.0)
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.node(id).and_then(ElementRef::wrap)
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Elements and the root accept children.
    fn is_container(&self, id: NodeId) -> bool {
        id == self.root() || self.is_element(id)
    }

    fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root(), id)
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor
            || self
                .node(node)
                .is_some_and(|n| n.ancestors().any(|a| a.id() == ancestor.0))
    }

    fn is_focusable(&self, id: NodeId) -> bool {
        self.is_element(id) && self.is_connected(id)
    }

    fn detach(&mut self, id: NodeId) {
        if self.node(id).and_then(|n| n.parent()).is_none() {
            return;
        }
        if let Some(focused) = self.focused
            && self.is_inclusive_ancestor(id, focused)
        {
            self.focused = None;
        }
        if let Some(mut node) = self.tree.get_mut(id.0) {
            node.detach();
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_container(parent) || self.node(child).is_none() || child == self.root() {
            return;
        }
        // Appending an ancestor under its own descendant would create a cycle.
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(mut parent) = self.tree.get_mut(parent.0) {
            parent.append_id(child.0);
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self
            .node(id)
            .map(|n| n.children().map(|c| NodeId(c.id())).collect())
            .unwrap_or_default();
        for child in children {
            self.detach(child);
        }
    }

    /// Parse `markup` as a body fragment and append its nodes to `parent`.
    fn graft(&mut self, parent: NodeId, markup: &str) {
        let fragment = Html::parse_fragment(markup);
        let orphan = self.tree.extend_tree(fragment.tree).id();
        // The fragment root holds a synthetic `<html>` element whose
        // children are the parsed nodes.
        let parsed: Vec<NodeId> = self
            .tree
            .get(orphan)
            .and_then(|root| root.children().find(|c| c.value().is_element()))
            .map(|html| html.children().map(|c| NodeId(c.id())).collect())
            .unwrap_or_default();
        for node in parsed {
            self.append(parent, node);
        }
    }

    /// Elements strictly below `scope`, in document order.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        self.node(scope).map_or_else(Vec::new, |node| {
            node.descendants()
                .skip(1)
                .filter(|n| n.value().is_element())
                .map(|n| NodeId(n.id()))
                .collect()
        })
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id).is_some_and(|e| selector.matches(&e))
    }

    fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.node(id) {
            for text in node.descendants().filter_map(|n| n.value().as_text()) {
                out.push_str(&text.text);
            }
        }
        out
    }

    fn outer_html(&self, id: NodeId) -> String {
        if let Some(element) = self.element(id) {
            return element.html();
        }
        match self.node(id).map(|n| n.value()) {
            Some(Node::Text(text)) => v_htmlescape::escape(&text.text).to_string(),
            _ => String::new(),
        }
    }

    fn inner_html(&self, id: NodeId) -> String {
        if let Some(element) = self.element(id) {
            return element.inner_html();
        }
        self.node(id).map_or_else(String::new, |node| {
            node.children()
                .map(|child| self.outer_html(NodeId(child.id())))
                .collect()
        })
    }

    /// Rewrite the attributes of an element.
    ///
    /// `scraper` caches the id and class list on first use, so the element
    /// is rebuilt rather than patched in place.
    fn update_attributes(&mut self, id: NodeId, update: impl FnOnce(&mut Vec<(String, String)>)) {
        let Some(mut node) = self.tree.get_mut(id.0) else {
            return;
        };
        let Node::Element(element) = node.value() else {
            return;
        };
        let name = element.name.clone();
        let mut attributes: Vec<(String, String)> = element
            .attrs()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        update(&mut attributes);
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| Attribute {
                name: attribute_name(&k),
                value: StrTendril::from_slice(&v),
            })
            .collect();
        *node.value() = Node::Element(Element::new(name, attributes));
    }

    fn update_classes(&mut self, id: NodeId, update: impl FnOnce(&mut Vec<String>)) {
        self.update_attributes(id, |attributes| {
            let mut classes: Vec<String> = attributes
                .iter()
                .find(|(name, _)| name == "class")
                .map(|(_, v)| v.split_ascii_whitespace().map(str::to_owned).collect())
                .unwrap_or_default();
            update(&mut classes);
            let joined = classes.join(" ");
            match attributes.iter_mut().find(|(name, _)| name == "class") {
                Some((_, value)) => *value = joined,
                None => attributes.push(("class".to_owned(), joined)),
            }
        });
    }

    fn control(&mut self, id: NodeId) -> Option<&mut Control> {
        self.node(id)?;
        Some(self.controls.entry(id).or_default())
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            tracing::warn!(message = "surface.selector.invalid", selector, %error);
            None
        }
    }
}

/// Single-threaded document over a `scraper` node tree.
#[derive(Clone)]
pub struct MemoryDocument {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryDocument")
            .field("nodes", &inner.tree.nodes().count())
            .field("focused", &inner.focused)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl MemoryDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                tree: Html::new_document().tree,
                focused: None,
                controls: HashMap::new(),
                hidden: HashSet::new(),
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    /// Create a document whose body is the parsed `markup`.
    #[must_use]
    pub fn from_markup(markup: &str) -> Self {
        let doc = Self::new();
        let root = doc.root();
        doc.set_inner_html(&root, markup);
        doc
    }

    /// The document root. Selectors never match it.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root()
    }

    /// Currently focused element.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.inner.borrow().focused
    }

    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.borrow().is_connected(node)
    }

    #[must_use]
    pub fn is_visible(&self, node: NodeId) -> bool {
        let inner = self.inner.borrow();
        inner.node(node).is_some() && !inner.hidden.contains(&node)
    }

    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        Some(self.inner.borrow().element(node)?.value().name().to_owned())
    }

    /// Parent node, `None` for the root and detached nodes.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        Some(NodeId(self.inner.borrow().node(node)?.parent()?.id()))
    }

    /// Element children of `node`, in order.
    #[must_use]
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.borrow().node(node).map_or_else(Vec::new, |n| {
            n.children()
                .filter(|child| child.value().is_element())
                .map(|child| NodeId(child.id()))
                .collect()
        })
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        self.inner.borrow().text_content(node)
    }

    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        self.inner.borrow().inner_html(node)
    }

    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        self.inner.borrow().outer_html(node)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Dispatch a raw event to `target`.
    pub fn dispatch(&self, target: NodeId, kind: EventKind, key_code: Option<u32>) {
        let calls: Vec<(Rc<Cell<bool>>, SharedHandler, SurfaceEvent<NodeId>)> = {
            let inner = self.inner.borrow();
            let Some(node) = inner.element(target) else {
                return;
            };
            let path: Vec<NodeId> = std::iter::once(target)
                .chain(node.ancestors().map(|a| NodeId(a.id())))
                .collect();

            let mut calls = Vec::new();
            for (depth, &node) in path.iter().enumerate() {
                for entry in inner
                    .listeners
                    .iter()
                    .filter(|e| e.node == node && e.kind == kind)
                {
                    let current = match &entry.selector {
                        None if depth == 0 || kind.bubbles() => node,
                        None => continue,
                        Some(selector) if depth > 0 && inner.matches(target, selector) => target,
                        Some(_) => continue,
                    };
                    calls.push((
                        Rc::clone(&entry.alive),
                        Rc::clone(&entry.handler),
                        SurfaceEvent {
                            kind,
                            target,
                            current,
                            key_code,
                        },
                    ));
                }
            }
            calls
        };

        for (alive, handler, event) in calls {
            if !alive.get() {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(&event),
                Err(_) => {
                    tracing::warn!(
                        message = "surface.listener.reentrant",
                        kind = %event.kind,
                        target = %event.target
                    );
                }
            }
        }
    }

    /// Simulate a user click. Checkboxes flip their checked state first and
    /// follow the click with a change event.
    pub fn click(&self, node: NodeId) {
        let checkbox = {
            let inner = self.inner.borrow();
            inner.element(node).is_some_and(|e| is_checkbox(&e))
        };
        if checkbox {
            let checked = self.checked(&node);
            self.set_checked(&node, !checked);
        }
        self.dispatch(node, EventKind::Click, None);
        if checkbox {
            self.dispatch(node, EventKind::Change, None);
        }
    }

    pub fn double_click(&self, node: NodeId) {
        self.dispatch(node, EventKind::DoubleClick, None);
    }

    /// Fire a change event, as a text input does when it commits its value.
    pub fn change(&self, node: NodeId) {
        self.dispatch(node, EventKind::Change, None);
    }

    pub fn key_press(&self, node: NodeId, key_code: u32) {
        self.dispatch(node, EventKind::KeyPress, Some(key_code));
    }

    pub fn key_up(&self, node: NodeId, key_code: u32) {
        self.dispatch(node, EventKind::KeyUp, Some(key_code));
    }

    /// Replace the value of a form control the way typing does: no events.
    pub fn type_text(&self, node: NodeId, text: &str) {
        self.set_value(&node, text);
    }

    fn subscribe(
        &self,
        node: NodeId,
        kind: EventKind,
        selector: Option<Selector>,
        handler: Handler<NodeId>,
    ) -> MemorySubscription {
        let alive = Rc::new(Cell::new(true));
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.push(ListenerEntry {
            id,
            node,
            kind,
            selector,
            alive: Rc::clone(&alive),
            handler: Rc::new(RefCell::new(handler)),
        });
        MemorySubscription {
            doc: Rc::downgrade(&self.inner),
            id,
            alive,
        }
    }
}

/// RAII guard for a [`MemoryDocument`] subscription.
pub struct MemorySubscription {
    doc: Weak<RefCell<DocumentInner>>,
    id: u64,
    alive: Rc<Cell<bool>>,
}

impl fmt::Debug for MemorySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySubscription")
            .field("id", &self.id)
            .field("alive", &self.alive.get())
            .finish()
    }
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        self.alive.set(false);
        if let Some(doc) = self.doc.upgrade()
            && let Ok(mut inner) = doc.try_borrow_mut()
        {
            let id = self.id;
            inner.listeners.retain(|entry| entry.id != id);
        }
    }
}

impl Surface for MemoryDocument {
    type Node = NodeId;
    type Subscription = MemorySubscription;

    fn query(&self, selector: &str) -> Option<NodeId> {
        let root = self.root();
        self.query_within(&root, selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.query_all_within(scope, selector).into_iter().next()
    }

    fn query_all_within(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = parse_selector(selector) else {
            return Vec::new();
        };
        let inner = self.inner.borrow();
        let mut candidates = inner.descendants(*scope);
        candidates.retain(|&id| inner.matches(id, &selector));
        candidates
    }

    fn closest_ancestor(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let selector = parse_selector(selector)?;
        let inner = self.inner.borrow();
        inner
            .node(*node)?
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| selector.matches(element))
            .map(|element| NodeId(element.id()))
    }

    fn set_inner_html(&self, node: &NodeId, markup: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.is_container(*node) {
            return;
        }
        inner.clear_children(*node);
        inner.graft(*node, markup);
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return None;
        }
        let element = Element::new(element_name(&tag.to_ascii_lowercase()), Vec::new());
        Some(NodeId(
            self.inner.borrow_mut().tree.orphan(Node::Element(element)).id(),
        ))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.inner.borrow_mut().append(*parent, *child);
    }

    fn remove(&self, node: &NodeId) {
        let mut inner = self.inner.borrow_mut();
        if *node != inner.root() {
            inner.detach(*node);
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .element(*node)?
            .attr(name)
            .map(str::to_owned)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        self.inner
            .borrow_mut()
            .update_attributes(*node, |attributes| {
                match attributes.iter_mut().find(|(k, _)| *k == name) {
                    Some((_, existing)) => value.clone_into(existing),
                    None => attributes.push((name, value.to_owned())),
                }
            });
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) {
        self.inner
            .borrow_mut()
            .update_attributes(*node, |attributes| {
                attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            });
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .element(*node)
            .is_some_and(|e| e.value().has_class(class, CaseSensitivity::CaseSensitive))
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        self.inner.borrow_mut().update_classes(*node, |classes| {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_owned());
            }
        });
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.inner
            .borrow_mut()
            .update_classes(*node, |classes| classes.retain(|c| c != class));
    }

    fn set_visible(&self, node: &NodeId, visible: bool) {
        let mut inner = self.inner.borrow_mut();
        if visible {
            inner.hidden.remove(node);
        } else if inner.node(*node).is_some() {
            inner.hidden.insert(*node);
        }
    }

    fn value(&self, node: &NodeId) -> String {
        let inner = self.inner.borrow();
        inner
            .controls
            .get(node)
            .and_then(|c| c.value.clone())
            .or_else(|| inner.element(*node)?.attr("value").map(str::to_owned))
            .unwrap_or_default()
    }

    fn set_value(&self, node: &NodeId, value: &str) {
        if let Some(control) = self.inner.borrow_mut().control(*node) {
            control.value = Some(value.to_owned());
        }
    }

    fn checked(&self, node: &NodeId) -> bool {
        let inner = self.inner.borrow();
        inner
            .controls
            .get(node)
            .and_then(|c| c.checked)
            .unwrap_or_else(|| {
                inner
                    .element(*node)
                    .is_some_and(|e| e.attr("checked").is_some())
            })
    }

    fn set_checked(&self, node: &NodeId, checked: bool) {
        if let Some(control) = self.inner.borrow_mut().control(*node) {
            control.checked = Some(checked);
        }
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.is_element(*node) {
            return;
        }
        inner.clear_children(*node);
        if !text.is_empty() {
            let child = inner
                .tree
                .orphan(Node::Text(Text {
                    text: StrTendril::from_slice(text),
                }))
                .id();
            inner.append(*node, NodeId(child));
        }
    }

    /// Blur the previous element, then focus `node`.
    ///
    /// Blur handlers run before focus moves. If one of them detaches `node`
    /// or focuses another element, `node` does not receive focus.
    fn focus(&self, node: &NodeId) {
        let previous = {
            let inner = self.inner.borrow();
            if inner.focused == Some(*node) || !inner.is_focusable(*node) {
                return;
            }
            inner.focused
        };
        if let Some(previous) = previous {
            self.blur(&previous);
        }
        {
            let mut inner = self.inner.borrow_mut();
            if inner.focused.is_some() || !inner.is_focusable(*node) {
                tracing::debug!(message = "surface.focus.dropped", node = %node);
                return;
            }
            inner.focused = Some(*node);
        }
        self.dispatch(*node, EventKind::Focus, None);
    }

    fn blur(&self, node: &NodeId) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.focused != Some(*node) {
                return;
            }
            inner.focused = None;
        }
        self.dispatch(*node, EventKind::Blur, None);
    }

    fn listen(
        &self,
        node: &NodeId,
        kind: EventKind,
        handler: Handler<NodeId>,
    ) -> MemorySubscription {
        self.subscribe(*node, kind, None, handler)
    }

    fn delegate(
        &self,
        container: &NodeId,
        selector: &str,
        kind: EventKind,
        handler: Handler<NodeId>,
    ) -> MemorySubscription {
        // An unparseable selector matches nothing; the guard is still real.
        let parsed = parse_selector(selector);
        let subscription = self.subscribe(*container, kind, parsed.clone(), handler);
        if parsed.is_none() {
            subscription.alive.set(false);
        }
        subscription
    }
}
