#![forbid(unsafe_code)]

//! [`Surface`] over the browser DOM.

use todoview::{EventKind, Handler, Surface, SurfaceEvent};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent, Node,
};

use crate::bridge::BridgeError;

/// Handle to a live DOM document.
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Mount on `window.document`.
    pub fn from_window() -> Result<Self, BridgeError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or(BridgeError::NoDocument)
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn attach(
        target: &EventTarget,
        kind: EventKind,
        capture: bool,
        callback: impl FnMut(Event) + 'static,
    ) -> DomListener {
        let closure = Closure::<dyn FnMut(Event)>::new(callback);
        let _ = target.add_event_listener_with_callback_and_bool(
            kind.dom_name(),
            closure.as_ref().unchecked_ref(),
            capture,
        );
        DomListener {
            target: target.clone(),
            kind,
            capture,
            closure,
        }
    }
}

fn event_target(event: &Event) -> Option<Element> {
    event.target().and_then(|target| target.dyn_into::<Element>().ok())
}

fn key_code(event: &Event) -> Option<u32> {
    event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key_code)
}

fn selector_error(selector: &str) {
    tracing::warn!(message = "surface.selector.invalid", selector);
}

/// A DOM event listener; dropping it removes the listener.
pub struct DomListener {
    target: EventTarget,
    kind: EventKind,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for DomListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind.dom_name(),
            self.closure.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

impl Surface for DomSurface {
    type Node = Element;
    type Subscription = DomListener;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document
            .query_selector(selector)
            .inspect_err(|_| selector_error(selector))
            .ok()
            .flatten()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope
            .query_selector(selector)
            .inspect_err(|_| selector_error(selector))
            .ok()
            .flatten()
    }

    fn query_all_within(&self, scope: &Element, selector: &str) -> Vec<Element> {
        let Ok(list) = scope.query_selector_all(selector) else {
            selector_error(selector);
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn closest_ancestor(&self, node: &Element, selector: &str) -> Option<Element> {
        node.parent_element()?
            .closest(selector)
            .inspect_err(|_| selector_error(selector))
            .ok()
            .flatten()
    }

    fn set_inner_html(&self, node: &Element, markup: &str) {
        node.set_inner_html(markup);
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn set_visible(&self, node: &Element, visible: bool) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            let display = if visible { "block" } else { "none" };
            let _ = element.style().set_property("display", display);
        }
    }

    fn value(&self, node: &Element) -> String {
        node.dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn checked(&self, node: &Element) -> bool {
        node.dyn_ref::<HtmlInputElement>()
            .is_some_and(HtmlInputElement::checked)
    }

    fn set_checked(&self, node: &Element, checked: bool) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn focus(&self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            let _ = element.focus();
        }
    }

    fn blur(&self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            let _ = element.blur();
        }
    }

    fn listen(&self, node: &Element, kind: EventKind, mut handler: Handler<Element>) -> DomListener {
        let current = node.clone();
        Self::attach(node, kind, false, move |event: Event| {
            let target = event_target(&event).unwrap_or_else(|| current.clone());
            handler(&SurfaceEvent {
                kind,
                target,
                current: current.clone(),
                key_code: key_code(&event),
            });
        })
    }

    fn delegate(
        &self,
        container: &Element,
        selector: &str,
        kind: EventKind,
        mut handler: Handler<Element>,
    ) -> DomListener {
        let scope = container.clone();
        let selector = selector.to_owned();
        Self::attach(container, kind, !kind.bubbles(), move |event: Event| {
            let Some(target) = event_target(&event) else {
                return;
            };
            let node: &Node = target.as_ref();
            if target == scope || !scope.contains(Some(node)) {
                return;
            }
            match target.matches(&selector) {
                Ok(true) => handler(&SurfaceEvent {
                    kind,
                    target: target.clone(),
                    current: target,
                    key_code: key_code(&event),
                }),
                Ok(false) => {}
                Err(_) => selector_error(&selector),
            }
        })
    }
}
