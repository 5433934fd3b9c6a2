#![forbid(unsafe_code)]

//! The view: command dispatcher plus semantic event binder.
//!
//! A [`View`] owns a surface handle, the injected [`Template`], and the
//! anchors resolved at construction. [`View::render`] performs one named UI
//! mutation; [`View::bind`] attaches a handler for one semantic event kind.
//!
//! Item-level events are delegated: one subscription on the list container
//! covers every item node, including nodes rendered after the call.
//!
//! # Re-entrancy
//!
//! Both entry points take `&self`. A handler may call `render` (and even
//! `bind`) while the surface is still dispatching the raw event that
//! triggered it. A handler that re-enters itself is skipped with a warning.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use todoview_surface::{EventKind, Handler, Surface, SurfaceEvent};
use todoview_template::{ItemId, Template};

use crate::anchors::Anchors;
use crate::command::{Command, Filter};
use crate::config::ViewConfig;
use crate::edit::{self, ENTER_KEY, ESCAPE_KEY, EditPhase};
use crate::event::{AppEvent, AppEventKind};

type AppHandler = Rc<RefCell<dyn FnMut(AppEvent)>>;

/// Command dispatcher and event binder over a [`Surface`].
pub struct View<S: Surface, T> {
    surface: S,
    template: T,
    config: ViewConfig,
    anchors: Anchors<S::Node>,
    bindings: RefCell<HashMap<AppEventKind, Vec<S::Subscription>>>,
}

impl<S: Surface, T: Template> View<S, T> {
    /// Create a view over `surface` with the default configuration.
    pub fn new(surface: S, template: T) -> Self {
        Self::with_config(surface, template, ViewConfig::default())
    }

    /// Create a view over `surface`, resolving anchors from `config`.
    pub fn with_config(surface: S, template: T, config: ViewConfig) -> Self {
        let anchors = Anchors::resolve(&surface, &config.anchors);
        Self {
            surface,
            template,
            config,
            anchors,
            bindings: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn template(&self) -> &T {
        &self.template
    }

    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub fn anchors(&self) -> &Anchors<S::Node> {
        &self.anchors
    }

    /// Perform one UI mutation. Missing targets make the command a no-op.
    pub fn render(&self, command: Command) {
        tracing::debug!(message = "view.render", command = command.name());
        match command {
            Command::ShowEntries(items) => {
                if let Some(list) = self.anchor(&self.anchors.todo_list, "todo_list") {
                    self.surface.set_inner_html(list, &self.template.show(&items));
                }
            }
            Command::RemoveItem(id) => {
                if let Some(item) = self.item(id) {
                    self.surface.remove(&item);
                }
            }
            Command::UpdateElementCount(active) => {
                if let Some(counter) = self.anchor(&self.anchors.todo_count, "todo_count") {
                    self.surface
                        .set_inner_html(counter, &self.template.item_counter(active));
                }
            }
            Command::ClearCompletedButton {
                completed_count,
                visible,
            } => {
                if let Some(button) =
                    self.anchor(&self.anchors.clear_completed, "clear_completed")
                {
                    self.surface.set_inner_html(
                        button,
                        &self.template.clear_completed_button(completed_count),
                    );
                    self.surface.set_visible(button, visible);
                }
            }
            Command::ContentBlockVisibility { visible } => {
                if let Some(main) = self.anchor(&self.anchors.main, "main") {
                    self.surface.set_visible(main, visible);
                }
                if let Some(footer) = self.anchor(&self.anchors.footer, "footer") {
                    self.surface.set_visible(footer, visible);
                }
            }
            Command::ToggleAll { checked } => {
                if let Some(toggle) = self.anchor(&self.anchors.toggle_all, "toggle_all") {
                    self.surface.set_checked(toggle, checked);
                }
            }
            Command::SetFilter(filter) => self.set_filter(filter),
            Command::ClearNewTodo => {
                if let Some(input) = self.anchor(&self.anchors.new_todo, "new_todo") {
                    self.surface.set_value(input, "");
                }
            }
            Command::ElementComplete { id, completed } => {
                let Some(item) = self.item(id) else {
                    return;
                };
                if completed {
                    self.surface.add_class(&item, &self.config.completed_class);
                } else {
                    self.surface.remove_class(&item, &self.config.completed_class);
                }
                if let Some(toggle) = self.surface.query_within(&item, ".toggle") {
                    self.surface.set_checked(&toggle, completed);
                }
            }
            Command::EditItem { id, title } => {
                if let Some(item) = self.item(id) {
                    edit::enter(&self.surface, &item, &title, &self.config.editing_class);
                }
            }
            Command::EditItemDone { id, title } => {
                if let Some(item) = self.item(id) {
                    edit::commit(&self.surface, &item, &title, &self.config.editing_class);
                }
            }
        }
    }

    /// Edit phase of the item rendered for `id`, or `None` if no such item.
    #[must_use]
    pub fn edit_phase(&self, id: ItemId) -> Option<EditPhase> {
        self.item(id)
            .map(|item| edit::phase(&self.surface, &item, &self.config.editing_class))
    }

    /// Attach `handler` to `kind`, replacing any handler bound before.
    pub fn bind(&self, kind: AppEventKind, handler: impl FnMut(AppEvent) + 'static) {
        let previous = self.bindings.borrow_mut().remove(&kind);
        drop(previous);

        let handler: AppHandler = Rc::new(RefCell::new(handler));
        let subscriptions = match kind {
            AppEventKind::NewTodo => self.bind_new_todo(handler),
            AppEventKind::RemoveCompleted => self.bind_remove_completed(handler),
            AppEventKind::ToggleAll => self.bind_toggle_all(handler),
            AppEventKind::ItemEdit => self.bind_item_edit(handler),
            AppEventKind::ItemRemove => self.bind_item_remove(handler),
            AppEventKind::ItemToggle => self.bind_item_toggle(handler),
            AppEventKind::ItemEditDone => self.bind_item_edit_done(handler),
            AppEventKind::ItemEditCancel => self.bind_item_edit_cancel(handler),
        };
        tracing::debug!(
            message = "view.bind",
            event = kind.name(),
            subscriptions = subscriptions.len()
        );
        if !subscriptions.is_empty() {
            self.bindings.borrow_mut().insert(kind, subscriptions);
        }
    }

    /// Detach the handler bound to `kind`. Returns whether one was bound.
    pub fn unbind(&self, kind: AppEventKind) -> bool {
        let previous = self.bindings.borrow_mut().remove(&kind);
        previous.is_some()
    }

    /// Whether a handler is currently attached for `kind`.
    #[must_use]
    pub fn is_bound(&self, kind: AppEventKind) -> bool {
        self.bindings.borrow().contains_key(&kind)
    }

    fn anchor<'a>(&self, anchor: &'a Option<S::Node>, name: &'static str) -> Option<&'a S::Node> {
        if anchor.is_none() {
            tracing::trace!(message = "view.render.skipped", anchor = name);
        }
        anchor.as_ref()
    }

    fn item(&self, id: ItemId) -> Option<S::Node> {
        let list = self.anchor(&self.anchors.todo_list, "todo_list")?;
        let selector = format!("{}[data-id=\"{id}\"]", self.config.item_selector);
        let item = self.surface.query_within(list, &selector);
        if item.is_none() {
            tracing::trace!(message = "view.render.skipped", item = %id);
        }
        item
    }

    fn set_filter(&self, filter: Filter) {
        let Some(filters) = self.surface.query(&self.config.filters_selector) else {
            tracing::trace!(message = "view.render.skipped", anchor = "filters");
            return;
        };
        let selected = &self.config.selected_class;
        for link in self.surface.query_all_within(&filters, &format!(".{selected}")) {
            self.surface.remove_class(&link, selected);
        }
        let link = format!("[href=\"{}\"]", filter.href());
        if let Some(link) = self.surface.query_within(&filters, &link) {
            self.surface.add_class(&link, selected);
        }
    }

    fn skip_binding(kind: AppEventKind, anchor: &'static str) -> Vec<S::Subscription> {
        tracing::debug!(message = "view.bind.skipped", event = kind.name(), anchor);
        Vec::new()
    }

    fn bind_new_todo(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let Some(input) = &self.anchors.new_todo else {
            return Self::skip_binding(AppEventKind::NewTodo, "new_todo");
        };
        let surface = self.surface.clone();
        let on_change: Handler<S::Node> = Box::new(move |event: &SurfaceEvent<S::Node>| {
            emit(&handler, AppEvent::NewTodo(surface.value(&event.current)));
        });
        vec![self.surface.listen(input, EventKind::Change, on_change)]
    }

    fn bind_remove_completed(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let Some(button) = &self.anchors.clear_completed else {
            return Self::skip_binding(AppEventKind::RemoveCompleted, "clear_completed");
        };
        let on_click: Handler<S::Node> = Box::new(move |_: &SurfaceEvent<S::Node>| {
            emit(&handler, AppEvent::RemoveCompleted);
        });
        vec![self.surface.listen(button, EventKind::Click, on_click)]
    }

    fn bind_toggle_all(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let Some(toggle) = &self.anchors.toggle_all else {
            return Self::skip_binding(AppEventKind::ToggleAll, "toggle_all");
        };
        let surface = self.surface.clone();
        let on_click: Handler<S::Node> = Box::new(move |event: &SurfaceEvent<S::Node>| {
            let completed = surface.checked(&event.current);
            emit(&handler, AppEvent::ToggleAll { completed });
        });
        vec![self.surface.listen(toggle, EventKind::Click, on_click)]
    }

    fn bind_item_edit(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let ids = self.item_ids();
        self.delegate_to_list(
            AppEventKind::ItemEdit,
            &self.config.label_selector(),
            EventKind::DoubleClick,
            move |event| {
                if let Some(id) = ids.extract(&event.current) {
                    emit(&handler, AppEvent::ItemEdit { id });
                }
            },
        )
    }

    fn bind_item_remove(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let ids = self.item_ids();
        self.delegate_to_list(
            AppEventKind::ItemRemove,
            ".destroy",
            EventKind::Click,
            move |event| {
                if let Some(id) = ids.extract(&event.current) {
                    emit(&handler, AppEvent::ItemRemove { id });
                }
            },
        )
    }

    fn bind_item_toggle(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let ids = self.item_ids();
        let surface = self.surface.clone();
        self.delegate_to_list(
            AppEventKind::ItemToggle,
            ".toggle",
            EventKind::Click,
            move |event| {
                if let Some(id) = ids.extract(&event.current) {
                    let completed = surface.checked(&event.current);
                    emit(&handler, AppEvent::ItemToggle { id, completed });
                }
            },
        )
    }

    fn bind_item_edit_done(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let field = self.config.edit_field_selector();

        let ids = self.item_ids();
        let surface = self.surface.clone();
        let mut subscriptions = self.delegate_to_list(
            AppEventKind::ItemEditDone,
            &field,
            EventKind::Blur,
            move |event| {
                if edit::is_cancelled(&surface, &event.current) {
                    tracing::trace!(message = "view.edit.suppressed");
                    return;
                }
                if let Some(id) = ids.extract(&event.current) {
                    let title = surface.value(&event.current);
                    emit(&handler, AppEvent::ItemEditDone { id, title });
                }
            },
        );

        let surface = self.surface.clone();
        subscriptions.extend(self.delegate_to_list(
            AppEventKind::ItemEditDone,
            &field,
            EventKind::KeyPress,
            move |event| {
                if event.key_code == Some(ENTER_KEY) {
                    surface.blur(&event.current);
                }
            },
        ));
        subscriptions
    }

    fn bind_item_edit_cancel(&self, handler: AppHandler) -> Vec<S::Subscription> {
        let ids = self.item_ids();
        let surface = self.surface.clone();
        self.delegate_to_list(
            AppEventKind::ItemEditCancel,
            &self.config.edit_field_selector(),
            EventKind::KeyUp,
            move |event| {
                if event.key_code != Some(ESCAPE_KEY) {
                    return;
                }
                let id = ids.extract(&event.current);
                edit::cancel(&surface, &event.current);
                if let Some(id) = id {
                    emit(&handler, AppEvent::ItemEditCancel { id });
                }
            },
        )
    }

    fn delegate_to_list(
        &self,
        kind: AppEventKind,
        selector: &str,
        raw: EventKind,
        on_event: impl FnMut(&SurfaceEvent<S::Node>) + 'static,
    ) -> Vec<S::Subscription> {
        let Some(list) = &self.anchors.todo_list else {
            return Self::skip_binding(kind, "todo_list");
        };
        let on_event: Handler<S::Node> = Box::new(on_event);
        vec![self.surface.delegate(list, selector, raw, on_event)]
    }

    fn item_ids(&self) -> ItemIds<S> {
        ItemIds {
            surface: self.surface.clone(),
            item_selector: self.config.item_selector.clone(),
        }
    }
}

impl<S: Surface, T> fmt::Debug for View<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<&'static str> =
            self.bindings.borrow().keys().map(|kind| kind.name()).collect();
        bound.sort_unstable();
        f.debug_struct("View")
            .field("config", &self.config)
            .field("missing_anchors", &self.anchors.missing())
            .field("bound", &bound)
            .finish_non_exhaustive()
    }
}

/// Maps an element inside an item node to the item's identifier.
struct ItemIds<S> {
    surface: S,
    item_selector: String,
}

impl<S: Surface> ItemIds<S> {
    /// Walk strictly up from `node` to the nearest item and parse its
    /// `data-id`.
    fn extract(&self, node: &S::Node) -> Option<ItemId> {
        let raw = self
            .surface
            .closest_ancestor(node, &self.item_selector)
            .and_then(|item| self.surface.attribute(&item, "data-id"));
        let id = raw.as_deref().and_then(|raw| raw.parse::<ItemId>().ok());
        if id.is_none() {
            tracing::warn!(message = "view.item_id.missing", data_id = ?raw, node = ?node);
        }
        id
    }
}

fn emit(handler: &AppHandler, event: AppEvent) {
    match handler.try_borrow_mut() {
        Ok(mut handler) => (&mut *handler)(event),
        Err(_) => {
            tracing::warn!(message = "view.handler.reentrant", event = event.kind().name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoview_surface::MemoryDocument;
    use todoview_template::{Item, MarkupTemplate};

    const PAGE: &str = "<input class=\"new-todo\">\
        <section class=\"main\"><input class=\"toggle-all\" type=\"checkbox\">\
        <ul class=\"todo-list\"></ul></section>\
        <footer class=\"footer\"><span class=\"todo-count\"></span>\
        <button class=\"clear-completed\"></button></footer>";

    fn view() -> View<MemoryDocument, MarkupTemplate> {
        let doc = MemoryDocument::from_markup(PAGE);
        View::new(doc, MarkupTemplate::new())
    }

    fn recorder() -> (Rc<RefCell<Vec<AppEvent>>>, impl FnMut(AppEvent) + 'static) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        (events, move |event: AppEvent| sink.borrow_mut().push(event))
    }

    #[test]
    fn item_lookup_is_scoped_to_the_list() {
        let view = view();
        view.render(Command::ShowEntries(vec![Item::new(4, "a")]));
        assert!(view.item(ItemId(4)).is_some());
        assert!(view.item(ItemId(5)).is_none());
    }

    #[test]
    fn rebinding_detaches_previous_subscriptions() {
        let view = view();
        let before = view.surface().listener_count();
        let (_, first) = recorder();
        view.bind(AppEventKind::ItemEditDone, first);
        assert_eq!(view.surface().listener_count(), before + 2);
        let (_, second) = recorder();
        view.bind(AppEventKind::ItemEditDone, second);
        assert_eq!(view.surface().listener_count(), before + 2);
        assert!(view.unbind(AppEventKind::ItemEditDone));
        assert_eq!(view.surface().listener_count(), before);
        assert!(!view.is_bound(AppEventKind::ItemEditDone));
    }

    #[test]
    fn item_id_requires_a_parsable_ancestor() {
        let doc = MemoryDocument::from_markup(
            "<ul><li data-id=\"x\"><label>a</label></li><li data-id=\" 7 \"><label>b</label></li></ul>",
        );
        let ids = ItemIds {
            surface: doc.clone(),
            item_selector: "li".to_owned(),
        };
        let labels = doc.query_all_within(&doc.root(), "label");
        assert_eq!(ids.extract(&labels[0]), None);
        assert_eq!(ids.extract(&labels[1]), Some(ItemId(7)));
        let item = doc.query("li").unwrap();
        assert_eq!(ids.extract(&item), None, "the item itself is not its own ancestor");
    }

    #[test]
    fn debug_lists_bound_kinds() {
        let view = view();
        let (_, handler) = recorder();
        view.bind(AppEventKind::NewTodo, handler);
        let rendered = format!("{view:?}");
        assert!(rendered.contains("newTodo"));
        assert!(rendered.contains("missing_anchors: []"));
    }
}
