#![forbid(unsafe_code)]

//! String-typed front door of a [`View`].
//!
//! JavaScript hosts cannot name Rust enums, so commands arrive as JSON and
//! event kinds as names. [`Bridge`] decodes both, forwards to the typed
//! view, and hands semantic events back as JSON envelopes. It is generic
//! over the surface so the same code path runs natively against
//! [`MemoryDocument`](todoview::MemoryDocument).

use thiserror::Error;
use todoview::{AppEvent, AppEventKind, Command, Surface, Template, View, ViewConfig, ViewError};

/// Errors raised at the JavaScript boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Unknown command or event name, or a malformed command payload.
    #[error(transparent)]
    View(#[from] ViewError),

    #[error("invalid view configuration: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    #[error("no document is available to mount on")]
    NoDocument,
}

/// Decode a JSON view configuration; absent keys keep their defaults.
pub fn parse_config(json: &str) -> Result<ViewConfig, BridgeError> {
    serde_json::from_str(json).map_err(BridgeError::InvalidConfig)
}

/// JSON adapter around a [`View`].
pub struct Bridge<S: Surface, T> {
    view: View<S, T>,
}

impl<S: Surface, T: Template + 'static> Bridge<S, T> {
    pub fn new(view: View<S, T>) -> Self {
        Self { view }
    }

    #[must_use]
    pub fn view(&self) -> &View<S, T> {
        &self.view
    }

    /// Decode `{"command": ..., "parameter": ...}` and render it.
    pub fn render_json(&self, json: &str) -> Result<(), BridgeError> {
        let command = Command::from_json(json)?;
        self.view.render(command);
        Ok(())
    }

    /// Bind the event called `name`; `deliver` receives each occurrence as
    /// `{"event": ..., "payload": ...}`.
    pub fn bind_named(
        &self,
        name: &str,
        mut deliver: impl FnMut(String) + 'static,
    ) -> Result<AppEventKind, BridgeError> {
        let kind: AppEventKind = name.parse()?;
        self.view
            .bind(kind, move |event: AppEvent| deliver(event.to_json()));
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use pretty_assertions::assert_eq;
    use todoview::{MarkupTemplate, MemoryDocument};

    fn bridge() -> (MemoryDocument, Bridge<MemoryDocument, MarkupTemplate>) {
        let doc = MemoryDocument::from_markup(
            "<input class=\"new-todo\"><ul class=\"todo-list\"></ul>\
             <span class=\"todo-count\"></span>",
        );
        let bridge = Bridge::new(View::new(doc.clone(), MarkupTemplate::new()));
        (doc, bridge)
    }

    #[test]
    fn renders_json_commands() {
        let (doc, bridge) = bridge();
        bridge
            .render_json(
                r#"{"command": "showEntries", "parameter": [{"id": 1, "title": "a"}, {"id": 2, "title": "b", "completed": true}]}"#,
            )
            .unwrap();
        bridge
            .render_json(r#"{"command": "updateElementCount", "parameter": 1}"#)
            .unwrap();

        assert_eq!(doc.query_all_within(&doc.root(), "li").len(), 2);
        let counter = doc.query(".todo-count").unwrap();
        assert_eq!(doc.inner_html(counter), "<strong>1</strong> item left");
    }

    #[test]
    fn unknown_command_is_an_error() {
        let (_, bridge) = bridge();
        let err = bridge
            .render_json(r#"{"command": "launch", "parameter": {}}"#)
            .unwrap_err();
        assert!(matches!(err, BridgeError::View(ViewError::InvalidCommand(_))));
    }

    #[test]
    fn malformed_parameter_is_an_error() {
        let (_, bridge) = bridge();
        let err = bridge
            .render_json(r#"{"command": "removeItem", "parameter": "seven"}"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid command"));
    }

    #[test]
    fn events_arrive_as_json_envelopes() {
        let (doc, bridge) = bridge();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let kind = bridge
            .bind_named("newTodo", move |json| sink.borrow_mut().push(json))
            .unwrap();
        assert_eq!(kind, AppEventKind::NewTodo);
        assert!(bridge.view().is_bound(AppEventKind::NewTodo));

        let input = doc.query(".new-todo").unwrap();
        doc.type_text(input, "milk");
        doc.change(input);
        assert_eq!(
            *seen.borrow(),
            vec![r#"{"event":"newTodo","payload":"milk"}"#.to_owned()]
        );
    }

    #[test]
    fn unknown_event_name_is_an_error() {
        let (_, bridge) = bridge();
        let err = bridge.bind_named("itemExplode", |_| {}).unwrap_err();
        assert_eq!(err.to_string(), "unknown event name: itemExplode");
    }

    #[test]
    fn config_keeps_defaults_for_absent_keys() {
        let config = parse_config(r#"{"itemSelector": "li.todo"}"#).unwrap();
        assert_eq!(config.item_selector, "li.todo");
        assert_eq!(config.anchors.todo_list, ".todo-list");
        assert!(matches!(
            parse_config("[1, 2]"),
            Err(BridgeError::InvalidConfig(_))
        ));
    }
}
