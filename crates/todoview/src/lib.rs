#![forbid(unsafe_code)]

//! View layer for a list-management UI.
//!
//! The controller talks to the page through exactly two calls:
//!
//! - [`View::render`] performs a discrete, named UI mutation described by a
//!   [`Command`];
//! - [`View::bind`] subscribes a handler to a semantic [`AppEvent`] kind,
//!   hiding raw input details (key codes, delegation, focus loss).
//!
//! The view is generic over a [`Surface`] (the query and subscription
//! primitives) and a [`Template`] (the markup renderer), both injected at
//! construction.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use todoview::{AppEvent, AppEventKind, Command, Item, MarkupTemplate, MemoryDocument, View};
//!
//! let doc = MemoryDocument::from_markup(
//!     "<input class=\"new-todo\"><ul class=\"todo-list\"></ul>",
//! );
//! let view = View::new(doc.clone(), MarkupTemplate::new());
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! view.bind(AppEventKind::NewTodo, move |event| sink.borrow_mut().push(event));
//!
//! let input = view.anchors().new_todo.unwrap();
//! doc.type_text(input, "buy milk");
//! doc.change(input);
//! assert_eq!(*seen.borrow(), vec![AppEvent::NewTodo("buy milk".to_owned())]);
//!
//! view.render(Command::ShowEntries(vec![Item::new(1, "buy milk")]));
//! view.render(Command::ClearNewTodo);
//! ```

pub mod anchors;
pub mod command;
pub mod config;
pub mod edit;
pub mod error;
pub mod event;
pub mod view;

pub use anchors::Anchors;
pub use command::{Command, Filter};
pub use config::{AnchorSelectors, ViewConfig};
pub use edit::{CANCEL_FLAG, ENTER_KEY, ESCAPE_KEY, EditPhase};
pub use error::{Result, ViewError};
pub use event::{AppEvent, AppEventKind};
pub use view::View;

pub use todoview_surface::{EventKind, Handler, MemoryDocument, NodeId, Surface, SurfaceEvent};
pub use todoview_template::{Item, ItemId, MarkupTemplate, Template};
