#![forbid(unsafe_code)]

//! Browser backend for todoview.
//!
//! - [`Bridge`]: the JSON/string boundary over any [`View`](todoview::View).
//!   It is plain Rust and runs natively in tests.
//! - `DomSurface` (wasm32 only): [`Surface`](todoview::Surface) over the
//!   DOM via `web-sys`. Non-bubbling events are delegated in the capture
//!   phase.
//! - `WebView` (wasm32 only): the `wasm-bindgen` export used from
//!   JavaScript. Commands are JSON strings; events are bound by name and
//!   delivered to a JS callback as JSON envelopes.

pub mod bridge;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use bridge::{Bridge, BridgeError, parse_config};

#[cfg(target_arch = "wasm32")]
pub use dom::{DomListener, DomSurface};
#[cfg(target_arch = "wasm32")]
pub use wasm::WebView;
