#![forbid(unsafe_code)]

//! `wasm-bindgen` export of the view.
//!
//! ```js
//! const view = new WebView();
//! view.bind("newTodo", (json) => controller.dispatch(JSON.parse(json)));
//! view.render(JSON.stringify({ command: "clearNewTodo" }));
//! ```

use js_sys::Function;
use todoview::{MarkupTemplate, View, ViewConfig};
use wasm_bindgen::prelude::*;

use crate::bridge::{self, Bridge, BridgeError};
use crate::dom::DomSurface;

fn to_js(error: BridgeError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

/// A view mounted on `window.document`, driven with JSON.
#[wasm_bindgen]
pub struct WebView {
    bridge: Bridge<DomSurface, MarkupTemplate>,
}

#[wasm_bindgen]
impl WebView {
    /// Mount with the default anchor selectors.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebView, JsValue> {
        Self::mount(ViewConfig::default()).map_err(to_js)
    }

    /// Mount with a JSON view configuration.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: &str) -> Result<WebView, JsValue> {
        bridge::parse_config(config)
            .and_then(Self::mount)
            .map_err(to_js)
    }

    /// Render `{"command": "<name>", "parameter": ...}`.
    pub fn render(&self, command: &str) -> Result<(), JsValue> {
        self.bridge.render_json(command).map_err(to_js)
    }

    /// Call `callback` with `{"event": "<name>", "payload": ...}` whenever
    /// the named event occurs. Binding a name again replaces the callback.
    pub fn bind(&self, event: &str, callback: Function) -> Result<(), JsValue> {
        self.bridge
            .bind_named(event, move |json| {
                if let Err(error) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    tracing::warn!(message = "web.callback.failed", error = ?error);
                }
            })
            .map(|_| ())
            .map_err(to_js)
    }
}

impl WebView {
    fn mount(config: ViewConfig) -> Result<Self, BridgeError> {
        let surface = DomSurface::from_window()?;
        let view = View::with_config(surface, MarkupTemplate::new(), config);
        Ok(Self {
            bridge: Bridge::new(view),
        })
    }
}
