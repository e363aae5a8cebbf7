//! Browser interface for the registration page, compiled to WASM.
//!
//! Load the generated module on the registration page; it wires the "show
//! passwords" checkbox and the form once the document is ready.

/// Sending logs to the browser console
mod console;

/// Build-time and runtime configuration
pub mod config;

/// The elements the page relies on
pub mod dom;

/// Gluing `Page` to the DOM, fetch, and timers
mod shell;

#[expect(clippy::missing_docs_in_private_items)]
mod utils;

use config::BrowserConfig;
use dom::Dom;
use shell::Shell;
use signup_core::api;
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{Document, Window};

/// Entry point. Sets up logging, then wires the page as soon as the document
/// has loaded.
///
/// ## Errors
///
/// Fails if there's no window or document to attach to.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    utils::set_panic_hook();
    console::init();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let ready_window = window.clone();
        let ready_document = document.clone();
        let on_ready = Closure::once(move || {
            if let Err(err) = wire(ready_window, &ready_document) {
                tracing::error!(?err, "could not set up the registration page");
            }
        });

        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
        )?;
        on_ready.forget();

        Ok(())
    } else {
        wire(window, &document)
    }
}

/// Look up the page's elements and start listening to them.
fn wire(window: Window, document: &Document) -> Result<(), JsValue> {
    let config = BrowserConfig::load();
    let origin = window.location().origin()?;

    let client = api::Client::new(config.server(&origin));
    let login_url = config.login_url(&origin);

    tracing::debug!(server = %client.server, %login_url, "wiring registration page");

    let dom = Dom::query(document)?;
    let shell = Shell::new(window, dom, client, login_url);

    shell.wire()
}
