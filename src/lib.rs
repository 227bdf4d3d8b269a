//! Client-side behavior for the help center theme, compiled to WebAssembly
//! and loaded by the theme's layout template.
//!
//! Every widget decorates server-rendered markup: it looks its elements up by
//! class/id, and quietly does nothing when they are not on the page.

mod api;
mod breadcrumb;
mod config;
mod dom;
mod dropdown;
mod emoji;
mod error;
mod forms;
mod models;
mod nav;
mod page;
mod search;
mod storage;
mod toc;
mod util;

pub use config::ThemeConfig;
pub use error::{ApiError, ApiErrorKind, ThemeError};

use crate::emoji::Stripper;
use leptos::prelude::document;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

fn on_ready(cfg: ThemeConfig) {
    storage::return_focus();
    nav::install();
    let n = dropdown::web::install();
    log::debug!("wired {n} dropdown(s)");
    search::install(&cfg);
    forms::install();

    emoji::clean_document(Stripper::Tile);
    emoji::clean_document(Stripper::Symbol);

    breadcrumb::install(&cfg);
    toc::install(&cfg);
}

/// Runs the widgets now, or at `DOMContentLoaded` while the page is still parsing.
pub fn start(cfg: ThemeConfig) {
    emoji::watch_insertions();

    let doc = document();
    if doc.ready_state() != "loading" {
        on_ready(cfg);
        return;
    }

    let mut cfg = Some(cfg);
    let result = dom::listen(&doc, "DOMContentLoaded", move |_: web_sys::Event| {
        if let Some(cfg) = cfg.take() {
            on_ready(cfg);
        }
    });
    if let Err(e) = result {
        log::error!("cannot wait for DOMContentLoaded: {e}");
    }
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let cfg = ThemeConfig::from_window();
    console_log::init_with_level(cfg.log_level()).ok();
    log::debug!("help center theme starting with {cfg:?}");

    start(cfg);
}
