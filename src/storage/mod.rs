//! Focus restoration across full-page form submissions.

use crate::dom;
use leptos::prelude::document;
use web_sys::Storage;

pub(crate) const RETURN_FOCUS_KEY: &str = "returnFocusTo";

fn session_storage() -> Option<Storage> {
    web_sys::window().and_then(|w| w.session_storage().ok().flatten())
}

/// `#id` selector for an element id; `None` when there is nothing to target.
pub(crate) fn focus_selector(id: Option<&str>) -> Option<String> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| format!("#{id}"))
}

/// Remembers the focused element so the next page load can focus it again.
pub(crate) fn save_focus() {
    let id = document().active_element().map(|el| el.id());
    let Some(selector) = focus_selector(id.as_deref()) else {
        return;
    };
    if let Some(storage) = session_storage() {
        let _ = storage.set_item(RETURN_FOCUS_KEY, &selector);
    }
}

/// Consumes the remembered selector, focusing its element if it still exists.
pub(crate) fn return_focus() {
    let Some(storage) = session_storage() else {
        return;
    };
    let Some(selector) = storage
        .get_item(RETURN_FOCUS_KEY)
        .ok()
        .flatten()
        .filter(|s| !s.is_empty())
    else {
        return;
    };

    let _ = storage.remove_item(RETURN_FOCUS_KEY);
    match document().query_selector(&selector) {
        Ok(Some(el)) => dom::focus(&el),
        Ok(None) => {}
        Err(_) => log::warn!("ignoring invalid {RETURN_FOCUS_KEY} selector {selector:?}"),
    }
}
