//! Thin helpers over web_sys for querying and wiring server-rendered markup.

use crate::error::{ThemeError, ThemeResult};
use leptos::prelude::document;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, EventTarget, HtmlElement, NodeList};

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn query(selector: &str) -> Option<Element> {
    document().query_selector(selector).ok().flatten()
}

pub(crate) fn query_all(selector: &str) -> Vec<Element> {
    document()
        .query_selector_all(selector)
        .map(elements)
        .unwrap_or_default()
}

pub(crate) fn query_in(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub(crate) fn query_all_in(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(elements)
        .unwrap_or_default()
}

/// Attaches `handler` for the lifetime of the page.
pub(crate) fn listen<E, F>(target: &EventTarget, event: &str, mut handler: F) -> ThemeResult<()>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    });
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Focuses `el` when it is focusable at all.
pub(crate) fn focus(el: &Element) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        let _ = el.focus();
    }
}

pub(crate) fn set_display(el: &Element, value: &str) {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        let _ = el.style().set_property("display", value);
    }
}

pub(crate) fn set_aria_expanded(el: &Element, expanded: bool) -> ThemeResult<()> {
    el.set_attribute("aria-expanded", if expanded { "true" } else { "false" })
        .map_err(ThemeError::from)
}

pub(crate) fn aria_expanded(el: &Element) -> bool {
    el.get_attribute("aria-expanded").as_deref() == Some("true")
}

/// Logs (instead of propagating) a failed widget setup.
pub(crate) fn report(feature: &str, result: ThemeResult<()>) {
    if let Err(e) = result {
        log::warn!("{feature}: setup failed: {e}");
    }
}
