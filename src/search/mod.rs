use crate::config::ThemeConfig;
use crate::dom::{self, listen};
use crate::error::ThemeResult;
use crate::util::html_escape;
use leptos::prelude::{document, set_timeout_with_handle, TimeoutHandle};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, KeyboardEvent, MouseEvent};

pub(crate) const SEARCH_FORM_SELECTOR: &str = "form[role='search']";
pub(crate) const FILLED_CLASS: &str = "search-has-value";

/// Keys that clear the field, on both the input and the clear button.
pub(crate) fn is_clear_key(key: &str) -> bool {
    matches!(key, "Delete" | "Escape")
}

pub(crate) fn clear_icon(label: &str) -> String {
    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='12' height='12' focusable='false' role='img' viewBox='0 0 12 12' aria-label='{}'><path stroke='currentColor' stroke-linecap='round' stroke-width='2' d='M3 9l6-6m0 6L3 3'/></svg>",
        html_escape(label)
    )
}

/// Trailing-edge debounce on the page's timer queue.
#[derive(Clone)]
pub(crate) struct Debouncer {
    delay: Duration,
    pending: Rc<Cell<Option<TimeoutHandle>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn call(&self, f: impl FnOnce() + 'static) {
        if let Some(handle) = self.pending.take() {
            handle.clear();
        }
        let pending = self.pending.clone();
        match set_timeout_with_handle(
            move || {
                pending.set(None);
                f();
            },
            self.delay,
        ) {
            Ok(handle) => self.pending.set(Some(handle)),
            Err(e) => log::warn!("debounce timer failed: {e:?}"),
        }
    }
}

fn set_filled(form: &Element, filled: bool) {
    let _ = form.class_list().toggle_with_force(FILLED_CLASS, filled);
}

fn clear(form: &Element, input: &HtmlInputElement) {
    set_filled(form, false);
    input.set_value("");
    let _ = input.focus();
}

fn build_clear_button(input: &HtmlInputElement, label: &str) -> ThemeResult<Element> {
    let button = document().create_element("button")?;
    button.set_attribute("type", "button")?;
    button.set_attribute("aria-controls", &input.id())?;
    button.class_list().add_1("clear-button")?;
    button.set_inner_html(&clear_icon(label));
    Ok(button)
}

fn install_form(form: Element, input: HtmlInputElement, cfg: &ThemeConfig) -> ThemeResult<()> {
    let button = build_clear_button(&input, &cfg.search_clear_label)?;

    let (f, i) = (form.clone(), input.clone());
    listen(&button, "click", move |_: MouseEvent| clear(&f, &i))?;

    let (f, i) = (form.clone(), input.clone());
    listen(&button, "keyup", move |ev: KeyboardEvent| {
        if is_clear_key(&ev.key()) {
            clear(&f, &i);
        }
    })?;

    form.append_with_node_1(&button)?;
    if !input.value().is_empty() {
        set_filled(&form, true);
    }

    let debounce = Debouncer::new(Duration::from_millis(cfg.search_debounce_ms));
    let i = input.clone();
    listen(&input, "keyup", move |ev: KeyboardEvent| {
        if is_clear_key(&ev.key()) {
            clear(&form, &i);
        }
        let (f, i) = (form.clone(), i.clone());
        debounce.call(move || set_filled(&f, !i.value().is_empty()));
    })
}

pub(crate) fn install(cfg: &ThemeConfig) {
    for form in dom::query_all(SEARCH_FORM_SELECTOR) {
        let Some(input) = dom::query_in(&form, "input[type='search']")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };
        dom::report("search clear button", install_form(form, input, cfg));
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_clear_button_is_appended_and_clears() {
        let doc = document();
        let form = doc.create_element("form").expect("form");
        form.set_attribute("role", "search").expect("role");
        form.set_inner_html(r#"<input type="search" id="query" value="printer">"#);
        doc.body().expect("body").append_child(&form).expect("append");

        let input = dom::query_in(&form, "input")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .expect("input");
        install_form(form.clone(), input.clone(), &ThemeConfig::default()).expect("install");

        assert!(form.class_list().contains(FILLED_CLASS));
        let button = dom::query_in(&form, "button.clear-button")
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
            .expect("clear button");
        assert_eq!(button.get_attribute("aria-controls").as_deref(), Some("query"));

        button.click();
        assert_eq!(input.value(), "");
        assert!(!form.class_list().contains(FILLED_CLASS));
        form.remove();
    }

    #[wasm_bindgen_test]
    async fn test_filled_class_waits_for_typing_pause() {
        let doc = document();
        let form = doc.create_element("form").expect("form");
        form.set_attribute("role", "search").expect("role");
        form.set_inner_html(r#"<input type="search" id="query-debounce">"#);
        doc.body().expect("body").append_child(&form).expect("append");

        let input = dom::query_in(&form, "input")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .expect("input");
        install_form(form.clone(), input.clone(), &ThemeConfig::default()).expect("install");
        assert!(!form.class_list().contains(FILLED_CLASS));

        let keyup = || {
            let ev = KeyboardEvent::new("keyup").expect("keyup");
            input.dispatch_event(&ev).expect("dispatch");
        };

        input.set_value("p");
        keyup();
        crate::util::sleep_ms(100).await;
        input.set_value("pr");
        keyup();

        // 250ms after the first keyup, but only 150ms after the second.
        crate::util::sleep_ms(150).await;
        assert!(!form.class_list().contains(FILLED_CLASS));

        crate::util::sleep_ms(120).await;
        assert!(form.class_list().contains(FILLED_CLASS));
        form.remove();
    }
}
