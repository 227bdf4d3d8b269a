//! Request and comment form behavior.

use crate::dom::{self, listen};
use crate::error::{ThemeError, ThemeResult};
use crate::storage::save_focus;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{
    DomParser, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement, KeyboardEvent, MouseEvent, SupportedType,
};

const ENTER: &str = "Enter";

/// How a comment body is judged empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CommentFormat {
    Plaintext,
    /// Rich-text editor output; markup with no image and no text counts as empty.
    Html,
}

impl CommentFormat {
    pub fn of(textarea: &Element) -> Self {
        match textarea.get_attribute("data-helper").as_deref() {
            Some("wysiwyg") => CommentFormat::Html,
            _ => CommentFormat::Plaintext,
        }
    }

    pub fn is_empty(self, value: &str) -> bool {
        match self {
            CommentFormat::Plaintext => is_empty_plaintext(value),
            CommentFormat::Html => is_empty_html(value),
        }
    }
}

pub(crate) fn is_empty_plaintext(s: &str) -> bool {
    s.trim().is_empty()
}

fn is_empty_html(markup: &str) -> bool {
    let Ok(parser) = DomParser::new() else {
        return is_empty_plaintext(markup);
    };
    let Ok(doc) = parser.parse_from_string(&format!("<_>{markup}</_>"), SupportedType::TextXml)
    else {
        return is_empty_plaintext(markup);
    };

    let has_image = doc.query_selector("img").ok().flatten().is_some();
    let text = doc
        .children()
        .item(0)
        .and_then(|root| root.text_content())
        .unwrap_or_default();
    !has_image && is_empty_plaintext(&text)
}

/// Label for the mark-as-solved button given the comment's emptiness.
pub(crate) fn solve_label_attribute(comment_empty: bool) -> &'static str {
    if comment_empty {
        "data-solve-translation"
    } else {
        "data-solve-and-submit-translation"
    }
}

fn submit_form_of(el: &Element) -> ThemeResult<()> {
    let form = el
        .closest("form")?
        .and_then(|f| f.dyn_into::<HtmlFormElement>().ok())
        .ok_or(ThemeError::MissingElement("form"))?;
    form.submit()?;
    Ok(())
}

fn install_comment_expansion() -> ThemeResult<()> {
    let textarea = dom::query(".comment-container textarea")
        .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok());
    let controls = dom::query(".comment-form-controls, .comment-ccs");

    if let (Some(textarea), Some(controls)) = (&textarea, controls) {
        let shown = Rc::new(Cell::new(false));
        let c = controls.clone();
        listen(textarea, "focus", move |_: Event| {
            if !shown.replace(true) {
                dom::set_display(&c, "block");
            }
        })?;

        if !textarea.value().is_empty() {
            dom::set_display(&controls, "block");
        }
    }

    let trigger = dom::query(".request-container .comment-container .comment-show-container");
    if let Some(trigger) = trigger {
        let fields = dom::query_all(".request-container .comment-container .comment-fields");
        let submit = dom::query(".request-container .comment-container .request-submit-comment");
        let t = trigger.clone();
        let ta = textarea.clone();
        listen(&trigger, "click", move |_: MouseEvent| {
            dom::set_display(&t, "none");
            for field in &fields {
                dom::set_display(field, "block");
            }
            if let Some(submit) = &submit {
                dom::set_display(submit, "inline-block");
            }
            if let Some(ta) = &ta {
                let _ = ta.focus();
            }
        })?;
    }

    Ok(())
}

fn install_mark_as_solved() -> ThemeResult<()> {
    let button = dom::query(".request-container .mark-as-solved:not([data-disabled])")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let checkbox = dom::query(".request-container .comment-container input[type=checkbox]");
    let submit = dom::query(".request-container .comment-container input[type=submit]")
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());

    if let Some(button) = &button {
        let b = button.clone();
        listen(button, "click", move |_: MouseEvent| {
            if let Some(checkbox) = &checkbox {
                let _ = checkbox.set_attribute("checked", "true");
            }
            if let Some(submit) = &submit {
                submit.set_disabled(true);
            }
            let _ = b.set_attribute("data-disabled", "true");
            dom::report("mark as solved", submit_form_of(&b));
        })?;
    }

    let Some(textarea) = dom::query(".request-container .comment-container textarea")
        .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
    else {
        return Ok(());
    };
    let format = CommentFormat::of(&textarea);
    let ta = textarea.clone();
    listen(&textarea, "input", move |_: Event| {
        let Some(button) = &button else {
            return;
        };
        let attr = solve_label_attribute(format.is_empty(&ta.value()));
        if let Some(label) = button.get_attribute(attr) {
            button.set_inner_text(&label);
        }
    })
}

fn install_auto_submit() -> ThemeResult<()> {
    for select in dom::query_all("#request-status-select, #request-organization-select") {
        let s = select.clone();
        listen(&select, "change", move |ev: Event| {
            ev.stop_propagation();
            save_focus();
            dom::report("request filter", submit_form_of(&s));
        })?;
    }

    if let Some(quick_search) = dom::query("#quick-search") {
        let q = quick_search.clone();
        listen(&quick_search, "keyup", move |ev: KeyboardEvent| {
            if ev.key() == ENTER {
                ev.stop_propagation();
                save_focus();
                dom::report("quick search", submit_form_of(&q));
            }
        })?;
    }

    if let Some(org_select) = dom::query("#request-organization select") {
        let s = org_select.clone();
        listen(&org_select, "change", move |_: Event| {
            dom::report("request organization", submit_form_of(&s));
        })?;
        // Keeps the ticket details sidebar from collapsing on mobile.
        listen(&org_select, "click", |ev: MouseEvent| ev.stop_propagation())?;
    }

    Ok(())
}

fn focus_error_notification() {
    let Some(field) = dom::query(".notification-error").and_then(|n| n.previous_element_sibling())
    else {
        return;
    };
    dom::focus(&field);
}

pub(crate) fn install() {
    dom::report("comment form", install_comment_expansion());
    dom::report("mark as solved", install_mark_as_solved());
    dom::report("auto submit", install_auto_submit());
    focus_error_notification();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_emptiness() {
        assert!(is_empty_plaintext(""));
        assert!(is_empty_plaintext("  \n\t "));
        assert!(!is_empty_plaintext(" ok "));
        assert!(CommentFormat::Plaintext.is_empty("   "));
    }

    #[test]
    fn test_solve_label_attribute() {
        assert_eq!(solve_label_attribute(true), "data-solve-translation");
        assert_eq!(solve_label_attribute(false), "data-solve-and-submit-translation");
    }
}
