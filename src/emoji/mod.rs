//! Removes decorative emoji/symbol prefixes from titles, TOC entries and
//! breadcrumbs. Content authors prefix category names with emoji for the
//! tiles on the home page; everywhere else the prefix is noise.

use crate::dom;
use leptos::prelude::document;
use regex::Regex;
use std::sync::LazyLock;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, MutationObserver, MutationObserverInit, MutationRecord, Node};

static TILE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Extended_Pictographic}(?:\x{FE0F}|\x{200D}\p{Extended_Pictographic})*\s*")
        .unwrap()
});

static SYMBOL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Extended_Pictographic}\p{S}\p{P}\s]+").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stripper {
    /// One emoji (with its variation selector / ZWJ sequence) and the space after it.
    Tile,
    /// Any leading run of pictographs, symbols, punctuation and whitespace; result trimmed.
    Symbol,
}

impl Stripper {
    pub fn selectors(self) -> &'static str {
        match self {
            Stripper::Tile => ".blocks-item-title, .page-title",
            Stripper::Symbol => concat!(
                ".blocks-item-title, .toc-item span, .toc-item a span, .toc-title a, ",
                ".breadcrumbs li, .breadcrumbs li a, .page-title, ",
                ".category-list .category-list-title, .section-list .section-list-title, ",
                ".article-list .article-list-link"
            ),
        }
    }

    fn strip_leading<'a>(self, s: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            Stripper::Tile => TILE_PREFIX_RE.replace(s, ""),
            Stripper::Symbol => SYMBOL_PREFIX_RE.replace(s, ""),
        }
    }

    pub fn strip(self, s: &str) -> String {
        match self {
            Stripper::Tile => self.strip_leading(s).into_owned(),
            Stripper::Symbol => self.strip_leading(s).trim().to_string(),
        }
    }

    /// Replacement text for an element whose whole text is `original`, or
    /// `None` when it should be left alone.
    pub fn replacement(self, original: &str) -> Option<String> {
        let cleaned = self.strip(original);
        match self {
            Stripper::Tile => (cleaned != original).then_some(cleaned),
            // Whitespace-only differences are not worth rewriting the node for.
            Stripper::Symbol => {
                (!cleaned.is_empty() && cleaned != original.trim()).then_some(cleaned)
            }
        }
    }

    /// Replacement for the first text node inside an element that has child
    /// elements; only the prefix goes, the rest of the text node is kept as is.
    pub fn replacement_for_leading_text(self, text: &str) -> Option<String> {
        let cleaned = match self {
            Stripper::Tile => self.strip_leading(text).into_owned(),
            Stripper::Symbol => self.strip_leading(text).trim_start().to_string(),
        };
        (cleaned != text && (self == Stripper::Tile || !cleaned.trim().is_empty()))
            .then_some(cleaned)
    }
}

fn first_text_node(node: &Node) -> Option<Node> {
    let mut child = node.first_child();
    while let Some(c) = child {
        match c.node_type() {
            Node::TEXT_NODE => {
                if c.node_value().is_some_and(|v| !v.trim().is_empty()) {
                    return Some(c);
                }
            }
            Node::ELEMENT_NODE => {
                if let Some(found) = first_text_node(&c) {
                    return Some(found);
                }
            }
            _ => {}
        }
        child = c.next_sibling();
    }
    None
}

fn clean_element(el: &Element, stripper: Stripper) {
    // Flattening textContent would drop nested links, so only touch the
    // leading text node when there is markup inside.
    if el.child_element_count() > 0 {
        if let Some(text) = first_text_node(el) {
            let value = text.node_value().unwrap_or_default();
            if let Some(cleaned) = stripper.replacement_for_leading_text(&value) {
                text.set_node_value(Some(&cleaned));
            }
        }
        return;
    }

    let original = el.text_content().unwrap_or_default();
    if let Some(cleaned) = stripper.replacement(&original) {
        el.set_text_content(Some(&cleaned));
    }
}

/// Cleans `root` (when it matches) and every matching descendant.
pub(crate) fn clean_subtree(root: &Element, stripper: Stripper) {
    if root.matches(stripper.selectors()).unwrap_or(false) {
        clean_element(root, stripper);
    }
    for el in dom::query_all_in(root, stripper.selectors()) {
        clean_element(&el, stripper);
    }
}

pub(crate) fn clean_document(stripper: Stripper) {
    for el in dom::query_all(stripper.selectors()) {
        clean_element(&el, stripper);
    }
}

/// Re-cleans every element subtree inserted anywhere under `<html>`, for the
/// rest of the page's life.
pub(crate) fn watch_insertions() {
    let Some(root) = document().document_element() else {
        return;
    };

    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        |records: js_sys::Array, _observer: MutationObserver| {
            for record in records.iter() {
                let Ok(record) = record.dyn_into::<MutationRecord>() else {
                    continue;
                };
                let added = record.added_nodes();
                for i in 0..added.length() {
                    if let Some(el) = added.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                        clean_subtree(&el, Stripper::Symbol);
                    }
                }
            }
        },
    );

    let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(e) => {
            log::warn!("emoji stripper: cannot observe insertions: {e:?}");
            return;
        }
    };
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    if let Err(e) = observer.observe_with_options(&root, &init) {
        log::warn!("emoji stripper: observe failed: {e:?}");
        return;
    }
    callback.forget();
}
