use super::{Dropdown, KeyInput, KeyOutcome, MenuSurface, Placement, Rect, Viewport};
use crate::dom::{self, listen};
use crate::error::{ThemeError, ThemeResult};
use crate::util::random_id_for;
use leptos::prelude::{document, window};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Event, HtmlElement, KeyboardEvent, MouseEvent, Node};

const ITEM_SELECTOR: &str = "[role='menuitem'], [role='menuitemradio']";

pub(crate) struct WebMenu {
    toggle: HtmlElement,
    menu: HtmlElement,
}

impl WebMenu {
    /// Gives both elements ids (generating missing ones) and links them with
    /// `aria-controls` / `aria-labelledby`.
    pub fn new(toggle: HtmlElement, menu: HtmlElement) -> ThemeResult<Self> {
        if toggle.id().is_empty() {
            toggle.set_id(&random_id_for("dropdown_toggle"));
        }
        if menu.id().is_empty() {
            menu.set_id(&random_id_for("dropdown_menu"));
        }

        toggle.set_attribute("aria-controls", &menu.id())?;
        menu.set_attribute("aria-labelledby", &toggle.id())?;
        menu.set_tab_index(-1);

        Ok(Self { toggle, menu })
    }

    fn items(&self) -> Vec<HtmlElement> {
        dom::query_all_in(&self.menu, ITEM_SELECTOR)
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect()
    }

    fn contains(&self, ev: &Event) -> bool {
        let target = ev.target().and_then(|t| t.dyn_into::<Node>().ok());
        if self.toggle.contains(target.as_ref()) {
            return true;
        }
        // composedPath sees through shadow roots inside the menu.
        let menu: &JsValue = self.menu.as_ref();
        ev.composed_path().includes(menu, 0)
    }
}

impl MenuSurface for WebMenu {
    fn is_expanded(&self) -> bool {
        dom::aria_expanded(&self.toggle)
    }

    fn set_expanded(&mut self, expanded: bool) {
        let _ = if expanded {
            self.toggle.set_attribute("aria-expanded", "true")
        } else {
            self.toggle.remove_attribute("aria-expanded")
        };
    }

    fn item_count(&self) -> usize {
        self.items().len()
    }

    fn item_text(&self, index: usize) -> String {
        self.items()
            .get(index)
            .and_then(|el| el.text_content())
            .unwrap_or_default()
    }

    fn set_item_tab_index(&mut self, index: usize, tab_index: i32) {
        if let Some(item) = self.items().get(index) {
            item.set_tab_index(tab_index);
        }
    }

    fn focus_item(&mut self, index: usize) {
        if let Some(item) = self.items().get(index) {
            let _ = item.focus();
        }
    }

    fn focus_toggle(&mut self) {
        let _ = self.toggle.focus();
    }

    fn menu_rect(&self) -> Rect {
        let r = self.menu.get_bounding_client_rect();
        Rect {
            left: r.left(),
            top: r.top(),
            width: r.width(),
            height: r.height(),
        }
    }

    fn viewport(&self) -> Viewport {
        let w = window();
        Viewport {
            width: w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(f64::INFINITY),
            height: w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(f64::INFINITY),
        }
    }

    fn has_placement(&self, placement: Placement) -> bool {
        self.menu.class_list().contains(placement.as_ref())
    }

    fn add_placement(&mut self, placement: Placement) {
        let _ = self.menu.class_list().add_1(placement.as_ref());
    }

    fn remove_placement(&mut self, placement: Placement) {
        let _ = self.menu.class_list().remove_1(placement.as_ref());
    }
}

fn key_input(ev: &KeyboardEvent) -> KeyInput {
    KeyInput {
        shift: ev.shift_key(),
        ctrl: ev.ctrl_key(),
        alt: ev.alt_key(),
        meta: ev.meta_key(),
        ..KeyInput::new(&ev.key())
    }
}

fn apply(ev: &KeyboardEvent, outcome: KeyOutcome) {
    if outcome == KeyOutcome::Consumed {
        ev.stop_propagation();
        ev.prevent_default();
    }
}

type Shared = Rc<RefCell<Dropdown<WebMenu>>>;

fn bind(dropdown: Shared) -> ThemeResult<()> {
    let (toggle, menu) = {
        let d = dropdown.borrow();
        (d.surface().toggle.clone(), d.surface().menu.clone())
    };

    let d = dropdown.clone();
    listen(&toggle, "click", move |ev: MouseEvent| {
        ev.stop_propagation();
        ev.prevent_default();
        if let Ok(mut d) = d.try_borrow_mut() {
            d.on_toggle_click();
        }
    })?;

    let d = dropdown.clone();
    listen(&toggle, "keydown", move |ev: KeyboardEvent| {
        if let Ok(mut d) = d.try_borrow_mut() {
            let outcome = d.on_toggle_key(&key_input(&ev));
            apply(&ev, outcome);
        }
    })?;

    let d = dropdown.clone();
    listen(&menu, "keydown", move |ev: KeyboardEvent| {
        if let Ok(mut d) = d.try_borrow_mut() {
            let outcome = d.on_menu_key(&key_input(&ev));
            apply(&ev, outcome);
        }
    })?;

    let body = document()
        .body()
        .ok_or(ThemeError::MissingElement("body"))?;
    let d = dropdown;
    listen(&body, "click", move |ev: Event| {
        if let Ok(mut d) = d.try_borrow_mut() {
            let inside = d.surface().contains(&ev);
            d.on_document_click(inside);
        }
    })?;

    Ok(())
}

fn wire(toggle: HtmlElement, menu: HtmlElement) -> ThemeResult<()> {
    let dropdown = Dropdown::new(WebMenu::new(toggle, menu)?);
    bind(Rc::new(RefCell::new(dropdown)))
}

/// Wires every `.dropdown-toggle` immediately followed by a `.dropdown-menu`,
/// returning how many were wired. A pair that fails is logged and skipped.
pub(crate) fn install() -> usize {
    let mut count = 0;
    for toggle in dom::query_all(".dropdown-toggle") {
        let Some(menu) = toggle.next_element_sibling() else {
            continue;
        };
        if !menu.class_list().contains("dropdown-menu") {
            continue;
        }
        let (Ok(toggle), Ok(menu)) = (
            toggle.dyn_into::<HtmlElement>(),
            menu.dyn_into::<HtmlElement>(),
        ) else {
            continue;
        };

        match wire(toggle, menu) {
            Ok(()) => count += 1,
            Err(e) => log::warn!("dropdown: setup failed: {e}"),
        }
    }
    count
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn fixture(html: &str) -> web_sys::Element {
        let doc = document();
        let root = doc.create_element("div").expect("create div");
        root.set_inner_html(html);
        doc.body().expect("body").append_child(&root).expect("append");
        root
    }

    fn pair(root: &web_sys::Element) -> (HtmlElement, HtmlElement) {
        let toggle = dom::query_in(root, ".dropdown-toggle")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .expect("toggle");
        let menu = dom::query_in(root, ".dropdown-menu")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .expect("menu");
        (toggle, menu)
    }

    #[wasm_bindgen_test]
    fn test_ids_are_generated_and_linked() {
        let root = fixture(
            r#"<button class="dropdown-toggle">Menu</button>
               <div class="dropdown-menu"><a role="menuitem" href="/x">One</a></div>"#,
        );
        let (toggle, menu) = pair(&root);
        let d = Dropdown::new(WebMenu::new(toggle.clone(), menu.clone()).expect("wire"));

        assert!(!toggle.id().is_empty());
        assert!(!menu.id().is_empty());
        assert_eq!(toggle.get_attribute("aria-controls"), Some(menu.id()));
        assert_eq!(menu.get_attribute("aria-labelledby"), Some(toggle.id()));
        assert_eq!(menu.tab_index(), -1);
        assert_eq!(d.surface().item_count(), 1);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_existing_ids_are_kept() {
        let root = fixture(
            r#"<button id="t1" class="dropdown-toggle">Menu</button>
               <div id="m1" class="dropdown-menu"></div>"#,
        );
        let (toggle, menu) = pair(&root);
        let _ = WebMenu::new(toggle.clone(), menu).expect("wire");
        assert_eq!(toggle.id(), "t1");
        assert_eq!(toggle.get_attribute("aria-controls").as_deref(), Some("m1"));
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_open_dismiss_roundtrip_on_real_elements() {
        let root = fixture(
            r#"<button class="dropdown-toggle">Menu</button>
               <div class="dropdown-menu dropdown-menu-end">
                 <a role="menuitem" href="/x">One</a>
                 <a role="menuitemradio" href="/x">Two</a>
               </div>"#,
        );
        let (toggle, menu) = pair(&root);
        let mut d = Dropdown::new(WebMenu::new(toggle.clone(), menu.clone()).expect("wire"));

        d.on_toggle_click();
        assert_eq!(toggle.get_attribute("aria-expanded").as_deref(), Some("true"));
        assert!(menu.class_list().contains("dropdown-menu-end"));
        assert_eq!(d.focused_index(), Some(0));

        d.dismiss();
        assert!(toggle.get_attribute("aria-expanded").is_none());
        assert!(!menu.class_list().contains("dropdown-menu-end"));
        assert_eq!(d.focused_index(), None);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_install_wires_every_pair_and_skips_strays() {
        let root = fixture(
            r#"<button class="dropdown-toggle">A</button>
               <div class="dropdown-menu"><a role="menuitem" href="/a">A1</a></div>
               <button class="dropdown-toggle">Stray</button>
               <span>not a menu</span>
               <button class="dropdown-toggle">B</button>
               <div class="dropdown-menu"><a role="menuitem" href="/b">B1</a></div>"#,
        );
        assert_eq!(install(), 2);

        let toggles = dom::query_all_in(&root, ".dropdown-toggle");
        assert!(toggles[0].get_attribute("aria-controls").is_some());
        assert!(toggles[1].get_attribute("aria-controls").is_none());
        assert!(toggles[2].get_attribute("aria-controls").is_some());
        root.remove();
    }
}
