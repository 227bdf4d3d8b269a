use crate::dom::{self, focus, listen, set_aria_expanded};
use crate::error::ThemeResult;
use leptos::prelude::window;
use web_sys::{Element, KeyboardEvent, MouseEvent};

const ESCAPE: &str = "Escape";
const COLLAPSED_FILTER_CLASS: &str = "multibrand-filter-list--collapsed";
/// Filter lists longer than this start collapsed behind a "see all" trigger.
const MAX_VISIBLE_FILTERS: u32 = 6;

fn is_escape(key: &str) -> bool {
    key == ESCAPE || key == "Esc"
}

/// Flips `aria-expanded` on both halves, using the region's state as the truth.
fn toggle_navigation(toggle: &Element, region: &Element) -> ThemeResult<()> {
    let expanded = !dom::aria_expanded(region);
    set_aria_expanded(region, expanded)?;
    set_aria_expanded(toggle, expanded)
}

fn close_navigation(toggle: &Element, region: &Element) -> ThemeResult<()> {
    set_aria_expanded(region, false)?;
    set_aria_expanded(toggle, false)?;
    focus(toggle);
    Ok(())
}

fn install_mobile_menu() -> ThemeResult<()> {
    let (Some(button), Some(menu)) = (
        dom::query(".header .menu-button-mobile"),
        dom::query("#user-nav-mobile"),
    ) else {
        log::debug!("mobile navigation not on this page");
        return Ok(());
    };

    let (b, m) = (button.clone(), menu.clone());
    listen(&button, "click", move |ev: MouseEvent| {
        ev.stop_propagation();
        dom::report("mobile menu", toggle_navigation(&b, &m));
    })?;

    let (b, m) = (button, menu.clone());
    listen(&menu, "keyup", move |ev: KeyboardEvent| {
        if is_escape(&ev.key()) {
            ev.stop_propagation();
            dom::report("mobile menu", close_navigation(&b, &m));
        }
    })
}

fn install_collapsibles() -> ThemeResult<()> {
    for region in dom::query_all(".collapsible-nav, .collapsible-sidebar") {
        let Some(toggle) =
            dom::query_in(&region, ".collapsible-nav-toggle, .collapsible-sidebar-toggle")
        else {
            continue;
        };

        let (t, r) = (toggle.clone(), region.clone());
        listen(&region, "click", move |_: MouseEvent| {
            dom::report("collapsible", toggle_navigation(&t, &r));
        })?;

        let r = region.clone();
        listen(&region, "keyup", move |ev: KeyboardEvent| {
            if is_escape(&ev.key()) {
                dom::report("collapsible", close_navigation(&toggle, &r));
            }
        })?;
    }
    Ok(())
}

fn install_multibrand_filters() -> ThemeResult<()> {
    for filter in dom::query_all(".multibrand-filter-list") {
        if filter.children().length() <= MAX_VISIBLE_FILTERS {
            continue;
        }
        let Some(trigger) = dom::query_in(&filter, ".see-all-filters") else {
            continue;
        };
        trigger.set_attribute("aria-hidden", "false")?;

        let t = trigger.clone();
        listen(&trigger, "click", move |ev: MouseEvent| {
            ev.stop_propagation();
            t.remove();
            let _ = filter.class_list().remove_1(COLLAPSED_FILTER_CLASS);
        })?;
    }
    Ok(())
}

fn install_share_links() -> ThemeResult<()> {
    for anchor in dom::query_all(".share a") {
        let a = anchor.clone();
        listen(&anchor, "click", move |ev: MouseEvent| {
            ev.prevent_default();
            if let Some(href) = a.get_attribute("href") {
                let _ = window().open_with_url_and_target_and_features(
                    &href,
                    "",
                    "height = 500, width = 500",
                );
            }
        })?;
    }
    Ok(())
}

pub(crate) fn install() {
    dom::report("mobile menu", install_mobile_menu());
    dom::report("collapsible", install_collapsibles());
    dom::report("multibrand filters", install_multibrand_filters());
    dom::report("share links", install_share_links());
}
