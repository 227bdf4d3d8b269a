use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

const ID_PREFIX: &str = "hc_theme"; // Must NOT contain "/" or "-"

static COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_hash() -> u64 {
    let mut hasher = DefaultHasher::new();
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    counter.hash(&mut hasher);
    // Mix in wall-clock time so ids differ across page loads too.
    now_ms().hash(&mut hasher);
    hasher.finish()
}

/// Page-unique element id, e.g. `dropdown_toggle_hc_theme_829...`.
pub(crate) fn random_id_for(element: &str) -> String {
    format!("{element}_{ID_PREFIX}_{}", generate_hash())
}

pub(crate) fn now_ms() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().round() as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strips every trailing `/` (an all-slash path becomes empty).
pub(crate) fn trim_trailing_slashes(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Resolves after `ms` on the page's timer queue.
#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let _ = leptos::prelude::window()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
