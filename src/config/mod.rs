use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_LOCALE: &str = "en-us";
pub(crate) const DEFAULT_SEARCH_CLEAR_LABEL: &str = "Clear search";
pub(crate) const SEARCH_DEBOUNCE_MS: u64 = 200;

/// Runtime settings, read once at start from page globals.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ThemeConfig {
    pub default_locale: String,
    pub log_level: String,
    pub search_clear_label: String,
    pub search_debounce_ms: u64,
    /// Page origin, used to make API paths absolute for the HTTP client.
    pub api_origin: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            log_level: "warn".to_string(),
            search_clear_label: DEFAULT_SEARCH_CLEAR_LABEL.to_string(),
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            api_origin: String::new(),
        }
    }
}

impl ThemeConfig {
    pub fn from_window() -> Self {
        let mut cfg = Self::default();

        let Some(window) = web_sys::window() else {
            return cfg;
        };

        if let Ok(origin) = window.location().origin() {
            cfg.api_origin = origin;
        }

        if let Some(label) = window
            .get("searchClearButtonLabelLocalized")
            .and_then(|v| v.as_string())
            .filter(|s| !s.trim().is_empty())
        {
            cfg.search_clear_label = label;
        }

        // We support BOTH `window.HC_THEME.DEFAULT_LOCALE` and the lower-case
        // `default_locale` spelling used by older theme settings.
        if let Some(env) = window.get("HC_THEME") {
            if !env.is_undefined() && env.is_object() {
                let get_s = |k: &str| {
                    js_sys::Reflect::get(&env, &k.into())
                        .ok()
                        .and_then(|v| v.as_string())
                        .filter(|s| !s.trim().is_empty())
                };

                if let Some(locale) = get_s("DEFAULT_LOCALE").or_else(|| get_s("default_locale")) {
                    cfg.default_locale = locale.to_lowercase();
                }

                if let Some(level) = get_s("LOG_LEVEL").or_else(|| get_s("log_level")) {
                    cfg.log_level = level;
                }
            }
        }

        cfg
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Warn)
    }
}
