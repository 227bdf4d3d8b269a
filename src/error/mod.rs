//! Error types shared by the widgets.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

/// Failure of one help center API request.
#[derive(Clone, Debug, Error)]
pub enum ApiError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("request failed ({status}) {url}")]
    Http { status: u16, url: String },

    #[error("unexpected payload from {url}: {message}")]
    Parse { url: String, message: String },
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Network { .. } => ApiErrorKind::Network,
            ApiError::Http { .. } => ApiErrorKind::Http,
            ApiError::Parse { .. } => ApiErrorKind::Parse,
        }
    }

    pub(crate) fn network(url: &str, e: impl std::fmt::Display) -> Self {
        Self::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }

    pub(crate) fn http(status: u16, url: &str) -> Self {
        Self::Http {
            status,
            url: url.to_string(),
        }
    }

    pub(crate) fn parse(url: &str, e: impl std::fmt::Display) -> Self {
        Self::Parse {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// DOM-side failure while wiring a widget.
#[derive(Clone, Debug, Error)]
pub enum ThemeError {
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for ThemeError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &"message".into())
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        ThemeError::Js(message)
    }
}

pub type ThemeResult<T> = Result<T, ThemeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_messages() {
        let e = ApiError::http(500, "/api/v2/help_center/en-us/categories.json");
        assert_eq!(e.kind(), ApiErrorKind::Http);
        assert_eq!(
            e.to_string(),
            "request failed (500) /api/v2/help_center/en-us/categories.json"
        );

        let e = ApiError::parse("/x.json", "expected value");
        assert_eq!(e.kind(), ApiErrorKind::Parse);
        assert!(e.to_string().contains("expected value"));
    }

    #[test]
    fn test_theme_error_display() {
        assert_eq!(
            ThemeError::MissingElement("#all-categories-list").to_string(),
            "missing element: #all-categories-list"
        );
    }
}
