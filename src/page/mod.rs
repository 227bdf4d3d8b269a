use crate::models::EntityId;
use crate::util::trim_trailing_slashes;
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

static LOCALE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/hc/([a-z-]+)/").unwrap());
static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/categories/(\d+)").unwrap());
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/sections/(\d+)").unwrap());
static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/articles/(\d+)").unwrap());

/// What the current page shows, as far as its path tells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentRef {
    Category(EntityId),
    Section(EntityId),
    Article(EntityId),
}

/// The parts of `window.location` the widgets care about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageContext {
    /// Host-relative path without trailing slashes.
    pub path: String,
    pub locale: String,
    pub origin: String,
}

impl PageContext {
    pub fn new(
        pathname: &str,
        document_lang: Option<&str>,
        default_locale: &str,
        origin: &str,
    ) -> Self {
        Self {
            path: trim_trailing_slashes(pathname).to_string(),
            locale: derive_locale(pathname, document_lang, default_locale),
            origin: origin.to_string(),
        }
    }

    pub fn from_window(default_locale: &str) -> Option<Self> {
        let window = web_sys::window()?;
        let location = window.location();
        let pathname = location.pathname().ok()?;
        let origin = location.origin().unwrap_or_default();
        let lang = window
            .document()
            .and_then(|d| d.document_element())
            .and_then(|el| el.get_attribute("lang"));
        Some(Self::new(&pathname, lang.as_deref(), default_locale, &origin))
    }

    fn capture(re: &Regex, path: &str) -> Option<EntityId> {
        re.captures(path)?.get(1)?.as_str().parse().ok()
    }

    /// Category, then section, then article: the first kind found in the path wins.
    pub fn content_ref(&self) -> Option<ContentRef> {
        if let Some(id) = Self::capture(&CATEGORY_RE, &self.path) {
            return Some(ContentRef::Category(id));
        }
        self.section_or_article()
    }

    /// Same as [`content_ref`](Self::content_ref) but ignoring category paths.
    pub fn section_or_article(&self) -> Option<ContentRef> {
        if let Some(id) = Self::capture(&SECTION_RE, &self.path) {
            return Some(ContentRef::Section(id));
        }
        Self::capture(&ARTICLE_RE, &self.path).map(ContentRef::Article)
    }

    /// Host-relative path of `url` resolved against this page's origin,
    /// trailing slashes stripped. Unresolvable input is returned as is.
    pub fn path_of(&self, url: &str) -> String {
        let url = url.trim();
        let resolved = Url::parse(&self.origin).and_then(|base| base.join(url));
        match resolved {
            Ok(resolved) => trim_trailing_slashes(resolved.path()).to_string(),
            Err(_) => trim_trailing_slashes(url).to_string(),
        }
    }
}

pub fn derive_locale(pathname: &str, document_lang: Option<&str>, default_locale: &str) -> String {
    LOCALE_RE
        .captures(pathname)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or(document_lang.filter(|l| !l.trim().is_empty()))
        .unwrap_or(default_locale)
        .to_lowercase()
}
