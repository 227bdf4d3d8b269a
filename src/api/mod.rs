use crate::error::{ApiError, ApiResult};
use crate::models::{
    Article, ArticleEnvelope, Category, CategoryEnvelope, EntityId, Section, SectionEnvelope,
};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

pub(crate) const PER_PAGE: u32 = 100;

/// Anything that can GET a URL and hand back its JSON body.
///
/// Non-2xx responses must surface as [`ApiError::Http`].
pub(crate) trait JsonSource {
    async fn get_json(&self, url: &str) -> ApiResult<Value>;
}

/// Browser fetch via reqwest's wasm backend.
#[derive(Clone)]
pub(crate) struct HttpSource {
    origin: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            client: reqwest::Client::new(),
        }
    }
}

fn absolute_url(origin: &str, url: &str) -> String {
    if url.starts_with('/') && !url.starts_with("//") {
        format!("{}{}", origin.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

impl JsonSource for HttpSource {
    async fn get_json(&self, url: &str) -> ApiResult<Value> {
        let res = self
            .client
            .get(absolute_url(&self.origin, url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::network(url, e))?;

        if !res.status().is_success() {
            return Err(ApiError::http(res.status().as_u16(), url));
        }

        res.json().await.map_err(|e| ApiError::parse(url, e))
    }
}

/// Path builders for the help center v2 API under one locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(locale: &str) -> Self {
        Self {
            base: format!("/api/v2/help_center/{}", urlencoding::encode(locale)),
        }
    }

    pub fn categories(&self) -> String {
        format!("{}/categories.json?per_page={PER_PAGE}&sort_by=position", self.base)
    }

    pub fn category(&self, id: EntityId) -> String {
        format!("{}/categories/{id}.json", self.base)
    }

    pub fn section(&self, id: EntityId) -> String {
        format!("{}/sections/{id}.json", self.base)
    }

    pub fn article(&self, id: EntityId) -> String {
        format!("{}/articles/{id}.json", self.base)
    }

    pub fn category_sections(&self, id: EntityId) -> String {
        format!("{}/categories/{id}/sections.json?per_page={PER_PAGE}", self.base)
    }

    pub fn section_articles(&self, id: EntityId) -> String {
        format!("{}/sections/{id}/articles.json?per_page={PER_PAGE}", self.base)
    }
}

/// One page of a listing response: the entries of its (single) array-valued
/// property plus the `next_page` link, if any.
pub(crate) fn split_page(page: Value) -> (Vec<Value>, Option<String>) {
    let Value::Object(mut map) = page else {
        return (Vec::new(), None);
    };

    let next = map
        .get("next_page")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let key = map
        .iter()
        .find(|(_, v)| v.is_array())
        .map(|(k, _)| k.clone());

    let items = match key.and_then(|k| map.remove(&k)) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    (items, next)
}

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::parse(url, e))
}

#[derive(Clone)]
pub(crate) struct HelpCenterApi<S> {
    source: S,
    endpoints: Endpoints,
}

impl<S: JsonSource> HelpCenterApi<S> {
    pub fn new(source: S, locale: &str) -> Self {
        Self {
            source,
            endpoints: Endpoints::new(locale),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let value = self.source.get_json(url).await?;
        decode(url, value)
    }

    /// Follows `next_page` until it is absent, concatenating every page's entries.
    pub async fn fetch_all<T: DeserializeOwned>(&self, url: &str) -> ApiResult<Vec<T>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(url.to_string());

        while let Some(current) = next.take() {
            if !seen.insert(current.clone()) {
                log::warn!("pagination loop detected at {current}; stopping");
                break;
            }

            let page = self.source.get_json(&current).await?;
            let (items, following) = split_page(page);
            for item in items {
                out.push(decode(&current, item)?);
            }
            next = following;
        }

        Ok(out)
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        self.fetch_all(&self.endpoints.categories()).await
    }

    pub async fn category(&self, id: EntityId) -> ApiResult<Category> {
        let env: CategoryEnvelope = self.get(&self.endpoints.category(id)).await?;
        Ok(env.category)
    }

    pub async fn section(&self, id: EntityId) -> ApiResult<Section> {
        let env: SectionEnvelope = self.get(&self.endpoints.section(id)).await?;
        Ok(env.section)
    }

    pub async fn article(&self, id: EntityId) -> ApiResult<Article> {
        let env: ArticleEnvelope = self.get(&self.endpoints.article(id)).await?;
        Ok(env.article)
    }

    pub async fn sections_of(&self, category_id: EntityId) -> ApiResult<Vec<Section>> {
        self.fetch_all(&self.endpoints.category_sections(category_id)).await
    }

    pub async fn articles_of(&self, section_id: EntityId) -> ApiResult<Vec<Article>> {
        self.fetch_all(&self.endpoints.section_articles(section_id)).await
    }

    /// Every article of every section in the category, in section order.
    pub async fn category_articles(&self, category_id: EntityId) -> ApiResult<Vec<Article>> {
        let sections = self.sections_of(category_id).await?;
        let per_section = try_join_all(sections.iter().map(|s| self.articles_of(s.id))).await?;
        Ok(per_section.into_iter().flatten().collect())
    }
}
