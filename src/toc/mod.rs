//! Two-level table of contents: every category, with the articles of the
//! current page's category expanded underneath it.

use crate::api::{HelpCenterApi, HttpSource, JsonSource};
use crate::config::ThemeConfig;
use crate::error::ApiResult;
use crate::models::{Article, Category, EntityId};
use crate::page::{ContentRef, PageContext};
use crate::util::html_escape;
use futures::future::try_join;
use leptos::task::spawn_local;

pub(crate) const LIST_ID: &str = "all-categories-list";
pub(crate) const ERROR_ITEM: &str =
    r#"<li class="toc-error">Unable to load categories/articles.</li>"#;

/// Where the rendered markup goes.
pub(crate) trait TocMount {
    fn replace_categories(&mut self, html: &str);

    /// Whether the active category's nested list is on the page.
    fn has_articles_mount(&self, category_id: EntityId) -> bool;

    /// Fills the nested list of the active category.
    fn replace_articles(&mut self, category_id: EntityId, html: &str);
}

pub(crate) fn render_categories(categories: &[Category], current: Option<EntityId>) -> String {
    categories
        .iter()
        .map(|c| {
            let name = html_escape(&c.name);
            if Some(c.id) == current {
                format!(
                    r#"<li class="toc-item is-active" data-cat-id="{}" aria-current="page"><span class="toc-title">{name}</span><ul class="toc-articles"></ul></li>"#,
                    c.id
                )
            } else {
                format!(
                    r#"<li class="toc-item"><a href="{}" class="toc-item-link"><span class="toc-title">{name}</span></a></li>"#,
                    html_escape(&c.html_url)
                )
            }
        })
        .collect()
}

pub(crate) fn render_articles(articles: &[Article], page: &PageContext) -> String {
    articles
        .iter()
        .map(|a| {
            let title = html_escape(&a.title);
            if page.path_of(&a.html_url) == page.path {
                format!(
                    r#"<li class="toc-article"><span class="is-active" aria-current="page">{title}</span></li>"#
                )
            } else {
                format!(
                    r#"<li class="toc-article"><a href="{}">{title}</a></li>"#,
                    html_escape(&a.html_url)
                )
            }
        })
        .collect()
}

pub(crate) struct TocBuilder<S> {
    api: HelpCenterApi<S>,
    page: PageContext,
}

impl<S: JsonSource> TocBuilder<S> {
    pub fn new(source: S, page: PageContext) -> Self {
        Self {
            api: HelpCenterApi::new(source, &page.locale),
            page,
        }
    }

    pub async fn current_category_id(&self) -> ApiResult<Option<EntityId>> {
        match self.page.content_ref() {
            Some(ContentRef::Category(id)) => Ok(Some(id)),
            Some(ContentRef::Section(id)) => Ok(Some(self.api.section(id).await?.category_id)),
            Some(ContentRef::Article(id)) => {
                let article = self.api.article(id).await?;
                let section = self.api.section(article.section_id).await?;
                Ok(Some(section.category_id))
            }
            None => Ok(None),
        }
    }

    async fn build(&self, mount: &mut impl TocMount) -> ApiResult<()> {
        let (categories, current) =
            try_join(self.api.categories(), self.current_category_id()).await?;

        mount.replace_categories(&render_categories(&categories, current));

        let Some(current) = current else {
            return Ok(());
        };

        if !mount.has_articles_mount(current) {
            log::debug!("[TOC] category {current} is not in the list; nothing to expand");
            return Ok(());
        }

        let articles = self.api.category_articles(current).await?;
        mount.replace_articles(current, &render_articles(&articles, &self.page));
        Ok(())
    }

    /// Renders into `mount`; any failure replaces the whole list with one error item.
    pub async fn run(&self, mount: &mut impl TocMount) {
        if let Err(e) = self.build(mount).await {
            log::error!("[TOC] build failed: {e}");
            mount.replace_categories(ERROR_ITEM);
        }
    }
}

struct ElementMount {
    list: web_sys::Element,
}

impl ElementMount {
    fn nested(&self, category_id: EntityId) -> Option<web_sys::Element> {
        let selector = format!(r#"li[data-cat-id="{category_id}"] ul.toc-articles"#);
        self.list.query_selector(&selector).ok().flatten()
    }
}

impl TocMount for ElementMount {
    fn replace_categories(&mut self, html: &str) {
        self.list.set_inner_html(html);
    }

    fn has_articles_mount(&self, category_id: EntityId) -> bool {
        self.nested(category_id).is_some()
    }

    fn replace_articles(&mut self, category_id: EntityId, html: &str) {
        if let Some(nested) = self.nested(category_id) {
            nested.set_inner_html(html);
        }
    }
}

pub(crate) fn install(cfg: &ThemeConfig) {
    let Some(list) = leptos::prelude::document().get_element_by_id(LIST_ID) else {
        log::debug!("[TOC] #{LIST_ID} not on this page");
        return;
    };
    let Some(page) = PageContext::from_window(&cfg.default_locale) else {
        return;
    };

    let builder = TocBuilder::new(HttpSource::new(cfg.api_origin.clone()), page);
    let mut mount = ElementMount { list };
    spawn_local(async move {
        builder.run(&mut mount).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockSource;
    use futures::executor::block_on;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingMount {
        categories: String,
        articles: Option<(EntityId, String)>,
        writes: usize,
    }

    impl TocMount for RecordingMount {
        fn replace_categories(&mut self, html: &str) {
            self.categories = html.to_string();
            self.articles = None;
            self.writes += 1;
        }

        fn has_articles_mount(&self, category_id: EntityId) -> bool {
            self.categories.contains(&format!(r#"data-cat-id="{category_id}""#))
        }

        fn replace_articles(&mut self, category_id: EntityId, html: &str) {
            assert!(self.has_articles_mount(category_id), "no list for {category_id}");
            self.articles = Some((category_id, html.to_string()));
            self.writes += 1;
        }
    }

    const CATEGORIES: &str =
        "/api/v2/help_center/en-us/categories.json?per_page=100&sort_by=position";

    fn page(path: &str) -> PageContext {
        PageContext::new(path, None, "en-us", "https://help.example.com")
    }

    fn categories_body() -> serde_json::Value {
        json!({
            "categories": [
                {"id": 4, "name": "Billing", "html_url": "https://help.example.com/hc/en-us/categories/4-Billing"},
                {"id": 5, "name": "Accounts", "html_url": "https://help.example.com/hc/en-us/categories/5-Accounts"}
            ],
            "next_page": null
        })
    }

    fn category_five_source() -> MockSource {
        MockSource::new()
            .ok(CATEGORIES, categories_body())
            .ok(
                "/api/v2/help_center/en-us/articles/123.json",
                json!({"article": {"id": 123, "title": "Foo", "html_url": "https://help.example.com/hc/en-us/articles/123-foo", "section_id": 10}}),
            )
            .ok(
                "/api/v2/help_center/en-us/sections/10.json",
                json!({"section": {"id": 10, "category_id": 5}}),
            )
            .ok(
                "/api/v2/help_center/en-us/categories/5/sections.json?per_page=100",
                json!({"sections": [{"id": 10, "category_id": 5}, {"id": 11, "category_id": 5}]}),
            )
            .ok(
                "/api/v2/help_center/en-us/sections/10/articles.json?per_page=100",
                json!({"articles": [
                    {"id": 123, "title": "Foo", "html_url": "https://help.example.com/hc/en-us/articles/123-foo", "section_id": 10},
                    {"id": 124, "title": "Bar", "html_url": "https://help.example.com/hc/en-us/articles/124-bar", "section_id": 10}
                ]}),
            )
            .ok(
                "/api/v2/help_center/en-us/sections/11/articles.json?per_page=100",
                json!({"articles": [
                    {"id": 200, "title": "Baz", "html_url": "https://help.example.com/hc/en-us/articles/200-baz", "section_id": 11}
                ]}),
            )
    }

    #[test]
    fn test_article_page_expands_its_category() {
        let source = category_five_source();
        let builder = TocBuilder::new(&source, page("/hc/en-us/articles/123-foo"));
        let mut mount = RecordingMount::default();
        block_on(builder.run(&mut mount));

        assert!(mount.categories.contains(
            r#"<li class="toc-item is-active" data-cat-id="5" aria-current="page"><span class="toc-title">Accounts</span><ul class="toc-articles"></ul></li>"#
        ));
        assert!(mount.categories.contains(
            r#"<li class="toc-item"><a href="https://help.example.com/hc/en-us/categories/4-Billing" class="toc-item-link"><span class="toc-title">Billing</span></a></li>"#
        ));

        let (id, articles) = mount.articles.expect("category 5 should be expanded");
        assert_eq!(id, EntityId(5));
        assert_eq!(
            articles,
            concat!(
                r#"<li class="toc-article"><span class="is-active" aria-current="page">Foo</span></li>"#,
                r#"<li class="toc-article"><a href="https://help.example.com/hc/en-us/articles/124-bar">Bar</a></li>"#,
                r#"<li class="toc-article"><a href="https://help.example.com/hc/en-us/articles/200-baz">Baz</a></li>"#,
            )
        );
        assert_eq!(mount.writes, 2);
    }

    #[test]
    fn test_unlisted_category_is_not_expanded_or_fetched() {
        let sections = "/api/v2/help_center/en-us/categories/5/sections.json?per_page=100";
        let source = MockSource::new()
            .ok(
                CATEGORIES,
                json!({"categories": [
                    {"id": 4, "name": "Billing", "html_url": "https://help.example.com/hc/en-us/categories/4-Billing"}
                ]}),
            )
            .ok(
                "/api/v2/help_center/en-us/articles/123.json",
                json!({"article": {"id": 123, "title": "Foo", "html_url": "/hc/en-us/articles/123-foo", "section_id": 10}}),
            )
            .ok(
                "/api/v2/help_center/en-us/sections/10.json",
                json!({"section": {"id": 10, "category_id": 5}}),
            )
            .status(sections, 403);
        let builder = TocBuilder::new(&source, page("/hc/en-us/articles/123-foo"));
        let mut mount = RecordingMount::default();
        block_on(builder.run(&mut mount));

        assert!(mount.categories.contains("Billing"));
        assert_ne!(mount.categories, ERROR_ITEM);
        assert!(mount.articles.is_none());
        assert_eq!(source.call_count(sections), 0);
        assert_eq!(mount.writes, 1);
    }

    #[test]
    fn test_categories_http_500_renders_single_error_item() {
        let source = MockSource::new().status(CATEGORIES, 500);
        let builder = TocBuilder::new(&source, page("/hc/en-us/categories/5-Accounts"));
        let mut mount = RecordingMount::default();
        block_on(builder.run(&mut mount));

        assert_eq!(mount.categories, ERROR_ITEM);
        assert!(mount.articles.is_none());
        assert!(!mount.categories.contains("toc-item"));
    }

    #[test]
    fn test_article_failure_replaces_rendered_categories() {
        let source = MockSource::new()
            .ok(CATEGORIES, categories_body())
            .status(
                "/api/v2/help_center/en-us/categories/5/sections.json?per_page=100",
                502,
            );
        let builder = TocBuilder::new(&source, page("/hc/en-us/categories/5-Accounts"));
        let mut mount = RecordingMount::default();
        block_on(builder.run(&mut mount));

        assert_eq!(mount.categories, ERROR_ITEM);
        assert!(mount.articles.is_none());
    }

    #[test]
    fn test_page_without_category_renders_links_only() {
        let source = MockSource::new().ok(CATEGORIES, categories_body());
        let builder = TocBuilder::new(&source, page("/hc/en-us"));
        let mut mount = RecordingMount::default();
        block_on(builder.run(&mut mount));

        assert!(!mount.categories.contains("is-active"));
        assert_eq!(mount.categories.matches("toc-item-link").count(), 2);
        assert!(mount.articles.is_none());
        assert_eq!(source.calls.borrow().len(), 1);
    }

    #[test]
    fn test_section_page_resolves_via_section() {
        let source = MockSource::new().ok(
            "/api/v2/help_center/en-us/sections/10.json",
            json!({"section": {"id": 10, "category_id": 5}}),
        );
        let builder = TocBuilder::new(&source, page("/hc/en-us/sections/10-Logins"));
        let id = block_on(builder.current_category_id()).expect("section should resolve");
        assert_eq!(id, Some(EntityId(5)));
    }

    #[test]
    fn test_category_path_needs_no_request() {
        let source = MockSource::new();
        let builder = TocBuilder::new(&source, page("/hc/en-us/categories/7-Misc/"));
        let id = block_on(builder.current_category_id()).expect("path is enough");
        assert_eq!(id, Some(EntityId(7)));
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn test_only_current_article_is_marked() {
        let p = page("/hc/en-us/articles/2-two/");
        let articles = vec![
            Article {
                id: EntityId(1),
                title: "One".into(),
                html_url: "/hc/en-us/articles/1-one".into(),
                section_id: EntityId(9),
            },
            Article {
                id: EntityId(2),
                title: "Two".into(),
                html_url: "https://help.example.com/hc/en-us/articles/2-two/".into(),
                section_id: EntityId(9),
            },
        ];
        let html = render_articles(&articles, &p);
        assert_eq!(html.matches("<a href=").count(), 1);
        assert!(html.contains(r#"<span class="is-active" aria-current="page">Two</span>"#));
        assert!(html.contains(r#"<a href="/hc/en-us/articles/1-one">One</a>"#));
    }

    #[test]
    fn test_rendering_escapes_remote_text() {
        let cats = vec![Category {
            id: EntityId(1),
            name: "<b>Q&A</b>".into(),
            html_url: "/c/1\" onclick=\"x".into(),
        }];
        let html = render_categories(&cats, None);
        assert!(html.contains("&lt;b&gt;Q&amp;A&lt;/b&gt;"));
        assert!(html.contains(r#"href="/c/1&quot; onclick=&quot;x""#));
    }
}
