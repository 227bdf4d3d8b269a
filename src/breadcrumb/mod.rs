use crate::api::{HelpCenterApi, HttpSource, JsonSource};
use crate::config::ThemeConfig;
use crate::error::ApiResult;
use crate::models::Category;
use crate::page::{ContentRef, PageContext};
use crate::util::html_escape;
use leptos::task::spawn_local;

pub(crate) const BREADCRUMB_ID: &str = "category-breadcrumb";

/// Category of the current section or article page. Category pages (and
/// everything else) have no breadcrumb to add.
pub(crate) async fn category_for_page<S: JsonSource>(
    api: &HelpCenterApi<S>,
    page: &PageContext,
) -> ApiResult<Option<Category>> {
    let section_id = match page.section_or_article() {
        Some(ContentRef::Section(id)) => id,
        Some(ContentRef::Article(id)) => api.article(id).await?.section_id,
        _ => return Ok(None),
    };
    let section = api.section(section_id).await?;
    Ok(Some(api.category(section.category_id).await?))
}

pub(crate) fn render_breadcrumb(category: &Category) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        html_escape(&category.html_url),
        html_escape(&category.name)
    )
}

pub(crate) fn install(cfg: &ThemeConfig) {
    let Some(el) = leptos::prelude::document().get_element_by_id(BREADCRUMB_ID) else {
        return;
    };
    let Some(page) = PageContext::from_window(&cfg.default_locale) else {
        return;
    };

    let api = HelpCenterApi::new(HttpSource::new(cfg.api_origin.clone()), &page.locale);
    spawn_local(async move {
        match category_for_page(&api, &page).await {
            Ok(Some(category)) => el.set_inner_html(&render_breadcrumb(&category)),
            Ok(None) => {}
            Err(e) => log::error!("Breadcrumb build failed: {e}"),
        }
    });
}
