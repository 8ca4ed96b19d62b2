use ::scraper::{ElementRef, Html, Selector};
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::context::ScraperContext;
use crate::error::Result;
use crate::model::{SearchCategory, SearchResult};
use crate::scraper::{self, select_text};
use crate::utils::{clean_string, get_image_url, BASE_URL};

/// Run a site search for `query` within `category`.
#[instrument(skip(ctx))]
pub async fn search(
    ctx: &ScraperContext,
    query: &str,
    category: SearchCategory,
) -> Result<Vec<SearchResult>> {
    let url = format!(
        "{BASE_URL}/search/?q={}&type={category}",
        urlencoding::encode(query)
    );
    let body = scraper::fetch_page(ctx, &url).await?;
    let document = Html::parse_document(&body);
    let results = parse_search_results(&document)?;
    debug!(query, count = results.len(), "parsed search results");
    Ok(results)
}

pub(crate) fn parse_search_results(document: &Html) -> Result<Vec<SearchResult>> {
    let item_selector = Selector::parse("a.search-item")?;
    let results = document
        .select(&item_selector)
        .filter_map(|item| match parse_search_item(&item) {
            Some(result) => Some(result),
            None => {
                warn!("skipping search result with unrecognized href");
                None
            }
        })
        .collect_vec();
    Ok(results)
}

fn parse_search_item(item: &ElementRef) -> Option<SearchResult> {
    let href = item.value().attr("href")?;
    let category = category_from_href(href)?;

    // The id is the second-to-last path segment of the result link.
    let segments = href
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect_vec();
    let id = segments.get(segments.len().checked_sub(2)?)?.to_string();

    let title_selector = Selector::parse("div.search-item-title").ok()?;
    let name = clean_string(&select_text(item, &title_selector));

    let img_selector = Selector::parse("img").ok()?;
    let img = item
        .select(&img_selector)
        .next()
        .and_then(|e| e.value().attr("src"))
        .map(get_image_url)
        .unwrap_or_default();

    let desc_selector = Selector::parse("div.search-item-desc").ok()?;
    let description =
        Some(clean_string(&select_text(item, &desc_selector))).filter(|d| !d.is_empty());

    Some(SearchResult {
        id,
        name,
        img,
        category,
        description,
    })
}

fn category_from_href(href: &str) -> Option<SearchCategory> {
    if href.contains("team") {
        Some(SearchCategory::Teams)
    } else if href.contains("event") {
        Some(SearchCategory::Events)
    } else if href.contains("player") {
        Some(SearchCategory::Players)
    } else if href.contains("series") {
        Some(SearchCategory::Series)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
    <html><body>
      <a class="search-item wf-module-item" href="/team/2/sentinels">
        <img src="//owcdn.net/img/sen.png">
        <div class="search-item-title">Sentinels</div>
      </a>
      <a class="search-item wf-module-item" href="/player/729/tenz">
        <img src="/img/base/ph/sil.png">
        <div class="search-item-title">TenZ</div>
        <div class="search-item-desc">Tyson Ngo</div>
      </a>
      <a class="search-item wf-module-item" href="/event/2097/champions-2025">
        <img src="//owcdn.net/img/champions.png">
        <div class="search-item-title">Champions 2025</div>
      </a>
      <a class="search-item wf-module-item" href="/unknown/99/thing">
        <div class="search-item-title">Mystery</div>
      </a>
    </body></html>
    "#;

    #[test]
    fn categories_come_from_result_hrefs() {
        let document = Html::parse_document(SEARCH_PAGE);
        let results = parse_search_results(&document).unwrap();
        // The unknown-category result is dropped.
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].id, "2");
        assert_eq!(results[0].name, "Sentinels");
        assert_eq!(results[0].category, SearchCategory::Teams);
        assert_eq!(results[0].description, None);

        assert_eq!(results[1].id, "729");
        assert_eq!(results[1].category, SearchCategory::Players);
        assert_eq!(results[1].description.as_deref(), Some("Tyson Ngo"));

        assert_eq!(results[2].id, "2097");
        assert_eq!(results[2].category, SearchCategory::Events);
    }

    #[test]
    fn search_url_category_segment_serializes_lowercase() {
        assert_eq!(SearchCategory::Teams.to_string(), "teams");
        assert_eq!(SearchCategory::All.to_string(), "all");
    }
}
