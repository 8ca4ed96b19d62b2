pub mod events;
pub mod matches;
pub mod news;
pub mod player;
pub mod rankings;
pub mod search;
pub mod standings;
pub mod team;

use ::scraper::{ElementRef, Selector};
use chrono::NaiveDate;
use itertools::Itertools;
use tracing::debug;

use crate::context::ScraperContext;
use crate::error::{Result, ScrapeError};
use crate::utils::clean_string;

const DAY_LABEL_FORMAT: &str = "%a, %B %e, %Y";
const DAY_LABEL_FORMAT_ALT: &str = "%a, %b %e, %Y";

/// Fetch a page body through the admission limiter.
///
/// Returns the raw body so callers can parse inside a narrow scope:
/// [`scraper::Html`](::scraper::Html) is not `Send`, so it must never be
/// held across an await point in code that runs under `tokio::spawn`.
pub(crate) async fn fetch_page(ctx: &ScraperContext, url: &str) -> Result<String> {
    let _permit = ctx.limiter.acquire().await;
    debug!(url, "fetching page");

    let response = ctx
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| ScrapeError::Http {
            url: url.to_owned(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    response.text().await.map_err(|e| ScrapeError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })
}

/// Extract cleaned text content from the first element matching `selector`
/// inside `element`. Returns an empty string if nothing matches.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .and_then(|d| d.text().map(|t| t.trim()).find(|t| !t.is_empty()))
        .unwrap_or_default()
        .trim()
        .replace(['\n', '\t'], "")
        .to_string()
}

/// Extract an attribute from the first element matching `selector`.
pub(crate) fn select_attr(element: &ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Extract the `mod-*` suffix from a flag/indicator element's class list
/// (VLR encodes country codes and sides this way).
pub(crate) fn select_mod_class(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .and_then(|e| e.value().classes().find(|c| c.starts_with("mod-")))
        .map(|c| c.strip_prefix("mod-").unwrap_or_default().to_string())
        .unwrap_or_default()
}

/// Parse a match-list day label like "Sat, January 25, 2025", tolerating the
/// "Today"/"Yesterday" suffix the site appends to the current days.
pub(crate) fn parse_day_label(raw: &str) -> Option<NaiveDate> {
    let cleaned = clean_string(raw)
        .to_lowercase()
        .replace("yesterday", "")
        .replace("today", "");
    let cleaned = titlecase_words(cleaned.trim());
    NaiveDate::parse_from_str(&cleaned, DAY_LABEL_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(&cleaned, DAY_LABEL_FORMAT_ALT))
        .ok()
}

pub(crate) fn titlecase_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .join(" ")
}

/// Pull the path segment at `index` from an href like `/event/1234/slug`.
/// VLR embeds its identifiers in URL paths; they are opaque strings here,
/// never regenerated.
pub(crate) fn href_segment(href: &str, index: usize) -> Option<String> {
    href.split('/')
        .nth(index)
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::scraper::Html;

    #[test]
    fn href_segment_extracts_path_ids() {
        assert_eq!(href_segment("/event/1234/champions", 2), Some("1234".to_string()));
        assert_eq!(href_segment("/510272/sen-vs-fnc", 1), Some("510272".to_string()));
        assert_eq!(href_segment("/event/", 2), None);
    }

    #[test]
    fn select_text_tolerates_absent_elements() {
        let doc = Html::parse_fragment("<div><span class=\"a\"> hi \n</span></div>");
        let root = doc.root_element();
        let present = Selector::parse("span.a").unwrap();
        let absent = Selector::parse("span.b").unwrap();
        assert_eq!(select_text(&root, &present), "hi");
        assert_eq!(select_text(&root, &absent), "");
    }

    #[test]
    fn select_mod_class_reads_flag_codes() {
        let doc = Html::parse_fragment("<div><i class=\"flag mod-us\"></i></div>");
        let root = doc.root_element();
        let flag = Selector::parse("i.flag").unwrap();
        assert_eq!(select_mod_class(&root, &flag), "us");
    }
}
