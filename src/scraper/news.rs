use ::scraper::node::Node;
use ::scraper::{ElementRef, Html, Selector};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use ego_tree::NodeRef;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::context::ScraperContext;
use crate::error::{Result, ScrapeError};
use crate::model::{ArticleLink, NewsArticle, NewsItem};
use crate::scraper::{self, select_attr, select_text};
use crate::utils::{clean_string, expand_url, fix_datetime_tz, get_image_url, BASE_URL};

const LIST_DATE_FORMATS: &[&str] = &["%B %e, %Y", "%b %e, %Y"];
const ARTICLE_DATE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Fetch the news listing page.
#[instrument(skip(ctx))]
pub async fn get_news(ctx: &ScraperContext) -> Result<Vec<NewsItem>> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/news")).await?;
    let document = Html::parse_document(&body);
    let items = parse_news_list(&document, ctx.settings.source_timezone)?;
    debug!(count = items.len(), "parsed news list");
    Ok(items)
}

pub(crate) fn parse_news_list(document: &Html, tz: Tz) -> Result<Vec<NewsItem>> {
    let card_selector = Selector::parse("a.wf-module-item")?;
    let items = document
        .select(&card_selector)
        .filter_map(|card| match parse_news_card(&card, tz) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "skipping unparsable news card");
                None
            }
        })
        .collect_vec();
    Ok(items)
}

/// A news card is three stacked divs: title, description, and a metadata
/// line like "15 Comments • November 5, 2024 • by raezeri".
fn parse_news_card(card: &ElementRef, tz: Tz) -> Result<NewsItem> {
    let href = card.value().attr("href").unwrap_or_default();
    if href.is_empty() {
        return Err(ScrapeError::ElementNotFound {
            context: "news card href",
        });
    }
    let url = format!("{BASE_URL}{href}");

    // The card layout is a single wrapper div holding exactly the three
    // content divs, so read direct children rather than all descendants.
    let wrapper = card
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div")
        .ok_or(ScrapeError::ElementNotFound {
            context: "news card body",
        })?;
    let (title, description, metadata) = wrapper
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div")
        .map(|d| clean_string(&d.text().collect::<String>()))
        .collect_tuple()
        .ok_or(ScrapeError::ElementNotFound {
            context: "news card body",
        })?;

    let parts = metadata.split('•').map(|p| p.trim()).collect_vec();
    let author = parts
        .last()
        .map(|p| p.replace("by", "").trim().to_string())
        .unwrap_or_default();
    let date = parts
        .get(1)
        .and_then(|raw| parse_list_date(raw, tz))
        .ok_or(ScrapeError::ElementNotFound {
            context: "news card date",
        })?;

    Ok(NewsItem {
        url,
        title,
        description,
        date,
        author,
    })
}

fn parse_list_date(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    LIST_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| fix_datetime_tz(naive, tz))
}

/// Fetch one news article and flatten its body into plain text with
/// positional link/image/video tokens.
#[instrument(skip(ctx))]
pub async fn get_news_article(ctx: &ScraperContext, id: &str) -> Result<NewsArticle> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/{id}")).await?;
    let document = Html::parse_document(&body);
    parse_news_article(&document, id, ctx.settings.source_timezone)
}

pub(crate) fn parse_news_article(document: &Html, id: &str, tz: Tz) -> Result<NewsArticle> {
    let title_selector = Selector::parse("h1.wf-title")?;
    let root = document.root_element();
    let title = clean_string(&select_text(&root, &title_selector));
    if title.is_empty() {
        return Err(ScrapeError::ElementNotFound {
            context: "article title",
        });
    }

    let author_selector = Selector::parse("a[href^='/user/']")?;
    let author = clean_string(&select_text(&root, &author_selector));

    let date_selector = Selector::parse("span.js-date-toggle")?;
    let date = select_attr(&root, &date_selector, "title")
        .and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), ARTICLE_DATE_FORMAT).ok())
        .map(|naive| fix_datetime_tz(naive, tz));

    let body_selector = Selector::parse("div.article-body")?;
    let body = document
        .select(&body_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "article body",
        })?;

    let mut flattener = Flattener::default();
    let content = flattener.flatten(&body);

    Ok(NewsArticle {
        id: id.to_string(),
        title,
        content,
        links: flattener.links,
        images: flattener.images,
        videos: flattener.videos,
        date,
        author,
    })
}

/// Walks an article body, turning block elements into paragraphs and
/// replacing anchors, images and embeds with positional tokens. The Nth
/// token of each kind in the text corresponds to the Nth entry of the
/// matching side list.
#[derive(Default)]
struct Flattener {
    links: Vec<ArticleLink>,
    images: Vec<String>,
    videos: Vec<String>,
}

impl Flattener {
    fn flatten(&mut self, body: &ElementRef) -> String {
        let mut blocks = Vec::new();
        let mut current = String::new();
        for child in body.children() {
            self.walk(child, &mut blocks, &mut current);
        }
        flush(&mut blocks, &mut current);
        blocks.join("\n\n")
    }

    fn walk(&mut self, node: NodeRef<Node>, blocks: &mut Vec<String>, current: &mut String) {
        match node.value() {
            Node::Text(text) => current.push_str(&text),
            Node::Element(element) => {
                let Some(el) = ElementRef::wrap(node) else {
                    return;
                };
                match element.name() {
                    "ul" => {
                        flush(blocks, current);
                        for item in list_items(&el) {
                            let line = collapse(&self.inline_element(&item));
                            if !line.is_empty() {
                                blocks.push(format!("- {line}"));
                            }
                        }
                    }
                    "ol" => {
                        flush(blocks, current);
                        for (i, item) in list_items(&el).into_iter().enumerate() {
                            let line = collapse(&self.inline_element(&item));
                            if !line.is_empty() {
                                blocks.push(format!("{}. {line}", i + 1));
                            }
                        }
                    }
                    "p" | "div" | "blockquote" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
                    | "table" => {
                        flush(blocks, current);
                        let mut inner = String::new();
                        for child in node.children() {
                            self.walk(child, blocks, &mut inner);
                        }
                        flush(blocks, &mut inner);
                    }
                    _ => {
                        let rendered = self.inline(node);
                        current.push_str(&rendered);
                    }
                }
            }
            _ => {}
        }
    }

    /// Inline rendition of a node: anchors and embeds become tokens,
    /// formatting wrappers are recursed into.
    fn inline(&mut self, node: NodeRef<Node>) -> String {
        match node.value() {
            Node::Text(text) => text.to_string(),
            Node::Element(element) => {
                let Some(el) = ElementRef::wrap(node) else {
                    return String::new();
                };
                match element.name() {
                    "a" => {
                        let text = collapse(
                            &node.children().map(|c| self.plain_text(c)).join(""),
                        );
                        let url = expand_url(element.attr("href").unwrap_or_default())
                            .unwrap_or_default();
                        self.links.push(ArticleLink { text, url });
                        format!("[LINK:{}]", self.links.len())
                    }
                    "img" => {
                        let src = element.attr("src").unwrap_or_default();
                        self.images.push(get_image_url(src));
                        format!("[IMG:{}]", self.images.len())
                    }
                    "iframe" | "video" => {
                        let src = expand_url(element.attr("src").unwrap_or_default())
                            .unwrap_or_default();
                        self.videos.push(src);
                        format!("[VIDEO:{}]", self.videos.len())
                    }
                    "br" => "\n".to_string(),
                    _ => el.children().map(|c| self.inline(c)).join(""),
                }
            }
            _ => String::new(),
        }
    }

    fn inline_element(&mut self, el: &ElementRef) -> String {
        el.children().map(|c| self.inline(c)).join("")
    }

    /// Text without token substitution, used for anchor labels.
    fn plain_text(&self, node: NodeRef<Node>) -> String {
        match node.value() {
            Node::Text(text) => text.to_string(),
            Node::Element(_) => node.children().map(|c| self.plain_text(c)).join(""),
            _ => String::new(),
        }
    }
}

fn list_items<'a>(el: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .collect_vec()
}

fn flush(blocks: &mut Vec<String>, current: &mut String) {
    let block = collapse(current);
    if !block.is_empty() {
        blocks.push(block);
    }
    current.clear();
}

fn collapse(text: &str) -> String {
    text.split_whitespace().join(" ")
}
