use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article card from the news listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub url: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub author: String,
}

/// A link extracted from an article body, referenced by a positional
/// `[LINK:n]` token in the content text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub text: String,
    pub url: String,
}

/// A full news article.
///
/// `content` embeds `[LINK:n]`, `[IMG:n]` and `[VIDEO:n]` tokens in reading
/// order; the Nth token of each kind resolves to the Nth entry of the
/// corresponding side list (1-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub links: Vec<ArticleLink>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub date: Option<DateTime<Utc>>,
    pub author: String,
}
