use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Category of a search query or result.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    #[strum(serialize = "teams")]
    #[serde(rename = "teams")]
    Teams,
    #[strum(serialize = "events")]
    #[serde(rename = "events")]
    Events,
    #[strum(serialize = "players")]
    #[serde(rename = "players")]
    Players,
    #[strum(serialize = "series")]
    #[serde(rename = "series")]
    Series,
    #[strum(serialize = "all")]
    #[serde(rename = "all")]
    All,
}

/// A single hit from the site search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub img: String,
    pub category: SearchCategory,
    pub description: Option<String>,
}
