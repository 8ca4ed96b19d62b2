pub use context::ScraperContext;
pub use error::{Result, ScrapeError};
pub use scraper::events::{get_event, get_event_matches, get_events};
pub use scraper::matches::{get_match, get_matches};
pub use scraper::news::{get_news, get_news_article};
pub use scraper::player::get_player;
pub use scraper::rankings::get_rankings;
pub use scraper::search::search;
pub use scraper::standings::get_standings;
pub use scraper::team::get_team;

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod jobs;
pub mod limiter;
pub mod model;
pub mod notify;
pub mod scraper;
pub(crate) mod utils;
