use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use tracing::{info, warn};

use crate::cache::Cache;
use crate::config::Settings;
use crate::limiter::FetchLimiter;

/// Shared runtime context passed to every parser invocation.
///
/// Holds the process-wide HTTP client, the cache handle and the admission
/// limiter; constructed once at startup and cloned cheaply per task.
#[derive(Clone)]
pub struct ScraperContext {
    pub http: reqwest::Client,
    pub cache: Cache,
    pub limiter: Arc<FetchLimiter>,
    pub settings: Arc<Settings>,
}

impl ScraperContext {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!("vlrgg-scraper/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()?;

        let manager = match &settings.redis_url {
            Some(url) => match connect_redis(url).await {
                Ok(manager) => {
                    info!("connected to redis");
                    Some(manager)
                }
                Err(e) => {
                    warn!(error = %e, "redis unavailable, running without cache or limiter");
                    None
                }
            },
            None => None,
        };

        let limiter = match manager.clone() {
            Some(manager) => FetchLimiter::redis(manager, settings.max_concurrent_fetches),
            None => FetchLimiter::disabled(),
        };

        Ok(Self {
            http,
            cache: Cache::new(manager, settings.enable_cache),
            limiter: Arc::new(limiter),
            settings: Arc::new(settings),
        })
    }

    /// Context without Redis, admitting every fetch; used in tests.
    pub fn standalone(settings: Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            cache: Cache::disabled(),
            limiter: Arc::new(FetchLimiter::disabled()),
            settings: Arc::new(settings),
        }
    }
}

async fn connect_redis(url: &str) -> anyhow::Result<ConnectionManager> {
    let client = redis::Client::open(url)?;
    Ok(ConnectionManager::new(client).await?)
}
