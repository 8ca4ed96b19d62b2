use std::env;

use anyhow::{Context, Result};
use chrono_tz::Tz;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Redis connection URL; `None` disables the cache and the distributed
    /// fetch limiter (degraded mode, unbounded concurrency).
    pub redis_url: Option<String>,

    /// Master switch for the response cache.
    pub enable_cache: bool,

    /// Whether parsers opportunistically maintain the name->id lookup hashes.
    pub enable_id_map: bool,

    /// Maximum number of simultaneous requests against VLR.gg, shared
    /// across all worker processes through the Redis counter.
    pub max_concurrent_fetches: i64,

    /// Timezone VLR renders its naive timestamps in.
    pub source_timezone: Tz,

    /// Per-request timeout for upstream fetches, in seconds.
    pub request_timeout_secs: u64,

    /// Default TTL for cached resource lists, in seconds.
    pub cache_ttl_secs: u64,
}

impl Settings {
    /// Load settings from the environment, falling back to defaults that
    /// match a single-process deployment without Redis.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Settings {
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),

            enable_cache: parse_bool("ENABLE_CACHE", true)?,

            enable_id_map: parse_bool("ENABLE_ID_MAP", true)?,

            max_concurrent_fetches: env::var("MAX_CONCURRENT_VLR_REQUESTS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("MAX_CONCURRENT_VLR_REQUESTS must be a valid number")?,

            source_timezone: env::var("TIMEZONE")
                .unwrap_or_else(|_| "America/New_York".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("TIMEZONE must be a valid IANA name: {e}"))?,

            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,

            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("CACHE_TTL_SECS must be a valid number")?,
        })
    }
}

fn parse_bool(var: &str, default: bool) -> Result<bool> {
    match env::var(var) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("{var} must be true or false")),
        Err(_) => Ok(default),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            redis_url: None,
            enable_cache: true,
            enable_id_map: true,
            max_concurrent_fetches: 10,
            source_timezone: chrono_tz::America::New_York,
            request_timeout_secs: 30,
            cache_ttl_secs: 3600,
        }
    }
}
