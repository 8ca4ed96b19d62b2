use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::warn;

/// Best-effort Redis cache handle.
///
/// Every operation treats absence as a valid outcome: a disabled cache, a
/// missing connection, or a Redis error all look like a miss to callers.
/// The cache is a performance optimization, never a correctness dependency.
#[derive(Clone)]
pub struct Cache {
    manager: Option<ConnectionManager>,
    enabled: bool,
}

impl Cache {
    pub fn new(manager: Option<ConnectionManager>, enabled: bool) -> Self {
        Self { manager, enabled }
    }

    /// A cache that always misses, for deployments without Redis.
    pub fn disabled() -> Self {
        Self {
            manager: None,
            enabled: false,
        }
    }

    fn connection(&self) -> Option<ConnectionManager> {
        if !self.enabled {
            return None;
        }
        self.manager.clone()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut con = self.connection()?;
        match con.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let Some(mut con) = self.connection() else {
            return;
        };
        if let Err(e) = con.set_ex::<_, _, ()>(key, value, ttl_secs).await {
            warn!(key, error = %e, "cache write failed");
        }
    }

    /// Write one field of a name->id lookup hash.
    pub async fn hset(&self, name: &str, field: &str, value: &str) {
        let Some(mut con) = self.connection() else {
            return;
        };
        if let Err(e) = con.hset::<_, _, _, ()>(name, field, value).await {
            warn!(name, field, error = %e, "cache hash write failed");
        }
    }

    pub async fn hget(&self, name: &str, field: &str) -> Option<String> {
        let mut con = self.connection()?;
        match con.hget::<_, _, Option<String>>(name, field).await {
            Ok(value) => value,
            Err(e) => {
                warn!(name, field, error = %e, "cache hash read failed");
                None
            }
        }
    }

    /// Fetch several fields of a hash at once; the result is positionally
    /// aligned with `fields`, with `None` for absent entries.
    pub async fn hmget(&self, name: &str, fields: &[String]) -> Vec<Option<String>> {
        if fields.is_empty() {
            return Vec::new();
        }
        let Some(mut con) = self.connection() else {
            return vec![None; fields.len()];
        };
        // Issue HMGET explicitly; AsyncCommands::hget degrades a single-field
        // slice to HGET, whose reply is not a bulk array.
        let reply: redis::RedisResult<Vec<Option<String>>> = redis::cmd("HMGET")
            .arg(name)
            .arg(fields)
            .query_async(&mut con)
            .await;
        match reply {
            Ok(values) => values,
            Err(e) => {
                warn!(name, error = %e, "cache hash multi-read failed");
                vec![None; fields.len()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = Cache::disabled();
        cache.set("matches", "[]", 60).await;
        assert_eq!(cache.get("matches").await, None);

        cache.hset("team", "sentinels", "2").await;
        assert_eq!(cache.hget("team", "sentinels").await, None);
        assert_eq!(
            cache.hmget("team", &["a".to_string(), "b".to_string()]).await,
            vec![None, None]
        );
    }

    #[tokio::test]
    async fn hmget_keeps_positional_shape_for_one_field() {
        let cache = Cache::disabled();
        assert_eq!(cache.hmget("event", &["champions".to_string()]).await, vec![None]);
        assert_eq!(cache.hmget("event", &[]).await, Vec::<Option<String>>::new());
    }
}
