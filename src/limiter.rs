use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::warn;

const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Counting semaphore bounding concurrent fetches against VLR.gg.
///
/// The Redis backend coordinates across worker processes through a shared
/// counter: acquire is INCR-check-DECR-retry, release is an unconditional
/// DECR. The counter has no expiry tied to holder lifetime, so [`reset`]
/// must be called at startup to clear counts left by a crashed instance.
///
/// If Redis is unreachable the limiter degrades to a no-op rather than
/// blocking all traffic.
///
/// [`reset`]: FetchLimiter::reset
pub struct FetchLimiter {
    backend: Backend,
    limit: i64,
    retry_delay: Duration,
}

enum Backend {
    Redis {
        manager: ConnectionManager,
        key: String,
    },
    Memory(Arc<AtomicI64>),
    Disabled,
}

/// RAII admission permit; releases its slot when dropped, on every exit path.
pub struct FetchPermit {
    release: Option<Release>,
}

enum Release {
    Redis {
        manager: ConnectionManager,
        key: String,
    },
    Memory(Arc<AtomicI64>),
}

impl FetchLimiter {
    /// Limiter backed by a shared Redis counter.
    pub fn redis(manager: ConnectionManager, limit: i64) -> Self {
        Self {
            backend: Backend::Redis {
                manager,
                key: "vlr_request_semaphore".to_string(),
            },
            limit,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Process-local limiter; used in tests and single-process deployments.
    pub fn in_memory(limit: i64) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(AtomicI64::new(0))),
            limit,
            retry_delay: RETRY_DELAY,
        }
    }

    /// A limiter that admits everything (no Redis configured).
    pub fn disabled() -> Self {
        Self {
            backend: Backend::Disabled,
            limit: 0,
            retry_delay: RETRY_DELAY,
        }
    }

    #[cfg(test)]
    fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Wait until a fetch slot is available. Retries indefinitely; the
    /// overall request timeout is the caller's backstop.
    pub async fn acquire(&self) -> FetchPermit {
        loop {
            match &self.backend {
                Backend::Disabled => {
                    return FetchPermit { release: None };
                }
                Backend::Memory(counter) => {
                    let current = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if current <= self.limit {
                        return FetchPermit {
                            release: Some(Release::Memory(Arc::clone(counter))),
                        };
                    }
                    counter.fetch_sub(1, Ordering::SeqCst);
                }
                Backend::Redis { manager, key } => {
                    let mut con = manager.clone();
                    let incremented: redis::RedisResult<i64> = con.incr(key, 1i64).await;
                    match incremented {
                        Ok(current) if current <= self.limit => {
                            return FetchPermit {
                                release: Some(Release::Redis {
                                    manager: manager.clone(),
                                    key: key.clone(),
                                }),
                            };
                        }
                        Ok(_) => {
                            let _: redis::RedisResult<i64> = con.decr(key, 1i64).await;
                        }
                        Err(e) => {
                            // Availability over strict limiting.
                            warn!(error = %e, "limiter backend unavailable, admitting unbounded");
                            return FetchPermit { release: None };
                        }
                    }
                }
            }
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// Force the shared counter to zero, clearing stale counts from a
    /// previous crashed instance.
    pub async fn reset(&self) {
        match &self.backend {
            Backend::Disabled => {}
            Backend::Memory(counter) => counter.store(0, Ordering::SeqCst),
            Backend::Redis { manager, key } => {
                let mut con = manager.clone();
                if let Err(e) = con.set::<_, _, ()>(key, 0i64).await {
                    warn!(error = %e, "failed to reset limiter counter");
                }
            }
        }
    }
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        match self.release.take() {
            None => {}
            Some(Release::Memory(counter)) => {
                counter.fetch_sub(1, Ordering::SeqCst);
            }
            Some(Release::Redis { manager, key }) => {
                // DECR must happen even though Drop cannot await.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        let mut con = manager;
                        let _: redis::RedisResult<i64> = con.decr(&key, 1i64).await;
                    });
                }
            }
        }
    }
}
