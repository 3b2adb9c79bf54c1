//! Read-through cache over opaque JSON response bodies.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use bitpacs_core::config::cache::CacheConfig;
use bitpacs_core::error::AppError;

/// A body returned by the cache: fresh, cached, or degraded.
#[derive(Debug, Clone)]
pub struct CachedBody {
    body: Arc<String>,
    /// True when the upstream fetch failed and this is the error-flagged
    /// fallback payload rather than real data.
    pub degraded: bool,
}

impl CachedBody {
    /// A non-degraded body produced without touching the cache (offline
    /// routes serve a constant empty listing).
    pub fn fresh(body: impl Into<String>) -> Self {
        Self {
            body: Arc::new(body.into()),
            degraded: false,
        }
    }

    /// The response body text.
    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Consume into the owned body.
    pub fn into_string(self) -> String {
        self.body.as_ref().clone()
    }
}

/// Time-bounded read-through cache with single-flight semantics.
///
/// Entries are opaque response bodies keyed by facility + endpoint. An
/// entry older than its TTL is never served as fresh; moka checks expiry
/// on read, so a stale entry behaves like a miss. Freshness is preferred
/// over availability: a failed refresh yields a degraded payload, never
/// the previous stale value, because a medical listing must not silently
/// show outdated series counts.
#[derive(Debug, Clone)]
pub struct ReadThroughCache {
    cache: Cache<String, Arc<String>>,
}

impl ReadThroughCache {
    /// Create a cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(
            config.max_capacity,
            Duration::from_secs(config.time_to_live_seconds),
        )
    }

    /// Create a cache with an explicit capacity and TTL.
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Return the cached body for `key` if fresh, otherwise run `fetch`
    /// and store its result.
    ///
    /// Concurrent callers on the same expired or missing key collapse into
    /// at most one in-flight fetch; callers on distinct keys never block
    /// each other. A failed fetch is converted into a success-shaped
    /// degraded payload (an error-flagged JSON array) and is **not**
    /// stored, so the next caller retries the upstream.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> CachedBody
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AppError>>,
    {
        let result = self
            .cache
            .try_get_with(key.to_string(), async move { fetch().await.map(Arc::new) })
            .await;

        match result {
            Ok(body) => CachedBody {
                body,
                degraded: false,
            },
            Err(err) => {
                tracing::warn!(key, error = %err, "Upstream fetch failed; serving degraded payload");
                CachedBody {
                    body: Arc::new(degraded_payload(err.as_ref())),
                    degraded: true,
                }
            }
        }
    }

    /// Drop every entry whose key starts with `prefix`.
    ///
    /// Moka has no pattern scan, so we iterate; partitions are small
    /// (a handful of endpoints per facility).
    pub async fn invalidate_prefix(&self, prefix: &str) -> u64 {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.as_ref().clone())
            .collect();

        let count = keys.len() as u64;
        for key in keys {
            self.cache.invalidate(&key).await;
        }
        if count > 0 {
            tracing::debug!(prefix, count, "Invalidated cache partition");
        }
        count
    }

    /// Number of entries currently stored (test and metrics aid).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Success-shaped failure payload: a JSON array with one error-flagged
/// element, so a listing UI renders an empty/error state instead of
/// crashing on a non-array body.
fn degraded_payload(err: &AppError) -> String {
    serde_json::json!([
        {
            "error": true,
            "code": err.kind.to_string(),
            "reason": err.message,
        }
    ])
    .to_string()
}
