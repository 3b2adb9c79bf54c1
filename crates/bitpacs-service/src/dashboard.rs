//! Dashboard data service.
//!
//! Serves the facility-scoped Orthanc listings the dashboard renders.
//! Listing endpoints go through the read-through cache; the changes
//! panel polls upstream directly because its whole point is freshness.

use std::sync::Arc;

use bitpacs_cache::{CachedBody, ReadThroughCache};
use bitpacs_core::AppResult;
use bitpacs_entity::SessionContext;
use bitpacs_facility::RouteResolver;
use bitpacs_pacs::OrthancClient;

/// Body returned for any route that performs no upstream call.
const EMPTY_LISTING: &str = "[]";

/// The cached Orthanc listing endpoints the dashboard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingEndpoint {
    /// Expanded series listing.
    Series,
    /// Expanded studies listing.
    Studies,
    /// Instance/study/series counters.
    Statistics,
}

impl ListingEndpoint {
    /// Upstream Orthanc path for this endpoint.
    pub fn upstream_path(&self) -> &'static str {
        match self {
            Self::Series => "/series?expand",
            Self::Studies => "/studies?expand",
            Self::Statistics => "/statistics",
        }
    }

    /// Stable name used in cache partition keys.
    pub fn cache_name(&self) -> &'static str {
        match self {
            Self::Series => "series",
            Self::Studies => "studies",
            Self::Statistics => "statistics",
        }
    }
}

/// Serves dashboard listings through the per-facility cache.
#[derive(Clone)]
pub struct DashboardService {
    resolver: RouteResolver,
    cache: Arc<ReadThroughCache>,
    pacs: Arc<OrthancClient>,
}

impl DashboardService {
    /// Create a new dashboard service.
    pub fn new(
        resolver: RouteResolver,
        cache: Arc<ReadThroughCache>,
        pacs: Arc<OrthancClient>,
    ) -> Self {
        Self {
            resolver,
            cache,
            pacs,
        }
    }

    /// Fetch one listing endpoint for the facility `session` may target.
    ///
    /// The returned body is raw upstream JSON, cached per facility and
    /// endpoint. On upstream failure the body is the degraded error
    /// payload instead; it is never an `Err`, because a broken PACS must
    /// not take the dashboard down with it. Unknown facility keys do
    /// error, before any upstream call.
    pub async fn fetch_listing(
        &self,
        session: &SessionContext,
        requested_key: &str,
        endpoint: ListingEndpoint,
    ) -> AppResult<CachedBody> {
        let route = self.resolver.resolve(session, requested_key)?;

        if route.is_offline() {
            return Ok(CachedBody::fresh(EMPTY_LISTING));
        }

        let key = route.cache_partition_key(endpoint.cache_name());
        let base_url = route.upstream_base_url().to_string();
        let pacs = Arc::clone(&self.pacs);

        let body = self
            .cache
            .get_or_fetch(&key, move || async move {
                pacs.get_text(&base_url, endpoint.upstream_path()).await
            })
            .await;

        Ok(body)
    }

    /// Fetch the raw changes feed for the dashboard activity panel.
    ///
    /// Deliberately uncached: the panel polls this to show near-live
    /// activity. Upstream failures propagate as errors here; the handler
    /// layer degrades them the same way as listings.
    pub async fn fetch_changes(
        &self,
        session: &SessionContext,
        requested_key: &str,
        since: u64,
        limit: u32,
    ) -> AppResult<String> {
        let route = self.resolver.resolve(session, requested_key)?;

        if route.is_offline() {
            return Ok(EMPTY_LISTING.to_string());
        }

        let path = format!("/changes?since={since}&limit={limit}");
        self.pacs.get_text(route.upstream_base_url(), &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpacs_core::config::FacilitySettings;
    use bitpacs_entity::user::Role;
    use bitpacs_facility::FacilityRegistry;
    use std::time::Duration;
    use uuid::Uuid;

    fn resolver() -> RouteResolver {
        let registry = FacilityRegistry::from_settings(&[FacilitySettings {
            key: "unidade-centro".to_string(),
            label: "Unidade Centro".to_string(),
            upstream_base_url: "http://127.0.0.1:1".to_string(),
            proxy_prefix: String::new(),
            storage_capacity_bytes: 0,
        }])
        .unwrap();
        RouteResolver::new(Arc::new(registry))
    }

    fn service() -> DashboardService {
        let config = bitpacs_core::config::OrthancConfig {
            username: "orthanc".to_string(),
            password: "orthanc".to_string(),
            request_timeout_seconds: 1,
            facilities: Vec::new(),
        };
        DashboardService::new(
            resolver(),
            Arc::new(ReadThroughCache::with_ttl(100, Duration::from_secs(300))),
            Arc::new(OrthancClient::new(&config).unwrap()),
        )
    }

    fn master_session() -> SessionContext {
        SessionContext::new(Uuid::new_v4(), "root", Role::Master, "localhost")
    }

    #[tokio::test]
    async fn test_sentinel_serves_empty_without_upstream() {
        let svc = service();
        let body = svc
            .fetch_listing(&master_session(), "localhost", ListingEndpoint::Studies)
            .await
            .unwrap();
        assert_eq!(body.as_str(), "[]");
        assert!(!body.degraded);
    }

    #[tokio::test]
    async fn test_unknown_facility_is_an_error_not_degraded() {
        let svc = service();
        let err = svc
            .fetch_listing(&master_session(), "nope", ListingEndpoint::Series)
            .await
            .unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_degrades() {
        let svc = service();
        let body = svc
            .fetch_listing(&master_session(), "unidade-centro", ListingEndpoint::Series)
            .await
            .unwrap();
        assert!(body.degraded);
        assert!(body.as_str().contains("\"error\":true"));
    }

    #[tokio::test]
    async fn test_changes_sentinel_is_empty() {
        let svc = service();
        let body = svc
            .fetch_changes(&master_session(), "localhost", 0, 100)
            .await
            .unwrap();
        assert_eq!(body, "[]");
    }
}
