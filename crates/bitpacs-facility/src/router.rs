//! Facility-scoped route resolution.
//!
//! Given the caller's session and a requested facility key, decides which
//! upstream Orthanc instance and which cache partition the request belongs
//! to. Non-privileged users are pinned to their bound facility regardless
//! of what the client sent.

use std::sync::Arc;

use bitpacs_core::AppResult;
use bitpacs_entity::SessionContext;

use crate::registry::{FacilityConfig, FacilityRegistry};

/// The outcome of route resolution for one request.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    facility: FacilityConfig,
}

impl ResolvedRoute {
    /// The resolved facility.
    pub fn facility(&self) -> &FacilityConfig {
        &self.facility
    }

    /// Base URL of the upstream Orthanc instance.
    pub fn upstream_base_url(&self) -> &str {
        &self.facility.upstream_base_url
    }

    /// Whether this route must perform no upstream call at all
    /// (the "no facility selected" sentinel).
    pub fn is_offline(&self) -> bool {
        self.facility.is_sentinel()
    }

    /// Cache partition key for one endpoint on this facility.
    ///
    /// Deterministic in `(facility, endpoint)`: different facilities never
    /// share an entry and different endpoints never collide.
    pub fn cache_partition_key(&self, endpoint: &str) -> String {
        bitpacs_cache::keys::partition_key(&self.facility.key, endpoint)
    }
}

/// Resolves which facility a request is allowed to target.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    registry: Arc<FacilityRegistry>,
}

impl RouteResolver {
    /// Create a resolver over the given registry.
    pub fn new(registry: Arc<FacilityRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &FacilityRegistry {
        &self.registry
    }

    /// Resolve the route for `session` requesting `requested_key`.
    ///
    /// Master may request any key, including the sentinel. Every other
    /// role has the requested key ignored and the account's bound facility
    /// substituted, so a client can never read another facility's data by
    /// sending a different key. Unknown keys fail closed.
    pub fn resolve(
        &self,
        session: &SessionContext,
        requested_key: &str,
    ) -> AppResult<ResolvedRoute> {
        let effective_key = if session.role.can_switch_facility() {
            requested_key
        } else {
            if !requested_key.eq_ignore_ascii_case(&session.facility_key) {
                tracing::warn!(
                    user_id = %session.user_id,
                    requested = requested_key,
                    bound = %session.facility_key,
                    "Cross-facility request denied; pinning to bound facility"
                );
            }
            session.facility_key.as_str()
        };

        let facility = self.registry.resolve(effective_key)?.clone();
        Ok(ResolvedRoute { facility })
    }
}
