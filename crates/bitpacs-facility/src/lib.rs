//! # bitpacs-facility
//!
//! Multi-tenant facility ("unidade") handling: the static registry mapping
//! facility keys to their upstream Orthanc instances, and the role-aware
//! route resolver that pins non-privileged users to their bound facility.

pub mod registry;
pub mod router;

pub use registry::{FacilityConfig, FacilityRegistry, SENTINEL_KEY};
pub use router::{ResolvedRoute, RouteResolver};
