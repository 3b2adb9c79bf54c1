//! Facility registry: config-driven mapping from a facility key to its
//! display label, upstream Orthanc URL, proxy prefix, and storage capacity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use bitpacs_core::config::orthanc::FacilitySettings;
use bitpacs_core::{AppError, AppResult};

/// The "no facility selected" sentinel key.
///
/// It always resolves successfully; routes built on it short-circuit every
/// upstream call and yield empty result sets. It models a Master user who
/// has not yet chosen a facility — never a configuration error.
pub const SENTINEL_KEY: &str = "localhost";

/// One facility: a tenant site backed by its own Orthanc instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityConfig {
    /// Short unique facility code.
    pub key: String,
    /// Human-readable display name.
    pub label: String,
    /// Base URL of this facility's Orthanc instance.
    pub upstream_base_url: String,
    /// Path prefix the frontend uses to reach this facility's proxy.
    pub proxy_prefix: String,
    /// Total storage capacity in bytes, for display ratios only.
    pub storage_capacity_bytes: u64,
}

impl FacilityConfig {
    /// Whether this is the "no facility selected" sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.key == SENTINEL_KEY
    }
}

/// Read-only lookup table of facilities, loaded once at startup.
#[derive(Debug, Clone)]
pub struct FacilityRegistry {
    facilities: HashMap<String, FacilityConfig>,
}

impl FacilityRegistry {
    /// Build the registry from configuration entries.
    ///
    /// The sentinel entry is always present, whether or not the
    /// configuration lists it. Duplicate keys are a startup error.
    pub fn from_settings(settings: &[FacilitySettings]) -> AppResult<Self> {
        let mut facilities = HashMap::new();
        facilities.insert(SENTINEL_KEY.to_string(), sentinel_config());

        for entry in settings {
            let key = entry.key.to_lowercase();
            let config = FacilityConfig {
                key: key.clone(),
                label: entry.label.clone(),
                upstream_base_url: entry.upstream_base_url.trim_end_matches('/').to_string(),
                proxy_prefix: if entry.proxy_prefix.is_empty() {
                    format!("/orthanc-{key}")
                } else {
                    entry.proxy_prefix.clone()
                },
                storage_capacity_bytes: entry.storage_capacity_bytes,
            };
            if facilities.insert(key.clone(), config).is_some() && key != SENTINEL_KEY {
                return Err(AppError::configuration(format!(
                    "Duplicate facility key: '{key}'"
                )));
            }
        }

        tracing::info!(count = facilities.len() - 1, "Facility registry loaded");
        Ok(Self { facilities })
    }

    /// Resolve a facility key.
    ///
    /// Unknown keys fail closed with a configuration error; this is a
    /// caller mistake, not a condition to retry. The sentinel key always
    /// resolves.
    pub fn resolve(&self, key: &str) -> AppResult<&FacilityConfig> {
        self.facilities.get(&key.to_lowercase()).ok_or_else(|| {
            AppError::configuration(format!("Unknown facility key: '{key}'"))
        })
    }

    /// All real (non-sentinel) facilities, for dashboards and monitors.
    pub fn iter(&self) -> impl Iterator<Item = &FacilityConfig> {
        self.facilities.values().filter(|f| !f.is_sentinel())
    }
}

fn sentinel_config() -> FacilityConfig {
    FacilityConfig {
        key: SENTINEL_KEY.to_string(),
        label: "Nenhuma (Localhost)".to_string(),
        upstream_base_url: String::new(),
        proxy_prefix: "/orthanc".to_string(),
        storage_capacity_bytes: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Vec<FacilitySettings> {
        vec![
            FacilitySettings {
                key: "fazenda".to_string(),
                label: "CIS - Unidade de Fazenda".to_string(),
                upstream_base_url: "http://10.31.0.43:8042/".to_string(),
                proxy_prefix: String::new(),
                storage_capacity_bytes: 1_080_000_000_000,
            },
            FacilitySettings {
                key: "riobranco".to_string(),
                label: "CIS - Unidade de Rio Branco".to_string(),
                upstream_base_url: "http://10.31.0.44:8042".to_string(),
                proxy_prefix: "/orthanc-riobranco".to_string(),
                storage_capacity_bytes: 1_020_000_000_000,
            },
        ]
    }

    #[test]
    fn test_resolve_known_key() {
        let registry = FacilityRegistry::from_settings(&settings()).unwrap();
        let fazenda = registry.resolve("fazenda").unwrap();
        assert_eq!(fazenda.upstream_base_url, "http://10.31.0.43:8042");
        assert_eq!(fazenda.proxy_prefix, "/orthanc-fazenda");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = FacilityRegistry::from_settings(&settings()).unwrap();
        assert!(registry.resolve("RioBranco").is_ok());
    }

    #[test]
    fn test_unknown_key_fails_closed() {
        let registry = FacilityRegistry::from_settings(&settings()).unwrap();
        let err = registry.resolve("curitiba").unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_sentinel_always_resolves() {
        let registry = FacilityRegistry::from_settings(&[]).unwrap();
        let sentinel = registry.resolve(SENTINEL_KEY).unwrap();
        assert!(sentinel.is_sentinel());
        assert!(sentinel.upstream_base_url.is_empty());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut dup = settings();
        dup.push(dup[0].clone());
        assert!(FacilityRegistry::from_settings(&dup).is_err());
    }

    #[test]
    fn test_iter_skips_sentinel() {
        let registry = FacilityRegistry::from_settings(&settings()).unwrap();
        let keys: Vec<_> = registry.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys.len(), 2);
        assert!(!keys.contains(&SENTINEL_KEY));
    }
}
