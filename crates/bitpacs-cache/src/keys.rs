//! Cache key builders.
//!
//! Centralising key construction prevents typos and guarantees that
//! different facilities never share a cache entry and that different
//! endpoints on the same facility never collide.

/// Prefix applied to all BitPacs cache keys.
const PREFIX: &str = "bitpacs";

/// Cache partition key for one endpoint on one facility.
pub fn partition_key(facility_key: &str, endpoint: &str) -> String {
    format!("{PREFIX}:{facility_key}:{endpoint}")
}

/// Prefix matching every cached entry of one facility, for invalidation.
pub fn facility_prefix(facility_key: &str) -> String {
    format!("{PREFIX}:{facility_key}:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_key_shape() {
        assert_eq!(partition_key("fazenda", "series"), "bitpacs:fazenda:series");
    }

    #[test]
    fn test_facilities_never_collide() {
        assert_ne!(
            partition_key("fazenda", "series"),
            partition_key("riobranco", "series")
        );
    }

    #[test]
    fn test_endpoints_never_collide() {
        assert_ne!(
            partition_key("fazenda", "series"),
            partition_key("fazenda", "statistics")
        );
    }

    #[test]
    fn test_prefix_covers_partition_keys() {
        assert!(partition_key("fazenda", "series").starts_with(&facility_prefix("fazenda")));
        assert!(!partition_key("riobranco", "series").starts_with(&facility_prefix("fazenda")));
    }
}
