//! Service configuration: tier TTLs, sampling limits, and response bounds.

use std::time::Duration;

use crate::tiers::Tier;

/// Tunable limits for retrieval, sampling, pagination, and response size.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Cache TTL for tier 1 metadata. Cheapest and most stable, cached longest.
    pub metadata_ttl: Duration,
    /// Cache TTL for tier 2 structure.
    pub structure_ttl: Duration,
    /// Cache TTL for tier 3 samples.
    pub sample_ttl: Duration,
    /// Cache TTL for tier 4 full data. Most expensive and most volatile.
    pub full_ttl: Duration,

    /// Sample size used when the caller does not request one.
    pub default_sample_size: usize,
    /// Upper bound on any requested sample size.
    pub max_sample_size: usize,
    /// Row count at or below which a sheet is analyzed from full data.
    pub default_sampling_threshold: usize,

    /// Hard cap on rows returned by a full-tier fetch.
    pub max_full_rows: usize,
    /// Hard cap on columns returned by a full-tier fetch.
    pub max_full_columns: usize,

    /// Sheets analyzed per page when the caller does not request a size.
    pub default_page_size: usize,
    /// Hard maximum sheets per page.
    pub max_page_size: usize,

    /// Serialized response size ceiling in bytes.
    pub max_response_bytes: usize,
    /// Estimated size above which serialization is not even attempted.
    pub estimate_spill_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            metadata_ttl: Duration::from_secs(300),
            structure_ttl: Duration::from_secs(180),
            sample_ttl: Duration::from_secs(120),
            full_ttl: Duration::from_secs(60),
            default_sample_size: 100,
            max_sample_size: 1000,
            default_sampling_threshold: 1000,
            max_full_rows: 5000,
            max_full_columns: 100,
            default_page_size: 3,
            max_page_size: 10,
            max_response_bytes: 200_000,
            estimate_spill_bytes: 5_000_000,
        }
    }
}

impl ServiceConfig {
    /// TTL for one tier's cache entries.
    pub fn ttl_for(&self, tier: Tier) -> Duration {
        match tier {
            Tier::Metadata => self.metadata_ttl,
            Tier::Structure => self.structure_ttl,
            Tier::Sample => self.sample_ttl,
            Tier::Full => self.full_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttls_decrease_with_tier_cost() {
        let config = ServiceConfig::default();
        assert!(config.metadata_ttl > config.structure_ttl);
        assert!(config.structure_ttl > config.sample_ttl);
        assert!(config.sample_ttl > config.full_ttl);
    }
}
