//! Tier cache: whole-value entries with per-tier TTLs, expiry checked on read.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::tiers::{Tier, TierSnapshot};

/// Cache key for (tier, spreadsheet[, sheet]).
pub fn cache_key(tier: Tier, spreadsheet_id: &str, sheet_id: Option<u64>) -> String {
    match sheet_id {
        Some(sheet) => format!("{}:{}:{}", tier.as_str(), spreadsheet_id, sheet),
        None => format!("{}:{}", tier.as_str(), spreadsheet_id),
    }
}

/// Minimal value-store contract for tier snapshots.
///
/// Writes are atomic whole-value replacements; there is no partial update,
/// which keeps concurrent readers and writers safe without extra locking.
#[async_trait]
pub trait TierCache: Send + Sync {
    /// Return the cached snapshot, or `None` on miss or expiry.
    async fn get(&self, key: &str) -> Option<TierSnapshot>;

    /// Store a snapshot for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: TierSnapshot, ttl: Duration);
}

struct CacheEntry {
    value: TierSnapshot,
    expires_at: Instant,
}

/// In-process tier cache. Entries expire passively on read.
#[derive(Default)]
pub struct MemoryTierCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryTierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired) entries, for diagnostics.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl TierCache for MemoryTierCache {
    async fn get(&self, key: &str) -> Option<TierSnapshot> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: TierSnapshot, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().await.insert(key.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::{SheetInfo, SpreadsheetMetadata};
    use chrono::Utc;

    fn metadata_snapshot(id: &str) -> TierSnapshot {
        TierSnapshot::Metadata(SpreadsheetMetadata {
            spreadsheet_id: id.to_string(),
            title: "t".to_string(),
            sheets: vec![SheetInfo {
                sheet_id: 0,
                title: "Sheet1".to_string(),
                row_count: 1,
                column_count: 1,
                index: 0,
            }],
            retrieved_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = MemoryTierCache::new();
        let key = cache_key(Tier::Metadata, "s1", None);
        cache
            .set(&key, metadata_snapshot("s1"), Duration::from_secs(60))
            .await;
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryTierCache::new();
        let key = cache_key(Tier::Metadata, "s1", None);
        cache
            .set(&key, metadata_snapshot("s1"), Duration::from_millis(0))
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get(&key).await.is_none());
        // Expiry on read removes the entry.
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_replaces_whole_value() {
        let cache = MemoryTierCache::new();
        let key = cache_key(Tier::Metadata, "s1", None);
        cache
            .set(&key, metadata_snapshot("s1"), Duration::from_secs(60))
            .await;
        cache
            .set(&key, metadata_snapshot("s2"), Duration::from_secs(60))
            .await;
        match cache.get(&key).await {
            Some(TierSnapshot::Metadata(m)) => assert_eq!(m.spreadsheet_id, "s2"),
            other => panic!("unexpected entry: {other:?}"),
        }
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_key_shape() {
        assert_eq!(cache_key(Tier::Sample, "abc", Some(7)), "sample:abc:7");
        assert_eq!(cache_key(Tier::Metadata, "abc", None), "metadata:abc");
    }
}
