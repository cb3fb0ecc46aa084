use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fileshare_db::FileRecord;
use moka::future::Cache;
use tracing::debug;

use crate::error::CacheError;

/// Prefix of every cache key; the decimal file id follows it.
pub const CACHE_KEY_PREFIX: &str = "file_metadata:";

const CACHE_TTL_SECS: u64 = 600; // 10 minutes
const CACHE_MAX_CAPACITY: u64 = 100_000;

/// Cache key for a file id
pub fn cache_key(file_id: i64) -> String {
    format!("{CACHE_KEY_PREFIX}{file_id}")
}

/// Ephemeral TTL-bounded snapshots of file records.
///
/// `get` returns `Ok(None)` both for keys never written and for expired
/// entries. A value that cannot be decoded is an error, never a record.
#[async_trait]
pub trait MetadataCache: Send + Sync {
    /// Write a snapshot, replacing any existing entry and restarting its TTL
    async fn put(&self, file_id: i64, record: &FileRecord) -> Result<(), CacheError>;

    async fn get(&self, file_id: i64) -> Result<Option<FileRecord>, CacheError>;
}

/// Hit/miss counters for the metadata cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// In-process metadata cache storing JSON snapshots in a moka cache.
pub struct MokaMetadataCache {
    entries: Cache<String, String>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MokaMetadataCache {
    /// Create a cache with the default 10 minute TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(CACHE_TTL_SECS))
    }

    /// Create a cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(CACHE_MAX_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self {
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Hits and misses counted since the cache was created
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for MokaMetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataCache for MokaMetadataCache {
    async fn put(&self, file_id: i64, record: &FileRecord) -> Result<(), CacheError> {
        let value = serde_json::to_string(record).map_err(CacheError::Serialize)?;
        self.entries.insert(cache_key(file_id), value).await;
        Ok(())
    }

    async fn get(&self, file_id: i64) -> Result<Option<FileRecord>, CacheError> {
        let key = cache_key(file_id);
        let Some(value) = self.entries.get(&key).await else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        let record = serde_json::from_str(&value).map_err(CacheError::Deserialize)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache hit");
        Ok(Some(record))
    }
}
