use std::sync::Arc;

use fileshare_db::{FileRecord, InsertFileParams, SearchFilters};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::cache::MetadataCache;
use crate::error::StoreError;
use crate::store::MetadataStore;

/// Cache-aside coordinator over a durable store and a TTL cache.
///
/// Store failures propagate. Cache failures are logged and absorbed: a
/// failed cache read falls back to the store and a failed cache write leaves
/// the entry missing until the next read repopulates it. Nothing is retried.
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn MetadataStore>,
    cache: Arc<dyn MetadataCache>,
}

impl CacheAside {
    pub fn new(store: Arc<dyn MetadataStore>, cache: Arc<dyn MetadataCache>) -> Self {
        Self { store, cache }
    }

    /// Read a file record, serving from cache when possible.
    ///
    /// Concurrent misses for one id may each query the store and write the
    /// cache; the writes carry identical content.
    pub async fn read_by_id(&self, file_id: i64) -> Result<Option<FileRecord>, StoreError> {
        match self.cache.get(file_id).await {
            Ok(Some(record)) => return Ok(Some(record)),
            Ok(None) => {}
            Err(e) => warn!(file_id, error = %e, "Cache read failed, falling back to store"),
        }

        let Some(record) = self.store.get_file(file_id).await? else {
            debug!(file_id, "File not found");
            return Ok(None);
        };

        self.populate(&record).await;
        Ok(Some(record))
    }

    /// Insert a new file record and warm the cache with it
    pub async fn write_new(&self, params: InsertFileParams) -> Result<FileRecord, StoreError> {
        let record = self.store.insert_file(params).await?;
        self.populate(&record).await;
        Ok(record)
    }

    /// List a user's files and warm the cache with each of them
    pub async fn list_and_warm(&self, owner_id: i64) -> Result<Vec<FileRecord>, StoreError> {
        let records = self.store.list_by_owner(owner_id).await?;
        join_all(records.iter().map(|r| self.populate(r))).await;
        Ok(records)
    }

    /// Search a user's files. Results are not cached.
    pub async fn search(
        &self,
        owner_id: i64,
        filters: &SearchFilters,
    ) -> Result<Vec<FileRecord>, StoreError> {
        debug!(owner_id, unfiltered = filters.is_empty(), "Searching files");
        self.store.search(owner_id, filters).await
    }

    async fn populate(&self, record: &FileRecord) {
        if let Err(e) = self.cache.put(record.id, record).await {
            warn!(file_id = record.id, error = %e, "Failed to cache file metadata");
        }
    }
}
