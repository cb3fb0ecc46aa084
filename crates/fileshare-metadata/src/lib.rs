//! File metadata with a cache-aside acceleration layer
//!
//! The durable [`MetadataStore`] is the single source of truth. Reads go
//! through [`CacheAside`], which consults a TTL-bounded [`MetadataCache`]
//! first and repopulates it from the store on a miss. File records are
//! immutable after creation, so entries are never invalidated; staleness is
//! bounded by the cache TTL alone.

mod cache;
mod coordinator;
mod error;
mod memory;
mod store;

pub use cache::{cache_key, CacheStats, MetadataCache, MokaMetadataCache, CACHE_KEY_PREFIX};
pub use coordinator::CacheAside;
pub use error::{CacheError, StoreError};
pub use fileshare_db::{FileRecord, InsertFileParams, SearchFilters, UserCredential};
pub use memory::InMemoryStore;
pub use store::{MetadataStore, PgMetadataStore};
