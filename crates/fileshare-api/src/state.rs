use std::sync::Arc;

use fileshare_metadata::{CacheAside, MetadataStore, MokaMetadataCache};
use session_token::TokenService;

use crate::blob_store::BlobStore;
use crate::credentials::CredentialVerifier;

/// Shared application state passed to all route handlers.
///
/// Built once at startup; every handle is explicit, nothing is global.
#[derive(Clone)]
pub struct AppState {
    /// Durable store, used directly for user lookups
    pub store: Arc<dyn MetadataStore>,
    /// Cache-aside access to file metadata
    pub files: CacheAside,
    /// Same cache `files` reads through, kept for its hit/miss counters
    pub cache: Arc<MokaMetadataCache>,
    pub tokens: Arc<TokenService>,
    pub credentials: CredentialVerifier,
    pub blobs: Arc<dyn BlobStore>,
    pub max_upload_bytes: usize,
}
