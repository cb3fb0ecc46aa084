use async_trait::async_trait;
use fileshare_db::{FileRecord, InsertFileParams, SearchFilters, UserCredential};
use sqlx::PgPool;

use crate::error::StoreError;

/// Durable record of files and users.
///
/// Absence is reported as `Ok(None)`, never as an error.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a file, assigning a fresh id and upload timestamp
    async fn insert_file(&self, params: InsertFileParams) -> Result<FileRecord, StoreError>;

    async fn get_file(&self, id: i64) -> Result<Option<FileRecord>, StoreError>;

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>, StoreError>;

    async fn search(
        &self,
        owner_id: i64,
        filters: &SearchFilters,
    ) -> Result<Vec<FileRecord>, StoreError>;

    /// Register a user. A duplicate email is [`StoreError::EmailTaken`].
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<UserCredential, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, StoreError>;
}

/// PostgreSQL-backed metadata store.
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn insert_file(&self, params: InsertFileParams) -> Result<FileRecord, StoreError> {
        Ok(fileshare_db::files::insert(&self.pool, &params).await?)
    }

    async fn get_file(&self, id: i64) -> Result<Option<FileRecord>, StoreError> {
        Ok(fileshare_db::files::get_by_id(&self.pool, id).await?)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>, StoreError> {
        Ok(fileshare_db::files::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn search(
        &self,
        owner_id: i64,
        filters: &SearchFilters,
    ) -> Result<Vec<FileRecord>, StoreError> {
        Ok(fileshare_db::files::search(&self.pool, owner_id, filters).await?)
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<UserCredential, StoreError> {
        fileshare_db::users::create(&self.pool, email, password_hash)
            .await
            .map_err(|e| {
                if fileshare_db::users::is_duplicate_email(&e) {
                    StoreError::EmailTaken(email.to_string())
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, StoreError> {
        Ok(fileshare_db::users::get_by_email(&self.pool, email).await?)
    }
}
