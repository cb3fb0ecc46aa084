//! In-process metadata store with the same query semantics as PostgreSQL

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use fileshare_db::{FileRecord, InsertFileParams, SearchFilters, UserCredential};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::MetadataStore;

#[derive(Default)]
struct Tables {
    files: BTreeMap<i64, FileRecord>,
    users: BTreeMap<i64, UserCredential>,
    next_file_id: i64,
    next_user_id: i64,
}

/// Metadata store held in memory. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, matching `ORDER BY upload_date DESC, id DESC`
fn newest_first(mut files: Vec<FileRecord>) -> Vec<FileRecord> {
    files.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    files
}

fn matches_filters(file: &FileRecord, filters: &SearchFilters) -> bool {
    if let Some(ref name) = filters.name_pattern {
        if !file.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(date) = filters.exact_date {
        if file.uploaded_at.date_naive() != date {
            return false;
        }
    }
    if let Some(ref ext) = filters.extension {
        let suffix = format!(".{}", ext.trim_start_matches('.'));
        if !file.url.ends_with(&suffix) {
            return false;
        }
    }
    true
}

#[async_trait]
impl MetadataStore for InMemoryStore {
    async fn insert_file(&self, params: InsertFileParams) -> Result<FileRecord, StoreError> {
        let mut tables = self.tables.write().await;
        tables.next_file_id += 1;
        let record = FileRecord {
            id: tables.next_file_id,
            owner_id: params.owner_id,
            name: params.name,
            size_bytes: params.size_bytes,
            url: params.url,
            uploaded_at: Utc::now(),
        };
        tables.files.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_file(&self, id: i64) -> Result<Option<FileRecord>, StoreError> {
        Ok(self.tables.read().await.files.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>, StoreError> {
        let tables = self.tables.read().await;
        let files = tables
            .files
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(files))
    }

    async fn search(
        &self,
        owner_id: i64,
        filters: &SearchFilters,
    ) -> Result<Vec<FileRecord>, StoreError> {
        let tables = self.tables.read().await;
        let files = tables
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && matches_filters(f, filters))
            .cloned()
            .collect();
        Ok(newest_first(files))
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<UserCredential, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::EmailTaken(email.to_string()));
        }
        tables.next_user_id += 1;
        let user = UserCredential {
            id: tables.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserCredential>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(owner_id: i64, name: &str) -> InsertFileParams {
        InsertFileParams {
            owner_id,
            name: name.to_string(),
            size_bytes: 100,
            url: format!("https://x/{name}"),
        }
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let store = InMemoryStore::new();
        let a = store.insert_file(params(1, "a.txt")).await.unwrap();
        let b = store.insert_file(params(1, "b.txt")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_get_missing_file_is_none() {
        let store = InMemoryStore::new();
        assert!(store.get_file(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_owner_scopes_and_orders() {
        let store = InMemoryStore::new();
        store.insert_file(params(1, "a.txt")).await.unwrap();
        store.insert_file(params(2, "other.txt")).await.unwrap();
        store.insert_file(params(1, "b.txt")).await.unwrap();

        let files = store.list_by_owner(1).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
    }

    #[tokio::test]
    async fn test_search_filters_are_anded() {
        let store = InMemoryStore::new();
        store.insert_file(params(1, "Report.pdf")).await.unwrap();
        store.insert_file(params(1, "report.txt")).await.unwrap();
        store.insert_file(params(1, "notes.pdf")).await.unwrap();
        store.insert_file(params(2, "report.pdf")).await.unwrap();

        let filters = SearchFilters {
            name_pattern: Some("REPORT".to_string()),
            extension: Some("pdf".to_string()),
            ..Default::default()
        };
        let files = store.search(1, &filters).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Report.pdf");
    }

    #[tokio::test]
    async fn test_search_by_date() {
        let store = InMemoryStore::new();
        let file = store.insert_file(params(1, "a.txt")).await.unwrap();

        let today = SearchFilters {
            exact_date: Some(file.uploaded_at.date_naive()),
            ..Default::default()
        };
        assert_eq!(store.search(1, &today).await.unwrap().len(), 1);

        let other_day = SearchFilters {
            exact_date: chrono::NaiveDate::from_ymd_opt(2001, 1, 1),
            ..Default::default()
        };
        assert!(store.search(1, &other_day).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        store.create_user("a@example.com", "hash").await.unwrap();
        let err = store.create_user("a@example.com", "hash").await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(_)));

        let user = store.get_user_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert!(store.get_user_by_email("b@example.com").await.unwrap().is_none());
    }
}
