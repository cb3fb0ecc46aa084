use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// File metadata row. Created once on upload and never updated.
///
/// Serialized with field names so cached snapshots stay readable when
/// fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub size_bytes: i64,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Registered user. `password_hash` is opaque to this crate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserCredential {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Parameters for inserting a new file row
#[derive(Debug, Clone)]
pub struct InsertFileParams {
    pub owner_id: i64,
    pub name: String,
    pub size_bytes: i64,
    pub url: String,
}

/// Optional owner-scoped search filters. Present filters are ANDed.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Case-insensitive substring of the file name
    pub name_pattern: Option<String>,
    /// Calendar date of the upload timestamp
    pub exact_date: Option<NaiveDate>,
    /// Suffix of the file URL, with or without the leading dot
    pub extension: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.name_pattern.is_none() && self.exact_date.is_none() && self.extension.is_none()
    }
}
