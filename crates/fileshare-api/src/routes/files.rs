use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use fileshare_metadata::{FileRecord, InsertFileParams, SearchFilters};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::constants::{DEFAULT_CONTENT_TYPE, UPLOAD_FIELD_NAME};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    file_url: String,
    file: FileRecord,
}

/// POST /upload
///
/// Stores the bytes first; metadata is only written once the blob store
/// has returned a URL.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Unable to parse form: {}", e.body_text())))?
    {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Missing file name".into()))?;
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Unable to read file: {}", e.body_text())))?;
        if bytes.len() > state.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} byte upload limit",
                state.max_upload_bytes
            )));
        }

        let url = state.blobs.store(&name, &bytes, &content_type).await?;

        let record = state
            .files
            .write_new(InsertFileParams {
                owner_id: user.user_id,
                name,
                size_bytes: bytes.len() as i64,
                url: url.clone(),
            })
            .await?;

        info!(file_id = record.id, user_id = user.user_id, size = record.size_bytes, "Uploaded file");

        return Ok(Json(UploadResponse {
            file_url: url,
            file: record,
        }));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{UPLOAD_FIELD_NAME}'"
    )))
}

/// GET /files
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    Ok(Json(state.files.list_and_warm(user.user_id).await?))
}

/// GET /files/{id}
///
/// Files owned by another user are reported as not found.
pub async fn get_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<FileRecord>, AppError> {
    state
        .files
        .read_by_id(id)
        .await?
        .filter(|record| record.owner_id == user.user_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("File not found".into()))
}

#[derive(Deserialize)]
pub struct SearchParams {
    name: Option<String>,
    date: Option<String>,
    file_type: Option<String>,
}

impl SearchParams {
    /// Empty values count as absent
    fn into_filters(self) -> Result<SearchFilters, AppError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let exact_date = present(self.date)
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| {
                    AppError::BadRequest(format!("Invalid date {d:?}, expected YYYY-MM-DD"))
                })
            })
            .transpose()?;

        Ok(SearchFilters {
            name_pattern: present(self.name),
            exact_date,
            extension: present(self.file_type),
        })
    }
}

/// GET /search/files?name=&date=&file_type=
pub async fn search(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let filters = params.into_filters()?;
    Ok(Json(state.files.search(user.user_id, &filters).await?))
}
