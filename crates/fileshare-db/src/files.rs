use crate::types::{FileRecord, InsertFileParams, SearchFilters};
use sqlx::{PgExecutor, Postgres, QueryBuilder};

/// SELECT columns mapping the `files` table onto [`FileRecord`].
/// Does not include the SELECT keyword or FROM clause.
#[macro_export]
macro_rules! file_columns {
    () => {
        r#"
    id,
    user_id AS owner_id,
    file_name AS name,
    file_size AS size_bytes,
    file_url AS url,
    upload_date AS uploaded_at
"#
    };
}

/// Insert a file row, returning it with its store-assigned id and upload time
pub async fn insert(
    executor: impl PgExecutor<'_>,
    p: &InsertFileParams,
) -> Result<FileRecord, sqlx::Error> {
    sqlx::query_as::<_, FileRecord>(concat!(
        "INSERT INTO files (user_id, file_name, file_size, file_url, upload_date) ",
        "VALUES ($1, $2, $3, $4, NOW()) RETURNING ",
        file_columns!()
    ))
    .bind(p.owner_id)
    .bind(&p.name)
    .bind(p.size_bytes)
    .bind(&p.url)
    .fetch_one(executor)
    .await
}

/// Get a single file by id
pub async fn get_by_id(
    executor: impl PgExecutor<'_>,
    id: i64,
) -> Result<Option<FileRecord>, sqlx::Error> {
    sqlx::query_as::<_, FileRecord>(concat!(
        "SELECT ",
        file_columns!(),
        " FROM files WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Get all files owned by a user, newest first
pub async fn list_by_owner(
    executor: impl PgExecutor<'_>,
    owner_id: i64,
) -> Result<Vec<FileRecord>, sqlx::Error> {
    sqlx::query_as::<_, FileRecord>(concat!(
        "SELECT ",
        file_columns!(),
        " FROM files WHERE user_id = $1 ORDER BY upload_date DESC, id DESC"
    ))
    .bind(owner_id)
    .fetch_all(executor)
    .await
}

/// Search a user's files with optional filters
pub async fn search(
    executor: impl PgExecutor<'_>,
    owner_id: i64,
    filters: &SearchFilters,
) -> Result<Vec<FileRecord>, sqlx::Error> {
    let mut qb = build_search_query(owner_id, filters);
    qb.build_query_as::<FileRecord>().fetch_all(executor).await
}

/// Build the owner-scoped search query.
///
/// Placeholders are emitted by `push_bind` as each filter is applied, so the
/// n-th placeholder always refers to the n-th bound value regardless of which
/// filters are present.
pub fn build_search_query(owner_id: i64, filters: &SearchFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(concat!(
        "SELECT ",
        file_columns!(),
        " FROM files WHERE user_id = "
    ));
    qb.push_bind(owner_id);

    if let Some(ref name) = filters.name_pattern {
        qb.push(" AND file_name ILIKE ");
        qb.push_bind(format!("%{}%", escape_like(name)));
    }

    if let Some(date) = filters.exact_date {
        qb.push(" AND upload_date::date = ");
        qb.push_bind(date);
    }

    if let Some(ref ext) = filters.extension {
        qb.push(" AND file_url LIKE ");
        qb.push_bind(format!("%.{}", escape_like(ext.trim_start_matches('.'))));
    }

    qb.push(" ORDER BY upload_date DESC, id DESC");
    qb
}

/// Escape LIKE metacharacters so user input matches literally
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
