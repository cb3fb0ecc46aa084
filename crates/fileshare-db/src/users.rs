use crate::types::UserCredential;
use sqlx::PgExecutor;

/// Create a user, returning the stored row
pub async fn create(
    executor: impl PgExecutor<'_>,
    email: &str,
    password_hash: &str,
) -> Result<UserCredential, sqlx::Error> {
    sqlx::query_as::<_, UserCredential>(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING id, email, password_hash
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(executor)
    .await
}

/// Look up a user by email
pub async fn get_by_email(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<UserCredential>, sqlx::Error> {
    sqlx::query_as::<_, UserCredential>(
        "SELECT id, email, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

/// Whether an error is a violation of the unique email constraint
pub fn is_duplicate_email(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}
