use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::constants::{MAX_EMAIL_LENGTH, MAX_PASSWORD_LENGTH};
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::{validate_byte_length, validate_string_length};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    email: String,
    password: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = body.email.trim();
    validate_string_length(email, 3, MAX_EMAIL_LENGTH, "email")?;
    if !email.contains('@') {
        return Err(AppError::BadRequest("email must contain '@'".into()));
    }
    validate_byte_length(&body.password, 1, MAX_PASSWORD_LENGTH, "password")?;

    let hash = state.credentials.hash(&body.password).await?;
    let user = state.store.create_user(email, &hash).await?;

    info!(user_id = user.id, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": user.id, "email": user.email })),
    ))
}

/// POST /login
///
/// Unknown emails and wrong passwords are indistinguishable to the client.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<Value>, AppError> {
    let user = state
        .store
        .get_user_by_email(body.email.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !state
        .credentials
        .verify(&user.password_hash, &body.password)
        .await
    {
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .tokens
        .issue(&user.email)
        .map_err(|e| AppError::Internal(format!("Error generating token: {e}")))?;

    info!(user_id = user.id, "User logged in");

    Ok(Json(json!({ "token": token })))
}
