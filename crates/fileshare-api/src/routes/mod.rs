pub mod auth;
pub mod files;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Health
        .route("/health", get(health::health))
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Files (bearer token required)
        .route("/upload", post(files::upload))
        .route("/files", get(files::list))
        .route("/files/{id}", get(files::get_file))
        .route("/search/files", get(files::search))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::{BlobStore, BlobStoreError, FsBlobStore};
    use crate::credentials::CredentialVerifier;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use fileshare_metadata::{CacheAside, InMemoryStore, MokaMetadataCache};
    use serde_json::{json, Value};
    use session_token::TokenService;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-TEST-BOUNDARY";

    fn create_test_state(blob_dir: &Path) -> AppState {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(MokaMetadataCache::new());
        AppState {
            store: store.clone(),
            files: CacheAside::new(store, cache.clone()),
            cache,
            tokens: Arc::new(TokenService::new(b"test-secret").unwrap()),
            credentials: CredentialVerifier::with_cost(4),
            blobs: Arc::new(FsBlobStore::new(
                blob_dir.to_path_buf(),
                "http://localhost:8080/uploads",
            )),
            max_upload_bytes: 1024 * 1024,
        }
    }

    struct FailingBlobStore;

    #[async_trait]
    impl BlobStore for FailingBlobStore {
        async fn store(
            &self,
            _name: &str,
            _bytes: &[u8],
            _content_type: &str,
        ) -> Result<String, BlobStoreError> {
            Err(BlobStoreError::Io(std::io::Error::other("disk full")))
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed_get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn upload_request(token: &str, field: &str, filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn register_and_login(router: &Router, email: &str) -> String {
        let creds = json!({ "email": email, "password": "hunter2" });
        let (status, _) = send(router, json_request("POST", "/register", creds.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = send(router, json_request("POST", "/login", creds)).await;
        assert_eq!(status, StatusCode::OK);
        json["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["cache"]["hits"], 0);
        assert_eq!(json["cache"]["misses"], 0);
    }

    #[tokio::test]
    async fn test_health_reports_cache_counters() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let token = register_and_login(&router, "a@example.com").await;

        let (status, _) = send(&router, upload_request(&token, "file", "a.txt", "hello")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&router, authed_get("/files/1", &token)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&router, authed_get("/files/42", &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (_, json) = send(&router, request).await;
        assert_eq!(json["cache"]["hits"], 1);
        assert_eq!(json["cache"]["misses"], 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let creds = json!({ "email": "a@example.com", "password": "hunter2" });

        let (status, json) = send(&router, json_request("POST", "/register", creds.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["email"], "a@example.com");
        assert!(json.get("password_hash").is_none());

        let (status, _) = send(&router, json_request("POST", "/register", creds)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));

        let no_at = json!({ "email": "not-an-email", "password": "hunter2" });
        let (status, _) = send(&router, json_request("POST", "/register", no_at)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let no_password = json!({ "email": "a@example.com", "password": "" });
        let (status, _) = send(&router, json_request("POST", "/register", no_password)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_limits_password_bytes() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));

        // 72 characters, 144 bytes
        let multibyte = json!({ "email": "a@example.com", "password": "ä".repeat(72) });
        let (status, _) = send(&router, json_request("POST", "/register", multibyte)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let ascii = json!({ "email": "a@example.com", "password": "a".repeat(72) });
        let (status, _) = send(&router, json_request("POST", "/register", ascii)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        register_and_login(&router, "a@example.com").await;

        let wrong_password = json!({ "email": "a@example.com", "password": "nope" });
        let (status_a, body_a) = send(&router, json_request("POST", "/login", wrong_password)).await;

        let unknown_email = json!({ "email": "b@example.com", "password": "hunter2" });
        let (status_b, body_b) = send(&router, json_request("POST", "/login", unknown_email)).await;

        assert_eq!(status_a, StatusCode::UNAUTHORIZED);
        assert_eq!(status_b, StatusCode::UNAUTHORIZED);
        assert_eq!(body_a, body_b);
    }

    #[tokio::test]
    async fn test_protected_routes_require_bearer_token() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let token = register_and_login(&router, "a@example.com").await;

        let missing = Request::builder().uri("/files").body(Body::empty()).unwrap();
        let (status, missing_body) = send(&router, missing).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let no_prefix = Request::builder()
            .uri("/files")
            .header(header::AUTHORIZATION, token)
            .body(Body::empty())
            .unwrap();
        let (status, no_prefix_body) = send(&router, no_prefix).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, garbage_body) = send(&router, authed_get("/files", "garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        assert_eq!(missing_body, no_prefix_body);
        assert_eq!(missing_body, garbage_body);
    }

    #[tokio::test]
    async fn test_token_for_unknown_user_is_unauthorized() {
        let dir = tempdir().unwrap();
        let state = create_test_state(dir.path());
        let token = state.tokens.issue("ghost@example.com").unwrap();
        let router = create_router(state);

        let (status, _) = send(&router, authed_get("/files", &token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_then_read_list_and_search() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let token = register_and_login(&router, "a@example.com").await;

        let (status, json) = send(&router, upload_request(&token, "file", "a.txt", "hello")).await;
        assert_eq!(status, StatusCode::OK);
        let file_url = json["fileUrl"].as_str().unwrap().to_string();
        assert!(file_url.starts_with("http://localhost:8080/uploads/"));
        assert_eq!(json["file"]["id"], 1);
        assert_eq!(json["file"]["name"], "a.txt");
        assert_eq!(json["file"]["size_bytes"], 5);
        assert_eq!(json["file"]["url"], file_url);

        let (status, json) = send(&router, authed_get("/files/1", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "a.txt");
        assert_eq!(json["url"], file_url);

        let (status, json) = send(&router, authed_get("/files", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (status, json) = send(&router, authed_get("/search/files?file_type=txt", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (status, json) = send(&router, authed_get("/search/files?file_type=pdf", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());

        let (status, json) =
            send(&router, authed_get("/search/files?name=&date=2001-01-01", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_files_of_other_users_are_not_found() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let alice = register_and_login(&router, "alice@example.com").await;
        let bob = register_and_login(&router, "bob@example.com").await;

        let (status, _) = send(&router, upload_request(&alice, "file", "a.txt", "hello")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, authed_get("/files/1", &bob)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = send(&router, authed_get("/files", &bob)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let token = register_and_login(&router, "a@example.com").await;

        let (status, _) = send(&router, authed_get("/files/42", &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_bad_request() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let token = register_and_login(&router, "a@example.com").await;

        let (status, _) = send(&router, upload_request(&token, "other", "a.txt", "hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = send(&router, authed_get("/files", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_invalid_date_is_bad_request() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path()));
        let token = register_and_login(&router, "a@example.com").await;

        let (status, _) = send(&router, authed_get("/search/files?date=yesterday", &token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let dir = tempdir().unwrap();
        let state = create_test_state(dir.path());
        let limit = state.max_upload_bytes;
        let router = create_router(state);
        let token = register_and_login(&router, "a@example.com").await;

        let content = "x".repeat(limit + 32 * 1024);
        let request = upload_request(&token, "file", "big.txt", &content);
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let (status, json) = send(&router, authed_get("/files", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_at_limit_is_accepted() {
        let dir = tempdir().unwrap();
        let state = create_test_state(dir.path());
        let limit = state.max_upload_bytes;
        let router = create_router(state);
        let token = register_and_login(&router, "a@example.com").await;

        let content = "x".repeat(limit);
        let request = upload_request(&token, "file", "full.txt", &content);
        let (status, json) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["file"]["size_bytes"], limit);
    }

    #[tokio::test]
    async fn test_blob_store_failure_writes_no_metadata() {
        let dir = tempdir().unwrap();
        let mut state = create_test_state(dir.path());
        state.blobs = Arc::new(FailingBlobStore);
        let router = create_router(state);
        let token = register_and_login(&router, "a@example.com").await;

        let (status, json) = send(&router, upload_request(&token, "file", "a.txt", "hello")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Unable to upload file");

        let (status, json) = send(&router, authed_get("/files", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }
}
