// --- Server defaults ---

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default maximum size of an uploaded file (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 << 20;

/// Maximum number of pooled database connections.
pub const DB_MAX_CONNECTIONS: u32 = 20;

// --- Uploads ---

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Content type recorded when the client sends none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Route prefix under which stored blobs are served.
pub const BLOB_ROUTE: &str = "/uploads";

// --- Validation limits ---

/// Maximum allowed length of an email address (in characters).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length of a password in bytes (bcrypt truncates beyond 72 bytes).
pub const MAX_PASSWORD_LENGTH: usize = 72;
