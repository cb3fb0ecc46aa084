pub mod files;
pub mod migrate;
pub mod types;
pub mod users;

pub use sqlx::postgres::PgPool;
pub use types::*;
