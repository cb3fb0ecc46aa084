use sqlx::migrate::MigrateError;
use sqlx::PgPool;
use tracing::info;

/// Apply pending migrations from `migrations/` (tracked in `_sqlx_migrations`)
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    let migrator = sqlx::migrate!();
    info!(known = migrator.iter().count(), "Applying database migrations");
    migrator.run(pool).await?;
    info!("Database schema up to date");
    Ok(())
}
