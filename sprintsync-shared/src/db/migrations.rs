/// Database migration runner
///
/// This module applies the SQL migrations embedded from the crate's
/// `migrations/` directory at startup, so a fresh database is fully
/// schema'd before the server accepts requests.
///
/// # Migration Files
///
/// Each migration is a single forward-only `{version}_{name}.sql` file.
///
/// # Example
///
/// ```no_run
/// use sprintsync_shared::db::pool::{create_pool, DatabaseConfig};
/// use sprintsync_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// }).await?;
///
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Migrations that have already been applied are skipped; each new one
/// runs inside a transaction and a failure rolls it back.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the migrations
/// table cannot be accessed
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
