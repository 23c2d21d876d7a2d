/// Database layer
///
/// Manages the PostgreSQL connection pool and migrations. Access policies
/// live in the database itself (row-level security, see ./migrations); the
/// session context consumed by those policies is bound per operation through
/// `scope::SessionScope`.
pub mod models;
pub mod scope;

use crate::{
    config::DatabaseConfig,
    error::{ApiError, ApiResult},
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> ApiResult<PgPool> {
    info!(
        max_connections = config.max_connections,
        "connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| {
            error!("failed to connect to PostgreSQL: {}", e);
            ApiError::StorageUnavailable(format!("cannot reach database: {}", e))
        })?;

    Ok(pool)
}

/// Run migrations, embedded at compile time from ./migrations
pub async fn run_migrations(pool: &PgPool) -> ApiResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ApiError::Internal(format!("Migration failed: {}", e)))?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &PgPool) -> ApiResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}
