//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to create the shared SQLx pool and make sure the
//! PostGIS extension and `feature` table exist before accepting traffic.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::Config;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let options = PgPoolOptions::new().max_connections(config.db_max_connections);

    let pool = if let Some(url) = &config.database_url {
        info!(max_connections = config.db_max_connections, "connecting to database via DATABASE_URL");
        options.connect(url).await?
    } else {
        info!(
            user = %config.pg.user,
            host = %config.pg.host,
            port = config.pg.port,
            database = %config.pg.database,
            max_connections = config.db_max_connections,
            "connecting to database"
        );
        options.connect_with(config.pg.connect_options()).await?
    };

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
