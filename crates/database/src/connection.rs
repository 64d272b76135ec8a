use crate::error::DbError;
use crate::file_store::FileStore;
use crate::memory_store::MemoryStore;
use crate::repository::PgStore;
use crate::store::KeyValueStore;
use configuration::{StorageBackend, StorageConfig};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// Reads `DATABASE_URL` from the environment (a `.env` file is honoured when present)
/// and returns a pool that can be shared across the entire application.
pub async fn connect() -> Result<PgPool, DbError> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations so the `kv_store` table exists.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Opens the storage backend selected in the configuration.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, DbError> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.data_dir)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Postgres => {
            let pool = connect().await?;
            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
    };
    tracing::info!(storage = %store.describe(), "Opened journal storage.");
    Ok(store)
}
