use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key '{0}': only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),
}
