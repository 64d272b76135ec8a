use crate::error::DbError;
use async_trait::async_trait;

/// A durable string-to-string map: the persistence seam of the journal.
///
/// Each key holds one complete document; a `set` replaces the previous value.
/// Implementations are shared across request handlers, hence `Send + Sync`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, DbError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError>;

    /// A short human-readable description for logs, e.g. `file:data`.
    fn describe(&self) -> String;
}

/// Keys double as file names in the file backend, so they are kept to a safe alphabet.
pub(crate) fn check_key(key: &str) -> Result<(), DbError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::InvalidKey(key.to_string()))
    }
}
