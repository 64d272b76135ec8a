use database::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// What reading a collection from storage produced.
pub(crate) enum Loaded<T> {
    Found(Vec<T>),
    /// The key has never been written.
    Missing,
    /// The read failed or the document did not parse; already logged.
    Unreadable,
}

pub(crate) async fn load_collection<T: DeserializeOwned>(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Loaded<T> {
    match storage.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => Loaded::Found(items),
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored collection is not valid JSON; ignoring it.");
                Loaded::Unreadable
            }
        },
        Ok(None) => Loaded::Missing,
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to read collection from storage.");
            Loaded::Unreadable
        }
    }
}

/// Writes the whole collection. Failures are logged and swallowed: the in-memory
/// state stays authoritative and the next successful write catches storage up.
pub(crate) async fn persist_collection<T: Serialize>(
    storage: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) {
    let raw = match serde_json::to_string(items) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to serialize collection.");
            return;
        }
    };
    if let Err(e) = storage.set(key, &raw).await {
        tracing::error!(key, error = %e, "Failed to persist collection; continuing in memory.");
    }
}
