use crate::error::DbError;
use crate::store::{KeyValueStore, check_key};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// A `KeyValueStore` keeping one `<key>.json` file per key inside a directory.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a crash
/// mid-write leaves either the old document or the new one, never a torn file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DbError> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;

        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "Wrote storage key.");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("trades").await.unwrap(), None);
    }

    #[tokio::test]
    async fn writes_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("journal");

        FileStore::new(&nested).set("trades", r#"[{"id":"1"}]"#).await.unwrap();

        let reopened = FileStore::new(&nested);
        assert_eq!(
            reopened.get("trades").await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
        assert!(nested.join("trades.json").exists());
        assert!(!nested.join("trades.json.tmp").exists());
    }

    #[tokio::test]
    async fn set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("notes", "[]").await.unwrap();
        store.set("notes", "[\"x\"]").await.unwrap();
        assert_eq!(store.get("notes").await.unwrap().as_deref(), Some("[\"x\"]"));
        assert_eq!(store.get("trades").await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_traversal_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let result = store.set("../escape", "{}").await;
        assert!(matches!(result, Err(DbError::InvalidKey(_))));
    }
}
