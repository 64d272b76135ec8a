use crate::persist::{Loaded, load_collection, persist_collection};
use core_types::Note;
use database::KeyValueStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage key of the analysis notes.
pub const NOTES_KEY: &str = "notes";

/// Analysis notes, newest first, mirrored to storage after every change.
pub struct NotesStore {
    notes: RwLock<Vec<Note>>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl NotesStore {
    /// Loads the notes from storage. Missing or unreadable storage starts an empty list.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::load_at(storage, NOTES_KEY).await
    }

    /// Like `load`, but reads and writes the notes under `key`.
    pub async fn load_at(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let notes = match load_collection::<Note>(storage.as_ref(), &key).await {
            Loaded::Found(notes) => notes,
            Loaded::Missing | Loaded::Unreadable => Vec::new(),
        };
        Self {
            notes: RwLock::new(notes),
            storage,
            key,
        }
    }

    pub async fn notes(&self) -> Vec<Note> {
        self.notes.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Note> {
        self.notes.read().await.iter().find(|n| n.id == id).cloned()
    }

    pub async fn add_note(&self, note: Note) {
        let mut notes = self.notes.write().await;
        tracing::info!(note_id = %note.id, "Note added.");
        notes.insert(0, note);
        persist_collection(self.storage.as_ref(), &self.key, notes.as_slice()).await;
    }

    /// Replaces the note with the same id, keeping its position.
    ///
    /// Returns `false` without inserting anything when no note has that id.
    pub async fn update_note(&self, note: Note) -> bool {
        let mut notes = self.notes.write().await;
        let Some(slot) = notes.iter_mut().find(|n| n.id == note.id) else {
            return false;
        };
        tracing::info!(note_id = %note.id, "Note updated.");
        *slot = note;
        persist_collection(self.storage.as_ref(), &self.key, notes.as_slice()).await;
        true
    }

    pub async fn delete_note(&self, id: &str) -> bool {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return false;
        }
        tracing::info!(note_id = %id, "Note deleted.");
        persist_collection(self.storage.as_ref(), &self.key, notes.as_slice()).await;
        true
    }
}
