//! # Tradebook Journal
//!
//! The journal's state containers: the trade ledger and the analysis notes.
//!
//! Both stores keep their list in memory, newest first, and write the whole list
//! back to storage after every mutation. Storage failures are logged and never
//! surface to callers; the in-memory list stays authoritative.
//!
//! `Journal` bundles the two stores so it can be handed to whoever needs it instead of
//! living in a global. Each signed-in account gets its own `Journal` over its own keys.

pub mod ledger;
pub mod notes;
mod persist;
pub mod sample;

pub use ledger::{LedgerStore, TRADES_KEY};
pub use notes::{NOTES_KEY, NotesStore};
pub use sample::sample_trades;

use configuration::LedgerConfig;
use database::KeyValueStore;
use std::sync::Arc;

/// The injectable journal context. Cloning is cheap and shares the same stores.
#[derive(Clone)]
pub struct Journal {
    ledger: Arc<LedgerStore>,
    notes: Arc<NotesStore>,
}

impl Journal {
    /// Loads both stores from `storage` under the shared `trades` and `notes` keys.
    pub async fn open(storage: Arc<dyn KeyValueStore>, config: &LedgerConfig) -> Self {
        let ledger = LedgerStore::load(storage.clone(), config.seed_sample_trades).await;
        let notes = NotesStore::load(storage).await;
        Self::from_stores(ledger, notes)
    }

    /// Loads the journal owned by the account `uid`. Its documents live under their own
    /// keys, so accounts sharing one storage backend never see each other's data.
    pub async fn open_for_account(
        storage: Arc<dyn KeyValueStore>,
        config: &LedgerConfig,
        uid: &str,
    ) -> Self {
        let ledger = LedgerStore::load_at(
            storage.clone(),
            account_key(TRADES_KEY, uid),
            config.seed_sample_trades,
        )
        .await;
        let notes = NotesStore::load_at(storage, account_key(NOTES_KEY, uid)).await;
        Self::from_stores(ledger, notes)
    }

    fn from_stores(ledger: LedgerStore, notes: NotesStore) -> Self {
        Self {
            ledger: Arc::new(ledger),
            notes: Arc::new(notes),
        }
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn notes(&self) -> &NotesStore {
        &self.notes
    }
}

/// The storage key of `base` for one account, e.g. `trades_<uid>`.
///
/// Characters outside the storage key alphabet are hex-escaped so distinct uids never collide.
pub fn account_key(base: &str, uid: &str) -> String {
    let mut key = format!("{}_", base);
    for c in uid.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c);
        } else {
            for byte in c.to_string().bytes() {
                key.push_str(&format!("-{:02x}", byte));
            }
        }
    }
    key
}
