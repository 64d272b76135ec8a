use crate::persist::{Loaded, load_collection, persist_collection};
use crate::sample::sample_trades;
use core_types::Trade;
use database::KeyValueStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage key of the trade ledger.
pub const TRADES_KEY: &str = "trades";

/// The ordered trade ledger, newest first, mirrored to storage after every change.
///
/// The ledger is the sole owner of trade identity. Trades are never edited in place;
/// they are only added or deleted.
pub struct LedgerStore {
    trades: RwLock<Vec<Trade>>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl LedgerStore {
    /// Loads the ledger from storage.
    ///
    /// When storage has no ledger yet and `seed_sample_trades` is set, the sample ledger
    /// is installed and written back immediately. When storage cannot be read (or holds
    /// garbage) the seed, or an empty list, is kept in memory only and the next mutation
    /// overwrites storage.
    pub async fn load(storage: Arc<dyn KeyValueStore>, seed_sample_trades: bool) -> Self {
        Self::load_at(storage, TRADES_KEY, seed_sample_trades).await
    }

    /// Like `load`, but reads and writes the ledger under `key`.
    pub async fn load_at(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        seed_sample_trades: bool,
    ) -> Self {
        let key = key.into();
        let seed = || {
            if seed_sample_trades {
                sample_trades()
            } else {
                Vec::new()
            }
        };

        let trades = match load_collection::<Trade>(storage.as_ref(), &key).await {
            Loaded::Found(trades) => trades,
            Loaded::Missing => {
                let trades = seed();
                if !trades.is_empty() {
                    tracing::info!(key = %key, count = trades.len(), "Seeding empty ledger with sample trades.");
                    persist_collection(storage.as_ref(), &key, trades.as_slice()).await;
                }
                trades
            }
            Loaded::Unreadable => seed(),
        };

        tracing::debug!(key = %key, count = trades.len(), "Ledger loaded.");
        Self {
            trades: RwLock::new(trades),
            storage,
            key,
        }
    }

    /// A snapshot of the ledger, newest first.
    pub async fn trades(&self) -> Vec<Trade> {
        self.trades.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.trades.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trades.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<Trade> {
        self.trades.read().await.iter().find(|t| t.id == id).cloned()
    }

    /// The `n` most recently added trades.
    pub async fn recent(&self, n: usize) -> Vec<Trade> {
        self.trades.read().await.iter().take(n).cloned().collect()
    }

    /// Prepends `trade` and persists the ledger. Validation is the caller's job.
    pub async fn add_trade(&self, trade: Trade) {
        let mut trades = self.trades.write().await;
        tracing::info!(trade_id = %trade.id, instrument = %trade.instrument, "Trade added.");
        trades.insert(0, trade);
        persist_collection(self.storage.as_ref(), &self.key, trades.as_slice()).await;
    }

    /// Removes the trade with `id`. Returns `false`, touching nothing, when no such trade exists.
    pub async fn delete_trade(&self, id: &str) -> bool {
        let mut trades = self.trades.write().await;
        let before = trades.len();
        trades.retain(|t| t.id != id);
        if trades.len() == before {
            return false;
        }
        tracing::info!(trade_id = %id, "Trade deleted.");
        persist_collection(self.storage.as_ref(), &self.key, trades.as_slice()).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingStore, stored_len};
    use chrono::Utc;
    use core_types::TradeType;
    use database::MemoryStore;
    use rust_decimal_macros::dec;

    fn trade(id: &str) -> Trade {
        Trade::new("ES", TradeType::Long, dec!(5000), dec!(1), Utc::now())
            .with_id(id)
            .with_exit(dec!(5010), Some(Utc::now()))
    }

    #[tokio::test]
    async fn empty_storage_is_seeded_and_persisted() {
        let storage = Arc::new(MemoryStore::new());
        let ledger = LedgerStore::load(storage.clone(), true).await;

        assert_eq!(ledger.trades().await, sample_trades());
        assert_eq!(stored_len(storage.as_ref(), TRADES_KEY).await, Some(5));
    }

    #[tokio::test]
    async fn seeding_disabled_starts_empty_without_writing() {
        let storage = Arc::new(MemoryStore::new());
        let ledger = LedgerStore::load(storage.clone(), false).await;

        assert!(ledger.is_empty().await);
        assert_eq!(storage.get(TRADES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stored_ledger_is_not_reseeded() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(TRADES_KEY, "[]").await.unwrap();

        let ledger = LedgerStore::load(storage.clone(), true).await;
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn add_prepends_and_reload_round_trips() {
        let storage = Arc::new(MemoryStore::new());
        let ledger = LedgerStore::load(storage.clone(), false).await;

        ledger.add_trade(trade("a")).await;
        ledger.add_trade(trade("b").with_notes("faded the open")).await;

        let ids: Vec<String> = ledger.trades().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let reloaded = LedgerStore::load(storage, true).await;
        assert_eq!(reloaded.trades().await, ledger.trades().await);
    }

    #[tokio::test]
    async fn deleting_unknown_id_changes_nothing() {
        let storage = Arc::new(MemoryStore::new());
        let ledger = LedgerStore::load(storage.clone(), true).await;
        let before = ledger.trades().await;

        assert!(!ledger.delete_trade("does-not-exist").await);
        assert_eq!(ledger.trades().await, before);
        assert_eq!(stored_len(storage.as_ref(), TRADES_KEY).await, Some(before.len()));
    }

    #[tokio::test]
    async fn delete_removes_and_persists() {
        let storage = Arc::new(MemoryStore::new());
        let ledger = LedgerStore::load(storage.clone(), true).await;

        assert!(ledger.delete_trade("3").await);
        assert!(ledger.get("3").await.is_none());
        assert_eq!(ledger.len().await, 4);
        assert_eq!(stored_len(storage.as_ref(), TRADES_KEY).await, Some(4));
    }

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let ledger = LedgerStore::load(Arc::new(MemoryStore::new()), true).await;
        ledger.add_trade(trade("new")).await;

        let recent: Vec<String> = ledger.recent(3).await.into_iter().map(|t| t.id).collect();
        assert_eq!(recent, vec!["new", "1", "2"]);
    }

    #[tokio::test]
    async fn unreadable_storage_falls_back_to_seed_in_memory() {
        let ledger = LedgerStore::load(Arc::new(FailingStore), true).await;
        assert_eq!(ledger.len().await, 5);

        // Writes fail too, but the in-memory ledger keeps working.
        ledger.add_trade(trade("x")).await;
        assert_eq!(ledger.len().await, 6);
        assert!(ledger.delete_trade("x").await);
    }

    #[tokio::test]
    async fn corrupt_document_is_left_until_next_write() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(TRADES_KEY, "{not json").await.unwrap();

        let ledger = LedgerStore::load(storage.clone(), true).await;
        assert_eq!(ledger.len().await, 5);
        assert_eq!(storage.get(TRADES_KEY).await.unwrap().as_deref(), Some("{not json"));

        ledger.add_trade(trade("fresh")).await;
        assert_eq!(stored_len(storage.as_ref(), TRADES_KEY).await, Some(6));
    }
}
