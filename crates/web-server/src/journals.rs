//! Which journal a request works on.

use crate::{error::AppError, AppState};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use configuration::LedgerConfig;
use database::KeyValueStore;
use identity::AuthSession;
use journal::Journal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// Opens journals on demand: one shared journal for local mode, one per signed-in account.
pub struct Journals {
    storage: Arc<dyn KeyValueStore>,
    ledger: LedgerConfig,
    local: OnceCell<Journal>,
    accounts: RwLock<HashMap<String, Journal>>,
}

impl Journals {
    pub fn new(storage: Arc<dyn KeyValueStore>, ledger: LedgerConfig) -> Self {
        Self {
            storage,
            ledger,
            local: OnceCell::new(),
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// The single-user journal under the plain `trades` and `notes` keys.
    pub async fn local(&self) -> Journal {
        self.local
            .get_or_init(|| Journal::open(self.storage.clone(), &self.ledger))
            .await
            .clone()
    }

    /// The journal owned by `uid`, loaded from storage the first time it is asked for.
    pub async fn for_account(&self, uid: &str) -> Journal {
        if let Some(journal) = self.accounts.read().await.get(uid) {
            return journal.clone();
        }

        let mut accounts = self.accounts.write().await;
        // Another request may have opened it while we waited for the lock.
        if let Some(journal) = accounts.get(uid) {
            return journal.clone();
        }
        let journal = Journal::open_for_account(self.storage.clone(), &self.ledger, uid).await;
        tracing::info!(uid = %uid, "Opened account journal.");
        accounts.insert(uid.to_string(), journal.clone());
        journal
    }
}

/// Extracts the caller's journal: the session's account journal when signed in,
/// otherwise the local one.
pub struct UserJournal(pub Journal);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for UserJournal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let journal = match parts.extensions.get::<AuthSession>() {
            Some(session) => state.journals.for_account(&session.uid).await,
            None if state.identity.is_some() => return Err(AppError::Unauthorized),
            None => state.journals.local().await,
        };
        Ok(UserJournal(journal))
    }
}
