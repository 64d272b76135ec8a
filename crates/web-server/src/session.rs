//! In-memory sign-in sessions and the middleware that gates the journal routes.

use crate::{error::AppError, AppState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use identity::AuthSession;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

struct SessionEntry {
    session: AuthSession,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Provider sessions keyed by the opaque bearer token handed to the client.
///
/// A token lives as long as the provider's id token (`expires_in` seconds).
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `session` and returns its new bearer token. Expired sessions are swept first.
    pub async fn insert(&self, session: AuthSession) -> String {
        let token = Uuid::new_v4().to_string();
        let now = Instant::now();
        let entry = SessionEntry {
            expires_at: now + Duration::from_secs(session.expires_in),
            session,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.is_live(now));
        sessions.insert(token.clone(), entry);
        token
    }

    /// The live session behind `token`. An expired session is dropped.
    pub async fn get(&self, token: &str) -> Option<AuthSession> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(entry) if entry.is_live(now) => return Some(entry.session.clone()),
                Some(_) => {}
            }
        }
        if let Some(entry) = self.sessions.write().await.remove(token) {
            tracing::debug!(uid = %entry.session.uid, "Session expired.");
        }
        None
    }

    pub async fn remove(&self, token: &str) -> Option<AuthSession> {
        self.sessions.write().await.remove(token).map(|entry| entry.session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(request_headers: &axum::http::HeaderMap) -> Option<&str> {
    request_headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a live session. Open when no identity provider is configured.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.identity.is_none() {
        return Ok(next.run(request).await);
    }

    let session = match bearer_token(request.headers()) {
        Some(token) => state.sessions.get(token).await,
        None => None,
    };
    let Some(session) = session else {
        tracing::debug!(path = %request.uri().path(), "Rejected request without a valid session.");
        return Err(AppError::Unauthorized);
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn session(uid: &str, expires_in: u64) -> AuthSession {
        AuthSession {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in,
        }
    }

    #[tokio::test]
    async fn tokens_are_unique_and_removable() {
        let store = SessionStore::new();
        let first = store.insert(session("a", 3600)).await;
        let second = store.insert(session("a", 3600)).await;
        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);

        assert_eq!(store.remove(&first).await.map(|s| s.uid), Some("a".to_string()));
        assert!(store.get(&first).await.is_none());
        assert!(store.get(&second).await.is_some());
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected_and_dropped() {
        let store = SessionStore::new();
        let stale = store.insert(session("a", 0)).await;

        assert!(store.get(&stale).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn insert_sweeps_expired_sessions() {
        let store = SessionStore::new();
        store.insert(session("a", 0)).await;
        store.insert(session("b", 0)).await;
        let live = store.insert(session("c", 3600)).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&live).await.map(|s| s.uid), Some("c".to_string()));
    }

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
