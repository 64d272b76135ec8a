use crate::error::IdentityError;
use async_trait::async_trait;
use configuration::IdentityConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{AuthResponse, AuthSession, ErrorBody, ErrorEnvelope};
use responses::PasswordRequest;

/// The generic interface to a third-party identity provider.
///
/// The journal never checks passwords itself: it forwards credentials and keeps
/// the session the provider hands back.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and signs it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    /// Ends a session. Provider tokens simply expire, so by default there is nothing to call.
    async fn sign_out(&self, _session: &AuthSession) -> Result<(), IdentityError> {
        Ok(())
    }
}

/// An `IdentityProvider` backed by the Firebase Identity Toolkit REST API.
#[derive(Clone)]
pub struct FirebaseIdentity {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirebaseIdentity {
    /// Creates a new `FirebaseIdentity`.
    ///
    /// Returns `None` if no API key is configured, allowing the service to run
    /// without sign-in.
    pub fn new(config: &IdentityConfig) -> Option<Self> {
        if config.api_key.is_empty() {
            tracing::warn!("Identity provider is not configured (missing api_key); sign-in is disabled.");
            return None;
        }
        Some(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_password<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<T, IdentityError> {
        let url = format!("{}/accounts:{}", self.base_url, endpoint);
        let payload = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| IdentityError::Deserialization(e.to_string()))
        } else {
            let envelope: ErrorEnvelope = serde_json::from_str(&text).map_err(|e| {
                IdentityError::Deserialization(format!(
                    "Failed to deserialize error response: {}. Original text: {}",
                    e, text
                ))
            })?;
            Err(map_provider_error(&envelope.error.message))
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let response: AuthResponse = self.post_password("signUp", email, password).await?;
        tracing::info!(uid = %response.local_id, "Account created.");
        Ok(response.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let response: AuthResponse = self
            .post_password("signInWithPassword", email, password)
            .await?;
        tracing::info!(uid = %response.local_id, "Signed in.");
        Ok(response.into())
    }
}

/// Maps a provider error code to the error the user should see.
///
/// Codes may carry a detail suffix, e.g. `WEAK_PASSWORD : Password should be at least 6 characters`.
pub fn map_provider_error(message: &str) -> IdentityError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" => {
            IdentityError::InvalidCredentials
        }
        _ => IdentityError::Provider(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{StatusCode, Uri};
    use std::sync::{Arc, Mutex};

    /// Serves `body` with `status` for every request on a local port and records each request URI.
    async fn stub_server(status: StatusCode, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = seen.clone();
        let app = Router::new().fallback(move |uri: Uri| {
            let recorded = recorded.clone();
            async move {
                recorded.lock().unwrap().push(uri.to_string());
                (status, body)
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{}", addr), seen)
    }

    fn provider_at(base: &str) -> FirebaseIdentity {
        FirebaseIdentity::new(&IdentityConfig {
            api_key: "key".to_string(),
            base_url: format!("{}/v1", base),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sign_in_returns_the_provider_session() {
        let (base, seen) = stub_server(
            StatusCode::OK,
            r#"{"localId":"uid-7","email":"trader@example.com","idToken":"id","refreshToken":"r","expiresIn":"3600"}"#,
        )
        .await;

        let session = provider_at(&base)
            .sign_in("trader@example.com", "hunter22")
            .await
            .unwrap();

        assert_eq!(session.uid, "uid-7");
        assert_eq!(session.expires_in, 3600);
        assert_eq!(
            *seen.lock().unwrap(),
            ["/v1/accounts:signInWithPassword?key=key"]
        );
    }

    #[tokio::test]
    async fn provider_error_codes_reach_the_caller() {
        let (base, seen) = stub_server(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#,
        )
        .await;

        let result = provider_at(&base).sign_up("trader@example.com", "hunter22").await;

        assert!(matches!(result, Err(IdentityError::EmailInUse)));
        assert_eq!(*seen.lock().unwrap(), ["/v1/accounts:signUp?key=key"]);
    }

    #[tokio::test]
    async fn unreadable_error_body_is_a_deserialization_error() {
        let (base, _) = stub_server(StatusCode::INTERNAL_SERVER_ERROR, "oops").await;

        let result = provider_at(&base).sign_in("trader@example.com", "hunter22").await;

        match result {
            Err(IdentityError::Deserialization(message)) => assert!(message.contains("oops")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn known_codes_map_to_user_facing_errors() {
        assert!(matches!(map_provider_error("EMAIL_EXISTS"), IdentityError::EmailInUse));
        for code in ["INVALID_LOGIN_CREDENTIALS", "EMAIL_NOT_FOUND", "INVALID_PASSWORD"] {
            assert!(matches!(map_provider_error(code), IdentityError::InvalidCredentials));
        }
    }

    #[test]
    fn detail_suffix_is_kept_for_unknown_codes() {
        match map_provider_error("WEAK_PASSWORD : Password should be at least 6 characters") {
            IdentityError::Provider(message) => assert!(message.starts_with("WEAK_PASSWORD")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_api_key_disables_the_provider() {
        assert!(FirebaseIdentity::new(&IdentityConfig::default()).is_none());

        let config = IdentityConfig {
            api_key: "key".to_string(),
            base_url: "https://identity.example.com/v1/".to_string(),
        };
        let provider = FirebaseIdentity::new(&config).unwrap();
        assert_eq!(provider.base_url, "https://identity.example.com/v1");
    }

    #[test]
    fn auth_response_becomes_session() {
        let raw = r#"{
            "kind": "identitytoolkit#SignupNewUserResponse",
            "idToken": "id-token",
            "email": "trader@example.com",
            "refreshToken": "refresh",
            "expiresIn": "3600",
            "localId": "uid-1"
        }"#;
        let response: AuthResponse = serde_json::from_str(raw).unwrap();
        let session = AuthSession::from(response);

        assert_eq!(session.uid, "uid-1");
        assert_eq!(session.expires_in, 3600);
    }

    #[test]
    fn error_envelope_parses() {
        let raw = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[]}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.error.code, 400);
        assert!(matches!(
            map_provider_error(&envelope.error.message),
            IdentityError::InvalidCredentials
        ));
    }
}
