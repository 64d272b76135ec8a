use serde::{Deserialize, Serialize};

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// The body of `accounts:signUp` and `accounts:signInWithPassword`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// A successful sign-up or sign-in response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub local_id: String,
    pub email: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Seconds until `id_token` expires, sent as a string.
    #[serde(default)]
    pub expires_in: String,
}

/// The error envelope: `{"error": {"code": 400, "message": "EMAIL_EXISTS", ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// The signed-in user as the rest of the application sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

impl From<AuthResponse> for AuthSession {
    fn from(response: AuthResponse) -> Self {
        Self {
            uid: response.local_id,
            email: response.email,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in.parse().unwrap_or(0),
        }
    }
}
