use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Failed to reach the identity provider: {0}")]
    Request(#[from] reqwest::Error),

    #[error("This email is already in use.")]
    EmailInUse,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("The identity provider returned an error: {0}")]
    Provider(String),

    #[error("Failed to deserialize the identity provider response: {0}")]
    Deserialization(String),
}
