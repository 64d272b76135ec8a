use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::FieldErrors;
use identity::error::IdentityError;
use insights::error::InsightsError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("Insights error: {0}")]
    Insights(#[from] InsightsError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(fields) => {
                let body = Json(json!({ "error": "Validation failed", "fields": fields }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AppError::NotConfigured(service) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("The {} service is not configured", service),
            ),
            AppError::Identity(identity_err) => match identity_err {
                IdentityError::EmailInUse => (StatusCode::CONFLICT, IdentityError::EmailInUse.to_string()),
                IdentityError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    IdentityError::InvalidCredentials.to_string(),
                ),
                other => {
                    tracing::error!(error = ?other, "Identity provider error.");
                    (
                        StatusCode::BAD_GATEWAY,
                        "The identity provider could not complete the request".to_string(),
                    )
                }
            },
            AppError::Insights(insights_err) => {
                tracing::error!(error = ?insights_err, "Insights error.");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to analyze trade patterns".to_string(),
                )
            }
            AppError::Analytics(analytics_err) => {
                tracing::error!(error = ?analytics_err, "Analytics error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during analysis".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
