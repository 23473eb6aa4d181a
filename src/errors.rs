use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Message returned to clients when the provider lookup fails.
pub const UPSTREAM_ERROR_MESSAGE: &str = "Failed to fetch cafes";

/// Application-specific error types.
///
/// Every variant is terminal for the request: nothing is retried and no
/// partial result list is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Malformed ZIP or unusable coordinates. No network call was made.
    InvalidInput(String),
    /// A required setting (the provider credential) is missing.
    Configuration(String),
    /// Geocoding or nearby search failed; the message carries the provider status.
    Upstream(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream lookup failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response with a `{error, details?}` body.
    ///
    /// Logs errors according to their severity.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::InvalidInput(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                json!({ "error": msg })
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                json!({ "error": msg })
            }
            AppError::Upstream(details) => {
                tracing::error!("Upstream error: {}", details);
                json!({
                    "error": UPSTREAM_ERROR_MESSAGE,
                    "details": details,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Transport and decoding failures abort the request as upstream errors.
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Upstream(format!("Failed to build provider URL: {}", err))
    }
}
