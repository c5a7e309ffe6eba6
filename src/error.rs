use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Problems with the database configuration, detected before any I/O happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable \"DBMODE\" is required [local, aws]")]
    MissingMode,
    #[error("Environment variable \"DBMODE\" has unsupported value \"{0}\" [local, aws]")]
    InvalidMode(String),
    #[error("Environment variable \"{0}\" is required")]
    MissingKey(&'static str),
    #[error("Environment variable \"{key}\" has invalid value \"{value}\"")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to generate database auth token: {0}")]
    TokenSigning(String),
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("Database query error: {0}")]
    Query(#[source] sqlx::Error),
    #[error("Authentication failed")]
    AuthError,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Config(e) => {
                tracing::error!(error = %e, "Database configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::TokenSigning(e) => {
                tracing::error!(error = %e, "Auth token signing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::Connection(e) => {
                tracing::error!(error = %e, "Database connection error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::Query(e) => {
                tracing::error!(error = %e, "Database query error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Conflict(msg) => {
                tracing::debug!(message = %msg, "Conflict");
                (StatusCode::CONFLICT, msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
