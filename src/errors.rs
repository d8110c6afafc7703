// src/errors.rs
use thiserror::Error;

use crate::models::roster::RestrictionWarning;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Restriction warning: {}", format_warnings(.0))]
    RestrictionWarning(Vec<RestrictionWarning>),

    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote error: {0}")]
    RemoteError(String),

    #[error("League API {endpoint} returned {status}: {body}")]
    ExternalApi {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error calling {endpoint}: {source}")]
    HttpClientError {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("Failed to decode response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

fn format_warnings(warnings: &[RestrictionWarning]) -> String {
    warnings
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        AppError::RemoteError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    /// True for failures that happened on the wire or on the server, as
    /// opposed to locally detected problems.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::RemoteError(_)
                | AppError::ExternalApi { .. }
                | AppError::HttpClientError { .. }
                | AppError::Deserialization { .. }
        )
    }

    /// Warnings carried by a soft restriction violation, empty otherwise.
    pub fn warnings(&self) -> &[RestrictionWarning] {
        match self {
            AppError::RestrictionWarning(w) => w,
            _ => &[],
        }
    }

    /// Text suitable for an inline message or a dismissible notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::RestrictionWarning(w) => {
                format!("{}. Confirm to continue.", format_warnings(w))
            }
            AppError::ConfirmationRequired(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::RemoteError(msg) => msg.clone(),
            AppError::ExternalApi { status, .. } => {
                format!("The server could not process the request (HTTP {}).", status)
            }
            AppError::HttpClientError { .. } => {
                "Could not reach the server. Check your connection and retry.".to_string()
            }
            AppError::Deserialization { .. } => {
                "The server sent an unexpected response.".to_string()
            }
            AppError::ConfigurationError(_) => "The application is misconfigured.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
