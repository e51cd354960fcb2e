use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single rule violation addressed by its dotted field path (`model.data.rows.1.firstUnit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub path: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid payload: {} issue(s)", .0.len())]
    InvalidFields(Vec<FieldIssue>),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            issues: Vec<FieldIssue>,
        }

        let (status, error_message, details, issues) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(err.to_string()),
                Vec::new(),
            ),
            AppError::InvalidFields(issues) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                None,
                issues,
            ),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None, Vec::new()),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(format!("{:#?}", err)),
                Vec::new(),
            ),
            AppError::BadGateway(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Bad Gateway: {}", msg),
                None,
                Vec::new(),
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
                Vec::new(),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
                issues,
            }),
        )
            .into_response()
    }
}
