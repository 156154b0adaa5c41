use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Lecture not found: {0}")]
    NotFound(String),

    #[error("Lecture {0} has no Korean original yet")]
    NotPublished(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("File exceeds the {limit_gb}GB upload limit")]
    FileTooLarge { limit_gb: u64 },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::NotFound(_) | PortalError::NotPublished(_) => StatusCode::NOT_FOUND,
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PortalError::Unauthorized => StatusCode::UNAUTHORIZED,
            PortalError::Storage(_) => StatusCode::BAD_GATEWAY,
            PortalError::Database(_) | PortalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PortalError::NotFound(_) => "NOT_FOUND",
            PortalError::NotPublished(_) => "NOT_PUBLISHED",
            PortalError::Validation(_) => "VALIDATION_FAILED",
            PortalError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            PortalError::Unauthorized => "UNAUTHORIZED",
            PortalError::Storage(_) => "STORAGE_FAILED",
            PortalError::Database(_) => "DATABASE_FAILED",
            PortalError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to end users. Upstream failures are reported as a
    /// generic retry hint and only logged in full.
    pub fn public_message(&self) -> String {
        match self {
            PortalError::Storage(_) | PortalError::Database(_) | PortalError::Internal(_) => {
                "일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn log(&self) {
        match self.status() {
            status if status.is_server_error() => tracing::error!("{} ({})", self, status),
            status => tracing::warn!("{} ({})", self, status),
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
