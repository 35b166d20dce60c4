//! Typed errors and HTTP mapping.

use crate::service::ValidationError;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Body is not JSON, or not the JSON shape the endpoint takes.
    #[error("{0}")]
    Malformed(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("method {0} not supported")]
    MethodNotSupported(String),
    #[error("request body exceeds the size limit")]
    PayloadTooLarge,
    #[error("password hashing: {0}")]
    Password(#[from] bcrypt::BcryptError),
    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// `no {label} with {key}={id}`
    pub fn no_such(label: &str, key: &str, id: i64) -> Self {
        AppError::NotFound(format!("no {} with {}={}", label, key, id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::Malformed(_)
            | AppError::BadRequest(_)
            | AppError::MethodNotSupported(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Store(StoreError::Constraint(_)) => StatusCode::BAD_REQUEST,
            // Deleted by a concurrent request between read and write.
            AppError::Store(StoreError::Missing(_)) => StatusCode::NOT_FOUND,
            AppError::Password(_) | AppError::Blocking(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
