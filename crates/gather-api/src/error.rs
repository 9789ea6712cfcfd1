use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use gather_core::Error;

/// HTTP surface for domain errors. Each variant maps to its own status so
/// callers can tell causes apart.
pub enum ApiError {
    Domain(Error),
    Validation(String),
    Unauthorized,
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid credentials".into()),
            Self::Domain(err) => match &err {
                Error::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                Error::DuplicateRequest | Error::SelfRequest | Error::Conflict => {
                    (StatusCode::CONFLICT, err.to_string())
                }
                Error::NotificationFailed => (StatusCode::BAD_GATEWAY, err.to_string()),
                Error::Storage(e) => {
                    error!("Storage error: {:#}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
