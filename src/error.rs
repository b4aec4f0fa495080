use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("caller identity missing or malformed")]
    Unauthorized,

    #[error("you cannot deliver your own request")]
    SelfDelivery,

    #[error("request {0} not found")]
    RequestNotFound(Uuid),

    #[error("request already claimed or no longer available")]
    AlreadyClaimed,

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("incorrect or inactive handoff code")]
    InvalidOtp,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::SelfDelivery => StatusCode::FORBIDDEN,
            AppError::RequestNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyClaimed => StatusCode::CONFLICT,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::InvalidOtp => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
