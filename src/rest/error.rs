//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tickets::TicketError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found
    NotFound(String),
    /// Validation error
    ValidationError(String),
    /// Workflow refused the requested state change
    TransitionRejected(String),
    /// Resource state conflicts with the request
    Conflict(String),
    /// Internal server error
    InternalError(String),
    /// Bad request
    BadRequest(String),
}

/// Error response body
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::TransitionRejected(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "transition_rejected", msg)
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        let message = err.to_string();
        match err {
            TicketError::NotFound(_) => ApiError::NotFound(message),
            TicketError::Rejected(_) => ApiError::TransitionRejected(message),
            TicketError::EmptyTitle | TicketError::InvalidRating(_) => {
                ApiError::ValidationError(message)
            }
            TicketError::NotRateable(_) | TicketError::AlreadyRated(_) => {
                ApiError::Conflict(message)
            }
            TicketError::Io(_) | TicketError::Serialization(_) => {
                tracing::error!(error = %message, "Ticket store failure");
                ApiError::InternalError(message)
            }
        }
    }
}
