//! API error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use wakili_types::WakiliError;

/// HTTP-facing error. Everything a handler can fail with maps onto one of
/// these; the `WK_ERR_` code stays inside the message for grepping.
#[derive(Debug)]
pub enum ApiError {
    /// 400 — request failed field validation; no state was changed.
    Validation(String),
    /// 404 — referenced provider/case/wallet does not exist.
    NotFound(String),
    /// 409 — the operation conflicts with current state (already assigned,
    /// already settled, illegal transition).
    Conflict(String),
    /// 502 — the payment gateway refused or failed.
    Gateway(String),
    /// 500 — anything else.
    Internal(String),
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<WakiliError> for ApiError {
    fn from(err: WakiliError) -> Self {
        let message = err.to_string();
        match err {
            WakiliError::Validation { .. }
            | WakiliError::RatingOutOfRange { .. }
            | WakiliError::NonPositiveAmount { .. } => Self::Validation(message),

            WakiliError::ProviderNotFound(_)
            | WakiliError::ProviderNotRegistered(_)
            | WakiliError::CaseNotFound(_)
            | WakiliError::WalletNotFound(_) => Self::NotFound(message),

            WakiliError::ProviderAlreadyRegistered(_)
            | WakiliError::CaseAlreadyAssigned(_)
            | WakiliError::InvalidCaseTransition { .. }
            | WakiliError::WrongAssignee { .. }
            | WakiliError::CaseAlreadySettled(_) => Self::Conflict(message),

            WakiliError::GatewayAuth { .. }
            | WakiliError::GatewayRequest { .. }
            | WakiliError::GatewayResponseMalformed { .. } => Self::Gateway(message),

            _ => Self::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            Self::Gateway(msg) => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };
        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;
