use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use fellowship_auth::AuthzError;
use fellowship_core::{DomainError, FieldViolation};
use fellowship_infra::StoreError;

/// Constant message for every 403, so a denial never says anything about the target.
const FORBIDDEN_MESSAGE: &str = "you do not have access to this resource";

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    InvalidTransition(String),

    #[error("validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("{0}")]
    InvariantViolation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldViolation>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidTransition(_) | ApiError::Validation(_) | ApiError::InvariantViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound => "not_found",
            ApiError::InvalidTransition(_) => "invalid_transition",
            ApiError::Validation(_) => "validation_failed",
            ApiError::InvariantViolation(_) => "invariant_violation",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            ApiError::Forbidden => (FORBIDDEN_MESSAGE.to_string(), None),
            ApiError::Validation(fields) => ("validation failed".to_string(), Some(fields)),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ("An internal error occurred".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        (status, Json(ErrorResponse { error: code, message, details })).into_response()
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthenticated,
            AuthzError::Forbidden(_) => ApiError::Forbidden,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(v) => ApiError::Validation(v.fields().to_vec()),
            e @ DomainError::InvalidTransition { .. } => ApiError::InvalidTransition(e.to_string()),
            DomainError::InvariantViolation(msg) => ApiError::InvariantViolation(msg),
            // Ids only come from request paths; a malformed one names no record.
            DomainError::InvalidId(_) | DomainError::NotFound => ApiError::NotFound,
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Rejected(e) => e.into(),
            StoreError::Unavailable(msg) => ApiError::Internal(anyhow::anyhow!("storage unavailable: {msg}")),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldViolation {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(fields)
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
