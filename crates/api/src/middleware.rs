use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use fellowship_auth::{IdentityError, JwtValidator};

use crate::app::errors::{ApiError, json_error};
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    /// `true` for the JSON API (bad token → 401); `false` for pages, where a
    /// bad token is treated as an anonymous visitor.
    pub reject_invalid: bool,
}

impl AuthState {
    pub fn api(jwt: Arc<dyn JwtValidator>) -> Self {
        Self {
            jwt,
            reject_invalid: true,
        }
    }

    pub fn pages(jwt: Arc<dyn JwtValidator>) -> Self {
        Self {
            jwt,
            reject_invalid: false,
        }
    }
}

/// Attach a [`PrincipalContext`] to every request.
///
/// No `Authorization` header means an anonymous request; whether that is
/// acceptable is up to the policy check in each handler.
pub async fn identity_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let context = match resolve(&state, req.headers()) {
        Ok(context) => context,
        Err(err) => return err.into_response(),
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}

/// Give framework rejections (unknown route, wrong method, unreadable body)
/// the same JSON error shape as handler errors.
pub async fn normalize_error_response(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        return response;
    }

    let (code, message) = match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::PAYLOAD_TOO_LARGE => {
            ("validation_failed", "invalid request")
        }
        StatusCode::UNAUTHORIZED => ("unauthenticated", "authentication required"),
        StatusCode::FORBIDDEN => ("forbidden", "forbidden"),
        StatusCode::NOT_FOUND => ("not_found", "not found"),
        StatusCode::METHOD_NOT_ALLOWED => ("method_not_allowed", "method not allowed"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("unsupported_media_type", "unsupported content type"),
        s if s.is_client_error() => ("client_error", "client error"),
        _ => ("internal_error", "An internal error occurred"),
    };
    let status = if code == "validation_failed" { StatusCode::BAD_REQUEST } else { status };
    json_error(status, code, message)
}

fn resolve(state: &AuthState, headers: &HeaderMap) -> Result<PrincipalContext, ApiError> {
    let token = match extract_bearer(headers) {
        Ok(None) => return Ok(PrincipalContext::anonymous()),
        Ok(Some(token)) => token,
        Err(_) if !state.reject_invalid => return Ok(PrincipalContext::anonymous()),
        Err(_) => return Err(ApiError::Unauthenticated),
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "bearer token rejected");
            if state.reject_invalid {
                return Err(ApiError::Unauthenticated);
            }
            return Ok(PrincipalContext::anonymous());
        }
    };

    match claims.principal() {
        Ok(principal) => Ok(PrincipalContext::authenticated(principal)),
        Err(IdentityError::UnknownRole(role)) => {
            tracing::error!(role = %role, subject = %claims.sub, "identity token carries an unknown role");
            Err(ApiError::Internal(anyhow::anyhow!("unknown role '{role}'")))
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}
