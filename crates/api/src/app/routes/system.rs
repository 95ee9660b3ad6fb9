use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::app::errors::{ApiError, ApiResult};
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<PrincipalContext>) -> ApiResult<Json<Value>> {
    let principal = ctx.principal().ok_or(ApiError::Unauthenticated)?;
    Ok(Json(json!({
        "principalId": principal.id,
        "role": principal.role,
        "roleDescription": principal.role.description(),
        "adminSurface": principal.role.has_admin_surface(),
    })))
}
