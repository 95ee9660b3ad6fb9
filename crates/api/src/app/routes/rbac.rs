//! RBAC audit endpoints for transparent authorization debugging.
//!
//! These answer "why was this request denied?" without touching any record.

use axum::{
    Json, Router,
    extract::{Extension, Query, rejection::QueryRejection},
    routing::get,
};
use serde_json::{Value, json};

use fellowship_auth::{Action, PolicyExplanation, PolicyMatrix, ResourceClass, ResourceFacts, explain};
use fellowship_core::FieldViolation;

use crate::app::dto::ExplainQuery;
use crate::app::errors::{ApiError, ApiResult};
use crate::authz::require;
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/matrix", get(policy_matrix))
        .route("/explain", get(explain_decision))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/rbac/matrix - Full role × class × action table (SUPER_ADMIN only)
pub async fn policy_matrix(Extension(ctx): Extension<PrincipalContext>) -> ApiResult<Json<Value>> {
    require(&ctx, ResourceClass::Settings, Action::Read)?;

    let matrix = PolicyMatrix::build();
    Ok(Json(json!({
        "classes": ResourceClass::ALL,
        "actions": Action::ALL,
        "entries": matrix.entries,
    })))
}

/// GET /api/rbac/explain - How the policy treats the caller for one class/action
pub async fn explain_decision(
    Extension(ctx): Extension<PrincipalContext>,
    query: Result<Query<ExplainQuery>, QueryRejection>,
) -> ApiResult<Json<PolicyExplanation>> {
    let principal = ctx.principal().ok_or(ApiError::Unauthenticated)?;
    if !principal.role.has_admin_surface() {
        return Err(ApiError::Forbidden);
    }
    let Query(query) = query.map_err(|rejection| {
        ApiError::Validation(vec![FieldViolation {
            field: "query".to_string(),
            message: rejection.body_text(),
        }])
    })?;

    let class = ResourceClass::from_slug(&query.class).ok_or_else(|| {
        ApiError::Validation(vec![FieldViolation {
            field: "class".to_string(),
            message: format!("unknown resource class '{}'", query.class),
        }])
    })?;
    let facts = match query.shared {
        Some(shared) => ResourceFacts::prayer_sharing(shared),
        None => ResourceFacts::none(),
    };

    Ok(Json(explain(principal.role, class, query.action, facts)))
}
