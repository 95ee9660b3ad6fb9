//! Page routes. Rendering lives elsewhere; these only apply the navigation
//! guard and describe the page that would be shown.

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde_json::json;

use fellowship_auth::{PageArea, guard_page};

use crate::app::errors::{ApiError, ApiResult};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/sign-in", get(sign_in))
        .route("/register", get(register))
        .route("/admin", get(dashboard))
        .route("/admin/:section", get(admin_section))
}

fn page(ctx: &PrincipalContext, area: PageArea, name: &str) -> Response {
    match guard_page(ctx.principal(), area).location() {
        Some(location) => Redirect::to(location).into_response(),
        None => Json(json!({
            "page": name,
            "role": ctx.principal().map(|p| p.role),
        }))
        .into_response(),
    }
}

pub async fn sign_in(Extension(ctx): Extension<PrincipalContext>) -> Response {
    page(&ctx, PageArea::AuthOnly, "sign-in")
}

pub async fn register(Extension(ctx): Extension<PrincipalContext>) -> Response {
    page(&ctx, PageArea::AuthOnly, "register")
}

pub async fn dashboard(Extension(ctx): Extension<PrincipalContext>) -> Response {
    page(&ctx, PageArea::Dashboard, "dashboard")
}

/// Visitors without admin access are redirected before the section is looked up.
pub async fn admin_section(
    Extension(ctx): Extension<PrincipalContext>,
    Path(section): Path<String>,
) -> ApiResult<Response> {
    if let Some(location) = guard_page(ctx.principal(), PageArea::Dashboard).location() {
        return Ok(Redirect::to(location).into_response());
    }
    let area = PageArea::admin_section(&section).ok_or(ApiError::NotFound)?;
    Ok(page(&ctx, area, &section))
}
