use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    routing::get,
};
use chrono::Utc;

use fellowship_auth::{Action, ResourceClass};
use fellowship_content::{SiteSettings, SiteSettingsPatch};

use crate::app::errors::ApiResult;
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::Settings;

pub fn router() -> Router {
    Router::new().route("/", get(get_settings).put(update_settings))
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<SiteSettings>> {
    require(&ctx, CLASS, Action::Read)?;
    Ok(Json(services.settings()?))
}

pub async fn update_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    body: JsonBody,
) -> ApiResult<Json<SiteSettings>> {
    require(&ctx, CLASS, Action::Update)?;
    let patch: SiteSettingsPatch = body.decode()?;

    let settings = services.update_settings(patch, Utc::now())?;
    tracing::info!(registration_open = settings.registration_open, "site settings updated");
    Ok(Json(settings))
}
