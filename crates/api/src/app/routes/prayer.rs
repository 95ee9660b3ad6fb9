use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use fellowship_auth::{Action, ResourceClass, ResourceFacts, Role};
use fellowship_core::FieldViolation;
use fellowship_infra::{dispatch, dispatch_all};
use fellowship_prayer::{PrayerCommand, PrayerRequest, PrayerRequestId, prayer_queue};

use crate::app::dto::{self, Items};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::{require, require_with};
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::PrayerRequest;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_prayer_requests))
        .route(
            "/:id",
            get(get_prayer_request).patch(update_prayer_request).delete(delete_prayer_request),
        )
        .route("/:id/prayed", post(mark_prayed))
}

/// Leaders only see requests shared with leaders or pastors.
pub async fn list_prayer_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<Items<PrayerRequest>>> {
    let principal = require(&ctx, CLASS, Action::Read)?;

    let requests = services.prayer_requests.list().await?;
    let visible = requests
        .into_iter()
        .filter(|r| principal.role != Role::Leader || r.is_shared_with_leaders());
    Ok(Json(prayer_queue(visible).into()))
}

/// A leader asking for a missing request gets the same 403 as for an unshared one.
pub async fn get_prayer_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrayerRequest>> {
    require(&ctx, CLASS, Action::Read)?;

    let found = match id.parse::<PrayerRequestId>() {
        Ok(id) => services.prayer_requests.get(&id).await?,
        Err(_) => None,
    };
    let shared = found.as_ref().is_some_and(|r| r.is_shared_with_leaders());
    require_with(&ctx, CLASS, Action::Read, ResourceFacts::prayer_sharing(shared))?;

    found.map(Json).ok_or(ApiError::NotFound)
}

/// Status and sharing changes commit together or not at all.
pub async fn update_prayer_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<PrayerRequest>> {
    require(&ctx, CLASS, Action::Update)?;
    let body: dto::UpdatePrayerRequest = body.decode()?;
    let id: PrayerRequestId = parse_id(&id)?;

    let now = Utc::now();
    let mut commands = Vec::new();
    if let Some(status) = body.status {
        commands.push(PrayerCommand::UpdateStatus { status, occurred_at: now });
    }
    if let Some(sharing) = body.sharing {
        commands.push(PrayerCommand::UpdateSharing { sharing, occurred_at: now });
    }
    if commands.is_empty() {
        return Err(ApiError::Validation(vec![FieldViolation {
            field: "status".to_string(),
            message: "status or sharing is required".to_string(),
        }]));
    }

    let committed = dispatch_all(services.prayer_requests.as_ref(), &id, commands).await?;
    let request = committed.into_value();
    tracing::info!(entity = "prayer_request", id = %id, status = %request.status(), "prayer request updated");
    Ok(Json(request))
}

pub async fn delete_prayer_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&ctx, CLASS, Action::Delete)?;
    let id: PrayerRequestId = parse_id(&id)?;

    services.prayer_requests.remove(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Counted once per principal; repeating it is a successful no-op.
pub async fn mark_prayed(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrayerRequest>> {
    let principal = require(&ctx, CLASS, Action::MarkPrayed)?;
    let id: PrayerRequestId = parse_id(&id)?;

    let committed = dispatch(
        services.prayer_requests.as_ref(),
        &id,
        PrayerCommand::MarkPrayed {
            by: principal.id,
            occurred_at: Utc::now(),
        },
    )
    .await?;

    let request = committed.into_value();
    tracing::info!(
        entity = "prayer_request",
        id = %id,
        prayer_count = request.prayer_count(),
        "prayer recorded"
    );
    Ok(Json(request))
}
