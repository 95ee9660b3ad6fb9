use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use fellowship_auth::{Action, ResourceClass};
use fellowship_infra::{create, dispatch_all};
use fellowship_notices::{Notice, NoticeCommand, NoticeId};

use crate::app::dto::{self, Items};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::Notice;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notices).post(create_notice))
        .route("/:id", get(get_notice).patch(update_notice).delete(delete_notice))
}

/// Every notice, including inactive and expired ones, highest priority first.
pub async fn list_notices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<Items<Notice>>> {
    require(&ctx, CLASS, Action::Read)?;

    let mut notices = services.notices.list().await?;
    notices.sort_by(|a, b| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| b.window().publish_date.cmp(&a.window().publish_date))
    });
    Ok(Json(notices.into()))
}

pub async fn create_notice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    require(&ctx, CLASS, Action::Create)?;
    let body: dto::CreateNoticeRequest = body.validated()?;

    let now = Utc::now();
    let notice = create(
        services.notices.as_ref(),
        Notice::empty(NoticeId::new()),
        NoticeCommand::Create {
            draft: body.into_draft(now),
            occurred_at: now,
        },
    )
    .await?;

    tracing::info!(entity = "notice", id = %notice.id_typed(), active = notice.window().is_active, "notice created");
    Ok((StatusCode::CREATED, Json(notice)))
}

pub async fn get_notice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Notice>> {
    require(&ctx, CLASS, Action::Read)?;
    let id: NoticeId = parse_id(&id)?;

    let notice = services.notices.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(notice))
}

/// Content changes and the active toggle commit together.
pub async fn update_notice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<Notice>> {
    require(&ctx, CLASS, Action::Update)?;
    let body: dto::UpdateNoticeRequest = body.decode()?;
    let id: NoticeId = parse_id(&id)?;

    let now = Utc::now();
    let mut commands = vec![NoticeCommand::Update {
        patch: body.patch,
        occurred_at: now,
    }];
    if let Some(is_active) = body.is_active {
        commands.push(NoticeCommand::SetActive { is_active, occurred_at: now });
    }

    let committed = dispatch_all(services.notices.as_ref(), &id, commands).await?;
    let notice = committed.into_value();
    tracing::info!(entity = "notice", id = %id, active = notice.window().is_active, "notice updated");
    Ok(Json(notice))
}

pub async fn delete_notice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&ctx, CLASS, Action::Delete)?;
    let id: NoticeId = parse_id(&id)?;

    services.notices.remove(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}
