use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use fellowship_auth::{Action, ResourceClass};
use fellowship_core::FieldViolation;
use fellowship_followups::{FollowUp, FollowUpCommand, FollowUpDraft, FollowUpId, work_queue};
use fellowship_infra::{create, dispatch};

use crate::app::dto::{self, FollowUpView, Items};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::FollowUp;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_follow_ups).post(create_follow_up))
        .route("/:id", get(get_follow_up).delete(delete_follow_up))
        .route("/:id/assign", post(assign_follow_up))
        .route("/:id/complete", post(complete_follow_up))
}

fn view(follow_up: &FollowUp) -> Response {
    Json(FollowUpView::from(follow_up)).into_response()
}

/// Open work first, newest first within a status.
pub async fn list_follow_ups(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Response> {
    require(&ctx, CLASS, Action::Read)?;

    let queue = work_queue(services.follow_ups.list().await?);
    let items: Items<FollowUpView<'_>> = queue.iter().map(FollowUpView::from).collect::<Vec<_>>().into();
    Ok(Json(items).into_response())
}

pub async fn create_follow_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    body: JsonBody,
) -> ApiResult<Response> {
    require(&ctx, CLASS, Action::Create)?;
    let body: dto::CreateFollowUpRequest = body.validated()?;

    if services.members.get(&body.member_id).await?.is_none() {
        return Err(ApiError::Validation(vec![FieldViolation {
            field: "memberId".to_string(),
            message: "no such member".to_string(),
        }]));
    }

    let follow_up = create(
        services.follow_ups.as_ref(),
        FollowUp::empty(FollowUpId::new()),
        FollowUpCommand::Open {
            draft: FollowUpDraft::from(body),
            occurred_at: Utc::now(),
        },
    )
    .await?;

    tracing::info!(entity = "follow_up", id = %follow_up.id_typed(), status = %follow_up.status(), "follow-up opened");
    Ok((StatusCode::CREATED, view(&follow_up)).into_response())
}

pub async fn get_follow_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    require(&ctx, CLASS, Action::Read)?;
    let id: FollowUpId = parse_id(&id)?;

    let follow_up = services.follow_ups.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(view(&follow_up))
}

pub async fn delete_follow_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&ctx, CLASS, Action::Delete)?;
    let id: FollowUpId = parse_id(&id)?;

    services.follow_ups.remove(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_follow_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Response> {
    require(&ctx, CLASS, Action::Update)?;
    let body: dto::AssignFollowUpRequest = body.decode()?;
    let id: FollowUpId = parse_id(&id)?;

    let committed = dispatch(
        services.follow_ups.as_ref(),
        &id,
        FollowUpCommand::Assign {
            assignee: body.assignee,
            occurred_at: Utc::now(),
        },
    )
    .await?;

    let follow_up = committed.into_value();
    tracing::info!(entity = "follow_up", id = %id, status = %follow_up.status(), "follow-up assigned");
    Ok(view(&follow_up))
}

/// COMPLETED is terminal; completing twice fails with `invalid_transition`.
pub async fn complete_follow_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Response> {
    require(&ctx, CLASS, Action::Update)?;
    let id: FollowUpId = parse_id(&id)?;
    let body: dto::CompleteFollowUpRequest = body.validated()?;

    let committed = dispatch(
        services.follow_ups.as_ref(),
        &id,
        FollowUpCommand::Complete {
            completion: body.into(),
            occurred_at: Utc::now(),
        },
    )
    .await?;

    let follow_up = committed.into_value();
    tracing::info!(entity = "follow_up", id = %id, status = %follow_up.status(), "follow-up completed");
    Ok(view(&follow_up))
}
