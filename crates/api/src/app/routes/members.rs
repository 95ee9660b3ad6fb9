use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;

use fellowship_auth::{Action, ResourceClass};
use fellowship_content::{CatalogEntry, CatalogKind};
use fellowship_core::sort_queue;
use fellowship_infra::{create, dispatch};
use fellowship_members::{Member, MemberCommand, MemberId, RegistrationSource, pending_queue};

use crate::app::dto::{self, Items};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::Member;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/pending", get(pending_members))
        .route("/form-options", get(form_options))
        .route("/:id", get(get_member).patch(update_member).delete(delete_member))
        .route("/:id/approve", post(approve_member))
        .route("/:id/reject", post(reject_member))
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<Items<Member>>> {
    require(&ctx, CLASS, Action::Read)?;

    let mut members = services.members.list().await?;
    sort_queue(&mut members, |m| m.status(), |m| m.created_at());
    Ok(Json(members.into()))
}

/// Staff-entered members skip the approval queue.
pub async fn create_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    require(&ctx, CLASS, Action::Create)?;
    let body: dto::RegisterMemberRequest = body.validated()?;

    let member = create(
        services.members.as_ref(),
        Member::empty(MemberId::new()),
        MemberCommand::Register {
            details: body.into(),
            source: RegistrationSource::Staff,
            occurred_at: Utc::now(),
        },
    )
    .await?;

    tracing::info!(entity = "member", id = %member.id_typed(), status = %member.status(), "member created");
    Ok((StatusCode::CREATED, Json(member)))
}

/// Registration queue: PENDING members, newest first.
pub async fn pending_members(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<Items<Member>>> {
    require(&ctx, CLASS, Action::Read)?;

    let members = services.members.list().await?;
    Ok(Json(pending_queue(members).into()))
}

/// Choices for the member form. Both lists load concurrently; either failing fails the request.
pub async fn form_options(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<impl IntoResponse> {
    require(&ctx, CLASS, Action::Read)?;

    let (ministries, groups): (Vec<CatalogEntry>, Vec<CatalogEntry>) = tokio::try_join!(
        services.catalog_of(CatalogKind::Ministry),
        services.catalog_of(CatalogKind::Group),
    )?;

    Ok(Json(json!({
        "ministries": ministries,
        "groups": groups,
    })))
}

pub async fn get_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Member>> {
    require(&ctx, CLASS, Action::Read)?;
    let id: MemberId = parse_id(&id)?;

    let member = services.members.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(member))
}

pub async fn update_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<Member>> {
    require(&ctx, CLASS, Action::Update)?;
    let id: MemberId = parse_id(&id)?;
    let body: dto::UpdateMemberRequest = body.validated()?;

    let committed = dispatch(
        services.members.as_ref(),
        &id,
        MemberCommand::UpdateDetails {
            patch: body.into(),
            occurred_at: Utc::now(),
        },
    )
    .await?;
    Ok(Json(committed.into_value()))
}

pub async fn delete_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&ctx, CLASS, Action::Delete)?;
    let id: MemberId = parse_id(&id)?;

    services.members.remove(&id).await?.ok_or(ApiError::NotFound)?;
    tracing::info!(entity = "member", id = %id, "member deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PENDING → ACTIVE. A second approval fails with `invalid_transition`.
pub async fn approve_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Member>> {
    require(&ctx, CLASS, Action::Approve)?;
    let id: MemberId = parse_id(&id)?;

    let committed = dispatch(
        services.members.as_ref(),
        &id,
        MemberCommand::Approve {
            occurred_at: Utc::now(),
        },
    )
    .await?;

    let member = committed.into_value();
    tracing::info!(entity = "member", id = %id, status = %member.status(), "registration approved");
    Ok(Json(member))
}

/// Irreversible: the registration is deleted, not flagged.
pub async fn reject_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    require(&ctx, CLASS, Action::Reject)?;
    let id: MemberId = parse_id(&id)?;

    dispatch(
        services.members.as_ref(),
        &id,
        MemberCommand::Reject {
            occurred_at: Utc::now(),
        },
    )
    .await?;

    tracing::info!(entity = "member", id = %id, status = "REJECTED", "registration rejected and removed");
    Ok(Json(json!({ "id": id, "removed": true })))
}
