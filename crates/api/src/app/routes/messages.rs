use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;

use fellowship_auth::{Action, ResourceClass};
use fellowship_infra::dispatch;
use fellowship_messages::{ContactCommand, ContactMessage, ContactMessageId, triage_queue};

use crate::app::dto::{self, Items};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::ContactMessage;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_messages))
        .route("/:id", get(get_message).patch(update_message).delete(delete_message))
}

/// Triage queue: unresolved first, newest first within a status.
pub async fn list_messages(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<Items<ContactMessage>>> {
    require(&ctx, CLASS, Action::Read)?;

    let messages = services.messages.list().await?;
    Ok(Json(triage_queue(messages).into()))
}

pub async fn get_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContactMessage>> {
    require(&ctx, CLASS, Action::Read)?;
    let id: ContactMessageId = parse_id(&id)?;

    let message = services.messages.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(message))
}

/// Operator update. Supplying a response counts as responding; without an
/// explicit status a non-empty response moves the message to RESPONDED.
pub async fn update_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<ContactMessage>> {
    require(&ctx, CLASS, Action::Update)?;
    let body: dto::UpdateMessageRequest = body.validated()?;
    if body.response.is_some() {
        require(&ctx, CLASS, Action::Respond)?;
    }
    let id: ContactMessageId = parse_id(&id)?;

    let committed = dispatch(
        services.messages.as_ref(),
        &id,
        ContactCommand::Update {
            status: body.status,
            response: body.response,
            occurred_at: Utc::now(),
        },
    )
    .await?;

    let message = committed.into_value();
    tracing::info!(entity = "contact_message", id = %id, status = %message.status(), "message updated");
    Ok(Json(message))
}

pub async fn delete_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&ctx, CLASS, Action::Delete)?;
    let id: ContactMessageId = parse_id(&id)?;

    services.messages.remove(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}
