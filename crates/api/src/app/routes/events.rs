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
use fellowship_content::{ChurchEvent, EventId, EventInput};
use fellowship_infra::Mutation;

use crate::app::dto::Items;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::Event;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", get(get_event).put(replace_event).delete(delete_event))
}

/// Soonest first, drafts included.
pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<Items<ChurchEvent>>> {
    require(&ctx, CLASS, Action::Read)?;

    let mut events = services.events.list().await?;
    events.sort_by_key(|e| e.starts_at);
    Ok(Json(events.into()))
}

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    require(&ctx, CLASS, Action::Create)?;
    let input: EventInput = body.decode()?;

    let id = EventId::new();
    let event = ChurchEvent::create(id, input, Utc::now())?;
    services.events.insert(id, event.clone()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ChurchEvent>> {
    require(&ctx, CLASS, Action::Read)?;
    let id: EventId = parse_id(&id)?;

    let event = services.events.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(event))
}

pub async fn replace_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<ChurchEvent>> {
    require(&ctx, CLASS, Action::Update)?;
    let input: EventInput = body.decode()?;
    let id: EventId = parse_id(&id)?;

    let now = Utc::now();
    let committed = services
        .events
        .transition(
            &id,
            Box::new(move |current: &ChurchEvent| Ok(Mutation::Replace(current.replace(input, now)?))),
        )
        .await?;
    Ok(Json(committed.into_value()))
}

pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&ctx, CLASS, Action::Delete)?;
    let id: EventId = parse_id(&id)?;

    services.events.remove(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}
