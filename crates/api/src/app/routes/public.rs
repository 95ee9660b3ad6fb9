//! Public site endpoints. No principal is needed and none is consulted.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;

use fellowship_content::{ChurchEvent, upcoming_public};
use fellowship_infra::create;
use fellowship_members::{Member, MemberCommand, MemberId, RegistrationSource};
use fellowship_messages::{ContactCommand, ContactMessage, ContactMessageId};
use fellowship_notices::{Notice, public_listing};
use fellowship_prayer::{PrayerCommand, PrayerRequest, PrayerRequestId, PublicPrayerView, public_wall};

use crate::app::dto::{self, Items};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/events", get(upcoming_events))
        .route("/notices", get(current_notices))
        .route("/prayer-requests", get(prayer_wall).post(submit_prayer_request))
        .route("/contact", post(submit_contact))
        .route("/register", post(register))
}

pub async fn upcoming_events(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Items<ChurchEvent>>> {
    let events = services.events.list().await?;
    Ok(Json(upcoming_public(events, Utc::now()).into()))
}

pub async fn current_notices(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<Json<Items<Notice>>> {
    let notices = services.notices.list().await?;
    Ok(Json(public_listing(notices, Utc::now()).into()))
}

/// Public, not-closed requests with contact details stripped.
pub async fn prayer_wall(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Items<PublicPrayerView>>> {
    let requests = services.prayer_requests.list().await?;
    Ok(Json(public_wall(requests).into()))
}

pub async fn submit_prayer_request(
    Extension(services): Extension<Arc<AppServices>>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    let body: dto::PrayerRequestBody = body.validated()?;

    let request = create(
        services.prayer_requests.as_ref(),
        PrayerRequest::empty(PrayerRequestId::new()),
        PrayerCommand::Submit {
            submission: body.into(),
            occurred_at: Utc::now(),
        },
    )
    .await?;

    tracing::info!(entity = "prayer_request", id = %request.id_typed(), status = %request.status(), "prayer request submitted");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": request.id_typed(), "status": request.status() })),
    ))
}

pub async fn submit_contact(
    Extension(services): Extension<Arc<AppServices>>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    let body: dto::ContactRequest = body.validated()?;

    let message = create(
        services.messages.as_ref(),
        ContactMessage::empty(ContactMessageId::new()),
        ContactCommand::Submit {
            submission: body.into(),
            occurred_at: Utc::now(),
        },
    )
    .await?;

    tracing::info!(entity = "contact_message", id = %message.id_typed(), status = %message.status(), "contact message received");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": message.id_typed(), "status": message.status() })),
    ))
}

/// Self-registration lands in the approval queue as PENDING.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    if !services.settings()?.registration_open {
        return Err(ApiError::InvariantViolation("registration is closed".to_string()));
    }
    let body: dto::RegisterMemberRequest = body.validated()?;

    let member = create(
        services.members.as_ref(),
        Member::empty(MemberId::new()),
        MemberCommand::Register {
            details: body.into(),
            source: RegistrationSource::SelfRegistration,
            occurred_at: Utc::now(),
        },
    )
    .await?;

    tracing::info!(entity = "member", id = %member.id_typed(), status = %member.status(), "self-registration received");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": member.id_typed(), "status": member.status() })),
    ))
}
