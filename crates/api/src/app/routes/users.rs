//! System users. Every action here is SUPER_ADMIN only.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Utc;

use fellowship_auth::{
    Action, ResourceClass, User, UserCommand,
    user::{ChangeRole, CreateUser, DeleteUser, UpdateProfile},
};
use fellowship_core::UserId;
use fellowship_infra::{create, dispatch};

use crate::app::dto::{self, Items, UserView};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

const CLASS: ResourceClass = ResourceClass::User;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/:id/role", put(change_role))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> ApiResult<Json<Items<UserView>>> {
    require(&ctx, CLASS, Action::Read)?;

    let mut users = services.users.list().await?;
    users.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(Json(users.iter().map(UserView::from).collect::<Vec<_>>().into()))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    require(&ctx, CLASS, Action::Create)?;
    let body: dto::CreateUserRequest = body.validated()?;

    let user = create(
        services.users.as_ref(),
        User::empty(UserId::new()),
        UserCommand::Create(CreateUser {
            email: body.email,
            display_name: body.display_name,
            role: body.role,
            occurred_at: Utc::now(),
        }),
    )
    .await?;

    tracing::info!(entity = "user", id = %user.id, role = %user.role, "user created");
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserView>> {
    require(&ctx, CLASS, Action::Read)?;
    let id: UserId = parse_id(&id)?;

    let user = services.users.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(UserView::from(&user)))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<UserView>> {
    require(&ctx, CLASS, Action::Update)?;
    let id: UserId = parse_id(&id)?;
    let body: dto::UpdateUserRequest = body.validated()?;

    let committed = dispatch(
        services.users.as_ref(),
        &id,
        UserCommand::UpdateProfile(UpdateProfile {
            email: body.email,
            display_name: body.display_name,
            occurred_at: Utc::now(),
        }),
    )
    .await?;
    Ok(Json(UserView::from(committed.value())))
}

/// A principal cannot change its own role.
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<UserView>> {
    let principal = require(&ctx, CLASS, Action::Update)?;
    let body: dto::ChangeRoleRequest = body.decode()?;
    let id: UserId = parse_id(&id)?;

    let committed = dispatch(
        services.users.as_ref(),
        &id,
        UserCommand::ChangeRole(ChangeRole {
            role: body.role,
            actor: principal.id,
            occurred_at: Utc::now(),
        }),
    )
    .await?;

    let user = committed.into_value();
    tracing::info!(entity = "user", id = %id, role = %user.role, "user role changed");
    Ok(Json(UserView::from(&user)))
}

/// A principal cannot delete its own account.
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let principal = require(&ctx, CLASS, Action::Delete)?;
    let id: UserId = parse_id(&id)?;

    dispatch(
        services.users.as_ref(),
        &id,
        UserCommand::Delete(DeleteUser {
            actor: principal.id,
            occurred_at: Utc::now(),
        }),
    )
    .await?;

    tracing::info!(entity = "user", id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
