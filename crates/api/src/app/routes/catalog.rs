//! Ministries, groups, books and sermons.
//!
//! One handler set serves all four kinds; each mounted router carries its
//! kind as an `Extension`.

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
use fellowship_content::{CatalogEntry, CatalogEntryId, CatalogInput, CatalogKind};
use fellowship_core::DomainError;
use fellowship_infra::Mutation;

use crate::app::dto::Items;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::PrincipalContext;

pub fn router(kind: CatalogKind) -> Router {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/:id", get(get_entry).put(replace_entry).delete(delete_entry))
        .layer(Extension(kind))
}

pub fn class_of(kind: CatalogKind) -> ResourceClass {
    match kind {
        CatalogKind::Ministry => ResourceClass::Ministry,
        CatalogKind::Group => ResourceClass::Group,
        CatalogKind::Book => ResourceClass::Book,
        CatalogKind::Sermon => ResourceClass::Sermon,
    }
}

/// Entries of another kind are reported as missing.
async fn find(services: &AppServices, kind: CatalogKind, id: &CatalogEntryId) -> ApiResult<CatalogEntry> {
    services
        .catalog
        .get(id)
        .await?
        .filter(|e| e.kind == kind)
        .ok_or(ApiError::NotFound)
}

pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Extension(kind): Extension<CatalogKind>,
) -> ApiResult<Json<Items<CatalogEntry>>> {
    require(&ctx, class_of(kind), Action::Read)?;

    let mut entries = services.catalog_of(kind).await?;
    entries.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(Json(entries.into()))
}

pub async fn create_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Extension(kind): Extension<CatalogKind>,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    require(&ctx, class_of(kind), Action::Create)?;
    let input: CatalogInput = body.decode()?;

    let id = CatalogEntryId::new();
    let entry = CatalogEntry::create(id, kind, input, Utc::now())?;
    services.catalog.insert(id, entry.clone()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Extension(kind): Extension<CatalogKind>,
    Path(id): Path<String>,
) -> ApiResult<Json<CatalogEntry>> {
    require(&ctx, class_of(kind), Action::Read)?;
    let id: CatalogEntryId = parse_id(&id)?;

    Ok(Json(find(&services, kind, &id).await?))
}

pub async fn replace_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Extension(kind): Extension<CatalogKind>,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Json<CatalogEntry>> {
    require(&ctx, class_of(kind), Action::Update)?;
    let input: CatalogInput = body.decode()?;
    let id: CatalogEntryId = parse_id(&id)?;

    let now = Utc::now();
    let committed = services
        .catalog
        .transition(
            &id,
            Box::new(move |current: &CatalogEntry| {
                if current.kind != kind {
                    return Err(DomainError::NotFound);
                }
                Ok(Mutation::Replace(current.replace(input, now)?))
            }),
        )
        .await?;
    Ok(Json(committed.into_value()))
}

pub async fn delete_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Extension(kind): Extension<CatalogKind>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require(&ctx, class_of(kind), Action::Delete)?;
    let id: CatalogEntryId = parse_id(&id)?;

    find(&services, kind, &id).await?;
    services.catalog.remove(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}
