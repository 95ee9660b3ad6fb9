use axum::{Router, routing::get};

use fellowship_content::CatalogKind;

pub mod catalog;
pub mod common;
pub mod events;
pub mod followups;
pub mod members;
pub mod messages;
pub mod notices;
pub mod pages;
pub mod prayer;
pub mod public;
pub mod rbac;
pub mod settings;
pub mod system;
pub mod users;

/// Router for the admin JSON API (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/members", members::router())
        .nest("/messages", messages::router())
        .nest("/prayer-requests", prayer::router())
        .nest("/notices", notices::router())
        .nest("/follow-ups", followups::router())
        .nest("/events", events::router())
        .nest("/ministries", catalog::router(CatalogKind::Ministry))
        .nest("/groups", catalog::router(CatalogKind::Group))
        .nest("/books", catalog::router(CatalogKind::Book))
        .nest("/sermons", catalog::router(CatalogKind::Sermon))
        .nest("/users", users::router())
        .nest("/settings", settings::router())
        .nest("/rbac", rbac::router())
}
