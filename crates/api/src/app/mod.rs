//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage wiring shared by all handlers
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and validation
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: request bodies decoded after authorization

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use chrono::Utc;
use tower::ServiceBuilder;

use fellowship_auth::{Hs256JwtValidator, JwtValidator};

use crate::config::ApiConfig;
use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(AppServices::in_memory());
    if config.seed_demo {
        services.seed_demo(Utc::now()).await?;
    }
    Ok(build_router(services, &config.jwt_secret))
}

/// Wire routes around existing services (tests pass their own).
pub fn build_router(services: Arc<AppServices>, jwt_secret: &str) -> Router {
    let jwt: Arc<dyn JwtValidator> = Arc::new(Hs256JwtValidator::new(jwt_secret));

    // Admin JSON API: a bad token is a 401.
    let api = routes::router().layer(axum::middleware::from_fn_with_state(
        AuthState::api(jwt.clone()),
        middleware::identity_middleware,
    ));

    // Pages: a bad token is an anonymous visitor, who gets redirected.
    let pages = routes::pages::router().layer(axum::middleware::from_fn_with_state(
        AuthState::pages(jwt),
        middleware::identity_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/public", routes::public::router())
        .nest("/api", api)
        .merge(pages)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::normalize_error_response))
                .layer(Extension(services)),
        )
}
