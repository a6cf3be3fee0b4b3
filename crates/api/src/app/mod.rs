//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring and the operations behind every route
//! - `routes/`: HTTP handlers (one file per area)
//! - `dto.rs`: request bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, body::Body, http::Request};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
///
/// Every route is reachable both at the root and under `/api`.
pub fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config)?);
    Ok(router_with_services(services, config.cors_allow_any))
}

/// Router over an already-wired service graph.
pub fn router_with_services(services: Arc<services::AppServices>, cors_allow_any: bool) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.token_verifier(),
        accounts: services.accounts(),
    };

    // Protected routes: require a valid bearer token for a live account.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let routes = Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services));

    let app = Router::new()
        .nest("/api", routes.clone())
        .merge(routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %Uuid::now_v7(),
                    account_id = tracing::field::Empty,
                )
            })),
        );

    if cors_allow_any {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
