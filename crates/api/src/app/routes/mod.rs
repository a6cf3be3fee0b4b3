use axum::{
    Router,
    routing::{get, post, put},
};

pub mod auth;
pub mod system;
pub mod transactions;
pub mod users;

/// Endpoints reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// Endpoints behind the authentication gate.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users/profile", put(users::update_profile))
        .route("/users/balance", get(users::balance))
        .nest("/transactions", transactions::router())
}
