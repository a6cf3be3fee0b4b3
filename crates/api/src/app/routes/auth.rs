use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::AccountContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.register(body.into()).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "message": "User created successfully" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.login(&body.email, &body.password).await {
        Ok(session) => Json(serde_json::json!({
            "token": session.token,
            "user": session.account,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
) -> axum::response::Response {
    match services.find_account(ctx.account_id()) {
        Ok(account) => Json(serde_json::json!({ "user": account })).into_response(),
        Err(e) => e.into_response(),
    }
}
