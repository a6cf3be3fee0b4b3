use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    response::IntoResponse,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::AccountContext;

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
    body: Result<Json<dto::UpdateProfileRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.update_profile(ctx.account_id(), body.into()) {
        Ok(account) => Json(serde_json::json!({ "user": account })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
) -> axum::response::Response {
    match services.get_balance(ctx.account_id()) {
        Ok(balance) => Json(serde_json::json!({ "balance": balance })).into_response(),
        Err(e) => e.into_response(),
    }
}
