use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use paygate_ledger::TransactionQuery;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AccountContext;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/summary", get(summary))
        .route("/:id", get(get_transaction))
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
    body: Result<Json<dto::CreateTransactionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.create_transaction(ctx.account_id(), body.amount, body.description, body.kind) {
        Ok(tx) => (StatusCode::CREATED, Json(tx)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Plain array body; the pre-pagination match count goes in `X-Total-Count`.
pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text());
        }
    };

    let page = services.list_transactions(ctx.account_id(), &query);
    let mut response = Json(page.items).into_response();
    response
        .headers_mut()
        .insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.total));
    response
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
) -> axum::response::Response {
    Json(services.transaction_summary(ctx.account_id(), Utc::now())).into_response()
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.get_transaction(ctx.account_id(), &id) {
        Ok(tx) => Json(tx).into_response(),
        Err(e) => e.into_response(),
    }
}
