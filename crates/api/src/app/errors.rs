use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::ServiceError;

/// The single mapping from service outcomes to HTTP responses.
///
/// Bodies carry only the category message; internal detail is logged here and
/// never returned.
pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "conflict", msg),
        ServiceError::InvalidCredentials => {
            json_error(StatusCode::BAD_REQUEST, "invalid_credentials", "Invalid credentials")
        }
        ServiceError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
        ServiceError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::Internal(detail) => {
            tracing::error!(%detail, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", "Server error")
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        service_error_to_response(self)
    }
}

/// Undecodable request bodies. The serde detail is logged, not returned.
pub fn body_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    tracing::debug!(detail = %rejection.body_text(), "rejected request body");
    json_error(StatusCode::BAD_REQUEST, "validation_error", "Invalid request body")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
