use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use paygate_accounts::AccountStore;
use paygate_auth::TokenVerifier;

use crate::app::services::ServiceError;
use crate::context::AccountContext;

/// Everything the authentication gate needs: token verification plus a way to
/// confirm the account behind a token still exists.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenVerifier>,
    pub accounts: Arc<dyn AccountStore>,
}

/// Authentication gate for every protected route.
///
/// Missing header, undecodable token, bad signature, expiry and vanished
/// accounts all produce the same 401 body.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(unauthorized)?;

    let account_id = state.tokens.verify(token, Utc::now()).map_err(|e| {
        tracing::warn!(reason = %e, "rejected bearer token");
        unauthorized()
    })?;

    if state.accounts.find_by_id(account_id).is_none() {
        tracing::warn!(account_id = %account_id, "token for unknown account");
        return Err(unauthorized());
    }

    tracing::Span::current().record("account_id", tracing::field::display(account_id));
    req.extensions_mut().insert(AccountContext::new(account_id));

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    ServiceError::Unauthorized.into_response()
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("Bearer   padded  ")), Some("padded"));
    }

    #[test]
    fn other_schemes_and_blanks_are_rejected() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&headers("bearer abc")), None);
    }
}
