//! Double-submit CSRF check.
//! The token issued by `GET /api/csrf` travels back both as a cookie and
//! as a header; mutating requests must carry matching copies.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::server::AppState;
use crate::security::verify_csrf_token;

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Value of a named cookie in the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub async fn csrf_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.security.require_csrf || is_safe(request.method()) {
        return next.run(request).await;
    }

    let headers = request.headers();
    let cookie = cookie_value(headers, CSRF_COOKIE).unwrap_or_default();
    let presented = headers
        .get(CSRF_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if verify_csrf_token(cookie, presented) {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "CSRF token missing or mismatched");
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Token CSRF inválido" })),
        )
            .into_response()
    }
}
