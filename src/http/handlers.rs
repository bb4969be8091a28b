//! API handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::http::middleware::CSRF_COOKIE;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::{
    check_data_integrity, generate_csrf_token, sanitize_input, validate_cliente_data, GuardError,
    LoginMethod, ValidationResult,
};

/// Errors surfaced by the API, rendered as `{ "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    Guard(GuardError),
    UnsafePayload,
}

impl From<GuardError> for ApiError {
    fn from(e: GuardError) -> Self {
        ApiError::Guard(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Guard(GuardError::RateLimited { remaining }) => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": GuardError::RateLimited { remaining }.to_string(),
                    "remaining": remaining,
                })),
            )
                .into_response(),
            ApiError::Guard(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            ApiError::UnsafePayload => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Los datos del formulario no son seguros" })),
            )
                .into_response(),
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CsrfResponse {
    pub token: String,
}

/// Issue a session token, as JSON and as the double-submit cookie.
pub async fn issue_csrf() -> impl IntoResponse {
    let token = generate_csrf_token();
    let cookie = format!("{}={}; Path=/; SameSite=Strict", CSRF_COOKIE, token);
    ([(header::SET_COOKIE, cookie)], Json(CsrfResponse { token }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub method: LoginMethod,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginAttemptResponse {
    pub allowed: bool,
    pub identifier: String,
    pub username: String,
    pub remaining: u32,
}

/// Pre-flight a login submission before credentials are checked elsewhere.
pub async fn login_attempt(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginAttemptResponse>, ApiError> {
    let attempt = state.guard.preflight(body.method, &body.username)?;

    Ok(Json(LoginAttemptResponse {
        allowed: true,
        identifier: attempt.identifier,
        username: attempt.username,
        remaining: attempt.remaining,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClienteValidationResponse {
    pub data: Value,
    pub validation: ValidationResult,
}

/// Sanitize and validate a new patient payload.
pub async fn validate_cliente(Json(body): Json<Value>) -> Result<Response, ApiError> {
    let data = sanitize_input(body);

    if !check_data_integrity(&data) {
        tracing::warn!("Cliente payload rejected by integrity check");
        metrics::record_suspicious_input("cliente");
        return Err(ApiError::UnsafePayload);
    }

    let validation = validate_cliente_data(&data);
    let status = if validation.is_valid {
        StatusCode::OK
    } else {
        metrics::record_validation_failure(validation.errors.len());
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((status, Json(ClienteValidationResponse { data, validation })).into_response())
}
