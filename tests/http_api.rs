//! End-to-end tests of the HTTP surface, driven through the router.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use nutri_guard::GuardServer;

mod common;

use common::{fetch_csrf, json_request, send, test_config, ADMIN_KEY};

#[tokio::test]
async fn test_health_and_request_id() {
    let router = GuardServer::new(test_config()).router();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, headers, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
    assert!(headers.contains_key(nutri_guard::http::X_REQUEST_ID));
}

#[tokio::test]
async fn test_csrf_tokens_are_fresh() {
    let router = GuardServer::new(test_config()).router();
    let a = fetch_csrf(&router).await;
    let b = fetch_csrf(&router).await;
    assert_eq!(a.len(), 64);
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_login_preflight_rate_limits_after_five() {
    let router = GuardServer::new(test_config()).router();
    let body = json!({ "method": "email", "username": "ana@correo.cl" });

    for expected_remaining in (0..5).rev() {
        let (status, _, res) = send(&router, json_request(Method::POST, "/api/login/attempt", &body, &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["identifier"], "email_ana@correo.cl");
        assert_eq!(res["remaining"], expected_remaining);
    }

    let (status, _, res) = send(&router, json_request(Method::POST, "/api/login/attempt", &body, &[])).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res["remaining"], 0);
    assert_eq!(res["error"], "Demasiados intentos de login. Intentos restantes: 0");

    // A different identifier is unaffected.
    let other = json!({ "method": "rut", "username": "12.345.678-5" });
    let (status, _, _) = send(&router, json_request(Method::POST, "/api/login/attempt", &other, &[])).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_preflight_format_errors() {
    let router = GuardServer::new(test_config()).router();

    let bad_rut = json!({ "method": "rut", "username": "12345678-4" });
    let (status, _, res) = send(&router, json_request(Method::POST, "/api/login/attempt", &bad_rut, &[])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res["error"], "Formato de RUT inválido");

    let injected = json!({ "method": "email", "username": "<script>@x.cl" });
    let (status, _, res) = send(&router, json_request(Method::POST, "/api/login/attempt", &injected, &[])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res["error"], "El campo contiene caracteres no válidos");
}

#[tokio::test]
async fn test_oversized_usernames_leave_no_limiter_state() {
    let router = GuardServer::new(test_config()).router();
    let junk = json!({ "method": "email", "username": "x".repeat(60_000) });

    for _ in 0..50 {
        let (status, _, res) = send(&router, json_request(Method::POST, "/api/login/attempt", &junk, &[])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res["error"], "Formato de email inválido");
    }

    let request = Request::builder()
        .uri("/admin/status")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_KEY))
        .body(Body::empty())
        .unwrap();
    let (status, _, res) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["tracked_identifiers"], 0);
}

#[tokio::test]
async fn test_validate_cliente_requires_csrf() {
    let router = GuardServer::new(test_config()).router();
    let payload = json!({ "nombre": "Ana", "apellido": "Rojas", "rut": "12.345.678-5" });

    let (status, _, _) = send(&router, json_request(Method::POST, "/api/clientes/validate", &payload, &[])).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = fetch_csrf(&router).await;
    let cookie = format!("csrf_token={}", token);
    let other = "0".repeat(64);
    let mismatched = [("cookie", cookie.as_str()), ("x-csrf-token", other.as_str())];
    let (status, _, _) = send(&router, json_request(Method::POST, "/api/clientes/validate", &payload, &mismatched)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_validate_cliente_sanitizes_and_aggregates() {
    let router = GuardServer::new(test_config()).router();
    let token = fetch_csrf(&router).await;
    let cookie = format!("csrf_token={}", token);
    let headers = [("cookie", cookie.as_str()), ("x-csrf-token", token.as_str())];

    let valid = json!({
        "nombre": "  <b>Ana</b> ",
        "apellido": "Rojas",
        "rut": "12.345.678-5",
        "correo": "ana@correo.cl",
        "telefono": "+56 9 1234 5678",
        "peso": 61.5,
    });
    let (status, _, res) = send(&router, json_request(Method::POST, "/api/clientes/validate", &valid, &headers)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["validation"]["isValid"], true);
    assert_eq!(res["data"]["nombre"], "bAna/b");
    assert_eq!(res["data"]["peso"], 61.5);

    let invalid = json!({ "nombre": "A", "apellido": "B", "rut": "bad" });
    let (status, _, res) = send(&router, json_request(Method::POST, "/api/clientes/validate", &invalid, &headers)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res["validation"]["isValid"], false);
    assert_eq!(
        res["validation"]["errors"],
        json!([
            "El nombre debe tener al menos 2 caracteres",
            "El apellido debe tener al menos 2 caracteres",
            "El RUT no es válido",
        ])
    );
}

#[tokio::test]
async fn test_validate_cliente_rejects_unsafe_payload() {
    let router = GuardServer::new(test_config()).router();
    let token = fetch_csrf(&router).await;
    let cookie = format!("csrf_token={}", token);
    let headers = [("cookie", cookie.as_str()), ("x-csrf-token", token.as_str())];

    let payload = json!({ "nombre": "Ana", "observaciones": "vbscript:msgbox(1)" });
    let (status, _, res) = send(&router, json_request(Method::POST, "/api/clientes/validate", &payload, &headers)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["error"], "Los datos del formulario no son seguros");
}

#[tokio::test]
async fn test_csrf_can_be_disabled() {
    let mut config = test_config();
    config.security.require_csrf = false;
    let router = GuardServer::new(config).router();

    let payload = json!({ "nombre": "Ana", "apellido": "Rojas", "rut": "12345678-5" });
    let (status, _, _) = send(&router, json_request(Method::POST, "/api/clientes/validate", &payload, &[])).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_requires_key() {
    let router = GuardServer::new(test_config()).router();

    let request = Request::builder().uri("/admin/status").body(Body::empty()).unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/admin/status")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_disabled_by_default() {
    let mut config = test_config();
    config.admin.enabled = false;
    let router = GuardServer::new(config).router();

    let request = Request::builder()
        .uri("/admin/status")
        .header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_KEY))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_inspects_and_resets_limiter() {
    let router = GuardServer::new(test_config()).router();
    let auth = format!("Bearer {}", ADMIN_KEY);
    let body = json!({ "method": "email", "username": "ana@correo.cl" });

    for _ in 0..5 {
        send(&router, json_request(Method::POST, "/api/login/attempt", &body, &[])).await;
    }

    let request = Request::builder()
        .uri("/admin/rate-limit/email_ana@correo.cl")
        .header(header::AUTHORIZATION, &auth)
        .body(Body::empty())
        .unwrap();
    let (status, _, res) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["remaining"], 0);
    assert_eq!(res["max_attempts"], 5);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/admin/rate-limit/email_ana@correo.cl")
        .header(header::AUTHORIZATION, &auth)
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&router, json_request(Method::POST, "/api/login/attempt", &body, &[])).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/admin/status")
        .header(header::AUTHORIZATION, &auth)
        .body(Body::empty())
        .unwrap();
    let (status, _, res) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["status"], "operational");
    assert_eq!(res["tracked_identifiers"], 1);
    assert_eq!(res["window_ms"], 900_000);
}
