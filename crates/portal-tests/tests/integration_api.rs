// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! Requests driven through the full router, middleware included.
//!
//! ## Test Categories
//!
//! - `test_swap_*`: `POST /auth/token-swap`
//! - `test_session_*`: `GET /auth/session`
//! - `test_gate_*`: 401 vs 403 vs 404 on module routes
//! - `test_audit_*`: Audit trail of the pipeline
//! - `test_cors_*`: Preflight handling

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use portal_core::audit::{AuditAction, AuditOutcome};
use portal_core::Role;
use portal_tests::prelude::*;
use serde_json::Value;
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn swap(credential: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/auth/token-swap");
    if let Some(credential) = credential {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", credential));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router().oneshot(request).await.unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Token Swap Tests
// =============================================================================

#[tokio::test]
async fn test_swap_returns_session_token() {
    init_test_logging();
    let app = TestApp::new();
    let credential = app.credential(Role::User, "alice");

    let response = send(&app, swap(Some(&credential))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["expiresInSec"], TTL_SECS);
    let token = body["token"].as_str().unwrap();

    let claims = app.state.tokens().verify(token).unwrap();
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.sub, "alice");
}

#[tokio::test]
async fn test_swap_without_credential() {
    let app = TestApp::new();

    let response = send(&app, swap(None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let body = json(response).await;
    assert_eq!(body["code"], "MISSING_CREDENTIAL");
    assert_eq!(body["error"], "missing credential");
}

#[tokio::test]
async fn test_swap_forged_credential_hides_detail() {
    let app = TestApp::new();

    let response = send(&app, swap(Some(&forged_credential(Role::Admin, "mallory")))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json(response).await;
    assert_eq!(body["error"], "invalid credential");
    assert!(!body.to_string().contains("signature"));
}

#[tokio::test]
async fn test_swap_rejects_get() {
    let app = TestApp::new();

    let response = send(&app, get("/auth/token-swap", None)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_swap_is_stateless() {
    let app = TestApp::new();
    let credential = app.credential(Role::Guest, "visitor");

    let first = json(send(&app, swap(Some(&credential))).await).await;
    app.clock.advance(1);
    let second = json(send(&app, swap(Some(&credential))).await).await;

    assert_ne!(first["token"], second["token"]);
    for body in [first, second] {
        let token = body["token"].as_str().unwrap();
        assert!(app.state.tokens().verify(token).is_ok());
    }
}

// =============================================================================
// Session Tests
// =============================================================================

#[tokio::test]
async fn test_session_reports_claims_and_modules() {
    let app = TestApp::new();
    let token = app.session_token(Role::Guest, "visitor");
    app.clock.advance(100);

    let response = send(&app, get("/auth/session", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["role"], "Guest");
    assert_eq!(body["sub"], "visitor");
    assert_eq!(body["expiresInSec"], TTL_SECS - 100);
    assert_eq!(
        body["accessibleModules"],
        serde_json::json!(["system-status", "monitor"])
    );
}

#[tokio::test]
async fn test_session_expired_token() {
    let app = TestApp::new();
    let token = app.session_token(Role::Admin, "root");
    app.clock.advance(TTL_SECS as i64 + 1);

    let response = send(&app, get("/auth/session", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json(response).await;
    assert_eq!(body["error"], "session expired");
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_session_credential_is_not_a_session_token() {
    let app = TestApp::new();
    let credential = app.credential(Role::Admin, "root");

    let response = send(&app, get("/auth/session", Some(&credential))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(response).await["error"], "invalid token");
}

// =============================================================================
// Module Gate Tests
// =============================================================================

#[tokio::test]
async fn test_gate_missing_token_is_401() {
    let app = TestApp::new();

    let response = send(&app, get("/api/modules/job-tracking", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_wrong_role_is_403() {
    let app = TestApp::new();
    let token = app.session_token(Role::User, "alice");

    let response = send(&app, get("/api/modules/reconciliation", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));

    let body = json(response).await;
    assert_eq!(body["code"], "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_gate_unknown_module_is_404() {
    let app = TestApp::new();
    let token = app.session_token(Role::Admin, "root");

    let response = send(&app, get("/api/modules/payroll", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gate_role_matrix() {
    let app = TestApp::new();
    let cases = [
        (Role::Admin, "reconciliation", StatusCode::OK),
        (Role::Admin, "validator", StatusCode::OK),
        (Role::User, "job-tracking", StatusCode::OK),
        (Role::User, "validator", StatusCode::FORBIDDEN),
        (Role::Validator, "validator", StatusCode::OK),
        (Role::Validator, "job-tracking", StatusCode::FORBIDDEN),
        (Role::Guest, "monitor", StatusCode::OK),
        (Role::Guest, "reconciliation", StatusCode::FORBIDDEN),
    ];

    for (role, module, expected) in cases {
        let token = app.session_token(role, "matrix");
        let uri = format!("/api/modules/{}", module);
        let response = send(&app, get(&uri, Some(&token))).await;
        assert_eq!(response.status(), expected, "{} -> {}", role, module);
    }
}

#[tokio::test]
async fn test_gate_granted_returns_descriptor() {
    let app = TestApp::new();
    let token = app.session_token(Role::Validator, "node-1");

    let response = send(&app, get("/api/modules/validator", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["id"], "validator");
    assert_eq!(body["requiredRole"], "Validator");
}

#[tokio::test]
async fn test_gate_list_marks_accessible() {
    let app = TestApp::new();
    let token = app.session_token(Role::User, "alice");

    let body = json(send(&app, get("/api/modules", Some(&token))).await).await;
    assert_eq!(body["role"], "User");

    let accessible: Vec<&str> = body["modules"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["accessible"] == true)
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(accessible, vec!["job-tracking"]);
}

// =============================================================================
// Audit Tests
// =============================================================================

#[tokio::test]
async fn test_audit_records_swap_and_denial() {
    let app = TestApp::new();
    let credential = app.credential(Role::User, "alice");

    let body = json(send(&app, swap(Some(&credential))).await).await;
    let token = body["token"].as_str().unwrap().to_string();
    send(&app, get("/api/modules/reconciliation", Some(&token))).await;
    send(&app, get("/api/modules/job-tracking", Some(&token))).await;

    let swaps = app.audit.entries_for_action(AuditAction::TokenSwap);
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].subject.as_deref(), Some("alice"));
    assert!(swaps[0].request_id.is_some());

    let denied = app.audit.entries_for_action(AuditAction::AccessDenied);
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].outcome, AuditOutcome::Denied);
    assert_eq!(denied[0].resource.as_deref(), Some("reconciliation"));

    let granted = app.audit.entries_for_action(AuditAction::AccessGranted);
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].role, Some(Role::User));
}

#[tokio::test]
async fn test_audit_flags_forged_session_token() {
    let app = TestApp::new();
    let forged = portal_core::TokenService::new(
        portal_core::SigningSecret::from(ATTACKER_SECRET),
        portal_core::CredentialTrust::ClaimsOnly,
        TTL_SECS,
        app.clock.clone(),
    )
    .mint(Role::Admin, "mallory")
    .unwrap()
    .token;

    let response = send(&app, get("/api/modules/reconciliation", Some(&forged))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let rejected = app.audit.entries_for_action(AuditAction::TokenRejected);
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].suspicious);
    assert_eq!(rejected[0].resource.as_deref(), Some("/api/modules/reconciliation"));
}

#[tokio::test]
async fn test_audit_swap_rejection() {
    let app = TestApp::new();

    send(&app, swap(Some("garbage"))).await;

    let rejected = app.audit.entries_for_action(AuditAction::TokenSwapRejected);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].code.as_deref(), Some("INVALID_CREDENTIAL"));
}

// =============================================================================
// Health and CORS Tests
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_cors_preflight_skips_auth() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/auth/token-swap")
        .header(header::ORIGIN, "https://portal.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
