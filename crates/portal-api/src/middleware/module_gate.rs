// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Module access gate.
//!
//! Runs inside [`AuthLayer`](super::AuthLayer) and guards every path under
//! [`MODULE_PATH_PREFIX`]. The role comes from the verified session token,
//! never from the request itself.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use portal_core::audit::{AuditEvent, AuditLogger};
use portal_core::{AccessDecision, AuthError, ModuleAccessPolicy};
use tower::{Layer, Service};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::record;

/// Path prefix of gated module resources.
pub const MODULE_PATH_PREFIX: &str = "/api/modules/";

/// Returns the module id of a gated path, if any.
///
/// `/api/modules/validator` and `/api/modules/validator/nodes` both yield
/// `validator`; `/api/modules` itself is not gated.
pub fn module_id_from_path(path: &str) -> Option<&str> {
    path.strip_prefix(MODULE_PATH_PREFIX)
        .and_then(|rest| rest.split('/').next())
        .filter(|id| !id.is_empty())
}

// =============================================================================
// ModuleGateLayer
// =============================================================================

/// Layer that enforces the module access policy.
#[derive(Clone)]
pub struct ModuleGateLayer {
    policy: Arc<ModuleAccessPolicy>,
    audit: Arc<dyn AuditLogger>,
    log_granted: bool,
}

impl ModuleGateLayer {
    /// Creates a gate for the given policy.
    pub fn new(policy: Arc<ModuleAccessPolicy>, audit: Arc<dyn AuditLogger>) -> Self {
        Self {
            policy,
            audit,
            log_granted: false,
        }
    }

    /// Also audits allowed requests.
    pub fn log_granted(mut self, enabled: bool) -> Self {
        self.log_granted = enabled;
        self
    }
}

impl<S> Layer<S> for ModuleGateLayer {
    type Service = ModuleGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ModuleGate {
            inner,
            policy: self.policy.clone(),
            audit: self.audit.clone(),
            log_granted: self.log_granted,
        }
    }
}

// =============================================================================
// ModuleGate
// =============================================================================

/// Middleware that enforces the module access policy.
#[derive(Clone)]
pub struct ModuleGate<S> {
    inner: S,
    policy: Arc<ModuleAccessPolicy>,
    audit: Arc<dyn AuditLogger>,
    log_granted: bool,
}

impl<S> Service<Request<Body>> for ModuleGate<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let policy = self.policy.clone();
        let audit = self.audit.clone();
        let log_granted = self.log_granted;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(module) = module_id_from_path(req.uri().path()).map(str::to_string) else {
                return inner.call(req).await;
            };

            let Some(ctx) = req.extensions().get::<AuthContext>().cloned() else {
                return Ok(ApiError::from(AuthError::MissingCredential).into_response());
            };
            let Some(claims) = ctx.claims else {
                return Ok(ApiError::from(AuthError::MissingCredential).into_response());
            };

            match policy.decide(claims.role, &module) {
                AccessDecision::Allowed(_) => {
                    if log_granted {
                        let event = AuditEvent::access_granted(claims.role, &claims.sub, &module)
                            .with_client_ip(ctx.client_ip)
                            .with_request_id(Some(ctx.request_id));
                        record(audit.as_ref(), event).await;
                    }
                    inner.call(req).await
                }
                AccessDecision::Denied { required } => {
                    tracing::info!(
                        request_id = %ctx.request_id,
                        role = %claims.role,
                        sub = %claims.sub,
                        module = %module,
                        required = %required,
                        "Module access denied"
                    );
                    let event =
                        AuditEvent::access_denied(claims.role, &claims.sub, &module, required)
                            .with_client_ip(ctx.client_ip)
                            .with_request_id(Some(ctx.request_id));
                    record(audit.as_ref(), event).await;

                    Ok(ApiError::from(AuthError::InsufficientRole {
                        role: claims.role,
                        module,
                        required,
                    })
                    .into_response())
                }
                AccessDecision::UnknownModule => {
                    tracing::debug!(module = %module, "Unknown module requested");
                    Ok(ApiError::not_found(format!("module '{}'", module)).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use portal_core::audit::{AuditAction, InMemoryAuditLogger};
    use portal_core::{Role, SessionClaims};
    use tower::ServiceExt;

    type OkFuture = Pin<Box<dyn Future<Output = Result<Response, std::convert::Infallible>> + Send>>;

    fn ok_service() -> tower::util::ServiceFn<fn(Request<Body>) -> OkFuture> {
        let handler: fn(Request<Body>) -> OkFuture =
            |_req| Box::pin(async { Ok(Response::new(Body::from("module"))) });
        tower::service_fn(handler)
    }

    fn gate(audit: &InMemoryAuditLogger) -> ModuleGate<tower::util::ServiceFn<fn(Request<Body>) -> OkFuture>> {
        ModuleGateLayer::new(
            Arc::new(ModuleAccessPolicy::new()),
            Arc::new(audit.clone()),
        )
        .log_granted(true)
        .layer(ok_service())
    }

    fn request(path: &str, role: Option<Role>) -> Request<Body> {
        let mut req = Request::builder().uri(path).body(Body::empty()).unwrap();
        let ctx = match role {
            Some(role) => {
                AuthContext::authenticated(SessionClaims::new(role, "tester", 0, 300).unwrap())
            }
            None => AuthContext::anonymous(),
        };
        req.extensions_mut().insert(ctx);
        req
    }

    #[test]
    fn test_module_id_from_path() {
        assert_eq!(module_id_from_path("/api/modules/validator"), Some("validator"));
        assert_eq!(module_id_from_path("/api/modules/validator/nodes"), Some("validator"));
        assert_eq!(module_id_from_path("/api/modules/"), None);
        assert_eq!(module_id_from_path("/api/modules"), None);
        assert_eq!(module_id_from_path("/health"), None);
    }

    #[tokio::test]
    async fn test_allowed_role_passes() {
        let audit = InMemoryAuditLogger::new();
        let response = gate(&audit)
            .oneshot(request("/api/modules/validator", Some(Role::Validator)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(audit.entries_for_action(AuditAction::AccessGranted).len(), 1);
    }

    #[tokio::test]
    async fn test_admin_passes_everywhere() {
        let audit = InMemoryAuditLogger::new();
        for module in ["job-tracking", "reconciliation", "validator", "system-status", "monitor"] {
            let response = gate(&audit)
                .oneshot(request(&format!("/api/modules/{}", module), Some(Role::Admin)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "module {}", module);
        }
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let audit = InMemoryAuditLogger::new();
        let response = gate(&audit)
            .oneshot(request("/api/modules/reconciliation", Some(Role::User)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let denied = audit.entries_for_action(AuditAction::AccessDenied);
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].resource.as_deref(), Some("reconciliation"));
    }

    #[tokio::test]
    async fn test_unknown_module_is_not_found() {
        let audit = InMemoryAuditLogger::new();
        let response = gate(&audit)
            .oneshot(request("/api/modules/nope", Some(Role::Admin)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_anonymous_context_is_unauthorized() {
        let audit = InMemoryAuditLogger::new();
        let response = gate(&audit)
            .oneshot(request("/api/modules/monitor", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ungated_paths_pass_through() {
        let audit = InMemoryAuditLogger::new();
        let response = gate(&audit)
            .oneshot(request("/api/modules", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(audit.is_empty());
    }
}
