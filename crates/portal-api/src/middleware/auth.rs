// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session token authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    response::{IntoResponse, Response},
};
use portal_core::audit::{AuditEvent, AuditLogger};
use portal_core::{AuthError, TokenService};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{extract_bearer_token, AuthContext};
use crate::error::ApiError;
use crate::state::record;

/// Paths reachable without a session token.
pub const DEFAULT_PUBLIC_PATHS: [&str; 2] = ["/health", "/auth/token-swap"];

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for session token authentication.
///
/// Verifies the bearer token on every non-public path and stores an
/// [`AuthContext`] in the request extensions. Any verification failure is a
/// 401 with a generic body; the detailed reason goes to the audit log.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenService>,
    audit: Arc<dyn AuditLogger>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(tokens: Arc<TokenService>, audit: Arc<dyn AuditLogger>) -> Self {
        Self {
            tokens,
            audit,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A trailing `*` matches any path with that prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with default public paths.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect())
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: self.tokens.clone(),
            audit: self.audit.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for session token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenService>,
    audit: Arc<dyn AuditLogger>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public_path| {
            public_path
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let tokens = self.tokens.clone();
        let audit = self.audit.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            if is_public {
                let ctx = AuthContext::anonymous()
                    .with_request_id(request_id)
                    .with_client_ip(client_ip);
                req.extensions_mut().insert(ctx);
                return inner.call(req).await;
            }

            let verified = match extract_bearer_token(req.headers()) {
                Some(token) => tokens.verify(token),
                None => Err(AuthError::MissingCredential),
            };

            match verified {
                Ok(claims) => {
                    tracing::trace!(
                        request_id = %request_id,
                        role = %claims.role,
                        sub = %claims.sub,
                        "Session token verified"
                    );
                    let ctx = AuthContext::authenticated(claims)
                        .with_request_id(request_id)
                        .with_client_ip(client_ip);
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                }
                Err(e) => {
                    if e.is_suspicious() {
                        tracing::warn!(
                            request_id = %request_id,
                            client_ip = ?client_ip,
                            path = %req.uri().path(),
                            "Session token signature mismatch (possible forgery)"
                        );
                    } else {
                        tracing::debug!(request_id = %request_id, error = %e, "Session token rejected");
                    }

                    let event = AuditEvent::token_rejected(&e, req.uri().path())
                        .with_client_ip(client_ip)
                        .with_request_id(Some(request_id));
                    record(audit.as_ref(), event).await;

                    Ok(ApiError::from(e).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
