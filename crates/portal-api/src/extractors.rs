// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use portal_core::{AuthError, SessionClaims};

use crate::auth::{extract_bearer_token, AuthContext};
use crate::error::ApiError;

// =============================================================================
// Session Extractor
// =============================================================================

/// Extractor for requests carrying a verified session token.
///
/// Returns 401 if the auth middleware did not verify a token.
///
/// ```rust,ignore
/// async fn handler(Session(claims): Session) -> impl IntoResponse {
///     format!("Hello, {}", claims.sub)
/// }
/// ```
pub struct Session(pub SessionClaims);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.claims.clone())
            .map(Session)
            .ok_or(ApiError::Auth(AuthError::MissingCredential))
    }
}

// =============================================================================
// Request Context Extractor
// =============================================================================

/// Extractor for the request context, authenticated or not.
///
/// Falls back to a fresh anonymous context when the auth middleware is not
/// installed.
pub struct RequestContext(pub AuthContext);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_else(AuthContext::anonymous);
        Ok(RequestContext(ctx))
    }
}

// =============================================================================
// Bearer Extractor
// =============================================================================

/// Extractor for the raw bearer token, if any.
pub struct Bearer(pub Option<String>);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Bearer(extract_bearer_token(&parts.headers).map(str::to_string)))
    }
}

// =============================================================================
// Tests
// =============================================================================
