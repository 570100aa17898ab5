// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use portal_core::{Role, SessionClaims};
use uuid::Uuid;

/// Authentication context for a request.
///
/// Inserted into the request extensions by the auth middleware. Public
/// paths get an anonymous context so every handler can rely on the request
/// ID and client address being present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Request ID for tracing and audit correlation.
    pub request_id: Uuid,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Verified session claims; `None` on public paths.
    pub claims: Option<SessionClaims>,
}

impl AuthContext {
    /// Creates an anonymous context.
    pub fn anonymous() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            client_ip: None,
            claims: None,
        }
    }

    /// Creates a context for verified claims.
    pub fn authenticated(claims: SessionClaims) -> Self {
        Self {
            claims: Some(claims),
            ..Self::anonymous()
        }
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Sets the client IP.
    pub fn with_client_ip(mut self, client_ip: Option<IpAddr>) -> Self {
        self.client_ip = client_ip;
        self
    }

    /// Returns `true` if no token was verified.
    pub fn is_anonymous(&self) -> bool {
        self.claims.is_none()
    }

    /// Returns the role of the verified token.
    pub fn role(&self) -> Option<Role> {
        self.claims.as_ref().map(|c| c.role)
    }

    /// Returns the subject of the verified token.
    pub fn subject(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.sub.as_str())
    }
}
