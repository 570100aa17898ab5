// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::role::Role;

/// Subject used when a credential names no subject.
pub const DEFAULT_SUBJECT: &str = "local-dev";

/// Claims whose validity depends on the current time.
pub trait TemporalClaims {
    /// Returns the expiry in Unix seconds, if the claims carry one.
    fn exp(&self) -> Option<i64>;

    /// Returns `true` if the claims are expired at `now`.
    ///
    /// The boundary is inclusive: claims are still valid when `now == exp`.
    fn is_expired_at(&self, now: i64) -> bool {
        self.exp().is_some_and(|exp| now > exp)
    }
}

// =============================================================================
// SessionClaims
// =============================================================================

/// Claims of a short-lived session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Role granted by the token.
    pub role: Role,
    /// Subject the token was minted for.
    pub sub: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds). Always `iat + ttl`.
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims issued at `now` that live for `ttl_secs`.
    ///
    /// Fails with [`AuthError::Encoding`] if the expiry does not fit in an
    /// `i64`.
    pub fn new(role: Role, sub: impl Into<String>, now: i64, ttl_secs: i64) -> AuthResult<Self> {
        let exp = now.checked_add(ttl_secs).ok_or_else(|| AuthError::Encoding {
            reason: format!("expiry overflows: iat {} + ttl {}s", now, ttl_secs),
        })?;
        Ok(Self {
            role,
            sub: sub.into(),
            iat: now,
            exp,
        })
    }

    /// Returns the lifetime the token was issued with.
    pub fn ttl_secs(&self) -> i64 {
        self.exp.saturating_sub(self.iat)
    }

    /// Returns the time remaining until expiration at `now`.
    pub fn time_until_expiration(&self, now: i64) -> Option<Duration> {
        if self.exp >= now {
            Some(Duration::from_secs((self.exp - now) as u64))
        } else {
            None
        }
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}

impl TemporalClaims for SessionClaims {
    fn exp(&self) -> Option<i64> {
        Some(self.exp)
    }
}

// =============================================================================
// CredentialClaims
// =============================================================================

/// Claims of a long-lived identity credential.
///
/// Only `role` is required for an exchange; everything else is optional so
/// credentials from loosely specified issuers still parse. The role stays a
/// raw string here so an unknown role is reported as an invalid credential
/// rather than a malformed token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Role name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Legacy subject field used by some issuers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Issued at (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl CredentialClaims {
    /// Creates credential claims carrying `role`.
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Default::default()
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the issue time.
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Sets the expiration.
    pub fn with_expiry(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Returns the role, or an error if it is absent or unknown.
    pub fn role(&self) -> AuthResult<Role> {
        let name = self
            .role
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AuthError::invalid_credential("role claim is missing"))?;

        Role::parse(name)
            .ok_or_else(|| AuthError::invalid_credential(format!("unknown role '{}'", name)))
    }

    /// Returns the subject, falling back to the legacy `user` field.
    pub fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .or(self.user.as_deref())
            .filter(|s| !s.is_empty())
    }
}

impl TemporalClaims for CredentialClaims {
    fn exp(&self) -> Option<i64> {
        self.exp
    }
}

// =============================================================================
// Tests
// =============================================================================
