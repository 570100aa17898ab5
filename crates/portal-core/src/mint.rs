// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token minting service.
//!
//! Exchanges a long-lived identity credential for a short-lived session
//! token. The service is stateless: the secret, TTL and credential trust
//! mode are fixed at construction and every call is independent.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, AuthResult};
use crate::role::Role;
use crate::signature::SigningSecret;
use crate::token::{
    self, CredentialClaims, EncodedToken, SessionClaims, TemporalClaims, TokenHeader,
    DEFAULT_SUBJECT,
};

/// Default session token lifetime.
pub const DEFAULT_TTL_SECS: u64 = 300;

// =============================================================================
// CredentialTrust
// =============================================================================

/// How much the exchange trusts the long-lived credential it is given.
#[derive(Debug, Clone)]
pub enum CredentialTrust {
    /// The credential signature is checked against the identity provider
    /// secret before any claim is read.
    Verified {
        /// Identity provider secret.
        secret: SigningSecret,
    },
    /// Claims are read without checking the signature. Only the credential's
    /// own `exp` is enforced. For local development only.
    ClaimsOnly,
}

impl CredentialTrust {
    /// Returns a short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialTrust::Verified { .. } => "verified",
            CredentialTrust::ClaimsOnly => "claims_only",
        }
    }

    /// Returns `true` if credential signatures are checked.
    pub fn is_verified(&self) -> bool {
        matches!(self, CredentialTrust::Verified { .. })
    }
}

// =============================================================================
// MintedToken
// =============================================================================

/// A freshly minted session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedToken {
    /// Encoded token.
    pub token: String,
    /// Claims inside the token.
    pub claims: SessionClaims,
    /// Lifetime in seconds.
    pub expires_in_secs: u64,
}

// =============================================================================
// TokenService
// =============================================================================

/// Mints and verifies session tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: SigningSecret,
    ttl_secs: u64,
    credential_trust: CredentialTrust,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a service signing session tokens with `secret` and accepting
    /// credentials according to `credential_trust`.
    ///
    /// The identity provider secret must differ from the session secret,
    /// otherwise every session token is also a credential.
    pub fn new(
        secret: SigningSecret,
        credential_trust: CredentialTrust,
        ttl_secs: u64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            secret,
            ttl_secs,
            credential_trust,
            clock,
        }
    }

    /// Starts a builder.
    pub fn builder(
        secret: SigningSecret,
        credential_trust: CredentialTrust,
    ) -> TokenServiceBuilder {
        TokenServiceBuilder::new(secret, credential_trust)
    }

    /// Returns the session token lifetime.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Returns the credential trust mode.
    pub fn credential_trust(&self) -> &CredentialTrust {
        &self.credential_trust
    }

    /// Returns the clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Exchanges a bearer credential for a session token.
    pub fn exchange(&self, credential: Option<&str>) -> AuthResult<MintedToken> {
        let raw = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let now = self.clock.now();
        let claims = self.accept_credential(raw, now)?;
        let role = claims.role()?;
        let subject = claims.subject().unwrap_or(DEFAULT_SUBJECT);

        let minted = self.mint_at(role, subject, now)?;
        debug!(
            role = %role,
            sub = %minted.claims.sub,
            exp = minted.claims.exp,
            "Session token minted"
        );
        Ok(minted)
    }

    fn accept_credential(&self, raw: &str, now: i64) -> AuthResult<CredentialClaims> {
        match &self.credential_trust {
            CredentialTrust::Verified { secret } => {
                token::verify::<CredentialClaims>(raw, secret, now).map_err(|e| match e {
                    AuthError::Expired { .. } => e,
                    other => AuthError::invalid_credential(other.to_string()),
                })
            }
            CredentialTrust::ClaimsOnly => {
                let claims: CredentialClaims = EncodedToken::parse(raw)
                    .and_then(|encoded| encoded.claims())
                    .map_err(|e| AuthError::invalid_credential(e.to_string()))?;
                match claims.exp() {
                    Some(exp) if now > exp => Err(AuthError::Expired {
                        expired_at: exp,
                        now,
                    }),
                    _ => Ok(claims),
                }
            }
        }
    }

    /// Mints a session token for `role` and `subject` at the current time.
    pub fn mint(&self, role: Role, subject: &str) -> AuthResult<MintedToken> {
        self.mint_at(role, subject, self.clock.now())
    }

    fn mint_at(&self, role: Role, subject: &str, now: i64) -> AuthResult<MintedToken> {
        let ttl = i64::try_from(self.ttl_secs).map_err(|_| AuthError::Encoding {
            reason: format!("ttl {}s out of range", self.ttl_secs),
        })?;
        let claims = SessionClaims::new(role, subject, now, ttl)?;
        let token = token::encode(&TokenHeader::default(), &claims, &self.secret)?;
        Ok(MintedToken {
            token,
            claims,
            expires_in_secs: self.ttl_secs,
        })
    }

    /// Verifies a session token and returns its claims.
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        token::verify(token, &self.secret, self.clock.now())
    }
}

/// Builder for [`TokenService`].
#[derive(Debug)]
pub struct TokenServiceBuilder {
    secret: SigningSecret,
    ttl_secs: u64,
    credential_trust: CredentialTrust,
    clock: Arc<dyn Clock>,
}

impl TokenServiceBuilder {
    fn new(secret: SigningSecret, credential_trust: CredentialTrust) -> Self {
        Self {
            secret,
            ttl_secs: DEFAULT_TTL_SECS,
            credential_trust,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the session token lifetime.
    pub fn ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Sets the clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the service.
    pub fn build(self) -> TokenService {
        if !self.credential_trust.is_verified() {
            warn!("Credential signatures are NOT verified; use only for local development");
        }
        TokenService::new(self.secret, self.credential_trust, self.ttl_secs, self.clock)
    }
}

// =============================================================================
// CredentialIssuer
// =============================================================================

/// Issues long-lived credentials the way an identity provider would.
///
/// Used by the `issue-credential` command and by tests.
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    secret: SigningSecret,
    clock: Arc<dyn Clock>,
}

/// Claims written by [`CredentialIssuer::issue`].
#[derive(Serialize)]
struct IssuedCredential<'a> {
    role: &'a str,
    sub: &'a str,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

impl CredentialIssuer {
    /// Creates an issuer using the system clock.
    pub fn new(secret: SigningSecret) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Creates an issuer with an explicit clock.
    pub fn with_clock(secret: SigningSecret, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// Issues a credential. `lifetime` of `None` never expires.
    pub fn issue(
        &self,
        role: Role,
        subject: &str,
        lifetime: Option<Duration>,
    ) -> AuthResult<String> {
        let now = self.clock.now();
        let exp = match lifetime {
            Some(d) => Some(
                i64::try_from(d.as_secs())
                    .ok()
                    .and_then(|secs| now.checked_add(secs))
                    .ok_or_else(|| AuthError::Encoding {
                        reason: format!("credential lifetime {}s overflows", d.as_secs()),
                    })?,
            ),
            None => None,
        };
        let claims = IssuedCredential {
            role: role.as_str(),
            sub: subject,
            iat: now,
            exp,
        };
        token::encode(&TokenHeader::default(), &claims, &self.secret)
    }

    /// Issues a credential carrying arbitrary claims.
    pub fn issue_claims(&self, claims: &CredentialClaims) -> AuthResult<String> {
        token::encode(&TokenHeader::default(), claims, &self.secret)
    }
}

// =============================================================================
// Tests
// =============================================================================
