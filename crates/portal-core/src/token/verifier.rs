// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token verification.
//!
//! Checks run in a fixed order and nothing inside the header or claims is
//! looked at until the signature has matched:
//!
//! 1. split into three segments
//! 2. recompute the signature over `header.claims`
//! 3. compare against the supplied signature in constant time
//! 4. decode header and claims
//! 5. check expiry (inclusive: valid while `now <= exp`)

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::trace;

use super::claims::{SessionClaims, TemporalClaims};
use super::codec::EncodedToken;
use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, AuthResult};
use crate::signature::{self, SigningSecret};

/// Verifies `token` under `secret` at time `now` and returns its claims.
pub fn verify<C>(token: &str, secret: &SigningSecret, now: i64) -> AuthResult<C>
where
    C: DeserializeOwned + TemporalClaims,
{
    let encoded = EncodedToken::parse(token)?;

    let expected = signature::sign(encoded.signing_input(), secret);
    // An undecodable or wrong-length signature is still just a wrong signature.
    let supplied = encoded
        .signature_bytes()
        .map_err(|_| AuthError::BadSignature)?;
    if !signature::constant_time_eq(&expected, &supplied) {
        return Err(AuthError::BadSignature);
    }

    let header = encoded.header()?;
    if !header.is_supported() {
        return Err(AuthError::malformed(format!(
            "unsupported header alg={} typ={}",
            header.alg, header.typ
        )));
    }

    let claims: C = encoded.claims()?;
    if let Some(exp) = claims.exp() {
        if now > exp {
            return Err(AuthError::Expired {
                expired_at: exp,
                now,
            });
        }
    }

    trace!(now, "token verified");
    Ok(claims)
}

// =============================================================================
// TokenVerifier
// =============================================================================

/// Verifier bound to one secret and one clock.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    secret: SigningSecret,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Creates a verifier using the system clock.
    pub fn new(secret: SigningSecret) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Creates a verifier with an explicit clock.
    pub fn with_clock(secret: SigningSecret, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// Verifies a session token.
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        self.verify_as(token)
    }

    /// Verifies a token carrying arbitrary claims.
    pub fn verify_as<C>(&self, token: &str) -> AuthResult<C>
    where
        C: DeserializeOwned + TemporalClaims,
    {
        verify(token, &self.secret, self.clock.now())
    }
}

// =============================================================================
// Tests
// =============================================================================
