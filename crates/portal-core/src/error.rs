// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization error taxonomy.
//!
//! Every variant carries enough detail for the audit trail, but only
//! [`AuthError::public_message`] may be shown to a caller. Structural and
//! cryptographic failures share one generic message so the response cannot
//! be used as an oracle.

use thiserror::Error;

use crate::role::Role;

/// Result type alias for token and policy operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors produced while decoding, verifying, minting or authorizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Wrong segment count or an undecodable segment.
    #[error("malformed token: {reason}")]
    MalformedToken {
        /// What was wrong with the token text.
        reason: String,
    },

    /// Structurally valid token whose signature does not match.
    #[error("token signature mismatch")]
    BadSignature,

    /// Valid signature, but the token is past its `exp`.
    #[error("token expired at {expired_at} (now {now})")]
    Expired {
        /// The `exp` claim of the token.
        expired_at: i64,
        /// The time the check was made at.
        now: i64,
    },

    /// No credential was presented to the exchange.
    #[error("no credential supplied")]
    MissingCredential,

    /// The presented credential could not be accepted.
    #[error("invalid credential: {reason}")]
    InvalidCredential {
        /// Why the credential was refused.
        reason: String,
    },

    /// The token is valid but its role may not open the module.
    #[error("role {role} may not access module '{module}' (requires {required})")]
    InsufficientRole {
        /// Role carried by the token.
        role: Role,
        /// Module that was requested.
        module: String,
        /// Role the module requires.
        required: Role,
    },

    /// Serializing a token segment failed.
    #[error("token encoding failed: {reason}")]
    Encoding {
        /// Serializer message.
        reason: String,
    },
}

impl AuthError {
    /// Creates a malformed token error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Creates an invalid credential error.
    pub fn invalid_credential(reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            reason: reason.into(),
        }
    }

    /// Returns a stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken { .. } | AuthError::BadSignature => "INVALID_TOKEN",
            AuthError::Expired { .. } => "TOKEN_EXPIRED",
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::InvalidCredential { .. } => "INVALID_CREDENTIAL",
            AuthError::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            AuthError::Encoding { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the detail-free message that may be sent to a client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MalformedToken { .. } | AuthError::BadSignature => "invalid token",
            AuthError::Expired { .. } => "session expired",
            AuthError::MissingCredential => "missing credential",
            AuthError::InvalidCredential { .. } => "invalid credential",
            AuthError::InsufficientRole { .. } => "insufficient role",
            AuthError::Encoding { .. } => "internal error",
        }
    }

    /// Returns `true` for failures that mean "who are you?" rather than
    /// "you may not".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken { .. }
                | AuthError::BadSignature
                | AuthError::Expired { .. }
                | AuthError::MissingCredential
                | AuthError::InvalidCredential { .. }
        )
    }

    /// Returns `true` if the failure may indicate a forgery attempt.
    pub fn is_suspicious(&self) -> bool {
        matches!(self, AuthError::BadSignature)
    }
}

// =============================================================================
// Tests
// =============================================================================
