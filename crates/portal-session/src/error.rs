// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session client errors.

use portal_core::AuthError;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by the session holder and token minters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No long-lived credential is held, so nothing can be exchanged.
    #[error("no credential available for token exchange")]
    NoCredential,

    /// The server refused the credential (401).
    #[error("token exchange rejected: {message}")]
    Rejected {
        /// Generic message from the server's error body.
        message: String,
    },

    /// The server answered with a status other than 200 or 401.
    #[error("token exchange failed with HTTP {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// Connection failure or request timeout.
    #[error("token exchange transport error: {message}")]
    Transport {
        /// Underlying error text.
        message: String,
        /// Whether the request timed out.
        timed_out: bool,
    },

    /// The exchange response could not be understood.
    #[error("invalid token exchange response: {message}")]
    InvalidResponse {
        /// What was wrong with the response.
        message: String,
    },

    /// The minted token could not be decoded.
    #[error(transparent)]
    Token(#[from] AuthError),
}

impl SessionError {
    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns `true` if the server refused the credential.
    ///
    /// A rejected credential will not succeed on retry; the user has to
    /// sign in again.
    pub fn is_rejected(&self) -> bool {
        matches!(self, SessionError::Rejected { .. })
    }

    /// Returns `true` for network-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Transport { .. })
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        }
    }
}
