// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every error becomes a `{ "error": ..., "code": ... }` body. The `error`
//! text is always the detail-free public message; the full error is only
//! written to the log.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use portal_core::{AuthError, ErrorBody};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token, credential or role failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) if e.is_authentication_failure() => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::InsufficientRole { .. }) => StatusCode::FORBIDDEN,
            ApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Auth(e) => e.code(),
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the message that is safe to show to clients.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Auth(e) => e.public_message(),
            ApiError::NotFound { .. } => "not found",
            ApiError::Internal { .. } => "internal error",
        }
    }

    /// Returns `true` if the client should authenticate and retry.
    pub fn needs_challenge(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }

    fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.user_message().to_string(),
            code: self.error_code().to_string(),
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Auth failures are already logged and audited where they happen.
        match &self {
            ApiError::Internal { .. } | ApiError::Auth(AuthError::Encoding { .. }) => {
                tracing::error!(error = %self, status = %status, "Request failed");
            }
            _ => tracing::debug!(code = self.error_code(), status = %status, "Request refused"),
        }

        let challenge = self.needs_challenge();
        let mut response = (status, Json(self.body())).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// =============================================================================
// Tests
// =============================================================================
