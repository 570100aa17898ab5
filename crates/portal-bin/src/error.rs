// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the `portal` binary and their exit codes.

use portal_api::{ApiError, ConfigError};
use portal_core::AuthError;
use thiserror::Error;

/// Result type alias for portal-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Process exit codes.
pub mod exit_code {
    /// Invalid or incomplete configuration.
    pub const CONFIG: i32 = 1;
    /// The server failed to start or stopped abnormally.
    pub const SERVER: i32 = 3;
    /// Writing command output failed.
    pub const OUTPUT: i32 = 4;
    /// A token could not be issued, decoded or verified.
    pub const TOKEN: i32 = 5;
}

/// Errors surfaced by `portal` commands.
#[derive(Debug, Error)]
pub enum BinError {
    /// Settings are missing or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The server could not run.
    #[error("Server error: {0}")]
    Server(String),

    /// HTTP layer failure while serving.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Token or credential failure.
    #[error("Token error: {0}")]
    Token(#[from] AuthError),

    /// Command output could not be produced.
    #[error("Output error: {0}")]
    Output(String),

    /// An error with a description of what was being attempted.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a server runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Wraps the error with what was being attempted.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => exit_code::CONFIG,
            Self::Server(_) | Self::Api(_) => exit_code::SERVER,
            Self::Output(_) => exit_code::OUTPUT,
            Self::Token(_) => exit_code::TOKEN,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// Returns a suggestion for the operator, if one applies.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Config(ConfigError::MissingSecret { env, .. }) => Some(format!(
                "set {} or pass --dev-mode for a throwaway local secret",
                env
            )),
            Self::Token(AuthError::BadSignature) => {
                Some("the token was not signed with the given secret".to_string())
            }
            Self::Token(AuthError::Expired { .. }) => {
                Some("issue a new credential or exchange for a fresh session token".to_string())
            }
            Self::WithContext { source, .. } => source.hint(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<serde_json::Error> for BinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(format!("JSON rendering failed: {}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints the error, its causes and any hint to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }

    if let Some(hint) = error.hint() {
        eprintln!("  Hint: {}", hint);
    }
}

/// Reports the error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
