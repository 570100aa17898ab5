// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-bin
//!
//! CLI binary for the portal auth server.
//!
//! - CLI argument parsing with clap
//! - Logging initialization
//! - Graceful shutdown handling
//! - Command implementations (serve, validate, issue-credential, ...)
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! portal -c /etc/portal/portal.yaml
//!
//! # Local development with generated secrets
//! portal serve --dev-mode
//!
//! # Validate configuration
//! portal validate --strict
//!
//! # Issue a credential for local testing
//! portal issue-credential --role Admin --secret "$IDP_SECRET"
//!
//! # Decode a token and check its signature
//! portal inspect <token> --secret "$SESSION_SECRET"
//!
//! # Show which modules a role may open
//! portal policy --role User
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
