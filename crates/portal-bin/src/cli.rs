// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `serve`: Start the auth server (default)
//! - `validate`: Validate configuration
//! - `issue-credential`: Issue a long-lived credential for local use
//! - `inspect`: Decode and optionally verify a token
//! - `policy`: Print the module access table
//! - `version`: Show version information

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use portal_core::Role;

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Portal - credential exchange and role-gated module access
#[derive(Parser, Debug)]
#[command(
    name = "portal",
    author = "Sylvex <contact@sylvex.io>",
    version = portal_core::VERSION,
    about = "Session token exchange and role-gated module access",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long, env = "PORTAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "PORTAL_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "PORTAL_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the auth server
    ///
    /// This is the default command when no subcommand is specified.
    Serve(ServeArgs),

    /// Validate the configuration
    ///
    /// Loads the configuration file and environment and checks that the
    /// server could start with it.
    Validate(ValidateArgs),

    /// Issue a long-lived credential
    ///
    /// Signs a credential with the identity provider secret, standing in for
    /// the external identity provider during development and testing.
    #[command(name = "issue-credential")]
    IssueCredential(IssueCredentialArgs),

    /// Decode a token and optionally verify it
    Inspect(InspectArgs),

    /// Print the module access policy
    Policy(PolicyArgs),

    /// Show version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Generate missing secrets instead of refusing to start
    #[arg(long, env = "PORTAL_DEV_MODE")]
    pub dev_mode: bool,

    /// Override the bind address
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Override the port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `issue-credential` command.
#[derive(Args, Debug, Clone)]
pub struct IssueCredentialArgs {
    /// Role to grant (Admin, User, Validator, Guest)
    #[arg(short, long)]
    pub role: Role,

    /// Subject of the credential
    #[arg(short, long, default_value = "local-dev")]
    pub subject: String,

    /// Credential lifetime in seconds (default: never expires)
    #[arg(long)]
    pub lifetime_secs: Option<u64>,

    /// Identity provider secret (default: from configuration)
    #[arg(long, env = "PORTAL_CREDENTIALS__SECRET", hide_env_values = true)]
    pub secret: Option<String>,
}

/// Arguments for the `inspect` command.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Token to inspect
    pub token: String,

    /// Verify the signature with this secret
    #[arg(long)]
    pub secret: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `policy` command.
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Only list modules this role may open
    #[arg(short, long)]
    pub role: Option<Role>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Serve` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
