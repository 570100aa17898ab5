// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::sync::Arc;

use portal_api::{ApiConfig, TrustMode};
use portal_core::signature::RECOMMENDED_SECRET_LEN;
use portal_core::SystemClock;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config = super::load_config(cli)?;

    // Builds the token service exactly as `serve` would.
    config
        .token_service(Arc::new(SystemClock))
        .map_err(|e| BinError::config(format!("Configuration validation failed: {}", e)))?;

    let warnings = collect_warnings(&config);
    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(environment only)".to_string());

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", source);
            println!();
            println!("Summary:");
            println!("  Listen:           {}", config.socket_addr());
            println!("  Token TTL:        {}s", config.token.ttl_secs);
            println!("  Credential trust: {:?}", config.credentials.trust);
            println!("  Request timeout:  {}s", config.request_timeout_secs);
            println!("  Audit:            {}", if config.audit.enabled { "enabled" } else { "disabled" });

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "config": config,
                "warnings": warnings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Returns configuration that works but should not reach production.
fn collect_warnings(config: &ApiConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.dev_mode {
        warnings.push("Development mode is enabled".to_string());
    }
    if config.credentials.trust == TrustMode::ClaimsOnly {
        warnings.push("Credentials are accepted without signature verification".to_string());
    }
    if !config.token.secret.is_empty() && config.token.secret.len() < RECOMMENDED_SECRET_LEN {
        warnings.push(format!(
            "token.secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        ));
    }
    if !config.credentials.secret.is_empty()
        && config.credentials.secret.len() < RECOMMENDED_SECRET_LEN
    {
        warnings.push(format!(
            "credentials.secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        ));
    }
    if config.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin".to_string());
    }

    warnings
}
