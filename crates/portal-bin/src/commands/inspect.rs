// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `inspect` command.

use chrono::{DateTime, Utc};
use portal_core::token::EncodedToken;
use portal_core::{AuthError, CredentialClaims, SigningSecret, TokenVerifier};
use serde_json::Value;

use crate::cli::{Cli, InspectArgs, OutputFormat};
use crate::error::BinResult;

/// Result of inspecting a token.
#[derive(Debug)]
struct Inspection {
    header: Value,
    claims: Value,
    verification: Option<Result<(), AuthError>>,
}

/// Executes the `inspect` command.
///
/// Without `--secret` the token is only decoded; nothing it says is
/// trustworthy until verified.
pub fn inspect(_cli: &Cli, args: InspectArgs) -> BinResult<()> {
    let inspection = examine(&args.token, args.secret.as_deref())?;

    match args.format {
        OutputFormat::Text => print_text(&inspection),
        OutputFormat::Json => {
            let verification = match &inspection.verification {
                None => serde_json::json!({ "checked": false }),
                Some(Ok(())) => serde_json::json!({ "checked": true, "valid": true }),
                Some(Err(e)) => serde_json::json!({
                    "checked": true,
                    "valid": false,
                    "code": e.code(),
                    "reason": e.to_string(),
                }),
            };
            let output = serde_json::json!({
                "header": inspection.header,
                "claims": inspection.claims,
                "verification": verification,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn examine(token: &str, secret: Option<&str>) -> BinResult<Inspection> {
    let encoded = EncodedToken::parse(token.trim())?;
    let header = serde_json::to_value(encoded.header()?)?;
    let claims: Value = encoded.claims()?;

    let verification = secret.map(|secret| {
        TokenVerifier::new(SigningSecret::from(secret))
            .verify_as::<CredentialClaims>(token.trim())
            .map(|_| ())
    });

    Ok(Inspection {
        header,
        claims,
        verification,
    })
}

fn print_text(inspection: &Inspection) {
    println!("Header:");
    println!("  {}", inspection.header);
    println!("Claims:");
    if let Some(map) = inspection.claims.as_object() {
        for (key, value) in map {
            match (key.as_str(), value.as_i64()) {
                ("iat" | "exp", Some(ts)) => println!("  {:<5} {} ({})", key, ts, format_ts(ts)),
                _ => println!("  {:<5} {}", key, value),
            }
        }
    } else {
        println!("  {}", inspection.claims);
    }

    match &inspection.verification {
        None => println!("Signature: not checked (pass --secret to verify)"),
        Some(Ok(())) => println!("Signature: ✓ valid"),
        Some(Err(e)) => println!("Signature: ✗ {} ({})", e, e.code()),
    }
}

fn format_ts(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "out of range".to_string())
}
