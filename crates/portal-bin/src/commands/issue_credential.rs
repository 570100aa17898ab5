// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `issue-credential` command.

use std::time::Duration;

use chrono::{DateTime, Utc};
use portal_core::{CredentialIssuer, SigningSecret};

use crate::cli::{Cli, IssueCredentialArgs};
use crate::error::{BinError, BinResult};

/// Executes the `issue-credential` command.
///
/// Prints only the credential on stdout so it can be captured by scripts.
pub fn issue_credential(cli: &Cli, args: IssueCredentialArgs) -> BinResult<()> {
    let secret = match args.secret.clone().filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => super::load_config(cli)?.credentials.secret,
    };
    let credential = issue(&secret, &args)?;

    if !cli.quiet {
        let expiry = args
            .lifetime_secs
            .and_then(|secs| DateTime::<Utc>::from_timestamp(Utc::now().timestamp() + secs as i64, 0))
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        eprintln!(
            "Issued {} credential for '{}' (expires: {})",
            args.role, args.subject, expiry
        );
    }
    println!("{}", credential);

    Ok(())
}

fn issue(secret: &str, args: &IssueCredentialArgs) -> BinResult<String> {
    if secret.is_empty() {
        return Err(BinError::config(
            "No identity provider secret: pass --secret or set PORTAL_CREDENTIALS__SECRET",
        ));
    }

    let issuer = CredentialIssuer::new(SigningSecret::from(secret));
    let lifetime = args.lifetime_secs.map(Duration::from_secs);
    Ok(issuer.issue(args.role, &args.subject, lifetime)?)
}
