// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `policy` command.

use portal_core::ModuleAccessPolicy;

use crate::cli::{Cli, OutputFormat, PolicyArgs};
use crate::error::BinResult;

/// Executes the `policy` command to print the module access table.
pub fn policy(_cli: &Cli, args: PolicyArgs) -> BinResult<()> {
    let policy = ModuleAccessPolicy::new();
    println!("{}", render(&policy, &args)?);
    Ok(())
}

fn render(policy: &ModuleAccessPolicy, args: &PolicyArgs) -> BinResult<String> {
    match (args.format, args.role) {
        (OutputFormat::Text, None) => Ok(policy.to_string()),
        (OutputFormat::Text, Some(role)) => {
            let mut out = format!("Modules accessible to {}:\n", role);
            for module in policy.accessible_modules(role) {
                out.push_str(&format!("  {:<16} {}\n", module.id, module.title));
            }
            Ok(out)
        }
        (OutputFormat::Json, None) => Ok(serde_json::to_string_pretty(policy.modules())?),
        (OutputFormat::Json, Some(role)) => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "role": role,
            "modules": policy.accessible_modules(role),
        }))?),
    }
}
