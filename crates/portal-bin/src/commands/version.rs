// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("Portal - session token exchange and role-gated module access");
    println!();
    println!("Version Information:");
    println!("  portal-bin:     {}", env!("CARGO_PKG_VERSION"));
    println!("  portal-core:    {}", portal_core::VERSION);
    println!("  portal-api:     {}", portal_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:         {}", std::env::consts::ARCH);
    println!("  OS:             {}", std::env::consts::OS);
    println!();
    println!("Token Format:");
    println!(
        "  Algorithm:      {} ({})",
        portal_core::token::ALGORITHM,
        portal_core::token::TOKEN_TYPE
    );
    println!("  Default TTL:    {}s", portal_core::DEFAULT_TTL_SECS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
