// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod inspect;
mod issue_credential;
mod policy;
mod serve;
mod validate;
mod version;

pub use inspect::inspect;
pub use issue_credential::issue_credential;
pub use policy::policy;
pub use serve::serve;
pub use validate::validate;
pub use version::version;

use portal_api::ApiConfig;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Serve(args) => serve::serve(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::IssueCredential(args) => issue_credential::issue_credential(&cli, args),
        Commands::Inspect(args) => inspect::inspect(&cli, args),
        Commands::Policy(args) => policy::policy(&cli, args),
        Commands::Version => version::version(&cli),
    }
}

/// Loads the configuration named on the command line, plus environment.
pub(crate) fn load_config(cli: &Cli) -> BinResult<ApiConfig> {
    Ok(ApiConfig::load(cli.config.as_deref())?)
}
