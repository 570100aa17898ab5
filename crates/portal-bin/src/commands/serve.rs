// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `serve` command.

use portal_api::{ApiServer, AppState};
use tracing::{info, warn};

use crate::cli::{Cli, ServeArgs};
use crate::error::BinResult;
use crate::shutdown::ShutdownCoordinator;

/// Executes the `serve` command to start the auth server.
pub async fn serve(cli: &Cli, args: ServeArgs) -> BinResult<()> {
    let mut config = super::load_config(cli)?;
    if args.dev_mode {
        config.dev_mode = true;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if config.dev_mode {
        warn!("Development mode enabled; missing secrets are generated per process");
    }

    let state = AppState::builder()
        .config(config)
        .build()
        .map_err(|e| crate::error::BinError::from(e).with_context("Failed to initialize"))?;
    let server = ApiServer::new(state);

    let coordinator = ShutdownCoordinator::new();
    tokio::spawn(coordinator.clone().listen_for_os_signals());

    info!(addr = %server.addr(), "Portal auth server starting");
    server.run_with_shutdown(coordinator.shutdown_signal()).await?;

    Ok(())
}
