// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Portal - session token exchange and role-gated module access
//!
//! Main binary entry point.

use portal_bin::{commands, error::report_error_and_exit, init_logging, BinError, Cli};

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.effective_log_level(), cli.log_format);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => report_error_and_exit(BinError::runtime(format!(
            "Failed to start async runtime: {}",
            e
        ))),
    };

    if let Err(e) = runtime.block_on(commands::execute(cli)) {
        report_error_and_exit(e);
    }
}
