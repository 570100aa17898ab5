// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness check
//! - [`auth`]: token exchange and session introspection
//! - [`modules`]: module listing and gated module resources

mod auth;
mod health;
mod modules;

pub use auth::*;
pub use health::*;
pub use modules::*;
