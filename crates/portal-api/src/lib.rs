// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-api
//!
//! HTTP surface of the portal auth service.
//!
//! This crate exposes the credential to session token exchange, session
//! introspection and the role-gated module resources. Session tokens are
//! verified by [`middleware::AuthLayer`]; module access is enforced by
//! [`middleware::ModuleGateLayer`] using the shared
//! [`portal_core::ModuleAccessPolicy`].
//!
//! ## Endpoints
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | GET | `/health` | public |
//! | POST | `/auth/token-swap` | long-lived credential |
//! | GET | `/auth/session` | session token |
//! | GET | `/api/modules` | session token |
//! | GET | `/api/modules/{module}` | session token with the module's role |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::AuthContext;
pub use config::{ApiConfig, ConfigError, ConfigResult, TrustMode};
pub use error::{ApiError, ApiResult};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
