// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Portal Integration Tests
//!
//! Integration tests for the portal workspace, plus the fixtures and
//! harness they share.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p portal-tests
//!
//! # Run a specific suite
//! cargo test -p portal-tests --test integration_token
//! cargo test -p portal-tests --test integration_api
//! cargo test -p portal-tests --test integration_session
//! ```
//!
//! ## Test Categories
//!
//! ### Token Tests (`integration_token.rs`)
//! - Exchange scenarios (valid, forged, expired, missing role)
//! - Tamper detection over arbitrary bit flips
//! - Interoperability with a third-party JWT implementation
//!
//! ### API Tests (`integration_api.rs`)
//! - 401 vs 403 vs 404 at the module gate
//! - Token exchange over HTTP
//! - Audit trail of the request pipeline
//!
//! ### Session Tests (`integration_session.rs`)
//! - `SessionState` against a live server on a loopback port
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use portal_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let credential = app.credential(Role::User, "alice");
//!     // ... drive app.router()
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::init_test_logging;
}
