// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-session
//!
//! Client-side holder for portal session tokens.
//!
//! [`SessionState`] exchanges a long-lived credential for a short-lived
//! session token through a [`TokenMinter`], and re-exchanges it shortly
//! before it expires. A UI layer renders from [`SessionState::subscribe`]
//! and reads the token for each request from
//! [`SessionState::current_token`].
//!
//! ```rust,ignore
//! let minter = Arc::new(HttpTokenMinter::new("https://portal.example.com")?);
//! let session = SessionState::with_credential(minter, credential);
//! session.mint().await?;
//!
//! let token = session.current_token();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod minter;
pub mod schedule;
pub mod state;
pub mod status;

pub use error::{SessionError, SessionResult};
pub use minter::{HttpTokenMinter, TokenMinter, DEFAULT_MINT_TIMEOUT};
pub use schedule::RefreshPolicy;
pub use state::{RefreshOutcome, SessionState};
pub use status::SessionStatus;
