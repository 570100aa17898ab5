// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Observable session status.

use std::fmt;

use portal_core::Role;

/// Status of the session holder, published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session token is held.
    #[default]
    NoToken,
    /// An exchange is in flight.
    Minting,
    /// A session token is held and a refresh is scheduled.
    Active {
        /// Role carried by the token.
        role: Role,
    },
    /// The last exchange failed; no valid token is held.
    Degraded {
        /// Why the exchange failed.
        reason: String,
    },
}

impl SessionStatus {
    /// Returns `true` while a token is held.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active { .. })
    }

    /// Returns `true` after a failed exchange.
    pub fn is_degraded(&self) -> bool {
        matches!(self, SessionStatus::Degraded { .. })
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::NoToken => write!(f, "no token"),
            SessionStatus::Minting => write!(f, "minting"),
            SessionStatus::Active { role } => write!(f, "active ({})", role),
            SessionStatus::Degraded { reason } => write!(f, "degraded: {}", reason),
        }
    }
}
