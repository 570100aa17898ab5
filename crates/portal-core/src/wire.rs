// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JSON bodies shared by the server and its clients.

use serde::{Deserialize, Serialize};

use crate::mint::MintedToken;

/// Response of `POST /auth/token-swap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSwapResponse {
    /// Encoded session token.
    pub token: String,
    /// Token lifetime in seconds.
    #[serde(rename = "expiresInSec")]
    pub expires_in_sec: u64,
}

impl From<MintedToken> for TokenSwapResponse {
    fn from(minted: MintedToken) -> Self {
        Self {
            token: minted.token,
            expires_in_sec: minted.expires_in_secs,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Generic, client-safe message.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}
