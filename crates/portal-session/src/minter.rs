// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token minters.
//!
//! A [`TokenMinter`] turns a long-lived credential into a session token.
//! [`HttpTokenMinter`] talks to the portal's `/auth/token-swap` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use portal_core::{ErrorBody, TokenSwapResponse};
use reqwest::StatusCode;

use crate::error::{SessionError, SessionResult};

/// Path of the exchange endpoint.
pub const TOKEN_SWAP_PATH: &str = "/auth/token-swap";

/// Default request timeout for an exchange.
pub const DEFAULT_MINT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// TokenMinter
// =============================================================================

/// Exchanges a long-lived credential for a session token.
#[async_trait]
pub trait TokenMinter: Send + Sync {
    /// Performs one exchange.
    async fn mint(&self, credential: &str) -> SessionResult<TokenSwapResponse>;

    /// Returns the minter name for logging.
    fn name(&self) -> &str {
        "minter"
    }
}

// =============================================================================
// HttpTokenMinter
// =============================================================================

/// Minter that POSTs to `/auth/token-swap`.
#[derive(Debug, Clone)]
pub struct HttpTokenMinter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenMinter {
    /// Creates a minter for the portal at `base_url` with the default
    /// timeout.
    pub fn new(base_url: &str) -> SessionResult<Self> {
        Self::with_timeout(base_url, DEFAULT_MINT_TIMEOUT)
    }

    /// Creates a minter with an explicit request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> SessionResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_SWAP_PATH),
        })
    }

    /// Returns the exchange URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenMinter for HttpTokenMinter {
    async fn mint(&self, credential: &str) -> SessionResult<TokenSwapResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "unauthorized".to_string());
            return Err(SessionError::Rejected { message });
        }
        if !status.is_success() {
            return Err(SessionError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<TokenSwapResponse>()
            .await
            .map_err(|e| SessionError::invalid_response(e.to_string()))?;
        if body.token.is_empty() {
            return Err(SessionError::invalid_response("empty token"));
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            expires_in_sec = body.expires_in_sec,
            "Session token received"
        );
        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
