// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use portal_core::{ModuleDescriptor, Role, SessionClaims};
use serde::{Deserialize, Serialize};

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// The verified claims of the caller's session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Role carried by the token.
    pub role: Role,
    /// Subject of the token.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Seconds until the token expires.
    #[serde(rename = "expiresInSec")]
    pub expires_in_sec: u64,
    /// Module ids the role may open.
    pub accessible_modules: Vec<String>,
}

impl SessionResponse {
    /// Builds the response for `claims` at time `now`.
    pub fn new(claims: SessionClaims, now: i64, accessible_modules: Vec<String>) -> Self {
        let expires_in_sec = claims
            .time_until_expiration(now)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            role: claims.role,
            sub: claims.sub,
            iat: claims.iat,
            exp: claims.exp,
            expires_in_sec,
            accessible_modules,
        }
    }
}

// =============================================================================
// Modules
// =============================================================================

/// A module entry in the module list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Module descriptor.
    #[serde(flatten)]
    pub module: ModuleDescriptor,
    /// Whether the caller's role may open the module.
    pub accessible: bool,
}

/// Module list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleListResponse {
    /// Caller's role.
    pub role: Role,
    /// Every module in policy order.
    pub modules: Vec<ModuleSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_response_serialization() {
        let claims = SessionClaims::new(Role::User, "alice", 1_000, 300).unwrap();
        let response = SessionResponse::new(claims, 1_030, vec!["job-tracking".to_string()]);

        assert_eq!(response.expires_in_sec, 270);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["role"], "User");
        assert_eq!(json["expiresInSec"], 270);
        assert_eq!(json["accessibleModules"][0], "job-tracking");
    }

    #[test]
    fn test_module_summary_is_flat() {
        let summary = ModuleSummary {
            module: ModuleDescriptor::new("monitor", "Monitor Dashboard", Role::Guest),
            accessible: true,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], "monitor");
        assert_eq!(json["requiredRole"], "Guest");
        assert_eq!(json["accessible"], true);
    }
}
