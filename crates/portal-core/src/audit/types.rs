// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit event types.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::role::Role;

// =============================================================================
// AuditAction
// =============================================================================

/// Types of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A credential was exchanged for a session token.
    TokenSwap,
    /// A credential exchange was refused.
    TokenSwapRejected,
    /// A session token was refused on a protected request.
    TokenRejected,
    /// A module was opened.
    AccessGranted,
    /// A module was refused for the caller's role.
    AccessDenied,
}

impl AuditAction {
    /// Returns the action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::TokenSwap => "token_swap",
            AuditAction::TokenSwapRejected => "token_swap_rejected",
            AuditAction::TokenRejected => "token_rejected",
            AuditAction::AccessGranted => "access_granted",
            AuditAction::AccessDenied => "access_denied",
        }
    }

    /// Returns `true` for actions that record a refusal.
    pub fn is_security_sensitive(&self) -> bool {
        matches!(
            self,
            AuditAction::TokenSwapRejected | AuditAction::TokenRejected | AuditAction::AccessDenied
        )
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The action succeeded.
    Success,
    /// The caller could not be authenticated.
    Failure,
    /// The caller was authenticated but not permitted.
    Denied,
}

// =============================================================================
// AuditEvent
// =============================================================================

/// One audit trail entry.
///
/// Unlike client responses, `reason` carries the full failure detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique entry ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub action: AuditAction,
    /// How it ended.
    pub outcome: AuditOutcome,
    /// Subject of the token or credential, when known.
    pub subject: Option<String>,
    /// Role of the token or credential, when known.
    pub role: Option<Role>,
    /// Module or endpoint involved.
    pub resource: Option<String>,
    /// Error code of a failure.
    pub code: Option<String>,
    /// Internal failure detail.
    pub reason: Option<String>,
    /// `true` when the failure may indicate forgery.
    #[serde(default)]
    pub suspicious: bool,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Request correlation ID.
    pub request_id: Option<Uuid>,
}

impl AuditEvent {
    /// Creates an event with no context.
    pub fn new(action: AuditAction, outcome: AuditOutcome) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            action,
            outcome,
            subject: None,
            role: None,
            resource: None,
            code: None,
            reason: None,
            suspicious: false,
            client_ip: None,
            request_id: None,
        }
    }

    /// A successful credential exchange.
    pub fn token_swap(role: Role, subject: impl Into<String>) -> Self {
        Self::new(AuditAction::TokenSwap, AuditOutcome::Success)
            .with_identity(role, subject)
            .with_resource("/auth/token-swap")
    }

    /// A refused credential exchange.
    pub fn token_swap_rejected(error: &AuthError) -> Self {
        Self::new(AuditAction::TokenSwapRejected, AuditOutcome::Failure)
            .with_error(error)
            .with_resource("/auth/token-swap")
    }

    /// A session token refused on a protected request.
    pub fn token_rejected(error: &AuthError, resource: impl Into<String>) -> Self {
        Self::new(AuditAction::TokenRejected, AuditOutcome::Failure)
            .with_error(error)
            .with_resource(resource)
    }

    /// A module opened by an authorized role.
    pub fn access_granted(role: Role, subject: impl Into<String>, module: impl Into<String>) -> Self {
        Self::new(AuditAction::AccessGranted, AuditOutcome::Success)
            .with_identity(role, subject)
            .with_resource(module)
    }

    /// A module refused for the caller's role.
    pub fn access_denied(
        role: Role,
        subject: impl Into<String>,
        module: impl Into<String>,
        required: Role,
    ) -> Self {
        let mut event = Self::new(AuditAction::AccessDenied, AuditOutcome::Denied)
            .with_identity(role, subject)
            .with_resource(module);
        event.code = Some("INSUFFICIENT_ROLE".to_string());
        event.reason = Some(format!("requires {}", required));
        event
    }

    /// Sets the role and subject.
    pub fn with_identity(mut self, role: Role, subject: impl Into<String>) -> Self {
        self.role = Some(role);
        self.subject = Some(subject.into());
        self
    }

    /// Sets the resource.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Records the code and full detail of an error.
    pub fn with_error(mut self, error: &AuthError) -> Self {
        self.code = Some(error.code().to_string());
        self.reason = Some(error.to_string());
        self.suspicious = error.is_suspicious();
        self
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    /// Sets the request correlation ID.
    pub fn with_request_id(mut self, request_id: Option<Uuid>) -> Self {
        self.request_id = request_id;
        self
    }
}

// =============================================================================
// AuditFilter
// =============================================================================

/// Filter for querying audit events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Filter by action.
    pub action: Option<AuditAction>,
    /// Filter by outcome.
    pub outcome: Option<AuditOutcome>,
    /// Filter by subject.
    pub subject: Option<String>,
    /// Only suspicious events.
    #[serde(default)]
    pub suspicious_only: bool,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by action.
    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Filters by outcome.
    pub fn outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Filters by subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Keeps only suspicious events.
    pub fn suspicious(mut self) -> Self {
        self.suspicious_only = true;
        self
    }

    /// Sets the limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns `true` if `event` passes the filter. `limit` is not considered.
    pub fn matches(&self, event: &AuditEvent) -> bool {
        self.action.map_or(true, |a| a == event.action)
            && self.outcome.map_or(true, |o| o == event.outcome)
            && self
                .subject
                .as_deref()
                .map_or(true, |s| event.subject.as_deref() == Some(s))
            && (!self.suspicious_only || event.suspicious)
    }
}
