// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit trail for credential exchanges, token rejections and access checks.
//!
//! Clients only ever see a generic error message. The audit trail is where
//! the real reason is kept, together with who asked and from where.
//!
//! - [`AuditLogger`]: core trait for logger implementations
//! - [`TracingAuditLogger`]: emits each event as a `tracing` event (default)
//! - [`InMemoryAuditLogger`]: keeps events in memory for tests
//! - [`NoOpAuditLogger`]: discards everything

mod error;
mod memory_logger;
mod types;

pub use error::{AuditError, AuditResult};
pub use memory_logger::InMemoryAuditLogger;
pub use types::{AuditAction, AuditEvent, AuditFilter, AuditOutcome};

use async_trait::async_trait;
use tracing::{info, warn};

// =============================================================================
// Core Trait
// =============================================================================

/// Trait for audit logger implementations.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Records an event.
    async fn log(&self, event: AuditEvent) -> AuditResult<()>;

    /// Queries recorded events.
    ///
    /// Loggers that do not keep events return
    /// [`AuditError::QueryNotSupported`].
    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<AuditEvent>> {
        Err(AuditError::QueryNotSupported {
            logger: self.name().to_string(),
        })
    }

    /// Returns the logger name for identification.
    fn name(&self) -> &str {
        "audit_logger"
    }

    /// Returns `true` if this logger supports querying.
    fn supports_query(&self) -> bool {
        false
    }
}

// =============================================================================
// Tracing Logger
// =============================================================================

/// Writes audit events to the `audit` tracing target.
///
/// Suspicious events and refusals are logged at `warn`, everything else at
/// `info`.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditLogger;

impl TracingAuditLogger {
    /// Creates a new tracing logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, event: AuditEvent) -> AuditResult<()> {
        let role = event.role.map(|r| r.as_str()).unwrap_or("-");
        let subject = event.subject.as_deref().unwrap_or("-");
        let resource = event.resource.as_deref().unwrap_or("-");
        let code = event.code.as_deref().unwrap_or("-");
        let reason = event.reason.as_deref().unwrap_or("-");
        let client_ip = event
            .client_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string());
        let request_id = event
            .request_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());

        if event.suspicious {
            warn!(
                target: "audit",
                audit_id = %event.id,
                action = %event.action,
                role, subject, resource, code, reason,
                client_ip = %client_ip,
                request_id = %request_id,
                "Possible token forgery"
            );
        } else if event.action.is_security_sensitive() {
            warn!(
                target: "audit",
                audit_id = %event.id,
                action = %event.action,
                role, subject, resource, code, reason,
                client_ip = %client_ip,
                request_id = %request_id,
                "Request refused"
            );
        } else {
            info!(
                target: "audit",
                audit_id = %event.id,
                action = %event.action,
                role, subject, resource,
                client_ip = %client_ip,
                request_id = %request_id,
                "Request allowed"
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

// =============================================================================
// No-Op Logger
// =============================================================================

/// A no-op audit logger that discards all events.
#[derive(Debug, Default, Clone)]
pub struct NoOpAuditLogger;

impl NoOpAuditLogger {
    /// Creates a new no-op logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _event: AuditEvent) -> AuditResult<()> {
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<AuditEvent>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::role::Role;

    #[tokio::test]
    async fn test_noop_logger() {
        let logger = NoOpAuditLogger::new();
        assert!(logger
            .log(AuditEvent::token_swap(Role::User, "alice"))
            .await
            .is_ok());
        assert!(logger.query(AuditFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tracing_logger_does_not_query() {
        let logger = TracingAuditLogger::new();
        assert!(logger
            .log(AuditEvent::token_rejected(&AuthError::BadSignature, "/auth/session"))
            .await
            .is_ok());
        assert!(!logger.supports_query());
        assert!(matches!(
            logger.query(AuditFilter::default()).await,
            Err(AuditError::QueryNotSupported { .. })
        ));
    }
}
