// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use portal_core::audit::{AuditEvent, AuditLogger, NoOpAuditLogger, TracingAuditLogger};
use portal_core::{ModuleAccessPolicy, SystemClock, TokenService};

use crate::config::{ApiConfig, ConfigResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Everything here is read-only after startup; handlers never take a lock.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token minting and verification.
    pub tokens: Arc<TokenService>,
    /// Module access policy.
    pub policy: Arc<ModuleAccessPolicy>,
    /// Audit logger.
    pub audit_logger: Arc<dyn AuditLogger>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns the module access policy.
    pub fn policy(&self) -> &ModuleAccessPolicy {
        &self.policy
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit_logger
    }

    /// Records an audit event. Failures are logged, never returned.
    pub async fn record(&self, event: AuditEvent) {
        record(self.audit_logger.as_ref(), event).await;
    }
}

pub(crate) async fn record(logger: &dyn AuditLogger, event: AuditEvent) {
    if let Err(e) = logger.log(event).await {
        tracing::warn!(error = %e, logger = logger.name(), "Failed to write audit event");
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    tokens: Option<Arc<TokenService>>,
    policy: Option<Arc<ModuleAccessPolicy>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token service. Without one, it is built from the config.
    pub fn tokens(mut self, tokens: Arc<TokenService>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the module access policy.
    pub fn policy(mut self, policy: Arc<ModuleAccessPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> ConfigResult<AppState> {
        let config = self.config.unwrap_or_default();

        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => Arc::new(config.token_service(Arc::new(SystemClock))?),
        };

        let policy = self
            .policy
            .unwrap_or_else(|| Arc::new(ModuleAccessPolicy::new()));

        let audit_logger = self.audit_logger.unwrap_or_else(|| {
            if config.audit.enabled {
                Arc::new(TracingAuditLogger::new())
            } else {
                Arc::new(NoOpAuditLogger::new())
            }
        });

        Ok(AppState {
            config: Arc::new(config),
            tokens,
            policy,
            audit_logger,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ModuleAccessPolicy> {
    fn from_ref(state: &AppState) -> Self {
        state.policy.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
