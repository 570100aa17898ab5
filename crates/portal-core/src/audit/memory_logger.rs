// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory audit logger for testing and development.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::AuditResult;
use super::types::{AuditAction, AuditEvent, AuditFilter};
use super::AuditLogger;

/// In-memory audit logger.
///
/// Clones share the same storage, so a test can keep one handle and give
/// another to the server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogger {
    events: Arc<RwLock<Vec<AuditEvent>>>,
    max_entries: usize,
}

impl InMemoryAuditLogger {
    /// Creates a logger with unlimited capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger that keeps at most `max_entries`, dropping the oldest.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::with_capacity(max_entries.min(10_000)))),
            max_entries,
        }
    }

    /// Returns all logged events.
    pub fn entries(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Returns events for a specific action.
    pub fn entries_for_action(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, event: AuditEvent) -> AuditResult<()> {
        let mut events = self.events.write();
        if self.max_entries > 0 && events.len() >= self.max_entries {
            events.remove(0);
        }
        events.push(event);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<AuditEvent>> {
        let events = self.events.read();
        let matching = events.iter().filter(|e| filter.matches(e)).cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn supports_query(&self) -> bool {
        true
    }
}
