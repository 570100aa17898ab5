// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-process application and loopback server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use portal_api::{ApiConfig, ApiServer, AppState};
use portal_core::{InMemoryAuditLogger, ManualClock, Role};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures::{self, IDP_SECRET, SESSION_SECRET, TTL_SECS};

// =============================================================================
// TestApp
// =============================================================================

/// Application state wired with a manual clock and an in-memory audit log.
#[derive(Clone)]
pub struct TestApp {
    /// Shared state handed to the router.
    pub state: AppState,
    /// Clock driving token issue and expiry.
    pub clock: Arc<ManualClock>,
    /// Every audit event recorded by the pipeline.
    pub audit: Arc<InMemoryAuditLogger>,
}

impl TestApp {
    /// Creates an app with the fixture secrets, clock set to
    /// [`fixtures::NOW`].
    pub fn new() -> Self {
        let clock = fixtures::fixed_clock();
        let audit = Arc::new(InMemoryAuditLogger::new());

        let mut config = ApiConfig::new()
            .with_token_secret(SESSION_SECRET)
            .with_credential_secret(IDP_SECRET)
            .with_ttl_secs(TTL_SECS);
        config.audit.log_granted = true;

        let state = AppState::builder()
            .config(config)
            .tokens(Arc::new(fixtures::token_service(clock.clone())))
            .audit_logger(audit.clone())
            .build()
            .expect("test app state");

        Self {
            state,
            clock,
            audit,
        }
    }

    /// Returns the full router, middleware included.
    pub fn router(&self) -> Router {
        ApiServer::new(self.state.clone()).router()
    }

    /// Issues a credential on the app clock.
    pub fn credential(&self, role: Role, subject: &str) -> String {
        fixtures::credential(self.clock.clone(), role, subject)
    }

    /// Mints a session token directly, skipping the HTTP exchange.
    pub fn session_token(&self, role: Role, subject: &str) -> String {
        self.state
            .tokens()
            .mint(role, subject)
            .expect("session token")
            .token
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TestServer
// =============================================================================

/// A [`TestApp`] served on an ephemeral loopback port.
///
/// Shuts the server down when dropped.
pub struct TestServer {
    /// The served application.
    pub app: TestApp,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Starts `app` on `127.0.0.1:0`.
    pub async fn start(app: TestApp) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown, rx) = oneshot::channel::<()>();

        let server = ApiServer::new(app.state.clone());
        let handle = tokio::spawn(async move {
            let signal = async move {
                let _ = rx.await;
            };
            if let Err(e) = server.serve(listener, signal).await {
                tracing::error!(error = %e, "Test server failed");
            }
        });

        Self {
            app,
            addr,
            shutdown: Some(shutdown),
            handle,
        }
    }

    /// Returns `http://127.0.0.1:<port>`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stops the server and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
