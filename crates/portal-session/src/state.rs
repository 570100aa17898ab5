// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session token holder with proactive refresh.
//!
//! # State machine
//!
//! ```text
//!   NoToken ──mint──► Minting ──ok──► Active ──timer──► Minting ──► ...
//!      ▲                 │                │
//!      │                 └──err──► Degraded
//!      └──── on_role_change (cancel timer, drop token, mint again) ────┘
//! ```
//!
//! Every mutation happens under one mutex and bumps or checks an epoch. A
//! mint started under an older epoch is discarded when it completes, so a
//! token minted for a previous role is never installed.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use portal_core::token::EncodedToken;
use portal_core::{SessionClaims, TokenSwapResponse};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::minter::TokenMinter;
use crate::schedule::RefreshPolicy;
use crate::status::SessionStatus;

// =============================================================================
// RefreshOutcome
// =============================================================================

/// Result of a successful [`SessionState::mint`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token was installed.
    Installed,
    /// Another exchange for the same epoch was already in flight.
    Coalesced,
    /// The role changed or the refresh was cancelled while minting; the
    /// result was discarded.
    Superseded,
}

// =============================================================================
// Internal state
// =============================================================================

#[derive(Debug, Clone)]
struct HeldToken {
    token: String,
    claims: SessionClaims,
    expires_at: Instant,
}

/// Marks the exchange currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    epoch: u64,
    call: u64,
}

#[derive(Debug, Default)]
struct Inner {
    credential: Option<String>,
    token: Option<HeldToken>,
    epoch: u64,
    next_call: u64,
    in_flight: Option<InFlight>,
    timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn is_minting(&self) -> bool {
        self.in_flight.is_some_and(|f| f.epoch == self.epoch)
    }

    /// Clears the in-flight marker if it still belongs to `call`.
    fn finish_call(&mut self, call: u64) {
        if self.in_flight.is_some_and(|f| f.call == call) {
            self.in_flight = None;
        }
    }

    fn live_token(&self) -> Option<&HeldToken> {
        self.token
            .as_ref()
            .filter(|held| Instant::now() <= held.expires_at)
    }

    /// Status matching the token actually held.
    fn held_status(&self) -> SessionStatus {
        match self.live_token() {
            Some(held) => SessionStatus::Active {
                role: held.claims.role,
            },
            None => SessionStatus::NoToken,
        }
    }
}

struct Shared {
    minter: Arc<dyn TokenMinter>,
    policy: RefreshPolicy,
    inner: Mutex<Inner>,
    status: watch::Sender<SessionStatus>,
}

impl Shared {
    fn publish(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.inner.get_mut().cancel_timer();
    }
}

/// Clears the in-flight marker if the mint future is dropped early.
struct InFlightGuard<'a> {
    shared: &'a Shared,
    call: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.shared.inner.lock().finish_call(self.call);
    }
}

// =============================================================================
// SessionState
// =============================================================================

/// Holds the current session token and keeps it fresh.
///
/// Cheap to clone; clones share the same session. Dropping the last clone
/// cancels the pending refresh.
#[derive(Clone)]
pub struct SessionState {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("SessionState")
            .field("minter", &self.shared.minter.name())
            .field("policy", &self.shared.policy)
            .field("epoch", &inner.epoch)
            .field("has_credential", &inner.credential.is_some())
            .field("has_token", &inner.token.is_some())
            .finish()
    }
}

impl SessionState {
    /// Creates a session holder without a credential.
    pub fn new(minter: Arc<dyn TokenMinter>, policy: RefreshPolicy) -> Self {
        let (status, _) = watch::channel(SessionStatus::NoToken);
        Self {
            shared: Arc::new(Shared {
                minter,
                policy,
                inner: Mutex::new(Inner::default()),
                status,
            }),
        }
    }

    /// Creates a session holder for `credential` with the default policy.
    pub fn with_credential(minter: Arc<dyn TokenMinter>, credential: impl Into<String>) -> Self {
        let state = Self::new(minter, RefreshPolicy::default());
        state.lock().credential = Some(credential.into());
        state
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock()
    }

    /// Exchanges the held credential for a session token and schedules the
    /// next refresh.
    ///
    /// A failed exchange drops the current token, publishes
    /// [`SessionStatus::Degraded`] and returns the error. Nothing is retried.
    pub async fn mint(&self) -> SessionResult<RefreshOutcome> {
        let (epoch, call, credential) = {
            let mut inner = self.lock();
            if inner.is_minting() {
                debug!(epoch = inner.epoch, "Exchange already in flight");
                return Ok(RefreshOutcome::Coalesced);
            }
            let credential = inner.credential.clone().ok_or(SessionError::NoCredential)?;
            inner.next_call += 1;
            let call = inner.next_call;
            inner.in_flight = Some(InFlight {
                epoch: inner.epoch,
                call,
            });
            self.shared.publish(SessionStatus::Minting);
            (inner.epoch, call, credential)
        };

        let _guard = InFlightGuard {
            shared: &self.shared,
            call,
        };
        // The server starts the token's lifetime before it answers.
        let sent_at = Instant::now();
        let result = self
            .shared
            .minter
            .mint(&credential)
            .await
            .and_then(|response| decode_response(response, sent_at));

        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!(
                started = epoch,
                current = inner.epoch,
                "Discarding exchange result from a superseded epoch"
            );
            return Ok(RefreshOutcome::Superseded);
        }
        inner.finish_call(call);

        match result {
            Ok(held) => {
                let ttl = held.expires_at.saturating_duration_since(Instant::now());
                let delay = self.shared.policy.delay(ttl);
                let role = held.claims.role;
                info!(
                    role = %role,
                    sub = %held.claims.sub,
                    ttl_secs = ttl.as_secs(),
                    refresh_in_secs = delay.as_secs(),
                    "Session token installed"
                );
                inner.token = Some(held);
                self.arm_timer(&mut inner, delay);
                self.shared.publish(SessionStatus::Active { role });
                Ok(RefreshOutcome::Installed)
            }
            Err(e) => {
                warn!(error = %e, "Session token exchange failed");
                inner.token = None;
                inner.cancel_timer();
                self.shared.publish(SessionStatus::Degraded {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Arms the one-shot refresh timer, replacing any previous one.
    fn arm_timer(&self, inner: &mut Inner, delay: Duration) {
        inner.cancel_timer();

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let epoch = inner.epoch;
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(shared) = weak.upgrade() else {
                return;
            };
            let session = SessionState { shared };
            {
                let mut inner = session.lock();
                if inner.epoch != epoch {
                    return;
                }
                // Detach so the install below does not abort this task.
                inner.timer.take();
            }

            debug!(epoch, "Refreshing session token");
            if let Err(e) = session.mint().await {
                debug!(error = %e, "Scheduled refresh failed");
            }
        }));
    }

    /// Cancels the scheduled refresh.
    ///
    /// An exchange already in flight is discarded when it completes and the
    /// status falls back to what is held. The current token stays usable
    /// until it expires.
    pub fn cancel_pending_refresh(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.epoch += 1;
        if inner.in_flight.take().is_some() {
            self.shared.publish(inner.held_status());
        }
        debug!(epoch = inner.epoch, "Pending refresh cancelled");
    }

    /// Switches to a new credential, typically after the user changed role.
    ///
    /// The pending refresh is cancelled, the current token discarded, and a
    /// token for the new credential minted immediately.
    pub async fn on_role_change(
        &self,
        credential: impl Into<String>,
    ) -> SessionResult<RefreshOutcome> {
        {
            let mut inner = self.lock();
            inner.cancel_timer();
            inner.epoch += 1;
            inner.in_flight = None;
            inner.token = None;
            inner.credential = Some(credential.into());
            self.shared.publish(SessionStatus::NoToken);
            info!(epoch = inner.epoch, "Role changed, discarding session token");
        }
        self.mint().await
    }

    /// Drops the credential and token, as on sign-out.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.epoch += 1;
        inner.in_flight = None;
        inner.token = None;
        inner.credential = None;
        self.shared.publish(SessionStatus::NoToken);
    }

    /// Returns the current session token, or `None` if there is none or it
    /// has expired.
    pub fn current_token(&self) -> Option<String> {
        self.current().map(|held| held.token)
    }

    /// Returns the claims of the current session token.
    pub fn current_claims(&self) -> Option<SessionClaims> {
        self.current().map(|held| held.claims)
    }

    fn current(&self) -> Option<HeldToken> {
        self.lock().live_token().cloned()
    }

    /// Returns the latest published status.
    pub fn status(&self) -> SessionStatus {
        self.shared.status.borrow().clone()
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status.subscribe()
    }

    /// Returns `true` while a refresh timer is armed.
    pub fn has_pending_refresh(&self) -> bool {
        self.lock()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

/// Decodes the claims of a freshly minted token.
///
/// The client does not hold the signing secret; it reads the claims only to
/// know its role and subject. Expiry is `expiresInSec` after `sent_at` on the
/// local monotonic clock, so the round trip never extends the lifetime.
fn decode_response(response: TokenSwapResponse, sent_at: Instant) -> SessionResult<HeldToken> {
    let claims: SessionClaims = EncodedToken::parse(&response.token)?.claims()?;
    let expires_at = sent_at
        .checked_add(Duration::from_secs(response.expires_in_sec))
        .ok_or_else(|| {
            SessionError::invalid_response(format!(
                "expiresInSec {} out of range",
                response.expires_in_sec
            ))
        })?;
    Ok(HeldToken {
        expires_at,
        claims,
        token: response.token,
    })
}

// =============================================================================
// Tests
// =============================================================================
