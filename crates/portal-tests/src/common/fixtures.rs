// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built secrets, clocks and services.

use std::sync::Arc;
use std::time::Duration;

use portal_core::{
    CredentialIssuer, CredentialTrust, ManualClock, Role, SigningSecret, TokenService,
};

/// Fixed instant used by deterministic tests.
pub const NOW: i64 = 1_700_000_000;

/// Session token lifetime used by the fixtures.
pub const TTL_SECS: u64 = 300;

/// Secret the server signs session tokens with.
pub const SESSION_SECRET: &str = "portal-session-secret-for-tests-0123456789";

/// Secret the identity provider signs credentials with.
pub const IDP_SECRET: &str = "portal-idp-secret-for-tests-abcdefghijklmn";

/// A secret neither party uses.
pub const ATTACKER_SECRET: &str = "attacker-controlled-secret-zyxwvutsrqpon";

/// Returns a manual clock set to [`NOW`].
pub fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(NOW))
}

/// Builds a token service that verifies credentials against [`IDP_SECRET`].
pub fn token_service(clock: Arc<ManualClock>) -> TokenService {
    let trust = CredentialTrust::Verified {
        secret: SigningSecret::from(IDP_SECRET),
    };
    TokenService::builder(SigningSecret::from(SESSION_SECRET), trust)
        .ttl_secs(TTL_SECS)
        .clock(clock)
        .build()
}

/// Builds an identity provider stand-in sharing `clock`.
pub fn issuer(clock: Arc<ManualClock>) -> CredentialIssuer {
    CredentialIssuer::with_clock(SigningSecret::from(IDP_SECRET), clock)
}

/// Issues a non-expiring credential signed by the identity provider.
pub fn credential(clock: Arc<ManualClock>, role: Role, subject: &str) -> String {
    issuer(clock)
        .issue(role, subject, None)
        .expect("credential issuance")
}

/// Issues a credential that expires after `lifetime`.
pub fn expiring_credential(
    clock: Arc<ManualClock>,
    role: Role,
    subject: &str,
    lifetime: Duration,
) -> String {
    issuer(clock)
        .issue(role, subject, Some(lifetime))
        .expect("credential issuance")
}

/// Issues a credential signed with [`ATTACKER_SECRET`].
pub fn forged_credential(role: Role, subject: &str) -> String {
    CredentialIssuer::with_clock(SigningSecret::from(ATTACKER_SECRET), fixed_clock())
        .issue(role, subject, None)
        .expect("credential issuance")
}
