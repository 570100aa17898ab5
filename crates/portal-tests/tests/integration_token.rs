// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Token Integration Tests
//!
//! End-to-end behavior of the exchange and the session token format.
//!
//! ## Test Categories
//!
//! - `test_exchange_*`: Credential exchange outcomes
//! - `test_session_*`: Session token verification and expiry
//! - `test_tamper_*`: Modified tokens never verify
//! - `test_interop_*`: Compatibility with a third-party JWT library

use std::time::Duration;

use portal_core::{
    AuthError, CredentialClaims, CredentialTrust, Role, SigningSecret, TokenService,
    TokenVerifier,
};
use portal_tests::prelude::*;
use proptest::prelude::*;

fn claims_only_service() -> TokenService {
    TokenService::builder(SigningSecret::from(SESSION_SECRET), CredentialTrust::ClaimsOnly)
        .ttl_secs(TTL_SECS)
        .clock(fixed_clock())
        .build()
}

// =============================================================================
// Exchange Tests
// =============================================================================

#[test]
fn test_exchange_valid_credential() {
    init_test_logging();
    let clock = fixed_clock();
    let service = token_service(clock.clone());

    let minted = service
        .exchange(Some(&credential(clock, Role::User, "alice")))
        .expect("exchange");

    assert_eq!(minted.expires_in_secs, TTL_SECS);
    assert_eq!(minted.claims.role, Role::User);
    assert_eq!(minted.claims.sub, "alice");
    assert_eq!(minted.claims.iat, NOW);
    assert_eq!(minted.claims.exp, NOW + TTL_SECS as i64);

    let verified = service.verify(&minted.token).expect("verify");
    assert_eq!(verified, minted.claims);
}

#[test]
fn test_exchange_trims_credential() {
    let clock = fixed_clock();
    let service = token_service(clock.clone());
    let padded = format!("  {}\n", credential(clock, Role::Admin, "root"));

    assert_eq!(service.exchange(Some(&padded)).unwrap().claims.role, Role::Admin);
}

#[test]
fn test_exchange_missing_credential() {
    let service = token_service(fixed_clock());

    assert_eq!(service.exchange(None).unwrap_err(), AuthError::MissingCredential);
    assert_eq!(service.exchange(Some("   ")).unwrap_err(), AuthError::MissingCredential);
}

#[test]
fn test_exchange_forged_credential() {
    let service = token_service(fixed_clock());

    let err = service
        .exchange(Some(&forged_credential(Role::Admin, "mallory")))
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential { .. }), "{:?}", err);
    assert_eq!(err.public_message(), "invalid credential");
}

#[test]
fn test_exchange_expired_credential() {
    let clock = fixed_clock();
    let service = token_service(clock.clone());
    let credential = expiring_credential(clock.clone(), Role::User, "bob", Duration::from_secs(60));

    assert!(service.exchange(Some(&credential)).is_ok());

    clock.advance(61);
    let err = service.exchange(Some(&credential)).unwrap_err();
    assert_eq!(
        err,
        AuthError::Expired {
            expired_at: NOW + 60,
            now: NOW + 61,
        }
    );
}

#[test]
fn test_exchange_role_claim_required() {
    let clock = fixed_clock();
    let service = token_service(clock.clone());
    let issuer = issuer(clock);

    let no_role = CredentialClaims {
        sub: Some("carol".to_string()),
        ..Default::default()
    };
    let err = service
        .exchange(Some(&issuer.issue_claims(&no_role).unwrap()))
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential { .. }));

    let unknown = CredentialClaims::new("Superuser").with_subject("carol");
    let err = service
        .exchange(Some(&issuer.issue_claims(&unknown).unwrap()))
        .unwrap_err();
    assert!(err.to_string().contains("Superuser"), "{}", err);
}

#[test]
fn test_exchange_legacy_user_claim() {
    let clock = fixed_clock();
    let service = token_service(clock.clone());
    let claims = CredentialClaims {
        role: Some("Validator".to_string()),
        user: Some("node-9".to_string()),
        ..Default::default()
    };

    let credential = issuer(clock).issue_claims(&claims).unwrap();
    let minted = service.exchange(Some(&credential)).unwrap();
    assert_eq!(minted.claims.sub, "node-9");
}

#[test]
fn test_exchange_defaults_subject() {
    let clock = fixed_clock();
    let service = token_service(clock.clone());

    let credential = issuer(clock)
        .issue_claims(&CredentialClaims::new("Guest"))
        .unwrap();
    let minted = service.exchange(Some(&credential)).unwrap();
    assert_eq!(minted.claims.sub, "local-dev");
}

#[test]
fn test_exchange_claims_only_trust() {
    let service = claims_only_service();

    // Signature is not checked.
    let minted = service
        .exchange(Some(&forged_credential(Role::Admin, "dev")))
        .unwrap();
    assert_eq!(minted.claims.role, Role::Admin);

    // Expiry and role still are.
    let expired = CredentialClaims::new("User").with_expiry(NOW - 1);
    let credential = issuer(fixed_clock()).issue_claims(&expired).unwrap();
    assert!(matches!(
        service.exchange(Some(&credential)).unwrap_err(),
        AuthError::Expired { .. }
    ));

    assert!(matches!(
        service.exchange(Some("not-a-token")).unwrap_err(),
        AuthError::InvalidCredential { .. }
    ));
}

#[test]
fn test_exchange_session_token_is_not_a_credential() {
    let clock = fixed_clock();
    let service = token_service(clock);
    let session = service.mint(Role::Admin, "alice").unwrap().token;

    // Signed with the session secret, not the identity provider's.
    assert!(matches!(
        service.exchange(Some(&session)).unwrap_err(),
        AuthError::InvalidCredential { .. }
    ));
}

// =============================================================================
// Session Token Tests
// =============================================================================

#[test]
fn test_session_expiry_is_inclusive() {
    let clock = fixed_clock();
    let service = token_service(clock.clone());
    let token = service.mint(Role::User, "alice").unwrap().token;

    clock.advance(TTL_SECS as i64);
    assert!(service.verify(&token).is_ok());

    clock.advance(1);
    let err = service.verify(&token).unwrap_err();
    assert_eq!(err.code(), "TOKEN_EXPIRED");
    assert_eq!(err.public_message(), "session expired");
}

#[test]
fn test_session_wrong_secret() {
    let clock = fixed_clock();
    let token = token_service(clock.clone()).mint(Role::User, "alice").unwrap().token;

    let other = TokenService::new(
        SigningSecret::from(ATTACKER_SECRET),
        CredentialTrust::ClaimsOnly,
        TTL_SECS,
        clock,
    );
    let err = other.verify(&token).unwrap_err();
    assert_eq!(err, AuthError::BadSignature);
    assert!(err.is_suspicious());
}

#[test]
fn test_session_malformed() {
    let service = token_service(fixed_clock());

    for token in ["", "abc", "a.b", "a.b.c.d", "..", "a..c"] {
        let err = service.verify(token).unwrap_err();
        assert!(
            matches!(err, AuthError::MalformedToken { .. } | AuthError::BadSignature),
            "{:?} -> {:?}",
            token,
            err
        );
    }
}

// =============================================================================
// Tamper Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_tamper_any_bit_flip_is_rejected(index in any::<prop::sample::Index>(), bit in 0u8..7) {
        let clock = fixed_clock();
        let service = token_service(clock);
        let token = service.mint(Role::Validator, "node-1").unwrap().token;

        let mut bytes = token.into_bytes();
        let i = index.index(bytes.len());
        bytes[i] ^= 1 << bit;
        let tampered = String::from_utf8(bytes).unwrap();

        prop_assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_tamper_swapped_claims_are_rejected(role in prop::sample::select(Role::ALL.to_vec())) {
        let clock = fixed_clock();
        let service = token_service(clock);
        let guest = service.mint(Role::Guest, "guest").unwrap().token;
        let other = service.mint(role, "guest").unwrap().token;

        // Claims of one token spliced onto the signature of another.
        let guest_parts: Vec<&str> = guest.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", guest_parts[0], other_parts[1], guest_parts[2]);

        if role == Role::Guest {
            prop_assert!(service.verify(&spliced).is_ok());
        } else {
            prop_assert_eq!(service.verify(&spliced).unwrap_err(), AuthError::BadSignature);
        }
    }
}

// =============================================================================
// Interop Tests
// =============================================================================

mod interop {
    use super::*;
    use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
    use portal_core::{ManualClock, SessionClaims};
    use std::sync::Arc;

    fn wall_clock_now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    #[test]
    fn test_interop_session_token_decodes_with_jsonwebtoken() {
        let clock = Arc::new(ManualClock::new(wall_clock_now()));
        let minted = token_service(clock).mint(Role::Admin, "alice").unwrap();

        let decoded = decode::<SessionClaims>(
            &minted.token,
            &DecodingKey::from_secret(SESSION_SECRET.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .expect("jsonwebtoken accepts the token");

        assert_eq!(decoded.header.alg, Algorithm::HS256);
        assert_eq!(decoded.claims, minted.claims);
    }

    #[test]
    fn test_interop_jsonwebtoken_credential_is_accepted() {
        let now = wall_clock_now();
        let claims = CredentialClaims::new("User")
            .with_subject("external")
            .with_issued_at(now)
            .with_expiry(now + 3600);
        let credential = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(IDP_SECRET.as_bytes()),
        )
        .unwrap();

        let verified: CredentialClaims = TokenVerifier::with_clock(
            SigningSecret::from(IDP_SECRET),
            Arc::new(ManualClock::new(now)),
        )
        .verify_as(&credential)
        .unwrap();
        assert_eq!(verified, claims);

        let service = token_service(Arc::new(ManualClock::new(now)));
        let minted = service.exchange(Some(&credential)).unwrap();
        assert_eq!(minted.claims.sub, "external");
    }

    #[test]
    fn test_interop_other_algorithm_is_rejected() {
        let now = wall_clock_now();
        let credential = encode(
            &Header::new(Algorithm::HS512),
            &CredentialClaims::new("Admin"),
            &EncodingKey::from_secret(IDP_SECRET.as_bytes()),
        )
        .unwrap();

        let service = token_service(Arc::new(ManualClock::new(now)));
        assert!(service.exchange(Some(&credential)).is_err());
    }
}
