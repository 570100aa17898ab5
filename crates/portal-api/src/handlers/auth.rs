// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token exchange handlers.

use axum::{extract::State, Json};
use portal_core::audit::AuditEvent;
use portal_core::TokenSwapResponse;

use crate::error::ApiResult;
use crate::extractors::{Bearer, RequestContext, Session};
use crate::response::SessionResponse;
use crate::state::AppState;

// =============================================================================
// Token Swap
// =============================================================================

/// POST /auth/token-swap
///
/// Exchanges the long-lived credential in the `Authorization` header for a
/// short-lived session token. Stateless: nothing is stored server side.
pub async fn token_swap(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Bearer(credential): Bearer,
) -> ApiResult<Json<TokenSwapResponse>> {
    match state.tokens().exchange(credential.as_deref()) {
        Ok(minted) => {
            tracing::info!(
                request_id = %ctx.request_id,
                role = %minted.claims.role,
                sub = %minted.claims.sub,
                expires_in_sec = minted.expires_in_secs,
                "Token swap succeeded"
            );
            let event = AuditEvent::token_swap(minted.claims.role, &minted.claims.sub)
                .with_client_ip(ctx.client_ip)
                .with_request_id(Some(ctx.request_id));
            state.record(event).await;

            Ok(Json(TokenSwapResponse::from(minted)))
        }
        Err(e) => {
            tracing::info!(request_id = %ctx.request_id, error = %e, "Token swap rejected");
            let event = AuditEvent::token_swap_rejected(&e)
                .with_client_ip(ctx.client_ip)
                .with_request_id(Some(ctx.request_id));
            state.record(event).await;

            Err(e.into())
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// GET /auth/session
///
/// Returns the verified claims of the caller's session token together with
/// the modules its role may open.
pub async fn session(
    State(state): State<AppState>,
    Session(claims): Session,
) -> Json<SessionResponse> {
    let accessible = state
        .policy()
        .accessible_modules(claims.role)
        .into_iter()
        .map(|m| m.id.clone())
        .collect();
    let now = state.tokens().clock().now();

    Json(SessionResponse::new(claims, now, accessible))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;
    use crate::config::ApiConfig;
    use crate::error::ApiError;
    use portal_core::audit::{AuditAction, InMemoryAuditLogger};
    use portal_core::{
        AuthError, CredentialIssuer, CredentialTrust, ManualClock, Role, SigningSecret,
        TokenService,
    };
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000;
    const SECRET: &str = "handler-test-secret-0123456789abcdef";
    const IDP_SECRET: &str = "handler-test-idp-secret-0123456789ab";

    fn state() -> (AppState, InMemoryAuditLogger) {
        let audit = InMemoryAuditLogger::new();
        let tokens = TokenService::new(
            SigningSecret::from(SECRET),
            CredentialTrust::Verified {
                secret: SigningSecret::from(IDP_SECRET),
            },
            300,
            Arc::new(ManualClock::new(NOW)),
        );
        let state = AppState::builder()
            .config(ApiConfig::new().with_dev_mode(true))
            .tokens(Arc::new(tokens))
            .audit_logger(Arc::new(audit.clone()))
            .build()
            .unwrap();
        (state, audit)
    }

    fn credential(role: &str) -> String {
        let issuer = CredentialIssuer::with_clock(
            SigningSecret::from(IDP_SECRET),
            Arc::new(ManualClock::new(NOW)),
        );
        issuer
            .issue_claims(&portal_core::CredentialClaims::new(role).with_subject("alice"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_token_swap_success() {
        let (state, audit) = state();
        let Json(response) = token_swap(
            State(state.clone()),
            RequestContext(AuthContext::anonymous()),
            Bearer(Some(credential("User"))),
        )
        .await
        .unwrap();

        assert_eq!(response.expires_in_sec, 300);
        let claims = state.tokens().verify(&response.token).unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, NOW + 300);
        assert_eq!(audit.entries_for_action(AuditAction::TokenSwap).len(), 1);
    }

    #[tokio::test]
    async fn test_token_swap_without_credential() {
        let (state, audit) = state();
        let result = token_swap(
            State(state),
            RequestContext(AuthContext::anonymous()),
            Bearer(None),
        )
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Auth(AuthError::MissingCredential))
        ));
        assert_eq!(
            audit.entries_for_action(AuditAction::TokenSwapRejected).len(),
            1
        );
    }

    #[tokio::test]
    async fn test_token_swap_unknown_role() {
        let (state, _) = state();
        let result = token_swap(
            State(state),
            RequestContext(AuthContext::anonymous()),
            Bearer(Some(credential("Superuser"))),
        )
        .await;

        assert!(matches!(
            result,
            Err(ApiError::Auth(AuthError::InvalidCredential { .. }))
        ));
    }

    #[tokio::test]
    async fn test_session_lists_accessible_modules() {
        let (state, _) = state();
        let claims = state.tokens().mint(Role::Validator, "node-1").unwrap().claims;

        let Json(response) = session(State(state), Session(claims)).await;
        assert_eq!(response.role, Role::Validator);
        assert_eq!(response.expires_in_sec, 300);
        assert_eq!(
            response.accessible_modules,
            vec!["validator"]
        );
    }
}
