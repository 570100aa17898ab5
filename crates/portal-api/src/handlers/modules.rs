// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Module handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use portal_core::{AccessDecision, AuthError, ModuleDescriptor};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Session;
use crate::response::{ModuleListResponse, ModuleSummary};
use crate::state::AppState;

/// GET /api/modules
///
/// Lists every module with an `accessible` flag for the caller's role.
pub async fn list_modules(
    State(state): State<AppState>,
    Session(claims): Session,
) -> Json<ModuleListResponse> {
    let policy = state.policy();
    let modules = policy
        .modules()
        .iter()
        .map(|module| ModuleSummary {
            accessible: policy.is_authorized(claims.role, &module.id),
            module: module.clone(),
        })
        .collect();

    Json(ModuleListResponse {
        role: claims.role,
        modules,
    })
}

/// GET /api/modules/{module}
///
/// Returns the module descriptor. The module gate has already refused
/// callers without the required role; the decision is repeated here so the
/// handler stays safe when mounted without the gate.
pub async fn get_module(
    State(state): State<AppState>,
    Session(claims): Session,
    Path(module): Path<String>,
) -> ApiResult<Json<ModuleDescriptor>> {
    match state.policy().decide(claims.role, &module) {
        AccessDecision::Allowed(descriptor) => Ok(Json(descriptor.clone())),
        AccessDecision::Denied { required } => Err(ApiError::Auth(AuthError::InsufficientRole {
            role: claims.role,
            module,
            required,
        })),
        AccessDecision::UnknownModule => Err(ApiError::not_found(format!("module '{}'", module))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use portal_core::{Role, SessionClaims};

    fn state() -> AppState {
        AppState::builder()
            .config(ApiConfig::new().with_dev_mode(true))
            .build()
            .unwrap()
    }

    fn claims(role: Role) -> SessionClaims {
        SessionClaims::new(role, "tester", 0, 300).unwrap()
    }

    #[tokio::test]
    async fn test_list_modules_flags() {
        let Json(response) = list_modules(State(state()), Session(claims(Role::User))).await;

        assert_eq!(response.role, Role::User);
        assert_eq!(response.modules.len(), 5);
        let accessible: Vec<&str> = response
            .modules
            .iter()
            .filter(|m| m.accessible)
            .map(|m| m.module.id.as_str())
            .collect();
        assert_eq!(accessible, vec!["job-tracking"]);
    }

    #[tokio::test]
    async fn test_get_module() {
        let Json(module) = get_module(
            State(state()),
            Session(claims(Role::Admin)),
            Path("reconciliation".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(module.required_role, Role::Admin);

        let denied = get_module(
            State(state()),
            Session(claims(Role::Guest)),
            Path("reconciliation".to_string()),
        )
        .await;
        assert!(matches!(
            denied,
            Err(ApiError::Auth(AuthError::InsufficientRole { .. }))
        ));

        let missing = get_module(
            State(state()),
            Session(claims(Role::Admin)),
            Path("unknown".to_string()),
        )
        .await;
        assert!(matches!(missing, Err(ApiError::NotFound { .. })));
    }
}
