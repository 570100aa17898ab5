// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # portal-core
//!
//! Credential exchange and role-based authorization core for the portal.
//!
//! This crate turns a long-lived identity credential into a short-lived,
//! HMAC-signed session token, verifies that token, and decides which
//! functional modules a role may open.
//!
//! ## Layout
//!
//! ```text
//!   signature ──► token::codec ──► token::verifier ──► mint::TokenService
//!                                        │
//!                                        ▼
//!                                 authz::ModuleAccessPolicy
//! ```
//!
//! - [`signature`]: HMAC-SHA256 sign / constant-time verify
//! - [`token`]: three-segment token encoding, claims and verification
//! - [`mint`]: credential exchange and credential issuance
//! - [`authz`]: declarative module access policy
//! - [`audit`]: audit trail for exchanges, rejections and denials
//!
//! Everything here is synchronous and free of shared mutable state except
//! the audit loggers, so a single [`mint::TokenService`] can be shared by
//! every request handler.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod audit;
pub mod authz;
pub mod clock;
pub mod error;
pub mod mint;
pub mod role;
pub mod signature;
pub mod token;
pub mod wire;

pub use audit::{AuditEvent, AuditLogger, InMemoryAuditLogger, TracingAuditLogger};
pub use authz::{
    is_authorized, AccessDecision, ModuleAccessPolicy, ModuleAccessPolicyBuilder, ModuleDescriptor,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, AuthResult};
pub use mint::{
    CredentialIssuer, CredentialTrust, MintedToken, TokenService, TokenServiceBuilder, DEFAULT_TTL_SECS,
};
pub use role::Role;
pub use signature::SigningSecret;
pub use token::{CredentialClaims, SessionClaims, TokenHeader, TokenVerifier};
pub use wire::{ErrorBody, TokenSwapResponse};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
