// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Three-segment signed tokens.
//!
//! Wire format:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(signature)
//! ```
//!
//! The header is fixed to `{"alg":"HS256","typ":"JWT"}`, which keeps the
//! tokens readable by standard JWT tooling.

mod claims;
pub mod codec;
mod header;
pub mod verifier;

pub use claims::{CredentialClaims, SessionClaims, TemporalClaims, DEFAULT_SUBJECT};
pub use codec::{encode, EncodedToken};
pub use header::{TokenHeader, ALGORITHM, TOKEN_TYPE};
pub use verifier::{verify, TokenVerifier};
