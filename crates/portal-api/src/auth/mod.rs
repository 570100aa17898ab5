// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request authentication helpers.

mod context;

pub use context::AuthContext;

use axum::http::{header, HeaderMap};

/// Extracts the bearer token from the `Authorization` header.
///
/// Returns `None` when the header is absent, not UTF-8, not a bearer token,
/// or blank.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
