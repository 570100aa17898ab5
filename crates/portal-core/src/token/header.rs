// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token header.

use serde::{Deserialize, Serialize};

/// Algorithm identifier written into every header.
pub const ALGORITHM: &str = "HS256";

/// Token type tag written into every header.
pub const TOKEN_TYPE: &str = "JWT";

/// Fixed token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signing algorithm.
    pub alg: String,
    /// Token type.
    pub typ: String,
}

impl TokenHeader {
    /// Returns `true` if the header names the only supported algorithm.
    pub fn is_supported(&self) -> bool {
        self.alg == ALGORITHM && self.typ == TOKEN_TYPE
    }
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_json() {
        let json = serde_json::to_string(&TokenHeader::default()).unwrap();
        assert_eq!(json, r#"{"alg":"HS256","typ":"JWT"}"#);
    }

    #[test]
    fn test_other_algorithms_unsupported() {
        let none = TokenHeader {
            alg: "none".to_string(),
            typ: TOKEN_TYPE.to_string(),
        };
        assert!(!none.is_supported());
        assert!(TokenHeader::default().is_supported());
    }
}
