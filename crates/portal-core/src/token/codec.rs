// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Compact token encoding.
//!
//! A token is three base64url segments without padding, joined by `.`:
//! `header.claims.signature`. The signature covers the first two encoded
//! segments exactly as they appear on the wire.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::header::TokenHeader;
use crate::error::{AuthError, AuthResult};
use crate::signature::{self, SigningSecret};

const SEGMENT_COUNT: usize = 3;

// =============================================================================
// Encoding
// =============================================================================

/// Serializes `value` to JSON and encodes it as a base64url segment.
pub fn encode_segment<T: Serialize>(value: &T) -> AuthResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::Encoding {
        reason: e.to_string(),
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decodes a base64url segment and parses it as JSON.
pub fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> AuthResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::malformed(format!("{} is not base64url: {}", what, e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::malformed(format!("{} is not valid JSON: {}", what, e)))
}

/// Encodes and signs a token.
pub fn encode<C: Serialize>(
    header: &TokenHeader,
    claims: &C,
    secret: &SigningSecret,
) -> AuthResult<String> {
    let signing_input = format!("{}.{}", encode_segment(header)?, encode_segment(claims)?);
    let signature = signature::sign(signing_input.as_bytes(), secret);
    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

// =============================================================================
// EncodedToken
// =============================================================================

/// A token split into its segments but not yet decoded or trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedToken<'a> {
    header: &'a str,
    claims: &'a str,
    signature: &'a str,
    signing_input: &'a str,
}

impl<'a> EncodedToken<'a> {
    /// Splits a raw token into segments.
    ///
    /// Fails unless there are exactly three non-empty segments.
    pub fn parse(raw: &'a str) -> AuthResult<Self> {
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() != SEGMENT_COUNT {
            return Err(AuthError::malformed(format!(
                "expected {} segments, found {}",
                SEGMENT_COUNT,
                parts.len()
            )));
        }
        if parts.iter().any(|part| part.is_empty()) {
            return Err(AuthError::malformed("empty segment"));
        }

        let signing_len = parts[0].len() + 1 + parts[1].len();
        Ok(Self {
            header: parts[0],
            claims: parts[1],
            signature: parts[2],
            signing_input: &raw[..signing_len],
        })
    }

    /// Returns the bytes the signature covers.
    pub fn signing_input(&self) -> &'a [u8] {
        self.signing_input.as_bytes()
    }

    /// Decodes the signature segment.
    pub fn signature_bytes(&self) -> AuthResult<Vec<u8>> {
        URL_SAFE_NO_PAD
            .decode(self.signature)
            .map_err(|e| AuthError::malformed(format!("signature is not base64url: {}", e)))
    }

    /// Decodes the header segment.
    pub fn header(&self) -> AuthResult<TokenHeader> {
        decode_segment(self.header, "header")
    }

    /// Decodes the claims segment.
    pub fn claims<C: DeserializeOwned>(&self) -> AuthResult<C> {
        decode_segment(self.claims, "claims")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::token::claims::SessionClaims;

    fn secret() -> SigningSecret {
        SigningSecret::from("codec-test-secret-with-enough-bytes!")
    }

    #[test]
    fn test_encode_layout() {
        let claims = SessionClaims::new(Role::User, "alice", 1_000, 300).unwrap();
        let token = encode(&TokenHeader::default(), &claims, &secret()).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));

        // {"alg":"HS256","typ":"JWT"}
        assert_eq!(parts[0], "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
    }

    #[test]
    fn test_parse_and_decode() {
        let claims = SessionClaims::new(Role::Validator, "node-1", 50, 10).unwrap();
        let token = encode(&TokenHeader::default(), &claims, &secret()).unwrap();

        let encoded = EncodedToken::parse(&token).unwrap();
        assert_eq!(encoded.header().unwrap(), TokenHeader::default());
        assert_eq!(encoded.claims::<SessionClaims>().unwrap(), claims);
        assert_eq!(encoded.signature_bytes().unwrap().len(), 32);

        let dot = token.rfind('.').unwrap();
        assert_eq!(encoded.signing_input(), token[..dot].as_bytes());
    }

    #[test]
    fn test_segment_count() {
        for raw in ["", "abc", "a.b", "a.b.c.d", "a..c", ".b.c", "a.b."] {
            assert!(
                matches!(
                    EncodedToken::parse(raw),
                    Err(AuthError::MalformedToken { .. })
                ),
                "{:?} should be malformed",
                raw
            );
        }
    }

    #[test]
    fn test_bad_segments_are_errors() {
        let encoded = EncodedToken::parse("!!!.e30.sig").unwrap();
        assert!(matches!(
            encoded.header(),
            Err(AuthError::MalformedToken { .. })
        ));

        // "not json" in base64url
        let encoded = EncodedToken::parse("bm90IGpzb24.bm90IGpzb24.c2ln").unwrap();
        assert!(matches!(
            encoded.claims::<SessionClaims>(),
            Err(AuthError::MalformedToken { .. })
        ));
    }
}
