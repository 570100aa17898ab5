// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signature engine.
//!
//! A stateless sign/verify pair over a shared secret using HMAC-SHA256.
//! Verification never returns early on the first differing byte: the
//! comparison is delegated to [`subtle::ConstantTimeEq`].

use std::fmt;

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of a signature produced by [`sign`].
pub const SIGNATURE_LEN: usize = 32;

/// Minimum secret length that does not trigger a configuration warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

// =============================================================================
// SigningSecret
// =============================================================================

/// Shared secret used to sign and verify tokens.
///
/// The bytes are wiped when the last clone is dropped and never appear in
/// `Debug` output.
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Wraps raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// Generates a random 32-byte secret.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; RECOMMENDED_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(bytes)
    }

    /// Returns the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the secret length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the secret is shorter than recommended.
    pub fn is_weak(&self) -> bool {
        self.len() < RECOMMENDED_SECRET_LEN
    }
}

impl From<&str> for SigningSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SigningSecret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.len())
    }
}

// =============================================================================
// Sign / Verify
// =============================================================================

fn keyed_mac(secret: &SigningSecret) -> HmacSha256 {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    }
}

/// Computes the HMAC-SHA256 of `message` under `secret`.
pub fn sign(message: &[u8], secret: &SigningSecret) -> [u8; SIGNATURE_LEN] {
    let mut mac = keyed_mac(secret);
    mac.update(message);
    let mut out = [0u8; SIGNATURE_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Returns `true` if `signature` is the HMAC of `message` under `secret`.
///
/// Never panics; a mismatch of any kind is `false`.
pub fn verify(message: &[u8], signature: &[u8], secret: &SigningSecret) -> bool {
    let expected = sign(message, secret);
    constant_time_eq(&expected, signature)
}

/// Compares two byte strings without branching on their contents.
///
/// Lengths are public (every signature is [`SIGNATURE_LEN`] bytes), so an
/// unequal length is rejected up front and never reaches the comparison.
pub fn constant_time_eq(expected: &[u8], supplied: &[u8]) -> bool {
    if expected.len() != supplied.len() {
        return false;
    }
    expected.ct_eq(supplied).into()
}

// =============================================================================
// Tests
// =============================================================================
