//! Master password verifier
//!
//! The verifier is a SHA-256 digest over a domain tag and the derived session
//! key. It lets a login attempt be checked without storing the password, and
//! the key cannot be recovered from it.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::SessionKey;

const VERIFIER_DOMAIN: &[u8] = b"nexa.verifier.v1";

/// Compute the stored verifier for a derived key
pub fn compute_verifier(key: &SessionKey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(VERIFIER_DOMAIN);
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

/// Compare a candidate key against a stored verifier in constant time
pub fn verifier_matches(key: &SessionKey, stored: &[u8]) -> bool {
    let candidate = compute_verifier(key);
    // ct_eq on slices of different length is false without inspecting content
    candidate.as_slice().ct_eq(stored).into()
}
