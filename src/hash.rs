//! Password hashing and verification.
//!
//! This is the surface most callers want: hash a password into the 60-byte
//! encoded form other ecosystems understand, and check a password against a
//! stored hash. Both directions are deliberately slow; on anything
//! latency-sensitive, prefer the async counterparts in [`crate::task`].
//!
//! ## Examples
//!
//! ```
//! use hardtack::{hash_password, verify_password};
//!
//! let encoded = hash_password("correct horse battery staple").unwrap();
//! assert!(verify_password("correct horse battery staple", &encoded));
//! assert!(!verify_password("Tr0ub4dor&3", &encoded));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::b64;
use crate::blowfish::{self, DIGEST_LEN};
use crate::error::BcryptError;
use crate::salt::{self, Salt};

/// A parsed bcrypt hash: the salt it was computed under plus the 23-byte
/// digest. Its `Display` form is the canonical 60-character encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashString {
    salt: Salt,
    digest: [u8; DIGEST_LEN],
}

impl HashString {
    /// The salt embedded in this hash.
    #[must_use]
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// The raw digest bytes.
    #[must_use]
    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Display for HashString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.salt, b64::encode(&self.digest))
    }
}

impl FromStr for HashString {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt, digest_text) = salt::split_encoded(s)?;
        if digest_text.is_empty() {
            return Err(BcryptError::InvalidFormat(
                "salt-only string carries no digest".into(),
            ));
        }
        let digest_bytes = b64::decode(digest_text, DIGEST_LEN)?;
        let digest: [u8; DIGEST_LEN] = digest_bytes
            .try_into()
            .map_err(|_| BcryptError::InvalidFormat("digest field decodes short".into()))?;
        Ok(Self { salt, digest })
    }
}

/// Hashes a password with a freshly generated salt (variant `2b`, cost 10).
///
/// The password's UTF-8 bytes are NUL-terminated and silently truncated at
/// 72 bytes, matching every deployed bcrypt; content beyond 71 bytes does
/// not participate in the digest.
///
/// ## Examples
///
/// ```
/// use hardtack::hash_password;
///
/// let encoded = hash_password("my-secret").unwrap();
/// assert_eq!(encoded.len(), 60);
/// assert!(encoded.starts_with("$2b$10$"));
/// ```
///
/// ## Errors
///
/// Infallible in practice; the `Result` matches the cost- and salt-taking
/// forms so call sites compose uniformly.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash_password_with_salt(password, &Salt::generate())
}

/// Hashes a password with a freshly generated salt at an explicit cost.
///
/// Each increment doubles the work: cost 10 is a few tens of milliseconds on
/// current hardware, cost 14 already near a second.
///
/// ## Errors
///
/// Returns [`BcryptError::InvalidCost`] if `cost` is outside `4..=30`.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash_password_with_salt(password, &Salt::generate_with_cost(cost)?)
}

/// Hashes a password under a caller-supplied salt.
///
/// Useful when re-deriving a hash deterministically, or when the salt was
/// parsed from an existing encoded string.
///
/// ## Errors
///
/// Returns [`BcryptError::UnsupportedVariant`] if the salt carries a
/// verify-only variant (`2` or `2x`): legacy hashes keep verifying, but new
/// ones are never minted under those tags.
pub fn hash_password_with_salt(password: &str, salt: &Salt) -> Result<String, BcryptError> {
    if !salt.variant().generable() {
        return Err(BcryptError::UnsupportedVariant(salt.variant()));
    }
    let digest = blowfish::digest(password.as_bytes(), salt);
    Ok(HashString { salt: *salt, digest }.to_string())
}

/// Checks a password against an encoded hash.
///
/// Recomputes the digest under the salt, cost, and variant embedded in
/// `encoded` and compares it to the stored digest in constant time.
///
/// Returns `false` for a wrong password *and* for anything that is not a
/// well-formed bcrypt hash. The two cases are deliberately
/// indistinguishable: for authentication purposes both mean "no", and
/// telling a caller (or an attacker watching error rates) which one
/// occurred is an information leak. Verification of legacy `2` and `2x`
/// hashes is supported, reproducing their historical key-handling.
///
/// ## Examples
///
/// ```
/// use hardtack::verify_password;
///
/// assert!(!verify_password("anything", "not-a-hash"));
/// ```
#[must_use]
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let stored = match encoded.parse::<HashString>() {
        Ok(stored) => stored,
        Err(err) => {
            tracing::debug!(error = %err, "Verification against unparseable hash");
            return false;
        }
    };
    let computed = blowfish::digest(password.as_bytes(), stored.salt());
    constant_time_eq(&computed, stored.digest())
}

/// Constant-time comparison: accumulates differences across every byte
/// instead of exiting at the first mismatch, so timing does not reveal how
/// much of the digest matched.
fn constant_time_eq(a: &[u8; DIGEST_LEN], b: &[u8; DIGEST_LEN]) -> bool {
    let mut diff = 0u8;
    for i in 0..DIGEST_LEN {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Variant;

    // Cost 4 keeps the strengthening loop short enough for unit tests.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify_round_trips() {
        let encoded = hash_password_with_cost("thisisapassword", TEST_COST).unwrap();
        assert_eq!(encoded.len(), 60);
        assert!(verify_password("thisisapassword", &encoded));
        assert!(!verify_password("thisisapassword2", &encoded));
    }

    #[test]
    fn empty_password_round_trips() {
        let encoded = hash_password_with_cost("", TEST_COST).unwrap();
        assert!(verify_password("", &encoded));
        assert!(!verify_password("x", &encoded));
    }

    #[test]
    fn unicode_password_round_trips() {
        // Includes 4-byte scalar values.
        let password = "パスワード🔐👍🏿";
        let encoded = hash_password_with_cost(password, TEST_COST).unwrap();
        assert!(verify_password(password, &encoded));
        assert!(!verify_password("password", &encoded));
    }

    #[test]
    fn same_password_fresh_salts_differ() {
        let a = hash_password_with_cost("same", TEST_COST).unwrap();
        let b = hash_password_with_cost("same", TEST_COST).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn fixed_salt_is_deterministic() {
        let salt = Salt::generate_with_cost(TEST_COST).unwrap();
        let a = hash_password_with_salt("pw", &salt).unwrap();
        let b = hash_password_with_salt("pw", &salt).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn caller_salt_round_trips_through_text() {
        let salt = Salt::generate_with_cost(TEST_COST).unwrap();
        let reparsed: Salt = salt.to_string().parse().unwrap();
        let encoded = hash_password_with_salt("pw", &reparsed).unwrap();
        assert!(encoded.starts_with(&salt.to_string()));
        assert!(verify_password("pw", &encoded));
    }

    #[test]
    fn truncation_beyond_71_content_bytes() {
        // 71 content bytes + terminator fill the 72-byte key budget; these
        // two passwords agree on all of it and must collide.
        let a = "a".repeat(80);
        let b = "a".repeat(120);
        let salt = Salt::generate_with_cost(TEST_COST).unwrap();
        let hash_a = hash_password_with_salt(&a, &salt).unwrap();
        assert!(verify_password(&b, &hash_a));
        // Shorter than the budget, the length still matters.
        assert!(!verify_password(&"a".repeat(70), &hash_a));
    }

    #[test]
    fn refuses_to_mint_legacy_variants() {
        for variant in [Variant::Two, Variant::TwoX] {
            let salt = Salt::from_parts(variant, TEST_COST, [9; 16]).unwrap();
            assert!(matches!(
                hash_password_with_salt("pw", &salt),
                Err(BcryptError::UnsupportedVariant(v)) if v == variant
            ));
        }
    }

    #[test]
    fn verify_swallows_malformed_input() {
        assert!(!verify_password("anything", "not-a-hash"));
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "$2b$10$tooshort"));
        assert!(!verify_password("anything", "$9a$10$N9qo8uLOickgx2ZMRZoMye"));
        // Salt-only string carries nothing to compare against.
        assert!(!verify_password("anything", "$2b$10$N9qo8uLOickgx2ZMRZoMye"));
    }

    #[test]
    fn hash_string_round_trips_byte_for_byte() {
        let encoded = hash_password_with_cost("round-trip", TEST_COST).unwrap();
        let parsed: HashString = encoded.parse().unwrap();
        assert_eq!(parsed.to_string(), encoded);
        assert_eq!(parsed.salt().cost(), TEST_COST);
    }

    #[test]
    fn constant_time_eq_matches_equality() {
        let a = [5u8; DIGEST_LEN];
        let mut b = a;
        assert!(constant_time_eq(&a, &b));
        b[DIGEST_LEN - 1] ^= 1;
        assert!(!constant_time_eq(&a, &b));
        b[DIGEST_LEN - 1] ^= 1;
        b[0] ^= 0x80;
        assert!(!constant_time_eq(&a, &b));
    }
}
