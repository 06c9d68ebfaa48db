//! Error types for hashing and verification.

use thiserror::Error;

use crate::variant::Variant;

/// Errors that can occur during bcrypt hashing operations.
///
/// `verify_password` never surfaces these: a hash that fails to parse is
/// reported as a non-match, so callers cannot distinguish "wrong password"
/// from "not a bcrypt hash".
#[derive(Debug, Error)]
pub enum BcryptError {
    /// Cost factor outside the range accepted for new salts.
    #[error("cost factor {0} is outside the accepted range {min}..={max}", min = crate::salt::MIN_COST, max = crate::salt::MAX_GENERATE_COST)]
    InvalidCost(u32),

    /// Malformed encoded hash or salt string.
    #[error("malformed bcrypt string: {0}")]
    InvalidFormat(String),

    /// A legacy variant was requested for hash generation.
    #[error("variant `{0}` is verify-only and cannot be used for new hashes")]
    UnsupportedVariant(Variant),

    /// The blocking worker running the operation failed.
    #[error("worker failed: {0}")]
    Worker(String),
}
