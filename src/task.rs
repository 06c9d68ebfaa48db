//! Non-blocking counterparts of every hashing operation.
//!
//! bcrypt is slow on purpose: a single digest at the default cost occupies a
//! core for tens of milliseconds, and an async executor thread stalled for
//! that long starves every other task scheduled on it. Each function here
//! takes the same arguments as its blocking counterpart in [`crate::hash`] /
//! [`crate::salt`], moves them onto tokio's blocking pool with
//! [`tokio::task::spawn_blocking`], and resolves exactly once with the same
//! result. The worker runs the digest fully synchronously; the caller
//! suspends only on the returned future.
//!
//! Dropping the future abandons the operation but does not interrupt the
//! worker; there is no cancellation mid-digest. Each dispatched operation is
//! self-contained and leaves no state behind, so concurrent calls need no
//! coordination.
//!
//! ## Examples
//!
//! ```no_run
//! # async fn example() -> Result<(), hardtack::BcryptError> {
//! let encoded = hardtack::task::hash_password("my-secret".to_owned()).await?;
//! assert!(hardtack::task::verify_password("my-secret".to_owned(), encoded).await);
//! # Ok(())
//! # }
//! ```

use tokio::task::spawn_blocking;

use crate::error::BcryptError;
use crate::salt::Salt;

/// Runs a hashing closure on the blocking pool, mapping a lost worker to
/// [`BcryptError::Worker`].
async fn dispatch<T, F>(op: F) -> Result<T, BcryptError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BcryptError> + Send + 'static,
{
    match spawn_blocking(op).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %err, "Hashing worker failed");
            Err(BcryptError::Worker(err.to_string()))
        }
    }
}

/// Generates a salt with default cost and variant off the caller's thread.
///
/// Salt generation is cheap; this exists so fully-async call sites can stay
/// uniform. See [`Salt::generate`].
///
/// ## Errors
///
/// Only [`BcryptError::Worker`] if the blocking pool rejects the task.
pub async fn gen_salt() -> Result<Salt, BcryptError> {
    dispatch(|| Ok(Salt::generate())).await
}

/// Async form of [`Salt::generate_with_cost`].
///
/// ## Errors
///
/// [`BcryptError::InvalidCost`] propagates through the future unchanged.
pub async fn gen_salt_with_cost(cost: u32) -> Result<Salt, BcryptError> {
    dispatch(move || Salt::generate_with_cost(cost)).await
}

/// Async form of [`crate::hash_password`].
///
/// Takes owned arguments; they move onto the worker.
///
/// ## Errors
///
/// Same failure modes as the blocking form, plus [`BcryptError::Worker`].
pub async fn hash_password(password: String) -> Result<String, BcryptError> {
    dispatch(move || crate::hash_password(&password)).await
}

/// Async form of [`crate::hash_password_with_cost`].
///
/// ## Errors
///
/// [`BcryptError::InvalidCost`] propagates through the future unchanged.
pub async fn hash_password_with_cost(
    password: String,
    cost: u32,
) -> Result<String, BcryptError> {
    dispatch(move || crate::hash_password_with_cost(&password, cost)).await
}

/// Async form of [`crate::hash_password_with_salt`].
///
/// ## Errors
///
/// [`BcryptError::UnsupportedVariant`] propagates through the future
/// unchanged.
pub async fn hash_password_with_salt(
    password: String,
    salt: Salt,
) -> Result<String, BcryptError> {
    dispatch(move || crate::hash_password_with_salt(&password, &salt)).await
}

/// Async form of [`crate::verify_password`].
///
/// Resolves to a plain `bool` with the blocking form's contract: malformed
/// hashes are a non-match, not an error. A lost worker also resolves
/// `false`, since the caller's only question is "does this password check
/// out" and the answer is unknown-therefore-no.
pub async fn verify_password(password: String, encoded: String) -> bool {
    dispatch(move || Ok(crate::verify_password(&password, &encoded)))
        .await
        .unwrap_or(false)
}
