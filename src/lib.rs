//! bcrypt password hashing with blocking and non-blocking surfaces.
//!
//! `hardtack` implements the bcrypt adaptive hash end to end: the
//! EksBlowfish digest, the bcrypt-specific radix-64 codec, and the
//! `$2b$10$...` encoded form that interoperates with PHP's `password_hash`,
//! the Node bcrypt packages, OpenBSD, and everything else that speaks the
//! format. Because a digest is deliberately expensive, every operation also
//! has an async counterpart in [`task`] that runs the computation on an
//! isolated worker instead of the caller's thread.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `async` | Yes | Non-blocking surface in [`task`], backed by tokio's blocking pool |
//!
//! ## Examples
//!
//! ```
//! use hardtack::{hash_password, verify_password};
//!
//! let encoded = hash_password("my-secret-password").unwrap();
//! assert!(verify_password("my-secret-password", &encoded));
//! assert!(!verify_password("wrong-password", &encoded));
//!
//! // Hashes from other ecosystems verify too.
//! assert!(verify_password(
//!     "test",
//!     "$2y$10$YCW2KSGtFxODsDj5SzCvpussZrfsQb7S3Qtyb7meIumNtyr9ptWoK",
//! ));
//! ```
//!
//! Hashing and verification never report *why* a check failed: a malformed
//! stored hash and a wrong password are both just `false` from
//! [`verify_password`]. Cost configuration mistakes, by contrast, are
//! programmer errors and surface as [`BcryptError::InvalidCost`].

mod b64;
mod blowfish;
mod error;
mod hash;
mod salt;
mod tables;
mod variant;

#[cfg(feature = "async")]
pub mod task;

pub use blowfish::DIGEST_LEN;
pub use error::BcryptError;
pub use hash::{hash_password, hash_password_with_cost, hash_password_with_salt,
    verify_password, HashString};
pub use salt::{Salt, DEFAULT_COST, MAX_COST, MAX_GENERATE_COST, MIN_COST, SALT_LEN};
pub use variant::Variant;
