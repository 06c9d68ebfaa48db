//! bcrypt format variants.
//!
//! The tag between the first two `$` signs of an encoded hash records which
//! revision of the bcrypt format produced it. The revisions differ only in
//! historical key-handling details; modelling them as a closed enum makes
//! accepting or rejecting a tag a compile-time-checked decision rather than
//! a string lookup.

use std::fmt;
use std::str::FromStr;

use crate::error::BcryptError;

/// Format revision tag of a bcrypt hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Original 1997 format. The password key stream carries no trailing
    /// NUL terminator. Verify-only.
    Two,
    /// Revision `2a`: NUL-terminated password, the tag most foreign
    /// implementations emit.
    TwoA,
    /// Revision `2b`: OpenBSD's current tag, byte-identical to `2a` here.
    TwoB,
    /// Revision `2x`: marks hashes produced by crypt_blowfish's
    /// sign-extension bug. Verify-only; the bug is reproduced so legacy
    /// hashes still check out.
    TwoX,
    /// Revision `2y`: crypt_blowfish's post-fix tag (PHP `password_hash`),
    /// byte-identical to `2a`.
    TwoY,
}

impl Variant {
    /// The tag as it appears in an encoded string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Two => "2",
            Variant::TwoA => "2a",
            Variant::TwoB => "2b",
            Variant::TwoX => "2x",
            Variant::TwoY => "2y",
        }
    }

    /// Whether new salts and hashes may carry this tag.
    ///
    /// `2` and `2x` exist only so that hashes produced decades ago keep
    /// verifying; nothing should mint new ones.
    #[must_use]
    pub fn generable(self) -> bool {
        matches!(self, Variant::TwoA | Variant::TwoB | Variant::TwoY)
    }

    /// Whether the password key stream ends in a NUL terminator.
    ///
    /// Every revision from `2a` onwards appends one; the original `2`
    /// format predates it.
    #[must_use]
    pub(crate) fn nul_terminated(self) -> bool {
        !matches!(self, Variant::Two)
    }

    /// Whether key expansion reproduces the historical sign-extension bug.
    #[must_use]
    pub(crate) fn sign_extends(self) -> bool {
        matches!(self, Variant::TwoX)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" => Ok(Variant::Two),
            "2a" => Ok(Variant::TwoA),
            "2b" => Ok(Variant::TwoB),
            "2x" => Ok(Variant::TwoX),
            "2y" => Ok(Variant::TwoY),
            other => Err(BcryptError::InvalidFormat(format!(
                "unrecognized variant tag `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_tag() {
        for variant in [
            Variant::Two,
            Variant::TwoA,
            Variant::TwoB,
            Variant::TwoX,
            Variant::TwoY,
        ] {
            assert_eq!(variant.as_str().parse::<Variant>().unwrap(), variant);
        }
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!("2c".parse::<Variant>().is_err());
        assert!("argon2id".parse::<Variant>().is_err());
        assert!("".parse::<Variant>().is_err());
    }

    #[test]
    fn only_modern_tags_are_generable() {
        assert!(Variant::TwoA.generable());
        assert!(Variant::TwoB.generable());
        assert!(Variant::TwoY.generable());
        assert!(!Variant::Two.generable());
        assert!(!Variant::TwoX.generable());
    }

    #[test]
    fn legacy_two_omits_terminator() {
        assert!(!Variant::Two.nul_terminated());
        assert!(Variant::TwoB.nul_terminated());
    }
}
