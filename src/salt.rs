//! Salt generation and the salt-string form.
//!
//! A salt is 16 cryptographically random bytes plus the variant tag and cost
//! factor that will govern the digest computed under it. Its textual form is
//! the 29-character prefix of a full hash, e.g.
//! `$2b$10$N9qo8uLOickgx2ZMRZoMye`, and everything needed to re-derive a
//! digest during verification is recoverable from that prefix.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::b64;
use crate::error::BcryptError;
use crate::variant::Variant;

/// Number of random bytes in a salt.
pub const SALT_LEN: usize = 16;

/// Lowest cost factor accepted anywhere.
pub const MIN_COST: u32 = 4;

/// Highest cost factor accepted when decoding a foreign hash.
pub const MAX_COST: u32 = 31;

/// Highest cost factor accepted for new salts.
///
/// The cipher itself tolerates 31, but `2^31` key-setup rounds is a
/// multi-minute computation and nothing interoperable generates it. Capping
/// generation one notch below keeps a mistyped cost from turning into a
/// denial-of-service on our own workers, while decoding still tolerates 31
/// so foreign hashes verify.
pub const MAX_GENERATE_COST: u32 = 30;

/// Cost factor used when the caller does not pick one.
pub const DEFAULT_COST: u32 = 10;

/// A bcrypt salt: variant tag, cost factor, and 16 random bytes.
///
/// Immutable once created. Obtain one from [`Salt::generate`],
/// [`Salt::generate_with_cost`], or by parsing an existing salt or hash
/// prefix with [`str::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt {
    variant: Variant,
    cost: u32,
    bytes: [u8; SALT_LEN],
}

impl Salt {
    /// Generates a salt with the default cost ([`DEFAULT_COST`]) and the
    /// `2b` variant.
    ///
    /// ## Examples
    ///
    /// ```
    /// use hardtack::Salt;
    ///
    /// let salt = Salt::generate();
    /// assert_eq!(salt.cost(), 10);
    /// assert!(salt.to_string().starts_with("$2b$10$"));
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with_cost(DEFAULT_COST).expect("default cost is in range")
    }

    /// Generates a salt with an explicit cost factor.
    ///
    /// ## Errors
    ///
    /// Returns [`BcryptError::InvalidCost`] if `cost` is outside
    /// [`MIN_COST`]`..=`[`MAX_GENERATE_COST`].
    pub fn generate_with_cost(cost: u32) -> Result<Self, BcryptError> {
        if !(MIN_COST..=MAX_GENERATE_COST).contains(&cost) {
            return Err(BcryptError::InvalidCost(cost));
        }

        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        tracing::debug!(cost, "Generated salt");

        Ok(Self {
            variant: Variant::TwoB,
            cost,
            bytes,
        })
    }

    /// Assembles a salt from parsed parts. Decode-side, so cost 31 passes.
    pub(crate) fn from_parts(
        variant: Variant,
        cost: u32,
        bytes: [u8; SALT_LEN],
    ) -> Result<Self, BcryptError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(BcryptError::InvalidFormat(format!(
                "cost factor {cost} is outside the decodable range {MIN_COST}..={MAX_COST}"
            )));
        }
        Ok(Self { variant, cost, bytes })
    }

    /// The variant tag digests under this salt will carry.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The cost factor; key setup runs `2^cost` strengthening rounds.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// The raw salt bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8; SALT_LEN] {
        &self.bytes
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}",
            self.variant,
            self.cost,
            b64::encode(&self.bytes)
        )
    }
}

impl FromStr for Salt {
    type Err = BcryptError;

    /// Parses the salt prefix of an encoded string.
    ///
    /// Accepts a bare 29-character salt string or a full 60-character hash;
    /// in the latter case the digest portion is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt, _) = split_encoded(s)?;
        Ok(salt)
    }
}

/// Splits an encoded string into its salt and the radix-64 digest portion
/// (empty for a salt-only string).
///
/// Strict on shape: leading `$`, known variant tag, exactly two cost digits,
/// and a radix-64 payload of exactly 22 (salt-only) or 53 (full hash)
/// characters.
pub(crate) fn split_encoded(s: &str) -> Result<(Salt, &str), BcryptError> {
    let rest = s
        .strip_prefix('$')
        .ok_or_else(|| BcryptError::InvalidFormat("missing leading `$`".into()))?;
    let (tag, rest) = rest
        .split_once('$')
        .ok_or_else(|| BcryptError::InvalidFormat("missing variant delimiter".into()))?;
    let variant: Variant = tag.parse()?;
    let (cost_digits, payload) = rest
        .split_once('$')
        .ok_or_else(|| BcryptError::InvalidFormat("missing cost delimiter".into()))?;

    if cost_digits.len() != 2 || !cost_digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BcryptError::InvalidFormat(format!(
            "cost field `{cost_digits}` is not two digits"
        )));
    }
    let cost: u32 = cost_digits
        .parse()
        .map_err(|_| BcryptError::InvalidFormat("unparseable cost field".into()))?;

    // Length and slicing below are byte-based; anything outside the ASCII
    // alphabet fails in the radix-64 decoder, but reject it before slicing
    // can land inside a multi-byte character.
    if !payload.is_ascii() {
        return Err(BcryptError::InvalidFormat(
            "payload contains non-ASCII bytes".into(),
        ));
    }

    let digest_text = match payload.len() {
        22 => "",
        53 => &payload[22..],
        n => {
            return Err(BcryptError::InvalidFormat(format!(
                "payload is {n} characters, expected 22 (salt) or 53 (hash)"
            )));
        }
    };

    let salt_bytes = b64::decode(&payload[..22], SALT_LEN)?;
    let bytes: [u8; SALT_LEN] = salt_bytes
        .try_into()
        .map_err(|_| BcryptError::InvalidFormat("salt field decodes short".into()))?;

    Ok((Salt::from_parts(variant, cost, bytes)?, digest_text))
}
