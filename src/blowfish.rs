//! EksBlowfish digest engine.
//!
//! bcrypt is Blowfish with an "expensive key schedule": the key setup mixes
//! the salt into the subkey derivation, then re-runs plain key expansion
//! `2^cost` times, alternately keyed by the password and the salt. The
//! resulting cipher state encrypts the fixed plaintext
//! `OrpheanBeholderScryDoubt` 64 times over, and the first 23 bytes of the
//! ciphertext are the digest.
//!
//! The cipher state lives in an [`EksBlowfish`] value owned by the caller of
//! [`digest`], allocated fresh per invocation. Nothing here is `static` or
//! shared, so concurrent digest computations cannot race by construction.

use crate::salt::Salt;
use crate::tables::{P_INIT, S_INIT};
use crate::variant::Variant;

/// Digest length in bytes. bcrypt discards the last ciphertext byte.
pub const DIGEST_LEN: usize = 23;

/// Password key material is read cyclically but capped at 72 bytes,
/// terminator included; bytes beyond that never influence the subkeys.
pub(crate) const MAX_KEY_LEN: usize = 72;

/// `OrpheanBeholderScryDoubt` as three big-endian 64-bit blocks.
const CIPHERTEXT_SEED: [u32; 6] = [
    0x4f72_7068, 0x6561_6e42, 0x6568_6f6c, 0x6465_7253, 0x6372_7944, 0x6f75_6274,
];

/// Blowfish cipher state: 18 round subkeys and four substitution boxes.
struct EksBlowfish {
    p: [u32; 18],
    s: [[u32; 256]; 4],
}

impl EksBlowfish {
    fn new() -> Self {
        Self { p: P_INIT, s: S_INIT }
    }

    /// The Feistel round function.
    #[inline]
    fn f(&self, x: u32) -> u32 {
        let a = self.s[0][(x >> 24) as usize];
        let b = self.s[1][((x >> 16) & 0xff) as usize];
        let c = self.s[2][((x >> 8) & 0xff) as usize];
        let d = self.s[3][(x & 0xff) as usize];
        (a.wrapping_add(b) ^ c).wrapping_add(d)
    }

    /// Encrypts one 64-bit block in place.
    fn encipher(&self, l: &mut u32, r: &mut u32) {
        let mut xl = *l ^ self.p[0];
        let mut xr = *r;
        for i in (1..17).step_by(2) {
            xr ^= self.f(xl) ^ self.p[i];
            xl ^= self.f(xr) ^ self.p[i + 1];
        }
        *l = xr ^ self.p[17];
        *r = xl;
    }

    /// Key expansion, optionally salted (the "Eks" in EksBlowfish).
    ///
    /// XORs cyclic words of `key` into the P-array, then rederives P and
    /// every S-box by repeated self-encryption. When `salt` is present,
    /// cyclic salt words are XORed into the chaining block before each
    /// encryption; that salting pass runs exactly once per digest, on the
    /// initial expansion.
    fn expand_key(&mut self, key: &KeyStream<'_>, salt: Option<&[u8]>) {
        let mut key_off = 0;
        for i in 0..18 {
            self.p[i] ^= key.next_word(&mut key_off);
        }

        let mut salt_off = 0;
        let mut l = 0u32;
        let mut r = 0u32;

        for i in (0..18).step_by(2) {
            if let Some(salt) = salt {
                l ^= word_at(salt, &mut salt_off);
                r ^= word_at(salt, &mut salt_off);
            }
            self.encipher(&mut l, &mut r);
            self.p[i] = l;
            self.p[i + 1] = r;
        }

        for sbox in 0..4 {
            for i in (0..256).step_by(2) {
                if let Some(salt) = salt {
                    l ^= word_at(salt, &mut salt_off);
                    r ^= word_at(salt, &mut salt_off);
                }
                self.encipher(&mut l, &mut r);
                self.s[sbox][i] = l;
                self.s[sbox][i + 1] = r;
            }
        }
    }
}

/// Cyclic reader over password key material.
///
/// The `2x` variant reproduces crypt_blowfish's historical bug, where bytes
/// with the high bit set were sign-extended before being ORed into the
/// accumulating word and so clobbered its upper bytes.
struct KeyStream<'a> {
    bytes: &'a [u8],
    sign_extend: bool,
}

impl KeyStream<'_> {
    fn next_word(&self, off: &mut usize) -> u32 {
        let mut word = 0u32;
        for _ in 0..4 {
            let b = self.bytes[*off];
            if self.sign_extend && b >= 0x80 {
                word = (word << 8) | (0xffff_ff00 | u32::from(b));
            } else {
                word = (word << 8) | u32::from(b);
            }
            *off = (*off + 1) % self.bytes.len();
        }
        word
    }
}

/// Reads the next cyclic big-endian word of `data`.
#[inline]
fn word_at(data: &[u8], off: &mut usize) -> u32 {
    let mut word = 0u32;
    for _ in 0..4 {
        word = (word << 8) | u32::from(data[*off]);
        *off = (*off + 1) % data.len();
    }
    word
}

/// Builds the key material for a password under a variant: the raw bytes,
/// NUL-terminated for every revision from `2a` on, truncated at 72 bytes.
pub(crate) fn key_material(password: &[u8], variant: Variant) -> Vec<u8> {
    let mut key = Vec::with_capacity(password.len() + 1);
    key.extend_from_slice(password);
    if variant.nul_terminated() {
        key.push(0);
    }
    if key.len() > MAX_KEY_LEN {
        tracing::trace!(len = key.len(), "Truncating password key material to 72 bytes");
        key.truncate(MAX_KEY_LEN);
    }
    // A `2`-variant empty password has no key bytes at all; the cyclic
    // reader needs at least one.
    if key.is_empty() {
        key.push(0);
    }
    key
}

/// Computes the 23-byte bcrypt digest of `password` under `salt`.
///
/// Runs the full EksBlowfish schedule: one salted expansion, then `2^cost`
/// pairs of plain expansions keyed by the password and the salt, then 64 ECB
/// passes over the fixed plaintext.
pub(crate) fn digest(password: &[u8], salt: &Salt) -> [u8; DIGEST_LEN] {
    let key_bytes = key_material(password, salt.variant());
    let key = KeyStream {
        bytes: &key_bytes,
        sign_extend: salt.variant().sign_extends(),
    };
    let salt_bytes: &[u8] = salt.bytes();

    tracing::debug!(
        cost = salt.cost(),
        variant = %salt.variant(),
        "Computing bcrypt digest"
    );

    let mut state = EksBlowfish::new();
    state.expand_key(&key, Some(salt_bytes));
    for _ in 0..1u64 << salt.cost() {
        state.expand_key(&key, None);
        state.expand_key(
            &KeyStream { bytes: salt_bytes, sign_extend: false },
            None,
        );
    }

    let mut words = CIPHERTEXT_SEED;
    for _ in 0..64 {
        for pair in words.chunks_exact_mut(2) {
            let (mut l, mut r) = (pair[0], pair[1]);
            state.encipher(&mut l, &mut r);
            pair[0] = l;
            pair[1] = r;
        }
    }

    let mut out = [0u8; DIGEST_LEN];
    for (i, byte) in out.iter_mut().enumerate() {
        let word = words[i / 4];
        *byte = (word >> (24 - 8 * (i % 4))) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salt::Salt;
    use crate::variant::Variant;

    fn salt(variant: Variant, cost: u32, bytes: [u8; 16]) -> Salt {
        Salt::from_parts(variant, cost, bytes).unwrap()
    }

    #[test]
    fn digest_is_deterministic_for_fixed_salt() {
        let s = salt(Variant::TwoB, 4, [7; 16]);
        assert_eq!(digest(b"hunter2", &s), digest(b"hunter2", &s));
    }

    #[test]
    fn digest_depends_on_password_salt_and_cost() {
        let s = salt(Variant::TwoB, 4, [7; 16]);
        let base = digest(b"hunter2", &s);
        assert_ne!(base, digest(b"hunter3", &s));
        assert_ne!(base, digest(b"hunter2", &salt(Variant::TwoB, 4, [8; 16])));
        assert_ne!(base, digest(b"hunter2", &salt(Variant::TwoB, 5, [7; 16])));
    }

    #[test]
    fn modern_variants_are_byte_identical() {
        let bytes = [42; 16];
        let a = digest(b"caf\xc3\xa9", &salt(Variant::TwoA, 4, bytes));
        let b = digest(b"caf\xc3\xa9", &salt(Variant::TwoB, 4, bytes));
        let y = digest(b"caf\xc3\xa9", &salt(Variant::TwoY, 4, bytes));
        assert_eq!(a, b);
        assert_eq!(a, y);
    }

    #[test]
    fn two_x_matches_two_a_for_ascii_only() {
        let bytes = [42; 16];
        // ASCII bytes never trip the sign extension.
        assert_eq!(
            digest(b"ascii only", &salt(Variant::TwoX, 4, bytes)),
            digest(b"ascii only", &salt(Variant::TwoA, 4, bytes)),
        );
        // A high-bit byte does.
        assert_ne!(
            digest(b"caf\xc3\xa9", &salt(Variant::TwoX, 4, bytes)),
            digest(b"caf\xc3\xa9", &salt(Variant::TwoA, 4, bytes)),
        );
    }

    #[test]
    fn key_material_truncates_at_72_bytes() {
        let long = vec![b'a'; 100];
        let key = key_material(&long, Variant::TwoB);
        assert_eq!(key.len(), MAX_KEY_LEN);
        assert!(key.iter().all(|&b| b == b'a'));
    }

    #[test]
    fn key_material_terminates_modern_variants_only() {
        assert_eq!(key_material(b"pw", Variant::TwoB), b"pw\0");
        assert_eq!(key_material(b"pw", Variant::Two), b"pw");
        assert_eq!(key_material(b"", Variant::TwoB), b"\0");
        // Legacy empty password still yields one key byte for the cyclic
        // reader.
        assert_eq!(key_material(b"", Variant::Two), b"\0");
    }

    #[test]
    fn passwords_sharing_72_key_bytes_collide() {
        let s = salt(Variant::TwoB, 4, [3; 16]);
        let a = vec![b'x'; 80];
        let b = vec![b'x'; 90];
        assert_eq!(digest(&a, &s), digest(&b, &s));
    }
}
