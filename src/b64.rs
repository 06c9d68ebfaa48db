//! bcrypt's radix-64 codec.
//!
//! bcrypt predates RFC 4648 and uses its own alphabet, `./A-Za-z0-9`, in a
//! different order from standard base64 and without padding. Feeding these
//! strings through a general-purpose base64 routine decodes *something*, so
//! the mismatch tends to surface only as hashes that silently stop verifying
//! against other implementations. The codec here is the bcrypt-specific one
//! shared by every deployed implementation.
//!
//! Groups pack 3 bytes into 4 characters; a partial final group masks its
//! unused low bits to zero.

use crate::error::BcryptError;

const ALPHABET: &[u8; 64] =
    b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Value of one alphabet character, or an error for anything outside it.
fn char64(c: u8) -> Result<u8, BcryptError> {
    match c {
        b'.' => Ok(0),
        b'/' => Ok(1),
        b'A'..=b'Z' => Ok(c - b'A' + 2),
        b'a'..=b'z' => Ok(c - b'a' + 28),
        b'0'..=b'9' => Ok(c - b'0' + 54),
        _ => Err(BcryptError::InvalidFormat(format!(
            "byte {c:#04x} is not in the bcrypt radix-64 alphabet"
        ))),
    }
}

/// Encodes bytes into bcrypt radix-64 text.
#[must_use]
pub(crate) fn encode(data: &[u8]) -> String {
    let mut out = Vec::with_capacity(data.len().div_ceil(3) * 4);
    let mut iter = data.iter().copied();

    while let Some(b0) = iter.next() {
        out.push(ALPHABET[(b0 >> 2) as usize]);
        let mut acc = (b0 & 0x03) << 4;

        let Some(b1) = iter.next() else {
            out.push(ALPHABET[acc as usize]);
            break;
        };
        acc |= (b1 >> 4) & 0x0f;
        out.push(ALPHABET[acc as usize]);
        acc = (b1 & 0x0f) << 2;

        let Some(b2) = iter.next() else {
            out.push(ALPHABET[acc as usize]);
            break;
        };
        acc |= (b2 >> 6) & 0x03;
        out.push(ALPHABET[acc as usize]);
        out.push(ALPHABET[(b2 & 0x3f) as usize]);
    }

    // The alphabet is ASCII throughout.
    String::from_utf8(out).expect("radix-64 output is ASCII")
}

/// Decodes bcrypt radix-64 text into at most `max_len` bytes.
///
/// Fails on any character outside the alphabet. Input shorter than two
/// characters, or truncated mid-group, yields however many whole bytes the
/// characters determine; callers check the byte count against the length
/// their field requires.
pub(crate) fn decode(text: &str, max_len: usize) -> Result<Vec<u8>, BcryptError> {
    let chars = text.as_bytes();
    let mut out = Vec::with_capacity(max_len);
    let mut off = 0;

    while off + 1 < chars.len() && out.len() < max_len {
        let c1 = char64(chars[off])?;
        let c2 = char64(chars[off + 1])?;
        off += 2;
        out.push((c1 << 2) | ((c2 & 0x30) >> 4));
        if out.len() >= max_len || off >= chars.len() {
            break;
        }

        let c3 = char64(chars[off])?;
        off += 1;
        out.push(((c2 & 0x0f) << 4) | ((c3 & 0x3c) >> 2));
        if out.len() >= max_len || off >= chars.len() {
            break;
        }

        let c4 = char64(chars[off])?;
        off += 1;
        out.push(((c3 & 0x03) << 6) | c4);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_salt_bytes() {
        // 16 zero bytes -> 22 dots (alphabet value 0).
        assert_eq!(encode(&[0u8; 16]), "......................");
        // 15 bytes fill five full groups of '9' (value 63); the 16th byte
        // contributes "9u".
        assert_eq!(encode(&[0xff; 16]), "999999999999999999999u");
    }

    #[test]
    fn decode_inverts_encode_for_salt_and_digest_lengths() {
        let salt: Vec<u8> = (0u8..16).collect();
        assert_eq!(decode(&encode(&salt), 16).unwrap(), salt);

        let digest: Vec<u8> = (100u8..123).collect();
        let text = encode(&digest);
        assert_eq!(text.len(), 31);
        assert_eq!(decode(&text, 23).unwrap(), digest);
    }

    #[test]
    fn partial_final_group_masks_low_bits() {
        // One byte encodes as two characters; the second character carries
        // only the top two bits of the second position.
        assert_eq!(encode(&[0xff]), "9u");
        assert_eq!(decode("9u", 1).unwrap(), vec![0xff]);
        // "9y" differs from "9u" only in masked bits and decodes identically.
        assert_eq!(decode("9y", 1).unwrap(), vec![0xff]);
    }

    #[test]
    fn alphabet_is_not_standard_base64() {
        // Standard base64 maps value 0 to 'A'; bcrypt maps it to '.'.
        // An implementation wired to the standard table would produce "AAAA"
        // here instead.
        assert_eq!(encode(&[0, 0, 0]), "....");
        // And standard base64's '+' is not in bcrypt's alphabet at all.
        assert!(decode("ab+d", 3).is_err());
    }

    #[test]
    fn rejects_bytes_outside_alphabet() {
        assert!(decode("abc$", 3).is_err());
        assert!(decode("ab cd", 3).is_err());
        assert!(decode("\u{00e9}abc", 3).is_err());
    }

    #[test]
    fn honors_max_len() {
        let text = encode(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(decode(&text, 4).unwrap(), vec![1, 2, 3, 4]);
    }
}
