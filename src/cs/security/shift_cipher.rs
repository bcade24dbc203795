//! DISCLAIMER: This is a toy additive stream cipher keyed by a Diffie-Hellman shared secret.
//! It is *EXCLUSIVELY* for demonstration and educational purposes and offers no confidentiality
//! whatsoever: every character is shifted by the same amount.
//!
//! Each character's code point is shifted by `key` and reduced modulo 256, so the output is
//! always made of characters in `U+0000..=U+00FF`. Messages whose characters already lie in
//! that range survive a round trip for every integer key. Anything above `U+00FF` is folded
//! into the single-byte range on encode and cannot be recovered.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::ToPrimitive;

/// Number of distinct symbols the cipher works over.
pub const SHIFT_CIPHER_ALPHABET: u32 = 256;

/// A key reduced to its effective shift, ready to transform any number of messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftCipher {
    shift: u32,
}

impl ShiftCipher {
    /// Build a cipher from any integer key, negative keys included.
    pub fn new(key: &BigInt) -> Self {
        let reduced = key.mod_floor(&BigInt::from(SHIFT_CIPHER_ALPHABET));
        // mod_floor by a positive modulus is always in [0, 256)
        let shift = reduced.to_u32().unwrap_or(0);
        ShiftCipher { shift }
    }

    /// The effective shift in `0..256`.
    pub fn shift(&self) -> u32 {
        self.shift
    }

    pub fn encode(&self, message: &str) -> String {
        message
            .chars()
            .map(|c| to_char((c as u32 + self.shift) % SHIFT_CIPHER_ALPHABET))
            .collect()
    }

    pub fn decode(&self, cipher: &str) -> String {
        cipher
            .chars()
            .map(|c| {
                let code = c as u32 % SHIFT_CIPHER_ALPHABET;
                to_char((code + SHIFT_CIPHER_ALPHABET - self.shift) % SHIFT_CIPHER_ALPHABET)
            })
            .collect()
    }
}

impl From<&BigUint> for ShiftCipher {
    fn from(key: &BigUint) -> Self {
        ShiftCipher::new(&BigInt::from(key.clone()))
    }
}

fn to_char(code: u32) -> char {
    // callers reduce modulo 256 first
    char::from(code as u8)
}

/// Encode `message` with `key`: `(code_point + key) mod 256` per character.
pub fn shift_encode(message: &str, key: &BigInt) -> String {
    ShiftCipher::new(key).encode(message)
}

/// Decode `cipher` with `key`: `(code_point - key) mod 256` per character.
pub fn shift_decode(cipher: &str, key: &BigInt) -> String {
    ShiftCipher::new(key).decode(cipher)
}
