//! DISCLAIMER: This library is a toy example of Diffie-Hellman Key Exchange in pure Rust.
//! It is *EXCLUSIVELY* for demonstration and educational purposes.
//! Absolutely DO NOT use it for real cryptographic or security-sensitive operations.
//! It is not audited, not vetted, and very likely insecure in practice.
//!
//! If you need Diffie-Hellman or any cryptographic operations in production, please use a
//! vetted, well-reviewed cryptography library.

use std::str::FromStr;

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::{One, Zero};
use rand::{rngs::StdRng, SeedableRng};

use crate::error::{Error, Field, Result, ValidationError};
use crate::math::number_theory::{is_prime, is_primitive_root};

/// DomainParameters holds the prime modulus `p` and generator `g` both parties agree on.
///
/// Nothing here is enforced: a non-prime `p` or a `g` that is not a primitive root is
/// still accepted, and [`DomainParameters::validate`] only reports on it.
///
/// *This is for demonstration only. DO NOT use in real systems.*
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParameters {
    /// The prime modulus.
    pub p: BigUint,
    /// The generator, ideally a primitive root modulo `p`.
    pub g: BigUint,
}

/// Outcome of the advisory checks on a pair of domain parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterValidity {
    /// `p` is prime.
    pub p_valid: bool,
    /// `p` is prime and `g` is a primitive root modulo `p`.
    pub g_valid: bool,
}

impl ParameterValidity {
    pub fn is_valid(&self) -> bool {
        self.p_valid && self.g_valid
    }
}

/// Configuration for secret exponent generation.
#[derive(Debug, Clone, Default)]
pub struct SecretGenConfig {
    /// Optional RNG seed for reproducibility in toy examples.
    pub seed: Option<u64>,
}

impl DomainParameters {
    pub fn new(p: BigUint, g: BigUint) -> Self {
        DomainParameters { p, g }
    }

    /// Parse both parameters from user-entered text.
    ///
    /// Surrounding whitespace is ignored. Empty text is reported as missing and
    /// non-integer text as malformed, both as [`ValidationError`]. Negative values are
    /// integers but not usable parameters, and give [`Error::InvalidInput`]. `p` is
    /// checked first.
    pub fn parse(p_text: &str, g_text: &str) -> Result<Self> {
        let p = parse_integer(p_text, Field::Prime)?;
        let g = parse_integer(g_text, Field::Generator)?;
        Ok(DomainParameters {
            p: non_negative(p, Field::Prime)?,
            g: non_negative(g, Field::Generator)?,
        })
    }

    /// Run the advisory primality and primitive-root checks.
    ///
    /// The primitive-root check only runs once `p` is known to be prime; for anything
    /// else `g_valid` is `false` without the `O(p)` scan.
    pub fn validate(&self) -> ParameterValidity {
        let p_valid = is_prime(&BigInt::from(self.p.clone()));
        let g_valid = p_valid && is_primitive_root(&self.g, &self.p);
        ParameterValidity { p_valid, g_valid }
    }
}

/// Parse an integer typed in by a user. Negative values are accepted here; callers
/// decide whether a sign makes sense for their field.
pub(crate) fn parse_integer(text: &str, field: Field) -> std::result::Result<BigInt, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    BigInt::from_str(trimmed).map_err(|_| ValidationError::NotAnInteger {
        field,
        text: trimmed.to_string(),
    })
}

fn non_negative(value: BigInt, field: Field) -> Result<BigUint> {
    value
        .to_biguint()
        .ok_or_else(|| Error::invalid_input(format!("{} must not be negative, got {}", field, value)))
}

fn ensure_modulus(p: &BigUint) -> Result<()> {
    if p.is_zero() {
        return Err(Error::invalid_input("modulus p must be positive"));
    }
    Ok(())
}

/// `base^exponent mod p` for any integer exponent. A negative exponent raises the
/// modular inverse of `base` to `|exponent|`.
fn signed_modpow(base: &BigUint, exponent: &BigInt, p: &BigUint) -> Result<BigUint> {
    ensure_modulus(p)?;
    if exponent.sign() == Sign::Minus {
        let inverse = base.modinv(p).ok_or_else(|| {
            Error::invalid_input(format!("{} has no inverse modulo {}", base, p))
        })?;
        return Ok(inverse.modpow(exponent.magnitude(), p));
    }
    Ok(base.modpow(exponent.magnitude(), p))
}

/// Compute a public value: `g^secret mod p`.
///
/// A negative `secret` uses the inverse of `g` modulo `p`.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if `p` is zero, or if `secret` is negative and `g`
/// has no inverse modulo `p`.
pub fn public_key(g: &BigUint, secret: &BigInt, p: &BigUint) -> Result<BigUint> {
    signed_modpow(g, secret, p)
}

/// Given the peer's public value, compute the shared secret:
///   `S = peer_public^secret mod p`.
///
/// For any `g`, `a`, `b` and positive `p`,
/// `shared_key(public_key(g, b, p), a, p) == shared_key(public_key(g, a, p), b, p)`.
///
/// # Warnings
/// - The peer's value is used as-is; `0`, `1` or `p - 1` are accepted and give trivial keys.
/// - The result is the bare residue, and the session feeds it straight into the shift cipher.
pub fn shared_key(peer_public: &BigUint, secret: &BigInt, p: &BigUint) -> Result<BigUint> {
    signed_modpow(peer_public, secret, p)
}

/// Pick a random secret exponent in `[1, p-1]`.
///
/// # Errors
/// Returns [`Error::InvalidInput`] if `p < 2`, where the range is empty.
pub fn generate_secret(params: &DomainParameters, config: &SecretGenConfig) -> Result<BigInt> {
    if params.p < BigUint::from(2u32) {
        return Err(Error::invalid_input(
            "modulus p must be at least 2 to draw a secret",
        ));
    }

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    Ok(BigInt::from(
        rng.gen_biguint_range(&BigUint::one(), &params.p),
    ))
}
