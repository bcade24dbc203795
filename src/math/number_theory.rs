//! Elementary number theory used to vet Diffie-Hellman domain parameters.
//!
//! Both tests here are the textbook, brute-force versions:
//!
//! - [`is_prime`] trial-divides by every odd integer up to `floor(sqrt(n))`.
//! - [`is_primitive_root`] walks all `p - 1` powers of `g` and checks that they cover
//!   every nonzero residue modulo `p`.
//!
//! The primitive-root check costs `O(p)` modular multiplications. That is a deliberate
//! simplification for a teaching tool: it is only practical for small moduli, and it
//! makes no promises about composite `p` beyond what the set comparison yields.

use std::collections::HashSet;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Returns `true` if `n` is prime.
///
/// Negative numbers, `0` and `1` are not prime. Deterministic and side-effect free.
///
/// # Examples
///
/// ```
/// use dh_demo::math::number_theory::is_prime;
/// use num_bigint::BigInt;
///
/// assert!(is_prime(&BigInt::from(23)));
/// assert!(!is_prime(&BigInt::from(9)));
/// assert!(!is_prime(&BigInt::from(-7)));
/// ```
pub fn is_prime(n: &BigInt) -> bool {
    let two = BigInt::from(2u32);
    if *n < two {
        return false;
    }
    if *n == two {
        return true;
    }
    if n.is_even() {
        return false;
    }

    let limit = n.sqrt();
    let mut divisor = BigInt::from(3u32);
    while divisor <= limit {
        if (n % &divisor).is_zero() {
            return false;
        }
        divisor += 2u32;
    }
    true
}

/// Returns `true` if `g` generates the whole multiplicative group modulo `p`, i.e.
/// `{g^k mod p : k = 1..p-1}` equals `{1, ..., p-1}`.
///
/// `g >= p` is rejected outright. `g` is not checked against zero: `0` simply fails
/// the set comparison for any `p > 1`.
///
/// The powers are produced incrementally, and the walk stops as soon as the outcome
/// is decided (a zero residue, or a return to `1` before `p - 1` steps), which never
/// changes the answer of the full comparison.
pub fn is_primitive_root(g: &BigUint, p: &BigUint) -> bool {
    if g >= p {
        return false;
    }

    // g < p, so p >= 1 here.
    let order = p - 1u32;
    let mut residues = HashSet::new();
    let mut power = BigUint::one() % p;
    let mut k = BigUint::one();

    while &k < p {
        power = (&power * g) % p;
        if power.is_zero() {
            return false;
        }
        if power.is_one() && k < order {
            return false;
        }
        residues.insert(power.clone());
        k += 1u32;
    }

    BigUint::from(residues.len()) == order
}

/// All primitive roots modulo `p` in ascending order.
///
/// Runs [`is_primitive_root`] for every candidate in `1..p`, so it is quadratic in `p`.
pub fn primitive_roots(p: &BigUint) -> Vec<BigUint> {
    let mut roots = Vec::new();
    let mut g = BigUint::one();
    while &g < p {
        if is_primitive_root(&g, p) {
            roots.push(g.clone());
        }
        g += 1u32;
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMES_BELOW_100: [u32; 25] = [
        2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83,
        89, 97,
    ];

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_is_prime_matches_reference_table() {
        for n in 0..=100u32 {
            let expected = PRIMES_BELOW_100.contains(&n);
            assert_eq!(
                is_prime(&BigInt::from(n)),
                expected,
                "primality of {} is wrong",
                n
            );
        }
    }

    #[test]
    fn test_is_prime_edge_cases() {
        assert!(is_prime(&BigInt::from(2)));
        assert!(!is_prime(&BigInt::from(1)));
        assert!(!is_prime(&BigInt::from(0)));
        assert!(!is_prime(&BigInt::from(9)));
        assert!(!is_prime(&BigInt::from(-2)));
        assert!(!is_prime(&BigInt::from(-13)));
        // perfect square of a prime, divisor sits exactly at the sqrt bound
        assert!(!is_prime(&BigInt::from(49)));
        assert!(!is_prime(&BigInt::from(961)));
    }

    #[test]
    fn test_is_prime_larger_values() {
        assert!(is_prime(&BigInt::from(7919)));
        assert!(is_prime(&BigInt::from(1_000_003)));
        assert!(!is_prime(&BigInt::from(1_000_001)));
        assert!(is_prime(&BigInt::from(2_147_483_647u64)));
    }

    #[test]
    fn test_primitive_roots_of_seven() {
        assert!(!is_primitive_root(&big(2), &big(7)));
        assert!(is_primitive_root(&big(3), &big(7)));
        assert_eq!(primitive_roots(&big(7)), vec![big(3), big(5)]);
    }

    #[test]
    fn test_primitive_roots_of_twenty_three() {
        assert!(is_primitive_root(&big(5), &big(23)));
        assert_eq!(
            primitive_roots(&big(23)),
            [5u64, 7, 10, 11, 14, 15, 17, 19, 20, 21]
                .iter()
                .map(|&g| big(g))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_generator_not_below_modulus() {
        assert!(!is_primitive_root(&big(7), &big(7)));
        assert!(!is_primitive_root(&big(10), &big(7)));
        assert!(!is_primitive_root(&big(0), &big(0)));
    }

    #[test]
    fn test_zero_and_one_are_not_roots() {
        assert!(!is_primitive_root(&big(0), &big(7)));
        assert!(!is_primitive_root(&big(1), &big(7)));
        // the group mod 2 is {1}, which 1 generates
        assert!(is_primitive_root(&big(1), &big(2)));
    }

    #[test]
    fn test_primitive_root_count_matches_totient() {
        // a prime p has phi(p - 1) primitive roots
        let cases = [(11u64, 4usize), (13, 4), (17, 8), (19, 6), (31, 8)];
        for (p, count) in cases {
            assert_eq!(primitive_roots(&big(p)).len(), count, "p = {}", p);
        }
    }
}
