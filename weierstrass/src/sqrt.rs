//! Modular square root implementations, adapted from <https://eprint.iacr.org/2012/685.pdf>.
//!
//! These operate on canonical residues and run in variable time; they are
//! only used to decompress public points.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Square root algorithms.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Algorithm {
    /// Atkins algorithm for `q ≡ 5 (mod 8)`.
    Atkins,

    /// Shanks algorithm for `q ≡ 3 (mod 4)`.
    Shanks,

    /// Tonelli-Shanks algorithm for any odd prime.
    #[default]
    TonelliShanks,
}

impl Algorithm {
    /// Determine the best algorithm to use with a particular modulus.
    pub(crate) fn for_modulus(p: &BigUint) -> Self {
        if mod_residue(p, 4) == 3 {
            Self::Shanks
        } else if mod_residue(p, 8) == 5 {
            Self::Atkins
        } else {
            Self::TonelliShanks
        }
    }
}

/// Returns a square root of `a` mod `p`, or `None` if `a` is a non-residue.
pub(crate) fn sqrt(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.is_zero() {
        return Some(a);
    }
    let root = match Algorithm::for_modulus(p) {
        Algorithm::Atkins => sqrt_atkins(&a, p),
        Algorithm::Shanks => sqrt_shanks(&a, p),
        Algorithm::TonelliShanks => sqrt_tonelli_shanks(&a, p),
    }?;
    ((&root * &root) % p == a).then_some(root)
}

/// Atkins algorithm for `q ≡ 5 (mod 8)`.
///
/// From <https://eprint.iacr.org/2012/685.pdf> (page 10, algorithm 3)
fn sqrt_atkins(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let exp = (p.clone() - 5u32) >> 3u32;
    let t = BigUint::from(2u32).modpow(&exp, p);
    let a1 = a.modpow(&exp, p);
    let a0 = (&a1 * &a1 % p) * a % p;
    let a0 = &a0 * &a0 % p;
    if a0 == p.clone() - 1u32 {
        return None;
    }
    let b = t * a1 % p;
    let ab = a * &b % p;
    let i = (ab.clone() * 2u32) * &b % p;
    let i_minus_one = (i + p - 1u32) % p;
    Some(ab * i_minus_one % p)
}

/// Shanks algorithm for `q ≡ 3 (mod 4)`.
///
/// For `q = 3 (mod 4)`, sqrt can be computed with only one exponentiation as
/// `self^((q + 1) / 4) (mod q)`.
fn sqrt_shanks(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let exp = (p.clone() + 1u32) >> 2u32;
    Some(a.modpow(&exp, p))
}

/// Tonelli-Shanks algorithm works for every odd prime.
fn sqrt_tonelli_shanks(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let one = BigUint::one();
    let p_minus_one = p.clone() - 1u32;
    let legendre_exp = p_minus_one.clone() >> 1u32;
    if a.modpow(&legendre_exp, p) != one {
        return None;
    }

    // p - 1 = q·2^s with q odd
    let mut q = p_minus_one.clone();
    let mut s = 0u32;
    while q.is_even() {
        q >>= 1u32;
        s += 1;
    }

    let mut z = BigUint::from(2u32);
    while z.modpow(&legendre_exp, p) != p_minus_one {
        z += 1u32;
    }

    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = a.modpow(&q, p);
    let mut r = a.modpow(&((q + 1u32) >> 1u32), p);

    while t != one {
        let mut i = 0u32;
        let mut t2 = t.clone();
        while t2 != one {
            t2 = &t2 * &t2 % p;
            i += 1;
            if i == m {
                return None;
            }
        }

        let mut b = c;
        for _ in 0..(m - i - 1) {
            b = &b * &b % p;
        }
        m = i;
        c = &b * &b % p;
        t = t * &c % p;
        r = r * b % p;
    }
    Some(r)
}

/// Compute residue classes of the modulus for selecting particular square root algorithms.
fn mod_residue(p: &BigUint, n: u32) -> u32 {
    (p % BigUint::from(n))
        .to_u32_digits()
        .first()
        .copied()
        .unwrap_or(0)
}
