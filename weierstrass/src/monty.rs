//! Montgomery-form modular arithmetic for runtime moduli.
//!
//! Elements are stored as `a·R mod p` with `R = 2^(32·limbs)`, where `limbs`
//! is the number of 32-bit words needed to hold the modulus. Products are
//! reduced with REDC.

use crate::{Error, Result};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Precomputed reduction parameters for an odd modulus.
#[derive(Clone, Debug)]
pub struct MontyParams {
    modulus: BigUint,
    limbs: usize,
    shift: usize,
    /// `R - 1`
    mask: BigUint,
    /// `-p^-1 mod R`
    n_prime: BigUint,
    /// `R mod p`, the Montgomery form of one.
    one: BigUint,
    /// `R^2 mod p`
    r2: BigUint,
}

impl MontyParams {
    /// Computes the reduction constants for `modulus`.
    ///
    /// Fails with [`Error::BadArgument`] when the modulus is even or below 3.
    pub fn new(modulus: &BigUint) -> Result<Self> {
        if modulus.is_even() || *modulus < BigUint::from(3u32) {
            return Err(Error::BadArgument);
        }

        let limbs = modulus.bits().div_ceil(32) as usize;
        let shift = 32 * limbs;
        let r = BigUint::one() << shift;
        let mask = r.clone() - 1u32;

        let inv = inverse_mod_pow2(modulus, shift, &mask);
        let n_prime = (r.clone() - inv) & &mask;
        let one = &r % modulus;
        let r2 = (&one * &one) % modulus;

        Ok(Self {
            modulus: modulus.clone(),
            limbs,
            shift,
            mask,
            n_prime,
            one,
            r2,
        })
    }

    /// The modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Limb count of the modulus.
    pub fn limbs(&self) -> usize {
        self.limbs
    }

    /// `R mod p`, the normalisation constant used when entering Montgomery form.
    pub fn normalization(&self) -> &BigUint {
        &self.one
    }

    /// Montgomery form of one.
    pub fn one(&self) -> BigUint {
        self.one.clone()
    }

    /// REDC: returns `t·R^-1 mod p` for `t < p·R`.
    pub fn reduce(&self, t: &BigUint) -> BigUint {
        let m = ((t & &self.mask) * &self.n_prime) & &self.mask;
        let u = (t + m * &self.modulus) >> self.shift;
        if u >= self.modulus {
            u - &self.modulus
        } else {
            u
        }
    }

    /// Maps a canonical residue into Montgomery form.
    pub fn to_monty(&self, a: &BigUint) -> BigUint {
        self.reduce(&((a % &self.modulus) * &self.r2))
    }

    /// Maps a Montgomery-form element back to its canonical residue.
    pub fn from_monty(&self, a: &BigUint) -> BigUint {
        self.reduce(a)
    }

    /// Montgomery product.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        self.reduce(&(a * b))
    }

    /// Montgomery square.
    pub fn square(&self, a: &BigUint) -> BigUint {
        self.reduce(&(a * a))
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let sum = a + b;
        if sum >= self.modulus {
            sum - &self.modulus
        } else {
            sum
        }
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if a >= b {
            a - b
        } else {
            (a + &self.modulus) - b
        }
    }

    pub fn double(&self, a: &BigUint) -> BigUint {
        self.add(a, a)
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        if a.is_zero() {
            BigUint::zero()
        } else {
            &self.modulus - a
        }
    }

    /// Multiplies by a small constant.
    pub fn mul_small(&self, a: &BigUint, k: u32) -> BigUint {
        (a * k) % &self.modulus
    }

    /// Raises a Montgomery-form element to a canonical exponent.
    pub fn pow(&self, a: &BigUint, exp: &BigUint) -> BigUint {
        let base = self.from_monty(a);
        self.to_monty(&base.modpow(exp, &self.modulus))
    }

    /// Inverse of a Montgomery-form element via Fermat's little theorem.
    ///
    /// Returns `None` for zero. The modulus must be prime.
    pub fn invert(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return None;
        }
        let exp = self.modulus.clone() - 2u32;
        Some(self.pow(a, &exp))
    }
}

/// Newton iteration for `p^-1 mod 2^bits`, doubling the number of correct
/// low bits each round.
fn inverse_mod_pow2(p: &BigUint, bits: usize, mask: &BigUint) -> BigUint {
    let two_r = (BigUint::one() << bits) + 2u32;
    let mut x = BigUint::one();
    let mut correct = 1;
    while correct < bits {
        let px = (p * &x) & mask;
        let t = (two_r.clone() - px) & mask;
        x = (x * t) & mask;
        correct *= 2;
    }
    x
}

/// Canonical inverse modulo a prime `n` via Fermat's little theorem.
pub(crate) fn invert_mod_prime(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    let a = a % n;
    if a.is_zero() {
        return None;
    }
    Some(a.modpow(&(n.clone() - 2u32), n))
}
