//! Fixed-width helpers over the `num-bigint` backend.
//!
//! `BigUint` normalises away leading zero limbs, so anything that has to run
//! with a data-independent structure (conditional swaps, table scans, bit
//! walks over secret scalars) goes through a padded limb view instead.

use crate::{Error, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

/// Decodes a big-endian byte string.
pub(crate) fn from_be_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Writes `value` big-endian into `out`, left-padded with zeros.
pub(crate) fn write_be_padded(value: &BigUint, out: &mut [u8]) -> Result<()> {
    out.fill(0);
    if value.is_zero() {
        return Ok(());
    }

    let mut bytes = value.to_bytes_be();
    if bytes.len() > out.len() {
        bytes.zeroize();
        return Err(Error::OutOfRange);
    }

    let offset = out.len() - bytes.len();
    out[offset..].copy_from_slice(&bytes);
    bytes.zeroize();
    Ok(())
}

/// Encodes `value` big-endian, left-padded with zeros to `len` bytes.
pub(crate) fn to_be_bytes_padded(value: &BigUint, len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; len];
    write_be_padded(value, &mut out)?;
    Ok(out)
}

/// Number of 32-bit limbs needed to hold `bits` bits.
pub(crate) fn limbs_for_bits(bits: u64) -> usize {
    bits.div_ceil(32) as usize
}

/// Little-endian limbs of `value`, zero-extended to exactly `len` limbs.
pub(crate) fn to_limbs(value: &BigUint, len: usize) -> Vec<u32> {
    let mut limbs = value.to_u32_digits();
    limbs.resize(len.max(limbs.len()), 0);
    limbs
}

/// Overwrites the limbs of `value` with zeros in place.
pub(crate) fn wipe(value: &mut BigUint) {
    let zeros = vec![0u32; limbs_for_bits(value.bits())];
    value.assign_from_slice(&zeros);
}

/// Returns `b` when `choice` is set and `a` otherwise, touching every limb.
pub(crate) fn conditional_select(a: &BigUint, b: &BigUint, choice: Choice, len: usize) -> BigUint {
    let mut la = to_limbs(a, len);
    let mut lb = to_limbs(b, len);
    let out: Vec<u32> = la
        .iter()
        .zip(lb.iter())
        .map(|(x, y)| u32::conditional_select(x, y, choice))
        .collect();
    la.zeroize();
    lb.zeroize();
    BigUint::new(out)
}

/// Swaps `a` and `b` when `choice` is set, touching every limb.
pub(crate) fn conditional_swap(a: &mut BigUint, b: &mut BigUint, choice: Choice, len: usize) {
    let mut la = to_limbs(a, len);
    let mut lb = to_limbs(b, len);
    for (x, y) in la.iter_mut().zip(lb.iter_mut()) {
        u32::conditional_swap(x, y, choice);
    }
    *a = BigUint::new(la.clone());
    *b = BigUint::new(lb.clone());
    la.zeroize();
    lb.zeroize();
}

/// Bit-addressable view of a scalar with a fixed limb count.
pub(crate) struct BitView {
    limbs: Vec<u32>,
}

impl BitView {
    pub(crate) fn new(value: &BigUint, bits: u64) -> Self {
        Self {
            limbs: to_limbs(value, limbs_for_bits(bits)),
        }
    }

    /// Bit `i` as `0` or `1`; positions past the end read as zero.
    pub(crate) fn bit(&self, i: usize) -> u8 {
        self.limbs
            .get(i / 32)
            .map_or(0, |limb| ((limb >> (i % 32)) & 1) as u8)
    }
}

impl Drop for BitView {
    fn drop(&mut self) {
        self.limbs.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn padded_encoding() {
        let v = BigUint::from(0x0102u32);
        assert_eq!(to_be_bytes_padded(&v, 4).unwrap(), [0, 0, 1, 2]);
        assert_eq!(to_be_bytes_padded(&BigUint::zero(), 3).unwrap(), [0, 0, 0]);
        assert_eq!(to_be_bytes_padded(&v, 1), Err(Error::OutOfRange));
    }

    #[test]
    fn select_and_swap() {
        let a = BigUint::from(7u32);
        let b = BigUint::from(u64::MAX);
        assert_eq!(conditional_select(&a, &b, Choice::from(0), 2), a);
        assert_eq!(conditional_select(&a, &b, Choice::from(1), 2), b);

        let (mut x, mut y) = (a.clone(), b.clone());
        conditional_swap(&mut x, &mut y, Choice::from(1), 2);
        assert_eq!((x.clone(), y.clone()), (b.clone(), a.clone()));
        conditional_swap(&mut x, &mut y, Choice::from(0), 2);
        assert_eq!((x, y), (b, a));
    }

    #[test]
    fn limb_counts_round_up() {
        assert_eq!(limbs_for_bits(0), 0);
        assert_eq!(limbs_for_bits(1), 1);
        assert_eq!(limbs_for_bits(32), 1);
        assert_eq!(limbs_for_bits(33), 2);
        assert_eq!(limbs_for_bits(521), 17);
    }

    #[test]
    fn bit_view() {
        let v = BigUint::from(0b1011u32) << 40u32;
        let view = BitView::new(&v, 64);
        assert_eq!(view.bit(40), 1);
        assert_eq!(view.bit(41), 1);
        assert_eq!(view.bit(42), 0);
        assert_eq!(view.bit(43), 1);
        assert_eq!(view.bit(500), 0);
    }

    #[test]
    fn wipe_zeroes_value() {
        let mut v = BigUint::from(u64::MAX);
        wipe(&mut v);
        assert!(v.is_zero());
    }
}
