//! Scalar multiplication.
//!
//! Three strategies are provided:
//!
//! - [`Curve::mul`]: Montgomery ladder with one doubling and one addition per
//!   bit and limb-wise conditional swaps. Used for every secret scalar.
//! - [`Curve::mul_vartime`]: width-4 sliding window. Its running time depends
//!   on the scalar, so it is only used with public scalars.
//! - [`Curve::dual_mul`]: Shamir's trick over two scalars, used by signature
//!   verification where both scalars are public.

use crate::{
    AffinePoint, ProjectivePoint,
    arithmetic::Curve,
    uint::{self, BitView},
};
use num_bigint::BigUint;
use subtle::Choice;

/// Window width of the sliding-window multiplication.
const WINSIZE: usize = 4;

impl Curve {
    /// Computes `k·point` with a constant-structure Montgomery ladder.
    ///
    /// The scalar is reduced modulo the group order and then padded with
    /// one or two multiples of the order so that its bit length is fixed at
    /// `order_bits + 1`. A zero scalar runs the full ladder and yields the
    /// identity.
    pub fn mul(&self, k: &BigUint, point: &AffinePoint) -> ProjectivePoint {
        let limbs = self.monty().limbs();
        let bits = self.order_bits();

        let mut k = self.reduce_scalar(k);
        let mut k1 = &k + self.order();
        let mut k2 = &k1 + self.order();
        let top = Choice::from(BitView::new(&k1, bits as u64 + 1).bit(bits));
        let scalar_limbs = uint::limbs_for_bits(bits as u64 + 1);
        let mut padded = uint::conditional_select(&k2, &k1, top, scalar_limbs);
        uint::wipe(&mut k);
        uint::wipe(&mut k1);
        uint::wipe(&mut k2);

        let view = BitView::new(&padded, bits as u64 + 1);
        uint::wipe(&mut padded);

        // top bit (position `bits`) is set: start from R0 = P, R1 = 2P
        let mut r0 = self.to_projective(point);
        let mut r1 = self.double(&r0);

        for i in (0..bits).rev() {
            let swap = Choice::from(view.bit(i));
            ProjectivePoint::conditional_swap(&mut r0, &mut r1, swap, limbs);
            r1 = self.add(&r0, &r1);
            r0 = self.double(&r0);
            ProjectivePoint::conditional_swap(&mut r0, &mut r1, swap, limbs);
        }

        uint::wipe(&mut r1.x);
        uint::wipe(&mut r1.y);
        uint::wipe(&mut r1.z);
        r0
    }

    /// Computes `k·G` for the curve's base point with [`Curve::mul`].
    pub fn mul_base(&self, k: &BigUint) -> ProjectivePoint {
        self.mul(k, self.generator())
    }

    /// Computes `k·point` with a width-4 sliding window.
    ///
    /// **Variable time**: only use with public scalars.
    pub fn mul_vartime(&self, k: &BigUint, point: &AffinePoint) -> ProjectivePoint {
        let k = self.reduce_scalar(k);
        let g = self.to_projective(point);

        // M[i] = (i + 8)·G
        let mut window = Vec::with_capacity(1 << (WINSIZE - 1));
        let mut acc = g.clone();
        for _ in 0..(WINSIZE - 1) {
            acc = self.double(&acc);
        }
        window.push(acc);
        for j in 1..(1 << (WINSIZE - 1)) {
            let next = self.add(&window[j - 1], &g);
            window.push(next);
        }

        let mut r = self.identity();
        let mut first = true;
        let mut in_window = false;
        let mut started = false;
        let mut bitbuf = 0usize;
        let mut bitcpy = 0usize;

        let bits = k.bits() as usize;
        let view = BitView::new(&k, bits as u64);
        for i in (0..bits).rev() {
            let bit = view.bit(i) as usize;

            if !started && bit == 0 {
                continue;
            }
            if !in_window && bit == 0 {
                r = self.double(&r);
                continue;
            }

            started = true;
            in_window = true;
            bitbuf |= bit << (WINSIZE - 1 - bitcpy);
            bitcpy += 1;

            if bitcpy == WINSIZE {
                if first {
                    r = window[bitbuf - (1 << (WINSIZE - 1))].clone();
                    first = false;
                } else {
                    for _ in 0..WINSIZE {
                        r = self.double(&r);
                    }
                    r = self.add(&r, &window[bitbuf - (1 << (WINSIZE - 1))]);
                }
                bitcpy = 0;
                bitbuf = 0;
                in_window = false;
            }
        }

        // flush a partial window one bit at a time
        if in_window {
            for _ in 0..bitcpy {
                if !first {
                    r = self.double(&r);
                }
                bitbuf <<= 1;
                if bitbuf & (1 << WINSIZE) != 0 {
                    if first {
                        r = g.clone();
                        first = false;
                    } else {
                        r = self.add(&r, &g);
                    }
                }
            }
        }

        r
    }

    /// Computes `ka·a + kb·b` with Shamir's trick.
    ///
    /// Both scalars are processed two bits at a time against a 16-entry
    /// table of `i·a + j·b` for `i, j < 4`, sharing two doublings per step.
    /// **Variable time**: only use with public scalars.
    pub fn dual_mul(
        &self,
        ka: &BigUint,
        a: &AffinePoint,
        kb: &BigUint,
        b: &AffinePoint,
    ) -> ProjectivePoint {
        let ka = self.reduce_scalar(ka);
        let kb = self.reduce_scalar(kb);

        let mut table: Vec<ProjectivePoint> = vec![self.identity(); 16];
        table[1] = self.to_projective(a);
        table[2] = self.double(&table[1]);
        table[3] = self.add(&table[2], &table[1]);
        table[4] = self.to_projective(b);
        table[8] = self.double(&table[4]);
        table[12] = self.add(&table[8], &table[4]);
        for x in 1..4 {
            for y in 1..4 {
                table[x + (y << 2)] = self.add(&table[x], &table[y << 2]);
            }
        }

        let len = self.order_size();
        let (bytes_a, bytes_b) = match (
            uint::to_be_bytes_padded(&ka, len),
            uint::to_be_bytes_padded(&kb, len),
        ) {
            (Ok(a), Ok(b)) => (a, b),
            // reduced scalars always fit
            _ => return self.identity(),
        };

        let mut r = self.identity();
        let mut first = true;
        for (mut ta, mut tb) in bytes_a.into_iter().zip(bytes_b) {
            for _ in 0..4 {
                let na = ((ta >> 6) & 3) as usize;
                let nb = ((tb >> 6) & 3) as usize;
                ta <<= 2;
                tb <<= 2;

                if first {
                    if na != 0 || nb != 0 {
                        r = table[na + (nb << 2)].clone();
                        first = false;
                    }
                    continue;
                }

                r = self.double(&r);
                r = self.double(&r);
                if na != 0 || nb != 0 {
                    r = self.add(&r, &table[na + (nb << 2)]);
                }
            }
        }

        r
    }
}

#[cfg(test)]
mod tests {
    use crate::curve::{CURVES, CurveCache, CurveId};
    use num_bigint::BigUint;
    use num_traits::{One, Zero};

    #[test]
    fn strategies_agree() {
        let cache = CurveCache::new();
        for info in CURVES.iter() {
            let curve = cache.curve(info.id).unwrap();
            let g = curve.generator();
            for k in [1u64, 2, 3, 7, 8, 15, 16, 17, 255, 0xdead_beef_cafe] {
                let k = BigUint::from(k);
                let ladder = curve.to_affine(&curve.mul(&k, g));
                let window = curve.to_affine(&curve.mul_vartime(&k, g));
                assert_eq!(ladder, window, "{} k={}", info.name, k);
            }
        }
    }

    #[test]
    fn small_multiples() {
        let cache = CurveCache::new();
        let curve = cache.curve(CurveId::Secp256r1).unwrap();
        let g = curve.to_projective(curve.generator());
        let g2 = curve.double(&g);
        let g3 = curve.add(&g2, &g);
        assert!(curve.points_equal(&curve.mul_base(&BigUint::from(3u32)), &g3));
        assert!(curve.points_equal(&curve.mul_base(&BigUint::one()), &g));
    }

    #[test]
    fn zero_and_order_give_identity() {
        let cache = CurveCache::new();
        for id in [CurveId::Secp256r1, CurveId::Secp256k1, CurveId::Secp521r1] {
            let curve = cache.curve(id).unwrap();
            let g = curve.generator();
            assert!(curve.mul(&BigUint::zero(), g).is_identity());
            assert!(curve.mul(curve.order(), g).is_identity());
            assert!(curve.mul_vartime(&BigUint::zero(), g).is_identity());
            assert!(curve.mul_vartime(curve.order(), g).is_identity());
        }
    }

    #[test]
    fn scalar_is_reduced() {
        let cache = CurveCache::new();
        let curve = cache.curve(CurveId::Secp384r1).unwrap();
        let k = BigUint::from(12345u32);
        let big = curve.order() * 3u32 + &k;
        assert!(curve.points_equal(&curve.mul_base(&k), &curve.mul_base(&big)));
    }

    #[test]
    fn order_minus_one_is_negation() {
        let cache = CurveCache::new();
        let curve = cache.curve(CurveId::Secp224r1).unwrap();
        let k = curve.order().clone() - 1u32;
        let p = curve.to_affine(&curve.mul_base(&k));
        assert_eq!(p, curve.negate(curve.generator()));
    }

    #[test]
    fn dual_mul_matches_separate() {
        let cache = CurveCache::new();
        for id in [CurveId::Secp192r1, CurveId::BrainpoolP256r1] {
            let curve = cache.curve(id).unwrap();
            let g = curve.generator();
            let q = curve.to_affine(&curve.mul_base(&BigUint::from(0x1234_5678u32)));
            let ka = BigUint::from(0xfeed_u32) << 100u32;
            let kb = BigUint::from(0xbeef_u32) << 37u32;

            let expected = curve.add(&curve.mul_vartime(&ka, g), &curve.mul_vartime(&kb, &q));
            let actual = curve.dual_mul(&ka, g, &kb, &q);
            assert!(curve.points_equal(&expected, &actual));

            assert!(curve.dual_mul(&BigUint::zero(), g, &BigUint::zero(), &q).is_identity());
        }
    }
}
