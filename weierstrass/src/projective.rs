//! Projective curve points.

use crate::uint;
use num_bigint::BigUint;
use num_traits::Zero;
use subtle::Choice;

/// Point on a Weierstrass curve in Jacobian coordinates.
///
/// `(X, Y, Z)` represents the affine point `(X/Z², Y/Z³)`. All three
/// coordinates are kept in Montgomery form for the owning [`Curve`]; the
/// identity is any triple with `X == Y == 0`.
///
/// Projective points are only meaningful together with the curve they were
/// produced by, so they are never compared or exported directly. Map them
/// through [`Curve::to_affine`] first.
///
/// [`Curve`]: crate::Curve
/// [`Curve::to_affine`]: crate::Curve::to_affine
#[derive(Clone, Debug)]
pub struct ProjectivePoint {
    pub(crate) x: BigUint,
    pub(crate) y: BigUint,
    pub(crate) z: BigUint,
}

impl ProjectivePoint {
    /// Identity with the given Montgomery-form `Z` (normally one).
    pub(crate) fn identity_with_z(z: BigUint) -> Self {
        Self {
            x: BigUint::zero(),
            y: BigUint::zero(),
            z,
        }
    }

    /// Is this point the point at infinity?
    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Returns `b` when `choice` is set and `a` otherwise, reading every limb
    /// of both points.
    pub(crate) fn conditional_select(a: &Self, b: &Self, choice: Choice, limbs: usize) -> Self {
        Self {
            x: uint::conditional_select(&a.x, &b.x, choice, limbs),
            y: uint::conditional_select(&a.y, &b.y, choice, limbs),
            z: uint::conditional_select(&a.z, &b.z, choice, limbs),
        }
    }

    /// Swaps `a` and `b` when `choice` is set.
    pub(crate) fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice, limbs: usize) {
        uint::conditional_swap(&mut a.x, &mut b.x, choice, limbs);
        uint::conditional_swap(&mut a.y, &mut b.y, choice, limbs);
        uint::conditional_swap(&mut a.z, &mut b.z, choice, limbs);
    }
}
