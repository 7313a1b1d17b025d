//! Affine curve points.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

/// Point on a Weierstrass curve in affine coordinates.
///
/// Coordinates are canonical residues modulo `p` (never in Montgomery form).
/// This is the only representation that is compared or exported; the
/// identity is encoded as `(0, 0)`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AffinePoint {
    /// x-coordinate
    pub(crate) x: BigUint,

    /// y-coordinate
    pub(crate) y: BigUint,
}

impl AffinePoint {
    /// Creates a point from canonical coordinates without any validation.
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Self { x, y }
    }

    /// Additive identity of the group a.k.a. the point at infinity.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Is this point the point at infinity?
    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// x-coordinate
    pub fn x(&self) -> &BigUint {
        &self.x
    }

    /// y-coordinate
    pub fn y(&self) -> &BigUint {
        &self.y
    }

    /// Parity of the y-coordinate, as used by compressed SEC1 tags.
    pub fn y_is_odd(&self) -> bool {
        self.y.is_odd()
    }
}

impl From<(BigUint, BigUint)> for AffinePoint {
    fn from((x, y): (BigUint, BigUint)) -> Self {
        Self { x, y }
    }
}
