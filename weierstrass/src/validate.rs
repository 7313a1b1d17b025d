//! Key validation.

use crate::{
    AffinePoint, Error, Result, arithmetic::Curve, curve::CurveId, engine::Engine, key::Key,
    lookup_table::AccelerationCache,
};
use num_bigint::BigUint;
use num_traits::One;

/// Checks that `point` is a finite point with reduced coordinates on
/// `curve`.
pub(crate) fn check_point(curve: &Curve, point: &AffinePoint) -> Result<()> {
    if point.is_identity() {
        return Err(Error::PointAtInfinity);
    }
    if point.x >= *curve.prime() || point.y >= *curve.prime() {
        return Err(Error::OutOfRange);
    }
    if !curve.is_on_curve(point) {
        return Err(Error::NotOnCurve);
    }
    Ok(())
}

/// Checks that `point` lies in the subgroup of order `n`.
///
/// `n·Q = O` is tested as `(n - 1)·Q = -Q`, since the multiplication
/// reduces its scalar modulo `n`.
fn check_order(curve: &Curve, point: &AffinePoint) -> Result<()> {
    let n_minus_one = curve.order() - BigUint::one();
    let product = curve.to_affine(&curve.mul_vartime(&n_minus_one, point));
    if product != curve.negate(point) {
        return Err(Error::WrongOrder);
    }
    Ok(())
}

impl<A: AccelerationCache> Engine<A> {
    /// Validates a key.
    ///
    /// The public point, when present, must be a finite point with reduced
    /// coordinates on the curve and of order `n`. The private scalar, when
    /// present, must lie in `[1, n - 1]` and generate the public point.
    pub fn validate(&self, key: &Key) -> Result<()> {
        let curve = key.curve();

        if let Some(q) = key.public_key() {
            check_point(curve, q)?;
            check_order(curve, q)?;
        }

        if let Some(d) = key.secret_scalar() {
            if !curve.is_valid_scalar(d.expose()) {
                return Err(Error::InvalidScalar);
            }
            if let Some(q) = key.public_key() {
                let derived = curve.to_affine(&self.mul_secret(curve, curve.generator(), d));
                if derived != *q {
                    return Err(Error::PrivateKeyMismatch);
                }
            }
        }

        Ok(())
    }

    /// Whether `point` is a valid public point on the curve `id`.
    pub fn point_is_on_curve(&self, id: CurveId, point: &AffinePoint) -> Result<bool> {
        let curve = self.curve(id)?;
        Ok(check_point(&curve, point).is_ok())
    }
}
