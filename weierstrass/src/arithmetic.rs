//! Per-curve arithmetic context.

use crate::{
    AffinePoint, Error, ProjectivePoint, Result,
    curve::{CurveId, CurveInfo, CurveSpec},
    monty::MontyParams,
    point_arithmetic::{self, EquationA},
};
use num_bigint::BigUint;
use num_traits::Zero;

/// A short Weierstrass curve `y² = x³ + a·x + b` with its group parameters,
/// ready for arithmetic.
///
/// Obtained from [`CurveCache::curve`](crate::CurveCache::curve) or
/// [`Engine::curve`](crate::Engine::curve) and shared behind an `Arc`.
#[derive(Debug)]
pub struct Curve {
    info: &'static CurveInfo,
    monty: MontyParams,
    a: BigUint,
    b: BigUint,
    a_monty: BigUint,
    equation_a: EquationA,
    order: BigUint,
    order_bits: usize,
    generator: AffinePoint,
}

impl Curve {
    /// Builds the arithmetic context from a fully loaded spec.
    pub(crate) fn from_spec(spec: &CurveSpec) -> Result<Self> {
        let prime = spec.prime().ok_or(Error::BadArgument)?;
        let a = spec.a().ok_or(Error::BadArgument)?.clone();
        let b = spec.b().ok_or(Error::BadArgument)?.clone();
        let order = spec.order().ok_or(Error::BadArgument)?.clone();
        let (gx, gy) = spec.generator().ok_or(Error::BadArgument)?;

        let monty = MontyParams::new(prime)?;
        let equation_a = if a == prime.clone() - 3u32 {
            EquationA::MinusThree
        } else {
            EquationA::Generic
        };

        let curve = Self {
            info: spec.info(),
            a_monty: monty.to_monty(&a),
            monty,
            a,
            b,
            equation_a,
            order_bits: order.bits() as usize,
            order,
            generator: AffinePoint::new(gx.clone(), gy.clone()),
        };

        if !curve.is_on_curve(&curve.generator) {
            return Err(Error::NotOnCurve);
        }
        Ok(curve)
    }

    /// Curve identifier.
    pub fn id(&self) -> CurveId {
        self.info.id
    }

    /// Registry entry.
    pub fn info(&self) -> &'static CurveInfo {
        self.info
    }

    /// Size of a field element in bytes.
    pub fn field_size(&self) -> usize {
        self.info.size
    }

    /// Prime modulus `p`.
    pub fn prime(&self) -> &BigUint {
        self.monty.modulus()
    }

    /// Coefficient `a`.
    pub fn a(&self) -> &BigUint {
        &self.a
    }

    /// Coefficient `b`.
    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Order `n` of the base point.
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Bit length of the group order.
    pub fn order_bits(&self) -> usize {
        self.order_bits
    }

    /// Bytes needed to hold a scalar modulo the group order.
    pub fn order_size(&self) -> usize {
        self.order_bits.div_ceil(8)
    }

    /// Cofactor `h`.
    pub fn cofactor(&self) -> u32 {
        self.info.cofactor
    }

    /// Base point `G`.
    pub fn generator(&self) -> &AffinePoint {
        &self.generator
    }

    /// Doubling formula selected for this curve.
    pub fn equation_a(&self) -> EquationA {
        self.equation_a
    }

    pub(crate) fn monty(&self) -> &MontyParams {
        &self.monty
    }

    pub(crate) fn a_monty(&self) -> &BigUint {
        &self.a_monty
    }

    /// The identity as a projective point.
    pub fn identity(&self) -> ProjectivePoint {
        ProjectivePoint::identity_with_z(self.monty.one())
    }

    /// Lifts an affine point into Jacobian coordinates with `Z = 1`.
    pub fn to_projective(&self, point: &AffinePoint) -> ProjectivePoint {
        if point.is_identity() {
            return self.identity();
        }
        ProjectivePoint {
            x: self.monty.to_monty(&point.x),
            y: self.monty.to_monty(&point.y),
            z: self.monty.one(),
        }
    }

    /// Maps a projective point back to affine form with one inversion.
    ///
    /// The identity maps to `(0, 0)`.
    pub fn to_affine(&self, point: &ProjectivePoint) -> AffinePoint {
        if point.is_identity() {
            return AffinePoint::identity();
        }
        let f = &self.monty;
        let zinv = match f.invert(&point.z) {
            Some(zinv) => zinv,
            None => return AffinePoint::identity(),
        };
        let zinv2 = f.square(&zinv);
        let zinv3 = f.mul(&zinv2, &zinv);
        AffinePoint {
            x: f.from_monty(&f.mul(&point.x, &zinv2)),
            y: f.from_monty(&f.mul(&point.y, &zinv3)),
        }
    }

    /// Rescales a projective point to `Z = 1`, staying in Montgomery form.
    pub fn normalize(&self, point: &ProjectivePoint) -> ProjectivePoint {
        self.to_projective(&self.to_affine(point))
    }

    /// Returns `point + point`.
    pub fn double(&self, point: &ProjectivePoint) -> ProjectivePoint {
        self.equation_a.double(self, point)
    }

    /// Returns `lhs + rhs`, dispatching to [`Curve::double`] when the inputs
    /// are the same point.
    pub fn add(&self, lhs: &ProjectivePoint, rhs: &ProjectivePoint) -> ProjectivePoint {
        if rhs.z == *self.monty.normalization() {
            point_arithmetic::add_mixed(self, lhs, rhs)
        } else {
            point_arithmetic::add(self, lhs, rhs)
        }
    }

    /// Returns `-point`.
    pub fn negate(&self, point: &AffinePoint) -> AffinePoint {
        if point.is_identity() {
            return point.clone();
        }
        AffinePoint {
            x: point.x.clone(),
            y: self.monty.neg(&point.y),
        }
    }

    pub(crate) fn negate_projective(&self, point: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint {
            x: point.x.clone(),
            y: self.monty.neg(&point.y),
            z: point.z.clone(),
        }
    }

    /// Whether two projective points represent the same affine point.
    pub fn points_equal(&self, lhs: &ProjectivePoint, rhs: &ProjectivePoint) -> bool {
        self.to_affine(lhs) == self.to_affine(rhs)
    }

    /// Evaluates `x³ + a·x + b mod p` on a canonical `x`.
    pub(crate) fn equation_rhs(&self, x: &BigUint) -> BigUint {
        let p = self.prime();
        let x = x % p;
        let x3 = x.modpow(&BigUint::from(3u32), p);
        (x3 + &self.a * &x + &self.b) % p
    }

    /// Whether `point` is a finite point with reduced coordinates satisfying
    /// the curve equation.
    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        let p = self.prime();
        if point.is_identity() || point.x >= *p || point.y >= *p {
            return false;
        }
        (&point.y * &point.y) % p == self.equation_rhs(&point.x)
    }

    /// Reduces a scalar modulo the group order when it is not already reduced.
    pub(crate) fn reduce_scalar(&self, k: &BigUint) -> BigUint {
        if *k >= self.order {
            k % &self.order
        } else {
            k.clone()
        }
    }

    /// Whether `k` lies in `[1, n - 1]`.
    pub(crate) fn is_valid_scalar(&self, k: &BigUint) -> bool {
        !k.is_zero() && *k < self.order
    }
}

#[cfg(test)]
mod tests {
    use crate::curve::{CURVES, CurveCache, CurveId};
    use crate::point_arithmetic::EquationA;

    #[test]
    fn generators_are_on_curve() {
        let cache = CurveCache::new();
        for info in CURVES.iter() {
            let curve = cache.curve(info.id).unwrap();
            assert!(curve.is_on_curve(curve.generator()), "{}", info.name);
            let g = curve.to_projective(curve.generator());
            assert_eq!(&curve.to_affine(&g), curve.generator());
        }
    }

    #[test]
    fn sizes_round_up_to_whole_units() {
        let cache = CurveCache::new();
        let p224 = cache.curve(CurveId::Secp224r1).unwrap();
        let p521 = cache.curve(CurveId::Secp521r1).unwrap();
        assert_eq!(p224.order_size(), 28);
        assert_eq!(p521.order_size(), 66);
        assert_eq!(p521.monty().limbs(), 17);
    }

    #[test]
    fn equation_a_selection() {
        let cache = CurveCache::new();
        let p256 = cache.curve(CurveId::Secp256r1).unwrap();
        let k256 = cache.curve(CurveId::Secp256k1).unwrap();
        assert_eq!(p256.equation_a(), EquationA::MinusThree);
        assert_eq!(k256.equation_a(), EquationA::Generic);
    }

    #[test]
    fn double_equals_add() {
        let cache = CurveCache::new();
        for info in CURVES.iter() {
            let curve = cache.curve(info.id).unwrap();
            let g = curve.to_projective(curve.generator());
            let g2 = curve.double(&g);
            let g3 = curve.add(&g2, &g);
            // non-normalised Z on both sides
            let g4a = curve.double(&g2);
            let g4b = curve.add(&g3, &g);
            let g4c = curve.add(&g2, &g2);
            assert!(curve.points_equal(&g4a, &g4b), "{}", info.name);
            assert!(curve.points_equal(&g4a, &g4c), "{}", info.name);
            assert!(curve.is_on_curve(&curve.to_affine(&g4a)));
        }
    }

    #[test]
    fn identity_handling() {
        let cache = CurveCache::new();
        let curve = cache.curve(CurveId::Secp224r1).unwrap();
        let g = curve.to_projective(curve.generator());
        let o = curve.identity();
        assert!(curve.double(&o).is_identity());
        assert!(curve.points_equal(&curve.add(&o, &g), &g));
        assert!(curve.points_equal(&curve.add(&g, &o), &g));

        let neg = curve.to_projective(&curve.negate(curve.generator()));
        assert!(curve.add(&g, &neg).is_identity());
        assert!(curve.to_affine(&o).is_identity());
    }
}
