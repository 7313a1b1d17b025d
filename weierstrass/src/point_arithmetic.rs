//! Point arithmetic implementation optimised for different curve equations
//!
//! Support for formulas specialized to the short Weierstrass equation's
//! 𝒂-coefficient. All formulas operate on Jacobian coordinates in Montgomery
//! form; formula names refer to the [Explicit-Formulas Database].
//!
//! Unlike complete formulas these have exceptional cases (identity inputs,
//! `P == Q`, `P == -Q`), which are detected and dispatched explicitly.
//!
//! [Explicit-Formulas Database]: https://hyperelliptic.org/EFD/g1p/auto-shortw-jacobian.html

use crate::{ProjectivePoint, arithmetic::Curve};
use num_traits::Zero;

mod sealed {
    use crate::{ProjectivePoint, arithmetic::Curve};

    /// Elliptic point arithmetic implementation
    ///
    /// Provides implementation of point doubling which might be optimized
    /// for the curve.
    pub trait PointArithmetic {
        /// Returns `point + point`
        fn double(curve: &Curve, point: &ProjectivePoint) -> ProjectivePoint;
    }
}

/// Allow crate-local visibility
pub(crate) use sealed::PointArithmetic;

/// Which doubling formula a curve uses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EquationA {
    /// `a == p - 3`
    MinusThree,
    /// No special structure.
    Generic,
}

impl EquationA {
    pub(crate) fn double(self, curve: &Curve, point: &ProjectivePoint) -> ProjectivePoint {
        match self {
            EquationA::MinusThree => EquationAIsMinusThree::double(curve, point),
            EquationA::Generic => EquationAIsGeneric::double(curve, point),
        }
    }
}

/// The 𝒂-coefficient of the short Weierstrass equation is -3.
pub struct EquationAIsMinusThree {}

impl PointArithmetic for EquationAIsMinusThree {
    /// Implements doubling for curves with `a = -3`
    ///
    /// Implements the `dbl-2001-b` formula, which folds `3·X² + a·Z⁴` into
    /// `3·(X - Z²)·(X + Z²)`. The comments after each line indicate which
    /// algorithm steps are being performed.
    fn double(curve: &Curve, point: &ProjectivePoint) -> ProjectivePoint {
        if point.is_identity() || point.y.is_zero() {
            return curve.identity();
        }
        let f = curve.monty();

        let delta = f.square(&point.z); // 1
        let gamma = f.square(&point.y); // 2
        let beta = f.mul(&point.x, &gamma); // 3
        let t0 = f.sub(&point.x, &delta); // 4
        let t1 = f.add(&point.x, &delta); // 5
        let t0 = f.mul(&t0, &t1); // 6
        let alpha = f.mul_small(&t0, 3); // 7
        let t0 = f.square(&alpha); // 8
        let beta8 = f.mul_small(&beta, 8); // 9
        let x3 = f.sub(&t0, &beta8); // 10
        let t0 = f.add(&point.y, &point.z); // 11
        let t0 = f.square(&t0); // 12
        let t0 = f.sub(&t0, &gamma); // 13
        let z3 = f.sub(&t0, &delta); // 14
        let beta4 = f.mul_small(&beta, 4); // 15
        let t0 = f.sub(&beta4, &x3); // 16
        let t0 = f.mul(&alpha, &t0); // 17
        let t1 = f.square(&gamma); // 18
        let t1 = f.mul_small(&t1, 8); // 19
        let y3 = f.sub(&t0, &t1); // 20

        ProjectivePoint {
            x: x3,
            y: y3,
            z: z3,
        }
    }
}

/// The 𝒂-coefficient of the short Weierstrass equation does not have specific
/// properties which allow for an optimized implementation.
pub struct EquationAIsGeneric {}

impl PointArithmetic for EquationAIsGeneric {
    /// Implements doubling for curves with any `a`
    ///
    /// Implements the `dbl-2007-bl` formula. The comments after each line
    /// indicate which algorithm steps are being performed.
    fn double(curve: &Curve, point: &ProjectivePoint) -> ProjectivePoint {
        if point.is_identity() || point.y.is_zero() {
            return curve.identity();
        }
        let f = curve.monty();

        let xx = f.square(&point.x); // 1
        let yy = f.square(&point.y); // 2
        let yyyy = f.square(&yy); // 3
        let zz = f.square(&point.z); // 4
        let t0 = f.add(&point.x, &yy); // 5
        let t0 = f.square(&t0); // 6
        let t0 = f.sub(&t0, &xx); // 7
        let t0 = f.sub(&t0, &yyyy); // 8
        let s = f.double(&t0); // 9
        let t1 = f.square(&zz); // 10
        let t1 = f.mul(curve.a_monty(), &t1); // 11
        let m = f.mul_small(&xx, 3); // 12
        let m = f.add(&m, &t1); // 13
        let t0 = f.square(&m); // 14
        let t1 = f.double(&s); // 15
        let x3 = f.sub(&t0, &t1); // 16
        let t0 = f.sub(&s, &x3); // 17
        let t0 = f.mul(&m, &t0); // 18
        let t1 = f.mul_small(&yyyy, 8); // 19
        let y3 = f.sub(&t0, &t1); // 20
        let t0 = f.add(&point.y, &point.z); // 21
        let t0 = f.square(&t0); // 22
        let t0 = f.sub(&t0, &yy); // 23
        let z3 = f.sub(&t0, &zz); // 24

        ProjectivePoint {
            x: x3,
            y: y3,
            z: z3,
        }
    }
}

/// Returns `lhs + rhs`
///
/// Implements the `add-2007-bl` formula, which does not depend on `a`.
/// The comments after each line indicate which algorithm steps are being
/// performed.
pub(crate) fn add(curve: &Curve, lhs: &ProjectivePoint, rhs: &ProjectivePoint) -> ProjectivePoint {
    if lhs.is_identity() {
        return rhs.clone();
    }
    if rhs.is_identity() {
        return lhs.clone();
    }
    let f = curve.monty();

    let z1z1 = f.square(&lhs.z); // 1
    let z2z2 = f.square(&rhs.z); // 2
    let u1 = f.mul(&lhs.x, &z2z2); // 3
    let u2 = f.mul(&rhs.x, &z1z1); // 4
    let t0 = f.mul(&rhs.z, &z2z2); // 5
    let s1 = f.mul(&lhs.y, &t0); // 6
    let t0 = f.mul(&lhs.z, &z1z1); // 7
    let s2 = f.mul(&rhs.y, &t0); // 8
    let h = f.sub(&u2, &u1); // 9
    let t0 = f.sub(&s2, &s1); // 10
    if h.is_zero() {
        return if t0.is_zero() {
            curve.double(lhs)
        } else {
            curve.identity()
        };
    }
    let r = f.double(&t0); // 11
    let i = f.double(&h); // 12
    let i = f.square(&i); // 13
    let j = f.mul(&h, &i); // 14
    let v = f.mul(&u1, &i); // 15
    let t0 = f.square(&r); // 16
    let t0 = f.sub(&t0, &j); // 17
    let t1 = f.double(&v); // 18
    let x3 = f.sub(&t0, &t1); // 19
    let t0 = f.sub(&v, &x3); // 20
    let t0 = f.mul(&r, &t0); // 21
    let t1 = f.mul(&s1, &j); // 22
    let t1 = f.double(&t1); // 23
    let y3 = f.sub(&t0, &t1); // 24
    let t0 = f.add(&lhs.z, &rhs.z); // 25
    let t0 = f.square(&t0); // 26
    let t0 = f.sub(&t0, &z1z1); // 27
    let t0 = f.sub(&t0, &z2z2); // 28
    let z3 = f.mul(&t0, &h); // 29

    ProjectivePoint {
        x: x3,
        y: y3,
        z: z3,
    }
}

/// Returns `lhs + rhs` where `rhs` has `Z = 1`
///
/// Implements the `madd-2007-bl` formula. The comments after each line
/// indicate which algorithm steps are being performed.
pub(crate) fn add_mixed(
    curve: &Curve,
    lhs: &ProjectivePoint,
    rhs: &ProjectivePoint,
) -> ProjectivePoint {
    if lhs.is_identity() {
        return rhs.clone();
    }
    if rhs.is_identity() {
        return lhs.clone();
    }
    let f = curve.monty();

    let z1z1 = f.square(&lhs.z); // 1
    let u2 = f.mul(&rhs.x, &z1z1); // 2
    let t0 = f.mul(&lhs.z, &z1z1); // 3
    let s2 = f.mul(&rhs.y, &t0); // 4
    let h = f.sub(&u2, &lhs.x); // 5
    let t0 = f.sub(&s2, &lhs.y); // 6
    if h.is_zero() {
        return if t0.is_zero() {
            curve.double(lhs)
        } else {
            curve.identity()
        };
    }
    let hh = f.square(&h); // 7
    let i = f.mul_small(&hh, 4); // 8
    let j = f.mul(&h, &i); // 9
    let r = f.double(&t0); // 10
    let v = f.mul(&lhs.x, &i); // 11
    let t0 = f.square(&r); // 12
    let t0 = f.sub(&t0, &j); // 13
    let t1 = f.double(&v); // 14
    let x3 = f.sub(&t0, &t1); // 15
    let t0 = f.sub(&v, &x3); // 16
    let t0 = f.mul(&r, &t0); // 17
    let t1 = f.mul(&lhs.y, &j); // 18
    let t1 = f.double(&t1); // 19
    let y3 = f.sub(&t0, &t1); // 20
    let t0 = f.add(&lhs.z, &h); // 21
    let t0 = f.square(&t0); // 22
    let t0 = f.sub(&t0, &z1z1); // 23
    let z3 = f.sub(&t0, &hh); // 24

    ProjectivePoint {
        x: x3,
        y: y3,
        z: z3,
    }
}
