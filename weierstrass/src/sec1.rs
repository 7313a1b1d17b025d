//! SEC1 / X9.63 point encoding and raw scalar encoding.
//!
//! Points are encoded as `0x04 ∥ X ∥ Y` (uncompressed) or `0x02|0x03 ∥ X`
//! (compressed, the tag carrying the parity of `Y`), with every coordinate
//! left-padded to the field size. The identity has no encoding.

use crate::{
    AffinePoint, Error, Result, SecretScalar, arithmetic::Curve, curve::CurveId, sqrt, uint,
};
use num_bigint::BigUint;
use zeroize::Zeroizing;

/// Tag of a compressed point with even `y`.
pub const TAG_COMPRESSED_EVEN_Y: u8 = 0x02;
/// Tag of a compressed point with odd `y`.
pub const TAG_COMPRESSED_ODD_Y: u8 = 0x03;
/// Tag of an uncompressed point.
pub const TAG_UNCOMPRESSED: u8 = 0x04;

/// Length of an encoded point on `curve`.
pub fn encoded_len(curve: &Curve, compressed: bool) -> usize {
    if compressed {
        1 + curve.field_size()
    } else {
        1 + 2 * curve.field_size()
    }
}

/// Encodes `point` into `out`, returning the number of bytes written.
///
/// Fails with [`Error::BufferTooSmall`] carrying the required length when
/// `out` is too short.
pub fn encode_point_into(
    curve: &Curve,
    point: &AffinePoint,
    compressed: bool,
    out: &mut [u8],
) -> Result<usize> {
    if point.is_identity() {
        return Err(Error::PointAtInfinity);
    }
    let len = encoded_len(curve, compressed);
    let out = out
        .get_mut(..len)
        .ok_or(Error::BufferTooSmall { required: len })?;

    let size = curve.field_size();
    if compressed {
        out[0] = if point.y_is_odd() {
            TAG_COMPRESSED_ODD_Y
        } else {
            TAG_COMPRESSED_EVEN_Y
        };
        uint::write_be_padded(&point.x, &mut out[1..])?;
    } else {
        out[0] = TAG_UNCOMPRESSED;
        uint::write_be_padded(&point.x, &mut out[1..1 + size])?;
        uint::write_be_padded(&point.y, &mut out[1 + size..])?;
    }
    Ok(len)
}

/// Encodes `point` into a new buffer.
pub fn encode_point(curve: &Curve, point: &AffinePoint, compressed: bool) -> Result<Vec<u8>> {
    let mut out = vec![0u8; encoded_len(curve, compressed)];
    encode_point_into(curve, point, compressed, &mut out)?;
    Ok(out)
}

/// Decodes a compressed or uncompressed point and checks that it lies on
/// the curve.
pub fn decode_point(curve: &Curve, bytes: &[u8]) -> Result<AffinePoint> {
    let size = curve.field_size();
    let (&tag, body) = bytes.split_first().ok_or(Error::BadArgument)?;

    match (tag, body.len()) {
        (TAG_COMPRESSED_EVEN_Y | TAG_COMPRESSED_ODD_Y, n) if n == size => {
            let x = uint::from_be_bytes(body);
            decompress(curve, &x, tag == TAG_COMPRESSED_ODD_Y)
        }
        (TAG_UNCOMPRESSED, n) if n == 2 * size => {
            let point = AffinePoint::new(
                uint::from_be_bytes(&body[..size]),
                uint::from_be_bytes(&body[size..]),
            );
            if point.x >= *curve.prime() || point.y >= *curve.prime() {
                return Err(Error::OutOfRange);
            }
            if !curve.is_on_curve(&point) {
                return Err(Error::NotOnCurve);
            }
            Ok(point)
        }
        _ => Err(Error::BadArgument),
    }
}

/// Recovers the point with x-coordinate `x` and the requested `y` parity.
pub fn decompress(curve: &Curve, x: &BigUint, y_is_odd: bool) -> Result<AffinePoint> {
    let p = curve.prime();
    if x >= p {
        return Err(Error::OutOfRange);
    }

    let rhs = curve.equation_rhs(x);
    let y = sqrt::sqrt(&rhs, p).ok_or(Error::NotOnCurve)?;
    let point = AffinePoint::new(x.clone(), y);
    let point = if point.y_is_odd() == y_is_odd {
        point
    } else {
        curve.negate(&point)
    };

    if point.y_is_odd() != y_is_odd {
        // y == 0 has no odd root
        return Err(Error::NotOnCurve);
    }
    Ok(point)
}

/// Curve implied by the length of an X9.63 encoding.
pub fn curve_for_encoding(bytes: &[u8]) -> Result<CurveId> {
    match bytes.first() {
        Some(&TAG_UNCOMPRESSED) if bytes.len() % 2 == 1 => CurveId::for_size((bytes.len() - 1) / 2),
        Some(&(TAG_COMPRESSED_EVEN_Y | TAG_COMPRESSED_ODD_Y)) => CurveId::for_size(bytes.len() - 1),
        _ => Err(Error::BadArgument),
    }
}

/// Encodes a private scalar as a field-size big-endian string.
pub fn encode_scalar(curve: &Curve, scalar: &SecretScalar) -> Result<Zeroizing<Vec<u8>>> {
    scalar.to_be_bytes(curve.field_size())
}

/// Decodes a field-size big-endian private scalar, requiring it to lie in
/// `[1, n - 1]`.
pub fn decode_scalar(curve: &Curve, bytes: &[u8]) -> Result<SecretScalar> {
    if bytes.is_empty() || bytes.len() > curve.field_size() {
        return Err(Error::BadArgument);
    }
    let scalar = SecretScalar::from_be_bytes(bytes);
    if !curve.is_valid_scalar(scalar.expose()) {
        return Err(Error::InvalidScalar);
    }
    Ok(scalar)
}
