//! The engine: curve cache, acceleration cache and configuration, plus key
//! generation and import.

use crate::{
    AffinePoint, Error, ProjectivePoint, Result, SecretScalar,
    arithmetic::Curve,
    curve::{CurveCache, CurveId},
    key::{Key, KeyFlags},
    lookup_table::AccelerationCache,
    sec1, uint,
};
use core::task::Poll;
use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::CryptoRngCore;
use std::sync::Arc;
use zeroize::Zeroizing;

#[cfg(feature = "fixed-point-cache")]
use crate::lookup_table::FixedPointCache;
#[cfg(not(feature = "fixed-point-cache"))]
use crate::lookup_table::NoCache;

/// Acceleration cache used by [`Engine::new`].
#[cfg(feature = "fixed-point-cache")]
pub type DefaultCache = FixedPointCache;

/// Acceleration cache used by [`Engine::new`].
#[cfg(not(feature = "fixed-point-cache"))]
pub type DefaultCache = NoCache;

/// Extra random bytes drawn when generating a scalar, so that reducing
/// modulo the group order leaves a negligible bias.
const OVERSAMPLE_BYTES: usize = 8;

/// Runtime configuration of an [`Engine`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Capacity of the fixed-point cache.
    pub fixed_point_entries: usize,

    /// Comb width `L` of fixed-point tables (`2^L` points per table).
    pub fixed_point_window: usize,

    /// Attempts at drawing a usable nonce or private scalar before giving up.
    pub sign_retries: u32,

    /// Whether new keys multiply by the cofactor during ECDH.
    pub cofactor_ecdh: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_point_entries: 15,
            fixed_point_window: 4,
            sign_retries: 64,
            cofactor_ecdh: false,
        }
    }
}

impl EngineConfig {
    /// Checks that every setting is within its supported range.
    pub fn validate(&self) -> Result<()> {
        if self.fixed_point_entries == 0
            || !(2..=8).contains(&self.fixed_point_window)
            || self.sign_retries == 0
        {
            return Err(Error::BadArgument);
        }
        Ok(())
    }

    pub(crate) fn key_flags(&self) -> KeyFlags {
        if self.cofactor_ecdh {
            KeyFlags::COFACTOR
        } else {
            KeyFlags::NONE
        }
    }
}

/// Elliptic curve engine.
///
/// Owns the curve parameter cache and the acceleration cache used for
/// secret-scalar multiplications. Both are explicit objects rather than
/// process-wide state, so their lifetime ends with the engine.
#[derive(Debug)]
pub struct Engine<A: AccelerationCache = DefaultCache> {
    curves: CurveCache,
    cache: A,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the default configuration and cache.
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            curves: CurveCache::new(),
            cache: DefaultCache::with_config(&config),
            config,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AccelerationCache> Engine<A> {
    /// Creates an engine whose cache is built from `config`.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            curves: CurveCache::new(),
            cache: A::with_config(&config),
            config,
        })
    }

    /// Creates an engine around an existing acceleration cache.
    pub fn with_cache(config: EngineConfig, cache: A) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            curves: CurveCache::new(),
            cache,
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Curve parameter cache.
    pub fn curves(&self) -> &CurveCache {
        &self.curves
    }

    /// Acceleration cache.
    pub fn acceleration_cache(&self) -> &A {
        &self.cache
    }

    /// Arithmetic context for `id`.
    pub fn curve(&self, id: CurveId) -> Result<Arc<Curve>> {
        self.curves.curve(id)
    }

    /// Frees every cached table and curve.
    pub fn shutdown(&self) {
        self.cache.invalidate_all();
        self.curves.clear();
    }

    /// `k·base` for a secret `k`, through the acceleration cache.
    pub(crate) fn mul_secret(
        &self,
        curve: &Curve,
        base: &AffinePoint,
        k: &SecretScalar,
    ) -> ProjectivePoint {
        self.cache.mul(curve, base, k.expose())
    }

    /// Draws a scalar in `[1, n - 1]`, or `None` when the draw reduces to zero.
    pub(crate) fn random_scalar(
        &self,
        curve: &Curve,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Option<SecretScalar>> {
        let mut buf = Zeroizing::new(vec![0u8; curve.order_size() + OVERSAMPLE_BYTES]);
        rng.try_fill_bytes(&mut buf)?;
        let mut wide = uint::from_be_bytes(&buf);
        let k = SecretScalar::new(&wide % curve.order());
        uint::wipe(&mut wide);
        Ok((!k.expose().is_zero()).then_some(k))
    }

    /// Generates a key pair on `id`.
    ///
    /// Draws reducing to zero are retried up to
    /// [`EngineConfig::sign_retries`] times before failing with
    /// [`Error::InvalidScalar`].
    pub fn generate_key(&self, id: CurveId, rng: &mut impl CryptoRngCore) -> Result<Key> {
        let curve = self.curve(id)?;
        for _ in 0..self.config.sign_retries {
            if let Some(secret) = self.random_scalar(&curve, rng)? {
                let public = curve.to_affine(&self.mul_secret(&curve, curve.generator(), &secret));
                return Key::new(curve, Some(secret), Some(public), self.config.key_flags());
            }
        }
        tracing::debug!(curve = %id, "private scalar draws exhausted");
        Err(Error::InvalidScalar)
    }

    /// Recomputes the public point of a key from its private scalar and
    /// stores it on the key.
    pub fn derive_public(&self, key: &mut Key) -> Result<AffinePoint> {
        let curve = key.curve().clone();
        let secret = key.secret_scalar().ok_or(Error::BadArgument)?;
        if !curve.is_valid_scalar(secret.expose()) {
            return Err(Error::InvalidScalar);
        }
        let public = curve.to_affine(&self.mul_secret(&curve, curve.generator(), secret));
        if public.is_identity() {
            return Err(Error::PointAtInfinity);
        }
        key.set_public(public.clone());
        Ok(public)
    }

    /// Imports a public key in X9.63 / SEC1 form (compressed or uncompressed).
    pub fn import_x963(&self, id: CurveId, bytes: &[u8]) -> Result<Key> {
        let curve = self.curve(id)?;
        let public = sec1::decode_point(&curve, bytes)?;
        Key::new(curve, None, Some(public), self.config.key_flags())
    }

    /// Imports a public key in X9.63 form, choosing the curve from the
    /// encoding's length.
    pub fn import_x963_any(&self, bytes: &[u8]) -> Result<Key> {
        let id = sec1::curve_for_encoding(bytes)?;
        self.import_x963(id, bytes)
    }

    /// Imports a raw private scalar with an optional X9.63 public point.
    ///
    /// When `public` is absent it is derived; when present it must match.
    pub fn import_private(&self, id: CurveId, scalar: &[u8], public: Option<&[u8]>) -> Result<Key> {
        let curve = self.curve(id)?;
        let secret = sec1::decode_scalar(&curve, scalar)?;
        let derived = curve.to_affine(&self.mul_secret(&curve, curve.generator(), &secret));

        if let Some(encoded) = public {
            if sec1::decode_point(&curve, encoded)? != derived {
                return Err(Error::PrivateKeyMismatch);
            }
        }
        Key::new(curve, Some(secret), Some(derived), self.config.key_flags())
    }

    /// Imports a key from hex coordinates and an optional hex private scalar.
    pub fn import_raw_hex(
        &self,
        id: CurveId,
        qx: &str,
        qy: &str,
        d: Option<&str>,
    ) -> Result<Key> {
        let curve = self.curve(id)?;
        let parse = |s: &str| BigUint::parse_bytes(s.as_bytes(), 16).ok_or(Error::BadArgument);

        let public = AffinePoint::new(parse(qx)?, parse(qy)?);
        if public.x >= *curve.prime() || public.y >= *curve.prime() {
            return Err(Error::OutOfRange);
        }
        if !curve.is_on_curve(&public) {
            return Err(Error::NotOnCurve);
        }

        let secret = match d {
            Some(d) => {
                let k = SecretScalar::new(parse(d)?);
                if !curve.is_valid_scalar(k.expose()) {
                    return Err(Error::InvalidScalar);
                }
                Some(k)
            }
            None => None,
        };
        Key::new(curve, secret, Some(public), self.config.key_flags())
    }

    /// Waits on the key's accelerator for the point of the job in flight.
    pub(crate) fn poll_accelerator(key: &mut Key) -> Result<Poll<AffinePoint>> {
        let accelerator = key.accelerator_mut().ok_or(Error::BadState)?;
        match accelerator.poll() {
            Poll::Pending => Ok(Poll::Pending),
            Poll::Ready(result) => result.map(Poll::Ready),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_table::{LocalFixedPointCache, NoCache};
    use rand_core::OsRng;

    #[test]
    fn config_ranges() {
        assert!(EngineConfig::default().validate().is_ok());
        let bad = EngineConfig {
            fixed_point_window: 9,
            ..Default::default()
        };
        assert_eq!(
            Engine::<NoCache>::with_config(bad).unwrap_err(),
            Error::BadArgument
        );
    }

    #[test]
    fn generate_and_derive() {
        let engine = Engine::<LocalFixedPointCache>::with_config(EngineConfig::default()).unwrap();
        let key = engine.generate_key(CurveId::Secp256r1, &mut OsRng).unwrap();
        let mut private_only = Key::new(
            key.curve().clone(),
            key.secret_scalar().cloned(),
            None,
            KeyFlags::NONE,
        )
        .unwrap();
        let derived = engine.derive_public(&mut private_only).unwrap();
        assert_eq!(Some(&derived), key.public_key());
    }
}
