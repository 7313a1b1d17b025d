//! Elliptic Curve Diffie-Hellman (ECDH).
//!
//! The shared secret is the x-coordinate of `d·Q` (or `h·d·Q` with the
//! cofactor flag), left-padded to the field size.

use crate::{
    AffinePoint, Error, Result,
    accelerator::MulJob,
    arithmetic::Curve,
    engine::Engine,
    key::{Key, KeyFlags, OperationState, SharedSecretState},
    lookup_table::AccelerationCache,
    uint, validate,
};
use core::{mem, task::Poll};
use num_bigint::BigUint;
use zeroize::Zeroizing;

/// Writes the x-coordinate of the agreed point into `out`.
fn finish_shared_secret(
    curve: &Curve,
    flags: KeyFlags,
    point: AffinePoint,
    out: &mut [u8],
) -> Result<usize> {
    let mut point = point;
    if flags.contains(KeyFlags::COFACTOR) && curve.cofactor() != 1 {
        let h = BigUint::from(curve.cofactor());
        point = curve.to_affine(&curve.mul_vartime(&h, &point));
    }
    if point.is_identity() {
        return Err(Error::PointAtInfinity);
    }

    let size = curve.field_size();
    uint::write_be_padded(&point.x, &mut out[..size])?;
    uint::wipe(&mut point.x);
    uint::wipe(&mut point.y);
    Ok(size)
}

impl<A: AccelerationCache> Engine<A> {
    /// Derives the shared secret between the private half of `private` and
    /// the public half of `public`, writing it into `out`.
    ///
    /// Returns the number of bytes written (the field size). `out` is checked
    /// first, so a short buffer reports the required length as
    /// [`Error::BufferTooSmall`] without touching the keys.
    ///
    /// A derivation left pending by an [`Accelerator`](crate::Accelerator)
    /// must be resumed with the same `public` key; any other peer fails with
    /// [`Error::BadState`] and leaves the pending derivation in place.
    pub fn shared_secret(
        &self,
        private: &mut Key,
        public: &Key,
        out: &mut [u8],
    ) -> Result<Poll<usize>> {
        let required = private.curve().field_size();
        if out.len() < required {
            return Err(Error::BufferTooSmall { required });
        }

        match mem::take(&mut private.state) {
            OperationState::Idle => self.shared_secret_start(private, public, out),
            OperationState::SharedSecretAwaitingPoint(state) => {
                if public.public_key() != Some(&state.peer) {
                    private.state = OperationState::SharedSecretAwaitingPoint(state);
                    return Err(Error::BadState);
                }
                let point = match Self::poll_accelerator(private)? {
                    Poll::Pending => {
                        private.state = OperationState::SharedSecretAwaitingPoint(state);
                        return Ok(Poll::Pending);
                    }
                    Poll::Ready(point) => point,
                };
                finish_shared_secret(private.curve(), private.flags(), point, out).map(Poll::Ready)
            }
            other => {
                private.state = other;
                Err(Error::BadState)
            }
        }
    }

    fn shared_secret_start(
        &self,
        private: &mut Key,
        public: &Key,
        out: &mut [u8],
    ) -> Result<Poll<usize>> {
        if private.curve_id() != public.curve_id() {
            return Err(Error::CurveMismatch);
        }
        let curve = private.curve().clone();
        let d = private.secret_scalar().ok_or(Error::BadArgument)?.clone();
        let q = public.public_key().ok_or(Error::BadArgument)?;
        validate::check_point(&curve, q)?;

        if let Some(accelerator) = private.accelerator_mut() {
            accelerator.submit(MulJob::Mul {
                curve: curve.clone(),
                scalar: d,
                point: q.clone(),
            })?;
            tracing::trace!(curve = %curve.id(), "shared secret multiplication offloaded");
            private.state =
                OperationState::SharedSecretAwaitingPoint(SharedSecretState { peer: q.clone() });
            return Ok(Poll::Pending);
        }

        let point = curve.to_affine(&self.mul_secret(&curve, q, &d));
        finish_shared_secret(&curve, private.flags(), point, out).map(Poll::Ready)
    }

    /// Derives the shared secret into a new buffer that is wiped on drop.
    pub fn shared_secret_vec(
        &self,
        private: &mut Key,
        public: &Key,
    ) -> Result<Poll<Zeroizing<Vec<u8>>>> {
        let mut out = Zeroizing::new(vec![0u8; private.curve().field_size()]);
        Ok(match self.shared_secret(private, public, &mut out)? {
            Poll::Ready(_) => Poll::Ready(out),
            Poll::Pending => Poll::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Engine, EngineConfig, Error, KeyFlags, curve::CurveId, lookup_table::NoCache};
    use core::task::Poll;
    use rand_core::OsRng;

    #[test]
    fn agreement_is_symmetric() {
        let engine = Engine::<NoCache>::with_config(EngineConfig::default()).unwrap();
        let mut alice = engine.generate_key(CurveId::BrainpoolP256r1, &mut OsRng).unwrap();
        let mut bob = engine.generate_key(CurveId::BrainpoolP256r1, &mut OsRng).unwrap();

        let ab = engine.shared_secret_vec(&mut alice, &bob).unwrap();
        let ba = engine.shared_secret_vec(&mut bob, &alice).unwrap();
        assert_eq!(ab, ba);
        assert!(matches!(ab, Poll::Ready(ref s) if s.len() == 32));
    }

    #[test]
    fn cofactor_flag_is_identity_for_prime_order_curves() {
        let engine = Engine::<NoCache>::with_config(EngineConfig::default()).unwrap();
        let mut alice = engine.generate_key(CurveId::Secp256r1, &mut OsRng).unwrap();
        let bob = engine.generate_key(CurveId::Secp256r1, &mut OsRng).unwrap();

        let plain = engine.shared_secret_vec(&mut alice, &bob).unwrap();
        alice.set_flags(KeyFlags::COFACTOR);
        let with_cofactor = engine.shared_secret_vec(&mut alice, &bob).unwrap();
        assert_eq!(plain, with_cofactor);
    }

    #[test]
    fn buffer_checked_first() {
        let engine = Engine::<NoCache>::with_config(EngineConfig::default()).unwrap();
        let mut alice = engine.generate_key(CurveId::Secp521r1, &mut OsRng).unwrap();
        let bob = engine.generate_key(CurveId::Secp256r1, &mut OsRng).unwrap();
        let mut out = [0u8; 8];
        assert_eq!(
            engine.shared_secret(&mut alice, &bob, &mut out).unwrap_err(),
            Error::BufferTooSmall { required: 66 }
        );
    }
}
