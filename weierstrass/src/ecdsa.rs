//! Elliptic Curve Digital Signature Algorithm (ECDSA).
//!
//! Signing and verification are resumable: with an
//! [`Accelerator`](crate::Accelerator) attached to the key, the point
//! multiplication is handed off, the call returns `Poll::Pending`, and the
//! same call must be repeated until it returns `Poll::Ready`.

use crate::{
    AffinePoint, Error, Result, SecretScalar,
    accelerator::MulJob,
    arithmetic::Curve,
    engine::Engine,
    key::{Key, OperationState, SignState, VerifyState},
    lookup_table::AccelerationCache,
    monty::invert_mod_prime,
    sec1, uint,
};
use core::{mem, task::Poll};
use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::CryptoRngCore;

/// ECDSA signature: the pair `(r, s)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    /// Creates a signature from its two components.
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    /// The `r` component.
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    /// The `s` component.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Encodes the signature as `r ∥ s`, each left-padded to the byte length
    /// of the curve's order.
    pub fn to_bytes(&self, curve: &Curve) -> Result<Vec<u8>> {
        let size = curve.order_size();
        let mut out = vec![0u8; 2 * size];
        uint::write_be_padded(&self.r, &mut out[..size])?;
        uint::write_be_padded(&self.s, &mut out[size..])?;
        Ok(out)
    }

    /// Parses a fixed-width `r ∥ s` encoding.
    ///
    /// Only the length is checked; the range of each component is checked
    /// by verification.
    pub fn from_bytes(curve: &Curve, bytes: &[u8]) -> Result<Self> {
        let size = curve.order_size();
        if bytes.len() != 2 * size {
            return Err(Error::InvalidSignature);
        }
        Ok(Self {
            r: uint::from_be_bytes(&bytes[..size]),
            s: uint::from_be_bytes(&bytes[size..]),
        })
    }
}

/// Converts a message digest to an integer, keeping its leftmost
/// `order_bits` bits.
pub(crate) fn hash_to_scalar(curve: &Curve, hash: &[u8]) -> BigUint {
    let hash = &hash[..hash.len().min(curve.order_size())];
    let e = uint::from_be_bytes(hash);
    let bits = hash.len() * 8;
    if bits > curve.order_bits() {
        e >> (bits - curve.order_bits())
    } else {
        e
    }
}

/// Computes `(r, s)` from the ephemeral point `nonce·G`.
///
/// Returns `None` when either component is zero and a new nonce is needed.
fn finish_signature(
    curve: &Curve,
    e: &BigUint,
    d: &SecretScalar,
    nonce: &SecretScalar,
    point: &AffinePoint,
) -> Option<Signature> {
    let n = curve.order();
    let r = &point.x % n;
    if r.is_zero() {
        return None;
    }

    let mut k_inv = invert_mod_prime(nonce.expose(), n)?;
    let t = SecretScalar::new((e + d.expose() * &r) % n);
    let s = (&k_inv * t.expose()) % n;
    uint::wipe(&mut k_inv);

    if s.is_zero() {
        return None;
    }
    Some(Signature { r, s })
}

/// Whether the combined verification point matches `r`.
fn check_verification_point(curve: &Curve, point: &AffinePoint, r: &BigUint) -> bool {
    !point.is_identity() && &point.x % curve.order() == *r
}

impl<A: AccelerationCache> Engine<A> {
    /// Signs the message digest `hash` with the private half of `key`.
    ///
    /// Returns `Poll::Pending` while the ephemeral multiplication is with the
    /// key's accelerator; call again with the same arguments to continue.
    /// Calling while the key is in the middle of another operation fails
    /// with [`Error::BadState`].
    pub fn sign(
        &self,
        key: &mut Key,
        hash: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<Poll<Signature>> {
        match mem::take(&mut key.state) {
            OperationState::Idle => {
                if hash.is_empty() {
                    return Err(Error::BadArgument);
                }
                let e = hash_to_scalar(key.curve(), hash);
                self.sign_attempts(key, e, rng, 0)
            }
            OperationState::SignAwaitingPoint(state) => self.sign_resume(key, state, rng),
            other => {
                key.state = other;
                Err(Error::BadState)
            }
        }
    }

    fn sign_attempts(
        &self,
        key: &mut Key,
        e: BigUint,
        rng: &mut impl CryptoRngCore,
        first_attempt: u32,
    ) -> Result<Poll<Signature>> {
        let curve = key.curve().clone();
        let d = key.secret_scalar().ok_or(Error::BadArgument)?.clone();

        for attempt in first_attempt..self.config().sign_retries {
            let nonce = match self.random_scalar(&curve, rng)? {
                Some(nonce) => nonce,
                None => continue,
            };

            if let Some(accelerator) = key.accelerator_mut() {
                accelerator.submit(MulJob::Mul {
                    curve: curve.clone(),
                    scalar: nonce.clone(),
                    point: curve.generator().clone(),
                })?;
                tracing::trace!(curve = %curve.id(), attempt, "signing multiplication offloaded");
                key.state = OperationState::SignAwaitingPoint(SignState {
                    e,
                    nonce,
                    attempts: attempt + 1,
                });
                return Ok(Poll::Pending);
            }

            let point = curve.to_affine(&self.mul_secret(&curve, curve.generator(), &nonce));
            if let Some(signature) = finish_signature(&curve, &e, &d, &nonce, &point) {
                return Ok(Poll::Ready(signature));
            }
        }

        tracing::debug!(curve = %curve.id(), "signing retries exhausted");
        Err(Error::RngFailure)
    }

    fn sign_resume(
        &self,
        key: &mut Key,
        state: SignState,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Poll<Signature>> {
        let point = match Self::poll_accelerator(key)? {
            Poll::Pending => {
                key.state = OperationState::SignAwaitingPoint(state);
                return Ok(Poll::Pending);
            }
            Poll::Ready(point) => point,
        };

        let curve = key.curve().clone();
        let d = key.secret_scalar().ok_or(Error::BadArgument)?;
        match finish_signature(&curve, &state.e, d, &state.nonce, &point) {
            Some(signature) => Ok(Poll::Ready(signature)),
            None => {
                let SignState { e, attempts, .. } = state;
                self.sign_attempts(key, e, rng, attempts)
            }
        }
    }

    /// Signs `hash` with a caller-chosen ephemeral scalar.
    ///
    /// Intended for known-answer tests: reusing a nonce across two messages
    /// reveals the private key. Fails with [`Error::InvalidScalar`] if the
    /// nonce is out of range or yields a zero signature component.
    pub fn sign_with_nonce(&self, key: &Key, hash: &[u8], nonce: &[u8]) -> Result<Signature> {
        if !key.state().is_idle() {
            return Err(Error::BadState);
        }
        if hash.is_empty() {
            return Err(Error::BadArgument);
        }
        let curve = key.curve();
        let d = key.secret_scalar().ok_or(Error::BadArgument)?;
        let nonce = sec1::decode_scalar(curve, nonce)?;
        let e = hash_to_scalar(curve, hash);

        let point = curve.to_affine(&self.mul_secret(curve, curve.generator(), &nonce));
        finish_signature(curve, &e, d, &nonce, &point).ok_or(Error::InvalidScalar)
    }

    /// Verifies `signature` over the message digest `hash` with the public
    /// half of `key`.
    ///
    /// A signature that does not verify, including one whose components are
    /// out of range, is reported as `Ok(Poll::Ready(false))`.
    pub fn verify(
        &self,
        key: &mut Key,
        hash: &[u8],
        signature: &Signature,
    ) -> Result<Poll<bool>> {
        match mem::take(&mut key.state) {
            OperationState::Idle => self.verify_start(key, hash, signature),
            OperationState::VerifyAwaitingPoint(state) => {
                let point = match Self::poll_accelerator(key)? {
                    Poll::Pending => {
                        key.state = OperationState::VerifyAwaitingPoint(state);
                        return Ok(Poll::Pending);
                    }
                    Poll::Ready(point) => point,
                };
                Ok(Poll::Ready(check_verification_point(
                    key.curve(),
                    &point,
                    &state.r,
                )))
            }
            other => {
                key.state = other;
                Err(Error::BadState)
            }
        }
    }

    fn verify_start(
        &self,
        key: &mut Key,
        hash: &[u8],
        signature: &Signature,
    ) -> Result<Poll<bool>> {
        if hash.is_empty() {
            return Err(Error::BadArgument);
        }
        let curve = key.curve().clone();
        let q = key.public_key().ok_or(Error::BadArgument)?.clone();
        let n = curve.order();

        let Signature { r, s } = signature;
        if !curve.is_valid_scalar(r) || !curve.is_valid_scalar(s) {
            return Ok(Poll::Ready(false));
        }

        let e = hash_to_scalar(&curve, hash);
        let w = match invert_mod_prime(s, n) {
            Some(w) => w,
            None => return Ok(Poll::Ready(false)),
        };
        let u1 = (&e * &w) % n;
        let u2 = (r * &w) % n;

        if let Some(accelerator) = key.accelerator_mut() {
            accelerator.submit(MulJob::DualMul {
                curve: curve.clone(),
                ka: u1,
                a: curve.generator().clone(),
                kb: u2,
                b: q,
            })?;
            tracing::trace!(curve = %curve.id(), "verification multiplication offloaded");
            key.state = OperationState::VerifyAwaitingPoint(VerifyState { r: r.clone() });
            return Ok(Poll::Pending);
        }

        let point = curve.to_affine(&curve.dual_mul(&u1, curve.generator(), &u2, &q));
        Ok(Poll::Ready(check_verification_point(&curve, &point, r)))
    }
}
