//! Keys and resumable operation state.

use crate::{
    AffinePoint, Error, Result, SecretScalar, accelerator::Accelerator, arithmetic::Curve,
    curve::CurveId, sec1,
};
use core::fmt;
use num_bigint::BigUint;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Which halves of a key pair are present.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyType {
    /// Only the public point.
    PublicOnly,
    /// Only the private scalar; see [`Engine::derive_public`](crate::Engine::derive_public).
    PrivateOnly,
    /// Private scalar and matching public point.
    PrivateAndPublic,
}

/// Per-key option flags.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyFlags(u8);

impl KeyFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Multiply by the curve cofactor during ECDH.
    pub const COFACTOR: Self = Self(1 << 0);

    /// Whether every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the flags in `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// Multi-step operation a key can be in the middle of.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    /// ECDSA signing.
    Sign,
    /// ECDSA verification.
    Verify,
    /// ECDH shared secret derivation.
    SharedSecret,
}

/// Intermediate values of a signature waiting on `k·G`.
#[derive(Debug)]
pub struct SignState {
    pub(crate) e: BigUint,
    pub(crate) nonce: SecretScalar,
    pub(crate) attempts: u32,
}

/// Intermediate values of a verification waiting on `u1·G + u2·Q`.
#[derive(Debug)]
pub struct VerifyState {
    pub(crate) r: BigUint,
}

/// Peer point of a shared secret derivation waiting on `d·Q`.
///
/// Resuming with a different peer key fails with [`Error::BadState`].
#[derive(Debug)]
pub struct SharedSecretState {
    pub(crate) peer: AffinePoint,
}

/// Resumable state stored on a [`Key`].
///
/// An operation that hands work to an [`Accelerator`] returns
/// `Poll::Pending` and records where it stopped here. Calling the same
/// operation again resumes it; calling a different one fails with
/// [`Error::BadState`] until the operation completes or
/// [`Key::reset_operation`] is called.
#[derive(Debug, Default)]
pub enum OperationState {
    /// No operation in progress.
    #[default]
    Idle,
    /// Signing, waiting for the ephemeral point.
    SignAwaitingPoint(SignState),
    /// Verifying, waiting for the combined point.
    VerifyAwaitingPoint(VerifyState),
    /// Deriving a shared secret, waiting for `d·Q`.
    SharedSecretAwaitingPoint(SharedSecretState),
}

impl OperationState {
    /// Whether no operation is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationState::Idle)
    }

    /// Operation in progress, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            OperationState::Idle => None,
            OperationState::SignAwaitingPoint(_) => Some(Operation::Sign),
            OperationState::VerifyAwaitingPoint(_) => Some(Operation::Verify),
            OperationState::SharedSecretAwaitingPoint(_) => Some(Operation::SharedSecret),
        }
    }
}

/// An elliptic curve key: a private scalar, a public point, or both.
///
/// The private scalar is wiped when the key is dropped.
pub struct Key {
    curve: Arc<Curve>,
    secret: Option<SecretScalar>,
    public: Option<AffinePoint>,
    pub(crate) state: OperationState,
    flags: KeyFlags,
    accelerator: Option<Box<dyn Accelerator>>,
}

impl Key {
    pub(crate) fn new(
        curve: Arc<Curve>,
        secret: Option<SecretScalar>,
        public: Option<AffinePoint>,
        flags: KeyFlags,
    ) -> Result<Self> {
        if secret.is_none() && public.is_none() {
            return Err(Error::BadArgument);
        }
        Ok(Self {
            curve,
            secret,
            public,
            state: OperationState::Idle,
            flags,
            accelerator: None,
        })
    }

    /// Curve this key is defined over.
    pub fn curve(&self) -> &Arc<Curve> {
        &self.curve
    }

    /// Identifier of the key's curve.
    pub fn curve_id(&self) -> CurveId {
        self.curve.id()
    }

    /// Which halves of the key pair are present.
    pub fn key_type(&self) -> KeyType {
        match (&self.secret, &self.public) {
            (Some(_), Some(_)) => KeyType::PrivateAndPublic,
            (Some(_), None) => KeyType::PrivateOnly,
            _ => KeyType::PublicOnly,
        }
    }

    /// Public point, if present.
    pub fn public_key(&self) -> Option<&AffinePoint> {
        self.public.as_ref()
    }

    /// Private scalar, if present.
    pub fn secret_scalar(&self) -> Option<&SecretScalar> {
        self.secret.as_ref()
    }

    pub(crate) fn set_public(&mut self, public: AffinePoint) {
        self.public = Some(public);
    }

    /// Option flags.
    pub fn flags(&self) -> KeyFlags {
        self.flags
    }

    /// Replaces the option flags.
    pub fn set_flags(&mut self, flags: KeyFlags) {
        self.flags = flags;
    }

    /// State of the resumable operation in progress.
    pub fn state(&self) -> &OperationState {
        &self.state
    }

    /// Abandons any operation in progress, cancelling the accelerator job
    /// it was waiting on.
    pub fn reset_operation(&mut self) {
        if !self.state.is_idle() {
            tracing::debug!(operation = ?self.state.operation(), "operation reset");
            if let Some(accelerator) = self.accelerator.as_deref_mut() {
                accelerator.cancel();
            }
        }
        self.state = OperationState::Idle;
    }

    /// Routes this key's multiplications through `accelerator`.
    pub fn set_accelerator(&mut self, accelerator: Box<dyn Accelerator>) {
        self.accelerator = Some(accelerator);
    }

    /// Detaches the accelerator, if any.
    pub fn take_accelerator(&mut self) -> Option<Box<dyn Accelerator>> {
        self.accelerator.take()
    }

    pub(crate) fn accelerator_mut(&mut self) -> Option<&mut (dyn Accelerator + 'static)> {
        self.accelerator.as_deref_mut()
    }

    pub(crate) fn has_accelerator(&self) -> bool {
        self.accelerator.is_some()
    }

    fn require_public(&self) -> Result<&AffinePoint> {
        self.public.as_ref().ok_or(Error::BadArgument)
    }

    fn require_secret(&self) -> Result<&SecretScalar> {
        self.secret.as_ref().ok_or(Error::BadArgument)
    }

    /// Encodes the public point in X9.63 / SEC1 form.
    pub fn export_x963(&self, compressed: bool) -> Result<Vec<u8>> {
        sec1::encode_point(&self.curve, self.require_public()?, compressed)
    }

    /// Encodes the public point into `out`, returning the number of bytes
    /// written.
    pub fn export_x963_into(&self, compressed: bool, out: &mut [u8]) -> Result<usize> {
        sec1::encode_point_into(&self.curve, self.require_public()?, compressed, out)
    }

    /// Encodes the private scalar as a field-size big-endian string.
    pub fn export_private(&self) -> Result<Zeroizing<Vec<u8>>> {
        sec1::encode_scalar(&self.curve, self.require_secret()?)
    }

    /// Encodes the private scalar into `out`, returning the number of bytes
    /// written.
    pub fn export_private_into(&self, out: &mut [u8]) -> Result<usize> {
        let encoded = self.export_private()?;
        let out = out
            .get_mut(..encoded.len())
            .ok_or(Error::BufferTooSmall {
                required: encoded.len(),
            })?;
        out.copy_from_slice(&encoded);
        Ok(encoded.len())
    }

    /// Public coordinates, each left-padded to the field size.
    pub fn export_public_raw(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let public = self.require_public()?;
        if public.is_identity() {
            return Err(Error::PointAtInfinity);
        }
        let size = self.curve.field_size();
        Ok((
            crate::uint::to_be_bytes_padded(&public.x, size)?,
            crate::uint::to_be_bytes_padded(&public.y, size)?,
        ))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("curve", &self.curve.id())
            .field("key_type", &self.key_type())
            .field("public", &self.public)
            .field("state", &self.state.operation())
            .field("flags", &self.flags)
            .field("accelerator", &self.accelerator.is_some())
            .finish_non_exhaustive()
    }
}
