//! Scoped secret scalars.

use crate::{Result, uint};
use core::fmt;
use num_bigint::BigUint;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// A private scalar which is wiped when dropped.
///
/// `Debug` output never includes the value.
#[derive(Clone)]
pub struct SecretScalar {
    value: BigUint,
}

impl SecretScalar {
    /// Wraps a scalar.
    pub fn new(value: BigUint) -> Self {
        Self { value }
    }

    /// Decodes a big-endian scalar.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self::new(uint::from_be_bytes(bytes))
    }

    /// Borrows the scalar value.
    pub fn expose(&self) -> &BigUint {
        &self.value
    }

    /// Big-endian encoding left-padded to `len` bytes.
    pub fn to_be_bytes(&self, len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        uint::write_be_padded(&self.value, &mut out)?;
        Ok(out)
    }
}

impl From<BigUint> for SecretScalar {
    fn from(value: BigUint) -> Self {
        Self::new(value)
    }
}

impl Zeroize for SecretScalar {
    fn zeroize(&mut self) {
        uint::wipe(&mut self.value);
    }
}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretScalar {}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(..)")
    }
}
