//! Curve parameter cache.
//!
//! Registry entries are converted into big integers lazily, one field at a
//! time, and the fully materialised arithmetic context is kept alongside them.

use super::registry::{self, CurveId, CurveInfo};
use crate::{Result, arithmetic::Curve, uint};
use core::ops::{BitOr, BitOrAssign};
use num_bigint::BigUint;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

/// Set of curve parameter fields.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Fields(u8);

impl Fields {
    /// No fields.
    pub const NONE: Self = Self(0);
    /// Prime modulus `p`.
    pub const PRIME: Self = Self(1 << 0);
    /// Coefficient `a`.
    pub const A: Self = Self(1 << 1);
    /// Coefficient `b`.
    pub const B: Self = Self(1 << 2);
    /// Group order `n`.
    pub const ORDER: Self = Self(1 << 3);
    /// Base point x-coordinate.
    pub const GX: Self = Self(1 << 4);
    /// Base point y-coordinate.
    pub const GY: Self = Self(1 << 5);
    /// Every field.
    pub const ALL: Self = Self(0x3f);

    /// Whether every field in `other` is also in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Fields {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Fields {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Big-integer view of a registry entry, filled in incrementally.
#[derive(Debug)]
pub struct CurveSpec {
    info: &'static CurveInfo,
    prime: OnceLock<BigUint>,
    a: OnceLock<BigUint>,
    b: OnceLock<BigUint>,
    order: OnceLock<BigUint>,
    gx: OnceLock<BigUint>,
    gy: OnceLock<BigUint>,
    arithmetic: OnceLock<Arc<Curve>>,
}

impl CurveSpec {
    fn new(info: &'static CurveInfo) -> Self {
        Self {
            info,
            prime: OnceLock::new(),
            a: OnceLock::new(),
            b: OnceLock::new(),
            order: OnceLock::new(),
            gx: OnceLock::new(),
            gy: OnceLock::new(),
            arithmetic: OnceLock::new(),
        }
    }

    /// Registry entry these parameters were loaded from.
    pub fn info(&self) -> &'static CurveInfo {
        self.info
    }

    /// Fields converted so far.
    pub fn loaded(&self) -> Fields {
        let mut fields = Fields::NONE;
        for (cell, flag) in self.cells() {
            if cell.get().is_some() {
                fields |= flag;
            }
        }
        fields
    }

    /// Prime modulus, if loaded.
    pub fn prime(&self) -> Option<&BigUint> {
        self.prime.get()
    }

    /// Coefficient `a`, if loaded.
    pub fn a(&self) -> Option<&BigUint> {
        self.a.get()
    }

    /// Coefficient `b`, if loaded.
    pub fn b(&self) -> Option<&BigUint> {
        self.b.get()
    }

    /// Group order, if loaded.
    pub fn order(&self) -> Option<&BigUint> {
        self.order.get()
    }

    /// Base point coordinates, if loaded.
    pub fn generator(&self) -> Option<(&BigUint, &BigUint)> {
        Some((self.gx.get()?, self.gy.get()?))
    }

    fn cells(&self) -> [(&OnceLock<BigUint>, Fields); 6] {
        [
            (&self.prime, Fields::PRIME),
            (&self.a, Fields::A),
            (&self.b, Fields::B),
            (&self.order, Fields::ORDER),
            (&self.gx, Fields::GX),
            (&self.gy, Fields::GY),
        ]
    }

    /// Converts the requested fields that are not loaded yet.
    fn load(&self, fields: Fields) {
        let info = self.info;
        let sources = [info.prime, info.a, info.b, info.order, info.gx, info.gy];
        for ((cell, flag), bytes) in self.cells().into_iter().zip(sources) {
            if fields.contains(flag) {
                cell.get_or_init(|| uint::from_be_bytes(bytes));
            }
        }
    }
}

/// Shared cache of curve parameters keyed by curve id.
#[derive(Debug, Default)]
pub struct CurveCache {
    specs: Mutex<HashMap<CurveId, Arc<CurveSpec>>>,
}

impl CurveCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures `fields` are loaded for `id` and returns the cached spec.
    ///
    /// Fields that are already present are not recomputed.
    pub fn load_fields(&self, id: CurveId, fields: Fields) -> Result<Arc<CurveSpec>> {
        let spec = {
            let mut specs = self.specs.lock().unwrap_or_else(PoisonError::into_inner);
            specs
                .entry(id)
                .or_insert_with(|| Arc::new(CurveSpec::new(registry::lookup(id))))
                .clone()
        };
        spec.load(fields);
        Ok(spec)
    }

    /// Like [`CurveCache::load_fields`], resolving the curve by name.
    pub fn load_by_name(&self, name: &str, fields: Fields) -> Result<Arc<CurveSpec>> {
        let info = registry::find_by_name(name)?;
        self.load_fields(info.id, fields)
    }

    /// Arithmetic context for `id`, materialised on first use.
    pub fn curve(&self, id: CurveId) -> Result<Arc<Curve>> {
        let spec = self.load_fields(id, Fields::ALL)?;
        if let Some(curve) = spec.arithmetic.get() {
            return Ok(curve.clone());
        }

        let curve = Arc::new(Curve::from_spec(&spec)?);
        tracing::debug!(curve = %id, "materialised curve parameters");
        Ok(spec.arithmetic.get_or_init(|| curve).clone())
    }

    /// Number of curves with a cached entry.
    pub fn len(&self) -> usize {
        self.specs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no curve has been loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached entry. Outstanding `Arc`s stay valid.
    pub fn clear(&self) {
        self.specs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_load() {
        let cache = CurveCache::new();
        let spec = cache.load_fields(CurveId::Secp256r1, Fields::PRIME).unwrap();
        assert_eq!(spec.loaded(), Fields::PRIME);
        assert!(spec.a().is_none());

        let again = cache
            .load_fields(CurveId::Secp256r1, Fields::PRIME | Fields::A)
            .unwrap();
        assert!(Arc::ptr_eq(&spec, &again));
        assert_eq!(spec.loaded(), Fields::PRIME | Fields::A);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn curve_is_shared() {
        let cache = CurveCache::new();
        let c1 = cache.curve(CurveId::Secp384r1).unwrap();
        let c2 = cache.curve(CurveId::Secp384r1).unwrap();
        assert!(Arc::ptr_eq(&c1, &c2));
        let spec = cache.load_fields(CurveId::Secp384r1, Fields::NONE).unwrap();
        assert_eq!(spec.loaded(), Fields::ALL);
    }

    #[test]
    fn by_name() {
        let cache = CurveCache::new();
        assert!(cache.load_by_name("SECP256K1", Fields::ORDER).is_ok());
        assert_eq!(
            cache.load_by_name("nope", Fields::ORDER).unwrap_err(),
            crate::Error::CurveNotFound
        );
    }
}
