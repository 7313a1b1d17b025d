//! Fixed-point comb tables and the caches that hold them.
//!
//! A [`CombTable`] for base `G` and width `L` holds `2^L` points where entry
//! `i` is `Σ bit_j(i)·2^(j·gap)·G` with `gap = ⌈order_bits / L⌉`. A scalar is
//! then consumed `gap` columns at a time: one doubling and one table addition
//! per column.
//!
//! Tables are kept in a small fixed-capacity cache with LRU eviction. A base
//! point only gets a table once it has been used twice.

use crate::{
    AffinePoint, ProjectivePoint, arithmetic::Curve, curve::CurveId, engine::EngineConfig,
    uint::BitView,
};
use core::cell::RefCell;
use num_bigint::BigUint;
use std::sync::{Arc, Mutex, PoisonError};
use subtle::ConstantTimeEq;

/// Usage counts above this value decay each time a hole is searched for.
const LRU_THRESHOLD: u32 = 3;

/// Strategy used by the engine to multiply secret scalars by a base point.
///
/// Implementations choose between no caching ([`NoCache`]), a cache shared
/// behind a lock ([`FixedPointCache`]) and a per-thread cache without
/// locking ([`LocalFixedPointCache`]). Every implementation must return the
/// same point as [`Curve::mul`].
pub trait AccelerationCache {
    /// Creates the cache with the engine's configuration.
    fn with_config(config: &EngineConfig) -> Self
    where
        Self: Sized;

    /// Computes `k·base`.
    fn mul(&self, curve: &Curve, base: &AffinePoint, k: &BigUint) -> ProjectivePoint;

    /// Frees every cached table.
    fn invalidate_all(&self) {}
}

/// No precomputation: every multiplication runs the ladder.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl AccelerationCache for NoCache {
    fn with_config(_config: &EngineConfig) -> Self {
        NoCache
    }

    fn mul(&self, curve: &Curve, base: &AffinePoint, k: &BigUint) -> ProjectivePoint {
        curve.mul(k, base)
    }
}

/// Precomputed comb table for one base point.
#[derive(Clone, Debug)]
pub struct CombTable {
    window: usize,
    gap: usize,
    points: Vec<ProjectivePoint>,
}

impl CombTable {
    /// Builds the table for `base` with comb width `window`.
    ///
    /// `mu` is the Montgomery normalisation constant `R mod p` used to lift
    /// `base` into Montgomery form.
    pub fn build(curve: &Curve, base: &AffinePoint, mu: &BigUint, window: usize) -> Self {
        let p = curve.prime();
        let gap = (curve.order_bits() + window - 1) / window;
        let size = 1usize << window;

        let mut points = vec![curve.identity(); size];
        points[1] = ProjectivePoint {
            x: (&base.x * mu) % p,
            y: (&base.y * mu) % p,
            z: mu.clone(),
        };

        // weight-1 entries: 2^(j·gap)·G by repeated doubling
        for j in 1..window {
            let mut t = points[1 << (j - 1)].clone();
            for _ in 0..gap {
                t = curve.double(&t);
            }
            points[1 << j] = t;
        }

        // every other entry is one addition of two entries of lower weight
        for idx in comb_order(window) {
            let hi = 1usize << (usize::BITS - 1 - idx.leading_zeros());
            points[idx] = curve.add(&points[idx ^ hi], &points[hi]);
        }

        // back to Z = 1 so the walk can use mixed additions
        for point in points.iter_mut().skip(1) {
            *point = curve.normalize(point);
        }

        Self {
            window,
            gap,
            points,
        }
    }

    /// Comb width `L`.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of precomputed points (`2^L`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table is empty; never true for a built table.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Computes `k·base` by walking the scalar's comb columns.
    ///
    /// Every column scans the whole table with constant-time selection.
    pub fn mul(&self, curve: &Curve, k: &BigUint) -> ProjectivePoint {
        let limbs = curve.monty().limbs();
        let k = crate::SecretScalar::new(curve.reduce_scalar(k));
        let view = BitView::new(k.expose(), (self.gap * self.window) as u64);

        let mut r = curve.identity();
        for column in (0..self.gap).rev() {
            let mut z = 0u32;
            for j in 0..self.window {
                z |= u32::from(view.bit(column + j * self.gap)) << j;
            }

            r = curve.double(&r);
            let t = self.select(z, limbs);
            r = curve.add(&r, &t);
        }
        r
    }

    fn select(&self, index: u32, limbs: usize) -> ProjectivePoint {
        let mut t = self.points[0].clone();
        for (j, point) in self.points.iter().enumerate() {
            let c = (j as u32).ct_eq(&index);
            t = ProjectivePoint::conditional_select(&t, point, c, limbs);
        }
        t
    }
}

/// Table indices of Hamming weight two and above, in increasing weight.
fn comb_order(window: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (1..(1usize << window))
        .filter(|i| i.count_ones() >= 2)
        .collect();
    order.sort_by_key(|i| i.count_ones());
    order
}

#[derive(Debug)]
struct CacheEntry {
    curve: CurveId,
    base: AffinePoint,
    mu: BigUint,
    lru_count: u32,
    locks: u32,
    lut: Option<Arc<CombTable>>,
}

/// Fixed-capacity set of comb tables with LRU eviction.
#[derive(Debug)]
pub(crate) struct CacheTable {
    entries: Vec<Option<CacheEntry>>,
    window: usize,
}

impl CacheTable {
    pub(crate) fn new(capacity: usize, window: usize) -> Self {
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            window,
        }
    }

    pub(crate) fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.fixed_point_entries, config.fixed_point_window)
    }

    /// Index of the entry holding `base`, if any.
    pub(crate) fn find_base(&self, curve: CurveId, base: &AffinePoint) -> Option<usize> {
        self.entries.iter().position(|entry| {
            entry
                .as_ref()
                .is_some_and(|e| e.curve == curve && e.base == *base)
        })
    }

    /// Ages usage counts and frees the least used unlocked entry.
    ///
    /// Returns `None` when every entry is locked.
    pub(crate) fn find_hole(&mut self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (i, slot) in self.entries.iter_mut().enumerate() {
            let count = match slot {
                None => 0,
                Some(entry) => {
                    if entry.lru_count > LRU_THRESHOLD {
                        entry.lru_count -= 1;
                    }
                    if entry.locks > 0 {
                        continue;
                    }
                    entry.lru_count
                }
            };
            if best.map_or(true, |(_, c)| count < c) {
                best = Some((i, count));
            }
        }

        let (idx, _) = best?;
        if let Some(evicted) = self.entries[idx].take() {
            tracing::debug!(
                curve = %evicted.curve,
                slot = idx,
                lru_count = evicted.lru_count,
                "evicting fixed-point entry"
            );
        }
        Some(idx)
    }

    fn add_entry(&mut self, idx: usize, curve: &Curve, base: &AffinePoint) {
        self.entries[idx] = Some(CacheEntry {
            curve: curve.id(),
            base: base.clone(),
            mu: curve.monty().normalization().clone(),
            lru_count: 0,
            locks: 0,
            lut: None,
        });
    }

    /// Records a use of `base` and returns its table once one exists,
    /// locking the entry until [`CacheTable::release`].
    pub(crate) fn acquire(
        &mut self,
        curve: &Curve,
        base: &AffinePoint,
    ) -> Option<(usize, Arc<CombTable>)> {
        let idx = match self.find_base(curve.id(), base) {
            Some(idx) => idx,
            None => {
                let idx = self.find_hole()?;
                self.add_entry(idx, curve, base);
                idx
            }
        };

        let window = self.window;
        let entry = self.entries[idx].as_mut()?;
        entry.lru_count = entry.lru_count.saturating_add(1);

        if entry.lru_count == 2 && entry.lut.is_none() {
            tracing::debug!(curve = %entry.curve, slot = idx, window, "building comb table");
            entry.lut = Some(Arc::new(CombTable::build(
                curve,
                &entry.base,
                &entry.mu,
                window,
            )));
        }

        let lut = entry.lut.clone()?;
        entry.locks += 1;
        Some((idx, lut))
    }

    pub(crate) fn release(&mut self, idx: usize) {
        if let Some(entry) = self.entries.get_mut(idx).and_then(Option::as_mut) {
            entry.locks = entry.locks.saturating_sub(1);
        }
    }

    pub(crate) fn invalidate_all(&mut self) {
        for slot in self.entries.iter_mut() {
            *slot = None;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub(crate) fn has_table(&self, curve: CurveId, base: &AffinePoint) -> bool {
        self.find_base(curve, base)
            .and_then(|idx| self.entries[idx].as_ref())
            .is_some_and(|e| e.lut.is_some())
    }
}

/// Comb-table cache shared between threads behind a mutex.
///
/// All lookups, evictions and table builds are serialised; the
/// multiplication itself runs outside the lock on a shared table.
#[derive(Debug)]
pub struct FixedPointCache {
    inner: Mutex<CacheTable>,
}

impl FixedPointCache {
    /// Creates an empty cache with `capacity` entries of comb width `window`.
    pub fn new(capacity: usize, window: usize) -> Self {
        Self {
            inner: Mutex::new(CacheTable::new(capacity, window)),
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, CacheTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of occupied entries.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether no entry is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `base` has an entry.
    pub fn contains(&self, curve: CurveId, base: &AffinePoint) -> bool {
        self.table().find_base(curve, base).is_some()
    }

    /// Whether `base` has a built comb table.
    pub fn has_table(&self, curve: CurveId, base: &AffinePoint) -> bool {
        self.table().has_table(curve, base)
    }
}

impl AccelerationCache for FixedPointCache {
    fn with_config(config: &EngineConfig) -> Self {
        Self {
            inner: Mutex::new(CacheTable::from_config(config)),
        }
    }

    fn mul(&self, curve: &Curve, base: &AffinePoint, k: &BigUint) -> ProjectivePoint {
        let acquired = self.table().acquire(curve, base);
        match acquired {
            Some((idx, lut)) => {
                let r = lut.mul(curve, k);
                self.table().release(idx);
                r
            }
            None => curve.mul(k, base),
        }
    }

    fn invalidate_all(&self) {
        self.table().invalidate_all();
    }
}

/// Comb-table cache for use from a single thread, without locking.
#[derive(Debug)]
pub struct LocalFixedPointCache {
    inner: RefCell<CacheTable>,
}

impl LocalFixedPointCache {
    /// Creates an empty cache with `capacity` entries of comb width `window`.
    pub fn new(capacity: usize, window: usize) -> Self {
        Self {
            inner: RefCell::new(CacheTable::new(capacity, window)),
        }
    }

    /// Number of occupied entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether no entry is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `base` has a built comb table.
    pub fn has_table(&self, curve: CurveId, base: &AffinePoint) -> bool {
        self.inner.borrow().has_table(curve, base)
    }
}

impl AccelerationCache for LocalFixedPointCache {
    fn with_config(config: &EngineConfig) -> Self {
        Self {
            inner: RefCell::new(CacheTable::from_config(config)),
        }
    }

    fn mul(&self, curve: &Curve, base: &AffinePoint, k: &BigUint) -> ProjectivePoint {
        let acquired = self.inner.borrow_mut().acquire(curve, base);
        match acquired {
            Some((idx, lut)) => {
                let r = lut.mul(curve, k);
                self.inner.borrow_mut().release(idx);
                r
            }
            None => curve.mul(k, base),
        }
    }

    fn invalidate_all(&self) {
        self.inner.borrow_mut().invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveCache, CurveId};

    fn point(curve: &Curve, k: u32) -> AffinePoint {
        curve.to_affine(&curve.mul_base(&BigUint::from(k)))
    }

    #[test]
    fn comb_order_is_by_weight() {
        let order = comb_order(4);
        assert_eq!(order.len(), 16 - 1 - 4);
        assert!(order.windows(2).all(|w| w[0].count_ones() <= w[1].count_ones()));
        assert_eq!(order[0].count_ones(), 2);
        assert_eq!(*order.last().unwrap(), 15);
    }

    #[test]
    fn table_built_on_second_use() {
        let curves = CurveCache::new();
        let curve = curves.curve(CurveId::Secp256r1).unwrap();
        let g = curve.generator().clone();
        let mut table = CacheTable::new(4, 4);

        assert!(table.acquire(&curve, &g).is_none());
        assert!(!table.has_table(curve.id(), &g));
        let (idx, lut) = table.acquire(&curve, &g).unwrap();
        assert!(table.has_table(curve.id(), &g));
        assert_eq!(lut.len(), 16);
        table.release(idx);
    }

    #[test]
    fn eviction_prefers_least_used_unlocked() {
        let curves = CurveCache::new();
        let curve = curves.curve(CurveId::Secp192r1).unwrap();
        let (p1, p2, p3) = (point(&curve, 2), point(&curve, 3), point(&curve, 4));
        let mut table = CacheTable::new(2, 2);

        // p1 used twice and left locked, p2 used once
        table.acquire(&curve, &p1);
        let (locked, _) = table.acquire(&curve, &p1).unwrap();
        table.acquire(&curve, &p2);
        assert_eq!(table.len(), 2);

        // p3 must replace p2, the only unlocked entry
        table.acquire(&curve, &p3);
        assert!(table.find_base(curve.id(), &p1).is_some());
        assert!(table.find_base(curve.id(), &p2).is_none());
        assert!(table.find_base(curve.id(), &p3).is_some());

        table.release(locked);
        table.invalidate_all();
        assert_eq!(table.len(), 0);
    }

    fn use_count(table: &CacheTable, curve: &Curve, base: &AffinePoint) -> u32 {
        let idx = table.find_base(curve.id(), base).unwrap();
        table.entries[idx].as_ref().unwrap().lru_count
    }

    /// Acquires `base` `times` times, releasing every lock taken.
    fn touch(table: &mut CacheTable, curve: &Curve, base: &AffinePoint, times: u32) {
        for _ in 0..times {
            if let Some((idx, _)) = table.acquire(curve, base) {
                table.release(idx);
            }
        }
    }

    #[test]
    fn find_hole_ages_counts_above_threshold() {
        let curves = CurveCache::new();
        let curve = curves.curve(CurveId::Secp192r1).unwrap();
        let (busy, quiet, idle) = (point(&curve, 6), point(&curve, 7), point(&curve, 8));
        let mut table = CacheTable::new(4, 2);

        touch(&mut table, &curve, &quiet, LRU_THRESHOLD);
        touch(&mut table, &curve, &idle, 1);
        touch(&mut table, &curve, &busy, LRU_THRESHOLD + 3);
        assert_eq!(use_count(&table, &curve, &busy), LRU_THRESHOLD + 3);

        // the free slot is handed out, busy decays by one and the rest keep their counts
        assert_eq!(table.find_hole(), Some(3));
        assert_eq!(use_count(&table, &curve, &busy), LRU_THRESHOLD + 2);
        assert_eq!(use_count(&table, &curve, &quiet), LRU_THRESHOLD);
        assert_eq!(use_count(&table, &curve, &idle), 1);

        // once full, the least used entry is evicted
        assert_eq!(table.find_hole(), Some(3));
        table.add_entry(3, &curve, &point(&curve, 9));
        table.entries[3].as_mut().unwrap().lru_count = LRU_THRESHOLD;
        let hole = table.find_hole().unwrap();
        assert!(table.entries[hole].is_none());
        assert!(table.find_base(curve.id(), &idle).is_none());
        assert_eq!(use_count(&table, &curve, &busy), LRU_THRESHOLD);
        assert_eq!(use_count(&table, &curve, &quiet), LRU_THRESHOLD);

        // decay stops at the threshold
        table.find_hole();
        assert_eq!(use_count(&table, &curve, &busy), LRU_THRESHOLD);
    }

    #[test]
    fn find_hole_ages_locked_entries() {
        let curves = CurveCache::new();
        let curve = curves.curve(CurveId::Secp192r1).unwrap();
        let p1 = point(&curve, 10);
        let mut table = CacheTable::new(1, 2);

        touch(&mut table, &curve, &p1, LRU_THRESHOLD + 1);
        let (idx, _) = table.acquire(&curve, &p1).unwrap();
        assert!(table.find_hole().is_none());
        assert_eq!(use_count(&table, &curve, &p1), LRU_THRESHOLD + 1);
        table.release(idx);
    }

    #[test]
    fn use_count_saturates() {
        let curves = CurveCache::new();
        let curve = curves.curve(CurveId::Secp192r1).unwrap();
        let p1 = point(&curve, 11);
        let mut table = CacheTable::new(1, 2);

        touch(&mut table, &curve, &p1, 2);
        table.entries[0].as_mut().unwrap().lru_count = u32::MAX;
        touch(&mut table, &curve, &p1, 1);
        assert_eq!(use_count(&table, &curve, &p1), u32::MAX);
        assert!(table.has_table(curve.id(), &p1));
    }

    #[test]
    fn all_locked_has_no_hole() {
        let curves = CurveCache::new();
        let curve = curves.curve(CurveId::Secp192r1).unwrap();
        let p1 = point(&curve, 5);
        let mut table = CacheTable::new(1, 2);
        table.acquire(&curve, &p1);
        table.acquire(&curve, &p1).unwrap();
        assert!(table.find_hole().is_none());
    }

    #[test]
    fn comb_matches_ladder() {
        let curves = CurveCache::new();
        for id in [CurveId::Secp224r1, CurveId::Secp256k1, CurveId::Secp521r1] {
            let curve = curves.curve(id).unwrap();
            for window in [2, 4, 5] {
                let lut = CombTable::build(
                    &curve,
                    curve.generator(),
                    curve.monty().normalization(),
                    window,
                );
                for k in [0u64, 1, 2, 0xffff_ffff, u64::MAX] {
                    let k = BigUint::from(k);
                    assert!(curve.points_equal(&lut.mul(&curve, &k), &curve.mul_base(&k)));
                }
                let k = curve.order().clone() - 1u32;
                assert!(curve.points_equal(&lut.mul(&curve, &k), &curve.mul_base(&k)));
            }
        }
    }

    #[test]
    fn caches_agree_with_ladder() {
        let curves = CurveCache::new();
        let curve = curves.curve(CurveId::BrainpoolP256r1).unwrap();
        let shared = FixedPointCache::new(3, 4);
        let local = LocalFixedPointCache::new(3, 4);
        let g = curve.generator();
        for k in 1u32..6 {
            let k = BigUint::from(k) << 200u32;
            let expected = curve.to_affine(&curve.mul_base(&k));
            assert_eq!(curve.to_affine(&shared.mul(&curve, g, &k)), expected);
            assert_eq!(curve.to_affine(&local.mul(&curve, g, &k)), expected);
            assert_eq!(curve.to_affine(&NoCache.mul(&curve, g, &k)), expected);
        }
        assert!(shared.has_table(curve.id(), g));
        assert!(local.has_table(curve.id(), g));
        shared.invalidate_all();
        assert!(shared.is_empty());
    }
}
