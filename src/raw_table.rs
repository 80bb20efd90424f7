//! RawTable: the probe engine over slot storage.
//!
//! Linear probing from `hash & (capacity - 1)`. A slot is occupied iff its
//! key differs from the sentinel under the table's `KeyEq` policy; there are
//! no per-slot flags and no tombstones. Deletion repairs the probe chain by
//! backward shifting, and growth rebuilds the slot array at a larger power of
//! two.
//!
//! `RawTable` pairs the probing `Core` with the debug reentrancy guard:
//! each of its methods enters the guard once and delegates, so the guard
//! and the slots are borrowed as disjoint fields.

use crate::error::TableError;
use crate::params::{usable_slots, TableParams};
use crate::policy::{KeyEq, KeyHash};
use crate::reentrancy::DebugReentrancy;
use crate::sentinel::Sentinel;
use crate::slots::{Slot, SlotStorage};
use core::fmt;
use core::mem;
use core::iter::FusedIterator;

/// Outcome of walking a probe sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    /// The key lives in this slot.
    Found(usize),
    /// The key is absent; this is the first empty slot on its path.
    Vacant(usize),
}

/// Slot indices visited for one hash: `start, start + 1, ...` modulo the
/// capacity, each slot at most once.
#[derive(Clone, Debug)]
pub(crate) struct ProbeSeq {
    pos: usize,
    mask: usize,
    left: usize,
}

impl ProbeSeq {
    #[inline]
    pub(crate) fn new(hash: u64, mask: usize) -> Self {
        Self {
            pos: (hash as usize) & mask,
            mask,
            left: mask + 1,
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.left == 0 {
            return None;
        }
        let idx = self.pos;
        self.pos = (self.pos + 1) & self.mask;
        self.left -= 1;
        Some(idx)
    }
}

/// Whether `x` lies in the cyclic half-open interval `(lo, hi]`.
#[inline]
fn in_cyclic_range(lo: usize, hi: usize, x: usize) -> bool {
    if lo <= hi {
        lo < x && x <= hi
    } else {
        lo < x || x <= hi
    }
}

#[inline]
fn occupied<K, E: KeyEq<K>>(eq: &E, marker: &K, key: &K) -> bool {
    !eq.key_eq(key, marker)
}

struct Core<K, V, Z, S, E> {
    storage: SlotStorage<K, V>,
    len: usize,
    max_load_factor: f32,
    // Built once from `sentinel` and used for every occupancy test.
    marker: K,
    sentinel: Z,
    hasher: S,
    eq: E,
}

impl<K, V, Z, S, E> Core<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
    #[inline]
    fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    #[inline]
    fn is_occupied(&self, idx: usize) -> bool {
        occupied(&self.eq, &self.marker, &self.storage.get(idx).key)
    }

    fn locate<Q>(&self, hash: u64, q: &Q) -> Probe
    where
        Q: ?Sized,
        E: KeyEq<K, Q>,
    {
        for idx in ProbeSeq::new(hash, self.storage.mask()) {
            let slot = self.storage.get(idx);
            if !occupied(&self.eq, &self.marker, &slot.key) {
                return Probe::Vacant(idx);
            }
            if self.eq.key_eq(&slot.key, q) {
                return Probe::Found(idx);
            }
        }
        unreachable!("probe sequence wrapped around a table with no empty slot")
    }

    /// First empty slot on the path of `hash`; no key comparisons.
    fn first_vacant(&self, hash: u64) -> usize {
        ProbeSeq::new(hash, self.storage.mask())
            .find(|&idx| !self.is_occupied(idx))
            .expect("table always keeps at least one empty slot")
    }

    fn lookup<Q>(&self, q: &Q) -> Option<usize>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        match self.locate(self.hasher.hash_key(q), q) {
            Probe::Found(idx) => Some(idx),
            Probe::Vacant(_) => None,
        }
    }

    /// Locate `key`; when absent, grow first if one more entry would break
    /// the load bound, then return the insertion point.
    fn find_or_reserve(&mut self, key: &K) -> Probe {
        debug_assert!(
            occupied(&self.eq, &self.marker, key),
            "inserted key compares equal to the table's empty marker"
        );
        let hash = self.hasher.hash_key(key);
        match self.locate(hash, key) {
            Probe::Found(idx) => Probe::Found(idx),
            Probe::Vacant(idx) => {
                if self.len + 1 <= usable_slots(self.capacity(), self.max_load_factor) {
                    return Probe::Vacant(idx);
                }
                let target = self.grown_capacity(self.len + 1);
                self.resize(target);
                Probe::Vacant(self.first_vacant(hash))
            }
        }
    }

    #[inline]
    fn occupy(&mut self, idx: usize, key: K, value: V) -> &mut V {
        let slot = self.storage.get_mut(idx);
        drop(slot.fill(key, value));
        self.len += 1;
        slot.value_mut()
    }

    fn remove_at(&mut self, idx: usize) -> (K, V) {
        let marker = self.sentinel.clone_marker(&self.marker);
        let entry = self.storage.get_mut(idx).vacate(marker);
        self.len -= 1;
        self.backward_shift(idx);
        entry
    }

    /// Close the hole at `gap` left by a removal.
    ///
    /// Walks the run of occupied slots after the gap. An entry at `j` whose
    /// ideal slot is not in `(gap, j]` would have its probe path cut by the
    /// hole, so it moves into the gap and the gap moves to `j`. Entries
    /// that may stay are skipped; the walk ends at the first empty slot.
    fn backward_shift(&mut self, mut gap: usize) {
        let mask = self.storage.mask();
        let mut j = (gap + 1) & mask;
        while self.is_occupied(j) {
            let ideal = (self.hasher.hash_key(&self.storage.get(j).key) as usize) & mask;
            if !in_cyclic_range(gap, j, ideal) {
                self.storage.swap(gap, j);
                gap = j;
            }
            j = (j + 1) & mask;
        }
    }

    /// Smallest power of two ≥ `requested` whose load bound admits `needed`
    /// entries.
    fn capacity_for(&self, requested: usize, needed: usize) -> usize {
        let mut cap = requested
            .max(1)
            .checked_next_power_of_two()
            .expect("capacity overflow");
        while usable_slots(cap, self.max_load_factor) < needed {
            cap = cap.checked_mul(2).expect("capacity overflow");
        }
        cap
    }

    fn grown_capacity(&self, needed: usize) -> usize {
        let doubled = self.capacity().checked_mul(2).expect("capacity overflow");
        self.capacity_for(doubled, needed)
    }

    fn resize(&mut self, capacity: usize) {
        log::debug!(
            "open hash map: rehash {} -> {} slots ({} live)",
            self.capacity(),
            capacity,
            self.len
        );
        let fresh = SlotStorage::new_vacant(capacity, || self.sentinel.clone_marker(&self.marker));
        let old = mem::replace(&mut self.storage, fresh);
        let live = mem::take(&mut self.len);
        for slot in old.into_vec() {
            if !occupied(&self.eq, &self.marker, &slot.key) {
                continue;
            }
            let (key, value) = slot.into_parts();
            let idx = self.first_vacant(self.hasher.hash_key(&key));
            drop(self.storage.get_mut(idx).fill(key, value));
            self.len += 1;
        }
        debug_assert_eq!(self.len, live, "rehash lost or duplicated entries");
    }
}

pub(crate) struct RawTable<K, V, Z, S, E> {
    core: Core<K, V, Z, S, E>,
    reentrancy: DebugReentrancy,
}

impl<K, V, Z, S, E> RawTable<K, V, Z, S, E> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.core.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.core.storage.capacity()
    }

    #[inline]
    pub(crate) fn max_load_factor(&self) -> f32 {
        self.core.max_load_factor
    }

    pub(crate) fn sentinel(&self) -> &Z {
        &self.core.sentinel
    }

    pub(crate) fn hasher(&self) -> &S {
        &self.core.hasher
    }

    pub(crate) fn key_eq(&self) -> &E {
        &self.core.eq
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V, E> {
        Iter {
            slots: self.core.storage.as_slice().iter(),
            marker: &self.core.marker,
            eq: &self.core.eq,
            left: self.core.len,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, K, V, E> {
        let inner = &mut self.core;
        IterMut {
            slots: inner.storage.as_mut_slice().iter_mut(),
            marker: &inner.marker,
            eq: &inner.eq,
            left: inner.len,
        }
    }
}

impl<K, V, Z, S, E> RawTable<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
    pub(crate) fn with_policies(
        params: TableParams,
        sentinel: Z,
        hasher: S,
        eq: E,
    ) -> Result<Self, TableError> {
        let capacity = params.validate()?;
        let marker = sentinel.empty_marker();
        let storage = SlotStorage::new_vacant(capacity, || sentinel.clone_marker(&marker));
        log::trace!(
            "open hash map: allocated {} slots, max load factor {}",
            capacity,
            params.get_max_load_factor()
        );
        let core = Core {
            storage,
            len: 0,
            max_load_factor: params.get_max_load_factor(),
            marker,
            sentinel,
            hasher,
            eq,
        };
        Ok(Self {
            core,
            reentrancy: DebugReentrancy::new(),
        })
    }

    pub(crate) fn get<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        let _g = self.reentrancy.enter();
        let slot = self.core.storage.get(self.core.lookup(q)?);
        Some((&slot.key, slot.value()))
    }

    pub(crate) fn get_mut<Q>(&mut self, q: &Q) -> Option<(&K, &mut V)>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        let _g = self.reentrancy.enter();
        let idx = self.core.lookup(q)?;
        Some(self.core.storage.get_mut(idx).parts_mut())
    }

    /// Insert if absent. Returns the slot's value and whether it was
    /// inserted; on a duplicate, `key` and `make` are dropped unused.
    pub(crate) fn emplace<F>(&mut self, key: K, make: F) -> (&mut V, bool)
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter();
        let inner = &mut self.core;
        match inner.find_or_reserve(&key) {
            Probe::Found(idx) => (inner.storage.get_mut(idx).value_mut(), false),
            Probe::Vacant(idx) => (inner.occupy(idx, key, make()), true),
        }
    }

    /// Insert or overwrite. Returns the displaced value, if any.
    pub(crate) fn assign(&mut self, key: K, value: V) -> (&mut V, Option<V>) {
        let _g = self.reentrancy.enter();
        let inner = &mut self.core;
        match inner.find_or_reserve(&key) {
            Probe::Found(idx) => {
                let slot = inner.storage.get_mut(idx).value_mut();
                let old = mem::replace(slot, value);
                (slot, Some(old))
            }
            Probe::Vacant(idx) => (inner.occupy(idx, key, value), None),
        }
    }

    pub(crate) fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        let _g = self.reentrancy.enter();
        let idx = self.core.lookup(q)?;
        Some(self.core.remove_at(idx))
    }

    /// Rebuild the slot array with room for at least `requested` slots and
    /// all current entries.
    pub(crate) fn rehash(&mut self, requested: usize) {
        let _g = self.reentrancy.enter();
        let target = self.core.capacity_for(requested, self.core.len);
        self.core.resize(target);
    }

    /// Make room for `additional` more entries without further growth.
    pub(crate) fn reserve(&mut self, additional: usize) {
        let _g = self.reentrancy.enter();
        let inner = &mut self.core;
        let needed = inner.len.checked_add(additional).expect("capacity overflow");
        if needed <= usable_slots(inner.capacity(), inner.max_load_factor) {
            return;
        }
        let target = inner.capacity_for(inner.capacity(), needed);
        inner.resize(target);
    }

    /// Destroy every entry; capacity is kept.
    pub(crate) fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        let inner = &mut self.core;
        for idx in 0..inner.capacity() {
            if inner.len == 0 {
                break;
            }
            if inner.is_occupied(idx) {
                let marker = inner.sentinel.clone_marker(&inner.marker);
                drop(inner.storage.get_mut(idx).vacate(marker));
                inner.len -= 1;
            }
        }
    }

    /// Remove the next occupied entry at or after `*cursor`, advancing it.
    /// Skips backward shifting, so it is only for draining the whole table
    /// front to back.
    pub(crate) fn take_next(&mut self, cursor: &mut usize) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        let inner = &mut self.core;
        while *cursor < inner.capacity() && inner.len > 0 {
            let idx = *cursor;
            *cursor += 1;
            if inner.is_occupied(idx) {
                let marker = inner.sentinel.clone_marker(&inner.marker);
                inner.len -= 1;
                return Some(inner.storage.get_mut(idx).vacate(marker));
            }
        }
        None
    }
}

impl<K, V, Z, S, E> Clone for RawTable<K, V, Z, S, E>
where
    K: Clone,
    V: Clone,
    Z: Clone,
    S: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        // Slot-for-slot copy keeps every entry at its current index, so no
        // probing or hashing is needed.
        let inner = &self.core;
        Self {
            core: Core {
                storage: inner.storage.clone(),
                len: inner.len,
                max_load_factor: inner.max_load_factor,
                marker: inner.marker.clone(),
                sentinel: inner.sentinel.clone(),
                hasher: inner.hasher.clone(),
                eq: inner.eq.clone(),
            },
            reentrancy: DebugReentrancy::new(),
        }
    }
}

/// Iterator over occupied entries in slot order.
pub struct Iter<'a, K, V, E> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    marker: &'a K,
    eq: &'a E,
    left: usize,
}

impl<'a, K, V, E: KeyEq<K>> Iterator for Iter<'a, K, V, E> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if occupied(self.eq, self.marker, &slot.key) {
                self.left -= 1;
                return Some((&slot.key, slot.value()));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<K, V, E: KeyEq<K>> ExactSizeIterator for Iter<'_, K, V, E> {}
impl<K, V, E: KeyEq<K>> FusedIterator for Iter<'_, K, V, E> {}

impl<K, V, E> Clone for Iter<'_, K, V, E> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            marker: self.marker,
            eq: self.eq,
            left: self.left,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, E: KeyEq<K>> fmt::Debug for Iter<'_, K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over occupied entries in slot order, values mutable.
pub struct IterMut<'a, K, V, E> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
    marker: &'a K,
    eq: &'a E,
    left: usize,
}

impl<'a, K, V, E: KeyEq<K>> Iterator for IterMut<'a, K, V, E> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if occupied(self.eq, self.marker, &slot.key) {
                self.left -= 1;
                return Some(slot.parts_mut());
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl<K, V, E: KeyEq<K>> ExactSizeIterator for IterMut<'_, K, V, E> {}
impl<K, V, E: KeyEq<K>> FusedIterator for IterMut<'_, K, V, E> {}
