//! Slot storage: a fixed-size block of key/value slots.
//!
//! Every slot always holds a key; an empty slot holds the sentinel. The
//! table decides occupancy by comparing that key against the sentinel, never
//! by looking at the value. The value half is constructed when the slot is
//! filled and destroyed when it is vacated, so it is live exactly while the
//! key is not the sentinel. It is kept in an `Option` so that a key type
//! whose `Eq` disagrees with itself turns into a panic here instead of a
//! read of a value that was never constructed.

use core::mem;

pub(crate) struct Slot<K, V> {
    pub(crate) key: K,
    value: Option<V>,
}

impl<K, V> Slot<K, V> {
    #[inline]
    fn vacant(marker: K) -> Self {
        Self { key: marker, value: None }
    }

    /// Value of an occupied slot.
    #[inline]
    pub(crate) fn value(&self) -> &V {
        self.value
            .as_ref()
            .expect("occupied slot must hold a value; key Eq is inconsistent")
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        self.value
            .as_mut()
            .expect("occupied slot must hold a value; key Eq is inconsistent")
    }

    /// Key and value of an occupied slot, value mutable.
    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&K, &mut V) {
        let value = self
            .value
            .as_mut()
            .expect("occupied slot must hold a value; key Eq is inconsistent");
        (&self.key, value)
    }

    /// Construct key and value in an empty slot. Returns the sentinel key it
    /// displaced.
    #[inline]
    pub(crate) fn fill(&mut self, key: K, value: V) -> K {
        debug_assert!(self.value.is_none(), "filling an occupied slot");
        self.value = Some(value);
        mem::replace(&mut self.key, key)
    }

    /// Move key and value out of an occupied slot, leaving `marker` behind.
    #[inline]
    pub(crate) fn vacate(&mut self, marker: K) -> (K, V) {
        let value = self
            .value
            .take()
            .expect("occupied slot must hold a value; key Eq is inconsistent");
        let key = mem::replace(&mut self.key, marker);
        (key, value)
    }

    /// Split an owned, occupied slot into its parts.
    #[inline]
    pub(crate) fn into_parts(self) -> (K, V) {
        let value = self
            .value
            .expect("occupied slot must hold a value; key Eq is inconsistent");
        (self.key, value)
    }
}

impl<K: Clone, V: Clone> Clone for Slot<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// Owned, contiguous slot array. Its length is the table capacity and is
/// always a power of two.
pub(crate) struct SlotStorage<K, V> {
    slots: Box<[Slot<K, V>]>,
}

impl<K, V> SlotStorage<K, V> {
    /// Allocate `capacity` slots, each keyed by a fresh marker.
    pub(crate) fn new_vacant<F>(capacity: usize, mut marker: F) -> Self
    where
        F: FnMut() -> K,
    {
        debug_assert!(capacity.is_power_of_two());
        let slots = (0..capacity).map(|_| Slot::vacant(marker())).collect();
        Self { slots }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline]
    pub(crate) fn get(&self, idx: usize) -> &Slot<K, V> {
        &self.slots[idx]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut Slot<K, V> {
        &mut self.slots[idx]
    }

    /// Exchange two whole slots. Backward shift moves an occupied slot onto
    /// an empty one this way, without constructing or destroying anything.
    #[inline]
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Slot<K, V>] {
        &mut self.slots
    }

    pub(crate) fn into_vec(self) -> Vec<Slot<K, V>> {
        self.slots.into_vec()
    }
}

impl<K: Clone, V: Clone> Clone for SlotStorage<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}
