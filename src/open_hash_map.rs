//! OpenHashMap: public map API over the probing `RawTable`.

use crate::error::TableError;
use crate::params::TableParams;
use crate::policy::{Equivalence, Hashing, KeyEq, KeyHash};
use crate::raw_table::{Iter, IterMut, RawTable};
use crate::sentinel::{Reserved, Sentinel};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::ops::Index;

/// Open-addressing hash map with sentinel-keyed slots.
///
/// Type parameters beyond `K` and `V` are policies:
/// - `Z`: where the empty-slot key comes from ([`Reserved`] by default).
/// - `S`: hash policy ([`Hashing`] over `RandomState` by default).
/// - `E`: equality policy ([`Equivalence`], transparent, by default).
///
/// Keys equal to the sentinel must never be inserted; with the default
/// policy that rules out `u32::MAX` for `u32` keys, the empty string for
/// `String` keys, and so on.
///
/// ```
/// use sentinel_hashmap::OpenHashMap;
///
/// let mut m: OpenHashMap<String, i32> = OpenHashMap::new();
/// m.insert("one".to_string(), 1);
/// *m.get_or_default("two".to_string()) = 2;
/// assert_eq!(m.at("one"), Ok(&1));
/// assert_eq!(m.get("two"), Some(&2));
/// assert_eq!(m.erase("one"), 1);
/// assert_eq!(m.erase("one"), 0);
/// ```
#[derive(Clone)]
pub struct OpenHashMap<K, V, Z = Reserved, S = Hashing, E = Equivalence> {
    raw: RawTable<K, V, Z, S, E>,
}

/// `String`-keyed map, queried with `&str`.
pub type StringOpenHashMap<V> = OpenHashMap<String, V>;

impl<K, V, Z, S, E> OpenHashMap<K, V, Z, S, E>
where
    Z: Sentinel<K> + Default,
    S: KeyHash<K> + Default,
    E: KeyEq<K> + Default,
{
    /// Empty map with the default parameters (8 slots, load factor 0.875).
    pub fn new() -> Self {
        Self::with_sentinel(Z::default())
    }

    /// Empty map with room for `capacity` slots, rounded up to a power of two.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_params(TableParams::new().initial_capacity(capacity))
    }

    pub fn with_params(params: TableParams) -> Result<Self, TableError> {
        Self::with_policies(params, Z::default(), S::default(), E::default())
    }
}

impl<K, V, Z, S, E> OpenHashMap<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K> + Default,
    E: KeyEq<K> + Default,
{
    /// Empty map with default parameters and an explicit sentinel policy,
    /// for policies that carry state (literals, transforms).
    pub fn with_sentinel(sentinel: Z) -> Self {
        Self::with_policies(TableParams::new(), sentinel, S::default(), E::default())
            .expect("default table parameters are valid")
    }
}

impl<K, V, Z, B, E> OpenHashMap<K, V, Z, Hashing<B>, E>
where
    K: Hash,
    Z: Sentinel<K> + Default,
    B: BuildHasher,
    E: KeyEq<K> + Default,
{
    pub fn with_hasher(hash_builder: B) -> Self {
        Self::with_policies(
            TableParams::new(),
            Z::default(),
            Hashing::new(hash_builder),
            E::default(),
        )
        .expect("default table parameters are valid")
    }
}

impl<K, V, Z, S, E> OpenHashMap<K, V, Z, S, E> {
    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Number of slots; always a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    #[inline]
    pub fn max_load_factor(&self) -> f32 {
        self.raw.max_load_factor()
    }

    /// Current ratio of live entries to slots.
    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.capacity() as f32
    }

    pub fn sentinel(&self) -> &Z {
        self.raw.sentinel()
    }

    pub fn hasher(&self) -> &S {
        self.raw.hasher()
    }

    pub fn key_eq(&self) -> &E {
        self.raw.key_eq()
    }

    /// Entries in slot order. The order is unrelated to insertion order and
    /// changes whenever the table rehashes.
    pub fn iter(&self) -> Iter<'_, K, V, E> {
        self.raw.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, E> {
        self.raw.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, K, V, E> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, E> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, E> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<K, V, Z, S, E> OpenHashMap<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
    /// Build a map from explicit policy instances.
    pub fn with_policies(
        params: TableParams,
        sentinel: Z,
        hasher: S,
        eq: E,
    ) -> Result<Self, TableError> {
        Ok(Self {
            raw: RawTable::with_policies(params, sentinel, hasher, eq)?,
        })
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.raw.get(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.raw.get(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.raw.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.raw.get_mut(key).map(|(_, v)| v)
    }

    /// Checked access: `Err(TableError::KeyNotFound)` when absent.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, TableError>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.get(key).ok_or(TableError::KeyNotFound)
    }

    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, TableError>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.get_mut(key).ok_or(TableError::KeyNotFound)
    }

    /// Insert `key -> value` unless `key` is already present.
    ///
    /// Returns the value now stored under `key` and whether this call
    /// inserted it. A present key keeps its value; the arguments are
    /// dropped.
    pub fn insert(&mut self, key: K, value: V) -> (&mut V, bool) {
        self.raw.emplace(key, move || value)
    }

    /// Insert `key -> value`, replacing (and dropping) any previous value.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> &mut V {
        let (slot, _old) = self.raw.assign(key, value);
        slot
    }

    /// Like [`insert_or_assign`](Self::insert_or_assign) but hands back the
    /// replaced value.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        self.raw.assign(key, value).1
    }

    /// Construct the value in place from `make` only if `key` is absent.
    pub fn emplace<F>(&mut self, key: K, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.raw.emplace(key, make).0
    }

    /// Alias of [`emplace`](Self::emplace) under the std naming.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.emplace(key, make)
    }

    /// Indexed access: the value under `key`, default-constructed if absent.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.emplace(key, V::default)
    }

    /// Remove `key`; returns how many entries were removed (0 or 1).
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        usize::from(self.raw.remove_entry(key).is_some())
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.raw.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        S: KeyHash<Q>,
        E: KeyEq<K, Q>,
    {
        self.raw.remove_entry(key)
    }

    /// Drop every entry; the slot count is kept.
    pub fn clear(&mut self) {
        self.raw.clear()
    }

    /// Rebuild with at least `capacity` slots, rounded up to a power of two
    /// and to whatever the current entries need under the load factor.
    pub fn rehash(&mut self, capacity: usize) {
        self.raw.rehash(capacity)
    }

    /// Make room for `additional` more entries without growing again.
    pub fn reserve(&mut self, additional: usize) {
        self.raw.reserve(additional)
    }

    /// Shrink to the smallest power of two that holds the current entries.
    pub fn shrink_to_fit(&mut self) {
        self.raw.rehash(0)
    }
}

impl<K, V, Z, S, E> Default for OpenHashMap<K, V, Z, S, E>
where
    Z: Sentinel<K> + Default,
    S: KeyHash<K> + Default,
    E: KeyEq<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, Z, S, E> fmt::Debug for OpenHashMap<K, V, Z, S, E>
where
    K: fmt::Debug,
    V: fmt::Debug,
    E: KeyEq<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, Z, S, E> PartialEq for OpenHashMap<K, V, Z, S, E>
where
    V: PartialEq,
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, Z, S, E> Eq for OpenHashMap<K, V, Z, S, E>
where
    V: Eq,
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
}

impl<K, Q, V, Z, S, E> Index<&Q> for OpenHashMap<K, V, Z, S, E>
where
    Q: ?Sized,
    Z: Sentinel<K>,
    S: KeyHash<K> + KeyHash<Q>,
    E: KeyEq<K> + KeyEq<K, Q>,
{
    type Output = V;

    /// Panics if `key` is absent; use [`OpenHashMap::at`] for a checked
    /// lookup or [`OpenHashMap::get_or_default`] to insert.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in OpenHashMap")
    }
}

impl<K, V, Z, S, E> Extend<(K, V)> for OpenHashMap<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
    /// Later pairs overwrite earlier ones with the same key.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0;
        // Duplicates are likely when merging into a populated map.
        self.reserve(if self.is_empty() { hint } else { (hint + 1) / 2 });
        for (k, v) in iter {
            self.insert_or_assign(k, v);
        }
    }
}

impl<K, V, Z, S, E> FromIterator<(K, V)> for OpenHashMap<K, V, Z, S, E>
where
    Z: Sentinel<K> + Default,
    S: KeyHash<K> + Default,
    E: KeyEq<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, Z, S, E: KeyEq<K>> IntoIterator for &'a OpenHashMap<K, V, Z, S, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, Z, S, E: KeyEq<K>> IntoIterator for &'a mut OpenHashMap<K, V, Z, S, E> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, Z, S, E> IntoIterator for OpenHashMap<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, Z, S, E>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            raw: self.raw,
            cursor: 0,
        }
    }
}

/// Owning iterator in slot order. Entries not yet yielded are dropped with
/// the iterator.
pub struct IntoIter<K, V, Z, S, E> {
    raw: RawTable<K, V, Z, S, E>,
    cursor: usize,
}

impl<K, V, Z, S, E> Iterator for IntoIter<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.raw.take_next(&mut self.cursor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len(), Some(self.raw.len()))
    }
}

impl<K, V, Z, S, E> ExactSizeIterator for IntoIter<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
}

impl<K, V, Z, S, E> FusedIterator for IntoIter<K, V, Z, S, E>
where
    Z: Sentinel<K>,
    S: KeyHash<K>,
    E: KeyEq<K>,
{
}

/// Iterator over keys in slot order.
pub struct Keys<'a, K, V, E> {
    inner: Iter<'a, K, V, E>,
}

impl<'a, K, V, E: KeyEq<K>> Iterator for Keys<'a, K, V, E> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, E: KeyEq<K>> ExactSizeIterator for Keys<'_, K, V, E> {}

/// Iterator over values in slot order.
pub struct Values<'a, K, V, E> {
    inner: Iter<'a, K, V, E>,
}

impl<'a, K, V, E: KeyEq<K>> Iterator for Values<'a, K, V, E> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, E: KeyEq<K>> ExactSizeIterator for Values<'_, K, V, E> {}

pub struct ValuesMut<'a, K, V, E> {
    inner: IterMut<'a, K, V, E>,
}

impl<'a, K, V, E: KeyEq<K>> Iterator for ValuesMut<'a, K, V, E> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, E: KeyEq<K>> ExactSizeIterator for ValuesMut<'_, K, V, E> {}
