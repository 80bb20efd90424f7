//! Hash and equality policies.
//!
//! Both traits are parameterized by the probe type `Q`, so one policy
//! object can hash and compare the stored key type `K` and any number of
//! borrowed views of it. Lookups go through `&Q` directly; nothing on the
//! read path builds an owned `K`.

use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

pub use hashbrown::Equivalent;

/// Hash policy for probe type `Q`.
///
/// For a stored key `k` and any `q` with `KeyEq::key_eq(k, q)`,
/// `hash_key(k) == hash_key(q)` must hold.
pub trait KeyHash<Q: ?Sized> {
    fn hash_key(&self, q: &Q) -> u64;
}

/// Equality policy between stored keys `K` and probe type `Q`.
pub trait KeyEq<K, Q: ?Sized = K> {
    fn key_eq(&self, stored: &K, probe: &Q) -> bool;
}

/// Default hash policy: any [`BuildHasher`] applied through `Q: Hash`.
#[derive(Clone, Debug, Default)]
pub struct Hashing<S = RandomState>(S);

impl<S> Hashing<S> {
    pub fn new(hasher: S) -> Self {
        Hashing(hasher)
    }

    pub fn hasher(&self) -> &S {
        &self.0
    }
}

impl<S, Q> KeyHash<Q> for Hashing<S>
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    #[inline]
    fn hash_key(&self, q: &Q) -> u64 {
        self.0.hash_one(q)
    }
}

/// Default, transparent equality policy.
///
/// Accepts every probe type implementing [`Equivalent<K>`], which includes
/// `K` itself and every `Q` that `K` borrows as (`String` → `str`,
/// `Vec<T>` → `[T]`, ...).
#[derive(Copy, Clone, Debug, Default)]
pub struct Equivalence;

impl<K, Q> KeyEq<K, Q> for Equivalence
where
    Q: ?Sized + Equivalent<K>,
{
    #[inline]
    fn key_eq(&self, stored: &K, probe: &Q) -> bool {
        probe.equivalent(stored)
    }
}
