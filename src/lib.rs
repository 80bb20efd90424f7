//! sentinel-hashmap: an open-addressing hash map that marks empty slots
//! with a reserved key value instead of per-slot flags.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a flat, cache-friendly map with one allocation, no tombstones,
//!   and lookups by borrowed key views.
//! - Layers:
//!   - SlotStorage<K, V>: the slot array; every slot holds a key, empty
//!     slots hold the sentinel.
//!   - RawTable<K, V, Z, S, E>: linear probing, growth, backward-shift
//!     deletion; includes a debug-only reentrancy guard around every
//!     operation that calls user code.
//!   - OpenHashMap<K, V, Z, S, E>: public API (`get`, `at`,
//!     `get_or_default`, `insert`, `insert_or_assign`, `emplace`, `erase`,
//!     `rehash`, iteration).
//!
//! Policies
//! - `Z: Sentinel<K>` supplies the empty marker: [`Reserved`] (type's
//!   natural spare value), [`Const`], [`Literal`] or [`Transform`].
//! - `S: KeyHash<Q>` hashes stored keys and probe views alike; the default
//!   [`Hashing`] wraps any `BuildHasher`.
//! - `E: KeyEq<K, Q>` compares a stored key against a probe; the default
//!   [`Equivalence`] accepts any `Q: Equivalent<K>`, so a
//!   `OpenHashMap<String, _>` is queried with `&str` without allocating.
//!
//! Constraints
//! - Capacity is always a power of two and at least one slot stays empty,
//!   so every probe terminates.
//! - Occupancy is `!key_eq(slot.key, marker)`. A key equal to the sentinel
//!   must never be inserted (debug builds assert).
//! - Single-threaded: the reentrancy flag makes tables `!Sync`. They are
//!   `Send`, so a table can move between threads or sit behind a `Mutex`.
//!
//! Deletion
//! - Removing an entry vacates its slot and then walks the following run of
//!   occupied slots, moving back each entry whose probe path crossed the
//!   hole. The run is always left exactly as if the removed key had never
//!   been inserted.
//!
//! Growth and rehash
//! - An insert that would exceed `min(floor(capacity * max_load_factor),
//!   capacity - 1)` entries first doubles the capacity. `rehash(n)` and
//!   `reserve(n)` rebuild at the smallest power of two that satisfies both
//!   the request and the load bound. Rebuilds rehash every key and are
//!   logged at `debug` level.
//!
//! Notes and non-goals
//! - Iteration order is slot order; it is unrelated to insertion order and
//!   changes on rehash.
//! - Any mutation may move entries, so references into the map never
//!   outlive the borrow that produced them.
//! - No concurrent access, no persistence, no ordered traversal.

mod error;
pub mod open_hash_map;
#[cfg(test)]
mod open_hash_map_proptest;
mod params;
pub mod policy;
mod raw_table;
mod reentrancy;
pub mod sentinel;
mod slots;

// Public surface
pub use error::TableError;
pub use open_hash_map::{OpenHashMap, StringOpenHashMap};
pub use params::{TableParams, DEFAULT_CAPACITY, DEFAULT_MAX_LOAD_FACTOR};
pub use policy::{Equivalence, Equivalent, Hashing, KeyEq, KeyHash};
pub use raw_table::{Iter, IterMut};
pub use sentinel::{Const, Literal, Reserved, ReservedKey, Sentinel, Transform};
