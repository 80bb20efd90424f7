#![cfg(test)]

// Property tests for OpenHashMap kept inside the crate so they can check
// internal load-bound invariants.

use crate::open_hash_map::OpenHashMap;
use crate::params::usable_slots;
use crate::policy::{Hashing, KeyHash};
use crate::sentinel::{Reserved, ReservedKey};
use crate::TableError;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl ReservedKey for Key {
    fn reserved() -> Self {
        Key(String::new())
    }
}

// Pool-indexed operations: indices shrink to earlier keys, the pool
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Assign(usize, i32),
    Emplace(usize, i32),
    GetOrDefault(usize),
    Erase(usize),
    Remove(usize),
    Get(usize),
    At(usize),
    Contains(String),
    Mutate(usize, i32),
    Rehash(usize),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    // Keys are never empty: "" is the reserved marker for `Key`.
    proptest::collection::vec("[a-z]{1,4}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let write = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Assign(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Emplace(i, v)),
            1 => idx.clone().prop_map(OpI::GetOrDefault),
            3 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
        ];
        let read = prop_oneof![
            2 => idx.clone().prop_map(OpI::Get),
            1 => idx.clone().prop_map(OpI::At),
            1 => prop_oneof![contains_pool, "[a-z]{1,4}"].prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
        ];
        let rebuild = prop_oneof![
            (0usize..128).prop_map(OpI::Rehash),
            Just(OpI::Clear),
        ];
        let op = prop_oneof![18 => write, 5 => read, 1 => rebuild];
        proptest::collection::vec(op, 1..150).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S>(pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: KeyHash<Key> + KeyHash<str> + Default,
{
    let mut sut: OpenHashMap<Key, i32, Reserved, S> = OpenHashMap::new();
    let mut model: BTreeMap<Key, i32> = BTreeMap::new();
    let make_calls = Cell::new(0);

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let expect = *model.entry(k.clone()).or_insert(v);
                let (got, inserted) = sut.insert(k, v);
                prop_assert_eq!(*got, expect);
                prop_assert_eq!(inserted, !already, "inserted flag must report a new key");
            }
            OpI::Assign(i, v) => {
                let k = key_from(pool, i);
                model.insert(k.clone(), v);
                prop_assert_eq!(*sut.insert_or_assign(k, v), v);
            }
            OpI::Emplace(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let before = make_calls.get();
                let got = *sut.emplace(k.clone(), || {
                    make_calls.set(make_calls.get() + 1);
                    v
                });
                let expect = *model.entry(k).or_insert(v);
                prop_assert_eq!(got, expect);
                let ran = make_calls.get() - before;
                prop_assert_eq!(ran, usize::from(!already), "constructor runs only for new keys");
            }
            OpI::GetOrDefault(i) => {
                let k = key_from(pool, i);
                let expect = *model.entry(k.clone()).or_default();
                prop_assert_eq!(*sut.get_or_default(k), expect);
            }
            OpI::Erase(i) => {
                let k = key_from(pool, i);
                let expect = usize::from(model.remove(&k).is_some());
                prop_assert_eq!(sut.erase(k.0.as_str()), expect);
                prop_assert!(!sut.contains_key(k.0.as_str()));
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove_entry(&k), model.remove_entry(&k));
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(k.0.as_str()), model.get(&k));
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::At(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(v) => {
                        prop_assert_eq!(sut.at(&k), Ok(v));
                    }
                    None => {
                        prop_assert_eq!(sut.at(&k), Err(TableError::KeyNotFound));
                    }
                }
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(mv) = model.get_mut(&k) {
                    let sv = sut.get_mut(&k);
                    prop_assert!(sv.is_some(), "live key must resolve");
                    if let Some(sv) = sv {
                        *sv = sv.wrapping_add(d);
                    }
                    *mv = mv.wrapping_add(d);
                } else {
                    prop_assert!(sut.get_mut(&k).is_none());
                }
            }
            OpI::Rehash(n) => {
                sut.rehash(n);
                prop_assert!(sut.capacity() >= n);
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
            }
            OpI::Iterate => {
                let s_pairs: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(sut.iter().count(), sut.len(), "iteration yields each entry once");
                prop_assert_eq!(&s_pairs, &model);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let cap = sut.capacity();
        prop_assert!(cap.is_power_of_two());
        prop_assert!(sut.len() <= usable_slots(cap, sut.max_load_factor()));
    }

    // Every surviving key is still reachable along its probe path.
    for (k, v) in &model {
        prop_assert_eq!(sut.get(k.0.as_str()), Some(v));
    }
    let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
    let m_keys: BTreeSet<_> = model.keys().cloned().collect();
    prop_assert_eq!(s_keys, m_keys);
    Ok(())
}

// Property: State-machine equivalence against std::collections::BTreeMap.
// Invariants exercised across random operation sequences:
// - `insert` keeps the first value; `insert_or_assign` overwrites.
// - `emplace` runs its constructor exactly when the key is new.
// - `erase`/`remove_entry` parity; erased keys are no longer found, so
//   backward shifting never strands a displaced entry.
// - Borrowed (`&str`) and owned lookups agree.
// - Capacity stays a power of two and the load bound holds after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario::<Hashing>(&pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution
// and backward shifting along one long run.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Low-entropy variant: only 3 hash bits, so runs wrap and interleave.
#[derive(Clone, Default)]
struct NarrowBuildHasher;
struct NarrowHasher(u64);
impl BuildHasher for NarrowBuildHasher {
    type Hasher = NarrowHasher;
    fn build_hasher(&self) -> Self::Hasher {
        NarrowHasher(0)
    }
}
impl Hasher for NarrowHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.wrapping_add(*b as u64);
        }
    }
    fn finish(&self) -> u64 {
        // Land near the end of the table so probes wrap to slot 0.
        (self.0 & 0x7).wrapping_neg()
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_collisions((pool, ops) in arb_scenario()) {
        run_scenario::<Hashing<ConstBuildHasher>>(&pool, ops)?;
    }

    #[test]
    fn prop_state_machine_wrapping((pool, ops) in arb_scenario()) {
        run_scenario::<Hashing<NarrowBuildHasher>>(&pool, ops)?;
    }
}
