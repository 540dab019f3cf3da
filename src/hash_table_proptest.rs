#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check the
// slot layout directly.

use crate::hash_table::HashTable;
use crate::slot::Slot;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hasher;

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

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Erase(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            4 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::Get),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Structural invariants of the slot buffer:
// - occupied slot count equals `len()`, tombstone count matches the tracker;
// - `len() < capacity()` once storage exists;
// - every stored key is found by probing at the slot it occupies;
// - at least one slot is empty, so a miss terminates before wrapping.
fn check_layout<K, V, S>(t: &HashTable<K, V, S>) -> Result<(), TestCaseError>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    let slots = t.slots.as_slice();
    let occupied = slots.iter().filter(|s| s.is_occupied()).count();
    let deleted = slots.iter().filter(|s| matches!(s, Slot::Deleted)).count();
    prop_assert_eq!(occupied, t.len());
    prop_assert_eq!(deleted, t.tombstones);
    if t.capacity() > 0 {
        prop_assert!(t.len() < t.capacity());
        prop_assert!(slots.iter().any(|s| matches!(s, Slot::Empty)));
    }
    for (i, slot) in slots.iter().enumerate() {
        if let Some(e) = slot.entry() {
            prop_assert_eq!(t.find_index(&e.key), Some(i));
        }
    }
    Ok(())
}

macro_rules! state_machine_body {
    ($sut:expr, $pool:expr, $ops:expr) => {{
        let mut sut = $sut;
        let mut model: HashMap<Key, i32> = HashMap::new();
        for op in $ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = key_from(&$pool, i);
                    let prev = sut.insert(k.clone(), v).expect("growth allocation");
                    prop_assert_eq!(prev, model.insert(k, v));
                }
                OpI::Erase(i) => {
                    let k = key_from(&$pool, i);
                    prop_assert_eq!(sut.erase(&k), model.remove(&k).is_some());
                }
                OpI::Get(i) => {
                    let k = key_from(&$pool, i);
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                    prop_assert_eq!(sut.at(&k).ok(), model.get(&k));
                }
                OpI::Contains(s) => {
                    let has = sut.contains_key(s.as_str());
                    let has_model = model.keys().any(|k| k.0 == s);
                    prop_assert_eq!(has, has_model);
                }
                OpI::Mutate(i, d) => {
                    let k = key_from(&$pool, i);
                    if let Some(vr) = sut.get_mut(&k) {
                        *vr = vr.saturating_add(d);
                        let mv = model.get_mut(&k).expect("present in model");
                        *mv = mv.saturating_add(d);
                    } else {
                        prop_assert!(!model.contains_key(&k));
                    }
                }
                OpI::Iterate => {
                    prop_assert_eq!(sut.iter().len(), model.len());
                    let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                    let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                    prop_assert_eq!(s_keys, m_keys);
                    for (k, v) in sut.iter() {
                        prop_assert_eq!(model.get(k), Some(v));
                    }
                }
                OpI::Clear => {
                    let capacity = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), capacity);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            check_layout(&sut)?;
        }
    }};
}

// Property: State-machine equivalence against hashbrown::HashMap, with the
// slot layout checked after every operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: HashTable<Key, i32> = HashTable::new();
        state_machine_body!(sut, pool, ops);
    }

    #[test]
    fn prop_state_machine_preallocated((pool, ops) in arb_scenario(), capacity in 0usize..32) {
        let sut: HashTable<Key, i32> = HashTable::with_capacity(capacity);
        state_machine_body!(sut, pool, ops);
    }
}

// Collision variant using a constant hasher to stress equality resolution.
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

// Property: Same invariants as above under worst-case collision behavior.
// Every key shares one probe chain, so erases in the middle of the chain
// must leave later keys reachable.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut: HashTable<Key, i32, ConstBuildHasher> = HashTable::with_hasher(ConstBuildHasher);
        state_machine_body!(sut, pool, ops);
    }
}
