#![cfg(test)]

// Property tests for BucketTable kept inside the crate so they can reach
// the structural layer and its invariant checker directly.

use crate::bucket_table::BucketTable;
use hashbrown::hash_map::DefaultHashBuilder;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, String),
    Remove(usize),
    Get(usize),
    Contains(String),
    Reserve(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z.]{1,6}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), "[ -~]{0,8}").prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            3 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z.]{1,6}"].prop_map(OpI::Contains),
            1 => (0usize..40).prop_map(OpI::Reserve),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run<S>(sut: &mut BucketTable<S>, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone + Default,
{
    let mut model: HashMap<String, String> = HashMap::new();
    for op in ops {
        let buckets_before = sut.bucket_count();
        match op {
            OpI::Insert(i, v) => {
                let k = &pool[i];
                let prev = sut.insert(k, v.clone()).expect("growth must succeed");
                prop_assert_eq!(prev, model.insert(k.clone(), v));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k).map(String::as_str));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Reserve(n) => {
                sut.reserve(n).expect("growth must succeed");
                prop_assert!(sut.len() + n <= sut.capacity_limit());
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.to_string()).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        // 1) The bucket array never shrinks
        prop_assert!(sut.bucket_count() >= buckets_before);
        // 2) Size parity and structural consistency
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.iter().count(), model.len());
        sut.assert_consistent();
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert returns the previous value exactly when the model had one.
// - get/contains_key/remove agree with the model, including absent keys.
// - growth keeps every entry routed to `hash % bucket_count`.
// - len equals the sum of chain lengths; clear keeps the bucket array.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: BucketTable = BucketTable::with_hasher(2, 1, DefaultHashBuilder::default());
        run(&mut sut, &pool, ops)?;
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

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every entry shares one chain, so
// lookups can only succeed through key equality.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: BucketTable<ConstBuildHasher> = BucketTable::with_hasher(2, 1, ConstBuildHasher);
        run(&mut sut, &pool, ops)?;
    }
}
