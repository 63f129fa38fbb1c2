//! BucketTable: structural layer with explicit bucket chains and manual growth.
//!
//! Entries live in a generational slot arena; each bucket is a chain of
//! entry ids in tail-append order. The per-entry hash is computed once on
//! insertion and every later routing decision (lookup, growth) uses the
//! cached value.

use core::hash::BuildHasher;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational id of an entry in the slot arena.
    pub(crate) struct EntryId;
}

#[derive(Debug)]
struct Entry {
    key: String,
    value: String,
    hash: u64,
}

pub(crate) struct BucketTable<S = DefaultHashBuilder> {
    hasher: S,
    buckets: Vec<Vec<EntryId>>,
    slots: SlotMap<EntryId, Entry>, // storage using generational keys
    limit: usize,
}

/// The bucket array could not be reallocated to `requested` buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GrowError {
    pub requested: usize,
}

/// Position of a live entry: bucket index, index within the chain, id.
#[derive(Clone, Copy, Debug)]
struct Slot {
    bucket: usize,
    pos: usize,
    id: EntryId,
}

/// Iterator over entries in bucket order.
pub struct Iter<'a> {
    buckets: core::slice::Iter<'a, Vec<EntryId>>,
    chain: core::slice::Iter<'a, EntryId>,
    slots: &'a SlotMap<EntryId, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.chain.next() {
                if let Some(e) = self.slots.get(*id) {
                    return Some((e.key.as_str(), e.value.as_str()));
                }
                continue;
            }
            self.chain = self.buckets.next()?.iter();
        }
    }
}

impl<S> BucketTable<S>
where
    S: BuildHasher + Clone + Default,
{
    /// `buckets` and `limit` must both be at least one.
    pub(crate) fn with_hasher(buckets: usize, limit: usize, hasher: S) -> Self {
        debug_assert!(buckets > 0 && limit > 0);
        Self {
            hasher,
            buckets: (0..buckets).map(|_| Vec::new()).collect(),
            slots: SlotMap::with_key(),
            limit,
        }
    }

    fn make_hash(&self, key: &str) -> u64 {
        self.hasher.hash_one(key)
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn capacity_limit(&self) -> usize {
        self.limit
    }

    fn locate(&self, hash: u64, key: &str) -> Option<Slot> {
        let bucket = self.bucket_of(hash);
        self.buckets[bucket]
            .iter()
            .position(|&id| {
                self.slots
                    .get(id)
                    .map(|e| e.hash == hash && e.key == key)
                    .unwrap_or(false)
            })
            .map(|pos| Slot {
                bucket,
                pos,
                id: self.buckets[bucket][pos],
            })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        let slot = self.locate(self.make_hash(key), key)?;
        self.slots.get(slot.id).map(|e| e.value.as_str())
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.locate(self.make_hash(key), key).is_some()
    }

    /// Replace the value of an existing key, or append a new entry at the
    /// tail of its chain. Growth runs before a new entry is linked.
    pub(crate) fn insert(&mut self, key: &str, value: String) -> Result<Option<String>, GrowError> {
        let hash = self.make_hash(key);
        if let Some(slot) = self.locate(hash, key) {
            if let Some(e) = self.slots.get_mut(slot.id) {
                return Ok(Some(core::mem::replace(&mut e.value, value)));
            }
        }

        self.reserve(1)?;
        let id = self.slots.insert(Entry {
            key: key.to_owned(),
            value,
            hash,
        });
        let bucket = self.bucket_of(hash);
        self.buckets[bucket].push(id);
        Ok(None)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        let slot = self.locate(self.make_hash(key), key)?;
        self.buckets[slot.bucket].remove(slot.pos);
        self.slots.remove(slot.id).map(|e| e.value)
    }

    /// Drop every entry; the bucket array keeps its current size.
    pub(crate) fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.slots.clear();
    }

    /// Grow until `additional` more entries fit under the capacity limit.
    /// Each step doubles both the bucket count and the limit.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), GrowError> {
        let needed = self.len().saturating_add(additional);
        let mut buckets = self.buckets.len();
        let mut limit = self.limit;
        while needed > limit {
            buckets = buckets.checked_mul(2).ok_or(GrowError {
                requested: usize::MAX,
            })?;
            limit = limit.saturating_mul(2);
        }
        if buckets != self.buckets.len() {
            self.rehash(buckets, limit)?;
        }
        Ok(())
    }

    /// Relink every entry into a fresh array of `count` buckets.
    ///
    /// All allocation happens before the live table is touched, so a
    /// failure leaves the old array and every entry as they were.
    fn rehash(&mut self, count: usize, limit: usize) -> Result<(), GrowError> {
        let err = GrowError { requested: count };
        let route = |hash: u64| (hash % count as u64) as usize;

        let mut chain_lens: Vec<usize> = Vec::new();
        chain_lens.try_reserve_exact(count).map_err(|_| err)?;
        chain_lens.resize(count, 0);
        for e in self.slots.values() {
            chain_lens[route(e.hash)] += 1;
        }

        let mut fresh: Vec<Vec<EntryId>> = Vec::new();
        fresh.try_reserve_exact(count).map_err(|_| err)?;
        for len in chain_lens {
            let mut chain = Vec::new();
            chain.try_reserve_exact(len).map_err(|_| err)?;
            fresh.push(chain);
        }

        // Walk the old chains in order so relative chain order survives.
        for &id in self.buckets.iter().flatten() {
            if let Some(e) = self.slots.get(id) {
                fresh[route(e.hash)].push(id);
            }
        }

        self.buckets = fresh;
        self.limit = limit;
        Ok(())
    }

    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets.iter(),
            chain: (&[] as &[EntryId]).iter(),
            slots: &self.slots,
        }
    }

    #[cfg(test)]
    pub(crate) fn chain_keys(&self, bucket: usize) -> Vec<&str> {
        self.buckets[bucket]
            .iter()
            .filter_map(|&id| self.slots.get(id).map(|e| e.key.as_str()))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn bucket_index_of(&self, key: &str) -> Option<usize> {
        self.locate(self.make_hash(key), key).map(|s| s.bucket)
    }

    /// Check the structural invariants: every chained id resolves, routes
    /// to its own bucket by cached hash, and chain lengths sum to `len`.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = std::collections::HashSet::new();
        let mut total = 0usize;
        for (i, chain) in self.buckets.iter().enumerate() {
            for &id in chain {
                let e = self.slots.get(id).expect("chained id must resolve");
                assert_eq!(self.bucket_of(e.hash), i, "entry routed to wrong bucket");
                assert_eq!(e.hash, self.make_hash(&e.key), "cached hash drifted");
                assert!(seen.insert(e.key.clone()), "duplicate key in table");
                total += 1;
            }
        }
        assert_eq!(total, self.slots.len());
        assert!(self.len() <= self.limit);
    }
}
