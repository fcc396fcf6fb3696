//! Fixed-bucket chained hash map over external storage.
//!
//! The bucket array is sized once at construction and never grows:
//! this is a table for key sets whose cardinality is known up front
//! (symbol tables, id registries), trading rehash machinery for a
//! single allocation and fully predictable inserts. Each bucket is an
//! independent singly-linked chain threaded through [`HashNode`]s held
//! in caller-provided storage.
//!
//! Inserts prepend to the chain, so they are O(1) and duplicate keys
//! are permitted; the most recently inserted node shadows older ones
//! in [`FixedHashMap::find`]. Removal re-derives the bucket from the
//! node's stored key and walks the chain for the predecessor, which
//! costs O(chain) but keeps a back link out of every node.
//!
//! # Example
//!
//! ```
//! use anchor_collections::{BoxedHashStorage, FixedHashMap};
//!
//! let mut storage: BoxedHashStorage<u64, &str> = BoxedHashStorage::with_capacity(64);
//! let mut map: FixedHashMap<u64, &str, _> = FixedHashMap::with_buckets(16);
//!
//! map.try_insert(&mut storage, 7, "seven").unwrap();
//! map.try_insert(&mut storage, 8, "eight").unwrap();
//!
//! assert_eq!(map.get(&storage, &7), Some(&"seven"));
//! assert_eq!(map.remove(&mut storage, &7), Some("seven"));
//! assert_eq!(map.get(&storage, &7), None);
//! ```

use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use crate::{BoundedStorage, BoxedStorage, Full, Key, Storage, UnboundedStorage};

/// Type alias for bounded hash-map storage backed by [`BoxedStorage`].
pub type BoxedHashStorage<K, V, Idx = u32> = BoxedStorage<HashNode<K, V, Idx>, Idx>;

/// Type alias for unbounded hash-map storage backed by `slab::Slab`.
#[cfg(feature = "slab")]
pub type SlabHashStorage<K, V> = slab::Slab<HashNode<K, V, usize>>;

/// A node in a hash chain: the user value together with its lookup key
/// and the single forward link.
#[derive(Debug, Clone)]
pub struct HashNode<K, V, Idx: Key = u32> {
    /// The lookup key.
    pub key: K,
    /// The value associated with this key.
    pub value: V,
    next: Idx,
}

impl<K, V, Idx: Key> HashNode<K, V, Idx> {
    #[inline]
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            next: Idx::NONE,
        }
    }
}

/// A chained hash map with a fixed number of buckets.
///
/// # Type Parameters
///
/// - `K`: Key type, must implement `Hash + Eq`
/// - `V`: Value type
/// - `S`: Storage type (e.g. [`BoxedHashStorage<K, V>`])
/// - `Idx`: Key type for storage indices, defaults to `u32`
/// - `H`: Hasher factory, defaults to `ahash::RandomState`
#[derive(Debug)]
pub struct FixedHashMap<K, V, S, Idx = u32, H = ahash::RandomState>
where
    Idx: Key,
{
    /// Chain head per bucket, `Idx::NONE` for an empty bucket.
    buckets: Box<[Idx]>,
    len: usize,
    hasher: H,
    _marker: PhantomData<(K, V, S)>,
}

impl<K, V, S, Idx, H> FixedHashMap<K, V, S, Idx, H>
where
    K: Hash + Eq,
    Idx: Key,
    H: BuildHasher,
    S: Storage<HashNode<K, V, Idx>, Key = Idx>,
{
    /// Creates a map with `bucket_count` buckets and a default hasher.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is 0.
    pub fn with_buckets(bucket_count: usize) -> Self
    where
        H: Default,
    {
        Self::with_hasher(bucket_count, H::default())
    }

    /// Creates a map with `bucket_count` buckets and the given hasher.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is 0.
    pub fn with_hasher(bucket_count: usize, hasher: H) -> Self {
        assert!(bucket_count > 0, "bucket count must be > 0");
        Self {
            buckets: vec![Idx::NONE; bucket_count].into_boxed_slice(),
            len: 0,
            hasher,
            _marker: PhantomData,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the fixed bucket count.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Exchanges the contents of two maps.
    ///
    /// O(1): the bucket arrays, hashers, and counters move; no node is
    /// touched. Both maps must be backed by the same storage.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Forgets all entries without touching their links. O(buckets).
    ///
    /// Node links become stale; only use this when the nodes are about
    /// to be discarded along with their storage.
    pub fn reset(&mut self) {
        self.buckets.fill(Idx::NONE);
        self.len = 0;
    }

    #[inline]
    fn bucket_of(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    /// Finds the index of the node for `key`, or `None` if absent.
    ///
    /// O(chain length). With duplicate keys, the most recently
    /// inserted node is returned.
    pub fn find(&self, storage: &S, key: &K) -> Option<Idx> {
        let mut idx = self.buckets[self.bucket_of(key)];
        while idx.is_some() {
            let node = storage.get(idx).expect("invalid index");
            if node.key == *key {
                return Some(idx);
            }
            idx = node.next;
        }
        None
    }

    /// Returns `true` if the map contains `key`.
    #[inline]
    pub fn contains_key(&self, storage: &S, key: &K) -> bool {
        self.find(storage, key).is_some()
    }

    /// Returns a reference to the value for `key`, or `None` if absent.
    #[inline]
    pub fn get<'a>(&self, storage: &'a S, key: &K) -> Option<&'a V>
    where
        K: 'a,
        V: 'a,
        Idx: 'a,
    {
        let idx = self.find(storage, key)?;
        Some(&storage.get(idx).expect("invalid index").value)
    }

    /// Returns a mutable reference to the value for `key`.
    #[inline]
    pub fn get_mut<'a>(&self, storage: &'a mut S, key: &K) -> Option<&'a mut V>
    where
        K: 'a,
        V: 'a,
        Idx: 'a,
    {
        let idx = self.find(storage, key)?;
        Some(&mut storage.get_mut(idx).expect("invalid index").value)
    }

    fn link(&mut self, storage: &mut S, idx: Idx) {
        let bucket = self.bucket_of(&storage.get(idx).expect("invalid index").key);
        let head = self.buckets[bucket];
        storage.get_mut(idx).expect("invalid index").next = head;
        self.buckets[bucket] = idx;
        self.len += 1;
    }

    /// Removes the node at `idx` and returns its key and value.
    ///
    /// O(chain length): the bucket is re-derived from the stored key
    /// and the chain walked for the predecessor. Returns `None` if
    /// `idx` is not a live storage key.
    ///
    /// # Panics
    ///
    /// Panics if the node exists in storage but is not linked into
    /// this map (precondition violation).
    pub fn remove_at(&mut self, storage: &mut S, idx: Idx) -> Option<(K, V)> {
        let bucket = self.bucket_of(&storage.get(idx)?.key);

        let mut cur = self.buckets[bucket];
        if cur == idx {
            self.buckets[bucket] = storage.get(idx).expect("invalid index").next;
        } else {
            loop {
                assert!(cur.is_some(), "record not linked into this map");
                let next = storage.get(cur).expect("invalid index").next;
                if next == idx {
                    let after = storage.get(idx).expect("invalid index").next;
                    storage.get_mut(cur).expect("invalid index").next = after;
                    break;
                }
                cur = next;
            }
        }

        self.len -= 1;
        let node = storage.remove(idx).expect("invalid index");
        Some((node.key, node.value))
    }

    /// Removes the entry for `key` and returns the value, or `None`.
    ///
    /// With duplicate keys only the most recently inserted entry is
    /// removed; older ones become visible again.
    pub fn remove(&mut self, storage: &mut S, key: &K) -> Option<V> {
        let idx = self.find(storage, key)?;
        self.remove_at(storage, idx).map(|(_, value)| value)
    }

    /// Removes all entries from the map and the storage.
    pub fn clear(&mut self, storage: &mut S) {
        for bucket in 0..self.buckets.len() {
            let mut idx = self.buckets[bucket];
            while idx.is_some() {
                let next = storage.get(idx).expect("invalid index").next;
                storage.remove(idx);
                idx = next;
            }
            self.buckets[bucket] = Idx::NONE;
        }
        self.len = 0;
    }

    /// Returns the first node index in bucket-then-chain order.
    ///
    /// Together with [`FixedHashMap::next_index`] this walks the whole
    /// table. The order is arbitrary; use it for bulk scans and
    /// teardown, not as an access path. Keep an extra [`List`]
    /// threaded through the records when ordered iteration matters.
    ///
    /// [`List`]: crate::List
    pub fn first_index(&self) -> Idx {
        for &head in self.buckets.iter() {
            if head.is_some() {
                return head;
            }
        }
        Idx::NONE
    }

    /// Returns the node index after `idx` in bucket-then-chain order.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    pub fn next_index(&self, storage: &S, idx: Idx) -> Idx {
        let node = storage.get(idx).expect("invalid index");
        if node.next.is_some() {
            return node.next;
        }

        for bucket in self.bucket_of(&node.key) + 1..self.buckets.len() {
            if self.buckets[bucket].is_some() {
                return self.buckets[bucket];
            }
        }
        Idx::NONE
    }

    /// Returns an iterator over `(&K, &V)` in bucket-then-chain order.
    #[inline]
    pub fn iter<'a>(&'a self, storage: &'a S) -> Iter<'a, K, V, S, Idx, H> {
        Iter {
            map: self,
            storage,
            current: self.first_index(),
        }
    }

    /// Checks the structural invariants, panicking on any violation.
    ///
    /// Verifies that every node sits in the bucket its key hashes to
    /// and that the chains hold exactly `len` nodes. For tests.
    pub fn validate(&self, storage: &S) {
        let mut count = 0usize;
        for (bucket, &head) in self.buckets.iter().enumerate() {
            let mut idx = head;
            while idx.is_some() {
                let node = storage.get(idx).expect("chained record not in storage");
                assert_eq!(
                    self.bucket_of(&node.key),
                    bucket,
                    "record stored in the wrong bucket"
                );
                count += 1;
                idx = node.next;
            }
        }
        assert_eq!(count, self.len, "chain count disagrees with len");
    }
}

// =============================================================================
// Bounded storage impl
// =============================================================================

impl<K, V, S, Idx, H> FixedHashMap<K, V, S, Idx, H>
where
    K: Hash + Eq,
    Idx: Key,
    H: BuildHasher,
    S: BoundedStorage<HashNode<K, V, Idx>, Key = Idx>,
{
    /// Inserts a key-value pair, prepending to its bucket chain.
    ///
    /// O(1). Duplicate keys are permitted; the new entry shadows any
    /// older entry with the same key until it is removed.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full((key, value)))` if storage is full.
    pub fn try_insert(&mut self, storage: &mut S, key: K, value: V) -> Result<Idx, Full<(K, V)>> {
        let idx = match storage.try_insert(HashNode::new(key, value)) {
            Ok(idx) => idx,
            Err(Full(node)) => return Err(Full((node.key, node.value))),
        };
        self.link(storage, idx);
        Ok(idx)
    }
}

// =============================================================================
// Unbounded storage impl
// =============================================================================

impl<K, V, S, Idx, H> FixedHashMap<K, V, S, Idx, H>
where
    K: Hash + Eq,
    Idx: Key,
    H: BuildHasher,
    S: UnboundedStorage<HashNode<K, V, Idx>, Key = Idx>,
{
    /// Inserts a key-value pair, prepending to its bucket chain. O(1).
    ///
    /// Duplicate keys are permitted; the new entry shadows any older
    /// entry with the same key until it is removed.
    pub fn insert(&mut self, storage: &mut S, key: K, value: V) -> Idx {
        let idx = storage.insert(HashNode::new(key, value));
        self.link(storage, idx);
        idx
    }
}

/// Iterator over map entries in bucket-then-chain order.
pub struct Iter<'a, K, V, S, Idx, H>
where
    K: Hash + Eq,
    Idx: Key,
    H: BuildHasher,
    S: Storage<HashNode<K, V, Idx>, Key = Idx>,
{
    map: &'a FixedHashMap<K, V, S, Idx, H>,
    storage: &'a S,
    current: Idx,
}

impl<'a, K, V, S, Idx, H> Iterator for Iter<'a, K, V, S, Idx, H>
where
    K: Hash + Eq + 'a,
    V: 'a,
    Idx: Key + 'a,
    H: BuildHasher,
    S: Storage<HashNode<K, V, Idx>, Key = Idx>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.current.is_none() {
            return None;
        }
        let node = self.storage.get(self.current).expect("invalid index");
        self.current = self.map.next_index(self.storage, self.current);
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;

    /// Hashes an integer to itself, so `key % bucket_count` picks the
    /// bucket directly. Test-only.
    #[derive(Default)]
    struct Identity;

    struct IdentityHasher(u64);

    impl BuildHasher for Identity {
        type Hasher = IdentityHasher;

        fn build_hasher(&self) -> IdentityHasher {
            IdentityHasher(0)
        }
    }

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }

        fn write_u32(&mut self, i: u32) {
            self.0 = u64::from(i);
        }

        fn write_u64(&mut self, i: u64) {
            self.0 = i;
        }
    }

    type Map = FixedHashMap<u64, u64, BoxedHashStorage<u64, u64>, u32, Identity>;

    #[test]
    fn insert_find_remove() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(32);
        let mut map: Map = Map::with_buckets(8);

        map.try_insert(&mut storage, 1, 10).unwrap();
        map.try_insert(&mut storage, 2, 20).unwrap();
        map.validate(&storage);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&storage, &1), Some(&10));
        assert_eq!(map.get(&storage, &2), Some(&20));
        assert_eq!(map.get(&storage, &3), None);

        assert_eq!(map.remove(&mut storage, &1), Some(10));
        map.validate(&storage);
        assert_eq!(map.get(&storage, &1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn colliding_keys_share_a_bucket() {
        // 4 buckets, identity hash: 0, 4, 8 all land in bucket 0.
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(16);
        let mut map: Map = Map::with_buckets(4);

        map.try_insert(&mut storage, 0, 100).unwrap();
        map.try_insert(&mut storage, 4, 104).unwrap();
        let at_8 = map.try_insert(&mut storage, 8, 108).unwrap();
        map.validate(&storage);

        let found = map.find(&storage, &4).unwrap();
        assert_eq!(storage.get(found).unwrap().value, 104);

        map.remove_at(&mut storage, found);
        map.validate(&storage);

        assert_eq!(map.find(&storage, &4), None);
        assert_eq!(map.get(&storage, &0), Some(&100));
        assert_eq!(map.get(&storage, &8), Some(&108));
        assert_eq!(map.find(&storage, &8), Some(at_8));
    }

    #[test]
    fn duplicate_keys_newest_wins() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(16);
        let mut map: Map = Map::with_buckets(4);

        map.try_insert(&mut storage, 5, 1).unwrap();
        map.try_insert(&mut storage, 5, 2).unwrap();

        assert_eq!(map.get(&storage, &5), Some(&2));
        assert_eq!(map.len(), 2);

        // Removing the newest uncovers the older entry.
        assert_eq!(map.remove(&mut storage, &5), Some(2));
        assert_eq!(map.get(&storage, &5), Some(&1));
        map.validate(&storage);
    }

    #[test]
    fn remove_chain_middle_and_tail() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(16);
        let mut map: Map = Map::with_buckets(1); // everything in one chain

        let keys: Vec<u32> = (0..5)
            .map(|k| map.try_insert(&mut storage, k, k * 10).unwrap())
            .collect();

        // Chain order is reverse insertion: 4, 3, 2, 1, 0.
        map.remove_at(&mut storage, keys[2]); // middle
        map.validate(&storage);
        map.remove_at(&mut storage, keys[0]); // chain tail
        map.validate(&storage);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&storage, &2), None);
        assert_eq!(map.get(&storage, &0), None);
        for k in [1u64, 3, 4] {
            assert_eq!(map.get(&storage, &k), Some(&(k * 10)));
        }
    }

    #[test]
    fn len_is_inserts_minus_removes() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(64);
        let mut map: Map = Map::with_buckets(8);

        for k in 0..20 {
            map.try_insert(&mut storage, k, k).unwrap();
        }
        for k in (0..20).step_by(2) {
            map.remove(&mut storage, &k);
        }

        assert_eq!(map.len(), 10);
        map.validate(&storage);

        for k in 0..20 {
            assert_eq!(map.contains_key(&storage, &k), k % 2 == 1);
        }
    }

    #[test]
    fn full_storage_returns_pair() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(1);
        let mut map: Map = Map::with_buckets(4);

        map.try_insert(&mut storage, 1, 10).unwrap();
        let err = map.try_insert(&mut storage, 2, 20).unwrap_err();
        assert_eq!(err.into_inner(), (2, 20));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn whole_table_iteration_visits_everything() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(32);
        let mut map: Map = Map::with_buckets(4);

        for k in 0..10 {
            map.try_insert(&mut storage, k, k).unwrap();
        }

        let mut seen: Vec<u64> = map.iter(&storage).map(|(k, _)| *k).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        // Manual first/next walk agrees with the iterator count.
        let mut count = 0;
        let mut idx = map.first_index();
        while idx.is_some() {
            count += 1;
            idx = map.next_index(&storage, idx);
        }
        assert_eq!(count, 10);
    }

    #[test]
    fn iteration_order_is_bucket_then_chain() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(16);
        let mut map: Map = Map::with_buckets(4);

        // Bucket 1 gets 1 then 5 (chain order 5, 1); bucket 3 gets 3.
        map.try_insert(&mut storage, 1, 0).unwrap();
        map.try_insert(&mut storage, 5, 0).unwrap();
        map.try_insert(&mut storage, 3, 0).unwrap();

        let keys: Vec<u64> = map.iter(&storage).map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![5, 1, 3]);
    }

    #[test]
    fn clear_empties_map_and_storage() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(16);
        let mut map: Map = Map::with_buckets(4);

        for k in 0..8 {
            map.try_insert(&mut storage, k, k).unwrap();
        }

        map.clear(&mut storage);
        assert!(map.is_empty());
        assert!(storage.is_empty());
        assert!(map.first_index().is_none());
        map.validate(&storage);
    }

    #[test]
    fn swap_exchanges_tables() {
        let mut storage: BoxedHashStorage<u64, u64> = BoxedHashStorage::with_capacity(16);
        let mut map_a: Map = Map::with_buckets(4);
        let mut map_b: Map = Map::with_buckets(4);

        map_a.try_insert(&mut storage, 1, 10).unwrap();
        map_b.try_insert(&mut storage, 2, 20).unwrap();
        map_b.try_insert(&mut storage, 3, 30).unwrap();

        map_a.swap(&mut map_b);

        assert_eq!(map_a.len(), 2);
        assert_eq!(map_b.len(), 1);
        assert_eq!(map_a.get(&storage, &2), Some(&20));
        assert_eq!(map_b.get(&storage, &1), Some(&10));
        map_a.validate(&storage);
        map_b.validate(&storage);
    }

    #[test]
    fn default_hasher_works() {
        let mut storage: BoxedHashStorage<String, u64> = BoxedHashStorage::with_capacity(16);
        let mut map: FixedHashMap<String, u64, _> = FixedHashMap::with_buckets(8);

        map.try_insert(&mut storage, "alpha".to_string(), 1).unwrap();
        map.try_insert(&mut storage, "beta".to_string(), 2).unwrap();

        assert_eq!(map.get(&storage, &"alpha".to_string()), Some(&1));
        assert_eq!(map.get(&storage, &"gamma".to_string()), None);
        map.validate(&storage);
    }
}
