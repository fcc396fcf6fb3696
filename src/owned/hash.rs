//! OwnedHashMap - a fixed-bucket hash map that owns its storage.

use core::hash::{BuildHasher, Hash};

use crate::{hash, BoundedStorage, BoxedHashStorage, FixedHashMap, Full, Key, Storage};

/// A fixed-bucket chained hash map that owns its storage.
///
/// This is a convenience wrapper around [`FixedHashMap`] +
/// [`BoxedStorage`](crate::BoxedStorage) for cases where you don't need
/// to share storage across multiple containers. The bucket count equals
/// the capacity, so chains stay short until the map is near full.
///
/// # Example
///
/// ```
/// use anchor_collections::OwnedHashMap;
///
/// let mut symbols: OwnedHashMap<String, u64> = OwnedHashMap::with_capacity(100);
///
/// symbols.insert("main".to_string(), 0x1000).unwrap();
/// symbols.insert("init".to_string(), 0x2000).unwrap();
///
/// assert_eq!(symbols.get(&"main".to_string()), Some(&0x1000));
/// assert_eq!(symbols.remove(&"init".to_string()), Some(0x2000));
/// ```
pub struct OwnedHashMap<K, V, Idx = u32, H = ahash::RandomState>
where
    K: Hash + Eq,
    Idx: Key,
    H: BuildHasher,
{
    storage: BoxedHashStorage<K, V, Idx>,
    map: FixedHashMap<K, V, BoxedHashStorage<K, V, Idx>, Idx, H>,
}

impl<K, V, Idx, H> OwnedHashMap<K, V, Idx, H>
where
    K: Hash + Eq,
    Idx: Key,
    H: BuildHasher,
{
    /// Creates a map with `capacity` record slots and as many buckets.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or does not fit the index type.
    pub fn with_capacity(capacity: usize) -> Self
    where
        H: Default,
    {
        Self::with_buckets(capacity, capacity)
    }

    /// Creates a map with separately chosen bucket and slot counts.
    ///
    /// # Panics
    ///
    /// Panics if either count is 0 or `capacity` does not fit the
    /// index type.
    pub fn with_buckets(bucket_count: usize, capacity: usize) -> Self
    where
        H: Default,
    {
        Self {
            storage: BoxedHashStorage::with_capacity(capacity),
            map: FixedHashMap::with_buckets(bucket_count),
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the storage capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Returns the fixed bucket count.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.map.bucket_count()
    }

    /// Inserts a key-value pair.
    ///
    /// Duplicate keys are permitted; the new entry shadows older ones.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full((key, value)))` if storage is full.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Result<Idx, Full<(K, V)>> {
        self.map.try_insert(&mut self.storage, key, value)
    }

    /// Finds the index of the entry for `key`, or `None` if absent.
    #[inline]
    pub fn find(&self, key: &K) -> Option<Idx> {
        self.map.find(&self.storage, key)
    }

    /// Returns `true` if the map contains `key`.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(&self.storage, key)
    }

    /// Returns a reference to the value for `key`, or `None` if absent.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(&self.storage, key)
    }

    /// Returns a mutable reference to the value for `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(&mut self.storage, key)
    }

    /// Returns the entry at `idx`, or `None` if the index is invalid.
    #[inline]
    pub fn get_at(&self, idx: Idx) -> Option<(&K, &V)> {
        let node = self.storage.get(idx)?;
        Some((&node.key, &node.value))
    }

    /// Removes the entry for `key` and returns the value, or `None`.
    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(&mut self.storage, key)
    }

    /// Removes the entry at `idx` and returns its key and value.
    ///
    /// Returns `None` if the index is invalid.
    #[inline]
    pub fn remove_at(&mut self, idx: Idx) -> Option<(K, V)> {
        self.map.remove_at(&mut self.storage, idx)
    }

    /// Removes all entries, dropping their keys and values.
    pub fn clear(&mut self) {
        self.map.reset();
        self.storage.clear();
    }

    /// Returns an iterator over `(&K, &V)` in bucket-then-chain order.
    #[inline]
    pub fn iter(&self) -> hash::Iter<'_, K, V, BoxedHashStorage<K, V, Idx>, Idx, H> {
        self.map.iter(&self.storage)
    }
}

impl<K, V, Idx, H> Default for OwnedHashMap<K, V, Idx, H>
where
    K: Hash + Eq,
    Idx: Key,
    H: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut map: OwnedHashMap<u64, &str> = OwnedHashMap::with_capacity(16);

        map.insert(1, "one").unwrap();
        map.insert(2, "two").unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.remove(&1), Some("one"));
        assert_eq!(map.get(&1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn get_mut_updates_value() {
        let mut map: OwnedHashMap<u64, u64> = OwnedHashMap::with_capacity(16);

        map.insert(1, 10).unwrap();
        *map.get_mut(&1).unwrap() = 20;
        assert_eq!(map.get(&1), Some(&20));
    }

    #[test]
    fn remove_at_returns_pair() {
        let mut map: OwnedHashMap<u64, &str> = OwnedHashMap::with_capacity(16);

        let idx = map.insert(7, "seven").unwrap();
        assert_eq!(map.get_at(idx), Some((&7, &"seven")));
        assert_eq!(map.remove_at(idx), Some((7, "seven")));
        assert_eq!(map.remove_at(idx), None);
        assert!(map.is_empty());
    }

    #[test]
    fn clear_drops_values() {
        use std::rc::Rc;

        let marker = Rc::new(());
        let mut map: OwnedHashMap<u64, Rc<()>> = OwnedHashMap::with_capacity(8);
        for k in 0..3 {
            map.insert(k, Rc::clone(&marker)).unwrap();
        }
        assert_eq!(Rc::strong_count(&marker), 4);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn full_returns_pair() {
        let mut map: OwnedHashMap<u64, u64> = OwnedHashMap::with_capacity(1);

        map.insert(1, 10).unwrap();
        let err = map.insert(2, 20).unwrap_err();
        assert_eq!(err.into_inner(), (2, 20));
    }

    #[test]
    fn iter_visits_everything() {
        let mut map: OwnedHashMap<u64, u64> = OwnedHashMap::with_capacity(16);
        for k in 0..10 {
            map.insert(k, k * 2).unwrap();
        }

        let mut entries: Vec<(u64, u64)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable();
        assert_eq!(entries, (0..10).map(|k| (k, k * 2)).collect::<Vec<_>>());
    }
}
