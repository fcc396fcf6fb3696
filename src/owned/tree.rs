//! OwnedAvl - an ordered map that owns its storage.

use crate::{tree, AvlTree, BoundedStorage, BoxedTreeStorage, Full, Key, Storage};

/// An AVL tree that owns its storage.
///
/// This is a convenience wrapper around [`AvlTree`] +
/// [`BoxedStorage`](crate::BoxedStorage) for cases where you don't need
/// to share storage across multiple containers.
///
/// # Example
///
/// ```
/// use anchor_collections::OwnedAvl;
///
/// let mut map: OwnedAvl<u32, &str> = OwnedAvl::with_capacity(100);
///
/// map.insert(5, "five").unwrap();
/// map.insert(3, "three").unwrap();
/// map.insert(8, "eight").unwrap();
///
/// assert_eq!(map.get(&5), Some(&"five"));
///
/// // Floor query: greatest key at or below 7.
/// let idx = map.find_le(&7).unwrap();
/// assert_eq!(map.get_at(idx), Some((&5, &"five")));
/// ```
pub struct OwnedAvl<K: Ord, V, Idx: Key = u32> {
    storage: BoxedTreeStorage<K, V, Idx>,
    tree: AvlTree<K, V, BoxedTreeStorage<K, V, Idx>, Idx>,
}

impl<K: Ord, V, Idx: Key> OwnedAvl<K, V, Idx> {
    /// Creates a tree with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or does not fit the index type.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: BoxedTreeStorage::with_capacity(capacity),
            tree: AvlTree::new(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the tree is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the storage capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Inserts a key-value pair.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full((key, value)))` if storage is full.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Result<Idx, Full<(K, V)>> {
        self.tree.try_insert(&mut self.storage, key, value)
    }

    /// Finds the index of the entry for `key`, or `None` if absent.
    #[inline]
    pub fn find(&self, key: &K) -> Option<Idx> {
        self.tree.find(&self.storage, key)
    }

    /// Returns `true` if the tree contains `key`.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(&self.storage, key)
    }

    /// Returns a reference to the value for `key`, or `None` if absent.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(&self.storage, key)
    }

    /// Returns a mutable reference to the value for `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(&mut self.storage, key)
    }

    /// Returns the entry at `idx`, or `None` if the index is invalid.
    #[inline]
    pub fn get_at(&self, idx: Idx) -> Option<(&K, &V)> {
        let node = self.storage.get(idx)?;
        Some((&node.key, &node.value))
    }

    /// Greatest entry with a key strictly below `key`.
    #[inline]
    pub fn find_lt(&self, key: &K) -> Option<Idx> {
        self.tree.find_lt(&self.storage, key)
    }

    /// Smallest entry with a key strictly above `key`.
    #[inline]
    pub fn find_gt(&self, key: &K) -> Option<Idx> {
        self.tree.find_gt(&self.storage, key)
    }

    /// Entry for `key` if present, else the greatest entry below it.
    #[inline]
    pub fn find_le(&self, key: &K) -> Option<Idx> {
        self.tree.find_le(&self.storage, key)
    }

    /// Entry for `key` if present, else the smallest entry above it.
    #[inline]
    pub fn find_ge(&self, key: &K) -> Option<Idx> {
        self.tree.find_ge(&self.storage, key)
    }

    /// Returns the index of the smallest key, or `Idx::NONE` if empty.
    #[inline]
    pub fn first_index(&self) -> Idx {
        self.tree.first_index(&self.storage)
    }

    /// Returns the index of the largest key, or `Idx::NONE` if empty.
    #[inline]
    pub fn last_index(&self) -> Idx {
        self.tree.last_index(&self.storage)
    }

    /// Returns the in-order successor of `idx`, or `Idx::NONE`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a valid index.
    #[inline]
    pub fn next_index(&self, idx: Idx) -> Idx {
        self.tree.next_index(&self.storage, idx)
    }

    /// Returns the in-order predecessor of `idx`, or `Idx::NONE`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a valid index.
    #[inline]
    pub fn prev_index(&self, idx: Idx) -> Idx {
        self.tree.prev_index(&self.storage, idx)
    }

    /// Removes the entry for `key` and returns the value, or `None`.
    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.remove(&mut self.storage, key)
    }

    /// Removes the entry at `idx` and returns its key and value.
    ///
    /// Returns `None` if the index is invalid.
    #[inline]
    pub fn remove_at(&mut self, idx: Idx) -> Option<(K, V)> {
        self.tree.remove_at(&mut self.storage, idx)
    }

    /// Removes the smallest entry, or `None` if empty.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first(&mut self.storage)
    }

    /// Removes the largest entry, or `None` if empty.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last(&mut self.storage)
    }

    /// Removes all entries, dropping their keys and values.
    pub fn clear(&mut self) {
        self.tree.reset();
        self.storage.clear();
    }

    /// Returns an in-order iterator over `(&K, &V)`.
    #[inline]
    pub fn iter(&self) -> tree::Iter<'_, K, V, BoxedTreeStorage<K, V, Idx>, Idx> {
        self.tree.iter(&self.storage)
    }
}

impl<K: Ord, V, Idx: Key> Default for OwnedAvl<K, V, Idx> {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}
