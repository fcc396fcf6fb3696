//! Storage traits and the built-in fixed-capacity slab.
//!
//! Storage owns the records; containers coordinate keys into it. A key
//! stays valid until the record is explicitly removed, and removed slots
//! are reused by later inserts.
//!
//! Bounded and unbounded storage get different insert APIs:
//!
//! ```text
//! Storage<T>              base: get, get_mut, remove, len
//!     ├── BoundedStorage<T>    fixed capacity, try_insert -> Result
//!     └── UnboundedStorage<T>  growable, insert -> Key (infallible)
//! ```

use crate::Key;

/// Slab-like storage with stable keys.
///
/// # Requirements
///
/// - **Stable keys**: a key remains valid until explicitly removed
/// - **O(1)** get, get_mut, remove
/// - **Slot reuse**: removed slots can be reused by future inserts
pub trait Storage<T> {
    /// Key type handed out by this storage.
    type Key: Key;

    /// Returns a reference to the record at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the record at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Removes and returns the record at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slots are occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-capacity storage: insertion can fail with [`Full`].
pub trait BoundedStorage<T>: Storage<T> {
    /// Inserts a record, returning its stable key.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full(value))` if every slot is occupied.
    fn try_insert(&mut self, value: T) -> Result<Self::Key, Full<T>>;

    /// Returns the slot capacity.
    fn capacity(&self) -> usize;
}

/// Growable storage: insertion always succeeds.
pub trait UnboundedStorage<T>: Storage<T> {
    /// Inserts a record, returning its stable key.
    fn insert(&mut self, value: T) -> Self::Key;
}

/// Error returned when fixed-capacity storage is full.
///
/// Carries the value that could not be inserted so the caller keeps
/// ownership of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> core::fmt::Display for Full<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "storage is full")
    }
}

impl<T: core::fmt::Debug> std::error::Error for Full<T> {}

// =============================================================================
// BoxedStorage - fixed capacity, freelist slot reuse
// =============================================================================

#[derive(Debug)]
enum Slot<T, Idx> {
    /// Free slot; links to the next free slot, `Idx::NONE` at the end.
    Vacant(Idx),
    Occupied(T),
}

/// Fixed-capacity storage with runtime-determined size.
///
/// Slots are allocated once at construction; vacant slots form an
/// internal freelist, so insert and remove are O(1) with LIFO reuse.
///
/// # Example
///
/// ```
/// use anchor_collections::{BoundedStorage, BoxedStorage, Storage};
///
/// let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(1000);
///
/// let idx = storage.try_insert(42).unwrap();
/// assert_eq!(storage.get(idx), Some(&42));
/// assert_eq!(storage.remove(idx), Some(42));
/// ```
#[derive(Debug)]
pub struct BoxedStorage<T, Idx: Key = u32> {
    slots: Vec<Slot<T, Idx>>,
    /// Head of the vacant-slot freelist.
    free_head: Idx,
    len: usize,
}

impl<T, Idx: Key> BoxedStorage<T, Idx> {
    /// Creates storage with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or does not fit the key type (the
    /// sentinel value is reserved).
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        assert!(
            capacity < Idx::NONE.as_usize().saturating_add(1),
            "capacity exceeds key type maximum"
        );

        let mut slots = Vec::with_capacity(capacity);
        for i in 0..capacity {
            let next = if i + 1 < capacity {
                Idx::from_usize(i + 1)
            } else {
                Idx::NONE
            };
            slots.push(Slot::Vacant(next));
        }

        Self {
            slots,
            free_head: Idx::from_usize(0),
            len: 0,
        }
    }

    /// Returns `true` if all slots are occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }

    /// Removes all records, making every slot available for reuse.
    ///
    /// # Warning
    ///
    /// Any container still holding keys into this storage is left with
    /// dangling keys. Clear those containers first, or use the owned
    /// wrappers which handle this for you.
    pub fn clear(&mut self) {
        let capacity = self.slots.len();
        self.slots.clear();
        for i in 0..capacity {
            let next = if i + 1 < capacity {
                Idx::from_usize(i + 1)
            } else {
                Idx::NONE
            };
            self.slots.push(Slot::Vacant(next));
        }
        self.free_head = Idx::from_usize(0);
        self.len = 0;
    }
}

impl<T, Idx: Key> Storage<T> for BoxedStorage<T, Idx> {
    type Key = Idx;

    #[inline]
    fn get(&self, key: Idx) -> Option<&T> {
        match self.slots.get(key.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, key: Idx) -> Option<&mut T> {
        match self.slots.get_mut(key.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn remove(&mut self, key: Idx) -> Option<T> {
        let slot = self.slots.get_mut(key.as_usize())?;
        if matches!(slot, Slot::Vacant(_)) {
            return None;
        }

        let old = core::mem::replace(slot, Slot::Vacant(self.free_head));
        self.free_head = key;
        self.len -= 1;

        match old {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => unreachable!(),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

impl<T, Idx: Key> BoundedStorage<T> for BoxedStorage<T, Idx> {
    #[inline]
    fn try_insert(&mut self, value: T) -> Result<Idx, Full<T>> {
        if self.free_head.is_none() {
            return Err(Full(value));
        }

        let key = self.free_head;
        let slot = &mut self.slots[key.as_usize()];
        let next_free = match *slot {
            Slot::Vacant(next) => next,
            Slot::Occupied(_) => unreachable!("freelist points at occupied slot"),
        };

        *slot = Slot::Occupied(value);
        self.free_head = next_free;
        self.len += 1;

        Ok(key)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        self.get(key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.get_mut(key)
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len()
    }
}

#[cfg(feature = "slab")]
impl<T> UnboundedStorage<T> for slab::Slab<T> {
    #[inline]
    fn insert(&mut self, value: T) -> usize {
        self.insert(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);
        assert!(storage.is_empty());
        assert!(!storage.is_full());
        assert_eq!(storage.len(), 0);
        assert_eq!(storage.capacity(), 16);
    }

    #[test]
    fn insert_get_remove() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);

        let idx = storage.try_insert(42).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(idx), Some(&42));

        assert_eq!(storage.remove(idx), Some(42));
        assert_eq!(storage.get(idx), None);
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn get_mut() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);

        let idx = storage.try_insert(10).unwrap();
        *storage.get_mut(idx).unwrap() = 20;

        assert_eq!(storage.get(idx), Some(&20));
    }

    #[test]
    fn fill_to_capacity() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(4);

        let keys: Vec<u32> = (0..4).map(|i| storage.try_insert(i).unwrap()).collect();
        assert!(storage.is_full());

        let err = storage.try_insert(4);
        assert_eq!(err.unwrap_err().into_inner(), 4);

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(storage.get(*key), Some(&(i as u64)));
        }
    }

    #[test]
    fn slot_reuse_is_lifo() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(4);

        let k0 = storage.try_insert(0).unwrap();
        let _k1 = storage.try_insert(1).unwrap();

        storage.remove(k0);

        let k2 = storage.try_insert(2).unwrap();
        assert_eq!(k2, k0);
    }

    #[test]
    fn double_remove_returns_none() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);

        let idx = storage.try_insert(42).unwrap();
        storage.remove(idx);

        assert_eq!(storage.remove(idx), None);
    }

    #[test]
    fn clear_resets_all_slots() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(4);

        for i in 0..4 {
            storage.try_insert(i).unwrap();
        }
        assert!(storage.is_full());

        storage.clear();
        assert!(storage.is_empty());

        for i in 0..4 {
            storage.try_insert(i).unwrap();
        }
        assert!(storage.is_full());
    }

    #[test]
    fn drop_cleans_up() {
        use std::rc::Rc;

        let marker = Rc::new(());

        {
            let mut storage: BoxedStorage<Rc<()>> = BoxedStorage::with_capacity(8);
            storage.try_insert(Rc::clone(&marker)).unwrap();
            storage.try_insert(Rc::clone(&marker)).unwrap();
            storage.try_insert(Rc::clone(&marker)).unwrap();
            assert_eq!(Rc::strong_count(&marker), 4);
        }

        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn u16_key() {
        let mut storage: BoxedStorage<u64, u16> = BoxedStorage::with_capacity(100);

        let idx = storage.try_insert(42).unwrap();
        assert_eq!(storage.get(idx), Some(&42));
    }

    #[cfg(feature = "slab")]
    mod slab_tests {
        use super::*;

        #[test]
        fn insert_get_remove() {
            let mut storage = slab::Slab::new();

            let idx = UnboundedStorage::insert(&mut storage, 42);
            assert_eq!(Storage::get(&storage, idx), Some(&42));

            assert_eq!(Storage::remove(&mut storage, idx), Some(42));
            assert_eq!(Storage::get(&storage, idx), None);
        }
    }
}
