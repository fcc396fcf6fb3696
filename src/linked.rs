//! Intrusive doubly-linked list over external storage.
//!
//! Records embed their own prev/next links via the [`Linked`] trait, so
//! removal from any position is O(1) given only the record's index. The
//! list owns nothing: it tracks head, tail, and length, and all records
//! live in caller-provided [`Storage`].
//!
//! # Storage Invariant
//!
//! A list instance must always be used with the same storage instance.
//! Passing a different storage is undefined behavior. This is the
//! caller's responsibility to enforce (same discipline as the `slab`
//! crate). A record may be linked into at most one list at a time.
//!
//! # Example
//!
//! ```
//! use anchor_collections::{BoundedStorage, BoxedStorage, Key, Linked, List};
//!
//! #[derive(Debug)]
//! struct Label {
//!     text: &'static str,
//!     next: u32,
//!     prev: u32,
//! }
//!
//! impl Label {
//!     fn new(text: &'static str) -> Self {
//!         Self { text, next: u32::NONE, prev: u32::NONE }
//!     }
//! }
//!
//! impl Linked<u32> for Label {
//!     fn next(&self) -> u32 { self.next }
//!     fn prev(&self) -> u32 { self.prev }
//!     fn set_next(&mut self, idx: u32) { self.next = idx; }
//!     fn set_prev(&mut self, idx: u32) { self.prev = idx; }
//! }
//!
//! let mut storage: BoxedStorage<Label> = BoxedStorage::with_capacity(16);
//! let mut list: List<u32> = List::new();
//!
//! let a = storage.try_insert(Label::new("a")).unwrap();
//! let b = storage.try_insert(Label::new("b")).unwrap();
//!
//! list.push_back(&mut storage, a);
//! list.push_back(&mut storage, b);
//!
//! assert_eq!(list.len(), 2);
//! list.remove(&mut storage, a); // O(1), from anywhere
//! assert_eq!(list.head(), b);
//! ```

use crate::{Key, Storage};

/// Trait for records that can participate in a doubly-linked list.
///
/// Implementors embed prev/next indices directly in their struct. A
/// record can participate in several lists at once by embedding several
/// link pairs and wrapping each pair in its own `Linked` newtype.
pub trait Linked<Idx: Key> {
    /// Returns the next record's index, or `Idx::NONE` at the tail.
    fn next(&self) -> Idx;

    /// Returns the previous record's index, or `Idx::NONE` at the head.
    fn prev(&self) -> Idx;

    /// Sets the next record's index.
    fn set_next(&mut self, idx: Idx);

    /// Sets the previous record's index.
    fn set_prev(&mut self, idx: Idx);
}

/// A doubly-linked list over external storage.
///
/// The list itself only stores head, tail, and length.
#[derive(Debug, Clone)]
pub struct List<Idx: Key> {
    head: Idx,
    tail: Idx,
    len: usize,
}

impl<Idx: Key> Default for List<Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Idx: Key> List<Idx> {
    /// Creates an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: Idx::NONE,
            tail: Idx::NONE,
            len: 0,
        }
    }

    /// Returns the head record's index, or `Idx::NONE` if empty.
    #[inline]
    pub const fn head(&self) -> Idx {
        self.head
    }

    /// Returns the tail record's index, or `Idx::NONE` if empty.
    #[inline]
    pub const fn tail(&self) -> Idx {
        self.tail
    }

    /// Returns the number of records in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exchanges the contents of two lists.
    ///
    /// O(1): only the head/tail/len fields move, no record is touched.
    /// Both lists must of course be backed by the same storage.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Forgets all records without touching their links.
    ///
    /// O(1). The records' embedded links become stale; only use this
    /// when the records themselves are about to be discarded (e.g. just
    /// before clearing the backing storage). Prefer [`List::clear`]
    /// otherwise.
    #[inline]
    pub fn reset(&mut self) {
        self.head = Idx::NONE;
        self.tail = Idx::NONE;
        self.len = 0;
    }

    /// Pushes a record to the back of the list.
    ///
    /// The record must already exist in storage and not be in any list.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn push_back<T, S>(&mut self, storage: &mut S, idx: Idx)
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        {
            let node = storage.get_mut(idx).expect("invalid index");
            node.set_prev(self.tail);
            node.set_next(Idx::NONE);
        }

        if self.tail.is_some() {
            storage
                .get_mut(self.tail)
                .expect("invalid tail")
                .set_next(idx);
        } else {
            self.head = idx;
        }

        self.tail = idx;
        self.len += 1;
    }

    /// Pushes a record to the front of the list.
    ///
    /// The record must already exist in storage and not be in any list.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn push_front<T, S>(&mut self, storage: &mut S, idx: Idx)
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        {
            let node = storage.get_mut(idx).expect("invalid index");
            node.set_next(self.head);
            node.set_prev(Idx::NONE);
        }

        if self.head.is_some() {
            storage
                .get_mut(self.head)
                .expect("invalid head")
                .set_prev(idx);
        } else {
            self.tail = idx;
        }

        self.head = idx;
        self.len += 1;
    }

    /// Inserts a record after `after`.
    ///
    /// An `Idx::NONE` position means "insert as the new head".
    ///
    /// # Panics
    ///
    /// Panics if `after` (when not `NONE`) or `idx` is not valid in
    /// storage.
    #[inline]
    pub fn insert_after<T, S>(&mut self, storage: &mut S, after: Idx, idx: Idx)
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if after.is_none() {
            self.push_front(storage, idx);
            return;
        }

        let next = storage.get(after).expect("invalid index").next();

        {
            let node = storage.get_mut(idx).expect("invalid index");
            node.set_prev(after);
            node.set_next(next);
        }

        storage.get_mut(after).expect("invalid index").set_next(idx);

        if next.is_some() {
            storage.get_mut(next).expect("invalid next").set_prev(idx);
        } else {
            self.tail = idx;
        }

        self.len += 1;
    }

    /// Inserts a record before `before`.
    ///
    /// An `Idx::NONE` position means "insert as the new tail".
    ///
    /// # Panics
    ///
    /// Panics if `before` (when not `NONE`) or `idx` is not valid in
    /// storage.
    #[inline]
    pub fn insert_before<T, S>(&mut self, storage: &mut S, before: Idx, idx: Idx)
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if before.is_none() {
            self.push_back(storage, idx);
            return;
        }

        let prev = storage.get(before).expect("invalid index").prev();

        {
            let node = storage.get_mut(idx).expect("invalid index");
            node.set_next(before);
            node.set_prev(prev);
        }

        storage
            .get_mut(before)
            .expect("invalid index")
            .set_prev(idx);

        if prev.is_some() {
            storage.get_mut(prev).expect("invalid prev").set_next(idx);
        } else {
            self.head = idx;
        }

        self.len += 1;
    }

    /// Removes and returns the head record's index.
    ///
    /// Returns `Idx::NONE` if the list is empty. The record remains in
    /// storage; only its links are cleared.
    #[inline]
    pub fn pop_front<T, S>(&mut self, storage: &mut S) -> Idx
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if self.head.is_none() {
            return Idx::NONE;
        }

        let idx = self.head;
        self.remove(storage, idx);
        idx
    }

    /// Removes and returns the tail record's index.
    ///
    /// Returns `Idx::NONE` if the list is empty. The record remains in
    /// storage; only its links are cleared.
    #[inline]
    pub fn pop_back<T, S>(&mut self, storage: &mut S) -> Idx
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if self.tail.is_none() {
            return Idx::NONE;
        }

        let idx = self.tail;
        self.remove(storage, idx);
        idx
    }

    /// Removes a record from the list.
    ///
    /// O(1): the record carries both neighbor links. The record remains
    /// in storage; only its links are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn remove<T, S>(&mut self, storage: &mut S, idx: Idx)
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        let (prev, next) = {
            let node = storage.get(idx).expect("invalid index");
            (node.prev(), node.next())
        };

        if prev.is_some() {
            storage.get_mut(prev).expect("invalid prev").set_next(next);
        } else {
            self.head = next;
        }

        if next.is_some() {
            storage.get_mut(next).expect("invalid next").set_prev(prev);
        } else {
            self.tail = prev;
        }

        let node = storage.get_mut(idx).expect("invalid index");
        node.set_prev(Idx::NONE);
        node.set_next(Idx::NONE);

        self.len -= 1;
    }

    /// Clears the list, resetting every record's links.
    ///
    /// O(n). Records remain in storage.
    pub fn clear<T, S>(&mut self, storage: &mut S)
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        let mut idx = self.head;
        while idx.is_some() {
            let node = storage.get_mut(idx).expect("invalid index");
            let next = node.next();
            node.set_prev(Idx::NONE);
            node.set_next(Idx::NONE);
            idx = next;
        }

        self.reset();
    }

    /// Returns an iterator over record indices, front to back.
    #[inline]
    pub fn indices<'a, T, S>(&self, storage: &'a S) -> Indices<'a, T, S, Idx>
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        Indices {
            storage,
            current: self.head,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns an iterator over record references, front to back.
    #[inline]
    pub fn iter<'a, T, S>(&self, storage: &'a S) -> Iter<'a, T, S, Idx>
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        Iter {
            inner: self.indices(storage),
        }
    }

    /// Checks the structural invariants, panicking on any violation.
    ///
    /// Verifies that forward and backward links mirror each other, that
    /// head/tail terminate properly, and that the walk visits exactly
    /// `len` records. Replaces the debug-build-only checks a container
    /// like this traditionally hides behind `cfg(debug_assertions)`;
    /// call it from tests after a batch of mutations.
    pub fn validate<T, S>(&self, storage: &S)
    where
        T: Linked<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if self.head.is_none() {
            assert!(self.tail.is_none(), "head is NONE but tail is not");
            assert_eq!(self.len, 0, "empty list with non-zero len");
            return;
        }

        let first = storage.get(self.head).expect("head not in storage");
        assert!(first.prev().is_none(), "head has a prev link");

        let mut count = 0usize;
        let mut idx = self.head;
        loop {
            count += 1;
            let node = storage.get(idx).expect("linked record not in storage");
            let next = node.next();
            if next.is_none() {
                assert!(idx == self.tail, "last record is not the tail");
                break;
            }
            let next_node = storage.get(next).expect("next link not in storage");
            assert!(
                next_node.prev() == idx,
                "next.prev does not point back at record"
            );
            idx = next;
        }

        assert_eq!(count, self.len, "walk count disagrees with len");
    }
}

/// Iterator over list record indices, front to back.
pub struct Indices<'a, T, S, Idx: Key>
where
    T: Linked<Idx>,
    S: Storage<T, Key = Idx>,
{
    storage: &'a S,
    current: Idx,
    _marker: core::marker::PhantomData<T>,
}

impl<'a, T, S, Idx: Key> Iterator for Indices<'a, T, S, Idx>
where
    T: Linked<Idx>,
    S: Storage<T, Key = Idx>,
{
    type Item = Idx;

    fn next(&mut self) -> Option<Idx> {
        if self.current.is_none() {
            return None;
        }
        let idx = self.current;
        self.current = self.storage.get(idx).expect("invalid index").next();
        Some(idx)
    }
}

/// Iterator over list record references, front to back.
pub struct Iter<'a, T, S, Idx: Key>
where
    T: Linked<Idx>,
    S: Storage<T, Key = Idx>,
{
    inner: Indices<'a, T, S, Idx>,
}

impl<'a, T, S, Idx: Key> Iterator for Iter<'a, T, S, Idx>
where
    T: Linked<Idx> + 'a,
    S: Storage<T, Key = Idx>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let idx = self.inner.next()?;
        Some(self.inner.storage.get(idx).expect("invalid index"))
    }
}
