//! Intrusive singly-linked FIFO queue over external storage.
//!
//! The forward-only sibling of [`List`](crate::List): records embed a
//! single `next` link via the [`Chained`] trait, and the queue tracks
//! head, tail, and length. Push at either end and pop from the front
//! are O(1). Removing from the middle requires the predecessor (see
//! [`Queue::remove_after`]) because no back link exists; that is the
//! price of dropping the second link.
//!
//! The same storage-instance discipline as `List` applies: one storage
//! per queue, one queue per record at a time.

use crate::{Key, Storage};

/// Trait for records that can participate in a singly-linked chain.
pub trait Chained<Idx: Key> {
    /// Returns the next record's index, or `Idx::NONE` at the tail.
    fn next(&self) -> Idx;

    /// Sets the next record's index.
    fn set_next(&mut self, idx: Idx);
}

/// A singly-linked FIFO queue over external storage.
///
/// # Example
///
/// ```
/// use anchor_collections::{BoundedStorage, BoxedStorage, Chained, Key, Queue};
///
/// #[derive(Debug)]
/// struct Job {
///     id: u64,
///     next: u32,
/// }
///
/// impl Chained<u32> for Job {
///     fn next(&self) -> u32 { self.next }
///     fn set_next(&mut self, idx: u32) { self.next = idx; }
/// }
///
/// let mut storage: BoxedStorage<Job> = BoxedStorage::with_capacity(16);
/// let mut queue: Queue<u32> = Queue::new();
///
/// let a = storage.try_insert(Job { id: 1, next: u32::NONE }).unwrap();
/// let b = storage.try_insert(Job { id: 2, next: u32::NONE }).unwrap();
///
/// queue.push_back(&mut storage, a);
/// queue.push_back(&mut storage, b);
///
/// assert_eq!(queue.pop_front(&mut storage), a);
/// assert_eq!(queue.pop_front(&mut storage), b);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Queue<Idx: Key> {
    head: Idx,
    tail: Idx,
    len: usize,
}

impl<Idx: Key> Default for Queue<Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Idx: Key> Queue<Idx> {
    /// Creates an empty queue.
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

    /// Returns the number of records in the queue.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exchanges the contents of two queues. O(1).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Forgets all records without touching their links. O(1).
    ///
    /// Records' embedded links become stale; only use this when the
    /// records are about to be discarded along with their storage.
    #[inline]
    pub fn reset(&mut self) {
        self.head = Idx::NONE;
        self.tail = Idx::NONE;
        self.len = 0;
    }

    /// Pushes a record to the back of the queue.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn push_back<T, S>(&mut self, storage: &mut S, idx: Idx)
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        storage
            .get_mut(idx)
            .expect("invalid index")
            .set_next(Idx::NONE);

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

    /// Pushes a record to the front of the queue.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn push_front<T, S>(&mut self, storage: &mut S, idx: Idx)
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        storage
            .get_mut(idx)
            .expect("invalid index")
            .set_next(self.head);

        if self.head.is_none() {
            self.tail = idx;
        }

        self.head = idx;
        self.len += 1;
    }

    /// Removes and returns the head record's index.
    ///
    /// Returns `Idx::NONE` if the queue is empty. The record remains in
    /// storage; only its link is cleared.
    #[inline]
    pub fn pop_front<T, S>(&mut self, storage: &mut S) -> Idx
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if self.head.is_none() {
            return Idx::NONE;
        }

        let idx = self.head;
        let node = storage.get_mut(idx).expect("invalid head");
        self.head = node.next();
        node.set_next(Idx::NONE);

        if self.head.is_none() {
            self.tail = Idx::NONE;
        }

        self.len -= 1;
        idx
    }

    /// Removes and returns the record after `pos`.
    ///
    /// An `Idx::NONE` position means "remove the head". Returns
    /// `Idx::NONE` if there is no such record.
    ///
    /// # Panics
    ///
    /// Panics if `pos` (when not `NONE`) is not valid in storage.
    #[inline]
    pub fn remove_after<T, S>(&mut self, storage: &mut S, pos: Idx) -> Idx
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if pos.is_none() {
            return self.pop_front(storage);
        }

        let idx = storage.get(pos).expect("invalid index").next();
        if idx.is_none() {
            return Idx::NONE;
        }

        let node = storage.get_mut(idx).expect("invalid next");
        let next = node.next();
        node.set_next(Idx::NONE);

        storage.get_mut(pos).expect("invalid index").set_next(next);

        if next.is_none() {
            self.tail = pos;
        }

        self.len -= 1;
        idx
    }

    /// Removes a record from anywhere in the queue.
    ///
    /// O(chain length): walks from the head to find the predecessor.
    /// Returns `true` if the record was in the queue.
    ///
    /// # Panics
    ///
    /// Panics if a link along the walk is not valid in storage.
    pub fn remove<T, S>(&mut self, storage: &mut S, idx: Idx) -> bool
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if self.head == idx {
            self.pop_front(storage);
            return true;
        }

        let mut prev = self.head;
        while prev.is_some() {
            let next = storage.get(prev).expect("invalid index").next();
            if next == idx {
                self.remove_after(storage, prev);
                return true;
            }
            prev = next;
        }

        false
    }

    /// Clears the queue, resetting every record's link. O(n).
    pub fn clear<T, S>(&mut self, storage: &mut S)
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        let mut idx = self.head;
        while idx.is_some() {
            let node = storage.get_mut(idx).expect("invalid index");
            let next = node.next();
            node.set_next(Idx::NONE);
            idx = next;
        }

        self.reset();
    }

    /// Returns an iterator over record indices, front to back.
    #[inline]
    pub fn indices<'a, T, S>(&self, storage: &'a S) -> Indices<'a, T, S, Idx>
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        Indices {
            storage,
            current: self.head,
            _marker: core::marker::PhantomData,
        }
    }

    /// Checks the structural invariants, panicking on any violation.
    ///
    /// Verifies the chain terminates at the tail and visits exactly
    /// `len` records. For tests.
    pub fn validate<T, S>(&self, storage: &S)
    where
        T: Chained<Idx>,
        S: Storage<T, Key = Idx>,
    {
        if self.head.is_none() {
            assert!(self.tail.is_none(), "head is NONE but tail is not");
            assert_eq!(self.len, 0, "empty queue with non-zero len");
            return;
        }

        let mut count = 0usize;
        let mut idx = self.head;
        loop {
            count += 1;
            let next = storage.get(idx).expect("chained record not in storage").next();
            if next.is_none() {
                assert!(idx == self.tail, "last record is not the tail");
                break;
            }
            idx = next;
        }

        assert_eq!(count, self.len, "walk count disagrees with len");
    }
}

/// Iterator over queue record indices, front to back.
pub struct Indices<'a, T, S, Idx: Key>
where
    T: Chained<Idx>,
    S: Storage<T, Key = Idx>,
{
    storage: &'a S,
    current: Idx,
    _marker: core::marker::PhantomData<T>,
}

impl<'a, T, S, Idx: Key> Iterator for Indices<'a, T, S, Idx>
where
    T: Chained<Idx>,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundedStorage, BoxedStorage};

    #[derive(Debug)]
    struct Node {
        value: u64,
        next: u32,
    }

    impl Node {
        fn new(value: u64) -> Self {
            Self {
                value,
                next: u32::NONE,
            }
        }
    }

    impl Chained<u32> for Node {
        fn next(&self) -> u32 {
            self.next
        }
        fn set_next(&mut self, idx: u32) {
            self.next = idx;
        }
    }

    fn setup(n: u64) -> (BoxedStorage<Node>, Vec<u32>) {
        let mut storage = BoxedStorage::with_capacity(32);
        let keys = (0..n).map(|i| storage.try_insert(Node::new(i)).unwrap()).collect();
        (storage, keys)
    }

    #[test]
    fn fifo_order() {
        let (mut storage, keys) = setup(3);
        let mut queue: Queue<u32> = Queue::new();

        for &k in &keys {
            queue.push_back(&mut storage, k);
            queue.validate(&storage);
        }

        assert_eq!(queue.pop_front(&mut storage), keys[0]);
        assert_eq!(queue.pop_front(&mut storage), keys[1]);
        assert_eq!(queue.pop_front(&mut storage), keys[2]);
        assert!(queue.pop_front(&mut storage).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn push_front_stacks() {
        let (mut storage, keys) = setup(2);
        let mut queue: Queue<u32> = Queue::new();

        queue.push_front(&mut storage, keys[0]);
        queue.push_front(&mut storage, keys[1]);
        queue.validate(&storage);

        assert_eq!(queue.head(), keys[1]);
        assert_eq!(queue.tail(), keys[0]);
    }

    #[test]
    fn remove_after_head_position() {
        let (mut storage, keys) = setup(3);
        let mut queue: Queue<u32> = Queue::new();

        for &k in &keys {
            queue.push_back(&mut storage, k);
        }

        // NONE position removes the head.
        assert_eq!(queue.remove_after(&mut storage, u32::NONE), keys[0]);
        // Removing after the first remaining record unlinks the middle.
        assert_eq!(queue.remove_after(&mut storage, keys[1]), keys[2]);
        queue.validate(&storage);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.tail(), keys[1]);
    }

    #[test]
    fn remove_after_tail_returns_none() {
        let (mut storage, keys) = setup(1);
        let mut queue: Queue<u32> = Queue::new();

        queue.push_back(&mut storage, keys[0]);
        assert!(queue.remove_after(&mut storage, keys[0]).is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn remove_walks_for_predecessor() {
        let (mut storage, keys) = setup(4);
        let mut queue: Queue<u32> = Queue::new();

        for &k in &keys {
            queue.push_back(&mut storage, k);
        }

        assert!(queue.remove(&mut storage, keys[2]));
        queue.validate(&storage);
        assert_eq!(queue.len(), 3);

        let order: Vec<u32> = queue.indices(&storage).collect();
        assert_eq!(order, vec![keys[0], keys[1], keys[3]]);

        assert!(!queue.remove(&mut storage, keys[2]));
    }

    #[test]
    fn swap_and_clear() {
        let (mut storage, keys) = setup(3);
        let mut queue_a: Queue<u32> = Queue::new();
        let mut queue_b: Queue<u32> = Queue::new();

        queue_a.push_back(&mut storage, keys[0]);
        queue_a.push_back(&mut storage, keys[1]);
        queue_b.push_back(&mut storage, keys[2]);

        queue_a.swap(&mut queue_b);
        assert_eq!(queue_a.len(), 1);
        assert_eq!(queue_b.len(), 2);

        queue_b.clear(&mut storage);
        assert!(queue_b.is_empty());
        assert!(storage.get(keys[0]).unwrap().next.is_none());
        queue_a.validate(&storage);
        queue_b.validate(&storage);
    }

    #[test]
    fn tail_tracks_single_element() {
        let (mut storage, keys) = setup(1);
        let mut queue: Queue<u32> = Queue::new();

        queue.push_back(&mut storage, keys[0]);
        assert_eq!(queue.head(), keys[0]);
        assert_eq!(queue.tail(), keys[0]);

        queue.pop_front(&mut storage);
        assert!(queue.head().is_none());
        assert!(queue.tail().is_none());
    }

    #[test]
    fn values_survive_requeue() {
        let (mut storage, keys) = setup(3);
        let mut queue: Queue<u32> = Queue::new();

        for &k in &keys {
            queue.push_back(&mut storage, k);
        }

        // Rotate: pop and push back twice.
        for _ in 0..2 {
            let idx = queue.pop_front(&mut storage);
            queue.push_back(&mut storage, idx);
        }
        queue.validate(&storage);

        let front = queue.head();
        assert_eq!(storage.get(front).unwrap().value, 2);
    }
}
