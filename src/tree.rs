//! AVL tree engine over external storage.
//!
//! An ordered map threaded through [`TreeNode`]s held in caller-provided
//! storage. Each node carries two child links, a parent link, and a
//! balance factor (height of right subtree minus left, always in
//! `-1..=1`). The parent link makes in-order walks possible without a
//! stack and keeps rebalancing local to the insertion or removal path.
//!
//! Beyond exact lookup the tree answers neighbor queries in a single
//! root-to-leaf descent: greatest key below a bound, smallest key
//! above it, with or without accepting an exact match. Floor/ceiling
//! lookups and ordered scans are what a hash table cannot do, and the
//! reason to pay O(log n) per insert.
//!
//! Comparisons go through a caller-supplied three-way comparator in the
//! `_by` variants; the plain methods use `K: Ord`. [`PrefixCmp`] is a
//! comparator for long string keys. It remembers how much of the key
//! already matched on each side of the pivot, so repeated comparisons
//! during one descent never re-scan a confirmed-equal prefix.
//!
//! # Example
//!
//! ```
//! use anchor_collections::{AvlTree, BoxedTreeStorage, Storage};
//!
//! let mut storage: BoxedTreeStorage<u32, &str> = BoxedTreeStorage::with_capacity(64);
//! let mut tree: AvlTree<u32, &str, _> = AvlTree::new();
//!
//! for key in [5, 3, 8] {
//!     tree.try_insert(&mut storage, key, "x").unwrap();
//! }
//!
//! assert!(tree.find(&storage, &3).is_some());
//! let below = tree.find_lt(&storage, &8).unwrap();
//! assert_eq!(storage.get(below).unwrap().key, 5);
//! ```

use core::cmp::Ordering;
use core::marker::PhantomData;

use crate::{BoundedStorage, BoxedStorage, Full, Key, Storage, UnboundedStorage};

/// Type alias for bounded tree storage backed by [`BoxedStorage`].
pub type BoxedTreeStorage<K, V, Idx = u32> = BoxedStorage<TreeNode<K, V, Idx>, Idx>;

/// Type alias for unbounded tree storage backed by `slab::Slab`.
#[cfg(feature = "slab")]
pub type SlabTreeStorage<K, V> = slab::Slab<TreeNode<K, V, usize>>;

const LEFT: usize = 0;
const RIGHT: usize = 1;

/// A node in an AVL tree: the user value with its ordering key and the
/// structural links.
#[derive(Debug, Clone)]
pub struct TreeNode<K, V, Idx: Key = u32> {
    /// The ordering key.
    pub key: K,
    /// The value associated with this key.
    pub value: V,
    child: [Idx; 2],
    parent: Idx,
    /// Height of right subtree minus height of left.
    balance: i8,
}

impl<K, V, Idx: Key> TreeNode<K, V, Idx> {
    #[inline]
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            child: [Idx::NONE; 2],
            parent: Idx::NONE,
            balance: 0,
        }
    }
}

/// A self-balancing binary search tree over external storage.
///
/// Duplicate keys are not rejected; a caller that inserts the same key
/// twice gets two nodes and exact lookup finds one of them. Keep keys
/// unique unless the access pattern tolerates that.
///
/// # Type Parameters
///
/// - `K`: Key type
/// - `V`: Value type
/// - `S`: Storage type (e.g. [`BoxedTreeStorage<K, V>`])
/// - `Idx`: Key type for storage indices, defaults to `u32`
#[derive(Debug)]
pub struct AvlTree<K, V, S, Idx = u32>
where
    Idx: Key,
{
    root: Idx,
    len: usize,
    _marker: PhantomData<(K, V, S)>,
}

impl<K, V, S, Idx> Default for AvlTree<K, V, S, Idx>
where
    Idx: Key,
    S: Storage<TreeNode<K, V, Idx>, Key = Idx>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, Idx> AvlTree<K, V, S, Idx>
where
    Idx: Key,
    S: Storage<TreeNode<K, V, Idx>, Key = Idx>,
{
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            root: Idx::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Exchanges the contents of two trees. O(1).
    ///
    /// Both trees must be backed by the same storage.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Forgets all nodes without touching their links. O(1).
    ///
    /// Node links become stale; only use this when the nodes are about
    /// to be discarded along with their storage.
    #[inline]
    pub fn reset(&mut self) {
        self.root = Idx::NONE;
        self.len = 0;
    }

    #[inline]
    fn node<'a>(&self, storage: &'a S, idx: Idx) -> &'a TreeNode<K, V, Idx> {
        storage.get(idx).expect("invalid index")
    }

    #[inline]
    fn node_mut<'a>(&self, storage: &'a mut S, idx: Idx) -> &'a mut TreeNode<K, V, Idx> {
        storage.get_mut(idx).expect("invalid index")
    }

    /// Which child slot of `parent` holds `idx`.
    #[inline]
    fn parent_side(&self, storage: &S, idx: Idx, parent: Idx) -> usize {
        (self.node(storage, parent).child[RIGHT] == idx) as usize
    }

    /// Writes `child` into `at.child[side]`, fixing the back link when
    /// the child exists.
    fn set_child(&self, storage: &mut S, at: Idx, side: usize, child: Idx) {
        self.node_mut(storage, at).child[side] = child;
        if child.is_some() {
            self.node_mut(storage, child).parent = at;
        }
    }

    /// Puts `next` where `node` hangs: same parent slot, or the root.
    fn replace_in_parent(&mut self, storage: &mut S, node: Idx, next: Idx) {
        let parent = self.node(storage, node).parent;
        self.node_mut(storage, next).parent = parent;
        if parent.is_some() {
            let side = self.parent_side(storage, node, parent);
            self.node_mut(storage, parent).child[side] = next;
        } else {
            self.root = next;
        }
    }

    /// Rotates the subtree at `at` toward `dir` (+1 right, -1 left),
    /// turning a double rotation first when the pivot leans the wrong
    /// way. Returns `true` if the subtree got shorter.
    fn rotate(&mut self, storage: &mut S, at: Idx, dir: i8) -> bool {
        let idx = (dir == 1) as usize;

        let mut pivot = self.node(storage, at).child[1 - idx];
        if self.node(storage, pivot).balance == dir {
            self.rotate(storage, pivot, -dir);
            pivot = self.node(storage, at).child[1 - idx];
        }

        let at_balance = self.node(storage, at).balance;
        let pivot_balance = self.node(storage, pivot).balance;
        let shrank = pivot_balance != 0 && !(-1..=1).contains(&at_balance);

        let mut nb = at_balance + dir;
        let mut pb = pivot_balance;
        if pb != 0 {
            if nb == 0 {
                pb += dir;
            }
            nb += dir;
        }
        pb += dir;
        self.node_mut(storage, at).balance = nb;
        self.node_mut(storage, pivot).balance = pb;

        let transferred = self.node(storage, pivot).child[idx];
        self.set_child(storage, at, 1 - idx, transferred);
        self.node_mut(storage, pivot).child[idx] = at;
        self.replace_in_parent(storage, at, pivot);
        self.node_mut(storage, at).parent = pivot;

        shrank
    }

    /// Walks balance adjustments from `at` toward the root after a
    /// subtree under `at` grew (`removed == false`) or shrank
    /// (`removed == true`) in direction `dir`.
    fn adjust_balance(&mut self, storage: &mut S, mut at: Idx, mut dir: i8, removed: bool) {
        loop {
            let parent = self.node(storage, at).parent;
            let balance = self.node(storage, at).balance + dir;
            self.node_mut(storage, at).balance = balance;

            // Computed before a rotation can reseat `at`.
            let dir_next = if parent.is_some()
                && (self.parent_side(storage, at, parent) == RIGHT) ^ removed
            {
                1
            } else {
                -1
            };

            // `height_settled`: after an insert, true means the subtree
            // height did not grow; after a remove, false means it did
            // not shrink. Either way the walk can stop.
            let height_settled = match balance {
                -1 | 1 => false,
                0 => true,
                -2 => self.rotate(storage, at, 1),
                2 => self.rotate(storage, at, -1),
                _ => unreachable!("balance factor out of range"),
            };

            if parent.is_none() || (height_settled ^ removed) {
                break;
            }
            at = parent;
            dir = dir_next;
        }
    }

    /// Unhooks a node with at most one child, rebalancing upward.
    fn detach(&mut self, storage: &mut S, node: Idx, only_child: Idx) {
        let parent = self.node(storage, node).parent;
        if only_child.is_some() {
            self.node_mut(storage, only_child).parent = parent;
        }

        if parent.is_some() {
            let side = self.parent_side(storage, node, parent);
            self.node_mut(storage, parent).child[side] = only_child;
            self.adjust_balance(storage, parent, if side == RIGHT { -1 } else { 1 }, true);
        } else {
            self.root = only_child;
        }
    }

    /// Unhooks any node. The two-child case detaches the in-order
    /// successor from its own spot, then splices it in as a structural
    /// replacement carrying the removed node's balance factor.
    fn unlink(&mut self, storage: &mut S, node: Idx) {
        let [left, right] = self.node(storage, node).child;

        if left.is_some() && right.is_some() {
            let succ = self.extreme_in(storage, right, LEFT);
            let succ_right = self.node(storage, succ).child[RIGHT];
            self.detach(storage, succ, succ_right);

            // Rebalancing may have reshaped the node's subtrees.
            let [left, right] = self.node(storage, node).child;
            self.set_child(storage, succ, LEFT, left);
            self.set_child(storage, succ, RIGHT, right);
            self.replace_in_parent(storage, node, succ);
            self.node_mut(storage, succ).balance = self.node(storage, node).balance;
        } else if left.is_some() {
            self.detach(storage, node, left);
        } else {
            self.detach(storage, node, right);
        }
    }

    /// Hooks a freshly stored node under `parent` at `side`, then
    /// rebalances. `parent == NONE` makes it the root.
    fn link(&mut self, storage: &mut S, idx: Idx, parent: Idx, side: usize) {
        {
            let node = self.node_mut(storage, idx);
            node.child = [Idx::NONE; 2];
            node.parent = parent;
            node.balance = 0;
        }

        if parent.is_some() {
            debug_assert!(self.node(storage, parent).child[side].is_none());
            self.node_mut(storage, parent).child[side] = idx;
            self.adjust_balance(storage, parent, if side == RIGHT { 1 } else { -1 }, false);
        } else {
            self.root = idx;
        }
        self.len += 1;
    }

    /// Finds the attachment point for a new key: the leaf to hang it
    /// under and which side. The comparator receives each probed node
    /// key and orders it against the new key; `Equal` descends left.
    fn locate<F>(&self, storage: &S, mut cmp: F) -> (Idx, usize)
    where
        F: FnMut(&K) -> Ordering,
    {
        if self.root.is_none() {
            return (Idx::NONE, LEFT);
        }

        let mut cur = self.root;
        loop {
            let node = self.node(storage, cur);
            let side = (cmp(&node.key) == Ordering::Less) as usize;
            if node.child[side].is_none() {
                return (cur, side);
            }
            cur = node.child[side];
        }
    }

    /// Single-descent search. `exact` returns an exact match
    /// immediately; `dir` additionally tracks the closest node ordered
    /// `Less` (below the target) or `Greater` (above it).
    fn search<F>(&self, storage: &S, mut cmp: F, exact: bool, dir: Option<Ordering>) -> Option<Idx>
    where
        F: FnMut(&K) -> Ordering,
    {
        let mut matched = None;
        let mut cur = self.root;
        while cur.is_some() {
            let node = self.node(storage, cur);
            let ord = cmp(&node.key);

            if exact && ord == Ordering::Equal {
                return Some(cur);
            }
            if Some(ord) == dir {
                matched = Some(cur);
            }

            // On an equal key the strict neighbor still lies on the
            // side named by `dir`; a floor/ceiling query has already
            // returned above.
            let side = match ord {
                Ordering::Less => RIGHT,
                Ordering::Greater => LEFT,
                Ordering::Equal => {
                    if dir == Some(Ordering::Greater) {
                        RIGHT
                    } else {
                        LEFT
                    }
                }
            };
            cur = node.child[side];
        }
        matched
    }

    #[inline]
    fn extreme_in(&self, storage: &S, mut idx: Idx, side: usize) -> Idx {
        loop {
            let next = self.node(storage, idx).child[side];
            if next.is_none() {
                return idx;
            }
            idx = next;
        }
    }

    fn extreme(&self, storage: &S, side: usize) -> Idx {
        if self.root.is_none() {
            Idx::NONE
        } else {
            self.extreme_in(storage, self.root, side)
        }
    }

    /// Returns the index of the smallest key, or `Idx::NONE` if empty.
    #[inline]
    pub fn first_index(&self, storage: &S) -> Idx {
        self.extreme(storage, LEFT)
    }

    /// Returns the index of the largest key, or `Idx::NONE` if empty.
    #[inline]
    pub fn last_index(&self, storage: &S) -> Idx {
        self.extreme(storage, RIGHT)
    }

    fn walk(&self, storage: &S, idx: Idx, side: usize) -> Idx {
        let down = self.node(storage, idx).child[side];
        if down.is_some() {
            return self.extreme_in(storage, down, 1 - side);
        }

        // No subtree on that side: climb until we leave one behind.
        let mut cur = idx;
        loop {
            let parent = self.node(storage, cur).parent;
            if parent.is_none() {
                return Idx::NONE;
            }
            if self.parent_side(storage, cur, parent) != side {
                return parent;
            }
            cur = parent;
        }
    }

    /// Returns the in-order successor of `idx`, or `Idx::NONE`.
    ///
    /// O(log n) amortized over a full scan via the parent links.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn next_index(&self, storage: &S, idx: Idx) -> Idx {
        self.walk(storage, idx, RIGHT)
    }

    /// Returns the in-order predecessor of `idx`, or `Idx::NONE`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn prev_index(&self, storage: &S, idx: Idx) -> Idx {
        self.walk(storage, idx, LEFT)
    }

    /// Finds a node through a three-way comparator.
    ///
    /// The comparator receives each probed node key and returns its
    /// ordering relative to the target. Use this with stateful
    /// comparators like [`PrefixCmp`].
    #[inline]
    pub fn find_by<F>(&self, storage: &S, cmp: F) -> Option<Idx>
    where
        F: FnMut(&K) -> Ordering,
    {
        self.search(storage, cmp, true, None)
    }

    /// Greatest node ordered strictly below the target, by comparator.
    #[inline]
    pub fn find_lt_by<F>(&self, storage: &S, cmp: F) -> Option<Idx>
    where
        F: FnMut(&K) -> Ordering,
    {
        self.search(storage, cmp, false, Some(Ordering::Less))
    }

    /// Smallest node ordered strictly above the target, by comparator.
    #[inline]
    pub fn find_gt_by<F>(&self, storage: &S, cmp: F) -> Option<Idx>
    where
        F: FnMut(&K) -> Ordering,
    {
        self.search(storage, cmp, false, Some(Ordering::Greater))
    }

    /// Exact match if present, else greatest below, by comparator.
    #[inline]
    pub fn find_le_by<F>(&self, storage: &S, cmp: F) -> Option<Idx>
    where
        F: FnMut(&K) -> Ordering,
    {
        self.search(storage, cmp, true, Some(Ordering::Less))
    }

    /// Exact match if present, else smallest above, by comparator.
    #[inline]
    pub fn find_ge_by<F>(&self, storage: &S, cmp: F) -> Option<Idx>
    where
        F: FnMut(&K) -> Ordering,
    {
        self.search(storage, cmp, true, Some(Ordering::Greater))
    }

    /// Removes the node at `idx` and returns its key and value.
    ///
    /// Returns `None` if `idx` is not a live storage key.
    pub fn remove_at(&mut self, storage: &mut S, idx: Idx) -> Option<(K, V)> {
        storage.get(idx)?;
        self.unlink(storage, idx);
        self.len -= 1;
        let node = storage.remove(idx).expect("invalid index");
        Some((node.key, node.value))
    }

    /// Removes the smallest entry, or `None` if empty.
    pub fn pop_first(&mut self, storage: &mut S) -> Option<(K, V)> {
        let idx = self.first_index(storage);
        if idx.is_none() {
            return None;
        }
        self.remove_at(storage, idx)
    }

    /// Removes the largest entry, or `None` if empty.
    pub fn pop_last(&mut self, storage: &mut S) -> Option<(K, V)> {
        let idx = self.last_index(storage);
        if idx.is_none() {
            return None;
        }
        self.remove_at(storage, idx)
    }

    /// Removes all nodes from the tree and the storage.
    ///
    /// O(n) post-order teardown; no rebalancing along the way.
    pub fn clear(&mut self, storage: &mut S) {
        let mut idx = self.root;
        while idx.is_some() {
            let node = self.node(storage, idx);
            if node.child[LEFT].is_some() {
                idx = node.child[LEFT];
                continue;
            }
            if node.child[RIGHT].is_some() {
                idx = node.child[RIGHT];
                continue;
            }

            let parent = node.parent;
            if parent.is_some() {
                let side = self.parent_side(storage, idx, parent);
                self.node_mut(storage, parent).child[side] = Idx::NONE;
            }
            storage.remove(idx);
            idx = parent;
        }
        self.root = Idx::NONE;
        self.len = 0;
    }

    /// Returns an in-order iterator over `(&K, &V)`.
    #[inline]
    pub fn iter<'a>(&'a self, storage: &'a S) -> Iter<'a, K, V, S, Idx> {
        Iter {
            tree: self,
            storage,
            current: self.first_index(storage),
        }
    }
}

// =============================================================================
// Ord-keyed API
// =============================================================================

impl<K, V, S, Idx> AvlTree<K, V, S, Idx>
where
    K: Ord,
    Idx: Key,
    S: Storage<TreeNode<K, V, Idx>, Key = Idx>,
{
    /// Finds the index of the node for `key`, or `None` if absent.
    #[inline]
    pub fn find(&self, storage: &S, key: &K) -> Option<Idx> {
        self.find_by(storage, |k| k.cmp(key))
    }

    /// Returns `true` if the tree contains `key`.
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

    /// Greatest node with a key strictly below `key`.
    #[inline]
    pub fn find_lt(&self, storage: &S, key: &K) -> Option<Idx> {
        self.find_lt_by(storage, |k| k.cmp(key))
    }

    /// Smallest node with a key strictly above `key`.
    #[inline]
    pub fn find_gt(&self, storage: &S, key: &K) -> Option<Idx> {
        self.find_gt_by(storage, |k| k.cmp(key))
    }

    /// Node for `key` if present, else the greatest node below it.
    #[inline]
    pub fn find_le(&self, storage: &S, key: &K) -> Option<Idx> {
        self.find_le_by(storage, |k| k.cmp(key))
    }

    /// Node for `key` if present, else the smallest node above it.
    #[inline]
    pub fn find_ge(&self, storage: &S, key: &K) -> Option<Idx> {
        self.find_ge_by(storage, |k| k.cmp(key))
    }

    /// Removes the entry for `key` and returns the value, or `None`.
    pub fn remove(&mut self, storage: &mut S, key: &K) -> Option<V> {
        let idx = self.find(storage, key)?;
        self.remove_at(storage, idx).map(|(_, value)| value)
    }

    /// Checks the structural invariants, panicking on any violation.
    ///
    /// Verifies parent links, the search order between each node and
    /// its children, that every balance factor equals the actual
    /// subtree height difference, and that the node count matches
    /// `len`. For tests; walks the whole tree.
    pub fn validate(&self, storage: &S) {
        let mut count = 0usize;
        if self.root.is_some() {
            assert!(
                self.node(storage, self.root).parent.is_none(),
                "root has a parent"
            );
            self.check_subtree(storage, self.root, &mut count);
        }
        assert_eq!(count, self.len, "node count disagrees with len");
    }

    fn check_subtree(&self, storage: &S, idx: Idx, count: &mut usize) -> usize {
        let node = self.node(storage, idx);
        *count += 1;

        let mut heights = [0usize; 2];
        for side in [LEFT, RIGHT] {
            let child = node.child[side];
            if child.is_some() {
                let child_node = self.node(storage, child);
                assert!(child_node.parent == idx, "child back link broken");
                let ord = child_node.key.cmp(&node.key);
                if side == LEFT {
                    assert_ne!(ord, Ordering::Greater, "left child key above parent");
                } else {
                    assert_ne!(ord, Ordering::Less, "right child key below parent");
                }
                heights[side] = self.check_subtree(storage, child, count);
            }
        }

        assert!(
            (-1..=1).contains(&node.balance),
            "balance factor out of range"
        );
        assert_eq!(
            heights[LEFT] as i64 + i64::from(node.balance),
            heights[RIGHT] as i64,
            "balance factor disagrees with subtree heights"
        );

        heights[LEFT].max(heights[RIGHT]) + 1
    }
}

// =============================================================================
// Bounded storage impl
// =============================================================================

impl<K, V, S, Idx> AvlTree<K, V, S, Idx>
where
    Idx: Key,
    S: BoundedStorage<TreeNode<K, V, Idx>, Key = Idx>,
{
    /// Inserts a key-value pair. O(log n).
    ///
    /// # Errors
    ///
    /// Returns `Err(Full((key, value)))` if storage is full.
    pub fn try_insert(&mut self, storage: &mut S, key: K, value: V) -> Result<Idx, Full<(K, V)>>
    where
        K: Ord,
    {
        let (parent, side) = self.locate(storage, |k| k.cmp(&key));
        self.store_bounded(storage, key, value, parent, side)
    }

    /// Inserts through a three-way comparator ordering each probed node
    /// key against the new key. Use this with stateful comparators like
    /// [`PrefixCmp`] built over the new key.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full((key, value)))` if storage is full.
    pub fn try_insert_by<F>(
        &mut self,
        storage: &mut S,
        cmp: F,
        key: K,
        value: V,
    ) -> Result<Idx, Full<(K, V)>>
    where
        F: FnMut(&K) -> Ordering,
    {
        let (parent, side) = self.locate(storage, cmp);
        self.store_bounded(storage, key, value, parent, side)
    }

    fn store_bounded(
        &mut self,
        storage: &mut S,
        key: K,
        value: V,
        parent: Idx,
        side: usize,
    ) -> Result<Idx, Full<(K, V)>> {
        let idx = match storage.try_insert(TreeNode::new(key, value)) {
            Ok(idx) => idx,
            Err(Full(node)) => return Err(Full((node.key, node.value))),
        };
        self.link(storage, idx, parent, side);
        Ok(idx)
    }
}

// =============================================================================
// Unbounded storage impl
// =============================================================================

impl<K, V, S, Idx> AvlTree<K, V, S, Idx>
where
    Idx: Key,
    S: UnboundedStorage<TreeNode<K, V, Idx>, Key = Idx>,
{
    /// Inserts a key-value pair. O(log n).
    pub fn insert(&mut self, storage: &mut S, key: K, value: V) -> Idx
    where
        K: Ord,
    {
        let (parent, side) = self.locate(storage, |k| k.cmp(&key));
        let idx = storage.insert(TreeNode::new(key, value));
        self.link(storage, idx, parent, side);
        idx
    }

    /// Inserts through a three-way comparator ordering each probed node
    /// key against the new key.
    pub fn insert_by<F>(&mut self, storage: &mut S, cmp: F, key: K, value: V) -> Idx
    where
        F: FnMut(&K) -> Ordering,
    {
        let (parent, side) = self.locate(storage, cmp);
        let idx = storage.insert(TreeNode::new(key, value));
        self.link(storage, idx, parent, side);
        idx
    }
}

/// In-order iterator over tree entries.
pub struct Iter<'a, K, V, S, Idx>
where
    Idx: Key,
    S: Storage<TreeNode<K, V, Idx>, Key = Idx>,
{
    tree: &'a AvlTree<K, V, S, Idx>,
    storage: &'a S,
    current: Idx,
}

impl<'a, K, V, S, Idx> Iterator for Iter<'a, K, V, S, Idx>
where
    K: 'a,
    V: 'a,
    Idx: Key + 'a,
    S: Storage<TreeNode<K, V, Idx>, Key = Idx>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.current.is_none() {
            return None;
        }
        let node = self.storage.get(self.current).expect("invalid index");
        self.current = self.tree.next_index(self.storage, self.current);
        Some((&node.key, &node.value))
    }
}

// =============================================================================
// Prefix-memoizing string comparator
// =============================================================================

/// Three-way comparator for long string keys that skips re-scanning
/// already-matched prefixes.
///
/// During one descent every probed key on the less-than side of the
/// pivot shares at least `l_match` leading bytes with it, and every key
/// on the greater-than side shares at least `r_match`. The next
/// comparison can therefore resume at the shorter of the two instead of
/// at byte zero. Build a fresh comparator per operation; the memo is
/// only valid against a single pivot.
///
/// # Example
///
/// ```
/// use anchor_collections::{AvlTree, BoxedTreeStorage, PrefixCmp, Storage};
///
/// let mut storage: BoxedTreeStorage<String, u32> = BoxedTreeStorage::with_capacity(16);
/// let mut tree: AvlTree<String, u32, _> = AvlTree::new();
///
/// for (k, v) in [("aaa/one", 1), ("aaa/two", 2)] {
///     let mut cmp = PrefixCmp::new(k);
///     tree.try_insert_by(&mut storage, |probe| cmp.compare(probe), k.to_string(), v)
///         .unwrap();
/// }
///
/// let mut cmp = PrefixCmp::new("aaa/two");
/// let idx = tree.find_by(&storage, |probe| cmp.compare(probe)).unwrap();
/// assert_eq!(storage.get(idx).unwrap().value, 2);
/// ```
#[derive(Debug)]
pub struct PrefixCmp<'a> {
    pivot: &'a [u8],
    l_match: usize,
    r_match: usize,
}

impl<'a> PrefixCmp<'a> {
    /// Creates a comparator pinned to `pivot`.
    pub fn new(pivot: &'a str) -> Self {
        Self {
            pivot: pivot.as_bytes(),
            l_match: 0,
            r_match: 0,
        }
    }

    /// Orders `probe` against the pivot, resuming at the shortest
    /// prefix already confirmed equal on either side.
    ///
    /// End-of-string orders below any byte, so a proper prefix compares
    /// less than the longer string.
    pub fn compare(&mut self, probe: &str) -> Ordering {
        let probe = probe.as_bytes();
        let mut pos = self.l_match.min(self.r_match);
        loop {
            let pivot_byte = self.pivot.get(pos).copied();
            match probe.get(pos).copied().cmp(&pivot_byte) {
                Ordering::Less => {
                    self.l_match = pos;
                    return Ordering::Less;
                }
                Ordering::Greater => {
                    self.r_match = pos;
                    return Ordering::Greater;
                }
                Ordering::Equal => {
                    if pivot_byte.is_none() {
                        return Ordering::Equal;
                    }
                    pos += 1;
                }
            }
        }
    }
}
