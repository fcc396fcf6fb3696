//! Index-linked containers with external storage.
//!
//! This crate provides the container layer for tools that hold many
//! small records in pre-sized pools: linked lists, singly-linked
//! queues, a fixed-bucket hash map, and an AVL tree, all coordinating
//! stable integer keys into caller-provided storage. The key insight:
//! separate storage from structure.
//!
//! # Design Philosophy
//!
//! Traditional collections own their data:
//!
//! ```text
//! Vec<Record>    - owns records, indices unstable on removal
//! BTreeMap<K,V>  - owns values, allocates on insert
//! LinkedList<T>  - owns nodes, pointer chasing, poor cache locality
//! ```
//!
//! This crate inverts the model:
//!
//! ```text
//! Storage (slab)              - owns records, provides stable keys
//! List/Queue/HashMap/AvlTree  - coordinate keys, don't own records
//! ```
//!
//! Benefits:
//! - **Stable keys**: Remove from the middle without invalidating other keys
//! - **Zero allocation on hot path**: Pre-allocate storage at startup
//! - **Shared storage**: One record can sit in several containers at once,
//!   carrying one set of links per container
//! - **O(1) or O(log n) everywhere**: no rehashing, no tree node allocation
//!
//! # Quick Start
//!
//! ```
//! use anchor_collections::{AvlTree, BoxedTreeStorage, Storage};
//!
//! // Storage owns the records (wrapped in TreeNode internally)
//! let mut storage: BoxedTreeStorage<u64, &str> = BoxedTreeStorage::with_capacity(1000);
//!
//! // The tree coordinates keys into storage
//! let mut ranges: AvlTree<u64, &str, _> = AvlTree::new();
//!
//! ranges.try_insert(&mut storage, 0x1000, "text").unwrap();
//! ranges.try_insert(&mut storage, 0x8000, "data").unwrap();
//!
//! // Floor query: which range does 0x5000 fall into?
//! let idx = ranges.find_le(&storage, &0x5000).unwrap();
//! assert_eq!(storage.get(idx).unwrap().value, "text");
//! ```
//!
//! # Intrusive Links
//!
//! [`List`] and [`Queue`] keep their links inside the caller's record
//! type, through the [`Linked`] and [`Chained`] traits. A record can
//! implement both and sit in a list and a queue simultaneously; each
//! container only touches its own links. [`FixedHashMap`] and
//! [`AvlTree`] instead wrap the value in their own node types
//! ([`HashNode`], [`TreeNode`]), since their links are keyed.
//!
//! # Critical Invariant: Same Storage Instance
//!
//! All operations on a container must use the same storage instance,
//! and a record must be linked into at most one container per link set.
//! This is the caller's responsibility (same discipline as the `slab`
//! crate). Passing a different storage corrupts links.
//!
//! Every container also exposes a `validate(&storage)` routine that
//! walks the structure and panics on any broken invariant; tests lean
//! on these after mutation batches.
//!
//! # Storage Options
//!
//! | Storage | Capacity | Allocation | Use Case |
//! |---------|----------|------------|----------|
//! | [`BoxedStorage`] | Fixed (runtime) | Single heap alloc | Default choice |
//! | `slab::Slab` | Growable | May reallocate | When size unknown |
//!
//! Enable the `slab` feature to use `slab::Slab` as a backend.
//!
//! # Storage Traits
//!
//! Storage is split into bounded and unbounded variants:
//!
//! ```text
//! Storage<T>           - base trait: get, remove, len
//!     │
//!     ├── BoundedStorage<T>   - fixed capacity, try_insert -> Result
//!     │
//!     └── UnboundedStorage<T> - growable, insert -> Key (infallible)
//! ```
//!
//! This enables different APIs for the containers:
//! - `try_insert` for bounded storage (returns `Result<Idx, Full<_>>`)
//! - `insert` for unbounded storage (returns `Idx`, infallible)
//!
//! # Containers
//!
//! | Structure | Use Case | Key Operations |
//! |-----------|----------|----------------|
//! | [`List`] | FIFO queues, LRU orders | O(1) push/pop/remove |
//! | [`Queue`] | Free lists, chains | O(1) push/pop, next-only links |
//! | [`FixedHashMap`] | Exact lookup, bounded key sets | O(1) insert, O(chain) find |
//! | [`AvlTree`] | Ordered maps, floor/ceiling queries | O(log n) everything |
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab`

#![warn(missing_docs)]

pub mod hash;
pub mod key;
pub mod linked;
pub mod owned;
pub mod queue;
pub mod storage;
pub mod tree;

pub use hash::{BoxedHashStorage, FixedHashMap, HashNode};
pub use key::Key;
pub use linked::{Linked, List};
pub use owned::{OwnedAvl, OwnedHashMap, OwnedList};
pub use queue::{Chained, Queue};
pub use storage::{BoundedStorage, BoxedStorage, Full, Storage, UnboundedStorage};
pub use tree::{AvlTree, BoxedTreeStorage, PrefixCmp, TreeNode};

#[cfg(feature = "slab")]
pub use hash::SlabHashStorage;
#[cfg(feature = "slab")]
pub use tree::SlabTreeStorage;
