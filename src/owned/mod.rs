//! Convenience wrappers that own their storage.
//!
//! The types in this module combine an engine with its backing
//! [`BoxedStorage`](crate::BoxedStorage), providing a value-level API
//! for cases where you don't need to share storage across multiple
//! containers.
//!
//! # When to use owned variants
//!
//! Use [`OwnedList`], [`OwnedHashMap`], or [`OwnedAvl`] when:
//! - You have a single container (not several sharing one record pool)
//! - You want a simpler API without passing `&mut storage` to every method
//! - You don't need to thread one record through multiple containers
//!
//! # When to use the raw variants
//!
//! Use [`List`](crate::List), [`FixedHashMap`](crate::FixedHashMap), or
//! [`AvlTree`](crate::AvlTree) with external storage when:
//! - Multiple containers index one storage pool (e.g. a table plus an
//!   eviction list over the same records)
//! - You want finer control over memory layout and allocation
//!
//! # Example
//!
//! ```
//! use anchor_collections::OwnedAvl;
//!
//! let mut ranges: OwnedAvl<u64, &str> = OwnedAvl::with_capacity(100);
//! ranges.insert(0x1000, "text").unwrap();
//! ranges.insert(0x8000, "data").unwrap();
//!
//! // Which section does 0x5000 fall into?
//! let idx = ranges.find_le(&0x5000).unwrap();
//! assert_eq!(ranges.get_at(idx), Some((&0x1000, &"text")));
//! ```

mod hash;
mod list;
mod tree;

pub use hash::OwnedHashMap;
pub use list::OwnedList;
pub use tree::OwnedAvl;
