//! Order-parameterized B-tree for Rust.
//!
//! This crate provides [`BTree`], an ordered store of unique keys backed by a
//! classic B-tree (keys in every node, not just the leaves). Unlike the
//! standard library's `BTreeSet`, the tree *order* - the maximum number of
//! children an internal node may hold - is chosen at construction time, and
//! the key ordering can be supplied as an explicit [`Comparator`] instead of
//! relying on `Ord` alone.
//!
//! # Example
//!
//! ```
//! use mway_tree::BTree;
//!
//! let mut tree = BTree::new(4);
//! tree.insert(20).unwrap();
//! tree.insert(10).unwrap();
//! tree.insert(30).unwrap();
//!
//! assert!(tree.contains(&10));
//! assert!(tree.insert(20).is_err()); // duplicate keys are rejected
//!
//! assert_eq!(tree.remove(&20).unwrap(), 20);
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [10, 30]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library
//!   dependency
//! - **Runtime order** - Fan-out is a constructor parameter, not a
//!   compile-time constant
//! - **Explicit comparators** - Ordering is configuration passed to the
//!   constructor, never ambient state
//!
//! # Implementation
//!
//! Nodes are stored in an index-addressed arena; child and parent links are
//! niche-optimized handles rather than owning pointers, so the cyclic
//! child/parent graph involves no shared ownership. Rebalancing is the
//! textbook machinery: median splits on overflow, and a borrow-then-merge
//! cascade on underflow that prefers depth-preserving rotations over merges.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod btree;
pub mod compare;
pub mod error;

pub use btree::BTree;
pub use compare::{Comparator, NaturalOrder};
pub use error::{Error, Result};
