//! An ordered map for Rust, backed by an arena-allocated AVL tree.
//!
//! This crate provides [`AvlMap`], an ordered associative container mapping
//! unique keys to values, with:
//!
//! - O(log n) lookup, insertion and removal, kept logarithmic by classic
//!   AVL height-balancing (every node's subtree heights differ by at most
//!   one).
//! - In-key-order iteration from either end
//!   ([`iter`](AvlMap::iter)/[`iter_mut`](AvlMap::iter_mut) are
//!   double-ended).
//! - Explicit bidirectional [`Cursor`](avl_map::Cursor)s that can be parked
//!   on an entry and stepped one position at a time, reporting boundary
//!   misuse as [`MapError`] values instead of panicking.
//! - An [`Entry` API](AvlMap::entry) for get-or-insert patterns.
//!
//! # Example
//!
//! ```
//! use avlmap::AvlMap;
//!
//! let mut primes = AvlMap::new();
//! for p in [5, 3, 7, 2] {
//!     primes.insert(p, p * p);
//! }
//!
//! // Entries come out in key order no matter the insertion order.
//! let keys: Vec<_> = primes.keys().copied().collect();
//! assert_eq!(keys, [2, 3, 5, 7]);
//!
//! // Walk backwards from past-the-end.
//! let mut cursor = primes.cursor_end();
//! cursor.move_prev()?;
//! assert_eq!(cursor.key_value()?, (&7, &49));
//! # Ok::<(), avlmap::MapError>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library
//!   dependency
//! - **Arena storage** - Nodes address each other by index; rotations
//!   re-link indices and never move or reallocate entries
//! - **Stable positions** - Inserting or removing one entry never disturbs
//!   cursors or references parked on other entries
//!
//! # Implementation
//!
//! The tree stores its nodes in a slot arena and its values in a second
//! one. Every link (parent, children, root, cursor position) is an optional
//! niche-compressed index, with `None` serving as the shared nil: leaf
//! terminator, empty root, and the past-the-end position, all at once.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: We have to allow unsafe code for `IterMut`, which hands out mutable
// value references while it walks the node structure.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

extern crate alloc;

mod error;
mod raw;

pub mod avl_map;

pub use avl_map::AvlMap;
pub use error::MapError;
