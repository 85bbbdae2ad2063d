//! Errors reported by [`RandomizedTree`][crate::RandomizedTree].
//!
//! Every error here signals caller misuse of an operation with a precondition.
//! A tree that returns one of these is left exactly as it was before the call.

use thiserror::Error;

/// Contract violations reported by tree operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum TreeError {
    /// A rank was requested outside of `[0, len)`.
    #[error("rank {rank} is out of range for a tree of {len} keys.")]
    RankOutOfRange {
        /// The requested rank.
        rank: usize,
        /// The number of keys in the tree.
        len: usize,
    },
    /// The key to remove is not present in the tree.
    #[error("key is not present in the tree.")]
    KeyNotFound,
    /// The largest key on the left exceeds the smallest key on the right.
    #[error("every key on the left must be <= every key on the right.")]
    JoinOrder,
}

/// Structural defects found by [`RandomizedTree::verify`][crate::RandomizedTree::verify].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantViolation {
    /// A node's stored size disagrees with `1 + size(left) + size(right)`.
    #[error("node stores size {stored} but its subtree holds {actual} nodes.")]
    SizeMismatch {
        /// The size recorded in the node.
        stored: usize,
        /// The size recomputed from its children.
        actual: usize,
    },
    /// An in-order traversal produced a key smaller than its predecessor.
    #[error("in-order traversal is not sorted at rank {rank}.")]
    OrderViolation {
        /// Rank of the first key that compares less than its predecessor.
        rank: usize,
    },
}
