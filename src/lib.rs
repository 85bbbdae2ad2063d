//! A randomized binary search tree is a way of storing keys in sorted order
//! such that lookup, insertion, removal, rank queries, splitting and joining
//! all take `O(log(n))` time in expectation, whatever order the keys arrive in.
//!
//! Each node records the size of its own subtree:
//!
//! ```text
//!              [4|5]
//!             /     \
//!        [1|2]       [8|2]
//!            \       /
//!           [3|1] [5|1]
//! ```
//!
//! where `[k|s]` is a node with key `k` heading a subtree of `s` keys. Sizes
//! give access by rank, and also drive the balancing: a newly inserted key
//! becomes the root of a subtree that will hold `n` keys with probability
//! `1/n`, and when two subtrees are joined, each root is picked with
//! probability proportional to the size of its subtree. The resulting tree is
//! distributed exactly as if the keys had been inserted in a uniformly random
//! order.
//!
//! Keys are only required to implement [`Ord`], which **must** be
//! well-behaved. Specifically, it must be a total order:
//!
//! - Be well defined: `a.cmp(b)` should always return the same value
//! - Be anti-symmetric: `a.cmp(b) == Greater` iff `b.cmp(a) == Less`.
//! - Be transitive: If `a.cmp(b) == Greater` and `b.cmp(c) == Greater` then
//!   `a.cmp(c) == Greater`.
//!
//! Failure to satisfy these properties will produce an unsorted tree, although
//! never undefined behavior.

mod chooser;
mod error;
mod node;
mod tree;

pub use chooser::{Chooser, Uniform, uniform::UniformError};
pub use error::{InvariantViolation, TreeError};
pub use node::Node;
pub use tree::{IntoIter, Iter, RandomizedTree};
