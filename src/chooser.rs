//! Randomized balancing needs a source of uniform choices.
//!
//! Two decisions drive the shape of a [`RandomizedTree`][crate::RandomizedTree]:
//!
//! - On a balanced insertion into a subtree that will hold $n$ keys, the new
//!   key becomes the root of that subtree with probability $1/n$.
//! - When two trees of sizes $l$ and $r$ are joined, the root of the left tree
//!   becomes the joined root with probability $l / (l + r)$, and the root of
//!   the right tree otherwise.
//!
//! Both reduce to drawing a uniform integer below some bound, which is the
//! only thing a [`Chooser`] must provide. The default is [`Uniform`], backed by
//! a small, fast PRNG; tests may supply their own implementation to script
//! exact outcomes.

pub mod uniform;

pub use uniform::Uniform;

// ////////////////////////////////////////////////////////////////////////////
// Chooser
// ////////////////////////////////////////////////////////////////////////////

/// Source of the uniform random choices made while rebalancing.
pub trait Chooser {
    /// Draw an integer uniformly from `[0, bound)`.
    ///
    /// `bound` is always at least 1. This function should _never_ return a
    /// value greater or equal to `bound`.
    #[must_use]
    fn below(&mut self, bound: usize) -> usize;

    /// Derive an independent chooser, used by the second tree produced by a
    /// split.
    #[must_use]
    fn fork(&mut self) -> Self
    where
        Self: Sized;

    /// Whether a key inserted into a subtree that will hold `size` keys should
    /// become that subtree's root.
    #[inline]
    #[must_use]
    fn promote(&mut self, size: usize) -> bool {
        self.below(size) == 0
    }

    /// Whether the left root should become the root when joining subtrees of
    /// `left` and `right` keys.
    #[inline]
    #[must_use]
    fn take_left(&mut self, left: usize, right: usize) -> bool {
        self.below(left + right) < left
    }
}
