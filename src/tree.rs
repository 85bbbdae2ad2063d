//! An ordered multiset of keys backed by a randomized binary search tree.

use std::{fmt, hash, hash::Hash, iter};

use crate::{
    chooser::{Chooser, Uniform},
    error::{InvariantViolation, TreeError},
    node::{self, Link, Node},
};

pub use crate::node::{IntoIter, Iter};

// ////////////////////////////////////////////////////////////////////////////
// RandomizedTree
// ////////////////////////////////////////////////////////////////////////////

/// A randomized binary search tree storing keys in sorted order.
///
/// Every node records the size of its subtree, which gives `O(log n)` access
/// by rank in addition to lookup by key. Balance is probabilistic: with
/// [`insert_balanced`](Self::insert_balanced), the shape of the tree is
/// distributed as if the keys had been inserted in a uniformly random order,
/// whatever the actual order, so the expected depth is `O(log n)`.
///
/// Duplicate keys are kept. A copy of an existing key is placed after the
/// copies already present.
///
/// The random choices are made by a [`Chooser`], [`Uniform`] by default. A
/// fixed seed can be supplied through [`with_seed`](Self::with_seed) for
/// reproducible shapes.
///
/// # Examples
///
/// ```
/// use rbst::RandomizedTree;
///
/// let mut tree = RandomizedTree::new();
/// for key in [5, 3, 8, 1, 4] {
///     tree.insert_balanced(key);
/// }
///
/// assert_eq!(tree.len(), 5);
/// assert_eq!(tree.select(0).map(|n| *n.key()), Ok(1));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 8]);
/// ```
pub struct RandomizedTree<K, C = Uniform> {
    root: Link<K>,
    chooser: C,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K> RandomizedTree<K, Uniform> {
    /// Create an empty tree whose choices are seeded from the thread-local
    /// generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let tree: RandomizedTree<i64> = RandomizedTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_chooser(Uniform::new())
    }

    /// Create an empty tree whose choices follow a fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let mut a = RandomizedTree::with_seed(7);
    /// let mut b = RandomizedTree::with_seed(7);
    /// a.extend(0..100);
    /// b.extend(0..100);
    /// assert_eq!(a.height(), b.height());
    /// ```
    #[inline]
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_chooser(Uniform::seeded(seed))
    }
}

impl<K, C> RandomizedTree<K, C> {
    /// Create an empty tree using the given chooser.
    #[inline]
    pub fn with_chooser(chooser: C) -> Self {
        RandomizedTree {
            root: None,
            chooser,
        }
    }

    /// Returns the number of keys in the tree.
    ///
    /// This reads the size stored at the root and takes constant time.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let tree: RandomizedTree<_> = (0..10).collect();
    /// assert_eq!(tree.len(), 10);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        node::size(self.root.as_deref())
    }

    /// Returns `true` if the tree contains no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every key.
    #[inline]
    pub fn clear(&mut self) {
        node::dismantle(self.root.take());
    }

    /// The root node, or `None` for an empty tree.
    #[inline]
    pub fn root(&self) -> Option<&Node<K>> {
        self.root.as_deref()
    }

    /// Number of nodes on the longest path from the root to a leaf.
    #[inline]
    pub fn height(&self) -> usize {
        node::height(self.root.as_deref())
    }

    /// Returns the node holding the key of the given rank, the `rank`-th
    /// smallest key counting from zero.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::RankOutOfRange`] unless `rank < len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::{RandomizedTree, TreeError};
    ///
    /// let tree: RandomizedTree<_> = [30, 10, 20].into_iter().collect();
    /// assert_eq!(tree.select(1).map(|n| *n.key()), Ok(20));
    /// assert_eq!(
    ///     tree.select(3).map(|n| *n.key()),
    ///     Err(TreeError::RankOutOfRange { rank: 3, len: 3 })
    /// );
    /// ```
    #[inline]
    pub fn select(&self, rank: usize) -> Result<&Node<K>, TreeError> {
        node::select(self.root.as_deref(), rank).ok_or_else(|| {
            tracing::debug!(rank, len = self.len(), "select rank out of range");
            TreeError::RankOutOfRange {
                rank,
                len: self.len(),
            }
        })
    }

    /// Returns the smallest key.
    #[inline]
    pub fn first(&self) -> Option<&K> {
        node::first(self.root.as_deref()).map(Node::key)
    }

    /// Returns the largest key.
    #[inline]
    pub fn last(&self) -> Option<&K> {
        node::last(self.root.as_deref()).map(Node::key)
    }

    /// Iterates over the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let tree: RandomizedTree<_> = [3, 1, 2].into_iter().collect();
    /// assert!(tree.iter().eq(&[1, 2, 3]));
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root.as_deref())
    }
}

impl<K, C> RandomizedTree<K, C>
where
    K: Ord,
    C: Chooser,
{
    /// Inserts a key as a new leaf, without any rebalancing.
    ///
    /// Inserting keys in sorted order with this method produces a chain of
    /// depth `n`. It is kept alongside
    /// [`insert_balanced`](Self::insert_balanced) as a baseline.
    #[inline]
    pub fn insert(&mut self, key: K) {
        node::insert(&mut self.root, key);
    }

    /// Inserts a key, keeping the tree randomly balanced.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let mut tree = RandomizedTree::with_seed(1);
    /// for key in 0..1_000 {
    ///     tree.insert_balanced(key);
    /// }
    /// assert!(tree.height() < 100);
    /// ```
    #[inline]
    pub fn insert_balanced(&mut self, key: K) {
        node::insert_balanced(&mut self.root, key, &mut self.chooser);
    }

    /// Returns the node holding `key`, if any.
    ///
    /// When the key appears more than once, the copy closest to the root is
    /// returned.
    #[inline]
    pub fn find(&self, key: &K) -> Option<&Node<K>> {
        node::find(self.root.as_deref(), key)
    }

    /// Returns `true` if the tree holds `key`.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the rank of the first occurrence of `key`, that is the number of
    /// keys strictly less than it.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let tree: RandomizedTree<_> = [1, 3, 3, 7].into_iter().collect();
    /// assert_eq!(tree.rank_of(&3), Some(1));
    /// assert_eq!(tree.rank_of(&7), Some(3));
    /// assert_eq!(tree.rank_of(&4), None);
    /// ```
    #[inline]
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        node::rank_of(self.root.as_deref(), key)
    }

    /// Removes one occurrence of `key` and returns it.
    ///
    /// The removed node is replaced by the random join of its two subtrees.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::KeyNotFound`] if `key` is not present, in which
    /// case the tree is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::{RandomizedTree, TreeError};
    ///
    /// let mut tree: RandomizedTree<_> = [5, 3, 8].into_iter().collect();
    /// assert_eq!(tree.remove(&3), Ok(3));
    /// assert_eq!(tree.remove(&3), Err(TreeError::KeyNotFound));
    /// assert_eq!(tree.len(), 2);
    /// ```
    #[inline]
    pub fn remove(&mut self, key: &K) -> Result<K, TreeError> {
        node::remove(&mut self.root, key, &mut self.chooser).ok_or_else(|| {
            tracing::debug!("remove of a key that is not present");
            TreeError::KeyNotFound
        })
    }

    /// Splits the tree in two, leaving the keys `<= key` in `self` and
    /// returning a tree with the keys `> key`.
    ///
    /// No node is allocated or freed. The returned tree receives a chooser
    /// forked from this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let mut tree: RandomizedTree<_> = (0..10).collect();
    /// let high = tree.split_off(&4);
    /// assert!(tree.iter().eq(&[0, 1, 2, 3, 4]));
    /// assert!(high.iter().eq(&[5, 6, 7, 8, 9]));
    /// ```
    #[inline]
    #[must_use]
    pub fn split_off(&mut self, key: &K) -> Self {
        let (left, right) = node::split(self.root.take(), key);
        self.root = left;
        RandomizedTree {
            root: right,
            chooser: self.chooser.fork(),
        }
    }

    /// Splits the tree into the keys `<= key` and the keys `> key`.
    #[inline]
    #[must_use]
    pub fn split(mut self, key: &K) -> (Self, Self) {
        let right = self.split_off(key);
        (self, right)
    }

    /// Moves every key of `other` into `self`, leaving `other` empty.
    ///
    /// Every key of `self` must be `<=` every key of `other`. The root of the
    /// joined tree is picked at random between the two roots, weighted by the
    /// size of each tree.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::JoinOrder`] if the largest key of `self` is
    /// greater than the smallest key of `other`. Both trees are then left
    /// unchanged.
    #[inline]
    pub fn append(&mut self, other: &mut Self) -> Result<(), TreeError> {
        if let (Some(max), Some(min)) = (self.last(), other.first()) {
            if max > min {
                tracing::debug!(
                    left = self.len(),
                    right = other.len(),
                    "join of overlapping trees"
                );
                return Err(TreeError::JoinOrder);
            }
        }
        let left = self.root.take();
        let right = other.root.take();
        self.root = node::join(left, right, &mut self.chooser);
        Ok(())
    }

    /// Joins two trees, where every key of `left` is `<=` every key of
    /// `right`. The result keeps the chooser of `left`.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::JoinOrder`] if the key ranges overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbst::RandomizedTree;
    ///
    /// let tree: RandomizedTree<_> = (0..10).collect();
    /// let (low, high) = tree.split(&4);
    /// let joined = RandomizedTree::join(low, high).unwrap();
    /// assert!(joined.iter().eq(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]));
    /// ```
    #[inline]
    pub fn join(mut left: Self, mut right: Self) -> Result<Self, TreeError> {
        left.append(&mut right)?;
        Ok(left)
    }

    /// Audits the whole tree: every stored size and the order of the keys.
    ///
    /// # Errors
    ///
    /// Reports the first defect found.
    #[inline]
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        node::check_sizes(self.root.as_deref())?;
        let mut keys = self.iter();
        let Some(mut prev) = keys.next() else {
            return Ok(());
        };
        for (i, key) in keys.enumerate() {
            if key < prev {
                return Err(InvariantViolation::OrderViolation { rank: i + 1 });
            }
            prev = key;
        }
        Ok(())
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K, C> Drop for RandomizedTree<K, C> {
    #[inline]
    fn drop(&mut self) {
        node::dismantle(self.root.take());
    }
}

impl<K, C> Default for RandomizedTree<K, C>
where
    C: Default,
{
    #[inline]
    fn default() -> Self {
        Self::with_chooser(C::default())
    }
}

/// This implementation of `PartialEq` only compares the keys in order; the
/// shapes of the trees and their choosers are not considered.
impl<A, B, C1, C2> PartialEq<RandomizedTree<B, C2>> for RandomizedTree<A, C1>
where
    A: PartialEq<B>,
{
    #[inline]
    fn eq(&self, other: &RandomizedTree<B, C2>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, C> Eq for RandomizedTree<K, C> {}

impl<K: Hash, C> Hash for RandomizedTree<K, C> {
    #[inline]
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for key in self {
            key.hash(state);
        }
    }
}

impl<K, C> Extend<K> for RandomizedTree<K, C>
where
    K: Ord,
    C: Chooser,
{
    #[inline]
    fn extend<I: IntoIterator<Item = K>>(&mut self, iterable: I) {
        for key in iterable {
            self.insert_balanced(key);
        }
    }
}

impl<K, C> iter::FromIterator<K> for RandomizedTree<K, C>
where
    K: Ord,
    C: Chooser + Default,
{
    #[inline]
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<K, C> IntoIterator for RandomizedTree<K, C> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    #[inline]
    fn into_iter(mut self) -> IntoIter<K> {
        IntoIter::new(self.root.take())
    }
}

impl<'a, K, C> IntoIterator for &'a RandomizedTree<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    #[inline]
    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K, C> fmt::Debug for RandomizedTree<K, C>
where
    K: fmt::Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K, C> fmt::Display for RandomizedTree<K, C>
where
    K: fmt::Display,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;

        for (i, key) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "]")
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
