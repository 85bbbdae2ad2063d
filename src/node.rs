//! Nodes of a randomized binary search tree, and the operations that reshape
//! them.
//!
//! Every node owns its two children through a [`Link`], and records the number
//! of nodes in its own subtree. The operations below consume or mutably borrow
//! the link they reshape and leave it holding the resulting subtree. Each one
//! restores `size = 1 + size(left) + size(right)` on every node it touches
//! before returning.
//!
//! Plain insertion of sorted keys builds chains as long as the input, so every
//! walk here is a loop, never a recursion per level.

use std::cmp::Ordering;

use crate::{chooser::Chooser, error::InvariantViolation};

/// An owned, possibly empty subtree.
pub(crate) type Link<K> = Option<Box<Node<K>>>;

// ////////////////////////////////////////////////////////////////////////////
// Node
// ////////////////////////////////////////////////////////////////////////////

/// A single key in a [`RandomizedTree`][crate::RandomizedTree].
///
/// Keys in the left subtree compare strictly less than this node's key; keys
/// in the right subtree compare greater or equal, so duplicates always sit to
/// the right of the copies inserted before them.
#[derive(Debug)]
pub struct Node<K> {
    key: K,
    // Number of nodes in the subtree rooted here, including this one.
    size: usize,
    left: Link<K>,
    right: Link<K>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K> Node<K> {
    /// Create a new leaf.
    pub(crate) fn new(key: K) -> Self {
        Node {
            key,
            size: 1,
            left: None,
            right: None,
        }
    }

    /// The key held by this node.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The number of keys in the subtree rooted at this node.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The subtree of keys less than this node's key.
    #[inline]
    pub fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    /// The subtree of keys greater or equal to this node's key.
    #[inline]
    pub fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    pub(crate) fn into_parts(self) -> (K, Link<K>, Link<K>) {
        (self.key, self.left, self.right)
    }

    /// Recompute `size` from the children.
    fn update_size(&mut self) {
        self.size = 1 + size(self.left.as_deref()) + size(self.right.as_deref());
    }
}

/// Size of a possibly empty subtree.
#[inline]
pub(crate) fn size<K>(node: Option<&Node<K>>) -> usize {
    node.map_or(0, |n| n.size)
}

// ////////////////////////////////////////////////////////////////////////////
// Lookup
// ////////////////////////////////////////////////////////////////////////////

/// Find the topmost node holding `key`.
pub(crate) fn find<'a, K: Ord>(mut node: Option<&'a Node<K>>, key: &K) -> Option<&'a Node<K>> {
    while let Some(n) = node {
        node = match key.cmp(&n.key) {
            Ordering::Less => n.left(),
            Ordering::Equal => return Some(n),
            Ordering::Greater => n.right(),
        };
    }
    None
}

/// Find the node of the given 0-indexed rank.
///
/// Returns `None` if `rank` is not below the size of the subtree.
pub(crate) fn select<K>(mut node: Option<&Node<K>>, mut rank: usize) -> Option<&Node<K>> {
    while let Some(n) = node {
        let left_size = size(n.left());
        match rank.cmp(&left_size) {
            Ordering::Equal => return Some(n),
            Ordering::Less => node = n.left(),
            Ordering::Greater => {
                rank -= left_size + 1;
                node = n.right();
            }
        }
    }
    None
}

/// Number of keys strictly less than `key`, provided `key` is present.
pub(crate) fn rank_of<K: Ord>(mut node: Option<&Node<K>>, key: &K) -> Option<usize> {
    let mut rank = 0;
    let mut found = false;
    while let Some(n) = node {
        if *key <= n.key {
            found |= *key == n.key;
            node = n.left();
        } else {
            rank += size(n.left()) + 1;
            node = n.right();
        }
    }
    found.then_some(rank)
}

/// The leftmost node.
pub(crate) fn first<K>(mut node: Option<&Node<K>>) -> Option<&Node<K>> {
    while let Some(left) = node?.left() {
        node = Some(left);
    }
    node
}

/// The rightmost node.
pub(crate) fn last<K>(mut node: Option<&Node<K>>) -> Option<&Node<K>> {
    while let Some(right) = node?.right() {
        node = Some(right);
    }
    node
}

/// Number of nodes on the longest root-to-leaf path.
pub(crate) fn height<K>(node: Option<&Node<K>>) -> usize {
    let mut stack: Vec<(&Node<K>, usize)> = node.into_iter().map(|n| (n, 1)).collect();
    let mut deepest = 0;
    while let Some((n, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        stack.extend(n.left().map(|c| (c, depth + 1)));
        stack.extend(n.right().map(|c| (c, depth + 1)));
    }
    deepest
}

// ////////////////////////////////////////////////////////////////////////////
// Insertion
// ////////////////////////////////////////////////////////////////////////////

/// Plain BST insertion: attach a new leaf, with no rebalancing.
///
/// Sorted input degrades the subtree into a chain, so this walks down
/// iteratively rather than recursing once per level.
pub(crate) fn insert<K: Ord>(link: &mut Link<K>, key: K) {
    let mut link = link;
    while let Some(node) = link {
        node.size += 1;
        link = if key < node.key {
            &mut node.left
        } else {
            &mut node.right
        };
    }
    *link = Some(Box::new(Node::new(key)));
}

/// Randomized insertion.
///
/// In a subtree that will hold `n` keys after the insertion, the new key
/// becomes the root with probability `1/n`: the subtree is split around it and
/// the two halves become its children. Otherwise the insertion descends as
/// usual. The resulting shape is distributed as if the keys had arrived in a
/// uniformly random order.
pub(crate) fn insert_balanced<K: Ord, C: Chooser>(link: &mut Link<K>, key: K, chooser: &mut C) {
    let mut link = link;
    loop {
        let Some(size) = link.as_ref().map(|n| n.size) else {
            *link = Some(Box::new(Node::new(key)));
            return;
        };
        if chooser.promote(size + 1) {
            tracing::trace!(size = size + 1, "promoting inserted key to subtree root");
            break;
        }
        let Some(node) = link.as_mut() else {
            return;
        };
        node.size += 1;
        link = if key < node.key {
            &mut node.left
        } else {
            &mut node.right
        };
    }

    let (left, right) = split(link.take(), &key);
    let mut root = Box::new(Node::new(key));
    root.left = left;
    root.right = right;
    root.update_size();
    *link = Some(root);
}

// ////////////////////////////////////////////////////////////////////////////
// Split & Join
// ////////////////////////////////////////////////////////////////////////////

/// Partition a subtree into the keys `<= key` and the keys `> key`.
///
/// No node is created or destroyed; existing nodes are re-parented and their
/// sizes recomputed.
pub(crate) fn split<K: Ord>(link: Link<K>, key: &K) -> (Link<K>, Link<K>) {
    // Detach the search path, remembering which side each node belongs to.
    let mut path: Vec<(Box<Node<K>>, bool)> = Vec::new();
    let mut link = link;
    while let Some(mut node) = link {
        let goes_right = *key < node.key;
        link = if goes_right {
            node.left.take()
        } else {
            node.right.take()
        };
        path.push((node, goes_right));
    }

    let (mut left, mut right) = (None, None);
    while let Some((mut node, goes_right)) = path.pop() {
        if goes_right {
            node.left = right;
            node.update_size();
            right = Some(node);
        } else {
            node.right = left;
            node.update_size();
            left = Some(node);
        }
    }
    (left, right)
}

/// Merge two subtrees, where every key of `left` is `<=` every key of `right`.
///
/// The joined root is drawn from the two roots with probability proportional
/// to the size of their subtrees.
pub(crate) fn join<K, C: Chooser>(mut left: Link<K>, mut right: Link<K>, chooser: &mut C) -> Link<K> {
    let mut joined = None;
    let mut slot = &mut joined;
    loop {
        match (left, right) {
            (None, rest) | (rest, None) => {
                *slot = rest;
                return joined;
            }
            (Some(mut l), Some(mut r)) => {
                // Whichever root is kept ends up above every node of both sides.
                let total = l.size + r.size;
                if chooser.take_left(l.size, r.size) {
                    tracing::trace!(left = l.size, right = r.size, "join keeps left root");
                    left = l.right.take();
                    right = Some(r);
                    l.size = total;
                    slot = &mut slot.insert(l).right;
                } else {
                    tracing::trace!(left = l.size, right = r.size, "join keeps right root");
                    right = r.left.take();
                    left = Some(l);
                    r.size = total;
                    slot = &mut slot.insert(r).left;
                }
            }
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Removal
// ////////////////////////////////////////////////////////////////////////////

/// Remove the topmost node holding `key`, replacing it with the join of its
/// children, and return its key.
///
/// A missing key is detected before any size is decremented, so it leaves the
/// subtree untouched.
pub(crate) fn remove<K: Ord, C: Chooser>(link: &mut Link<K>, key: &K, chooser: &mut C) -> Option<K> {
    find(link.as_deref(), key)?;
    let mut link = link;
    loop {
        let goes_left = match link.as_ref().map(|n| key.cmp(&n.key))? {
            Ordering::Equal => break,
            Ordering::Less => true,
            Ordering::Greater => false,
        };
        let Some(node) = link.as_mut() else {
            return None;
        };
        node.size -= 1;
        link = if goes_left {
            &mut node.left
        } else {
            &mut node.right
        };
    }

    let (removed, left, right) = link.take()?.into_parts();
    tracing::trace!("excising node");
    *link = join(left, right, chooser);
    Some(removed)
}

/// Free a subtree without recursing, so that arbitrarily deep chains can be
/// dropped.
pub(crate) fn dismantle<K>(link: Link<K>) {
    let mut stack: Vec<Box<Node<K>>> = link.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Integrity
// ////////////////////////////////////////////////////////////////////////////

/// Check the size of every node against the sizes stored in its children,
/// returning the size of the subtree.
pub(crate) fn check_sizes<K>(node: Option<&Node<K>>) -> Result<usize, InvariantViolation> {
    let mut stack: Vec<&Node<K>> = node.into_iter().collect();
    while let Some(n) = stack.pop() {
        let actual = 1 + size(n.left()) + size(n.right());
        if actual != n.size {
            return Err(InvariantViolation::SizeMismatch {
                stored: n.size,
                actual,
            });
        }
        stack.extend(n.left());
        stack.extend(n.right());
    }
    Ok(size(node))
}

// ////////////////////////////////////////////////////////////////////////////
// Iterators
// ////////////////////////////////////////////////////////////////////////////

/// Borrowing in-order iterator over the keys of a tree.
///
/// Created by [`RandomizedTree::iter`][crate::RandomizedTree::iter].
pub struct Iter<'a, K> {
    // Nodes whose left subtree has been pushed but which are not yet yielded.
    stack: Vec<&'a Node<K>>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(root: Option<&'a Node<K>>) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: size(root),
        };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut node: Option<&'a Node<K>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right());
        self.remaining -= 1;
        Some(&node.key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> std::iter::FusedIterator for Iter<'_, K> {}

/// Owning in-order iterator over the keys of a tree.
///
/// Created by the [`IntoIterator`] implementation of
/// [`RandomizedTree`][crate::RandomizedTree].
pub struct IntoIter<K> {
    stack: Vec<Box<Node<K>>>,
    remaining: usize,
}

impl<K> IntoIter<K> {
    pub(crate) fn new(root: Link<K>) -> Self {
        let mut iter = IntoIter {
            stack: Vec::new(),
            remaining: size(root.as_deref()),
        };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut link: Link<K>) {
        while let Some(mut node) = link {
            link = node.left.take();
            self.stack.push(node);
        }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let (key, _, right) = node.into_parts();
        self.push_left(right);
        self.remaining -= 1;
        Some(key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> std::iter::FusedIterator for IntoIter<K> {}

impl<K> Drop for IntoIter<K> {
    fn drop(&mut self) {
        for node in self.stack.drain(..) {
            dismantle(Some(node));
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
pub(crate) mod tests {
    use std::fmt;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Link, Node, check_sizes, find, insert, insert_balanced, join, remove, select, split};
    use crate::chooser::Chooser;

    /// Always draws zero: every balanced insertion is promoted to the root and
    /// every join keeps the left root.
    pub(crate) struct Lowest;

    impl Chooser for Lowest {
        fn below(&mut self, _bound: usize) -> usize {
            0
        }

        fn fork(&mut self) -> Self {
            Lowest
        }
    }

    /// Always draws `bound - 1`: balanced insertion never promotes (except into
    /// an empty subtree) and every join keeps the right root.
    pub(crate) struct Highest;

    impl Chooser for Highest {
        fn below(&mut self, bound: usize) -> usize {
            bound - 1
        }

        fn fork(&mut self) -> Self {
            Highest
        }
    }

    /// Render a subtree as an s-expression: leaves as bare keys, inner nodes as
    /// `(key left right)` with `_` for a missing child.
    pub(crate) fn shape<K: fmt::Display>(node: Option<&Node<K>>) -> String {
        let mut out = String::new();
        write_shape(&mut out, node);
        out
    }

    fn write_shape<K: fmt::Display>(out: &mut String, node: Option<&Node<K>>) {
        match node {
            None => out.push('_'),
            Some(n) if n.left().is_none() && n.right().is_none() => {
                out.push_str(&n.key().to_string());
            }
            Some(n) => {
                out.push('(');
                out.push_str(&n.key().to_string());
                out.push(' ');
                write_shape(out, n.left());
                out.push(' ');
                write_shape(out, n.right());
                out.push(')');
            }
        }
    }

    fn keys<K: Clone>(node: Option<&Node<K>>) -> Vec<K> {
        fn walk<K: Clone>(node: Option<&Node<K>>, out: &mut Vec<K>) {
            if let Some(n) = node {
                walk(n.left(), out);
                out.push(n.key().clone());
                walk(n.right(), out);
            }
        }
        let mut out = Vec::new();
        walk(node, &mut out);
        out
    }

    fn build<C: Chooser>(values: &[i32], chooser: &mut C) -> Link<i32> {
        let mut root = None;
        for &v in values {
            insert_balanced(&mut root, v, chooser);
        }
        root
    }

    #[test]
    fn plain_insert_shape() {
        let mut root = None;
        for v in [5, 3, 8, 1, 4] {
            insert(&mut root, v);
        }
        insta::assert_snapshot!(shape(root.as_deref()), @"(5 (3 1 4) 8)");
        assert_eq!(check_sizes(root.as_deref()), Ok(5));
    }

    #[test]
    fn plain_insert_sorted_degenerates() {
        let mut root = None;
        for v in 0..100 {
            insert(&mut root, v);
        }
        assert_eq!(super::height(root.as_deref()), 100);
        assert_eq!(check_sizes(root.as_deref()), Ok(100));
    }

    #[test]
    fn always_promoting_insert() {
        let root = build(&[5, 3, 8, 1, 4], &mut Lowest);
        insta::assert_snapshot!(shape(root.as_deref()), @"(4 (1 _ 3) (8 5 _))");
        assert_eq!(check_sizes(root.as_deref()), Ok(5));
    }

    #[test]
    fn never_promoting_insert_matches_plain_insert() {
        let root = build(&[5, 3, 8, 1, 4], &mut Highest);
        insta::assert_snapshot!(shape(root.as_deref()), @"(5 (3 1 4) 8)");
    }

    #[test]
    fn duplicates_route_right() {
        let mut root = None;
        for v in [2, 2, 1, 2] {
            insert(&mut root, v);
        }
        insta::assert_snapshot!(shape(root.as_deref()), @"(2 1 (2 _ 2))");
        assert_eq!(keys(root.as_deref()), vec![1, 2, 2, 2]);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 3)]
    #[case(2, 4)]
    #[case(3, 5)]
    #[case(4, 8)]
    fn select_by_rank(#[case] rank: usize, #[case] key: i32) {
        let root = build(&[5, 3, 8, 1, 4], &mut Lowest);
        assert_eq!(select(root.as_deref(), rank).map(Node::key), Some(&key));
    }

    #[test]
    fn select_out_of_range() {
        let root = build(&[5, 3, 8], &mut Lowest);
        assert!(select(root.as_deref(), 3).is_none());
        assert!(select::<i32>(None, 0).is_none());
    }

    #[test]
    fn find_present_and_absent() {
        let root = build(&[5, 3, 8, 1, 4], &mut Lowest);
        assert_eq!(find(root.as_deref(), &8).map(Node::key), Some(&8));
        assert!(find(root.as_deref(), &7).is_none());
    }

    #[test]
    fn split_partitions() {
        let root = build(&[5, 3, 8, 1, 4], &mut Lowest);
        let (left, right) = split(root, &4);
        insta::assert_snapshot!(shape(left.as_deref()), @"(4 (1 _ 3) _)");
        insta::assert_snapshot!(shape(right.as_deref()), @"(8 5 _)");
        assert_eq!(check_sizes(left.as_deref()), Ok(3));
        assert_eq!(check_sizes(right.as_deref()), Ok(2));
    }

    #[test]
    fn split_keeps_equal_keys_left() {
        let mut root = None;
        for v in [3, 1, 3, 5, 3] {
            insert(&mut root, v);
        }
        let (left, right) = split(root, &3);
        assert_eq!(keys(left.as_deref()), vec![1, 3, 3, 3]);
        assert_eq!(keys(right.as_deref()), vec![5]);
    }

    #[test]
    fn split_empty() {
        let (left, right) = split::<i32>(None, &3);
        assert!(left.is_none());
        assert!(right.is_none());
    }

    #[test]
    fn join_left_and_right_roots() {
        let left = build(&[1, 2], &mut Highest);
        let right = build(&[3, 4], &mut Highest);
        let joined = join(left, right, &mut Lowest);
        insta::assert_snapshot!(shape(joined.as_deref()), @"(1 _ (2 _ (3 _ 4)))");
        assert_eq!(check_sizes(joined.as_deref()), Ok(4));

        let left = build(&[1, 2], &mut Highest);
        let right = build(&[3, 4], &mut Highest);
        let joined = join(left, right, &mut Highest);
        insta::assert_snapshot!(shape(joined.as_deref()), @"(3 (1 _ 2) 4)");
        assert_eq!(check_sizes(joined.as_deref()), Ok(4));
    }

    #[test]
    fn join_with_empty_side() {
        let tree = build(&[1, 2, 3], &mut Highest);
        let joined = join(tree, None, &mut Lowest);
        assert_eq!(joined.as_ref().map(|n| n.size()), Some(3));
        let joined = join(None, joined, &mut Lowest);
        assert_eq!(joined.as_ref().map(|n| n.size()), Some(3));
        assert!(join::<i32, _>(None, None, &mut Lowest).is_none());
    }

    #[test]
    fn remove_root_joins_children() {
        let mut root = build(&[5, 3, 8, 1, 4], &mut Lowest);
        assert_eq!(remove(&mut root, &4, &mut Lowest), Some(4));
        insta::assert_snapshot!(shape(root.as_deref()), @"(1 _ (3 _ (8 5 _)))");
        assert_eq!(check_sizes(root.as_deref()), Ok(4));
    }

    #[test]
    fn remove_inner_node() {
        let mut root = build(&[5, 3, 8, 1, 4], &mut Highest);
        assert_eq!(remove(&mut root, &3, &mut Highest), Some(3));
        insta::assert_snapshot!(shape(root.as_deref()), @"(5 (4 1 _) 8)");
        assert_eq!(check_sizes(root.as_deref()), Ok(4));
    }

    #[test]
    fn remove_missing_leaves_sizes() {
        let mut root = build(&[5, 3, 8, 1, 4], &mut Highest);
        assert_eq!(remove(&mut root, &7, &mut Highest), None);
        assert_eq!(check_sizes(root.as_deref()), Ok(5));
        insta::assert_snapshot!(shape(root.as_deref()), @"(5 (3 1 4) 8)");
    }
}
