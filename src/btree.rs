//! An ordered set of unique keys based on an order-parameterized B-tree.

use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::raw::{Handle, RawBTree};

/// An ordered set of unique keys backed by a B-tree of caller-chosen order.
///
/// The *order* `m` is the maximum number of children an internal node may
/// hold; every node stores at most `m - 1` keys and every non-root node at
/// least `⌈m/2⌉ - 1`. All leaves sit at the same depth, so search, insert,
/// and remove are `O(log n)` with fan-out `m`.
///
/// Unlike `std::collections::BTreeSet`, duplicates are reported rather than
/// silently absorbed: [`insert`](BTree::insert) returns
/// [`Error::DuplicateKey`](crate::Error::DuplicateKey) when the key is
/// already present, and [`remove`](BTree::remove) returns
/// [`Error::NotFound`](crate::Error::NotFound) on a miss, leaving the tree
/// untouched in both cases.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as determined by the tree's
/// [`Comparator`], changes while it is in the set. The behavior resulting
/// from such a logic error is not specified, but will not result in
/// undefined behavior.
///
/// # Examples
///
/// ```
/// use mway_tree::BTree;
///
/// let mut primes = BTree::new(4);
///
/// for p in [2, 3, 5, 7, 11] {
///     primes.insert(p).unwrap();
/// }
///
/// assert!(primes.contains(&7));
/// assert_eq!(primes.remove(&2).unwrap(), 2);
/// assert_eq!(primes.iter().copied().collect::<Vec<_>>(), [3, 5, 7, 11]);
/// ```
pub struct BTree<K, C = NaturalOrder> {
    raw: RawBTree<K, C>,
}

impl<K: Ord> BTree<K> {
    /// Creates an empty tree of the given order, using the key type's
    /// natural [`Ord`] ordering.
    ///
    /// # Panics
    ///
    /// Panics if `order < 3`; a B-tree needs room for at least two keys per
    /// node for splits to be meaningful.
    ///
    /// # Examples
    ///
    /// ```
    /// use mway_tree::BTree;
    ///
    /// let tree: BTree<i32> = BTree::new(16);
    /// assert_eq!(tree.order(), 16);
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn new(order: usize) -> Self {
        Self::with_comparator(order, NaturalOrder)
    }
}

impl<K, C: Comparator<K>> BTree<K, C> {
    /// Creates an empty tree of the given order with an explicit comparator.
    ///
    /// The comparator is the tree's only source of key ordering; it is
    /// stored as configuration, never read from ambient state.
    ///
    /// # Panics
    ///
    /// Panics if `order < 3`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mway_tree::BTree;
    ///
    /// // A descending tree via a closure comparator.
    /// let mut tree = BTree::with_comparator(4, |a: &i32, b: &i32| b.cmp(a));
    /// tree.insert(1).unwrap();
    /// tree.insert(3).unwrap();
    /// tree.insert(2).unwrap();
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    #[must_use]
    pub fn with_comparator(order: usize, cmp: C) -> Self {
        Self { raw: RawBTree::new(order, cmp) }
    }

    /// Returns the tree's order (maximum children per node).
    #[must_use]
    pub fn order(&self) -> usize {
        self.raw.order()
    }

    /// Returns the number of keys in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the tree contains no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes all keys, keeping the configured order and comparator.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns true if the tree contains a key equal to `key` under the
    /// tree's comparator.
    pub fn contains(&self, key: &K) -> bool {
        self.raw.contains(key)
    }

    /// Returns the least key, or `None` if the tree is empty.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.first()
    }

    /// Returns the greatest key, or `None` if the tree is empty.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.last()
    }

    /// Inserts a key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the
    /// comparator deems `key` equal to a key already present; the tree is
    /// left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use mway_tree::{BTree, Error};
    ///
    /// let mut tree = BTree::new(4);
    /// assert!(tree.insert(7).is_ok());
    /// assert_eq!(tree.insert(7), Err(Error::DuplicateKey));
    /// ```
    pub fn insert(&mut self, key: K) -> Result<()> {
        self.raw.insert(key)
    }

    /// Removes the key equal to `key` and returns the stored key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if no such key is
    /// present; the tree is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use mway_tree::{BTree, Error};
    ///
    /// let mut tree = BTree::new(4);
    /// tree.insert(7).unwrap();
    /// assert_eq!(tree.remove(&7), Ok(7));
    /// assert_eq!(tree.remove(&7), Err(Error::NotFound));
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<K> {
        self.raw.remove(key)
    }

    /// Returns an iterator over the keys in ascending comparator order.
    ///
    /// # Examples
    ///
    /// ```
    /// use mway_tree::BTree;
    ///
    /// let mut tree = BTree::new(4);
    /// for key in [3, 1, 2] {
    ///     tree.insert(key).unwrap();
    /// }
    ///
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, C> {
        let mut iter = Iter { tree: &self.raw, stack: Vec::new(), remaining: self.raw.len() };
        iter.push_left(self.raw.root());
        iter
    }

    /// Checks every structural invariant of the tree - sorted unique keys,
    /// occupancy bounds, uniform leaf depth, child/parent link consistency -
    /// and panics with a collected report if any is violated.
    ///
    /// Intended for tests and debugging; correct usage of the tree can never
    /// make this panic.
    pub fn validate(&self) {
        self.raw.validate();
    }
}

impl<K: fmt::Debug, C: Comparator<K>> fmt::Debug for BTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, C: Comparator<K>> IntoIterator for &'a BTree<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, C>;

    fn into_iter(self) -> Iter<'a, K, C> {
        self.iter()
    }
}

/// An iterator over the keys of a [`BTree`] in ascending order.
///
/// This `struct` is created by the [`iter`](BTree::iter) method on
/// [`BTree`]. A classic B-tree keeps keys in internal nodes too, so the
/// iterator walks the tree in-order with an explicit descent stack rather
/// than chaining leaves.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, C> {
    tree: &'a RawBTree<K, C>,
    /// In-order walk state: for each live ancestor, the index of the next
    /// key to yield from it.
    stack: Vec<(Handle, usize)>,
    remaining: usize,
}

impl<K, C> Iter<'_, K, C> {
    /// Descends to the leftmost leaf under `handle`, recording the path.
    fn push_left(&mut self, mut handle: Handle) {
        loop {
            self.stack.push((handle, 0));
            let node = self.tree.node(handle);
            if node.is_leaf() {
                break;
            }
            handle = node.child(0);
        }
    }
}

impl<'a, K, C> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let tree = self.tree;
        loop {
            let (handle, index) = self.stack.pop()?;
            let node = tree.node(handle);
            if index < node.key_count() {
                self.stack.push((handle, index + 1));
                // In-order: the subtree right of this key comes before the
                // node's next key.
                if !node.is_leaf() {
                    self.push_left(node.child(index + 1));
                }
                self.remaining -= 1;
                return Some(node.key(index));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, C> ExactSizeIterator for Iter<'_, K, C> {}
impl<K, C> FusedIterator for Iter<'_, K, C> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::format;
    use alloc::vec::Vec;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn debug_formats_as_a_set() {
        let mut tree = BTree::new(4);
        for key in [2, 1, 3] {
            tree.insert(key).unwrap();
        }
        assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
    }

    #[test]
    fn iter_is_empty_on_an_empty_tree() {
        let tree: BTree<i32> = BTree::new(4);
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.iter().len(), 0);
    }

    #[test]
    fn iter_crosses_node_boundaries_in_order() {
        let mut tree = BTree::new(3);
        for key in 0..32 {
            tree.insert(key).unwrap();
        }

        let iter = tree.iter();
        assert_eq!(iter.len(), 32);
        assert_eq!(iter.copied().collect::<Vec<_>>(), (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn for_loop_over_a_reference() {
        let mut tree = BTree::new(4);
        for key in [5, 4, 6] {
            tree.insert(key).unwrap();
        }

        let mut seen = Vec::new();
        for key in &tree {
            seen.push(*key);
        }
        assert_eq!(seen, [4, 5, 6]);
    }
}
