use smallvec::SmallVec;

use super::handle::Handle;
use crate::compare::Comparator;

/// Inline capacity for per-node storage. Orders up to `INLINE + 1` never
/// touch the heap for their key/child vectors; larger orders spill.
const INLINE: usize = 8;

pub(crate) type KeyVec<K> = SmallVec<[K; INLINE]>;
pub(crate) type ChildVec = SmallVec<[Handle; INLINE]>;

/// A single B-tree node.
///
/// Keys are strictly ascending under the tree's comparator. Internal nodes
/// hold exactly one more child than keys; leaves hold no children. `parent`
/// is a non-owning back-reference used for upward navigation during
/// rebalancing - whoever moves a child handle between nodes (split, rotate,
/// merge) must re-point it.
pub(crate) struct Node<K> {
    keys: KeyVec<K>,
    children: ChildVec,
    parent: Option<Handle>,
}

/// Result of searching for a key within a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is the child to descend into, or the
    /// insertion point if this is a leaf.
    NotFound(usize),
}

impl<K> Node<K> {
    /// Creates a new empty leaf with no parent (a fresh root).
    pub(crate) fn leaf() -> Self {
        Self { keys: KeyVec::new(), children: ChildVec::new(), parent: None }
    }

    /// Creates an internal node holding a single separator key.
    pub(crate) fn branch(key: K, left: Handle, right: Handle) -> Self {
        let mut children = ChildVec::new();
        children.push(left);
        children.push(right);
        let mut keys = KeyVec::new();
        keys.push(key);
        Self { keys, children, parent: None }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub(crate) fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    /// Binary-searches this node's keys under the given comparator.
    #[inline]
    pub(crate) fn search<C>(&self, key: &K, cmp: &C) -> SearchResult
    where
        C: Comparator<K>,
    {
        match self.keys.binary_search_by(|probe| cmp.compare(probe, key)) {
            Ok(index) => SearchResult::Found(index),
            Err(index) => SearchResult::NotFound(index),
        }
    }

    pub(crate) fn insert_key(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    pub(crate) fn remove_key(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }

    /// Swaps in a new key at `index`, returning the old one. Used by the
    /// predecessor swap when deleting out of an internal node, and by
    /// rotations to exchange the parent separator.
    pub(crate) fn replace_key(&mut self, index: usize, key: K) -> K {
        core::mem::replace(&mut self.keys[index], key)
    }

    pub(crate) fn push_key_front(&mut self, key: K) {
        self.keys.insert(0, key);
    }

    pub(crate) fn push_key(&mut self, key: K) {
        self.keys.push(key);
    }

    pub(crate) fn pop_key(&mut self) -> K {
        self.keys.pop().expect("`Node::pop_key()` - node has no keys!")
    }

    pub(crate) fn pop_key_front(&mut self) -> K {
        assert!(!self.keys.is_empty(), "`Node::pop_key_front()` - node has no keys!");
        self.keys.remove(0)
    }

    pub(crate) fn insert_child(&mut self, index: usize, child: Handle) {
        self.children.insert(index, child);
    }

    pub(crate) fn remove_child(&mut self, index: usize) -> Handle {
        self.children.remove(index)
    }

    pub(crate) fn push_child_front(&mut self, child: Handle) {
        self.children.insert(0, child);
    }

    pub(crate) fn push_child(&mut self, child: Handle) {
        self.children.push(child);
    }

    pub(crate) fn pop_child(&mut self) -> Handle {
        self.children.pop().expect("`Node::pop_child()` - node has no children!")
    }

    pub(crate) fn pop_child_front(&mut self) -> Handle {
        assert!(!self.children.is_empty(), "`Node::pop_child_front()` - node has no children!");
        self.children.remove(0)
    }

    /// Splits an over-capacity node at the fixed indices derived from the
    /// tree order: the key at `key_ix` (`⌊m/2⌋`) is lifted out as the
    /// median, children from `child_ix` (`⌈(m+1)/2⌉`) onward move to the new
    /// right sibling, and this node retains the left half in place.
    ///
    /// The right sibling inherits this node's parent. The moved children's
    /// parent links are NOT updated here - only the caller knows the handle
    /// the right sibling will be allocated under.
    pub(crate) fn split(&mut self, key_ix: usize, child_ix: usize) -> (K, Node<K>) {
        assert!(key_ix < self.keys.len(), "`Node::split()` - node is not over capacity!");

        let right_children: ChildVec =
            if self.is_leaf() { ChildVec::new() } else { self.children.drain(child_ix..).collect() };
        let right_keys: KeyVec<K> = self.keys.drain(key_ix + 1..).collect();

        // The median is now the last key on the left.
        let median = self.keys.pop().expect("`Node::split()` - median index out of range!");

        let right = Node { keys: right_keys, children: right_children, parent: self.parent };
        (median, right)
    }

    /// Absorbs a left sibling: result order is `left.keys + [separator] +
    /// self.keys`, with `left.children` prepended likewise. The transplanted
    /// children's parent links are the caller's responsibility.
    pub(crate) fn absorb_left(&mut self, mut left: Node<K>, separator: K) {
        left.keys.push(separator);
        left.keys.extend(self.keys.drain(..));
        self.keys = left.keys;

        left.children.extend(self.children.drain(..));
        self.children = left.children;
    }

    /// Absorbs a right sibling: `self.keys + [separator] + right.keys`.
    pub(crate) fn absorb_right(&mut self, separator: K, right: Node<K>) {
        self.keys.push(separator);
        self.keys.extend(right.keys);
        self.children.extend(right.children);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::compare::NaturalOrder;

    fn leaf_with(keys: &[i32]) -> Node<i32> {
        let mut node = Node::leaf();
        for &key in keys {
            node.push_key(key);
        }
        node
    }

    #[test]
    fn search_reports_position() {
        let node = leaf_with(&[10, 20, 30]);
        assert!(matches!(node.search(&20, &NaturalOrder), SearchResult::Found(1)));
        assert!(matches!(node.search(&25, &NaturalOrder), SearchResult::NotFound(2)));
        assert!(matches!(node.search(&5, &NaturalOrder), SearchResult::NotFound(0)));
    }

    #[test]
    fn split_leaf_at_fixed_indices() {
        // Order 4: key index 2 is lifted, so [10, 20, 30, 40] splits into
        // [10, 20] / 30 / [40].
        let mut node = leaf_with(&[10, 20, 30, 40]);
        let (median, right) = node.split(2, 3);

        assert_eq!(median, 30);
        assert_eq!(node.keys(), &[10, 20]);
        assert_eq!(right.keys(), &[40]);
        assert!(right.is_leaf());
    }

    #[test]
    fn split_internal_moves_children() {
        let mut node = leaf_with(&[10, 20, 30, 40]);
        for index in 0..5 {
            node.push_child(Handle::from_index(index));
        }

        let (median, right) = node.split(2, 3);
        assert_eq!(median, 30);
        assert_eq!(node.child_count(), 3);
        assert_eq!(right.child_count(), 2);
        assert_eq!(right.child(0), Handle::from_index(3));
    }

    #[test]
    #[should_panic(expected = "`Node::split()` - node is not over capacity!")]
    fn split_under_full_node() {
        let mut node = leaf_with(&[10, 20]);
        let _ = node.split(2, 3);
    }

    #[test]
    fn absorb_preserves_order() {
        let mut node = leaf_with(&[40, 50]);
        node.absorb_left(leaf_with(&[10, 20]), 30);
        assert_eq!(node.keys(), &[10, 20, 30, 40, 50]);

        let mut node = leaf_with(&[10, 20]);
        node.absorb_right(30, leaf_with(&[40, 50]));
        assert_eq!(node.keys(), &[10, 20, 30, 40, 50]);
    }
}
