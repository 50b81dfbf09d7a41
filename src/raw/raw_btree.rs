use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, SearchResult};
use crate::compare::Comparator;
use crate::error::{Error, Result};

/// The arena-backed B-tree core behind `BTree`.
///
/// All structural knowledge lives here: the order and the occupancy bounds
/// and split indices derived from it, the node arena, and the rebalancing
/// machinery. Node-local work (`Node::split`) stays on `Node`; the
/// operations that reach through the parent to a sibling (`rotate`, `merge`)
/// live here, next to the arena they need.
pub(crate) struct RawBTree<K, C> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// The root node. A tree starts as (and may shrink back to) a single
    /// empty leaf; the handle is replaced on root splits and collapses.
    root: Handle,
    /// Total number of keys in the tree.
    len: usize,
    /// Maximum number of children per node; keys per node top out at
    /// `order - 1`.
    order: usize,
    /// Minimum keys for every non-root node: `⌈order/2⌉ - 1`.
    min_keys: usize,
    /// Index of the key lifted out by a split: `⌊order/2⌋`.
    split_key_ix: usize,
    /// First child index moved to the right sibling by a split:
    /// `⌈(order+1)/2⌉`.
    split_child_ix: usize,
    /// The key ordering, passed in as configuration.
    cmp: C,
}

impl<K, C> RawBTree<K, C> {
    pub(crate) fn new(order: usize, cmp: C) -> Self {
        assert!(order >= 3, "`RawBTree::new()` - `order` must be at least 3!");

        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::leaf());

        Self {
            nodes,
            root,
            len: 0,
            order,
            min_keys: order.div_ceil(2) - 1,
            split_key_ix: order / 2,
            split_child_ix: (order + 1).div_ceil(2),
            cmp,
        }
    }

    pub(crate) const fn order(&self) -> usize {
        self.order
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::leaf());
        self.len = 0;
    }

    pub(crate) fn root(&self) -> Handle {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    fn node_mut(&mut self, handle: Handle) -> &mut Node<K> {
        self.nodes.get_mut(handle)
    }

    /// Returns the first (least) key, if any.
    pub(crate) fn first(&self) -> Option<&K> {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return node.first_key();
            }
            current = node.child(0);
        }
    }

    /// Returns the last (greatest) key, if any.
    pub(crate) fn last(&self) -> Option<&K> {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return node.last_key();
            }
            current = node.child(node.child_count() - 1);
        }
    }

    /// True if the node holds more keys than its capacity of `order - 1`,
    /// i.e. an insertion just pushed it over the limit.
    fn is_overfull(&self, handle: Handle) -> bool {
        self.nodes.get(handle).key_count() >= self.order
    }

    /// True if a non-root node has dropped below the minimum occupancy.
    /// The same `⌈order/2⌉ - 1` bound applies to leaves and internal nodes.
    fn is_underfull(&self, handle: Handle) -> bool {
        self.nodes.get(handle).key_count() < self.min_keys
    }

    /// True if the node can donate a key without underflowing itself.
    fn can_lend(&self, handle: Handle) -> bool {
        self.nodes.get(handle).key_count() > self.min_keys
    }

    /// Looks up the immediate siblings of `parent`'s child at `child_slot`.
    fn siblings(&self, parent: Handle, child_slot: usize) -> (Option<Handle>, Option<Handle>) {
        let node = self.nodes.get(parent);
        let left = child_slot.checked_sub(1).map(|slot| node.child(slot));
        let right = (child_slot + 1 < node.child_count()).then(|| node.child(child_slot + 1));
        (left, right)
    }

    /// Re-points the parent links of all of `owner`'s children to `owner`.
    /// Called after children change hands in a split or merge.
    fn repoint_children(&mut self, owner: Handle) {
        for slot in 0..self.nodes.get(owner).child_count() {
            let child = self.nodes.get(owner).child(slot);
            self.nodes.get_mut(child).set_parent(Some(owner));
        }
    }
}

impl<K, C: Comparator<K>> RawBTree<K, C> {
    /// Returns true if the tree contains `key`.
    pub(crate) fn contains(&self, key: &K) -> bool {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            match node.search(key, &self.cmp) {
                SearchResult::Found(_) => return true,
                SearchResult::NotFound(slot) => {
                    if node.is_leaf() {
                        return false;
                    }
                    current = node.child(slot);
                }
            }
        }
    }

    /// Inserts `key`, rejecting duplicates.
    pub(crate) fn insert(&mut self, key: K) -> Result<()> {
        let mut current = self.root;
        let index = loop {
            let node = self.nodes.get(current);
            match node.search(&key, &self.cmp) {
                SearchResult::Found(_) => return Err(Error::DuplicateKey),
                SearchResult::NotFound(slot) => {
                    if node.is_leaf() {
                        break slot;
                    }
                    current = node.child(slot);
                }
            }
        };

        self.node_mut(current).insert_key(index, key);
        self.len += 1;

        if self.is_overfull(current) {
            self.split_insert(current);
        }
        Ok(())
    }

    /// Removes `key` and returns the stored key.
    ///
    /// A key found in an internal node is first swapped with its
    /// leaf-resident predecessor, so the actual removal always happens at a
    /// leaf; only leaves can therefore trigger the underflow cascade.
    pub(crate) fn remove(&mut self, key: &K) -> Result<K> {
        let mut current = self.root;
        let mut child_slot = 0;
        let (found, found_ix) = loop {
            let node = self.nodes.get(current);
            match node.search(key, &self.cmp) {
                SearchResult::Found(index) => break (current, index),
                SearchResult::NotFound(slot) => {
                    if node.is_leaf() {
                        return Err(Error::NotFound);
                    }
                    child_slot = slot;
                    current = node.child(slot);
                }
            }
        };

        let (leaf, leaf_slot, removed) = if self.nodes.get(found).is_leaf() {
            let removed = self.node_mut(found).remove_key(found_ix);
            (found, child_slot, removed)
        } else {
            // Pull up the predecessor: the last key of the rightmost leaf in
            // the subtree left of the found key.
            let mut pred = self.nodes.get(found).child(found_ix);
            let mut pred_slot = found_ix;
            while !self.nodes.get(pred).is_leaf() {
                pred_slot = self.nodes.get(pred).child_count() - 1;
                pred = self.nodes.get(pred).child(pred_slot);
            }
            let pred_key = self.node_mut(pred).pop_key();
            let removed = self.node_mut(found).replace_key(found_ix, pred_key);
            (pred, pred_slot, removed)
        };
        self.len -= 1;

        if leaf != self.root && self.is_underfull(leaf) {
            self.delete_underflow(leaf_slot, leaf);
        }
        Ok(removed)
    }

    /// Locates the child slot in `parent` where a subtree containing `key`
    /// hangs (equivalently: where `key` would be inserted among the keys).
    fn child_slot_by_key(&self, parent: Handle, key: &K) -> usize {
        match self.nodes.get(parent).search(key, &self.cmp) {
            SearchResult::Found(slot) | SearchResult::NotFound(slot) => slot,
        }
    }

    /// Splits an over-capacity node and hooks the promoted median into the
    /// parent, growing a new root if needed. Recurses while the parent is
    /// itself over capacity; at most one overflow chain runs from the
    /// insertion leaf to the root per insert.
    fn split_insert(&mut self, handle: Handle) {
        debug_assert_eq!(
            self.nodes.get(handle).key_count(),
            self.order,
            "`RawBTree::split_insert()` - node does not hold exactly `order` keys!"
        );

        let (median, right) = self.nodes.get_mut(handle).split(self.split_key_ix, self.split_child_ix);
        let right_handle = self.nodes.alloc(right);
        // `Node::split` leaves the moved children pointing at the left node.
        self.repoint_children(right_handle);

        match self.nodes.get(handle).parent() {
            Some(parent) => {
                let slot = self.child_slot_by_key(parent, &median);
                let parent_node = self.node_mut(parent);
                parent_node.insert_key(slot, median);
                parent_node.insert_child(slot + 1, right_handle);
                self.node_mut(right_handle).set_parent(Some(parent));

                if self.is_overfull(parent) {
                    self.split_insert(parent);
                }
            }
            None => {
                let new_root = self.nodes.alloc(Node::branch(median, handle, right_handle));
                self.node_mut(handle).set_parent(Some(new_root));
                self.node_mut(right_handle).set_parent(Some(new_root));
                self.root = new_root;
            }
        }
    }

    /// Resolves an underflow at `handle` (which sits at `child_slot` in its
    /// parent). Rotation is always preferred over merging - it is
    /// depth-preserving and touches only two nodes plus the parent - and the
    /// left sibling is always tried before the right.
    fn delete_underflow(&mut self, child_slot: usize, handle: Handle) {
        if handle == self.root {
            // The root ran out of keys; its sole child becomes the new root
            // and the tree loses one level.
            let child = self.nodes.get(handle).child(0);
            self.node_mut(child).set_parent(None);
            self.nodes.free(handle);
            self.root = child;
            return;
        }

        let parent = self.nodes.get(handle).parent().expect("`RawBTree::delete_underflow()` - non-root node has no parent!");
        let (left, right) = self.siblings(parent, child_slot);

        if let Some(left) = left
            && self.can_lend(left)
        {
            self.transfer(handle, child_slot - 1, left, true);
            return;
        }
        if let Some(right) = right
            && self.can_lend(right)
        {
            self.transfer(handle, child_slot, right, false);
            return;
        }

        // Neither sibling can donate; absorb one of them (left preferred).
        if let Some(left) = left {
            self.merge(handle, child_slot, child_slot - 1, left, true);
        } else {
            let right = right.expect("`RawBTree::delete_underflow()` - node has no siblings!");
            self.merge(handle, child_slot, child_slot, right, false);
        }

        // The merge cost the parent one key and one child; the cascade
        // continues upward if that emptied it or dropped it below minimum.
        let parent_keys = self.nodes.get(parent).key_count();
        if parent_keys == 0 || (parent != self.root && parent_keys < self.min_keys) {
            let parent_slot = match self.nodes.get(parent).parent() {
                Some(grandparent) => {
                    // Any key of the merged node bisects the grandparent at
                    // the parent's slot.
                    let probe = self.nodes.get(handle).first_key().expect("`RawBTree::delete_underflow()` - merged node has no keys!");
                    self.child_slot_by_key(grandparent, probe)
                }
                None => 0,
            };
            self.delete_underflow(parent_slot, parent);
        }
    }

    /// Borrows one key from `adjacent` through the shared parent: the
    /// adjacent node's edge key replaces the parent separator at
    /// `parent_key_ix`, and the displaced separator joins this node. If the
    /// adjacent node is internal, its edge child moves along and is
    /// re-parented. Exactly one key crosses the parent boundary; depth and
    /// total key count are unchanged.
    fn rotate(&mut self, handle: Handle, parent_key_ix: usize, adjacent: Handle, go_left: bool) {
        let parent = self.nodes.get(handle).parent().expect("`RawBTree::rotate()` - node has no parent!");

        let adj = self.node_mut(adjacent);
        let donated = if go_left { adj.pop_key() } else { adj.pop_key_front() };
        let moved_child = if adj.is_leaf() {
            None
        } else if go_left {
            Some(adj.pop_child())
        } else {
            Some(adj.pop_child_front())
        };

        let separator = self.node_mut(parent).replace_key(parent_key_ix, donated);

        let node = self.node_mut(handle);
        if go_left {
            node.push_key_front(separator);
        } else {
            node.push_key(separator);
        }

        if let Some(child) = moved_child {
            let node = self.node_mut(handle);
            if go_left {
                node.push_child_front(child);
            } else {
                node.push_child(child);
            }
            self.node_mut(child).set_parent(Some(handle));
        }
    }

    /// Alias over [`Self::rotate`] for the underflow-resolution call sites,
    /// where "transfer a key from the sibling" is the operative reading.
    fn transfer(&mut self, handle: Handle, parent_key_ix: usize, adjacent: Handle, go_left: bool) {
        self.rotate(handle, parent_key_ix, adjacent, go_left);
    }

    /// Absorbs `adjacent` into `handle` along with the separating parent key
    /// at `parent_key_ix`. The sibling's slot is removed from the parent and
    /// its arena slot freed; all transplanted children are re-parented. The
    /// parent loses one key and one child - any resulting underflow is the
    /// caller's to resolve.
    fn merge(&mut self, handle: Handle, child_slot: usize, parent_key_ix: usize, adjacent: Handle, go_left: bool) {
        let parent = self.nodes.get(handle).parent().expect("`RawBTree::merge()` - node has no parent!");
        let separator = self.node_mut(parent).remove_key(parent_key_ix);
        let sibling = self.nodes.take(adjacent);

        if go_left {
            self.node_mut(handle).absorb_left(sibling, separator);
            self.node_mut(parent).remove_child(child_slot - 1);
        } else {
            self.node_mut(handle).absorb_right(separator, sibling);
            self.node_mut(parent).remove_child(child_slot + 1);
        }

        self.repoint_children(handle);
    }

    /// Walks the whole tree asserting every structural invariant, panicking
    /// with a collected report on the first violation batch. Intended for
    /// tests and debugging.
    pub(crate) fn validate(&self) {
        let mut errors: Vec<String> = Vec::new();
        let mut leaf_depth: Option<usize> = None;

        let root_node = self.nodes.get(self.root);
        if root_node.parent().is_some() {
            errors.push(String::from("root has a parent reference"));
        }
        if !root_node.is_leaf() && root_node.key_count() == 0 {
            errors.push(String::from("internal root holds no keys"));
        }

        let counted = self.validate_node(self.root, 0, &mut leaf_depth, &mut errors);
        if counted != self.len {
            errors.push(format!("len mismatch: len={}, counted={counted}", self.len));
        }

        // Every arena slot must be reachable from the root, or a rebalance
        // leaked a node.
        let mut reachable = 0;
        let mut pending = alloc::vec![self.root];
        while let Some(next) = pending.pop() {
            reachable += 1;
            pending.extend_from_slice(self.nodes.get(next).children());
        }
        if reachable != self.nodes.len() {
            errors.push(format!("arena holds {} nodes, the tree reaches {reachable}", self.nodes.len()));
        }

        assert!(errors.is_empty(), "B-tree invariant violations:\n{}", errors.join("\n"));
    }

    fn validate_node(
        &self,
        handle: Handle,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        errors: &mut Vec<String>,
    ) -> usize {
        let node = self.nodes.get(handle);

        for index in 1..node.key_count() {
            if self.cmp.compare(node.key(index - 1), node.key(index)) != Ordering::Less {
                errors.push(format!("keys not strictly ascending at {handle:?}, indices {} and {index}", index - 1));
            }
        }

        if node.key_count() > self.order - 1 {
            errors.push(format!("node {handle:?} holds {} keys, capacity is {}", node.key_count(), self.order - 1));
        }
        if handle != self.root && node.key_count() < self.min_keys {
            errors.push(format!("node {handle:?} holds {} keys, minimum is {}", node.key_count(), self.min_keys));
        }

        if node.is_leaf() {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) => {
                    if depth != expected {
                        errors.push(format!("leaf depth mismatch at {handle:?}: expected {expected}, got {depth}"));
                    }
                }
            }
            return node.key_count();
        }

        if node.child_count() != node.key_count() + 1 {
            errors.push(format!(
                "node {handle:?} has {} children for {} keys",
                node.child_count(),
                node.key_count()
            ));
        }

        let mut total = node.key_count();
        for slot in 0..node.child_count() {
            let child = node.child(slot);
            let child_node = self.nodes.get(child);

            if child_node.parent() != Some(handle) {
                errors.push(format!("child {child:?} of {handle:?} has stale parent {:?}", child_node.parent()));
            }

            // Subtree keys must sit strictly between the surrounding
            // separators.
            if slot > 0
                && let Some(first) = child_node.first_key()
                && self.cmp.compare(first, node.key(slot - 1)) != Ordering::Greater
            {
                errors.push(format!("child {child:?} of {handle:?} underruns separator {}", slot - 1));
            }
            if slot < node.key_count()
                && let Some(last) = child_node.last_key()
                && self.cmp.compare(last, node.key(slot)) != Ordering::Less
            {
                errors.push(format!("child {child:?} of {handle:?} overruns separator {slot}"));
            }

            total += self.validate_node(child, depth + 1, leaf_depth, errors);
        }
        total
    }
}
