//! Key ordering strategies.
//!
//! A [`BTree`](crate::BTree) never consults ambient ordering state; the
//! comparator is explicit configuration handed to the constructor. Most
//! callers want [`NaturalOrder`] (the key's own [`Ord`]), which is the
//! default type parameter, but any [`Comparator`] - including a plain
//! closure - can be supplied via
//! [`BTree::with_comparator`](crate::BTree::with_comparator).

use core::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// # Examples
///
/// ```
/// use mway_tree::BTree;
///
/// // Closures implement `Comparator`, so a reversed tree is one line.
/// let mut tree = BTree::with_comparator(4, |a: &i32, b: &i32| b.cmp(a));
/// tree.insert(1).unwrap();
/// tree.insert(2).unwrap();
/// tree.insert(3).unwrap();
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
pub trait Comparator<K> {
    /// Compares two keys, returning their relative ordering.
    ///
    /// This must be a total order, and it is a logic error for the order of
    /// keys already in a tree to change. The behavior resulting from such a
    /// logic error is not specified (it may include panics or incorrect
    /// results) but is not undefined behavior.
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}

/// The natural ordering of `K` via its [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}
