//! Error types for `mway_tree`.
//!
//! Only *recoverable* conditions are modeled as [`Error`] values: a lookup or
//! removal that misses, and an insertion that collides with an existing key.
//! Violations of the tree's structural invariants (for example splitting a
//! node that is not over capacity) indicate a bug in the rebalancing logic;
//! they surface as panics and are deliberately absent from this enum.

use thiserror::Error;

/// Convenient result alias for fallible tree operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by [`BTree`](crate::BTree) operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The key was not present in the tree.
    #[error("key not found")]
    NotFound,

    /// The key compared equal to one already in the tree.
    #[error("duplicate key")]
    DuplicateKey,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn display() {
        assert_eq!(format!("{}", Error::NotFound), "key not found");
        assert_eq!(format!("{}", Error::DuplicateKey), "duplicate key");
    }
}
