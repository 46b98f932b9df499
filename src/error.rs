//! Error types for batched Merkle tree operations.

use thiserror::Error;

/// Errors from tree construction, mutation, persistence and proof lookup.
#[derive(Debug, Error)]
pub enum MerkleError {
    /// The injected pairing function failed the commutativity self-test.
    #[error("node pairing function is not commutative")]
    NonCommutativePair,
    /// The requested operation needs a working tree and none exists.
    #[error("working tree is not initialized")]
    WorkingTreeNotInitialized,
    /// Tree and leaf indices are 1-based; zero is reserved.
    #[error("invalid working tree index {tree_index} or start leaf index {start_leaf_index}")]
    InvalidIndex {
        tree_index: u64,
        start_leaf_index: u64,
    },
    /// A proof was requested for a leaf below the located tree's range.
    #[error("leaf {leaf_index} is not found in tree {tree_index}")]
    LeafNotInTree { leaf_index: u64, tree_index: u64 },
    /// No finalized tree covers the requested leaf index.
    #[error("no finalized tree covers leaf {0}")]
    UnfinalizedTree(u64),
    /// No working tree snapshot is stored under the requested version.
    #[error("working tree snapshot not found for version {0}")]
    SnapshotNotFound(u64),
    /// An error propagated from the key-value backend, or store contents
    /// inconsistent with the tree structure.
    #[error("storage error: {0}")]
    Store(String),
    /// A persisted record or key failed to (de)serialize.
    #[error("codec error: {0}")]
    Codec(String),
}
