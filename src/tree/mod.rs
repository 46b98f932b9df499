//! Batched append-only Merkle trees with a last-sibling frontier.
//!
//! Leaves are 32-byte digests numbered globally from 1. They accumulate in
//! a working tree whose only in-memory state is one pending sibling per
//! level, so memory stays O(log n) while every node digest is persisted to
//! the store as it is produced. Finalizing pads the tree to a full power of
//! two, seals its root, and hands the caller a finalized record to commit;
//! the next tree then picks up the leaf numbering where the last one
//! stopped.

mod insert;
mod snapshot;


use rand::Rng;

use crate::{
    tree_info::tree_height,
    MerkleError, NodeHash, TreeStore, WorkingTree,
};

/// Manager for the working tree and the finalized trees before it.
///
/// `pair` folds two child digests into their parent. It must be
/// deterministic and commutative; commutativity lets proof consumers fold
/// siblings without tracking left/right orientation, and is checked once at
/// construction with random inputs.
pub struct BatchedMerkleTree<S, P> {
    pub(crate) store: S,
    pub(crate) pair: P,
    pub(crate) working_tree: Option<WorkingTree>,
}

impl<S, P> BatchedMerkleTree<S, P>
where
    S: TreeStore,
    P: Fn(&NodeHash, &NodeHash) -> NodeHash,
{
    /// Create a manager over `store` using `pair` to derive parent nodes.
    ///
    /// Fails with [`MerkleError::NonCommutativePair`] if `pair` disagrees
    /// with itself on swapped random inputs.
    pub fn new(store: S, pair: P) -> Result<Self, MerkleError> {
        let a: NodeHash = rand::thread_rng().gen();
        let b: NodeHash = rand::thread_rng().gen();
        if pair(&a, &b) != pair(&b, &a) {
            return Err(MerkleError::NonCommutativePair);
        }

        Ok(Self {
            store,
            pair,
            working_tree: None,
        })
    }

    /// Reset the working tree to an empty tree with the given identity.
    ///
    /// Both indices are 1-based; zero is reserved as a sentinel. Writes
    /// nothing to the store.
    pub fn initialize_working_tree(
        &mut self,
        tree_index: u64,
        start_leaf_index: u64,
    ) -> Result<(), MerkleError> {
        if tree_index < 1 || start_leaf_index < 1 {
            return Err(MerkleError::InvalidIndex {
                tree_index,
                start_leaf_index,
            });
        }

        self.working_tree = Some(WorkingTree::new(tree_index, start_leaf_index));
        Ok(())
    }

    /// Height of the working tree for its current leaf count.
    pub fn height(&self) -> Result<u8, MerkleError> {
        Ok(tree_height(self.working()?.leaf_count))
    }

    /// Index of the working tree.
    pub fn working_tree_index(&self) -> Result<u64, MerkleError> {
        Ok(self.working()?.index)
    }

    /// Number of leaves inserted into the working tree so far.
    pub fn working_tree_leaf_count(&self) -> Result<u64, MerkleError> {
        Ok(self.working()?.leaf_count)
    }

    /// Global index of the working tree's first leaf.
    pub fn start_leaf_index(&self) -> Result<u64, MerkleError> {
        Ok(self.working()?.start_leaf_index)
    }

    pub(crate) fn working(&self) -> Result<&WorkingTree, MerkleError> {
        self.working_tree
            .as_ref()
            .ok_or(MerkleError::WorkingTreeNotInitialized)
    }

    pub(crate) fn working_mut(&mut self) -> Result<&mut WorkingTree, MerkleError> {
        self.working_tree
            .as_mut()
            .ok_or(MerkleError::WorkingTreeNotInitialized)
    }
}
