//! Working tree checkpoints and rollback of persisted records.

use super::BatchedMerkleTree;
use crate::{
    keys::{trailing_u64, working_tree_key, FINALIZED_TREE_PREFIX, WORKING_TREE_PREFIX},
    tree_info::bit_length,
    MerkleError, NodeHash, TreeStore, WorkingTree,
};

impl<S, P> BatchedMerkleTree<S, P>
where
    S: TreeStore,
    P: Fn(&NodeHash, &NodeHash) -> NodeHash,
{
    /// Persist the working tree under a caller-chosen version, typically a
    /// block height, so a restarted process can resume mid-tree.
    pub fn save_working_tree(&self, version: u64) -> Result<(), MerkleError> {
        let tree = self.working()?;
        let data = serde_json::to_vec(tree).map_err(|e| MerkleError::Codec(e.to_string()))?;
        self.store.set(&working_tree_key(version), &data)
    }

    /// Load the working tree snapshot saved under `version`.
    ///
    /// A snapshot of a finalized tree rolls over automatically: the next
    /// working tree is initialized with the successor index and the leaf
    /// numbering continuing past the finalized leaves. That successor only
    /// exists in memory until the next [`save_working_tree`].
    ///
    /// [`save_working_tree`]: Self::save_working_tree
    pub fn load_working_tree(&mut self, version: u64) -> Result<(), MerkleError> {
        let data = self
            .store
            .get(&working_tree_key(version))?
            .ok_or(MerkleError::SnapshotNotFound(version))?;
        let tree: WorkingTree =
            serde_json::from_slice(&data).map_err(|e| MerkleError::Codec(e.to_string()))?;

        if tree.done {
            let next_index = tree.index + 1;
            let next_start = tree.start_leaf_index + tree.leaf_count;
            return self.initialize_working_tree(next_index, next_start);
        }

        // a live tree has one pending sibling per populated level
        if tree.last_siblings.len() != bit_length(tree.leaf_count) as usize {
            return Err(MerkleError::Codec(format!(
                "snapshot for version {} has {} sibling levels for {} leaves",
                version,
                tree.last_siblings.len(),
                tree.leaf_count
            )));
        }

        self.working_tree = Some(tree);
        Ok(())
    }

    /// Delete working tree snapshots with version `>= from_version`.
    ///
    /// Used to roll back past a reorged block. Idempotent.
    pub fn delete_future_working_trees(&mut self, from_version: u64) -> Result<(), MerkleError> {
        self.delete_from(WORKING_TREE_PREFIX, from_version)
    }

    /// Delete finalized tree records whose start leaf index is
    /// `>= from_sequence`. Idempotent.
    pub fn delete_future_finalized_trees(&mut self, from_sequence: u64) -> Result<(), MerkleError> {
        self.delete_from(FINALIZED_TREE_PREFIX, from_sequence)
    }

    fn delete_from(&self, prefix: &[u8], cutoff: u64) -> Result<(), MerkleError> {
        let mut stale: Vec<Vec<u8>> = Vec::new();
        self.store.prefixed_iterate(prefix, None, &mut |key, _| {
            if trailing_u64(key)? >= cutoff {
                stale.push(key.to_vec());
            }
            Ok(false)
        })?;

        for key in &stale {
            self.store.delete(key)?;
        }
        Ok(())
    }
}
