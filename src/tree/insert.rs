//! Leaf insertion, padding and finalization.

use super::BatchedMerkleTree;
use crate::{
    keys::{finalized_tree_key, node_key},
    tree_info::tree_height,
    FinalizedTree, MerkleError, NodeHash, RawKv, TreeStore, EMPTY_ROOT_HASH,
};

impl<S, P> BatchedMerkleTree<S, P>
where
    S: TreeStore,
    P: Fn(&NodeHash, &NodeHash) -> NodeHash,
{
    /// Insert a leaf into the working tree.
    ///
    /// The node is persisted at level 0, then folded upward with the stored
    /// last sibling of each level for as long as its local index is odd:
    /// an odd node is exactly the right partner the level was waiting for.
    /// Each produced parent is persisted too, so proofs can later be read
    /// straight from the store. O(log n) store writes per call.
    ///
    /// Must not be called after the working tree has been finalized.
    pub fn insert_leaf(&mut self, data: NodeHash) -> Result<(), MerkleError> {
        let tree = self
            .working_tree
            .as_mut()
            .ok_or(MerkleError::WorkingTreeNotInitialized)?;

        let mut data = data;
        let mut height = 0usize;
        let mut local_index = tree.leaf_count;

        loop {
            self.store
                .set(&node_key(tree.index, height as u8, local_index), &data)?;

            if local_index % 2 == 0 {
                // left node: park it as the level's pending sibling until
                // its right partner arrives
                if height == tree.last_siblings.len() {
                    tree.last_siblings.push(data);
                } else {
                    tree.last_siblings[height] = data;
                }
                break;
            }

            // right node: fold with the pending left sibling and carry the
            // parent to the next level
            let sibling = std::mem::replace(&mut tree.last_siblings[height], data);
            data = (self.pair)(&sibling, &data);
            local_index /= 2;
            height += 1;
        }

        tree.leaf_count += 1;
        Ok(())
    }

    /// Seal the working tree and build its finalized record.
    ///
    /// Returns the root together with the key-value pairs to persist; the
    /// caller commits them atomically alongside its own state, this method
    /// writes no record itself. An empty tree produces no record and the
    /// [`EMPTY_ROOT_HASH`] root.
    pub fn finalize_working_tree(
        &mut self,
        extra_data: &[u8],
    ) -> Result<(Vec<RawKv>, NodeHash), MerkleError> {
        {
            let tree = self.working_mut()?;
            tree.done = true;
            if tree.leaf_count == 0 {
                return Ok((Vec::new(), EMPTY_ROOT_HASH));
            }
        }

        self.fill_leaves()?;

        let tree = self.working()?;
        let height = tree_height(tree.leaf_count);
        let root = tree.last_siblings[height as usize];

        let finalized = FinalizedTree {
            tree_index: tree.index,
            tree_height: height,
            root,
            start_leaf_index: tree.start_leaf_index,
            leaf_count: tree.leaf_count,
            extra_data: extra_data.to_vec(),
        };
        let value =
            serde_json::to_vec(&finalized).map_err(|e| MerkleError::Codec(e.to_string()))?;

        // keyed by start leaf index so proof requests can locate the record
        // with a seek-previous lookup on the leaf's global index
        let kvs = vec![RawKv {
            key: finalized_tree_key(finalized.start_leaf_index).to_vec(),
            value,
        }];

        Ok((kvs, root))
    }

    /// Pad the tree to `2^height` leaves by reinserting the last real leaf.
    ///
    /// Padding nodes are persisted like any others; they are the siblings
    /// neighboring real leaves need for their proofs. The leaf count is
    /// restored to the real count afterwards so global leaf-index
    /// arithmetic stays aligned with the inserted stream.
    fn fill_leaves(&mut self) -> Result<(), MerkleError> {
        let tree = self.working()?;
        let height = tree_height(tree.leaf_count);
        let rest = (1u64 << height) - tree.leaf_count;
        if rest == 0 {
            return Ok(());
        }

        let last_leaf = tree.last_siblings[0];
        for _ in 0..rest {
            self.insert_leaf(last_leaf)?;
        }
        self.working_mut()?.leaf_count -= rest;

        Ok(())
    }
}
