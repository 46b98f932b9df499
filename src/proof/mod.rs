//! Inclusion proofs for leaves of finalized trees.
//!
//! A proof request carries only a global leaf index. The finalized tree
//! covering it is located with a seek-previous lookup on the records keyed
//! by start leaf index, then the sibling path is read back node by node
//! from the store.


use crate::{
    keys::{finalized_tree_key, node_key, FINALIZED_TREE_PREFIX},
    BatchedMerkleTree, FinalizedTree, MerkleError, NodeHash, TreeStore,
};

/// An inclusion proof for one leaf, together with the identity of the tree
/// it belongs to.
///
/// `siblings` is ordered leaf level first: folding the leaf digest with
/// each entry in turn yields `root`. The pairing function is commutative,
/// so verifiers do not need left/right orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafProof {
    pub siblings: Vec<NodeHash>,
    pub tree_index: u64,
    pub root: NodeHash,
    pub extra_data: Vec<u8>,
}

impl<S, P> BatchedMerkleTree<S, P>
where
    S: TreeStore,
    P: Fn(&NodeHash, &NodeHash) -> NodeHash,
{
    /// Build the inclusion proof for the leaf with the given global index.
    ///
    /// Fails with [`MerkleError::UnfinalizedTree`] when no finalized tree
    /// covers the index: either no tree starts at or before it, or it lies
    /// past the covering tree's real leaves. Padding slots are deliberately
    /// not provable; the padded copies exist only as siblings for real
    /// leaves.
    pub fn get_proofs(&self, leaf_index: u64) -> Result<LeafProof, MerkleError> {
        let located = self
            .store
            .seek_prev_inclusive(FINALIZED_TREE_PREFIX, &finalized_tree_key(leaf_index))?;
        let Some((_, value)) = located else {
            return Err(MerkleError::UnfinalizedTree(leaf_index));
        };

        let tree: FinalizedTree =
            serde_json::from_slice(&value).map_err(|e| MerkleError::Codec(e.to_string()))?;

        if leaf_index < tree.start_leaf_index {
            return Err(MerkleError::LeafNotInTree {
                leaf_index,
                tree_index: tree.tree_index,
            });
        }
        if leaf_index - tree.start_leaf_index >= tree.leaf_count {
            return Err(MerkleError::UnfinalizedTree(leaf_index));
        }

        let mut siblings = Vec::with_capacity(tree.tree_height as usize);
        let mut local_index = leaf_index - tree.start_leaf_index;
        for height in 0..tree.tree_height {
            // flip the last bit to address the sibling
            siblings.push(self.get_node(tree.tree_index, height, local_index ^ 1)?);
            local_index /= 2;
        }

        Ok(LeafProof {
            siblings,
            tree_index: tree.tree_index,
            root: tree.root,
            extra_data: tree.extra_data,
        })
    }

    fn get_node(
        &self,
        tree_index: u64,
        height: u8,
        local_index: u64,
    ) -> Result<NodeHash, MerkleError> {
        let bytes = self
            .store
            .get(&node_key(tree_index, height, local_index))?
            .ok_or_else(|| {
                MerkleError::Store(format!(
                    "expected node at tree {} height {} index {} but found none",
                    tree_index, height, local_index
                ))
            })?;
        bytes.as_slice().try_into().map_err(|_| {
            MerkleError::Codec(format!(
                "node value must be 32 bytes, got {}",
                bytes.len()
            ))
        })
    }
}
