//! Append-only batched Merkle trees over a key-value store.
//!
//! Leaves arrive as a monotonically numbered stream of 32-byte digests and
//! are folded into a sequence of complete binary Merkle trees. The working
//! tree keeps only the last pending sibling of each level in memory, so
//! building costs O(log n) space regardless of leaf count, while every
//! node digest is persisted as it is produced. The working tree can be
//! checkpointed under a version and reloaded after a restart, trees are
//! finalized (padded and root-sealed) on demand, and inclusion proofs are
//! served for any leaf of a finalized tree by its global index.
//!
//! Node pairing is pluggable: any deterministic, commutative 2-to-1 hash
//! over 32-byte digests works. Commutativity is verified once at
//! construction, and lets proof consumers fold siblings without tracking
//! left/right orientation.

mod error;
pub mod keys;
mod mem_store;
mod proof;
#[cfg(feature = "rocksdb_storage")]
mod rocksdb_store;
mod store;
mod tree;
mod tree_info;

#[cfg(test)]
mod test_utils;

pub use error::MerkleError;
pub use mem_store::MemStore;
pub use proof::LeafProof;
#[cfg(feature = "rocksdb_storage")]
pub use rocksdb_store::RocksDbStore;
pub use store::{RawKv, TreeStore};
pub use tree::BatchedMerkleTree;
pub use tree_info::{tree_height, FinalizedTree, NodeHash, WorkingTree, EMPTY_ROOT_HASH};
