//! Key layout for persisted tree records.
//!
//! Integer key components are encoded big-endian so lexicographic key order
//! matches numeric order, which the finalized-tree lookup and the
//! delete-future scans rely on.

use crate::MerkleError;

/// Prefix for versioned working tree snapshots.
pub const WORKING_TREE_PREFIX: &[u8] = b"working_tree/";

/// Prefix for finalized tree records, keyed by start leaf index.
pub const FINALIZED_TREE_PREFIX: &[u8] = b"finalized_tree/";

/// Prefix for node digests, keyed by `(tree index, height, local index)`.
pub const NODE_PREFIX: &[u8] = b"node/";

/// Build the key for a working tree snapshot: `working_tree/{version}` (21
/// bytes: 13-byte prefix + u64 BE).
pub fn working_tree_key(version: u64) -> [u8; 21] {
    let mut key = [0u8; 21];
    key[..13].copy_from_slice(WORKING_TREE_PREFIX);
    key[13..].copy_from_slice(&version.to_be_bytes());
    key
}

/// Build the key for a finalized tree record:
/// `finalized_tree/{start_leaf_index}` (23 bytes: 15-byte prefix + u64 BE).
pub fn finalized_tree_key(start_leaf_index: u64) -> [u8; 23] {
    let mut key = [0u8; 23];
    key[..15].copy_from_slice(FINALIZED_TREE_PREFIX);
    key[15..].copy_from_slice(&start_leaf_index.to_be_bytes());
    key
}

/// Build the key for a node digest:
/// `node/{tree_index}{height}{local_index}` (22 bytes: 5-byte prefix +
/// u64 BE + u8 + u64 BE).
pub fn node_key(tree_index: u64, height: u8, local_index: u64) -> [u8; 22] {
    let mut key = [0u8; 22];
    key[..5].copy_from_slice(NODE_PREFIX);
    key[5..13].copy_from_slice(&tree_index.to_be_bytes());
    key[13] = height;
    key[14..].copy_from_slice(&local_index.to_be_bytes());
    key
}

/// Decode the trailing 8 bytes of a key as a big-endian u64.
///
/// Working tree and finalized tree keys both end in their defining integer,
/// which the rollback scans compare against a cutoff.
pub(crate) fn trailing_u64(key: &[u8]) -> Result<u64, MerkleError> {
    let len = key.len();
    if len < 8 {
        return Err(MerkleError::Codec(format!(
            "key of {} bytes is too short to end in a u64",
            len
        )));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&key[len - 8..]);
    Ok(u64::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_order_matches_numeric_order() {
        // BE encoding keeps lexicographic and numeric order aligned where a
        // naive decimal rendering would sort 10 before 2
        assert!(finalized_tree_key(2) < finalized_tree_key(10));
        assert!(working_tree_key(255) < working_tree_key(256));
        assert!(node_key(1, 0, u64::MAX) < node_key(2, 0, 0));
        // within a tree, height is more significant than local index
        assert!(node_key(1, 0, 500) < node_key(1, 1, 0));
    }

    #[test]
    fn trailing_u64_roundtrip() {
        assert_eq!(trailing_u64(&working_tree_key(42)).unwrap(), 42);
        assert_eq!(
            trailing_u64(&finalized_tree_key(u64::MAX)).unwrap(),
            u64::MAX
        );
        assert_eq!(trailing_u64(&node_key(7, 3, 99)).unwrap(), 99);
    }

    #[test]
    fn trailing_u64_rejects_short_keys() {
        assert!(matches!(
            trailing_u64(b"short"),
            Err(crate::MerkleError::Codec(_))
        ));
    }
}
