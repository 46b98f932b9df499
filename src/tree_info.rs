//! Persisted tree records and the height law.

use serde::{Deserialize, Serialize};

/// A 32-byte node digest. Leaves are supplied as digests of this size.
pub type NodeHash = [u8; 32];

/// Root reported for a finalized tree that holds zero leaves.
pub const EMPTY_ROOT_HASH: NodeHash = [0u8; 32];

/// Number of bits needed to represent `n`; zero for `n == 0`.
pub(crate) fn bit_length(n: u64) -> u32 {
    64 - n.leading_zeros()
}

/// Height of a complete tree over `leaf_count` real leaves.
///
/// Zero and one leaf yield heights 0 and 1 respectively (a single leaf is
/// padded once, so its root sits one level up); otherwise the height is the
/// bit length of `leaf_count - 1`.
pub fn tree_height(leaf_count: u64) -> u8 {
    if leaf_count <= 1 {
        leaf_count as u8
    } else {
        bit_length(leaf_count - 1) as u8
    }
}

/// Mutable state of the tree currently accepting leaves.
///
/// `last_siblings[h]` is the most recent node at level `h` still waiting
/// for its right partner. In memory the levels are a dense vector (they are
/// always contiguous from level 0); on disk they serialize as a map from
/// level to digest, the layout the snapshot format has always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingTree {
    pub index: u64,
    pub start_leaf_index: u64,
    pub leaf_count: u64,
    #[serde(with = "siblings_map")]
    pub last_siblings: Vec<NodeHash>,
    pub done: bool,
}

impl WorkingTree {
    pub(crate) fn new(index: u64, start_leaf_index: u64) -> Self {
        Self {
            index,
            start_leaf_index,
            leaf_count: 0,
            last_siblings: Vec::new(),
            done: false,
        }
    }
}

/// Immutable record written when a tree is finalized.
///
/// `leaf_count` excludes padding; it is the number of real leaves, so the
/// global index range covered by this tree is
/// `[start_leaf_index, start_leaf_index + leaf_count)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedTree {
    pub tree_index: u64,
    pub tree_height: u8,
    pub root: NodeHash,
    pub start_leaf_index: u64,
    pub leaf_count: u64,
    pub extra_data: Vec<u8>,
}

/// On-disk codec for the last-siblings frontier: a map `level -> digest`.
///
/// Deserialization rejects maps whose levels are not contiguous from zero,
/// since the dense in-memory form cannot represent gaps.
mod siblings_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::NodeHash;

    pub fn serialize<S: Serializer>(
        siblings: &[NodeHash],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<u8, &NodeHash> = siblings
            .iter()
            .enumerate()
            .map(|(level, hash)| (level as u8, hash))
            .collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NodeHash>, D::Error> {
        let map = BTreeMap::<u8, NodeHash>::deserialize(deserializer)?;
        let mut siblings = Vec::with_capacity(map.len());
        for (expected, (level, hash)) in map.into_iter().enumerate() {
            if level as usize != expected {
                return Err(serde::de::Error::custom(format!(
                    "last sibling levels must be contiguous from 0, found gap at level {}",
                    level
                )));
            }
            siblings.push(hash);
        }
        Ok(siblings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Height by definition: smallest h with 2^h >= leaf_count, with the
    /// one-leaf special case.
    fn reference_height(leaf_count: u64) -> u8 {
        if leaf_count <= 1 {
            return leaf_count as u8;
        }
        let mut height = 0u8;
        while (1u64 << height) < leaf_count {
            height += 1;
        }
        height
    }

    #[test]
    fn height_law_holds_up_to_two_to_the_twenty() {
        for n in 0..=(1u64 << 20) {
            assert_eq!(tree_height(n), reference_height(n), "leaf count {}", n);
        }
    }

    #[test]
    fn height_law_spot_values() {
        assert_eq!(tree_height(0), 0);
        assert_eq!(tree_height(1), 1);
        assert_eq!(tree_height(2), 1);
        assert_eq!(tree_height(3), 2);
        assert_eq!(tree_height(4), 2);
        assert_eq!(tree_height(5), 3);
        assert_eq!(tree_height(u64::MAX), 64);
    }

    #[test]
    fn working_tree_json_roundtrip() {
        let tree = WorkingTree {
            index: 3,
            start_leaf_index: 17,
            leaf_count: 5,
            last_siblings: vec![[1u8; 32], [2u8; 32], [3u8; 32]],
            done: false,
        };
        let data = serde_json::to_vec(&tree).unwrap();
        let decoded: WorkingTree = serde_json::from_slice(&data).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn working_tree_serializes_siblings_as_level_map() {
        let tree = WorkingTree {
            index: 1,
            start_leaf_index: 1,
            leaf_count: 2,
            last_siblings: vec![[7u8; 32], [9u8; 32]],
            done: false,
        };
        let json: serde_json::Value = serde_json::to_value(&tree).unwrap();
        let map = json["last_siblings"].as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("0"));
        assert!(map.contains_key("1"));
    }

    #[test]
    fn working_tree_rejects_sibling_level_gaps() {
        let json = r#"{
            "index": 1,
            "start_leaf_index": 1,
            "leaf_count": 2,
            "last_siblings": { "0": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
                               "2": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0] },
            "done": false
        }"#;
        assert!(serde_json::from_str::<WorkingTree>(json).is_err());
    }

    #[test]
    fn finalized_tree_json_roundtrip() {
        let tree = FinalizedTree {
            tree_index: 2,
            tree_height: 3,
            root: [0xAB; 32],
            start_leaf_index: 9,
            leaf_count: 6,
            extra_data: b"output-batch-2".to_vec(),
        };
        let data = serde_json::to_vec(&tree).unwrap();
        let decoded: FinalizedTree = serde_json::from_slice(&data).unwrap();
        assert_eq!(decoded, tree);
    }
}
