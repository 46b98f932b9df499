//! Shared helpers for unit tests.

use sha2::{Digest, Sha256};

use crate::NodeHash;

/// Commutative pairing used throughout the tests:
/// `SHA256(min(a, b) || max(a, b))`.
pub(crate) fn test_pair(a: &NodeHash, b: &NodeHash) -> NodeHash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    hasher.finalize().into()
}

/// A distinct 32-byte leaf digest.
pub(crate) fn leaf(n: u8) -> NodeHash {
    [n; 32]
}

/// Independent proof verifier: fold the leaf digest with each sibling in
/// order. Commutativity makes orientation irrelevant.
pub(crate) fn fold_proof(leaf: &NodeHash, siblings: &[NodeHash]) -> NodeHash {
    let mut acc = *leaf;
    for sibling in siblings {
        acc = test_pair(&acc, sibling);
    }
    acc
}
