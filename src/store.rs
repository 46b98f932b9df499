//! Storage abstraction for the batched Merkle tree.

use crate::MerkleError;

/// A raw key-value pair destined for an atomic batch write.
///
/// [`BatchedMerkleTree::finalize_working_tree`](crate::BatchedMerkleTree::finalize_working_tree)
/// returns these instead of writing directly so the caller can commit the
/// finalized record atomically together with its own state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKv {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Abstraction over ordered key-value storage.
///
/// Methods take `&self` (interior mutability) so one store handle can serve
/// reads and writes alike, matching batch-based transactional backends.
///
/// Keys passed through this trait are relative to the store's namespace;
/// implementations apply any global prefix of their own before touching the
/// physical database. Within a namespace, iteration order is lexicographic
/// over the raw key bytes.
pub trait TreeStore {
    /// Point lookup. `Ok(None)` means the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, MerkleError>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), MerkleError>;

    fn delete(&self, key: &[u8]) -> Result<(), MerkleError>;

    /// Write all pairs atomically: either every entry lands or none does.
    fn batch_set(&self, kvs: &[RawKv]) -> Result<(), MerkleError>;

    /// Iterate keys beginning with `prefix` in ascending order, starting at
    /// `start` (a full key) or at the beginning of the prefix when `None`.
    ///
    /// The callback returns `Ok(true)` to stop early.
    fn prefixed_iterate(
        &self,
        prefix: &[u8],
        start: Option<&[u8]>,
        f: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, MerkleError>,
    ) -> Result<(), MerkleError>;

    /// Find the greatest key `<= target` that begins with `prefix`.
    ///
    /// `target` must itself begin with `prefix`.
    fn seek_prev_inclusive(
        &self,
        prefix: &[u8],
        target: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>, MerkleError>;
}

impl<S: TreeStore + ?Sized> TreeStore for &S {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, MerkleError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), MerkleError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), MerkleError> {
        (**self).delete(key)
    }

    fn batch_set(&self, kvs: &[RawKv]) -> Result<(), MerkleError> {
        (**self).batch_set(kvs)
    }

    fn prefixed_iterate(
        &self,
        prefix: &[u8],
        start: Option<&[u8]>,
        f: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, MerkleError>,
    ) -> Result<(), MerkleError> {
        (**self).prefixed_iterate(prefix, start, f)
    }

    fn seek_prev_inclusive(
        &self,
        prefix: &[u8],
        target: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>, MerkleError> {
        (**self).seek_prev_inclusive(prefix, target)
    }
}
