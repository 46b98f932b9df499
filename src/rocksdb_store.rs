//! RocksDB-backed store. Requires the `rocksdb_storage` feature.

use std::{path::Path, sync::Arc};

use rocksdb::{WriteBatch, DB};

use crate::{MerkleError, RawKv, TreeStore};

/// Durable [`TreeStore`] over a RocksDB database.
///
/// A store carries a key prefix that namespaces everything it reads and
/// writes, so several subsystems can share one physical database without
/// key collisions. [`with_prefix`](Self::with_prefix) derives further
/// stores over the same database handle.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    prefix: Vec<u8>,
}

impl RocksDbStore {
    /// Open (or create) a database at `path` with an empty namespace.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MerkleError> {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).map_err(|e| MerkleError::Store(e.to_string()))?;
        Ok(Self {
            db: Arc::new(db),
            prefix: Vec::new(),
        })
    }

    /// Derive a store over the same database whose namespace is this
    /// store's prefix extended by `prefix`.
    pub fn with_prefix(&self, prefix: &[u8]) -> Self {
        let mut extended = self.prefix.clone();
        extended.extend_from_slice(prefix);
        Self {
            db: Arc::clone(&self.db),
            prefix: extended,
        }
    }

    fn prefixed_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl TreeStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, MerkleError> {
        self.db
            .get(self.prefixed_key(key))
            .map_err(|e| MerkleError::Store(e.to_string()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), MerkleError> {
        self.db
            .put(self.prefixed_key(key), value)
            .map_err(|e| MerkleError::Store(e.to_string()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), MerkleError> {
        self.db
            .delete(self.prefixed_key(key))
            .map_err(|e| MerkleError::Store(e.to_string()))
    }

    fn batch_set(&self, kvs: &[RawKv]) -> Result<(), MerkleError> {
        let mut batch = WriteBatch::default();
        for kv in kvs {
            batch.put(self.prefixed_key(&kv.key), &kv.value);
        }
        self.db
            .write(batch)
            .map_err(|e| MerkleError::Store(e.to_string()))
    }

    fn prefixed_iterate(
        &self,
        prefix: &[u8],
        start: Option<&[u8]>,
        f: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, MerkleError>,
    ) -> Result<(), MerkleError> {
        let full_prefix = self.prefixed_key(prefix);
        let seek_from = match start {
            Some(start) => self.prefixed_key(start),
            None => full_prefix.clone(),
        };

        let mut iter = self.db.raw_iterator();
        iter.seek(&seek_from);
        while iter.valid() {
            let stop = match (iter.key(), iter.value()) {
                (Some(key), Some(value)) if key.starts_with(&full_prefix) => {
                    f(&key[self.prefix.len()..], value)?
                }
                _ => break,
            };
            if stop {
                return Ok(());
            }
            iter.next();
        }
        iter.status().map_err(|e| MerkleError::Store(e.to_string()))
    }

    fn seek_prev_inclusive(
        &self,
        prefix: &[u8],
        target: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>, MerkleError> {
        let full_prefix = self.prefixed_key(prefix);
        let full_target = self.prefixed_key(target);

        let mut iter = self.db.raw_iterator();
        iter.seek_for_prev(&full_target);
        if iter.valid() {
            if let (Some(key), Some(value)) = (iter.key(), iter.value()) {
                if key.starts_with(&full_prefix) {
                    return Ok(Some((key[self.prefix.len()..].to_vec(), value.to_vec())));
                }
            }
            return Ok(None);
        }
        iter.status().map_err(|e| MerkleError::Store(e.to_string()))?;
        Ok(None)
    }
}
