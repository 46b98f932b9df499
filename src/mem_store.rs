//! In-memory store backed by a `BTreeMap`.

use std::{cell::RefCell, collections::BTreeMap, ops::Bound};

use crate::{MerkleError, RawKv, TreeStore};

/// In-memory [`TreeStore`] with ordered keys.
///
/// Useful for tests and ephemeral trees. Share it across manager restarts
/// by handing out `&MemStore`, which also implements the trait.
#[derive(Debug, Default)]
pub struct MemStore {
    data: RefCell<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl TreeStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, MerkleError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), MerkleError> {
        self.data.borrow_mut().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), MerkleError> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn batch_set(&self, kvs: &[RawKv]) -> Result<(), MerkleError> {
        let mut data = self.data.borrow_mut();
        for kv in kvs {
            data.insert(kv.key.clone(), kv.value.clone());
        }
        Ok(())
    }

    fn prefixed_iterate(
        &self,
        prefix: &[u8],
        start: Option<&[u8]>,
        f: &mut dyn FnMut(&[u8], &[u8]) -> Result<bool, MerkleError>,
    ) -> Result<(), MerkleError> {
        let data = self.data.borrow();
        let lower = match start {
            Some(start) if start > prefix => start,
            _ => prefix,
        };
        for (key, value) in data.range::<[u8], _>((Bound::Included(lower), Bound::Unbounded)) {
            // prefixed keys are contiguous, the first mismatch ends the scan
            if !key.starts_with(prefix) {
                break;
            }
            if f(key, value)? {
                break;
            }
        }
        Ok(())
    }

    fn seek_prev_inclusive(
        &self,
        prefix: &[u8],
        target: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>, MerkleError> {
        let data = self.data.borrow();
        // the greatest key <= target either carries the prefix or sorts
        // below the whole prefix range, so one step back suffices
        let found = data
            .range::<[u8], _>((Bound::Unbounded, Bound::Included(target)))
            .next_back()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemStore {
        let store = MemStore::new();
        for (key, value) in [
            (&b"a/1"[..], &b"v1"[..]),
            (b"a/3", b"v3"),
            (b"a/5", b"v5"),
            (b"b/1", b"w1"),
        ] {
            store.set(key, value).unwrap();
        }
        store
    }

    #[test]
    fn get_set_delete() {
        let store = MemStore::new();
        assert_eq!(store.get(b"k").unwrap(), None);
        store.set(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
        store.delete(b"k").unwrap();
        assert_eq!(store.get(b"k").unwrap(), None);
    }

    #[test]
    fn batch_set_writes_all() {
        let store = MemStore::new();
        store
            .batch_set(&[
                RawKv {
                    key: b"x".to_vec(),
                    value: b"1".to_vec(),
                },
                RawKv {
                    key: b"y".to_vec(),
                    value: b"2".to_vec(),
                },
            ])
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b"y").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn prefixed_iterate_visits_in_order() {
        let store = seeded();
        let mut seen = Vec::new();
        store
            .prefixed_iterate(b"a/", None, &mut |key, _| {
                seen.push(key.to_vec());
                Ok(false)
            })
            .unwrap();
        assert_eq!(seen, vec![b"a/1".to_vec(), b"a/3".to_vec(), b"a/5".to_vec()]);
    }

    #[test]
    fn prefixed_iterate_respects_start_and_stop() {
        let store = seeded();
        let mut seen = Vec::new();
        store
            .prefixed_iterate(b"a/", Some(b"a/2"), &mut |key, _| {
                seen.push(key.to_vec());
                Ok(key == b"a/3")
            })
            .unwrap();
        assert_eq!(seen, vec![b"a/3".to_vec()]);
    }

    #[test]
    fn seek_prev_inclusive_exact_and_between() {
        let store = seeded();
        // exact hit
        let (key, value) = store.seek_prev_inclusive(b"a/", b"a/3").unwrap().unwrap();
        assert_eq!((key.as_slice(), value.as_slice()), (&b"a/3"[..], &b"v3"[..]));
        // between keys falls back to the previous one
        let (key, _) = store.seek_prev_inclusive(b"a/", b"a/4").unwrap().unwrap();
        assert_eq!(key, b"a/3".to_vec());
    }

    #[test]
    fn seek_prev_inclusive_misses() {
        let store = seeded();
        // before the first prefixed key
        assert_eq!(store.seek_prev_inclusive(b"a/", b"a/0").unwrap(), None);
        // prefix with no entries at all
        assert_eq!(store.seek_prev_inclusive(b"c/", b"c/9").unwrap(), None);
    }
}
