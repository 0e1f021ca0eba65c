use std::sync::Arc;

use parking_lot::RwLock;
use sealed_payload::{Payload, Seal};

use crate::error::Result;
use crate::{IndexConfig, SealedIndex};

/// Cloneable handle to a [`SealedIndex`] shared between threads.
///
/// One reader–writer lock guards the whole index for the duration of each
/// operation: `insert` and `record_selection` take it exclusively, `rank`
/// shares it. A ranking therefore never observes a half-applied insert or
/// popularity increment.
pub struct SharedIndex<S: Seal> {
    inner: Arc<RwLock<SealedIndex<S>>>,
}

impl<S: Seal> Clone for SharedIndex<S> {
    fn clone(&self) -> Self {
        SharedIndex {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Seal> SharedIndex<S> {
    pub fn new(sealer: S) -> Self {
        Self::from_index(SealedIndex::new(sealer))
    }

    pub fn with_config(sealer: S, config: IndexConfig) -> Self {
        Self::from_index(SealedIndex::with_config(sealer, config))
    }

    pub fn from_index(index: SealedIndex<S>) -> Self {
        SharedIndex {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    pub fn insert(&self, key: &str, plaintext: &[u8]) -> Result<()> {
        self.inner.write().insert(key, plaintext)
    }

    /// Bulk insert under a single write lock.
    pub fn insert_keys<I, K>(&self, keys: I) -> Result<usize>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.inner.write().insert_keys(keys)
    }

    pub fn rank(&self, prefix: &str) -> Vec<Payload> {
        self.inner.read().rank(prefix)
    }

    pub fn record_selection(&self, key: &str) -> bool {
        self.inner.write().record_selection(key)
    }

    pub fn popularity(&self, key: &str) -> Option<u64> {
        self.inner.read().popularity(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}
