//! Encrypted autocomplete: sealed suggestions ranked by popularity.
//!
//! This is the facade crate that wires together the lower-level components:
//! - [`sealed_payload`]: the opaque [`Payload`] type and the [`Seal`]/[`Open`]
//!   capabilities
//! - [`prefix_index`]: the arena trie holding payloads and popularity
//! - [`ranked_retrieval`]: popularity-ordered prefix completion
//!
//! The index side ([`SealedIndex`], [`SharedIndex`]) only ever holds a
//! [`Seal`] capability. Opening payloads is the [`Client`]'s job.
//!
//! # Quick Start
//!
//! ```
//! use cipher_complete::{Client, KeyedOpener, KeyedSealer, OpeningKey, SealedIndex};
//!
//! let key = OpeningKey::generate();
//!
//! let mut index = SealedIndex::new(KeyedSealer::new(key.sealing_key()));
//! index.insert_keys(["apple", "app", "apex"]).unwrap();
//! index.record_selection("apple");
//!
//! let client = Client::new(KeyedOpener::new(key));
//! let words = client.decrypt_suggestions(&index.rank("ap")).unwrap();
//! assert_eq!(words, vec!["apple", "apex", "app"]);
//! ```

mod client;
mod error;
mod shared;
mod vocabulary;

use log::debug;

pub use client::Client;
pub use error::{Error, Result};
pub use prefix_index::{PrefixIndex, SnapshotError};
pub use sealed_payload::{
    KeyParseError, KeyedOpener, KeyedSealer, Open, OpenError, OpeningKey, Payload, Seal, SealError,
    SealingKey,
};
pub use shared::SharedIndex;
pub use vocabulary::{DEFAULT_VOCABULARY, load_word_list};

/// Tunables for a [`SealedIndex`].
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    /// Cap on the number of payloads [`SealedIndex::rank`] returns.
    /// `None` returns every match.
    pub max_suggestions: Option<usize>,
}

/// A prefix index that seals plaintext on the way in.
///
/// Generic over the sealing capability `S`. The index stores whatever `S`
/// produces and never sees a way back to plaintext.
pub struct SealedIndex<S: Seal> {
    index: PrefixIndex,
    sealer: S,
    config: IndexConfig,
}

impl<S: Seal> SealedIndex<S> {
    pub fn new(sealer: S) -> Self {
        Self::with_config(sealer, IndexConfig::default())
    }

    pub fn with_config(sealer: S, config: IndexConfig) -> Self {
        SealedIndex {
            index: PrefixIndex::new(),
            sealer,
            config,
        }
    }

    pub fn set_config(&mut self, config: IndexConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Seal `plaintext` and index it under `key`.
    ///
    /// Sealing runs before the trie is touched, so a sealing failure leaves
    /// the index exactly as it was.
    pub fn insert(&mut self, key: &str, plaintext: &[u8]) -> Result<()> {
        let payload = self
            .sealer
            .seal(plaintext)
            .map_err(|e| Error::Seal(Box::new(e)))?;
        self.index.insert(key, payload);
        debug!(
            "indexed key of {} chars, {} keys total",
            key.chars().count(),
            self.index.len()
        );
        Ok(())
    }

    /// Index each key with its own sealed bytes as payload.
    ///
    /// Stops at the first sealing failure; keys before it stay indexed.
    /// Returns the number of keys inserted.
    pub fn insert_keys<I, K>(&mut self, keys: I) -> Result<usize>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut inserted = 0;
        for key in keys {
            let key = key.as_ref();
            self.insert(key, key.as_bytes())?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Payloads of every key starting with `prefix`, most popular first,
    /// capped by [`IndexConfig::max_suggestions`].
    pub fn rank(&self, prefix: &str) -> Vec<Payload> {
        match self.config.max_suggestions {
            Some(limit) => ranked_retrieval::rank_limited(&self.index, prefix, limit),
            None => ranked_retrieval::rank(&self.index, prefix),
        }
    }

    /// Count one selection of `key`. Unknown keys are ignored.
    pub fn record_selection(&mut self, key: &str) -> bool {
        self.index.record_selection(key)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    #[inline]
    pub fn popularity(&self, key: &str) -> Option<u64> {
        self.index.popularity(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drop the whole vocabulary. The sealer and config are kept.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Get a reference to the underlying index (for inspection/testing).
    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }
}
