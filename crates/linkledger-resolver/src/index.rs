//! In-memory resolution index mapping normalized keys to link ids.
//!
//! This is the single source of truth for "do we already know this link id."
//! It mirrors an append-only ledger, so entries are never removed and a held
//! entry is permanently valid. The index is explicitly owned and injected
//! (`Arc<LinkIndex>`) rather than process-global, so each component — and each
//! test — works against its own instance.
//!
//! # Example
//!
//! ```
//! use linkledger_resolver::LinkIndex;
//! use linkledger_types::NormalizedKey;
//!
//! let index = LinkIndex::new();
//! let key = NormalizedKey::new("0xABC", "HTTP://Example.com/");
//!
//! assert!(index.get(&key).is_none());
//! ```

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::error;

use linkledger_types::{Error, LinkId, LinkRecord, NormalizedKey};

/// Thread-safe index from [`NormalizedKey`] to [`LinkId`].
///
/// One coarse lock serializes all access; write volume is low (one insert per
/// minted mapping) so finer granularity buys nothing.
#[derive(Debug, Default)]
pub struct LinkIndex {
    entries: RwLock<HashMap<NormalizedKey, LinkId>>,
}

impl LinkIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the link id for a key. Pure read, no side effects.
    pub fn get(&self, key: &NormalizedKey) -> Option<LinkId> {
        self.entries.read().get(key).cloned()
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &NormalizedKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Store a mapping.
    ///
    /// Re-inserting the id already held for the key is an idempotent no-op.
    /// A DIFFERENT id for a held key is a ledger-invariant violation: the
    /// held entry is kept and [`Error::IdentifierMismatch`] is returned.
    pub fn insert(&self, key: NormalizedKey, id: LinkId) -> Result<(), Error> {
        let mut entries = self.entries.write();
        match entries.get(&key) {
            Some(held) if *held != id => Err(Error::IdentifierMismatch {
                key,
                held: held.clone(),
                incoming: id,
            }),
            _ => {
                entries.insert(key, id);
                Ok(())
            }
        }
    }

    /// Merge a batch of snapshot records.
    ///
    /// Used by the background synchronization paths, so per-record mismatches
    /// are contained: logged with key context and skipped while the rest of
    /// the batch still merges. Returns the number of records applied.
    pub fn merge(&self, records: impl IntoIterator<Item = LinkRecord>) -> usize {
        let mut applied = 0;
        for record in records {
            let key = NormalizedKey::new(&record.subject, &record.url);
            match self.insert(key, record.link_id) {
                Ok(()) => applied += 1,
                Err(e) => {
                    error!(kind = "identifier_mismatch", error = %e, "skipping conflicting record");
                }
            }
        }
        applied
    }

    /// Number of known mappings.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the index holds no mappings yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_id(byte: u8) -> LinkId {
        format!("0x{}", hex::encode([byte; 32])).parse().unwrap()
    }

    fn record(subject: &str, url: &str, byte: u8) -> LinkRecord {
        LinkRecord {
            subject: subject.to_string(),
            url: url.to_string(),
            link_id: link_id(byte),
        }
    }

    #[test]
    fn test_insert_then_get() {
        let index = LinkIndex::new();
        let key = NormalizedKey::new("0xabc", "http://x.test");

        index.insert(key.clone(), link_id(1)).unwrap();
        assert_eq!(index.get(&key), Some(link_id(1)));
        assert!(index.contains(&key));
    }

    #[test]
    fn test_miss_returns_none() {
        let index = LinkIndex::new();
        let key = NormalizedKey::new("0xabc", "http://x.test");
        assert_eq!(index.get(&key), None);
        assert!(!index.contains(&key));
    }

    #[test]
    fn test_same_value_reinsert_is_idempotent() {
        let index = LinkIndex::new();
        let key = NormalizedKey::new("0xabc", "http://x.test");

        index.insert(key.clone(), link_id(1)).unwrap();
        index.insert(key.clone(), link_id(1)).unwrap();
        assert_eq!(index.get(&key), Some(link_id(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_conflicting_reinsert_keeps_held_entry() {
        let index = LinkIndex::new();
        let key = NormalizedKey::new("0xabc", "http://x.test");

        index.insert(key.clone(), link_id(1)).unwrap();
        let err = index.insert(key.clone(), link_id(2)).unwrap_err();
        assert!(matches!(err, Error::IdentifierMismatch { .. }));
        assert_eq!(index.get(&key), Some(link_id(1)));
    }

    #[test]
    fn test_merge_normalizes_keys() {
        let index = LinkIndex::new();
        let applied = index.merge(vec![record("0xABC", "HTTP://Example.com/", 1)]);
        assert_eq!(applied, 1);

        let key = NormalizedKey::new("0xabc", "http://example.com/");
        assert_eq!(index.get(&key), Some(link_id(1)));
    }

    #[test]
    fn test_merge_skips_conflicts_but_applies_rest() {
        let index = LinkIndex::new();
        let key = NormalizedKey::new("0xabc", "http://x.test");
        index.insert(key.clone(), link_id(1)).unwrap();

        let applied = index.merge(vec![
            record("0xabc", "http://x.test", 2), // conflicts with held id
            record("0xdef", "http://y.test", 3),
        ]);

        assert_eq!(applied, 1);
        assert_eq!(index.get(&key), Some(link_id(1)));
        assert_eq!(index.len(), 2);
    }
}
