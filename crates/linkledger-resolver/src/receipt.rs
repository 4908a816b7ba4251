//! Fast-path resolution from a write's own confirmation receipt.
//!
//! When this client performs the write that mints a mapping, the confirmation
//! receipt already carries the minted event — reading the id out of it is
//! authoritative and race-free, with no round-trip through the relay. The
//! relay fallback below exists only because a receipt's event list is not
//! fully self-describing; a correctly-behaving ledger always emits the event.

use linkledger_types::{Error, LedgerEvent, LinkId, NormalizedKey, Receipt};

use crate::index::LinkIndex;
use crate::snapshot::{self, SnapshotSource};

/// Resolve the link id minted by a confirmed post.
///
/// Scans the receipt's events for the minted mapping; unrelated events are
/// ignored. On a hit the mapping is merged into the index (a conflicting held
/// entry is a surfaced hard error, never an overwrite) and the id returned
/// without touching the relay. If the receipt carries no such event, exactly
/// one snapshot refresh is triggered and the expected `(subject, url)` key
/// looked up; a remaining miss fails with [`Error::ResolutionMiss`].
pub fn resolve_posted<S: SnapshotSource + ?Sized>(
    index: &LinkIndex,
    source: &S,
    receipt: &Receipt,
    subject: &str,
    url: &str,
) -> Result<LinkId, Error> {
    for event in &receipt.events {
        if let LedgerEvent::LinkPosted {
            link_id,
            subject: event_subject,
            url: event_url,
            ..
        } = event
        {
            // The event's own fields are authoritative for the key: the
            // ledger may canonicalize the URL it was asked to store.
            let key = NormalizedKey::new(event_subject, event_url);
            index.insert(key, link_id.clone())?;
            return Ok(link_id.clone());
        }
    }

    snapshot::refresh(index, source);
    let key = NormalizedKey::new(subject, url);
    index.get(&key).ok_or(Error::ResolutionMiss { key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::tests::CountingSource;
    use linkledger_types::LinkRecord;

    fn link_id(byte: u8) -> LinkId {
        format!("0x{}", hex::encode([byte; 32])).parse().unwrap()
    }

    fn posted(byte: u8, subject: &str, url: &str) -> LedgerEvent {
        LedgerEvent::LinkPosted {
            link_id: link_id(byte),
            subject: subject.to_string(),
            url: url.to_string(),
            subject_post_seq: 1,
        }
    }

    fn clicked(byte: u8) -> LedgerEvent {
        LedgerEvent::LinkClicked {
            link_id: link_id(byte),
            clicker: "0xdef".to_string(),
            clicks: 7,
        }
    }

    #[test]
    fn test_fast_path_never_touches_the_relay() {
        let index = LinkIndex::new();
        let source = CountingSource::with_records(vec![]);
        let receipt = Receipt {
            tx_hash: "0xf00".to_string(),
            events: vec![posted(2, "0xabc", "http://x.test")],
        };

        let id = resolve_posted(&index, &source, &receipt, "0xabc", "http://x.test").unwrap();
        assert_eq!(id, link_id(2));
        assert_eq!(source.call_count(), 0);

        // The mapping was merged for later reads.
        let key = NormalizedKey::new("0xabc", "http://x.test");
        assert_eq!(index.get(&key), Some(link_id(2)));
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        let index = LinkIndex::new();
        let source = CountingSource::with_records(vec![]);
        let receipt = Receipt {
            tx_hash: "0xf00".to_string(),
            events: vec![clicked(9), posted(2, "0xabc", "http://x.test")],
        };

        let id = resolve_posted(&index, &source, &receipt, "0xabc", "http://x.test").unwrap();
        assert_eq!(id, link_id(2));
    }

    #[test]
    fn test_missing_event_falls_back_to_one_refresh() {
        let index = LinkIndex::new();
        let source = CountingSource::with_records(vec![LinkRecord {
            subject: "0xabc".to_string(),
            url: "http://x.test".to_string(),
            link_id: link_id(3),
        }]);
        let receipt = Receipt {
            tx_hash: "0xf00".to_string(),
            events: vec![],
        };

        let id = resolve_posted(&index, &source, &receipt, "0xabc", "http://x.test").unwrap();
        assert_eq!(id, link_id(3));
        assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn test_missing_event_and_empty_snapshot_is_a_miss() {
        let index = LinkIndex::new();
        let source = CountingSource::with_records(vec![]);
        let receipt = Receipt {
            tx_hash: "0xf00".to_string(),
            events: vec![clicked(9)],
        };

        let err =
            resolve_posted(&index, &source, &receipt, "0xabc", "http://x.test").unwrap_err();
        assert!(matches!(err, Error::ResolutionMiss { .. }));
        assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn test_conflicting_receipt_id_is_a_hard_error() {
        let index = LinkIndex::new();
        let key = NormalizedKey::new("0xabc", "http://x.test");
        index.insert(key.clone(), link_id(1)).unwrap();

        let source = CountingSource::with_records(vec![]);
        let receipt = Receipt {
            tx_hash: "0xf00".to_string(),
            events: vec![posted(2, "0xabc", "http://x.test")],
        };

        let err =
            resolve_posted(&index, &source, &receipt, "0xabc", "http://x.test").unwrap_err();
        assert!(matches!(err, Error::IdentifierMismatch { .. }));
        assert_eq!(index.get(&key), Some(link_id(1)));
    }
}
