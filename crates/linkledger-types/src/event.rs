//! Ledger events, relay snapshot records and confirmation receipts.
//!
//! Events are produced and owned by the ledger; the relay mirrors them and
//! this client only observes a subset of their fields. Wire field names are
//! camelCase, matching the relay's JSON payloads.

use serde::{Deserialize, Serialize};

use crate::link::LinkId;

/// An externally-owned fact from the ledger's event log.
///
/// Event kinds this client does not know about decode as [`LedgerEvent::Other`]
/// so a newer ledger never breaks the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum LedgerEvent {
    /// A new (subject, url) mapping was minted.
    LinkPosted {
        link_id: LinkId,
        subject: String,
        url: String,
        #[serde(default)]
        subject_post_seq: u64,
    },
    /// An existing link was clicked.
    LinkClicked {
        link_id: LinkId,
        clicker: String,
        clicks: u64,
    },
    /// A subject was reported.
    SubjectReported {
        reporter: String,
        subject: String,
        total_reports: u64,
        penalty_bps: u16,
    },
    /// A subject's trust state was finalized.
    SubjectFinalized {
        subject: String,
        link_id: LinkId,
        #[serde(default)]
        clicks_on_link: u64,
        #[serde(default)]
        baseline_members: u64,
    },
    /// An event kind this client does not understand.
    #[serde(other)]
    Other,
}

/// One row of the relay's "all known mappings" snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub subject: String,
    pub url: String,
    pub link_id: LinkId,
}

/// Result of a confirmed ledger write: the transaction hash and the events
/// the write caused to be emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx_hash: String,
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}
