//! Error taxonomy shared by every crate in the workspace.
//!
//! Propagation policy: background synchronization paths (snapshot refresh,
//! live feed) contain these errors and emit a structured diagnostic instead;
//! foreground resolution and write paths always surface them.

use std::fmt;

use thiserror::Error;

use crate::key::NormalizedKey;
use crate::link::LinkId;

/// Errors surfaced by the linkledger client.
#[derive(Debug, Error)]
pub enum Error {
    /// The relay or gateway was unreachable, or a payload failed to decode.
    #[error("{op} failed: {reason}")]
    Transport { op: &'static str, reason: String },

    /// No identifier was visible for the key after one snapshot
    /// reconciliation. Deliberately does not claim the mapping is absent
    /// from the ledger, only that it has not been observed yet.
    #[error("link id for {key} not yet visible on the ledger")]
    ResolutionMiss { key: NormalizedKey },

    /// A ledger write was rejected, or its confirmation never arrived.
    #[error("write not confirmed: {reason}")]
    Confirmation { reason: String },

    /// Required configuration or signer is absent. Raised before any
    /// network interaction is attempted.
    #[error("precondition failed: {reason}")]
    Precondition { reason: String },

    /// Two different identifiers were observed for the same key. The ledger
    /// mints at most one id per (subject, url) pair, so this indicates a
    /// ledger-invariant violation and the held entry is never overwritten.
    #[error("identifier mismatch for {key}: held {held}, incoming {incoming}")]
    IdentifierMismatch {
        key: NormalizedKey,
        held: LinkId,
        incoming: LinkId,
    },
}

impl Error {
    pub fn transport(op: &'static str, reason: impl fmt::Display) -> Self {
        Self::Transport {
            op,
            reason: reason.to_string(),
        }
    }

    pub fn confirmation(reason: impl fmt::Display) -> Self {
        Self::Confirmation {
            reason: reason.to_string(),
        }
    }

    pub fn precondition(reason: impl fmt::Display) -> Self {
        Self::Precondition {
            reason: reason.to_string(),
        }
    }
}

/// A string that does not have the `0x` + 64-hex-chars shape of a link id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed link id {0:?} (want 0x-prefixed 64 hex chars)")]
pub struct InvalidLinkId(pub String);
