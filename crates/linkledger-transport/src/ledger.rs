//! The ledger seam: write/read operations and the confirmation handle.
//!
//! The ledger is an external collaborator. Everything this client needs from
//! it sits behind [`LedgerClient`] so the facade — and every test — can
//! substitute an in-memory implementation.

use std::fmt;

use linkledger_types::{Baseline, Error, LinkId, LinkMeta, Receipt};

/// A submitted write awaiting confirmation.
///
/// Writes return immediately after submission; the emitted events only exist
/// once the ledger confirms the transaction, so [`PendingWrite::wait`] must
/// be called before the receipt can be inspected.
pub struct PendingWrite {
    tx_hash: String,
    wait_fn: Box<dyn FnOnce() -> Result<Receipt, Error> + Send>,
}

impl PendingWrite {
    pub fn new(
        tx_hash: impl Into<String>,
        wait_fn: impl FnOnce() -> Result<Receipt, Error> + Send + 'static,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            wait_fn: Box::new(wait_fn),
        }
    }

    /// A write that is already confirmed. Useful for in-memory ledgers.
    pub fn confirmed(receipt: Receipt) -> Self {
        let tx_hash = receipt.tx_hash.clone();
        Self::new(tx_hash, move || Ok(receipt))
    }

    /// Hash of the submitted transaction.
    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    /// Block until the write is confirmed or rejected.
    ///
    /// Rejection and confirmation timeout surface as
    /// [`Error::Confirmation`]; the write is never resubmitted here, since
    /// resubmission may consume fees and is a caller decision.
    pub fn wait(self) -> Result<Receipt, Error> {
        (self.wait_fn)()
    }
}

impl fmt::Debug for PendingWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWrite")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

/// Operations the external ledger exposes to this client.
///
/// Writes submit a transaction and hand back a [`PendingWrite`]; reads are
/// pure queries with no caching beyond the resolution index.
pub trait LedgerClient: Send + Sync {
    /// Address of the active signer. Fails with a precondition error when no
    /// signer is available, before any write is attempted.
    fn signer_address(&self) -> Result<String, Error>;

    // =========================================================================
    // Writes
    // =========================================================================

    /// Register the signer as a baseline member.
    fn join(&self) -> Result<PendingWrite, Error>;

    /// Mint a new (signer, url) mapping.
    fn post_link(&self, url: &str) -> Result<PendingWrite, Error>;

    /// Record a click on an existing link.
    fn click(&self, link_id: &LinkId) -> Result<PendingWrite, Error>;

    /// Report a subject.
    fn report(&self, subject: &str) -> Result<PendingWrite, Error>;

    // =========================================================================
    // Reads
    // =========================================================================

    fn is_trusted(&self, subject: &str) -> Result<bool, Error>;
    fn current_threshold_bps(&self, subject: &str) -> Result<u16, Error>;
    fn penalty_bps(&self, subject: &str) -> Result<u16, Error>;
    fn subject_report_count(&self, subject: &str) -> Result<u64, Error>;
    fn baseline(&self) -> Result<Baseline, Error>;
    fn link_meta(&self, link_id: &LinkId) -> Result<LinkMeta, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_write_yields_its_receipt() {
        let pending = PendingWrite::confirmed(Receipt {
            tx_hash: "0xf00".to_string(),
            events: vec![],
        });
        assert_eq!(pending.tx_hash(), "0xf00");
        assert_eq!(pending.wait().unwrap().tx_hash, "0xf00");
    }

    #[test]
    fn test_wait_surfaces_confirmation_failure() {
        let pending = PendingWrite::new("0xf00", || {
            Err(Error::confirmation("rejected: subject not a member"))
        });
        assert!(matches!(
            pending.wait().unwrap_err(),
            Error::Confirmation { .. }
        ));
    }
}
