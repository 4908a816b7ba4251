//! High-level client for the link ledger.
//!
//! [`LinkLedger`] wires the resolution index, the relay transport and the
//! signer gateway into the operation surface a host application uses:
//!
//! - **join / post / click / report** - ledger writes, confirmed before
//!   returning
//! - **resolve / link_stats / subject_stats / baseline** - reads, with link
//!   id resolution going through the local index first
//! - **events** - live ledger events, channel-based
//!
//! # Resolution flow
//!
//! The index is populated asynchronously from process start: one best-effort
//! snapshot refresh plus a persistent live-feed subscription. Operations that
//! need a link id query the index; on a miss the fallback reconciler forces
//! one more snapshot refresh before failing. A post resolves its own link id
//! straight from the confirmation receipt, so the writer never races the
//! relay's propagation delay.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use linkledger::LinkLedger;
//! use linkledger_transport::{HttpGateway, RelayClient};
//!
//! let app = LinkLedger::connect(RelayClient::from_env()?, Arc::new(HttpGateway::from_env()?));
//! app.join()?;
//! let link_id = app.post_link("https://example.com/article")?;
//! println!("minted {link_id}");
//! ```

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use serde::Serialize;
use tracing::{debug, warn};

use linkledger_resolver::{self as resolver, LinkIndex, SnapshotSource};
use linkledger_transport::{LedgerClient, LiveFeed, PendingWrite, RelayClient};
use linkledger_types::{Baseline, Error, LedgerEvent, LinkId, SubjectStats};

/// Click statistics for one resolved link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub link_id: LinkId,
    pub clicks: u64,
    pub exists: bool,
}

/// The assembled client: resolution index + relay + ledger gateway.
pub struct LinkLedger {
    index: Arc<LinkIndex>,
    source: Arc<dyn SnapshotSource + Send + Sync>,
    ledger: Arc<dyn LedgerClient>,
    feed: Option<LiveFeed>,
}

impl LinkLedger {
    /// Connect against a relay and ledger gateway.
    ///
    /// Kicks off the initial snapshot refresh on a background thread (a cold
    /// index is usable, just empty) and starts the live-feed subscription.
    pub fn connect(relay: RelayClient, ledger: Arc<dyn LedgerClient>) -> Self {
        let index = Arc::new(LinkIndex::new());
        let relay = Arc::new(relay);

        {
            let index = Arc::clone(&index);
            let relay = Arc::clone(&relay);
            thread::spawn(move || {
                resolver::refresh(index.as_ref(), relay.as_ref());
            });
        }

        let feed = LiveFeed::spawn(relay.endpoint(), Arc::clone(&index));
        Self {
            index,
            source: relay,
            ledger,
            feed: Some(feed),
        }
    }

    /// Assemble a client from explicitly-injected components, with no
    /// background tasks. Hosts that manage their own refresh cadence — and
    /// tests — build through this.
    pub fn with_components(
        index: Arc<LinkIndex>,
        source: Arc<dyn SnapshotSource + Send + Sync>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            index,
            source,
            ledger,
            feed: None,
        }
    }

    /// The resolution index this client reads and maintains.
    pub fn index(&self) -> &LinkIndex {
        &self.index
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Register the signer as a baseline member and return its address.
    ///
    /// A rejection (typically "already a member") is logged and tolerated,
    /// matching how membership is re-asserted on every wallet connect;
    /// transport and precondition failures still surface.
    pub fn join(&self) -> Result<String, Error> {
        let me = self.ledger.signer_address()?;
        match self.ledger.join().and_then(PendingWrite::wait) {
            Ok(receipt) => debug!(tx_hash = %receipt.tx_hash, "join confirmed"),
            Err(Error::Confirmation { reason }) => {
                warn!(kind = "join", %reason, "join rejected; treating signer as already a member");
            }
            Err(e) => return Err(e),
        }
        Ok(me)
    }

    /// Mint a mapping for (signer, url) and resolve the minted link id.
    ///
    /// The id is read from the write's own confirmation receipt — the fast,
    /// authoritative path — with a single snapshot reconciliation as the
    /// defensive fallback.
    pub fn post_link(&self, url: &str) -> Result<LinkId, Error> {
        let me = self.ledger.signer_address()?;
        let receipt = self.ledger.post_link(url)?.wait()?;
        resolver::resolve_posted(&self.index, self.source.as_ref(), &receipt, &me, url)
    }

    /// Click the link a subject posted for a URL. Returns the tx hash.
    pub fn click(&self, subject: &str, url: &str) -> Result<String, Error> {
        let link_id = self.resolve(subject, url)?;
        let receipt = self.ledger.click(&link_id)?.wait()?;
        Ok(receipt.tx_hash)
    }

    /// Report a subject. Returns the tx hash.
    pub fn report(&self, subject: &str) -> Result<String, Error> {
        let receipt = self.ledger.report(subject)?.wait()?;
        Ok(receipt.tx_hash)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolve the link id for a (subject, url) pair, reconciling once on a
    /// miss.
    pub fn resolve(&self, subject: &str, url: &str) -> Result<LinkId, Error> {
        resolver::resolve_or_refresh(&self.index, self.source.as_ref(), subject, url)
    }

    /// Baseline membership state of the ledger.
    pub fn baseline(&self) -> Result<Baseline, Error> {
        self.ledger.baseline()
    }

    /// Aggregated trust state for a subject.
    pub fn subject_stats(&self, subject: &str) -> Result<SubjectStats, Error> {
        Ok(SubjectStats {
            reports: self.ledger.subject_report_count(subject)?,
            penalty_bps: self.ledger.penalty_bps(subject)?,
            threshold_bps: self.ledger.current_threshold_bps(subject)?,
            trusted: self.ledger.is_trusted(subject)?,
        })
    }

    /// Click statistics for the link a subject posted for a URL.
    ///
    /// A resolution failure surfaces as an error; it is never flattened into
    /// an empty stats row, so "not yet visible" stays distinguishable from a
    /// link with zero clicks.
    pub fn link_stats(&self, subject: &str, url: &str) -> Result<LinkStats, Error> {
        let link_id = self.resolve(subject, url)?;
        let meta = self.ledger.link_meta(&link_id)?;
        Ok(LinkStats {
            link_id,
            clicks: meta.clicks,
            exists: meta.exists,
        })
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Live ledger events, as decoded from the relay feed. Returns `None`
    /// when the client was assembled without a live feed.
    pub fn events(&self) -> Option<mpsc::Receiver<LedgerEvent>> {
        self.feed.as_ref().map(LiveFeed::events)
    }

    /// Stop the live-feed subscription. Safe to skip; dropping the client
    /// leaves the feed running until process exit.
    pub fn close(mut self) {
        if let Some(feed) = self.feed.take() {
            feed.close();
        }
    }
}
