//! Best-effort full-snapshot refresh.
//!
//! The relay's snapshot endpoint returns every known mapping; merging it is
//! how the index catches up after missed live events. The refresh is
//! best-effort by contract: a transport failure leaves the index as-is
//! (usable, possibly stale) and must never halt the caller.

use tracing::{debug, warn};

use linkledger_types::{Error, LinkRecord};

use crate::index::LinkIndex;

/// A source of "all known mappings" snapshots.
///
/// The seam between the resolver and whatever transport reaches the relay;
/// tests substitute counting or canned implementations.
pub trait SnapshotSource {
    fn fetch_snapshot(&self) -> Result<Vec<LinkRecord>, Error>;
}

/// Pull one snapshot from `source` and merge it into `index`.
///
/// Safe to invoke repeatedly: a repeated merge only re-applies entries, never
/// corrupts state. On transport failure the error is contained — a structured
/// warning is emitted and 0 is returned. Returns the number of records merged.
pub fn refresh<S: SnapshotSource + ?Sized>(index: &LinkIndex, source: &S) -> usize {
    match source.fetch_snapshot() {
        Ok(records) => {
            let fetched = records.len();
            let applied = index.merge(records);
            debug!(fetched, applied, "snapshot merged into index");
            applied
        }
        Err(e) => {
            warn!(kind = "snapshot_refresh", error = %e, "snapshot refresh failed; index left as-is");
            0
        }
    }
}
