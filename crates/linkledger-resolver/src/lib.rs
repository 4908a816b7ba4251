//! Link Resolver
//!
//! Identifier resolution for the link ledger: the local index mapping
//! normalized (subject, url) keys to ledger-minted link ids, and the three
//! paths that keep a lookup correct while the ledger is the sole source of
//! truth:
//!
//! - [`index`]: the in-memory resolution index (the only shared mutable state)
//! - [`snapshot`]: best-effort full-snapshot refresh through the
//!   [`SnapshotSource`] seam
//! - [`receipt`]: fast-path resolution from a write's own confirmation receipt
//! - [`reconcile`]: single-refresh fallback for keys missing from the index
//!
//! # Resolution model
//!
//! The ledger mints at most one link id per (subject, url) pair and never
//! reissues a different one, so the index is append-only: entries are merged
//! in from snapshots, live events and confirmation receipts, and once present
//! are permanently valid. A lookup that misses is never treated as proof of
//! absence — only as "not yet observed" — and after one snapshot refresh the
//! miss is surfaced to the caller to decide on.

pub mod index;
pub mod receipt;
pub mod reconcile;
pub mod snapshot;

pub use index::LinkIndex;
pub use receipt::resolve_posted;
pub use reconcile::resolve_or_refresh;
pub use snapshot::{refresh, SnapshotSource};
