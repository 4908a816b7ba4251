//! Shared types for the linkledger workspace.
//!
//! This crate provides the foundational data model used across the workspace,
//! breaking circular dependency chains between the resolver and transport layers:
//! - [`address`]: subject address normalization utilities
//! - [`key`]: the normalized (subject, url) lookup key
//! - [`link`]: link ids and the ledger's read-surface records
//! - [`event`]: ledger events, snapshot records and confirmation receipts
//! - [`error`]: the error taxonomy shared by every crate

pub mod address;
pub mod error;
pub mod event;
pub mod key;
pub mod link;

pub use address::{is_valid_subject, normalize_subject};
pub use error::{Error, InvalidLinkId};
pub use event::{LedgerEvent, LinkRecord, Receipt};
pub use key::NormalizedKey;
pub use link::{Baseline, LinkId, LinkMeta, SubjectStats};
