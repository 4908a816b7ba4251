//! Linkledger Transport Layer
//!
//! Network transport for the link ledger client, over plain HTTP + SSE.
//!
//! This crate provides:
//! - [`relay`]: snapshot client for the relay's "all known mappings" endpoint
//! - [`feed`]: persistent live-feed subscriber that keeps the resolution
//!   index warm from the relay's event stream
//! - [`ledger`]: the [`LedgerClient`] seam for ledger reads/writes and the
//!   [`PendingWrite`] confirmation handle
//! - [`gateway`]: HTTP implementation of [`LedgerClient`] against a
//!   signer-holding gateway (signing itself stays external)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use linkledger_resolver::LinkIndex;
//! use linkledger_transport::{LiveFeed, RelayClient};
//!
//! let relay = RelayClient::from_env()?;
//! let index = Arc::new(LinkIndex::new());
//!
//! // One-shot snapshot merge, then continuous background merging.
//! linkledger_resolver::refresh(&index, &relay);
//! let feed = LiveFeed::spawn(relay.endpoint(), Arc::clone(&index));
//!
//! // ... later, a clean shutdown:
//! feed.close();
//! ```

pub mod feed;
pub mod gateway;
pub mod ledger;
pub mod relay;

pub use feed::LiveFeed;
pub use gateway::HttpGateway;
pub use ledger::{LedgerClient, PendingWrite};
pub use relay::RelayClient;
