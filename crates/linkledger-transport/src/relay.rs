//! Snapshot client for the relay's "all known mappings" endpoint.
//!
//! The relay mirrors the ledger's event log for faster querying; its snapshot
//! endpoint returns every (subject, url, linkId) record known so far as one
//! JSON document. This client is deliberately thin: fetch, decode, hand the
//! records to the resolver.
//!
//! ## Configuration
//!
//! - `LINKLEDGER_RELAY_ENDPOINT` - relay base URL (required by [`RelayClient::from_env`])
//! - `LINKLEDGER_HTTP_TIMEOUT_SECS` - request timeout (default 30)
//! - `LINKLEDGER_HTTP_CONNECT_TIMEOUT_SECS` - connect timeout (default 10)

use std::time::Duration;

use serde::Deserialize;

use linkledger_resolver::SnapshotSource;
use linkledger_types::{Error, LinkRecord};

/// Blocking HTTP client for the relay snapshot endpoint.
#[derive(Clone)]
pub struct RelayClient {
    endpoint: String,
    agent: ureq::Agent,
}

/// Wire shape of `GET {relay}/links`.
#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    #[serde(default)]
    links: Vec<LinkRecord>,
}

impl RelayClient {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    pub(crate) fn default_timeouts() -> (Duration, Duration) {
        let timeout_secs = std::env::var("LINKLEDGER_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);
        let connect_secs = std::env::var("LINKLEDGER_HTTP_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_CONNECT_TIMEOUT_SECS);
        (
            Duration::from_secs(timeout_secs),
            Duration::from_secs(connect_secs),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    /// Create a client with a custom endpoint.
    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, timeout, connect_timeout)
    }

    /// Create a client from `LINKLEDGER_RELAY_ENDPOINT`.
    ///
    /// Fails with a precondition error before any network interaction if the
    /// variable is unset or blank.
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var("LINKLEDGER_RELAY_ENDPOINT") {
            Ok(value) if !value.trim().is_empty() => Ok(Self::new(value.trim())),
            _ => Err(Error::precondition(
                "LINKLEDGER_RELAY_ENDPOINT is not configured",
            )),
        }
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
        }
    }

    /// Get the relay base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the full set of known mappings.
    pub fn fetch_links(&self) -> Result<Vec<LinkRecord>, Error> {
        let url = format!("{}/links", self.endpoint);
        let snapshot: SnapshotResponse = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| Error::transport("relay snapshot request", e))?
            .into_json()
            .map_err(|e| Error::transport("relay snapshot decode", e))?;
        Ok(snapshot.links)
    }
}

impl SnapshotSource for RelayClient {
    fn fetch_snapshot(&self) -> Result<Vec<LinkRecord>, Error> {
        self.fetch_links()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_response_decodes() {
        let json = format!(
            r#"{{"links":[{{"subject":"0xabc","url":"http://x.test","linkId":"0x{}"}}]}}"#,
            "11".repeat(32)
        );
        let snapshot: SnapshotResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.links.len(), 1);
        assert_eq!(snapshot.links[0].subject, "0xabc");
    }

    #[test]
    fn test_snapshot_response_tolerates_missing_links() {
        let snapshot: SnapshotResponse = serde_json::from_str("{}").unwrap();
        assert!(snapshot.links.is_empty());
    }

    #[test]
    fn test_endpoint_is_trimmed() {
        let client = RelayClient::with_timeouts(
            "http://relay.test/",
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        assert_eq!(client.endpoint(), "http://relay.test");
    }
}
