//! HTTP implementation of [`LedgerClient`] against a signer gateway.
//!
//! The gateway holds the signing key and submits transactions to the ledger
//! on this client's behalf; cryptographic signing never happens here. Writes
//! are two-phase: `POST /tx` submits and returns a transaction hash, then the
//! receipt endpoint is polled at a fixed interval until the ledger confirms
//! or rejects the write.
//!
//! ## Configuration
//!
//! - `LINKLEDGER_GATEWAY_ENDPOINT` - gateway base URL (required)
//! - `LINKLEDGER_CONFIRM_TIMEOUT_SECS` - total confirmation wait (default 90)

use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use linkledger_types::{normalize_subject, Baseline, Error, LedgerEvent, LinkId, LinkMeta, Receipt};

use crate::ledger::{LedgerClient, PendingWrite};
use crate::relay::RelayClient;

/// Interval between receipt polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Default total confirmation wait in seconds (can be overridden by env).
const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 90;

/// Blocking HTTP client for the signer gateway.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    endpoint: String,
    agent: ureq::Agent,
    confirm_timeout: Duration,
}

/// Wire shape of `POST {gateway}/tx`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    tx_hash: String,
}

/// Wire shape of `GET {gateway}/tx/{hash}/receipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptStatus {
    status: String,
    #[serde(default)]
    events: Vec<LedgerEvent>,
    #[serde(default)]
    reason: Option<String>,
}

/// Wire shape of `GET {gateway}/signer`.
#[derive(Debug, Deserialize)]
struct SignerResponse {
    address: Option<String>,
}

impl HttpGateway {
    /// Create a gateway client with a custom endpoint.
    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = RelayClient::default_timeouts();
        let confirm_secs = std::env::var("LINKLEDGER_CONFIRM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CONFIRM_TIMEOUT_SECS);
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .timeout_connect(connect_timeout)
                .build(),
            confirm_timeout: Duration::from_secs(confirm_secs),
        }
    }

    /// Create a gateway client from `LINKLEDGER_GATEWAY_ENDPOINT`.
    ///
    /// An unset or blank variable means no signer is reachable: fails with a
    /// precondition error before any network interaction.
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var("LINKLEDGER_GATEWAY_ENDPOINT") {
            Ok(value) if !value.trim().is_empty() => Ok(Self::new(value.trim())),
            _ => Err(Error::precondition(
                "LINKLEDGER_GATEWAY_ENDPOINT is not configured (no signer gateway)",
            )),
        }
    }

    /// Get the gateway base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        op: &'static str,
    ) -> Result<T, Error> {
        self.agent
            .get(&format!("{}{}", self.endpoint, path))
            .call()
            .map_err(|e| Error::transport(op, e))?
            .into_json()
            .map_err(|e| Error::transport(op, e))
    }

    /// Submit one transaction and hand back its confirmation handle.
    fn submit(&self, body: Value, op: &'static str) -> Result<PendingWrite, Error> {
        let submitted: SubmitResponse = self
            .agent
            .post(&format!("{}/tx", self.endpoint))
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| Error::transport(op, e))?
            .into_json()
            .map_err(|e| Error::transport(op, e))?;

        debug!(op, tx_hash = %submitted.tx_hash, "transaction submitted");

        let gateway = self.clone();
        let tx_hash = submitted.tx_hash.clone();
        Ok(PendingWrite::new(submitted.tx_hash, move || {
            gateway.wait_for_receipt(&tx_hash)
        }))
    }

    /// Poll the receipt endpoint until the write confirms, is rejected, or
    /// the confirmation window elapses.
    fn wait_for_receipt(&self, tx_hash: &str) -> Result<Receipt, Error> {
        let path = format!("/tx/{}/receipt", tx_hash);
        let deadline = Instant::now() + self.confirm_timeout;
        loop {
            let status: ReceiptStatus = self.get_json(&path, "receipt poll")?;
            match status.status.as_str() {
                "confirmed" => {
                    return Ok(Receipt {
                        tx_hash: tx_hash.to_string(),
                        events: status.events,
                    });
                }
                "rejected" => {
                    return Err(Error::confirmation(
                        status.reason.as_deref().unwrap_or("rejected by the ledger"),
                    ));
                }
                _ => {
                    if Instant::now() >= deadline {
                        return Err(Error::confirmation(format!(
                            "{} still unconfirmed after {}s",
                            tx_hash,
                            self.confirm_timeout.as_secs()
                        )));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }
}

impl LedgerClient for HttpGateway {
    fn signer_address(&self) -> Result<String, Error> {
        let signer: SignerResponse = self.get_json("/signer", "signer lookup")?;
        signer
            .address
            .ok_or_else(|| Error::precondition("gateway has no active signer"))
    }

    fn join(&self) -> Result<PendingWrite, Error> {
        self.submit(json!({ "op": "join" }), "join submit")
    }

    fn post_link(&self, url: &str) -> Result<PendingWrite, Error> {
        self.submit(json!({ "op": "postLink", "url": url }), "postLink submit")
    }

    fn click(&self, link_id: &LinkId) -> Result<PendingWrite, Error> {
        self.submit(
            json!({ "op": "click", "linkId": link_id.as_str() }),
            "click submit",
        )
    }

    fn report(&self, subject: &str) -> Result<PendingWrite, Error> {
        self.submit(
            json!({ "op": "report", "subject": normalize_subject(subject) }),
            "report submit",
        )
    }

    fn is_trusted(&self, subject: &str) -> Result<bool, Error> {
        #[derive(Deserialize)]
        struct Trusted {
            trusted: bool,
        }
        let path = format!("/subjects/{}/trusted", normalize_subject(subject));
        Ok(self.get_json::<Trusted>(&path, "trust query")?.trusted)
    }

    fn current_threshold_bps(&self, subject: &str) -> Result<u16, Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Threshold {
            threshold_bps: u16,
        }
        let path = format!("/subjects/{}/threshold", normalize_subject(subject));
        Ok(self
            .get_json::<Threshold>(&path, "threshold query")?
            .threshold_bps)
    }

    fn penalty_bps(&self, subject: &str) -> Result<u16, Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Penalty {
            penalty_bps: u16,
        }
        let path = format!("/subjects/{}/penalty", normalize_subject(subject));
        Ok(self.get_json::<Penalty>(&path, "penalty query")?.penalty_bps)
    }

    fn subject_report_count(&self, subject: &str) -> Result<u64, Error> {
        #[derive(Deserialize)]
        struct Reports {
            reports: u64,
        }
        let path = format!("/subjects/{}/reports", normalize_subject(subject));
        Ok(self.get_json::<Reports>(&path, "report-count query")?.reports)
    }

    fn baseline(&self) -> Result<Baseline, Error> {
        self.get_json("/baseline", "baseline query")
    }

    fn link_meta(&self, link_id: &LinkId) -> Result<LinkMeta, Error> {
        let path = format!("/links/{}", link_id.as_str());
        self.get_json(&path, "link metadata query")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_status_decodes_all_phases() {
        let pending: ReceiptStatus = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert_eq!(pending.status, "pending");
        assert!(pending.events.is_empty());

        let confirmed: ReceiptStatus = serde_json::from_str(&format!(
            r#"{{"status":"confirmed","events":[{{"type":"LinkPosted","linkId":"0x{}","subject":"0xabc","url":"http://x.test"}}]}}"#,
            "11".repeat(32)
        ))
        .unwrap();
        assert_eq!(confirmed.status, "confirmed");
        assert_eq!(confirmed.events.len(), 1);

        let rejected: ReceiptStatus =
            serde_json::from_str(r#"{"status":"rejected","reason":"not a member"}"#).unwrap();
        assert_eq!(rejected.reason.as_deref(), Some("not a member"));
    }

    #[test]
    fn test_missing_endpoint_is_a_precondition_failure() {
        std::env::remove_var("LINKLEDGER_GATEWAY_ENDPOINT");
        assert!(matches!(
            HttpGateway::from_env().unwrap_err(),
            Error::Precondition { .. }
        ));
    }

    #[test]
    fn test_endpoint_is_trimmed() {
        let gateway = HttpGateway::new("http://gateway.test/");
        assert_eq!(gateway.endpoint(), "http://gateway.test");
    }
}
