//! Link identifiers and the ledger's read-surface records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidLinkId;

/// Opaque identifier minted exactly once per (subject, url) pair.
///
/// Rendered as `0x` followed by 64 hex characters (a 32-byte token).
/// Immutable once minted; the handle for every subsequent operation that
/// references the pair (clicks, metadata lookups). Construction validates
/// the fixed format and lower-cases the hex so ids compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkId(String);

impl LinkId {
    /// Number of raw bytes in a link id.
    pub const BYTE_LEN: usize = 32;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LinkId {
    type Error = InvalidLinkId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for LinkId {
    type Err = InvalidLinkId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(hex_part).map_err(|_| InvalidLinkId(s.to_string()))?;
        if bytes.len() != Self::BYTE_LEN {
            return Err(InvalidLinkId(s.to_string()));
        }
        Ok(Self(format!("0x{}", hex_part.to_lowercase())))
    }
}

impl From<LinkId> for String {
    fn from(id: LinkId) -> Self {
        id.0
    }
}

impl AsRef<str> for LinkId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata the ledger holds for a minted link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMeta {
    pub subject: String,
    pub url: String,
    pub clicks: u64,
    pub exists: bool,
}

/// Aggregated trust state for a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub reports: u64,
    pub penalty_bps: u16,
    pub threshold_bps: u16,
    pub trusted: bool,
}

/// Baseline membership state of the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub members: u64,
    pub frozen: bool,
}
