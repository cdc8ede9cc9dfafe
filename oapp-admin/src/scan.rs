//! LayerZero Scan API Client
//!
//! HTTP client for the message-status lookup used by the clear tasks.
//! One endpoint is consumed: `GET /v1/messages/tx/:hash`, returning the
//! message pathway and delivery status for a source transaction.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

pub const DEFAULT_SCAN_URL: &str = "https://scan-testnet.layerzero-api.com";

pub const STATUS_SUCCEEDED: &str = "SUCCEEDED";
pub const STATUS_WAITING: &str = "WAITING";

// ============================================================================
// API RESPONSE STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    data: Vec<ScanMessage>,
}

/// One cross-chain message as reported by the scan API.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanMessage {
    pub pathway: Pathway,
    /// Message GUID (0x-prefixed hex, 32 bytes)
    pub guid: String,
    pub source: Source,
    pub destination: Destination,
    pub verification: Verification,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pathway {
    pub src_eid: u32,
    pub dst_eid: u32,
    /// Per-pathway message nonce; the API serializes this as either a
    /// number or a decimal string
    #[serde(deserialize_with = "u64_from_number_or_string")]
    pub nonce: u64,
    pub sender: Party,
    pub receiver: Party,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Party {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub tx: SourceTx,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceTx {
    /// The message payload (0x-prefixed hex)
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Destination {
    pub status: String,
    #[serde(default)]
    pub tx: Option<DestinationTx>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationTx {
    pub tx_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Verification {
    pub sealer: StatusHolder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusHolder {
    pub status: String,
}

impl ScanMessage {
    pub fn is_delivered(&self) -> bool {
        self.destination.status == STATUS_SUCCEEDED
    }

    pub fn is_awaiting_sealer(&self) -> bool {
        self.verification.sealer.status == STATUS_WAITING
    }
}

fn u64_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(value) => value.parse().map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// SCAN CLIENT
// ============================================================================

pub struct ScanClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the message created by a source transaction. Returns None if
    /// the scan API has not indexed the transaction yet.
    pub async fn get_message_by_tx(&self, src_tx_hash: &str) -> Result<Option<ScanMessage>> {
        let url = format!("{}/v1/messages/tx/{}", self.base_url, src_tx_hash);

        let response: MessagesResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send scan API request")?
            .json()
            .await
            .context("Failed to parse scan API response")?;

        Ok(response.data.into_iter().next())
    }
}
