//! Solana SVM RPC Client Module
//!
//! This module provides a minimal client for interacting with Solana via
//! JSON-RPC. It supports fetching raw account data, querying slots and
//! blockhashes, simulating transactions (including reading view-call return
//! data), submitting versioned transactions, and polling for confirmation.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use solana_sdk::{
    address_lookup_table::state::AddressLookupTable, address_lookup_table::AddressLookupTableAccount,
    hash::Hash, pubkey::Pubkey, signature::Keypair, transaction::VersionedTransaction,
};
use std::str::FromStr;
use std::time::Duration;

/// Attempts made while polling for transaction confirmation.
const CONFIRM_MAX_ATTEMPTS: u32 = 30;

/// Delay between confirmation polls.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ============================================================================
// JSON-RPC TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    message: String,
}

/// Context-wrapped RPC result (`{"context": ..., "value": ...}`).
#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct RpcAccount {
    data: (String, String),
}

#[derive(Debug, Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
struct SimulationValue {
    err: Option<serde_json::Value>,
    logs: Option<Vec<String>>,
    #[serde(rename = "returnData")]
    return_data: Option<ReturnData>,
}

#[derive(Debug, Deserialize)]
struct ReturnData {
    data: (String, String),
}

#[derive(Debug, Deserialize)]
struct SignatureStatus {
    err: Option<serde_json::Value>,
    #[serde(rename = "confirmationStatus")]
    confirmation_status: Option<String>,
}

/// Outcome of a transaction simulation.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Execution error reported by the runtime, if any.
    pub err: Option<serde_json::Value>,
    /// Program log lines emitted during simulation.
    pub logs: Vec<String>,
    /// Decoded return data of the outermost instruction, if the program
    /// set any.
    pub return_data: Option<Vec<u8>>,
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct SvmClient {
    client: Client,
    rpc_url: String,
}

impl SvmClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to call {}", method))?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = response.error {
            return Err(anyhow::anyhow!("SVM RPC error: {}", error.message));
        }

        response
            .result
            .with_context(|| format!("Missing result in {} response", method))
    }

    /// Read raw account data (base64-decoded) for any Solana account.
    /// Returns None if the account doesn't exist.
    pub async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>> {
        let params = serde_json::json!([
            pubkey.to_string(),
            { "encoding": "base64", "commitment": "confirmed" }
        ]);

        let envelope: RpcEnvelope<Option<RpcAccount>> =
            self.rpc_call("getAccountInfo", params).await?;

        let Some(account) = envelope.value else {
            return Ok(None);
        };

        let data = STANDARD
            .decode(&account.data.0)
            .context("Failed to decode base64 account data")?;
        Ok(Some(data))
    }

    /// Check whether an account exists without decoding its contents.
    pub async fn account_exists(&self, pubkey: &Pubkey) -> Result<bool> {
        Ok(self.get_account_data(pubkey).await?.is_some())
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash> {
        let params = serde_json::json!([{ "commitment": "confirmed" }]);
        let envelope: RpcEnvelope<BlockhashValue> =
            self.rpc_call("getLatestBlockhash", params).await?;

        Hash::from_str(&envelope.value.blockhash).context("Invalid blockhash in RPC response")
    }

    /// Current slot, used when deriving a new address lookup table.
    pub async fn get_slot(&self) -> Result<u64> {
        let params = serde_json::json!([{ "commitment": "confirmed" }]);
        self.rpc_call("getSlot", params).await
    }

    /// Simulate a versioned transaction and return the runtime outcome,
    /// including any return data set by the invoked program.
    pub async fn simulate_transaction(
        &self,
        tx: &VersionedTransaction,
        sig_verify: bool,
    ) -> Result<SimulationResult> {
        let serialized = bincode::serialize(tx).context("Failed to serialize transaction")?;
        let params = serde_json::json!([
            STANDARD.encode(serialized),
            { "encoding": "base64", "sigVerify": sig_verify, "commitment": "confirmed" }
        ]);

        let envelope: RpcEnvelope<SimulationValue> =
            self.rpc_call("simulateTransaction", params).await?;

        let return_data = match envelope.value.return_data {
            Some(data) => Some(
                STANDARD
                    .decode(&data.data.0)
                    .context("Failed to decode base64 return data")?,
            ),
            None => None,
        };

        Ok(SimulationResult {
            err: envelope.value.err,
            logs: envelope.value.logs.unwrap_or_default(),
            return_data,
        })
    }

    /// Submit a signed versioned transaction. Returns the base58 signature.
    pub async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<String> {
        let serialized = bincode::serialize(tx).context("Failed to serialize transaction")?;
        let params = serde_json::json!([
            STANDARD.encode(serialized),
            { "encoding": "base64", "skipPreflight": false }
        ]);

        self.rpc_call("sendTransaction", params).await
    }

    /// Poll signature statuses until the transaction is confirmed or the
    /// attempt budget is exhausted.
    pub async fn confirm_transaction(&self, signature: &str) -> Result<()> {
        for _ in 0..CONFIRM_MAX_ATTEMPTS {
            let params = serde_json::json!([
                [signature],
                { "searchTransactionHistory": true }
            ]);

            let envelope: RpcEnvelope<Vec<Option<SignatureStatus>>> =
                self.rpc_call("getSignatureStatuses", params).await?;

            if let Some(Some(status)) = envelope.value.into_iter().next() {
                if let Some(err) = status.err {
                    return Err(anyhow::anyhow!("Transaction {} failed: {}", signature, err));
                }
                match status.confirmation_status.as_deref() {
                    Some("confirmed") | Some("finalized") => return Ok(()),
                    _ => {}
                }
            }

            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }

        Err(anyhow::anyhow!(
            "Timed out waiting for confirmation of {}",
            signature
        ))
    }

    /// Submit a transaction and wait for confirmation.
    pub async fn send_and_confirm(&self, tx: &VersionedTransaction) -> Result<String> {
        let signature = self.send_transaction(tx).await?;
        tracing::debug!(signature = %signature, "transaction submitted");
        self.confirm_transaction(&signature).await?;
        Ok(signature)
    }

    /// Fetch and parse an on-chain address lookup table.
    /// A missing table is a hard error: callers reference tables by address
    /// and cannot proceed with a partial set.
    pub async fn get_address_lookup_table(
        &self,
        address: &Pubkey,
    ) -> Result<AddressLookupTableAccount> {
        let data = self
            .get_account_data(address)
            .await?
            .with_context(|| format!("Lookup table not found: {}", address))?;

        let table = AddressLookupTable::deserialize(&data)
            .with_context(|| format!("Failed to parse lookup table {}", address))?;

        Ok(AddressLookupTableAccount {
            key: *address,
            addresses: table.addresses.to_vec(),
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Parse a base58-encoded 64-byte secret key into a signing keypair.
pub fn keypair_from_base58(secret: &str) -> Result<Keypair> {
    let bytes = bs58::decode(secret)
        .into_vec()
        .context("Invalid base58 private key")?;
    Keypair::from_bytes(&bytes).map_err(|e| anyhow::anyhow!("Invalid keypair bytes: {}", e))
}

pub fn pubkey_to_hex(pubkey: &Pubkey) -> String {
    format!("0x{}", hex::encode(pubkey.to_bytes()))
}
