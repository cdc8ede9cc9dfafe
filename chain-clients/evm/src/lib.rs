//! EVM JSON-RPC Client Module
//!
//! This module provides a minimal client for interacting with EVM chains via
//! JSON-RPC. It supports read-only contract calls, nonce/gas queries, raw
//! transaction submission, and receipt polling. Transaction signing and ABI
//! helpers live in the `tx` and `abi` submodules.

pub mod abi;
pub mod tx;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Attempts made while polling for a transaction receipt.
const RECEIPT_MAX_ATTEMPTS: u32 = 30;

/// Delay between receipt polls.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

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

/// Transaction receipt fields consumed by the admin tasks.
#[derive(Debug, Clone, Deserialize)]
pub struct TxReceipt {
    /// Execution status as a hex quantity ("0x1" on success).
    pub status: Option<String>,
    /// Address of the deployed contract, for contract-creation transactions.
    #[serde(rename = "contractAddress")]
    pub contract_address: Option<String>,
    #[serde(rename = "blockNumber")]
    pub block_number: Option<String>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        matches!(self.status.as_deref(), Some("0x1"))
    }
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct EvmClient {
    client: Client,
    rpc_url: String,
}

impl EvmClient {
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
            return Err(anyhow::anyhow!("EVM RPC error: {}", error.message));
        }

        response
            .result
            .with_context(|| format!("Missing result in {} response", method))
    }

    /// Like `rpc_call`, but for methods whose result is legitimately null
    /// (e.g. a receipt lookup for a pending transaction).
    async fn rpc_call_nullable(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response: JsonRpcResponse<serde_json::Value> = self
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
            return Err(anyhow::anyhow!("EVM RPC error: {}", error.message));
        }

        Ok(response.result.unwrap_or(serde_json::Value::Null))
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let result: String = self.rpc_call("eth_chainId", serde_json::json!([])).await?;
        parse_quantity(&result).map(|v| v as u64)
    }

    /// Pending-state nonce for the given account.
    pub async fn transaction_count(&self, address: &[u8; 20]) -> Result<u64> {
        let params = serde_json::json!([format_address(address), "pending"]);
        let result: String = self.rpc_call("eth_getTransactionCount", params).await?;
        parse_quantity(&result).map(|v| v as u64)
    }

    pub async fn gas_price(&self) -> Result<u128> {
        let result: String = self.rpc_call("eth_gasPrice", serde_json::json!([])).await?;
        parse_quantity(&result)
    }

    /// Read-only contract call against the latest block.
    pub async fn call(&self, to: &[u8; 20], data: &[u8]) -> Result<Vec<u8>> {
        let params = serde_json::json!([
            { "to": format_address(to), "data": format_bytes(data) },
            "latest"
        ]);
        let result: String = self.rpc_call("eth_call", params).await?;
        parse_bytes(&result)
    }

    pub async fn estimate_gas(
        &self,
        from: &[u8; 20],
        to: Option<&[u8; 20]>,
        data: &[u8],
        value: u128,
    ) -> Result<u64> {
        let mut call = serde_json::json!({
            "from": format_address(from),
            "data": format_bytes(data),
            "value": format!("0x{:x}", value),
        });
        if let Some(to) = to {
            call["to"] = serde_json::Value::String(format_address(to));
        }
        let result: String = self.rpc_call("eth_estimateGas", serde_json::json!([call])).await?;
        parse_quantity(&result).map(|v| v as u64)
    }

    /// Submit a signed raw transaction. Returns the transaction hash.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String> {
        let params = serde_json::json!([format_bytes(raw)]);
        self.rpc_call("eth_sendRawTransaction", params).await
    }

    pub async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>> {
        let params = serde_json::json!([tx_hash]);
        let result = self
            .rpc_call_nullable("eth_getTransactionReceipt", params)
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .context("Failed to parse transaction receipt")
    }

    /// Poll for a receipt until the transaction is mined or the attempt
    /// budget is exhausted. Fails if the transaction reverted.
    pub async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt> {
        for attempt in 0..RECEIPT_MAX_ATTEMPTS {
            tracing::debug!(tx_hash, attempt, "polling for receipt");
            if let Some(receipt) = self.get_transaction_receipt(tx_hash).await? {
                if !receipt.succeeded() {
                    return Err(anyhow::anyhow!("Transaction {} reverted", tx_hash));
                }
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }

        Err(anyhow::anyhow!(
            "Timed out waiting for receipt of {}",
            tx_hash
        ))
    }
}

// ============================================================================
// HEX HELPERS
// ============================================================================

/// Parse a 0x-prefixed hex quantity.
pub fn parse_quantity(value: &str) -> Result<u128> {
    let stripped = value
        .strip_prefix("0x")
        .context("Quantity must be 0x-prefixed")?;
    u128::from_str_radix(stripped, 16).context("Invalid hex quantity")
}

/// Parse 0x-prefixed hex data into raw bytes.
pub fn parse_bytes(value: &str) -> Result<Vec<u8>> {
    let stripped = value
        .strip_prefix("0x")
        .context("Data must be 0x-prefixed")?;
    hex::decode(stripped).context("Invalid hex data")
}

/// Parse a 0x-prefixed 20-byte address.
pub fn parse_address(value: &str) -> Result<[u8; 20]> {
    let bytes = parse_bytes(value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("Invalid address length: {} bytes", bytes.len()))
}

pub fn format_address(address: &[u8; 20]) -> String {
    format!("0x{}", hex::encode(address))
}

pub fn format_bytes(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}
