//! EVM-side tasks: deploying the governance controller OApp and
//! administering the OFT adapter's rate limits.
//!
//! Transactions are legacy (EIP-155) signed with the deployer key and
//! submitted as raw transactions; receipts are polled until mined.

use anyhow::{Context, Result};
use chain_clients_evm::{abi, parse_address, tx, EvmClient, TxReceipt};
use governance_sdk::util::normalize_peer;
use k256::ecdsa::SigningKey;
use tracing::info;

use crate::context::required_env;

/// Connection and signer for the EVM tasks, built from RPC_URL_EVM and
/// EVM_PRIVATE_KEY.
pub struct EvmTaskContext {
    pub client: EvmClient,
    pub key: SigningKey,
}

impl EvmTaskContext {
    pub fn from_env() -> Result<Self> {
        let client = EvmClient::new(&required_env("RPC_URL_EVM")?)?;
        let key = tx::signing_key_from_hex(&required_env("EVM_PRIVATE_KEY")?)?;
        Ok(Self { client, key })
    }

    pub fn sender(&self) -> [u8; 20] {
        tx::address_from_key(&self.key)
    }

    async fn send(&self, to: Option<[u8; 20]>, data: Vec<u8>) -> Result<(String, TxReceipt)> {
        let from = self.sender();
        let nonce = self.client.transaction_count(&from).await?;
        let gas_price = self.client.gas_price().await?;
        let gas_limit = self.client.estimate_gas(&from, to.as_ref(), &data, 0).await?;
        let chain_id = self.client.chain_id().await?;

        let transaction = tx::LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value: 0,
            data,
            chain_id,
        };

        let raw = transaction.sign(&self.key)?;
        let tx_hash = self.client.send_raw_transaction(&raw).await?;
        info!(tx_hash = %tx_hash, "transaction submitted");
        let receipt = self.client.wait_for_receipt(&tx_hash).await?;
        Ok((tx_hash, receipt))
    }
}

// ============================================================================
// CONTROLLER DEPLOYMENT
// ============================================================================

/// Constructor arguments for the governance controller, read from the
/// environment at startup. Every variable is required.
#[derive(Debug, Clone)]
pub struct DeployParams {
    pub endpoint: [u8; 20],
    pub add_initial_valid_target: bool,
    pub initial_valid_target_src_eid: u32,
    pub initial_valid_target_origin_caller: [u8; 32],
    pub initial_valid_target_governed_contract: [u8; 20],
}

impl DeployParams {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: parse_address(&required_env("EVM_ENDPOINT_ADDRESS")?)
                .context("Invalid EVM_ENDPOINT_ADDRESS")?,
            add_initial_valid_target: required_env("EVM_ADD_INITIAL_VALID_TARGET")? == "true",
            initial_valid_target_src_eid: required_env("EVM_INITIAL_VALID_TARGET_SRC_EID")?
                .parse()
                .context("Invalid EVM_INITIAL_VALID_TARGET_SRC_EID")?,
            initial_valid_target_origin_caller: normalize_peer(&required_env(
                "EVM_INITIAL_VALID_TARGET_ORIGIN_CALLER",
            )?)
            .context("Invalid EVM_INITIAL_VALID_TARGET_ORIGIN_CALLER")?,
            initial_valid_target_governed_contract: parse_address(&required_env(
                "EVM_INITIAL_VALID_TARGET_GOVERNED_CONTRACT",
            )?)
            .context("Invalid EVM_INITIAL_VALID_TARGET_GOVERNED_CONTRACT")?,
        })
    }
}

/// Deploy the GovernanceControllerOApp contract. The compiled bytecode is
/// read from `artifact_path` (hex, optionally 0x-prefixed); constructor
/// arguments come from the environment and are ABI-appended.
pub async fn deploy_controller(ctx: &EvmTaskContext, artifact_path: &str) -> Result<()> {
    let params = DeployParams::from_env()?;
    let owner = ctx.sender();

    info!(
        add_initial_valid_target = params.add_initial_valid_target,
        src_eid = params.initial_valid_target_src_eid,
        "deploying governance controller"
    );

    let artifact = std::fs::read_to_string(artifact_path)
        .with_context(|| format!("Failed to read bytecode artifact {}", artifact_path))?;
    let bytecode = chain_clients_evm::parse_bytes(&format!(
        "0x{}",
        artifact.trim().trim_start_matches("0x")
    ))
    .context("Invalid bytecode artifact")?;

    let mut data = bytecode;
    for word in [
        abi::encode_address(&params.endpoint),
        abi::encode_address(&owner),
        abi::encode_bool(params.add_initial_valid_target),
        abi::encode_u256(params.initial_valid_target_src_eid as u128),
        abi::encode_bytes32(&params.initial_valid_target_origin_caller),
        abi::encode_address(&params.initial_valid_target_governed_contract),
    ] {
        data.extend_from_slice(&word);
    }

    let (_, receipt) = ctx.send(None, data).await?;
    info!(
        contract = receipt.contract_address.as_deref().unwrap_or("unknown"),
        "governance controller deployed"
    );
    Ok(())
}

// ============================================================================
// RATE LIMITS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDirection {
    Inbound,
    Outbound,
}

/// One rate limit entry: (eid, limit, window seconds).
pub type RateLimitEntry = (u32, u128, u64);

/// Set a rate limit on the OFT adapter via
/// `setRateLimits((uint32,uint256,uint256)[],(uint32,uint256,uint256)[])`.
/// The untouched direction is passed as an empty array.
pub async fn set_rate_limit(
    ctx: &EvmTaskContext,
    adapter: [u8; 20],
    direction: RateLimitDirection,
    eid: u32,
    limit: u128,
    window: u64,
) -> Result<()> {
    let entry = vec![(eid, limit, window)];
    let (inbound, outbound) = match direction {
        RateLimitDirection::Inbound => (entry, vec![]),
        RateLimitDirection::Outbound => (vec![], entry),
    };

    let data = encode_set_rate_limits(&inbound, &outbound);
    let (tx_hash, _) = ctx.send(Some(adapter), data).await?;
    info!(eid, tx_hash = %tx_hash, "rate limit set");
    Ok(())
}

fn encode_set_rate_limits(inbound: &[RateLimitEntry], outbound: &[RateLimitEntry]) -> Vec<u8> {
    let selector =
        abi::selector("setRateLimits((uint32,uint256,uint256)[],(uint32,uint256,uint256)[])");

    // Head: two offsets into the tail section; each array section is a
    // length word plus three static words per entry.
    let inbound_offset = 64u128;
    let outbound_offset = inbound_offset + 32 + inbound.len() as u128 * 96;

    let mut words = vec![
        abi::encode_u256(inbound_offset),
        abi::encode_u256(outbound_offset),
    ];
    for entries in [inbound, outbound] {
        words.push(abi::encode_u256(entries.len() as u128));
        for (eid, limit, window) in entries {
            words.push(abi::encode_u256(*eid as u128));
            words.push(abi::encode_u256(*limit));
            words.push(abi::encode_u256(*window as u128));
        }
    }

    abi::encode_call(selector, &words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_encoding_layout() {
        let data = encode_set_rate_limits(&[(40106, 1_000, 60)], &[]);

        // selector + head (2) + inbound len + 3 entry words + outbound len
        assert_eq!(data.len(), 4 + 32 * 7);
        // inbound offset points past the two head words
        assert_eq!(data[4 + 31], 64);
        // outbound offset accounts for the inbound section
        assert_eq!(data[4 + 63], 64 + 32 + 96);
        // inbound length 1, outbound length 0
        assert_eq!(data[4 + 95], 1);
        assert_eq!(data[4 + 32 * 6 + 31], 0);
    }

    #[test]
    fn empty_rate_limits_still_encode_offsets() {
        let data = encode_set_rate_limits(&[], &[]);
        assert_eq!(data.len(), 4 + 32 * 4);
        assert_eq!(data[4 + 63], 64 + 32);
    }
}
