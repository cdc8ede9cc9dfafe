//! On-chain account layouts consumed by the admin tooling.
//!
//! Every account is an Anchor account: an 8-byte discriminator derived from
//! the account name, followed by Borsh-encoded fields. Layouts here must
//! match the deployed programs byte for byte; nothing outside this module
//! deserializes raw account data.

use anyhow::{Context, Result};
use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use crate::uln::UlnConfig;

/// Anchor account discriminator: first 8 bytes of sha256("account:<Name>").
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("account:{}", name).as_bytes());
    let hash = hasher.finalize();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

/// Decode an Anchor account: check the discriminator, then deserialize the
/// fields. Trailing bytes are tolerated (accounts may carry padding).
pub fn decode_account<T: BorshDeserialize>(name: &str, data: &[u8]) -> Result<T> {
    if data.len() < 8 {
        anyhow::bail!("Account data too short for {}: {} bytes", name, data.len());
    }
    if data[..8] != account_discriminator(name) {
        anyhow::bail!("Unexpected discriminator for {} account", name);
    }
    T::deserialize(&mut &data[8..]).with_context(|| format!("Failed to decode {} account", name))
}

/// Encode an Anchor account (discriminator + fields). Used by tests to
/// fabricate on-chain state.
pub fn encode_account<T: BorshSerialize>(name: &str, account: &T) -> Result<Vec<u8>> {
    let mut data = account_discriminator(name).to_vec();
    account
        .serialize(&mut data)
        .with_context(|| format!("Failed to encode {} account", name))?;
    Ok(data)
}

// ============================================================================
// GOVERNANCE PROGRAM ACCOUNTS
// ============================================================================

pub const GOVERNANCE_ACCOUNT: &str = "Governance";
pub const REMOTE_ACCOUNT: &str = "Remote";
pub const LZ_RECEIVE_TYPES_ACCOUNT: &str = "LzReceiveTypesAccounts";

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct GovernanceAccount {
    pub id: u8,
    pub admin: Pubkey,
    pub endpoint_program: Pubkey,
    pub bump: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct RemoteAccount {
    pub address: [u8; 32],
    pub bump: u8,
}

/// Stored account list for the `lz_receive_types_v2` view call plus the
/// addresses of the lookup tables consulted during execution-plan
/// resolution.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct LzReceiveTypesAccounts {
    pub accounts: Vec<Pubkey>,
    pub alts: Vec<Pubkey>,
    pub bump: u8,
}

// ============================================================================
// ENDPOINT PROGRAM ACCOUNTS
// ============================================================================

pub const SEND_LIBRARY_CONFIG_ACCOUNT: &str = "SendLibraryConfig";
pub const RECEIVE_LIBRARY_CONFIG_ACCOUNT: &str = "ReceiveLibraryConfig";
pub const NONCE_ACCOUNT: &str = "Nonce";

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct SendLibraryConfig {
    pub message_lib: Pubkey,
    pub bump: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ReceiveLibraryConfig {
    pub message_lib: Pubkey,
    pub bump: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct NonceAccount {
    pub bump: u8,
    pub outbound_nonce: u64,
    pub inbound_nonce: u64,
}

// ============================================================================
// ULN PROGRAM ACCOUNTS
// ============================================================================

pub const RECEIVE_CONFIG_ACCOUNT: &str = "ReceiveConfig";

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ReceiveConfig {
    pub bump: u8,
    pub uln: UlnConfig,
}

// ============================================================================
// OFT PROGRAM ACCOUNTS
// ============================================================================

pub const OFT_STORE_ACCOUNT: &str = "OFTStore";
pub const PEER_CONFIG_ACCOUNT: &str = "PeerConfig";
pub const PENDING_MESSAGES_ACCOUNT: &str = "PendingMessagesStore";

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct OftStoreAccount {
    pub admin: Pubkey,
    pub delegate: Pubkey,
    pub paused: bool,
    pub bump: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RateLimitState {
    pub capacity: u64,
    pub refill_per_second: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PeerConfigAccount {
    pub peer_address: [u8; 32],
    pub outbound_rate_limit: Option<RateLimitState>,
    pub bump: u8,
}
