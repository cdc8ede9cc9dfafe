//! Task execution context.
//!
//! Every task receives an explicit context carrying the RPC client, the
//! program clients, and the signing keypair. Nothing is read from global
//! state after startup, which keeps the tasks testable against mock RPC
//! servers.

use anyhow::{Context, Result};
use chain_clients_svm::{keypair_from_base58, SvmClient};
use governance_sdk::GovernanceClient;
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::VersionedTransaction,
};
use std::str::FromStr;

use crate::config::Config;

/// Read a required environment variable; absence is a fatal startup error.
pub fn required_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} is not defined in the environment variables", name))
}

pub struct AdminContext {
    pub svm: SvmClient,
    pub governance: GovernanceClient,
    pub signer: Keypair,
    /// When set, reconciliation performs all reads and comparisons but
    /// sends no transactions.
    pub validate_only: bool,
}

impl AdminContext {
    pub fn new(
        svm: SvmClient,
        governance: GovernanceClient,
        signer: Keypair,
        validate_only: bool,
    ) -> Self {
        Self {
            svm,
            governance,
            signer,
            validate_only,
        }
    }

    /// Build the context from the environment: SOLANA_PRIVATE_KEY,
    /// GOVERNANCE_PROGRAM_ID, and RPC_URL_SOLANA (the latter falling back
    /// to the configured RPC URL).
    pub fn from_env(config: &Config, validate_only: bool) -> Result<Self> {
        let signer = keypair_from_base58(&required_env("SOLANA_PRIVATE_KEY")?)?;

        let governance_program = Pubkey::from_str(&required_env("GOVERNANCE_PROGRAM_ID")?)
            .map_err(|_| anyhow::anyhow!("Invalid GOVERNANCE_PROGRAM_ID (expected base58)"))?;

        let rpc_url = match std::env::var("RPC_URL_SOLANA") {
            Ok(url) => url,
            Err(_) => config
                .solana
                .rpc_url
                .clone()
                .context("RPC_URL_SOLANA is not set and no rpc_url is configured")?,
        };

        let endpoint_program = Pubkey::from_str(&config.solana.endpoint_program_id)
            .map_err(|_| anyhow::anyhow!("Invalid endpoint program id"))?;
        let uln_program = Pubkey::from_str(&config.solana.uln_program_id)
            .map_err(|_| anyhow::anyhow!("Invalid ULN program id"))?;

        Ok(Self::new(
            SvmClient::new(&rpc_url)?,
            GovernanceClient::new(governance_program, endpoint_program, uln_program),
            signer,
            validate_only,
        ))
    }

    pub fn payer(&self) -> Pubkey {
        self.signer.pubkey()
    }

    /// Sign and submit instructions as one v0 transaction, waiting for
    /// confirmation. Returns the transaction signature.
    pub async fn send_instructions(&self, instructions: &[Instruction]) -> Result<String> {
        self.send_instructions_with_alts(instructions, &[]).await
    }

    pub async fn send_instructions_with_alts(
        &self,
        instructions: &[Instruction],
        tables: &[AddressLookupTableAccount],
    ) -> Result<String> {
        let tx = self.build_transaction(instructions, tables).await?;
        self.svm.send_and_confirm(&tx).await
    }

    pub async fn build_transaction(
        &self,
        instructions: &[Instruction],
        tables: &[AddressLookupTableAccount],
    ) -> Result<VersionedTransaction> {
        let blockhash = self.svm.get_latest_blockhash().await?;
        let message = v0::Message::try_compile(&self.payer(), instructions, tables, blockhash)
            .context("Failed to compile transaction message")?;
        VersionedTransaction::try_new(VersionedMessage::V0(message), &[&self.signer])
            .context("Failed to sign transaction")
    }
}
