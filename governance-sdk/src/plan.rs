//! Execution-plan wire codec and account resolution.
//!
//! The governance program's view calls return a versioned binary buffer
//! describing the exact ordered account list the `lz_receive` instruction
//! must be built with. Account positions are semantically meaningful and
//! must never be reordered; entries may point into address lookup tables to
//! keep the final transaction under the per-transaction account limit.

use anyhow::{Context, Result};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount, instruction::AccountMeta, pubkey::Pubkey,
};

/// The plan version this client understands.
pub const SUPPORTED_PLAN_VERSION: u8 = 2;

/// Parameters of the `lz_receive` instruction family, assembled from an
/// inbound packet.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct LzReceiveParams {
    pub src_eid: u32,
    pub sender: [u8; 32],
    pub nonce: u64,
    pub guid: [u8; 32],
    pub message: Vec<u8>,
    pub caller_params: Vec<u8>,
}

/// Reference to one account of the receive instruction.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    /// The fee payer slot; resolved to the transaction signer.
    Payer,
    /// A literal address.
    Address(Pubkey),
    /// An address stored in lookup table `table` at position `offset`.
    AltIndex { table: u8, offset: u8 },
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PlanAccount {
    pub account: AccountRef,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct PlanInstruction {
    pub accounts: Vec<PlanAccount>,
}

/// Result of the `lz_receive_types_v2` view call.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct ExecutionPlan {
    /// Lookup tables the plan's `AltIndex` references point into, in
    /// reference order.
    pub alts: Vec<Pubkey>,
    pub instructions: Vec<PlanInstruction>,
}

impl ExecutionPlan {
    /// Decode a view-call return buffer: version byte, then the Borsh body.
    ///
    /// The payer occupying position 0 of every instruction is part of the
    /// program's return-data contract; it is asserted here rather than
    /// assumed downstream.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (version, body) = split_version(data)?;
        if version != SUPPORTED_PLAN_VERSION {
            anyhow::bail!(
                "Unsupported execution plan version {} (expected {})",
                version,
                SUPPORTED_PLAN_VERSION
            );
        }

        let plan =
            Self::deserialize(&mut &body[..]).context("Failed to decode execution plan body")?;

        for instruction in &plan.instructions {
            let first = instruction
                .accounts
                .first()
                .context("Execution plan instruction has no accounts")?;
            if !matches!(first.account, AccountRef::Payer) && !first.is_signer {
                anyhow::bail!("Execution plan does not start with the payer slot");
            }
        }

        Ok(plan)
    }
}

/// Result of the `lz_receive_types_info` view call: the accounts to pass to
/// the `lz_receive_types_v2` simulation, and the lookup tables to load.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub struct TypesInfo {
    pub accounts: Vec<Pubkey>,
    pub alts: Vec<Pubkey>,
}

/// Decode the `lz_receive_types_info` return buffer. The version byte is
/// returned to the caller, which decides whether it can proceed.
pub fn decode_types_info(data: &[u8]) -> Result<(u8, TypesInfo)> {
    let (version, body) = split_version(data)?;
    let info =
        TypesInfo::deserialize(&mut &body[..]).context("Failed to decode types info body")?;
    Ok((version, info))
}

fn split_version(data: &[u8]) -> Result<(u8, &[u8])> {
    match data.split_first() {
        Some((version, body)) => Ok((*version, body)),
        None => anyhow::bail!("Empty view-call return data"),
    }
}

/// Resolve a plan instruction into concrete account metas.
///
/// ALT references resolve through `tables` (ordered as the plan's `alts`
/// list); the payer slot and any signer-flagged entry resolving to the
/// default address are replaced with `payer`. Non-signer default-address
/// entries are left untouched. Out-of-range references fail fast.
pub fn resolve_accounts(
    instruction: &PlanInstruction,
    tables: &[AddressLookupTableAccount],
    payer: &Pubkey,
) -> Result<Vec<AccountMeta>> {
    let mut metas = Vec::with_capacity(instruction.accounts.len());

    for entry in &instruction.accounts {
        let mut pubkey = match &entry.account {
            AccountRef::Payer => *payer,
            AccountRef::Address(address) => *address,
            AccountRef::AltIndex { table, offset } => {
                let table_account = tables.get(*table as usize).with_context(|| {
                    format!(
                        "Lookup table index {} out of range ({} tables loaded)",
                        table,
                        tables.len()
                    )
                })?;
                *table_account
                    .addresses
                    .get(*offset as usize)
                    .with_context(|| {
                        format!(
                            "ALT offset {} out of range for table {} ({} addresses)",
                            offset,
                            table_account.key,
                            table_account.addresses.len()
                        )
                    })?
            }
        };

        if entry.is_signer && pubkey == Pubkey::default() {
            pubkey = *payer;
        }

        metas.push(AccountMeta {
            pubkey,
            is_signer: entry.is_signer,
            is_writable: entry.is_writable,
        });
    }

    Ok(metas)
}
