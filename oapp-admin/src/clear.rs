//! Clearing stuck inbound messages.
//!
//! Resolution proceeds through fixed stages: look the message up on the
//! scan API, fetch the plan metadata (`lz_receive_types_info`), fetch the
//! execution plan (`lz_receive_types_v2`), resolve ALT references to
//! concrete addresses, build and sign the `lz_receive` transaction,
//! simulate it, then submit and wait for confirmation. Every stage is one
//! async step; failures are fatal for the invocation and nothing retries.

use anyhow::{Context, Result};
use governance_sdk::instructions;
use governance_sdk::plan::{self, LzReceiveParams, SUPPORTED_PLAN_VERSION};
use governance_sdk::util::normalize_peer;
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
};
use tracing::{debug, info};

use crate::context::AdminContext;
use crate::scan::{ScanClient, ScanMessage};

pub async fn run_clear(
    ctx: &AdminContext,
    scan: &ScanClient,
    src_tx_hash: &str,
    compute_unit_limit: Option<u32>,
) -> Result<()> {
    let message = scan
        .get_message_by_tx(src_tx_hash)
        .await?
        .context("No message found yet")?;

    if message.is_delivered() {
        info!(
            tx_hash = message
                .destination
                .tx
                .as_ref()
                .map(|tx| tx.tx_hash.as_str())
                .unwrap_or("unknown"),
            "transaction already delivered"
        );
        return Ok(());
    }

    if message.is_awaiting_sealer() {
        info!("still waiting for sealer, please retry later");
        return Ok(());
    }

    let params = packet_params(&message)?;
    debug!(
        src_eid = params.src_eid,
        nonce = params.nonce,
        "clearing packet"
    );

    let (keys, tables) = resolve_plan(ctx, &params).await?;
    log_account_summary(&keys, &tables);

    let mut ixs: Vec<Instruction> = Vec::new();
    if let Some(limit) = compute_unit_limit {
        ixs.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
    }
    ixs.push(instructions::lz_receive(&ctx.governance.program, keys, &params)?);
    let tx = ctx.build_transaction(&ixs, &tables).await?;

    let simulation = ctx.svm.simulate_transaction(&tx, true).await?;
    if let Some(err) = simulation.err {
        anyhow::bail!(
            "lz_receive simulation failed: {} (logs: {:?})",
            err,
            simulation.logs
        );
    }

    let signature = ctx.svm.send_and_confirm(&tx).await?;
    info!(signature = %signature, "lz_receive confirmed");
    Ok(())
}

/// Resolve and print the receive-instruction account list for a packet
/// given directly on the command line.
pub async fn run_get_receive_accounts(
    ctx: &AdminContext,
    src_eid: u32,
    sender: &str,
    nonce: u64,
    guid: &str,
    payload: &str,
) -> Result<()> {
    let params = LzReceiveParams {
        src_eid,
        sender: normalize_peer(sender)?,
        nonce,
        guid: bytes32_strict(guid).context("Invalid guid")?,
        message: hex_bytes(payload).context("Invalid payload")?,
        caller_params: vec![],
    };

    let (keys, _) = resolve_plan(ctx, &params).await?;

    println!("lz_receive accounts");
    for (index, key) in keys.iter().enumerate() {
        println!(
            "{:>3}: {} signer={} writable={}",
            index, key.pubkey, key.is_signer, key.is_writable
        );
    }
    Ok(())
}

/// Fetch the execution plan for a packet and resolve it into concrete
/// account metas plus the lookup tables the final transaction compiles
/// against.
pub(crate) async fn resolve_plan(
    ctx: &AdminContext,
    params: &LzReceiveParams,
) -> Result<(Vec<AccountMeta>, Vec<AddressLookupTableAccount>)> {
    let payer = ctx.payer();

    let (version, info) = ctx.governance.get_types_info(&ctx.svm, &payer).await?;
    if version != SUPPORTED_PLAN_VERSION {
        anyhow::bail!(
            "Invalid lz_receive version {}. Expected version {}.",
            version,
            SUPPORTED_PLAN_VERSION
        );
    }

    let execution_plan = ctx
        .governance
        .get_execution_plan(&ctx.svm, &payer, params, &info.accounts)
        .await?;

    let mut tables = Vec::with_capacity(execution_plan.alts.len());
    for alt in &execution_plan.alts {
        tables.push(ctx.svm.get_address_lookup_table(alt).await?);
    }

    let instruction = execution_plan
        .instructions
        .first()
        .context("Execution plan contained no instructions")?;

    let keys = plan::resolve_accounts(instruction, &tables, &payer)?;
    Ok((keys, tables))
}

pub(crate) fn packet_params(message: &ScanMessage) -> Result<LzReceiveParams> {
    Ok(LzReceiveParams {
        src_eid: message.pathway.src_eid,
        sender: normalize_peer(&message.pathway.sender.address)
            .context("Invalid sender address")?,
        nonce: message.pathway.nonce,
        guid: bytes32_strict(&message.guid).context("Invalid message guid")?,
        message: hex_bytes(&message.source.tx.payload).context("Invalid message payload")?,
        caller_params: vec![],
    })
}

fn log_account_summary(keys: &[AccountMeta], tables: &[AddressLookupTableAccount]) {
    let in_tables: usize = keys
        .iter()
        .filter(|key| {
            tables
                .iter()
                .any(|table| table.addresses.contains(&key.pubkey))
        })
        .count();
    info!(
        total = keys.len(),
        in_alt = in_tables,
        not_in_alt = keys.len() - in_tables,
        tables = tables.len(),
        "resolved account list"
    );
}

fn hex_bytes(value: &str) -> Result<Vec<u8>> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped).context("Invalid hex data")
}

fn bytes32_strict(value: &str) -> Result<[u8; 32]> {
    let bytes = hex_bytes(value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("Expected 32 bytes, got {}", bytes.len()))
}
