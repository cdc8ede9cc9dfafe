//! Address lookup table maintenance.
//!
//! Tables are created from a recent slot and extended append-only in the
//! order addresses are given; no deduplication happens at this layer. The
//! governance config account stores the table list consulted at clear
//! time; `run_set_alts` reconciles that list.

use anyhow::{Context, Result};
use solana_sdk::address_lookup_table::instruction as alt_instruction;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::context::AdminContext;
use crate::reconcile;
use crate::scan::ScanClient;

/// Reconcile the lookup-table list stored on the governance config
/// account.
pub async fn run_set_alts(ctx: &AdminContext, tables: Vec<Pubkey>) -> Result<()> {
    reconcile::set_lookup_tables(ctx, tables).await?;
    Ok(())
}

/// Prepare a lookup table for a stuck message: resolve its execution plan
/// and collect every literal (non-ALT) account into a fresh table so the
/// clear transaction fits the account limit.
pub async fn run_alt_prepare(
    ctx: &AdminContext,
    scan: &ScanClient,
    src_tx_hash: &str,
) -> Result<()> {
    let message = scan
        .get_message_by_tx(src_tx_hash)
        .await?
        .context("No message found yet")?;

    if message.is_delivered() {
        info!("transaction already delivered, nothing to prepare");
        return Ok(());
    }

    if message.is_awaiting_sealer() {
        info!("still waiting for sealer, please retry later");
        return Ok(());
    }

    let params = crate::clear::packet_params(&message)?;
    let (keys, tables) = crate::clear::resolve_plan(ctx, &params).await?;

    let payer = ctx.payer();
    let missing: Vec<Pubkey> = keys
        .iter()
        .map(|key| key.pubkey)
        .filter(|pubkey| *pubkey != payer)
        .filter(|pubkey| !tables.iter().any(|table| table.addresses.contains(pubkey)))
        .collect();

    info!(
        total = keys.len(),
        missing = missing.len(),
        "accounts not yet covered by a lookup table"
    );

    if missing.is_empty() {
        info!("all accounts covered, nothing to do");
        return Ok(());
    }

    let table = create_table(ctx, &missing).await?;
    info!(table = %table, "created lookup table; add it with set-alts");
    Ok(())
}

/// Create a lookup table derived from the current slot and extend it with
/// the given addresses in one transaction.
pub async fn create_table(ctx: &AdminContext, addresses: &[Pubkey]) -> Result<Pubkey> {
    let payer = ctx.payer();
    let recent_slot = ctx.svm.get_slot().await?;

    let (create_ix, table_address) =
        alt_instruction::create_lookup_table(payer, payer, recent_slot);
    let extend_ix =
        alt_instruction::extend_lookup_table(table_address, payer, Some(payer), addresses.to_vec());

    let signature = ctx.send_instructions(&[create_ix, extend_ix]).await?;
    info!(table = %table_address, signature = %signature, "create lookup table");
    Ok(table_address)
}

/// Append addresses to an existing lookup table.
pub async fn extend_table(
    ctx: &AdminContext,
    table: Pubkey,
    addresses: &[Pubkey],
) -> Result<()> {
    let payer = ctx.payer();
    let extend_ix =
        alt_instruction::extend_lookup_table(table, payer, Some(payer), addresses.to_vec());

    let signature = ctx.send_instructions(&[extend_ix]).await?;
    info!(table = %table, signature = %signature, "extend lookup table");
    Ok(())
}
