//! Idempotent on-chain configuration reconciliation.
//!
//! Every step follows the same contract: read the current on-chain value,
//! compare it to the desired value under the property's equality predicate,
//! and submit at most one correcting transaction. Already-correct state is
//! logged and skipped, which makes the wiring sequence safe to rerun after
//! a partial failure. RPC and transaction errors propagate to the caller;
//! nothing here retries.

use anyhow::{Context, Result};
use governance_sdk::instructions;
use governance_sdk::uln::UlnConfig;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use tracing::info;

use crate::context::AdminContext;

/// What a reconciliation step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// On-chain state already matched the desired value; nothing sent.
    AlreadySet,
    /// The property was missing and an init transaction was confirmed.
    Initialized(String),
    /// The property differed and a correcting transaction was confirmed.
    Applied(String),
    /// A transaction was needed but validate-only mode suppressed it.
    SkippedValidateOnly,
}

impl Outcome {
    pub fn signature(&self) -> Option<&str> {
        match self {
            Outcome::Initialized(signature) | Outcome::Applied(signature) => Some(signature),
            _ => None,
        }
    }
}

/// Submit one correcting transaction unless validate-only mode is active.
async fn apply(
    ctx: &AdminContext,
    step: &str,
    ix: Instruction,
    init: bool,
) -> Result<Outcome> {
    if ctx.validate_only {
        info!("{}: would send transaction (validate-only)", step);
        return Ok(Outcome::SkippedValidateOnly);
    }

    let signature = ctx.send_instructions(&[ix]).await?;
    info!("{}: confirmed {}", step, signature);
    Ok(if init {
        Outcome::Initialized(signature)
    } else {
        Outcome::Applied(signature)
    })
}

/// Initialize the governance config account and register the OApp with the
/// endpoint. Skips silently if the account already exists.
pub async fn init_governance(ctx: &AdminContext, lz_receive_alts: Vec<Pubkey>) -> Result<Outcome> {
    if ctx.governance.get_governance(&ctx.svm).await?.is_some() {
        info!("init_governance: already initialized");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::init_governance(
        &ctx.governance.pda(),
        &ctx.governance.endpoint_pda(),
        &ctx.payer(),
        &ctx.payer(),
        lz_receive_alts,
    )?;
    info!("init_governance: initializing");
    apply(ctx, "init_governance", ix, true).await
}

/// Set the remote peer for one endpoint id. Peer equality is byte equality
/// of the 32-byte normalized addresses.
pub async fn set_remote_peer(
    ctx: &AdminContext,
    dst_eid: u32,
    desired: [u8; 32],
) -> Result<Outcome> {
    let current = ctx.governance.get_remote(&ctx.svm, dst_eid).await?;
    if current == Some(desired) {
        info!("set_remote_peer: already set");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::set_remote(&ctx.governance.pda(), &ctx.payer(), dst_eid, desired)?;
    info!(dst_eid, "set_remote_peer: changing peer");
    apply(ctx, "set_remote_peer", ix, false).await
}

pub async fn init_send_library(ctx: &AdminContext, eid: u32) -> Result<Outcome> {
    if ctx.governance.get_send_library(&ctx.svm, eid).await?.is_some() {
        info!("init_send_library: already initialized");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::init_send_library(
        &ctx.governance.endpoint_pda(),
        &ctx.payer(),
        &ctx.governance.id_pda(),
        eid,
    )?;
    info!(eid, "init_send_library: initializing");
    apply(ctx, "init_send_library", ix, true).await
}

pub async fn init_receive_library(ctx: &AdminContext, eid: u32) -> Result<Outcome> {
    if ctx
        .governance
        .get_receive_library(&ctx.svm, eid)
        .await?
        .is_some()
    {
        info!("init_receive_library: already initialized");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::init_receive_library(
        &ctx.governance.endpoint_pda(),
        &ctx.payer(),
        &ctx.governance.id_pda(),
        eid,
    )?;
    info!(eid, "init_receive_library: initializing");
    apply(ctx, "init_receive_library", ix, true).await
}

/// Point the send-library config at the ULN message library. Library
/// equality is address equality.
pub async fn set_send_library(ctx: &AdminContext, eid: u32) -> Result<Outcome> {
    let (expected, _) = ctx.governance.uln_pda().message_lib();
    let current = ctx.governance.get_send_library(&ctx.svm, eid).await?;
    if current == Some(expected) {
        info!("set_send_library: already set");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::set_send_library(
        &ctx.governance.endpoint_pda(),
        &ctx.payer(),
        &ctx.governance.id_pda(),
        eid,
        &expected,
    )?;
    info!(eid, "set_send_library: setting");
    apply(ctx, "set_send_library", ix, false).await
}

pub async fn set_receive_library(ctx: &AdminContext, eid: u32) -> Result<Outcome> {
    let (expected, _) = ctx.governance.uln_pda().message_lib();
    let current = ctx.governance.get_receive_library(&ctx.svm, eid).await?;
    if current == Some(expected) {
        info!("set_receive_library: already set");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::set_receive_library(
        &ctx.governance.endpoint_pda(),
        &ctx.payer(),
        &ctx.governance.id_pda(),
        eid,
        &expected,
    )?;
    info!(eid, "set_receive_library: setting");
    apply(ctx, "set_receive_library", ix, false).await
}

/// Initialize the inbound/outbound nonce account for a pathway.
pub async fn init_oapp_nonce(
    ctx: &AdminContext,
    eid: u32,
    remote_peer: [u8; 32],
) -> Result<Outcome> {
    if ctx
        .governance
        .get_nonce(&ctx.svm, eid, &remote_peer)
        .await?
        .is_some()
    {
        info!("init_oapp_nonce: already set");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::init_nonce(
        &ctx.governance.endpoint_pda(),
        &ctx.payer(),
        &ctx.governance.id_pda(),
        eid,
        remote_peer,
    )?;
    info!(eid, "init_oapp_nonce: initializing");
    apply(ctx, "init_oapp_nonce", ix, true).await
}

/// Initialize the per-pathway ULN config accounts.
pub async fn init_receive_config(ctx: &AdminContext, eid: u32) -> Result<Outcome> {
    if ctx
        .governance
        .get_receive_uln_config(&ctx.svm, eid)
        .await?
        .is_some()
    {
        info!("init_receive_config: already initialized");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::init_oapp_config(
        &ctx.governance.endpoint_pda(),
        &ctx.governance.uln_pda(),
        &ctx.payer(),
        &ctx.payer(),
        &ctx.governance.id_pda(),
        eid,
    )?;
    info!(eid, "init_receive_config: initializing");
    apply(ctx, "init_receive_config", ix, true).await
}

/// Set the receive-side ULN config. Equality is content equality: the
/// DVN sets themselves are compared, not just their sizes.
pub async fn set_receive_config(
    ctx: &AdminContext,
    eid: u32,
    desired: &UlnConfig,
) -> Result<Outcome> {
    let current = ctx
        .governance
        .get_receive_uln_config(&ctx.svm, eid)
        .await?
        .context("No current receive config found")?;

    if current.content_equal(desired) {
        info!("set_receive_config: already set");
        return Ok(Outcome::AlreadySet);
    }

    let ix = instructions::set_receive_uln_config(
        &ctx.governance.endpoint_pda(),
        &ctx.governance.uln_pda(),
        &ctx.payer(),
        &ctx.governance.id_pda(),
        eid,
        desired,
    )?;
    info!(eid, "set_receive_config: setting");
    apply(ctx, "set_receive_config", ix, false).await
}

/// Set the lookup-table list on the governance config account. Order is
/// significant: plan entries reference tables by position.
pub async fn set_lookup_tables(ctx: &AdminContext, desired: Vec<Pubkey>) -> Result<Outcome> {
    let current = ctx
        .governance
        .get_lz_receive_types_accounts(&ctx.svm)
        .await?
        .context("Governance not initialized")?;

    if current.alts == desired {
        info!("set_lookup_tables: already set");
        return Ok(Outcome::AlreadySet);
    }

    info!(
        current = ?current.alts,
        desired = ?desired,
        "set_lookup_tables: updating"
    );
    let ix = instructions::set_oapp_config(
        &ctx.governance.pda(),
        &ctx.payer(),
        instructions::SetOAppConfigParams::LzReceiveAlts(desired),
    )?;
    apply(ctx, "set_lookup_tables", ix, false).await
}
