//! OFT program administration tasks.
//!
//! Same read-compare-act contract as the wiring steps: each task reads the
//! current store or peer config, compares it to the desired value, and
//! sends at most one transaction.

use anyhow::{Context, Result};
use governance_sdk::accounts::RateLimitState;
use governance_sdk::oft::{OftClient, SetOftConfigParams, SetPeerConfigParams};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::info;

use crate::context::{required_env, AdminContext};

/// Build the OFT client from OFT_PROGRAM_ID and the store address given on
/// the command line.
pub fn oft_client_from_env(oft_store: &str) -> Result<OftClient> {
    let program = Pubkey::from_str(&required_env("OFT_PROGRAM_ID")?)
        .map_err(|_| anyhow::anyhow!("Invalid OFT_PROGRAM_ID (expected base58)"))?;
    let oft_store = Pubkey::from_str(oft_store)
        .map_err(|_| anyhow::anyhow!("Invalid OFT store address (expected base58)"))?;
    Ok(OftClient::new(program, oft_store))
}

pub async fn set_delegate(ctx: &AdminContext, oft: &OftClient, delegate: Pubkey) -> Result<()> {
    let store = oft
        .get_store(&ctx.svm)
        .await?
        .context("OFT store not found")?;

    if store.delegate == delegate {
        info!("set_delegate: already set");
        return Ok(());
    }

    let ix = oft.set_oft_config(&ctx.payer(), SetOftConfigParams::Delegate(delegate))?;
    let signature = ctx.send_instructions(&[ix]).await?;
    info!(delegate = %delegate, signature = %signature, "set_delegate: confirmed");
    Ok(())
}

pub async fn set_paused(ctx: &AdminContext, oft: &OftClient, paused: bool) -> Result<()> {
    let step = if paused { "pause" } else { "unpause" };
    let store = oft
        .get_store(&ctx.svm)
        .await?
        .context("OFT store not found")?;

    if store.paused == paused {
        info!("{}: already set", step);
        return Ok(());
    }

    let ix = oft.set_oft_config(&ctx.payer(), SetOftConfigParams::Paused(paused))?;
    let signature = ctx.send_instructions(&[ix]).await?;
    info!(signature = %signature, "{}: confirmed", step);
    Ok(())
}

pub async fn set_outbound_rate_limit(
    ctx: &AdminContext,
    oft: &OftClient,
    eid: u32,
    capacity: u64,
    refill_per_second: u64,
) -> Result<()> {
    let desired = RateLimitState {
        capacity,
        refill_per_second,
    };

    let peer = oft
        .get_peer_config(&ctx.svm, eid)
        .await?
        .context("Peer config not found for this EID")?;

    if peer.outbound_rate_limit.as_ref() == Some(&desired) {
        info!("set_outbound_rate_limit: already set");
        return Ok(());
    }

    let ix = oft.set_peer_config(
        &ctx.payer(),
        eid,
        SetPeerConfigParams::OutboundRateLimit(Some(desired)),
    )?;
    let signature = ctx.send_instructions(&[ix]).await?;
    info!(eid, signature = %signature, "set_outbound_rate_limit: confirmed");
    Ok(())
}

pub async fn init_pending_messages_store(ctx: &AdminContext, oft: &OftClient) -> Result<()> {
    if oft.pending_messages_store_exists(&ctx.svm).await? {
        info!("init_pending_messages_store: already initialized");
        return Ok(());
    }

    let ix = oft.init_pending_messages_store(&ctx.payer())?;
    let signature = ctx.send_instructions(&[ix]).await?;
    info!(signature = %signature, "init_pending_messages_store: confirmed");
    Ok(())
}
