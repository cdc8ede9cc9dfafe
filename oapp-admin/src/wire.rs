//! The wiring sequence: bring every configured pathway to its desired
//! on-chain state.
//!
//! Steps run sequentially and each is awaited before the next; there is no
//! cross-step atomicity. A crash between steps leaves partial state, which
//! is safe because every step is an idempotent read-compare-act: rerunning
//! the whole sequence no-ops the already-correct steps.

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::context::AdminContext;
use crate::reconcile;
use governance_sdk::uln::PathwayDirection;

pub async fn run_wire(ctx: &AdminContext, config: &Config) -> Result<()> {
    reconcile::init_governance(ctx, vec![]).await?;

    for pathway in &config.pathways {
        let eid = pathway.remote_eid;
        let peer = pathway.peer_bytes()?;
        info!(eid, "wiring pathway");

        reconcile::set_remote_peer(ctx, eid, peer).await?;
        reconcile::init_receive_library(ctx, eid).await?;
        reconcile::init_oapp_nonce(ctx, eid, peer).await?;
        reconcile::set_receive_library(ctx, eid).await?;
        reconcile::init_receive_config(ctx, eid).await?;
        reconcile::set_receive_config(ctx, eid, &pathway.receive_uln_config()?).await?;

        if pathway.direction == PathwayDirection::Bidirectional {
            reconcile::init_send_library(ctx, eid).await?;
            reconcile::set_send_library(ctx, eid).await?;
        }
    }

    info!("wiring complete");
    Ok(())
}
