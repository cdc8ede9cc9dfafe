//! Governance OApp Admin CLI
//!
//! Administrative tasks for the cross-chain governance OApp and OFT
//! programs: wiring pathways, maintaining address lookup tables, clearing
//! stuck messages, and EVM-side deployment. Every task throws on fatal
//! errors and exits non-zero; already-satisfied steps log and no-op, so
//! reruns are safe.

use anyhow::Result;
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::info;

use oapp_admin::config::Config;
use oapp_admin::context::AdminContext;
use oapp_admin::evm_tasks::{self, EvmTaskContext, RateLimitDirection};
use oapp_admin::scan::{ScanClient, DEFAULT_SCAN_URL};
use oapp_admin::{alt, clear, oft_tasks, reconcile, wire};

#[derive(Parser, Debug)]
#[command(name = "oapp-admin", about = "Governance OApp wiring and administration")]
struct Cli {
    /// Path to the pathway configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full wiring sequence for every configured pathway
    Wire {
        /// Read and compare only; send no transactions
        #[arg(long)]
        validate_only: bool,
    },
    /// Set the remote peer for one endpoint id
    SetPeer {
        #[arg(long)]
        eid: u32,
        /// Peer address on the remote chain (0x-prefixed hex)
        #[arg(long)]
        peer: String,
    },
    /// Set the lookup-table list on the governance config account
    SetAlts {
        /// Comma-separated lookup table addresses (base58)
        #[arg(long)]
        alts: String,
    },
    /// Create a lookup table covering the accounts of a stuck message
    AltPrepare {
        #[arg(long)]
        src_tx_hash: String,
        #[arg(long)]
        scan_url: Option<String>,
    },
    /// Clear a stuck inbound message by executing lz_receive
    Clear {
        #[arg(long)]
        src_tx_hash: String,
        #[arg(long)]
        scan_url: Option<String>,
        /// Compute unit limit for the lz_receive transaction
        #[arg(long)]
        compute_unit_limit: Option<u32>,
    },
    /// Resolve and print the lz_receive account list for a packet
    GetReceiveAccounts {
        #[arg(long)]
        src_eid: u32,
        /// Source OApp address (0x-prefixed hex)
        #[arg(long)]
        sender: String,
        #[arg(long)]
        nonce: u64,
        /// Message GUID (0x-prefixed hex, 32 bytes)
        #[arg(long)]
        guid: String,
        /// Message payload (0x-prefixed hex)
        #[arg(long)]
        payload: String,
    },
    /// OFT program administration
    Oft {
        #[command(subcommand)]
        command: OftCommand,
    },
    /// EVM-side deployment and administration
    Evm {
        #[command(subcommand)]
        command: EvmCommand,
    },
}

#[derive(Subcommand, Debug)]
enum OftCommand {
    /// Set the OFT delegate
    SetDelegate {
        #[arg(long)]
        oft_store: String,
        #[arg(long)]
        delegate: String,
    },
    /// Pause the OFT
    Pause {
        #[arg(long)]
        oft_store: String,
    },
    /// Unpause the OFT
    Unpause {
        #[arg(long)]
        oft_store: String,
    },
    /// Set the outbound rate limit for one pathway
    SetOutboundRateLimit {
        #[arg(long)]
        oft_store: String,
        #[arg(long)]
        eid: u32,
        #[arg(long)]
        capacity: u64,
        #[arg(long)]
        refill_per_second: u64,
    },
    /// Initialize the two-leg send pending messages store
    InitPendingMessagesStore {
        #[arg(long)]
        oft_store: String,
    },
}

#[derive(Subcommand, Debug)]
enum EvmCommand {
    /// Deploy the governance controller OApp contract
    DeployController {
        /// Path to the compiled bytecode artifact (hex)
        #[arg(long)]
        artifact: String,
    },
    /// Set the inbound rate limit on the OFT adapter
    SetInboundRateLimit {
        /// Adapter contract address (0x-prefixed hex)
        #[arg(long)]
        adapter: String,
        #[arg(long)]
        eid: u32,
        /// Limit amount (base units)
        #[arg(long)]
        limit: u128,
        /// Window in seconds
        #[arg(long)]
        window: u64,
    },
    /// Set the outbound rate limit on the OFT adapter
    SetOutboundRateLimit {
        #[arg(long)]
        adapter: String,
        #[arg(long)]
        eid: u32,
        #[arg(long)]
        limit: u128,
        #[arg(long)]
        window: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Some(path) = &cli.config {
        std::env::set_var("OAPP_ADMIN_CONFIG_PATH", path);
        info!("Using custom config: {}", path);
    }

    match cli.command {
        Command::Wire { validate_only } => {
            let config = Config::load()?;
            let ctx = AdminContext::from_env(&config, validate_only)?;
            wire::run_wire(&ctx, &config).await?;
        }
        Command::SetPeer { eid, peer } => {
            let config = Config::load()?;
            let ctx = AdminContext::from_env(&config, false)?;
            let peer = governance_sdk::util::normalize_peer(&peer)?;
            reconcile::set_remote_peer(&ctx, eid, peer).await?;
        }
        Command::SetAlts { alts } => {
            let config = Config::load()?;
            let ctx = AdminContext::from_env(&config, false)?;
            let tables = alts
                .split(',')
                .map(|table| {
                    Pubkey::from_str(table.trim())
                        .map_err(|_| anyhow::anyhow!("Invalid lookup table address: {}", table))
                })
                .collect::<Result<Vec<_>>>()?;
            alt::run_set_alts(&ctx, tables).await?;
        }
        Command::AltPrepare {
            src_tx_hash,
            scan_url,
        } => {
            let config = Config::load()?;
            let ctx = AdminContext::from_env(&config, false)?;
            let scan = ScanClient::new(scan_url.as_deref().unwrap_or(DEFAULT_SCAN_URL))?;
            alt::run_alt_prepare(&ctx, &scan, &src_tx_hash).await?;
        }
        Command::Clear {
            src_tx_hash,
            scan_url,
            compute_unit_limit,
        } => {
            let config = Config::load()?;
            let ctx = AdminContext::from_env(&config, false)?;
            let scan = ScanClient::new(scan_url.as_deref().unwrap_or(DEFAULT_SCAN_URL))?;
            clear::run_clear(&ctx, &scan, &src_tx_hash, compute_unit_limit).await?;
        }
        Command::GetReceiveAccounts {
            src_eid,
            sender,
            nonce,
            guid,
            payload,
        } => {
            let config = Config::load()?;
            let ctx = AdminContext::from_env(&config, false)?;
            clear::run_get_receive_accounts(&ctx, src_eid, &sender, nonce, &guid, &payload)
                .await?;
        }
        Command::Oft { command } => {
            let config = Config::load()?;
            let ctx = AdminContext::from_env(&config, false)?;
            match command {
                OftCommand::SetDelegate {
                    oft_store,
                    delegate,
                } => {
                    let oft = oft_tasks::oft_client_from_env(&oft_store)?;
                    let delegate = Pubkey::from_str(&delegate)
                        .map_err(|_| anyhow::anyhow!("Invalid delegate address"))?;
                    oft_tasks::set_delegate(&ctx, &oft, delegate).await?;
                }
                OftCommand::Pause { oft_store } => {
                    let oft = oft_tasks::oft_client_from_env(&oft_store)?;
                    oft_tasks::set_paused(&ctx, &oft, true).await?;
                }
                OftCommand::Unpause { oft_store } => {
                    let oft = oft_tasks::oft_client_from_env(&oft_store)?;
                    oft_tasks::set_paused(&ctx, &oft, false).await?;
                }
                OftCommand::SetOutboundRateLimit {
                    oft_store,
                    eid,
                    capacity,
                    refill_per_second,
                } => {
                    let oft = oft_tasks::oft_client_from_env(&oft_store)?;
                    oft_tasks::set_outbound_rate_limit(&ctx, &oft, eid, capacity, refill_per_second)
                        .await?;
                }
                OftCommand::InitPendingMessagesStore { oft_store } => {
                    let oft = oft_tasks::oft_client_from_env(&oft_store)?;
                    oft_tasks::init_pending_messages_store(&ctx, &oft).await?;
                }
            }
        }
        Command::Evm { command } => {
            let ctx = EvmTaskContext::from_env()?;
            match command {
                EvmCommand::DeployController { artifact } => {
                    evm_tasks::deploy_controller(&ctx, &artifact).await?;
                }
                EvmCommand::SetInboundRateLimit {
                    adapter,
                    eid,
                    limit,
                    window,
                } => {
                    let adapter = chain_clients_evm::parse_address(&adapter)?;
                    evm_tasks::set_rate_limit(
                        &ctx,
                        adapter,
                        RateLimitDirection::Inbound,
                        eid,
                        limit,
                        window,
                    )
                    .await?;
                }
                EvmCommand::SetOutboundRateLimit {
                    adapter,
                    eid,
                    limit,
                    window,
                } => {
                    let adapter = chain_clients_evm::parse_address(&adapter)?;
                    evm_tasks::set_rate_limit(
                        &ctx,
                        adapter,
                        RateLimitDirection::Outbound,
                        eid,
                        limit,
                        window,
                    )
                    .await?;
                }
            }
        }
    }

    Ok(())
}
