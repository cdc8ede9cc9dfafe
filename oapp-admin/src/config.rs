//! Configuration Management Module
//!
//! Pathway configuration for the wiring tasks: which remote endpoints the
//! governance OApp is wired to, the peer address on each, and the
//! DVN/confirmation requirements for receiving from them. Secrets and
//! program ids come from the environment, not from this file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use governance_sdk::options::EnforcedOption;
use governance_sdk::uln::{PathwayDirection, UlnConfig};
use governance_sdk::util::normalize_peer;

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure for the admin CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Solana connection and LayerZero program settings
    pub solana: SolanaConfig,
    /// Cross-chain pathways to wire, one per remote endpoint
    #[serde(default, rename = "pathway")]
    pub pathways: Vec<PathwayConfig>,
}

/// Solana-side connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaConfig {
    /// RPC endpoint URL; the RPC_URL_SOLANA environment variable takes
    /// precedence when set
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// LayerZero endpoint program id
    #[serde(default = "default_endpoint_program_id")]
    pub endpoint_program_id: String,
    /// LayerZero ULN message library program id
    #[serde(default = "default_uln_program_id")]
    pub uln_program_id: String,
}

/// One cross-chain pathway: the remote endpoint, its peer contract, and the
/// verification requirements for messages received from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayConfig {
    /// Remote LayerZero endpoint id
    pub remote_eid: u32,
    /// Peer contract address on the remote chain (0x-prefixed hex); falls
    /// back to the GOVERNANCE_CONTROLLER_ADDRESS environment variable
    #[serde(default)]
    pub peer_address: Option<String>,
    /// Whether the pathway also sends from Solana to the remote chain
    #[serde(default)]
    pub direction: PathwayDirection,
    /// Block confirmations required on the source chain
    pub confirmations: u64,
    /// Required DVN addresses (base58)
    #[serde(default)]
    pub required_dvns: Vec<String>,
    /// Optional DVN addresses (base58)
    #[serde(default)]
    pub optional_dvns: Vec<String>,
    /// How many optional DVNs must attest
    #[serde(default)]
    pub optional_dvn_threshold: u8,
    /// Enforced executor options for messages sent to this pathway
    #[serde(default)]
    pub enforced_options: Vec<EnforcedOption>,
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from the TOML file, honoring the
    /// OAPP_ADMIN_CONFIG_PATH environment variable override.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("OAPP_ADMIN_CONFIG_PATH")
            .unwrap_or_else(|_| "config/oapp-admin.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            anyhow::bail!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/oapp-admin.template.toml config/oapp-admin.toml\n\
                Then edit config/oapp-admin.toml with your actual values.",
                path
            );
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration: unique remote EIDs, well-formed
    /// addresses, and consistent DVN settings per pathway.
    pub fn validate(&self) -> Result<()> {
        Pubkey::from_str(&self.solana.endpoint_program_id)
            .map_err(|_| anyhow::anyhow!("Invalid endpoint_program_id (expected base58)"))?;
        Pubkey::from_str(&self.solana.uln_program_id)
            .map_err(|_| anyhow::anyhow!("Invalid uln_program_id (expected base58)"))?;

        for (index, pathway) in self.pathways.iter().enumerate() {
            let duplicate = self.pathways[..index]
                .iter()
                .any(|other| other.remote_eid == pathway.remote_eid);
            if duplicate {
                anyhow::bail!(
                    "Configuration error: pathway for remote EID {} is declared twice",
                    pathway.remote_eid
                );
            }

            if let Some(peer) = &pathway.peer_address {
                normalize_peer(peer).with_context(|| {
                    format!("Invalid peer_address for remote EID {}", pathway.remote_eid)
                })?;
            }

            // Also checks DVN sorting, duplicates, and the threshold bound.
            pathway.receive_uln_config().with_context(|| {
                format!("Invalid ULN config for remote EID {}", pathway.remote_eid)
            })?;

            for option in &pathway.enforced_options {
                if option.msg_type == 0 {
                    anyhow::bail!(
                        "Configuration error: enforced option msg_type must be >= 1 (remote EID {})",
                        pathway.remote_eid
                    );
                }
            }
        }

        Ok(())
    }
}

impl PathwayConfig {
    /// Peer address normalized to 32 bytes, falling back to the
    /// GOVERNANCE_CONTROLLER_ADDRESS environment variable.
    pub fn peer_bytes(&self) -> Result<[u8; 32]> {
        let address = match &self.peer_address {
            Some(address) => address.clone(),
            None => std::env::var("GOVERNANCE_CONTROLLER_ADDRESS").map_err(|_| {
                anyhow::anyhow!(
                    "No peer_address configured for remote EID {} and \
                     GOVERNANCE_CONTROLLER_ADDRESS is not set",
                    self.remote_eid
                )
            })?,
        };
        normalize_peer(&address)
    }

    /// Desired receive-side ULN configuration for this pathway.
    pub fn receive_uln_config(&self) -> Result<UlnConfig> {
        let required = parse_dvns(&self.required_dvns)?;
        let optional = parse_dvns(&self.optional_dvns)?;
        UlnConfig::new(
            self.confirmations,
            required,
            optional,
            self.optional_dvn_threshold,
        )
    }
}

fn parse_dvns(dvns: &[String]) -> Result<Vec<Pubkey>> {
    dvns.iter()
        .map(|dvn| {
            Pubkey::from_str(dvn).map_err(|_| anyhow::anyhow!("Invalid DVN address: {}", dvn))
        })
        .collect()
}

fn default_endpoint_program_id() -> String {
    governance_sdk::DEFAULT_ENDPOINT_PROGRAM_ID.to_string()
}

fn default_uln_program_id() -> String {
    governance_sdk::DEFAULT_ULN_PROGRAM_ID.to_string()
}
