//! ULN (message library) configuration model.

use anyhow::Result;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Sentinel for "no required DVNs configured" in the on-chain count field.
pub const NIL_DVN_COUNT: u8 = 255;

/// DVN/confirmation configuration for one pathway direction.
///
/// DVN lists are kept sorted in canonical address-byte order; the count
/// fields are derived at construction and travel with the config on the
/// wire.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UlnConfig {
    pub confirmations: u64,
    pub required_dvn_count: u8,
    pub optional_dvn_count: u8,
    pub optional_dvn_threshold: u8,
    pub required_dvns: Vec<Pubkey>,
    pub optional_dvns: Vec<Pubkey>,
}

impl UlnConfig {
    /// Build a config from unsorted DVN lists. Lists are sorted canonically,
    /// counts are derived, and the optional threshold is validated against
    /// the optional list.
    pub fn new(
        confirmations: u64,
        mut required_dvns: Vec<Pubkey>,
        mut optional_dvns: Vec<Pubkey>,
        optional_dvn_threshold: u8,
    ) -> Result<Self> {
        sort_canonical(&mut required_dvns);
        sort_canonical(&mut optional_dvns);

        if has_duplicates(&required_dvns) || has_duplicates(&optional_dvns) {
            anyhow::bail!("Duplicate DVN address in config");
        }
        if optional_dvn_threshold as usize > optional_dvns.len() {
            anyhow::bail!(
                "Optional DVN threshold {} exceeds optional DVN count {}",
                optional_dvn_threshold,
                optional_dvns.len()
            );
        }

        let required_dvn_count = if required_dvns.is_empty() {
            NIL_DVN_COUNT
        } else {
            required_dvns.len() as u8
        };

        Ok(Self {
            confirmations,
            required_dvn_count,
            optional_dvn_count: optional_dvns.len() as u8,
            optional_dvn_threshold,
            required_dvns,
            optional_dvns,
        })
    }

    /// Exact equality of configuration content.
    ///
    /// Confirmations, count fields, the threshold, and the actual DVN set
    /// membership must all match. Comparing only list lengths would report
    /// two configs with different DVN addresses as equal and make the
    /// reconciliation skip a correction it should apply.
    pub fn content_equal(&self, other: &UlnConfig) -> bool {
        self.confirmations == other.confirmations
            && self.required_dvn_count == other.required_dvn_count
            && self.optional_dvn_count == other.optional_dvn_count
            && self.optional_dvn_threshold == other.optional_dvn_threshold
            && sorted(&self.required_dvns) == sorted(&other.required_dvns)
            && sorted(&self.optional_dvns) == sorted(&other.optional_dvns)
    }
}

/// Which directions of a pathway are wired. A one-way pathway only carries
/// messages from the remote chain to the local one, so send-side
/// configuration is skipped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathwayDirection {
    #[default]
    Bidirectional,
    OneWaySourceToDest,
}

fn sort_canonical(dvns: &mut [Pubkey]) {
    dvns.sort_by_key(|dvn| dvn.to_bytes());
}

fn sorted(dvns: &[Pubkey]) -> Vec<Pubkey> {
    let mut copy = dvns.to_vec();
    sort_canonical(&mut copy);
    copy
}

fn has_duplicates(sorted_dvns: &[Pubkey]) -> bool {
    sorted_dvns.windows(2).any(|pair| pair[0] == pair[1])
}
