//! Instruction builders for the governance program and the consumed slice
//! of the LayerZero endpoint program.
//!
//! Instruction data is Anchor-encoded: an 8-byte discriminator derived from
//! the instruction name, followed by Borsh-encoded parameters.

use anyhow::{Context, Result};
use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::pda::{EndpointPda, GovernancePda, UlnPda};
use crate::plan::LzReceiveParams;
use crate::uln::UlnConfig;

/// Config type tag for receive-side ULN configuration in the endpoint's
/// `set_config` instruction.
pub const CONFIG_TYPE_RECEIVE_ULN: u32 = 2;

/// Anchor instruction discriminator: first 8 bytes of
/// sha256("global:<name>").
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{}", name).as_bytes());
    let hash = hasher.finalize();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

pub(crate) fn anchor_ix_data<T: BorshSerialize>(name: &str, params: &T) -> Result<Vec<u8>> {
    let mut data = instruction_discriminator(name).to_vec();
    params
        .serialize(&mut data)
        .with_context(|| format!("Failed to encode {} params", name))?;
    Ok(data)
}

// ============================================================================
// GOVERNANCE PROGRAM INSTRUCTIONS
// ============================================================================

#[derive(BorshSerialize, Debug, Clone)]
pub struct InitGovernanceParams {
    pub id: u8,
    pub admin: Pubkey,
    pub endpoint: Pubkey,
    pub lz_receive_alts: Vec<Pubkey>,
}

#[derive(BorshSerialize, Debug, Clone)]
pub struct SetRemoteParams {
    pub id: u8,
    pub dst_eid: u32,
    pub remote: [u8; 32],
}

#[derive(BorshSerialize, Debug, Clone)]
pub enum SetOAppConfigParams {
    Admin(Pubkey),
    Delegate(Pubkey),
    LzReceiveAlts(Vec<Pubkey>),
}

/// Build `init_governance`. The governance program registers itself with
/// the endpoint via CPI, so the endpoint's register-OApp accounts are
/// appended as remaining accounts.
pub fn init_governance(
    governance: &GovernancePda,
    endpoint: &EndpointPda,
    payer: &Pubkey,
    admin: &Pubkey,
    lz_receive_alts: Vec<Pubkey>,
) -> Result<Instruction> {
    let (governance_pda, _) = governance.governance();
    let (types_pda, _) = governance.lz_receive_types_accounts();
    let (oapp_registry, _) = endpoint.oapp_registry(&governance_pda);
    let (event_authority, _) = endpoint.event_authority();

    let params = InitGovernanceParams {
        id: governance.governance_id,
        admin: *admin,
        endpoint: endpoint.program,
        lz_receive_alts,
    };

    Ok(Instruction {
        program_id: governance.program,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(governance_pda, false),
            AccountMeta::new(types_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
            // register-OApp CPI accounts
            AccountMeta::new_readonly(endpoint.program, false),
            AccountMeta::new(oapp_registry, false),
            AccountMeta::new_readonly(event_authority, false),
        ],
        data: anchor_ix_data("init_governance", &params)?,
    })
}

pub fn set_remote(
    governance: &GovernancePda,
    admin: &Pubkey,
    dst_eid: u32,
    remote: [u8; 32],
) -> Result<Instruction> {
    let (governance_pda, _) = governance.governance();
    let (remote_pda, _) = governance.remote(dst_eid);

    let params = SetRemoteParams {
        id: governance.governance_id,
        dst_eid,
        remote,
    };

    Ok(Instruction {
        program_id: governance.program,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(remote_pda, false),
            AccountMeta::new_readonly(governance_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: anchor_ix_data("set_remote", &params)?,
    })
}

pub fn set_oapp_config(
    governance: &GovernancePda,
    admin: &Pubkey,
    params: SetOAppConfigParams,
) -> Result<Instruction> {
    let (governance_pda, _) = governance.governance();
    let (types_pda, _) = governance.lz_receive_types_accounts();

    Ok(Instruction {
        program_id: governance.program,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(governance_pda, false),
            AccountMeta::new(types_pda, false),
        ],
        data: anchor_ix_data("set_oapp_config", &params)?,
    })
}

/// Read-only view call returning the plan version and the account/ALT lists
/// needed for the `lz_receive_types_v2` simulation.
pub fn lz_receive_types_info(governance: &GovernancePda) -> Result<Instruction> {
    let (governance_pda, _) = governance.governance();
    let (types_pda, _) = governance.lz_receive_types_accounts();

    Ok(Instruction {
        program_id: governance.program,
        accounts: vec![
            AccountMeta::new_readonly(governance_pda, false),
            AccountMeta::new_readonly(types_pda, false),
        ],
        data: anchor_ix_data("lz_receive_types_info", &())?,
    })
}

/// Read-only view call returning the execution plan for one inbound packet.
/// `extra_accounts` is the account list previously returned by
/// `lz_receive_types_info`, passed through as read-only metas.
pub fn lz_receive_types_v2(
    governance: &GovernancePda,
    params: &LzReceiveParams,
    extra_accounts: &[Pubkey],
) -> Result<Instruction> {
    let (governance_pda, _) = governance.governance();

    let mut accounts = vec![AccountMeta::new_readonly(governance_pda, false)];
    accounts.extend(
        extra_accounts
            .iter()
            .map(|account| AccountMeta::new_readonly(*account, false)),
    );

    Ok(Instruction {
        program_id: governance.program,
        accounts,
        data: anchor_ix_data("lz_receive_types_v2", params)?,
    })
}

/// Build `lz_receive` with a fully resolved account list. Account order is
/// dictated by the execution plan and must not be changed.
pub fn lz_receive(
    program: &Pubkey,
    accounts: Vec<AccountMeta>,
    params: &LzReceiveParams,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program,
        accounts,
        data: anchor_ix_data("lz_receive", params)?,
    })
}

// ============================================================================
// ENDPOINT PROGRAM INSTRUCTIONS
// ============================================================================

#[derive(BorshSerialize, Debug, Clone)]
pub struct InitLibraryParams {
    pub oapp: Pubkey,
    pub eid: u32,
}

#[derive(BorshSerialize, Debug, Clone)]
pub struct SetLibraryParams {
    pub oapp: Pubkey,
    pub eid: u32,
    pub new_lib: Pubkey,
}

#[derive(BorshSerialize, Debug, Clone)]
pub struct InitNonceParams {
    pub local_oapp: Pubkey,
    pub remote_eid: u32,
    pub remote_oapp: [u8; 32],
}

#[derive(BorshSerialize, Debug, Clone)]
pub struct InitConfigParams {
    pub oapp: Pubkey,
    pub eid: u32,
}

#[derive(BorshSerialize, Debug, Clone)]
pub struct SetConfigParams {
    pub oapp: Pubkey,
    pub eid: u32,
    pub config_type: u32,
    pub config: Vec<u8>,
}

pub fn init_send_library(
    endpoint: &EndpointPda,
    delegate: &Pubkey,
    oapp: &Pubkey,
    eid: u32,
) -> Result<Instruction> {
    let (oapp_registry, _) = endpoint.oapp_registry(oapp);
    let (config_pda, _) = endpoint.send_library_config(oapp, eid);

    let params = InitLibraryParams { oapp: *oapp, eid };

    Ok(Instruction {
        program_id: endpoint.program,
        accounts: vec![
            AccountMeta::new(*delegate, true),
            AccountMeta::new_readonly(oapp_registry, false),
            AccountMeta::new(config_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: anchor_ix_data("init_send_library", &params)?,
    })
}

pub fn init_receive_library(
    endpoint: &EndpointPda,
    delegate: &Pubkey,
    oapp: &Pubkey,
    eid: u32,
) -> Result<Instruction> {
    let (oapp_registry, _) = endpoint.oapp_registry(oapp);
    let (config_pda, _) = endpoint.receive_library_config(oapp, eid);

    let params = InitLibraryParams { oapp: *oapp, eid };

    Ok(Instruction {
        program_id: endpoint.program,
        accounts: vec![
            AccountMeta::new(*delegate, true),
            AccountMeta::new_readonly(oapp_registry, false),
            AccountMeta::new(config_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: anchor_ix_data("init_receive_library", &params)?,
    })
}

pub fn set_send_library(
    endpoint: &EndpointPda,
    delegate: &Pubkey,
    oapp: &Pubkey,
    eid: u32,
    new_lib: &Pubkey,
) -> Result<Instruction> {
    let (oapp_registry, _) = endpoint.oapp_registry(oapp);
    let (config_pda, _) = endpoint.send_library_config(oapp, eid);

    let params = SetLibraryParams {
        oapp: *oapp,
        eid,
        new_lib: *new_lib,
    };

    Ok(Instruction {
        program_id: endpoint.program,
        accounts: vec![
            AccountMeta::new(*delegate, true),
            AccountMeta::new_readonly(oapp_registry, false),
            AccountMeta::new(config_pda, false),
        ],
        data: anchor_ix_data("set_send_library", &params)?,
    })
}

pub fn set_receive_library(
    endpoint: &EndpointPda,
    delegate: &Pubkey,
    oapp: &Pubkey,
    eid: u32,
    new_lib: &Pubkey,
) -> Result<Instruction> {
    let (oapp_registry, _) = endpoint.oapp_registry(oapp);
    let (config_pda, _) = endpoint.receive_library_config(oapp, eid);

    let params = SetLibraryParams {
        oapp: *oapp,
        eid,
        new_lib: *new_lib,
    };

    Ok(Instruction {
        program_id: endpoint.program,
        accounts: vec![
            AccountMeta::new(*delegate, true),
            AccountMeta::new_readonly(oapp_registry, false),
            AccountMeta::new(config_pda, false),
        ],
        data: anchor_ix_data("set_receive_library", &params)?,
    })
}

pub fn init_nonce(
    endpoint: &EndpointPda,
    delegate: &Pubkey,
    oapp: &Pubkey,
    remote_eid: u32,
    remote_oapp: [u8; 32],
) -> Result<Instruction> {
    let (oapp_registry, _) = endpoint.oapp_registry(oapp);
    let (nonce_pda, _) = endpoint.nonce(oapp, remote_eid, &remote_oapp);

    let params = InitNonceParams {
        local_oapp: *oapp,
        remote_eid,
        remote_oapp,
    };

    Ok(Instruction {
        program_id: endpoint.program,
        accounts: vec![
            AccountMeta::new(*delegate, true),
            AccountMeta::new_readonly(oapp_registry, false),
            AccountMeta::new(nonce_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: anchor_ix_data("init_nonce", &params)?,
    })
}

/// Initialize the per-pathway ULN config accounts through the endpoint.
pub fn init_oapp_config(
    endpoint: &EndpointPda,
    uln: &UlnPda,
    delegate: &Pubkey,
    payer: &Pubkey,
    oapp: &Pubkey,
    eid: u32,
) -> Result<Instruction> {
    let (oapp_registry, _) = endpoint.oapp_registry(oapp);
    let (message_lib, _) = uln.message_lib();
    let (send_config, _) = uln.send_config(eid, oapp);
    let (receive_config, _) = uln.receive_config(eid, oapp);

    let params = InitConfigParams { oapp: *oapp, eid };

    Ok(Instruction {
        program_id: endpoint.program,
        accounts: vec![
            AccountMeta::new_readonly(*delegate, true),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(oapp_registry, false),
            AccountMeta::new_readonly(uln.program, false),
            AccountMeta::new_readonly(message_lib, false),
            AccountMeta::new(send_config, false),
            AccountMeta::new(receive_config, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: anchor_ix_data("init_oapp_config", &params)?,
    })
}

/// Set receive-side ULN configuration through the endpoint's `set_config`.
pub fn set_receive_uln_config(
    endpoint: &EndpointPda,
    uln: &UlnPda,
    delegate: &Pubkey,
    oapp: &Pubkey,
    eid: u32,
    config: &UlnConfig,
) -> Result<Instruction> {
    let (oapp_registry, _) = endpoint.oapp_registry(oapp);
    let (message_lib, _) = uln.message_lib();
    let (receive_config, _) = uln.receive_config(eid, oapp);

    let mut config_bytes = Vec::new();
    config
        .serialize(&mut config_bytes)
        .context("Failed to encode ULN config")?;

    let params = SetConfigParams {
        oapp: *oapp,
        eid,
        config_type: CONFIG_TYPE_RECEIVE_ULN,
        config: config_bytes,
    };

    Ok(Instruction {
        program_id: endpoint.program,
        accounts: vec![
            AccountMeta::new_readonly(*delegate, true),
            AccountMeta::new_readonly(oapp_registry, false),
            AccountMeta::new_readonly(uln.program, false),
            AccountMeta::new_readonly(message_lib, false),
            AccountMeta::new(receive_config, false),
        ],
        data: anchor_ix_data("set_config", &params)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_differs_per_instruction() {
        assert_ne!(
            instruction_discriminator("set_remote"),
            instruction_discriminator("init_governance")
        );
    }

    #[test]
    fn ix_data_starts_with_discriminator() {
        let params = SetRemoteParams {
            id: 0,
            dst_eid: 40106,
            remote: [0u8; 32],
        };
        let data = anchor_ix_data("set_remote", &params).unwrap();
        assert_eq!(&data[..8], &instruction_discriminator("set_remote"));
        // id (1) + dst_eid (4) + remote (32)
        assert_eq!(data.len(), 8 + 1 + 4 + 32);
    }
}
