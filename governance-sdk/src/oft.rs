//! High-level client for the OFT program's administrative surface.

use anyhow::Result;
use borsh::BorshSerialize;
use chain_clients_svm::SvmClient;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::accounts::{self, OftStoreAccount, PeerConfigAccount, RateLimitState};
use crate::instructions::anchor_ix_data;
use crate::pda::OftPda;

#[derive(BorshSerialize, Debug, Clone)]
pub enum SetOftConfigParams {
    Admin(Pubkey),
    Delegate(Pubkey),
    Paused(bool),
}

#[derive(BorshSerialize, Debug, Clone)]
pub enum SetPeerConfigParams {
    PeerAddress([u8; 32]),
    OutboundRateLimit(Option<RateLimitState>),
}

#[derive(Debug, Clone, Copy)]
pub struct OftClient {
    pub program: Pubkey,
    pub oft_store: Pubkey,
}

impl OftClient {
    pub fn new(program: Pubkey, oft_store: Pubkey) -> Self {
        Self { program, oft_store }
    }

    pub fn pda(&self) -> OftPda {
        OftPda::new(self.program)
    }

    pub async fn get_store(&self, svm: &SvmClient) -> Result<Option<OftStoreAccount>> {
        match svm.get_account_data(&self.oft_store).await? {
            Some(data) => Ok(Some(accounts::decode_account(
                accounts::OFT_STORE_ACCOUNT,
                &data,
            )?)),
            None => Ok(None),
        }
    }

    pub async fn get_peer_config(
        &self,
        svm: &SvmClient,
        eid: u32,
    ) -> Result<Option<PeerConfigAccount>> {
        let (pda, _) = self.pda().peer_config(&self.oft_store, eid);
        match svm.get_account_data(&pda).await? {
            Some(data) => Ok(Some(accounts::decode_account(
                accounts::PEER_CONFIG_ACCOUNT,
                &data,
            )?)),
            None => Ok(None),
        }
    }

    pub async fn pending_messages_store_exists(&self, svm: &SvmClient) -> Result<bool> {
        let (pda, _) = self.pda().pending_messages_store(&self.oft_store);
        svm.account_exists(&pda).await
    }

    pub fn set_oft_config(
        &self,
        admin: &Pubkey,
        params: SetOftConfigParams,
    ) -> Result<Instruction> {
        Ok(Instruction {
            program_id: self.program,
            accounts: vec![
                AccountMeta::new(*admin, true),
                AccountMeta::new(self.oft_store, false),
            ],
            data: anchor_ix_data("set_oft_config", &params)?,
        })
    }

    pub fn set_peer_config(
        &self,
        admin: &Pubkey,
        eid: u32,
        params: SetPeerConfigParams,
    ) -> Result<Instruction> {
        let (peer_pda, _) = self.pda().peer_config(&self.oft_store, eid);

        #[derive(BorshSerialize)]
        struct SetPeerConfigArgs {
            eid: u32,
            config: SetPeerConfigParams,
        }

        Ok(Instruction {
            program_id: self.program,
            accounts: vec![
                AccountMeta::new(*admin, true),
                AccountMeta::new(peer_pda, false),
                AccountMeta::new_readonly(self.oft_store, false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data: anchor_ix_data("set_peer_config", &SetPeerConfigArgs { eid, config: params })?,
        })
    }

    pub fn init_pending_messages_store(&self, payer: &Pubkey) -> Result<Instruction> {
        let (store_pda, _) = self.pda().pending_messages_store(&self.oft_store);

        Ok(Instruction {
            program_id: self.program,
            accounts: vec![
                AccountMeta::new(*payer, true),
                AccountMeta::new(store_pda, false),
                AccountMeta::new_readonly(self.oft_store, false),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data: anchor_ix_data("init_pending_messages_store", &())?,
        })
    }
}
