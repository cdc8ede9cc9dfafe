//! High-level client for the governance OApp.
//!
//! Read methods return `None` when the backing account does not exist yet,
//! which the reconciliation layer maps to "needs initialization". View
//! calls are executed as unsigned transaction simulations and their return
//! data decoded through the `plan` codec.

use anyhow::{Context, Result};
use chain_clients_svm::SvmClient;
use solana_sdk::{
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

use crate::accounts::{
    self, GovernanceAccount, LzReceiveTypesAccounts, NonceAccount, ReceiveConfig,
    ReceiveLibraryConfig, RemoteAccount, SendLibraryConfig,
};
use crate::pda::{EndpointPda, GovernancePda, UlnPda};
use crate::plan::{self, ExecutionPlan, LzReceiveParams, TypesInfo};
use crate::uln::UlnConfig;

#[derive(Debug, Clone, Copy)]
pub struct GovernanceClient {
    pub program: Pubkey,
    pub governance_id: u8,
    pub endpoint_program: Pubkey,
    pub uln_program: Pubkey,
}

impl GovernanceClient {
    pub fn new(program: Pubkey, endpoint_program: Pubkey, uln_program: Pubkey) -> Self {
        Self {
            program,
            governance_id: 0,
            endpoint_program,
            uln_program,
        }
    }

    pub fn pda(&self) -> GovernancePda {
        GovernancePda::new(self.program, self.governance_id)
    }

    pub fn endpoint_pda(&self) -> EndpointPda {
        EndpointPda::new(self.endpoint_program)
    }

    pub fn uln_pda(&self) -> UlnPda {
        UlnPda::new(self.uln_program)
    }

    /// The governance config PDA; also the OApp identity on the endpoint.
    pub fn id_pda(&self) -> Pubkey {
        self.pda().governance().0
    }

    // ------------------------------------------------------------------
    // Account reads
    // ------------------------------------------------------------------

    pub async fn get_governance(&self, svm: &SvmClient) -> Result<Option<GovernanceAccount>> {
        let (pda, _) = self.pda().governance();
        match svm.get_account_data(&pda).await? {
            Some(data) => Ok(Some(accounts::decode_account(
                accounts::GOVERNANCE_ACCOUNT,
                &data,
            )?)),
            None => Ok(None),
        }
    }

    /// Current peer bytes for a remote EID, or None if never set.
    pub async fn get_remote(&self, svm: &SvmClient, dst_eid: u32) -> Result<Option<[u8; 32]>> {
        let (pda, _) = self.pda().remote(dst_eid);
        match svm.get_account_data(&pda).await? {
            Some(data) => {
                let remote: RemoteAccount =
                    accounts::decode_account(accounts::REMOTE_ACCOUNT, &data)?;
                Ok(Some(remote.address))
            }
            None => Ok(None),
        }
    }

    pub async fn get_lz_receive_types_accounts(
        &self,
        svm: &SvmClient,
    ) -> Result<Option<LzReceiveTypesAccounts>> {
        let (pda, _) = self.pda().lz_receive_types_accounts();
        match svm.get_account_data(&pda).await? {
            Some(data) => Ok(Some(accounts::decode_account(
                accounts::LZ_RECEIVE_TYPES_ACCOUNT,
                &data,
            )?)),
            None => Ok(None),
        }
    }

    /// Currently configured send library for a remote EID, or None if the
    /// library config account was never initialized.
    pub async fn get_send_library(&self, svm: &SvmClient, eid: u32) -> Result<Option<Pubkey>> {
        let oapp = self.id_pda();
        let (pda, _) = self.endpoint_pda().send_library_config(&oapp, eid);
        match svm.get_account_data(&pda).await? {
            Some(data) => {
                let config: SendLibraryConfig =
                    accounts::decode_account(accounts::SEND_LIBRARY_CONFIG_ACCOUNT, &data)?;
                Ok(Some(config.message_lib))
            }
            None => Ok(None),
        }
    }

    pub async fn get_receive_library(&self, svm: &SvmClient, eid: u32) -> Result<Option<Pubkey>> {
        let oapp = self.id_pda();
        let (pda, _) = self.endpoint_pda().receive_library_config(&oapp, eid);
        match svm.get_account_data(&pda).await? {
            Some(data) => {
                let config: ReceiveLibraryConfig =
                    accounts::decode_account(accounts::RECEIVE_LIBRARY_CONFIG_ACCOUNT, &data)?;
                Ok(Some(config.message_lib))
            }
            None => Ok(None),
        }
    }

    pub async fn get_nonce(
        &self,
        svm: &SvmClient,
        eid: u32,
        remote: &[u8; 32],
    ) -> Result<Option<NonceAccount>> {
        let oapp = self.id_pda();
        let (pda, _) = self.endpoint_pda().nonce(&oapp, eid, remote);
        match svm.get_account_data(&pda).await? {
            Some(data) => Ok(Some(accounts::decode_account(
                accounts::NONCE_ACCOUNT,
                &data,
            )?)),
            None => Ok(None),
        }
    }

    /// Receive-side ULN config for a remote EID, or None if the config
    /// account was never initialized.
    pub async fn get_receive_uln_config(
        &self,
        svm: &SvmClient,
        eid: u32,
    ) -> Result<Option<UlnConfig>> {
        let oapp = self.id_pda();
        let (pda, _) = self.uln_pda().receive_config(eid, &oapp);
        match svm.get_account_data(&pda).await? {
            Some(data) => {
                let config: ReceiveConfig =
                    accounts::decode_account(accounts::RECEIVE_CONFIG_ACCOUNT, &data)?;
                Ok(Some(config.uln))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // View calls (simulated read-only instructions)
    // ------------------------------------------------------------------

    /// Plan version and account/ALT lists for execution-plan resolution.
    pub async fn get_types_info(
        &self,
        svm: &SvmClient,
        payer: &Pubkey,
    ) -> Result<(u8, TypesInfo)> {
        let ix = crate::instructions::lz_receive_types_info(&self.pda())?;
        let data = self
            .simulate_view(svm, payer, ix, "lz_receive_types_info")
            .await?;
        plan::decode_types_info(&data)
    }

    /// Execution plan for one inbound packet.
    pub async fn get_execution_plan(
        &self,
        svm: &SvmClient,
        payer: &Pubkey,
        params: &LzReceiveParams,
        extra_accounts: &[Pubkey],
    ) -> Result<ExecutionPlan> {
        let ix = crate::instructions::lz_receive_types_v2(&self.pda(), params, extra_accounts)?;
        let data = self
            .simulate_view(svm, payer, ix, "lz_receive_types_v2")
            .await?;
        ExecutionPlan::decode(&data)
    }

    async fn simulate_view(
        &self,
        svm: &SvmClient,
        payer: &Pubkey,
        ix: Instruction,
        label: &str,
    ) -> Result<Vec<u8>> {
        let blockhash = svm.get_latest_blockhash().await?;
        let message = v0::Message::try_compile(payer, &[ix], &[], blockhash)
            .with_context(|| format!("Failed to compile {} message", label))?;

        let num_signatures = message.header.num_required_signatures as usize;
        let tx = VersionedTransaction {
            signatures: vec![Signature::default(); num_signatures],
            message: VersionedMessage::V0(message),
        };

        tracing::debug!(label, "simulating view call");
        let simulation = svm.simulate_transaction(&tx, false).await?;
        if let Some(err) = simulation.err {
            anyhow::bail!(
                "{} simulation failed: {} (logs: {:?})",
                label,
                err,
                simulation.logs
            );
        }

        simulation
            .return_data
            .with_context(|| format!("No data returned from {}", label))
    }
}
