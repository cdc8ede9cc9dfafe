//! Program-derived address derivation for the governance OApp, the OFT
//! program, and the consumed LayerZero endpoint/ULN accounts.
//!
//! Seed layouts mirror the on-chain programs exactly; a mismatch here means
//! every read targets the wrong account, so the derivers are covered by
//! determinism tests.

use solana_sdk::pubkey::Pubkey;

pub const GOVERNANCE_SEED: &[u8] = b"Governance";
pub const REMOTE_SEED: &[u8] = b"Remote";
pub const LZ_RECEIVE_TYPES_SEED: &[u8] = b"LzReceiveTypes";
pub const CPI_AUTHORITY_SEED: &[u8] = b"CpiAuthority";

pub const OAPP_REGISTRY_SEED: &[u8] = b"OApp";
pub const SEND_LIBRARY_CONFIG_SEED: &[u8] = b"SendLibraryConfig";
pub const RECEIVE_LIBRARY_CONFIG_SEED: &[u8] = b"ReceiveLibraryConfig";
pub const NONCE_SEED: &[u8] = b"Nonce";
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

pub const MESSAGE_LIB_SEED: &[u8] = b"MessageLib";
pub const SEND_CONFIG_SEED: &[u8] = b"SendConfig";
pub const RECEIVE_CONFIG_SEED: &[u8] = b"ReceiveConfig";

pub const PEER_SEED: &[u8] = b"Peer";
pub const PENDING_MESSAGES_SEED: &[u8] = b"PendingMessages";

/// PDA deriver for the governance program.
#[derive(Debug, Clone, Copy)]
pub struct GovernancePda {
    pub program: Pubkey,
    pub governance_id: u8,
}

impl GovernancePda {
    pub fn new(program: Pubkey, governance_id: u8) -> Self {
        Self {
            program,
            governance_id,
        }
    }

    /// The governance config account; doubles as the OApp identity
    /// registered with the endpoint.
    pub fn governance(&self) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                GOVERNANCE_SEED,
                &(self.governance_id as u64).to_be_bytes(),
            ],
            &self.program,
        )
    }

    /// Per-remote-EID peer account.
    pub fn remote(&self, dst_eid: u32) -> (Pubkey, u8) {
        let (governance, _) = self.governance();
        Pubkey::find_program_address(
            &[REMOTE_SEED, governance.as_ref(), &dst_eid.to_be_bytes()],
            &self.program,
        )
    }

    /// Account holding the view-call account list and ALT addresses.
    pub fn lz_receive_types_accounts(&self) -> (Pubkey, u8) {
        let (governance, _) = self.governance();
        Pubkey::find_program_address(
            &[LZ_RECEIVE_TYPES_SEED, governance.as_ref()],
            &self.program,
        )
    }

    /// Authority the governance program signs CPIs with, scoped to the
    /// originating chain and caller.
    pub fn cpi_authority(&self, src_eid: u32, origin_caller: &[u8; 32]) -> (Pubkey, u8) {
        let (governance, _) = self.governance();
        Pubkey::find_program_address(
            &[
                CPI_AUTHORITY_SEED,
                governance.as_ref(),
                &src_eid.to_be_bytes(),
                origin_caller,
            ],
            &self.program,
        )
    }
}

/// PDA deriver for the LayerZero endpoint program.
#[derive(Debug, Clone, Copy)]
pub struct EndpointPda {
    pub program: Pubkey,
}

impl EndpointPda {
    pub fn new(program: Pubkey) -> Self {
        Self { program }
    }

    pub fn oapp_registry(&self, oapp: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[OAPP_REGISTRY_SEED, oapp.as_ref()], &self.program)
    }

    pub fn send_library_config(&self, oapp: &Pubkey, eid: u32) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                SEND_LIBRARY_CONFIG_SEED,
                oapp.as_ref(),
                &eid.to_be_bytes(),
            ],
            &self.program,
        )
    }

    pub fn receive_library_config(&self, oapp: &Pubkey, eid: u32) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                RECEIVE_LIBRARY_CONFIG_SEED,
                oapp.as_ref(),
                &eid.to_be_bytes(),
            ],
            &self.program,
        )
    }

    pub fn nonce(&self, oapp: &Pubkey, eid: u32, remote: &[u8; 32]) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[NONCE_SEED, oapp.as_ref(), &eid.to_be_bytes(), remote],
            &self.program,
        )
    }

    pub fn event_authority(&self) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[EVENT_AUTHORITY_SEED], &self.program)
    }
}

/// PDA deriver for the ULN message library program.
#[derive(Debug, Clone, Copy)]
pub struct UlnPda {
    pub program: Pubkey,
}

impl UlnPda {
    pub fn new(program: Pubkey) -> Self {
        Self { program }
    }

    /// The message library identity registered with the endpoint.
    pub fn message_lib(&self) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[MESSAGE_LIB_SEED], &self.program)
    }

    pub fn send_config(&self, eid: u32, oapp: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[SEND_CONFIG_SEED, &eid.to_be_bytes(), oapp.as_ref()],
            &self.program,
        )
    }

    pub fn receive_config(&self, eid: u32, oapp: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[RECEIVE_CONFIG_SEED, &eid.to_be_bytes(), oapp.as_ref()],
            &self.program,
        )
    }
}

/// PDA deriver for the OFT program.
#[derive(Debug, Clone, Copy)]
pub struct OftPda {
    pub program: Pubkey,
}

impl OftPda {
    pub fn new(program: Pubkey) -> Self {
        Self { program }
    }

    pub fn peer_config(&self, oft_store: &Pubkey, eid: u32) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[PEER_SEED, oft_store.as_ref(), &eid.to_be_bytes()],
            &self.program,
        )
    }

    pub fn pending_messages_store(&self, oft_store: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[PENDING_MESSAGES_SEED, oft_store.as_ref()], &self.program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn test_program() -> Pubkey {
        Pubkey::from_str("GovAJ1cYLkcV6vbVzvPDDsgoRKBLf6B1YRY85Z6eFzWg").unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let pda = GovernancePda::new(test_program(), 0);
        assert_eq!(pda.governance(), pda.governance());
        assert_eq!(pda.remote(40106), pda.remote(40106));
    }

    #[test]
    fn remote_differs_per_eid() {
        let pda = GovernancePda::new(test_program(), 0);
        assert_ne!(pda.remote(40106).0, pda.remote(40161).0);
    }

    #[test]
    fn cpi_authority_scopes_by_caller() {
        let pda = GovernancePda::new(test_program(), 0);
        let mut caller_a = [0u8; 32];
        caller_a[31] = 1;
        let mut caller_b = [0u8; 32];
        caller_b[31] = 2;
        assert_ne!(
            pda.cpi_authority(40106, &caller_a).0,
            pda.cpi_authority(40106, &caller_b).0
        );
    }
}
