//! Legacy (EIP-155) transaction encoding and signing.
//!
//! The admin tasks submit plain legacy transactions; typed (EIP-1559)
//! envelopes are not needed for any supported chain.

use crate::abi::keccak256;
use anyhow::{Context, Result};
use k256::ecdsa::SigningKey;

/// An unsigned legacy transaction.
#[derive(Debug, Clone)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// None for contract creation.
    pub to: Option<[u8; 20]>,
    pub value: u128,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl LegacyTransaction {
    /// Sign with EIP-155 replay protection and return the raw RLP-encoded
    /// transaction ready for `eth_sendRawTransaction`.
    pub fn sign(&self, key: &SigningKey) -> Result<Vec<u8>> {
        let sighash = keccak256(&self.rlp_unsigned());

        let (signature, recovery_id) = key
            .sign_prehash_recoverable(&sighash)
            .context("Failed to sign transaction")?;
        let sig_bytes = signature.to_bytes();

        let v = self.chain_id * 2 + 35 + recovery_id.to_byte() as u64;

        let fields = vec![
            rlp_quantity(self.nonce as u128),
            rlp_quantity(self.gas_price),
            rlp_quantity(self.gas_limit as u128),
            rlp_bytes(self.to.as_ref().map(|a| a.as_slice()).unwrap_or(&[])),
            rlp_quantity(self.value),
            rlp_bytes(&self.data),
            rlp_quantity(v as u128),
            rlp_bytes(trim_leading_zeros(&sig_bytes[..32])),
            rlp_bytes(trim_leading_zeros(&sig_bytes[32..])),
        ];

        Ok(rlp_list(&fields))
    }

    /// RLP payload hashed for signing: the nine-field EIP-155 form with the
    /// chain id in the v slot and empty r/s.
    fn rlp_unsigned(&self) -> Vec<u8> {
        let fields = vec![
            rlp_quantity(self.nonce as u128),
            rlp_quantity(self.gas_price),
            rlp_quantity(self.gas_limit as u128),
            rlp_bytes(self.to.as_ref().map(|a| a.as_slice()).unwrap_or(&[])),
            rlp_quantity(self.value),
            rlp_bytes(&self.data),
            rlp_quantity(self.chain_id as u128),
            rlp_quantity(0),
            rlp_quantity(0),
        ];
        rlp_list(&fields)
    }
}

/// Parse a 0x-prefixed 32-byte hex private key.
pub fn signing_key_from_hex(secret: &str) -> Result<SigningKey> {
    let stripped = secret.strip_prefix("0x").unwrap_or(secret);
    let bytes = hex::decode(stripped).context("Invalid hex private key")?;
    SigningKey::from_slice(&bytes).context("Invalid secp256k1 private key")
}

/// Derive the 20-byte EVM address for a signing key.
pub fn address_from_key(key: &SigningKey) -> [u8; 20] {
    let point = key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

// ============================================================================
// RLP ENCODING
// ============================================================================

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Encode an integer quantity (minimal big-endian representation).
fn rlp_quantity(value: u128) -> Vec<u8> {
    rlp_bytes(trim_leading_zeros(&value.to_be_bytes()))
}

/// Encode a byte string.
fn rlp_bytes(payload: &[u8]) -> Vec<u8> {
    match payload.len() {
        1 if payload[0] < 0x80 => payload.to_vec(),
        len if len <= 55 => {
            let mut out = vec![0x80 + len as u8];
            out.extend_from_slice(payload);
            out
        }
        len => {
            let len_bytes = trim_leading_zeros(&(len as u64).to_be_bytes()).to_vec();
            let mut out = vec![0xb7 + len_bytes.len() as u8];
            out.extend_from_slice(&len_bytes);
            out.extend_from_slice(payload);
            out
        }
    }
}

/// Encode a list of already-encoded items.
fn rlp_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.iter().flatten().copied().collect();
    match payload.len() {
        len if len <= 55 => {
            let mut out = vec![0xc0 + len as u8];
            out.extend_from_slice(&payload);
            out
        }
        len => {
            let len_bytes = trim_leading_zeros(&(len as u64).to_be_bytes()).to_vec();
            let mut out = vec![0xf7 + len_bytes.len() as u8];
            out.extend_from_slice(&len_bytes);
            out.extend_from_slice(&payload);
            out
        }
    }
}
