//! Address normalization helpers shared by the config layer and tasks.

use anyhow::{Context, Result};

/// Normalize a 0x-prefixed hex address into the 32-byte form used for
/// cross-chain peers. Shorter addresses (e.g. 20-byte EVM addresses) are
/// left-padded with zeros.
pub fn normalize_peer(hex_address: &str) -> Result<[u8; 32]> {
    let stripped = hex_address
        .strip_prefix("0x")
        .context("Peer address must be 0x-prefixed hex")?;
    let bytes = hex::decode(stripped).context("Invalid hex peer address")?;
    if bytes.len() > 32 {
        anyhow::bail!("Peer address too long: {} bytes", bytes.len());
    }

    let mut peer = [0u8; 32];
    peer[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(peer)
}

pub fn peer_to_hex(peer: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(peer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_address_is_left_padded() {
        let peer = normalize_peer("0xc4116303c13512dd1ff416d3a48ebec2f091a5e6").unwrap();
        assert_eq!(&peer[..12], &[0u8; 12]);
        assert_eq!(
            hex::encode(&peer[12..]),
            "c4116303c13512dd1ff416d3a48ebec2f091a5e6"
        );
    }

    #[test]
    fn full_width_address_is_unchanged() {
        let hex32 = format!("0x{}", "ab".repeat(32));
        let peer = normalize_peer(&hex32).unwrap();
        assert_eq!(peer, [0xab; 32]);
    }

    #[test]
    fn overlong_address_is_rejected() {
        let hex33 = format!("0x{}", "ab".repeat(33));
        assert!(normalize_peer(&hex33).is_err());
    }

    #[test]
    fn missing_prefix_is_rejected() {
        assert!(normalize_peer("c4116303c13512dd1ff416d3a48ebec2f091a5e6").is_err());
    }
}
