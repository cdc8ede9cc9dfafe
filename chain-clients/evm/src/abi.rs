//! Minimal ABI encoding helpers.
//!
//! Only the fixed-width word encodings used by the admin tasks are
//! implemented; there is no general-purpose ABI encoder here. Dynamic
//! layouts (offsets, array sections) are composed by callers from these
//! 32-byte words.

use sha3::{Digest, Keccak256};

/// A single 32-byte ABI word.
pub type Word = [u8; 32];

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Four-byte function selector for a canonical signature,
/// e.g. `setRateLimits((uint32,uint256,uint256)[],(uint32,uint256,uint256)[])`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn encode_address(address: &[u8; 20]) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

pub fn encode_u256(value: u128) -> Word {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn encode_bool(value: bool) -> Word {
    encode_u256(value as u128)
}

pub fn encode_bytes32(value: &[u8; 32]) -> Word {
    *value
}

/// Concatenate words into calldata, prefixed with a selector.
pub fn encode_call(selector: [u8; 4], words: &[Word]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + words.len() * 32);
    data.extend_from_slice(&selector);
    for word in words {
        data.extend_from_slice(word);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matches_known_value() {
        // Canonical ERC-20 transfer selector.
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn address_is_left_padded() {
        let address = [0x11u8; 20];
        let word = encode_address(&address);
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &address);
    }

    #[test]
    fn u256_is_big_endian() {
        let word = encode_u256(0x0102);
        assert_eq!(word[31], 0x02);
        assert_eq!(word[30], 0x01);
        assert_eq!(&word[..30], &[0u8; 30]);
    }
}
