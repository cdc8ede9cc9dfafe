//! Enforced executor options encoding (LayerZero type-3 options).

use serde::{Deserialize, Serialize};

const OPTIONS_TYPE_3: u16 = 3;
const EXECUTOR_WORKER_ID: u8 = 1;
const OPTION_TYPE_LZRECEIVE: u8 = 1;

/// One enforced executor option for a message type: the gas to provide to
/// `lz_receive` on the destination, plus optional native value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnforcedOption {
    pub msg_type: u8,
    pub gas: u128,
    #[serde(default)]
    pub value: u128,
}

/// Encode enforced options into the type-3 wire format:
/// `u16 type || (worker_id u8, option_len u16, option_type u8, params)*`.
/// The value field is only serialized when non-zero, matching the executor's
/// decoder.
pub fn encode_options(options: &[EnforcedOption]) -> Vec<u8> {
    let mut out = OPTIONS_TYPE_3.to_be_bytes().to_vec();

    for option in options {
        let mut params = option.gas.to_be_bytes().to_vec();
        if option.value > 0 {
            params.extend_from_slice(&option.value.to_be_bytes());
        }

        out.push(EXECUTOR_WORKER_ID);
        out.extend_from_slice(&(1 + params.len() as u16).to_be_bytes());
        out.push(OPTION_TYPE_LZRECEIVE);
        out.extend_from_slice(&params);
    }

    out
}
