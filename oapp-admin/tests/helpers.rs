//! Shared test helpers for unit tests
//!
//! Mock Solana JSON-RPC responses and context builders used across the
//! reconciliation and task tests.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use std::str::FromStr;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chain_clients_svm::SvmClient;
use governance_sdk::GovernanceClient;
use oapp_admin::context::AdminContext;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Remote peer address used in the peer reconciliation scenarios
/// (20-byte EVM address, left-padded to 32 bytes on chain).
#[allow(dead_code)]
pub const DUMMY_PEER_HEX: &str = "0xc4116303c13512dd1ff416d3a48ebec2f091a5e6";

/// Remote endpoint id used in the peer reconciliation scenarios.
#[allow(dead_code)]
pub const DUMMY_REMOTE_EID: u32 = 40106;

/// Governance program id (valid base58 pubkey string).
#[allow(dead_code)]
pub const DUMMY_GOVERNANCE_PROGRAM_ID: &str = "GovAJ1cYLkcV6vbVzvPDDsgoRKBLf6B1YRY85Z6eFzWg";

// ============================================================================
// CONTEXT BUILDERS
// ============================================================================

/// Build an admin context pointed at a mock RPC server.
#[allow(dead_code)]
pub fn build_test_context(server_uri: &str, validate_only: bool) -> AdminContext {
    let svm = SvmClient::new(server_uri).unwrap();
    let governance = GovernanceClient::new(
        Pubkey::from_str(DUMMY_GOVERNANCE_PROGRAM_ID).unwrap(),
        Pubkey::from_str(governance_sdk::DEFAULT_ENDPOINT_PROGRAM_ID).unwrap(),
        Pubkey::from_str(governance_sdk::DEFAULT_ULN_PROGRAM_ID).unwrap(),
    );
    AdminContext::new(svm, governance, Keypair::new(), validate_only)
}

// ============================================================================
// MOCK RPC RESPONSES
// ============================================================================

/// getAccountInfo response; `data` is the raw account bytes, None for a
/// missing account.
#[allow(dead_code)]
pub fn account_info_response(data: Option<Vec<u8>>) -> serde_json::Value {
    let value = match data {
        Some(bytes) => json!({
            "data": [STANDARD.encode(bytes), "base64"],
            "executable": false,
            "lamports": 1_000_000u64,
            "owner": DUMMY_GOVERNANCE_PROGRAM_ID,
            "rentEpoch": 0
        }),
        None => serde_json::Value::Null,
    };
    json!({
        "jsonrpc": "2.0",
        "result": { "context": { "slot": 1 }, "value": value },
        "id": 1
    })
}

#[allow(dead_code)]
pub fn blockhash_response() -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "result": {
            "context": { "slot": 1 },
            "value": {
                "blockhash": bs58::encode([7u8; 32]).into_string(),
                "lastValidBlockHeight": 1000u64
            }
        },
        "id": 1
    })
}

#[allow(dead_code)]
pub fn send_transaction_response() -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "result": bs58::encode([9u8; 64]).into_string(),
        "id": 1
    })
}

#[allow(dead_code)]
pub fn signature_status_response() -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "result": {
            "context": { "slot": 1 },
            "value": [{
                "slot": 1,
                "confirmations": serde_json::Value::Null,
                "err": serde_json::Value::Null,
                "confirmationStatus": "confirmed"
            }]
        },
        "id": 1
    })
}

// ============================================================================
// MOCK MOUNTING
// ============================================================================

/// Mount a response for one JSON-RPC method.
#[allow(dead_code)]
pub async fn mount_rpc(server: &MockServer, rpc_method: &str, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

/// Mount a response for one JSON-RPC method with an exact expected call
/// count, verified when the server shuts down.
#[allow(dead_code)]
pub async fn mount_rpc_expect(
    server: &MockServer,
    rpc_method: &str,
    response: serde_json::Value,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(expected_calls)
        .mount(server)
        .await;
}
