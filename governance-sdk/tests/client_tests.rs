//! Unit tests for governance client account reads against a mock RPC.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chain_clients_svm::SvmClient;
use governance_sdk::accounts::{encode_account, RemoteAccount, REMOTE_ACCOUNT};
use governance_sdk::GovernanceClient;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> GovernanceClient {
    GovernanceClient::new(
        Pubkey::from_str("GovAJ1cYLkcV6vbVzvPDDsgoRKBLf6B1YRY85Z6eFzWg").unwrap(),
        Pubkey::from_str(governance_sdk::DEFAULT_ENDPOINT_PROGRAM_ID).unwrap(),
        Pubkey::from_str(governance_sdk::DEFAULT_ULN_PROGRAM_ID).unwrap(),
    )
}

fn account_info_response(data: Option<Vec<u8>>) -> serde_json::Value {
    let value = match data {
        Some(bytes) => json!({
            "data": [STANDARD.encode(bytes), "base64"],
            "executable": false,
            "lamports": 1_000_000u64,
            "owner": "GovAJ1cYLkcV6vbVzvPDDsgoRKBLf6B1YRY85Z6eFzWg",
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

#[tokio::test]
async fn get_remote_returns_stored_peer_bytes() {
    let server = MockServer::start().await;
    let svm = SvmClient::new(&server.uri()).unwrap();

    let mut address = [0u8; 32];
    address[12..].copy_from_slice(&[0xc4u8; 20]);
    let remote = RemoteAccount { address, bump: 254 };
    let data = encode_account(REMOTE_ACCOUNT, &remote).unwrap();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "getAccountInfo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_info_response(Some(data))))
        .mount(&server)
        .await;

    let peer = test_client().get_remote(&svm, 40106).await.unwrap();
    assert_eq!(peer, Some(address));
}

#[tokio::test]
async fn get_remote_absent_account_is_none() {
    let server = MockServer::start().await;
    let svm = SvmClient::new(&server.uri()).unwrap();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "getAccountInfo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_info_response(None)))
        .mount(&server)
        .await;

    let peer = test_client().get_remote(&svm, 40106).await.unwrap();
    assert_eq!(peer, None);
}

#[tokio::test]
async fn get_remote_rejects_wrong_discriminator() {
    let server = MockServer::start().await;
    let svm = SvmClient::new(&server.uri()).unwrap();

    // Valid length, wrong discriminator.
    let data = vec![0u8; 41];

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "getAccountInfo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_info_response(Some(data))))
        .mount(&server)
        .await;

    assert!(test_client().get_remote(&svm, 40106).await.is_err());
}
