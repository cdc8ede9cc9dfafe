//! Unit tests for the EVM JSON-RPC client.

use chain_clients_evm::EvmClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_rpc(server: &MockServer, rpc_method: &str, result: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": result,
            "id": 1
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn chain_id_parses_hex_quantity() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_chainId", json!("0xaa36a7")).await;

    let client = EvmClient::new(&server.uri()).unwrap();
    assert_eq!(client.chain_id().await.unwrap(), 11155111);
}

#[tokio::test]
async fn call_returns_raw_bytes() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_call", json!("0x00000000000000000000000000000000000000000000000000000000000000ff")).await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let result = client.call(&[0x11; 20], &[0xab, 0xcd]).await.unwrap();
    assert_eq!(result.len(), 32);
    assert_eq!(result[31], 0xff);
}

#[tokio::test]
async fn rpc_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": { "code": 3, "message": "execution reverted" },
            "id": 1
        })))
        .mount(&server)
        .await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let err = client.chain_id().await.unwrap_err().to_string();
    assert!(err.contains("execution reverted"), "{err}");
}

#[tokio::test]
async fn pending_transaction_has_no_receipt() {
    let server = MockServer::start().await;
    mount_rpc(
        &server,
        "eth_getTransactionReceipt",
        serde_json::Value::Null,
    )
    .await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let receipt = client.get_transaction_receipt("0xpending").await.unwrap();
    assert!(receipt.is_none());
}

#[tokio::test]
async fn reverted_receipt_is_an_error() {
    let server = MockServer::start().await;
    mount_rpc(
        &server,
        "eth_getTransactionReceipt",
        json!({
            "status": "0x0",
            "contractAddress": serde_json::Value::Null,
            "blockNumber": "0x10"
        }),
    )
    .await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let err = client.wait_for_receipt("0xdead").await.unwrap_err().to_string();
    assert!(err.contains("reverted"), "{err}");
}

#[tokio::test]
async fn successful_receipt_is_returned() {
    let server = MockServer::start().await;
    mount_rpc(
        &server,
        "eth_getTransactionReceipt",
        json!({
            "status": "0x1",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "blockNumber": "0x10"
        }),
    )
    .await;

    let client = EvmClient::new(&server.uri()).unwrap();
    let receipt = client.wait_for_receipt("0xbeef").await.unwrap();
    assert!(receipt.succeeded());
    assert_eq!(
        receipt.contract_address.as_deref(),
        Some("0x5fbdb2315678afecb367f032d93f642f64180aa3")
    );
}
