//! Unit tests for the execution-plan resolution flow driven over RPC.
//!
//! The two view calls (`lz_receive_types_info` and `lz_receive_types_v2`)
//! are both transaction simulations; the mocks below answer them in order.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use borsh::BorshSerialize;
use governance_sdk::plan::{
    AccountRef, ExecutionPlan, PlanAccount, PlanInstruction, TypesInfo, SUPPORTED_PLAN_VERSION,
};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod helpers;
use helpers::{blockhash_response, build_test_context, mount_rpc};
use oapp_admin::clear;
use oapp_admin::scan::ScanClient;

fn simulation_response(return_data: &[u8]) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "result": {
            "context": { "slot": 1 },
            "value": {
                "err": serde_json::Value::Null,
                "logs": [],
                "returnData": {
                    "data": [STANDARD.encode(return_data), "base64"],
                    "programId": helpers::DUMMY_GOVERNANCE_PROGRAM_ID
                }
            }
        },
        "id": 1
    })
}

async fn mount_simulation_once(server: &MockServer, return_data: &[u8]) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": "simulateTransaction" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_response(return_data)))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

fn types_info_data(version: u8) -> Vec<u8> {
    let info = TypesInfo {
        accounts: vec![],
        alts: vec![],
    };
    let mut data = vec![version];
    info.serialize(&mut data).unwrap();
    data
}

fn plan_data(extra_account: Pubkey) -> Vec<u8> {
    let plan = ExecutionPlan {
        alts: vec![],
        instructions: vec![PlanInstruction {
            accounts: vec![
                PlanAccount {
                    account: AccountRef::Payer,
                    is_signer: true,
                    is_writable: true,
                },
                PlanAccount {
                    account: AccountRef::Address(extra_account),
                    is_signer: false,
                    is_writable: false,
                },
            ],
        }],
    };
    let mut data = vec![SUPPORTED_PLAN_VERSION];
    plan.serialize(&mut data).unwrap();
    data
}

fn scan_response(destination_status: &str, sealer_status: &str) -> serde_json::Value {
    json!({
        "data": [{
            "pathway": {
                "srcEid": 40106,
                "dstEid": 40168,
                "nonce": 7,
                "sender": { "address": "0xc4116303c13512dd1ff416d3a48ebec2f091a5e6" },
                "receiver": { "address": "9sQYCYwrbYj8xRDYyHTDpZHzXAzBdpRPTZH4aKXshq5q" }
            },
            "guid": format!("0x{}", "ab".repeat(32)),
            "source": { "tx": { "payload": "0x0201020304" } },
            "destination": {
                "status": destination_status,
                "tx": { "txHash": "5ggqKkvcNjHvv8aTFp6aSdC5ZaZAVLKkFF7hvRpSeBMq" }
            },
            "verification": { "sealer": { "status": sealer_status } }
        }]
    })
}

async fn mount_scan(server: &MockServer, response: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/messages/tx/0xabc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

#[tokio::test]
async fn delivered_message_short_circuits() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);
    mount_scan(&server, scan_response("SUCCEEDED", "SUCCEEDED")).await;

    // No Solana RPC mocks are mounted: success proves the task stopped at
    // the delivery check without touching the chain.
    let scan = ScanClient::new(&server.uri()).unwrap();
    clear::run_clear(&ctx, &scan, "0xabc", None).await.unwrap();
}

#[tokio::test]
async fn awaiting_sealer_short_circuits() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);
    mount_scan(&server, scan_response("INFLIGHT", "WAITING")).await;

    let scan = ScanClient::new(&server.uri()).unwrap();
    clear::run_clear(&ctx, &scan, "0xabc", None).await.unwrap();
}

#[tokio::test]
async fn unindexed_message_is_an_error() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);
    mount_scan(&server, json!({ "data": [] })).await;

    let scan = ScanClient::new(&server.uri()).unwrap();
    let err = clear::run_clear(&ctx, &scan, "0xabc", None)
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("No message found yet"), "{err}");
}

#[tokio::test]
async fn resolves_receive_accounts_through_view_calls() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    mount_rpc(&server, "getLatestBlockhash", blockhash_response()).await;
    // First simulation answers lz_receive_types_info, the second the
    // lz_receive_types_v2 plan call.
    mount_simulation_once(&server, &types_info_data(SUPPORTED_PLAN_VERSION)).await;
    mount_simulation_once(&server, &plan_data(Pubkey::new_unique())).await;

    clear::run_get_receive_accounts(
        &ctx,
        40106,
        "0xc4116303c13512dd1ff416d3a48ebec2f091a5e6",
        7,
        &format!("0x{}", "ab".repeat(32)),
        "0x0201",
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn unsupported_plan_version_is_fatal() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    mount_rpc(&server, "getLatestBlockhash", blockhash_response()).await;
    mount_simulation_once(&server, &types_info_data(1)).await;

    let err = clear::run_get_receive_accounts(
        &ctx,
        40106,
        "0xc4116303c13512dd1ff416d3a48ebec2f091a5e6",
        7,
        &format!("0x{}", "ab".repeat(32)),
        "0x0201",
    )
    .await
    .unwrap_err()
    .to_string();

    assert!(err.contains("Invalid lz_receive version"), "{err}");
}

#[tokio::test]
async fn missing_return_data_is_fatal() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    mount_rpc(&server, "getLatestBlockhash", blockhash_response()).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": "simulateTransaction" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": {
                "context": { "slot": 1 },
                "value": {
                    "err": serde_json::Value::Null,
                    "logs": [],
                    "returnData": serde_json::Value::Null
                }
            },
            "id": 1
        })))
        .mount(&server)
        .await;

    let err = clear::run_get_receive_accounts(
        &ctx,
        40106,
        "0xc4116303c13512dd1ff416d3a48ebec2f091a5e6",
        7,
        &format!("0x{}", "ab".repeat(32)),
        "0x0201",
    )
    .await
    .unwrap_err()
    .to_string();

    assert!(err.contains("No data returned"), "{err}");
}
