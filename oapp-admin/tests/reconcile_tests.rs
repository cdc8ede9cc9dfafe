//! Unit tests for the idempotent reconciliation steps.
//!
//! Each test runs a reconciliation step against a mock RPC server and
//! asserts both the reported outcome and the exact number of submitted
//! transactions.

use governance_sdk::accounts::{
    encode_account, LzReceiveTypesAccounts, RemoteAccount, LZ_RECEIVE_TYPES_ACCOUNT,
    REMOTE_ACCOUNT,
};
use governance_sdk::uln::UlnConfig;
use governance_sdk::util::normalize_peer;
use solana_sdk::pubkey::Pubkey;
use wiremock::MockServer;

mod helpers;
use helpers::{
    account_info_response, blockhash_response, build_test_context, mount_rpc, mount_rpc_expect,
    send_transaction_response, signature_status_response, DUMMY_PEER_HEX, DUMMY_REMOTE_EID,
};
use oapp_admin::reconcile::{self, Outcome};

fn remote_account_data(peer: [u8; 32]) -> Vec<u8> {
    encode_account(
        REMOTE_ACCOUNT,
        &RemoteAccount {
            address: peer,
            bump: 254,
        },
    )
    .unwrap()
}

// ============================================================================
// PEER RECONCILIATION
// ============================================================================

#[tokio::test]
async fn peer_already_set_sends_no_transaction() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    let peer = normalize_peer(DUMMY_PEER_HEX).unwrap();
    mount_rpc(
        &server,
        "getAccountInfo",
        account_info_response(Some(remote_account_data(peer))),
    )
    .await;
    mount_rpc_expect(&server, "sendTransaction", send_transaction_response(), 0).await;

    let outcome = reconcile::set_remote_peer(&ctx, DUMMY_REMOTE_EID, peer)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::AlreadySet);
    server.verify().await;
}

#[tokio::test]
async fn peer_absent_submits_exactly_one_transaction() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    mount_rpc(&server, "getAccountInfo", account_info_response(None)).await;
    mount_rpc(&server, "getLatestBlockhash", blockhash_response()).await;
    mount_rpc_expect(&server, "sendTransaction", send_transaction_response(), 1).await;
    mount_rpc(&server, "getSignatureStatuses", signature_status_response()).await;

    let peer = normalize_peer(DUMMY_PEER_HEX).unwrap();
    let outcome = reconcile::set_remote_peer(&ctx, DUMMY_REMOTE_EID, peer)
        .await
        .unwrap();

    assert!(outcome.signature().is_some(), "expected a submitted transaction");
    server.verify().await;
}

#[tokio::test]
async fn peer_changed_submits_correcting_transaction() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    let stale = normalize_peer("0x1111111111111111111111111111111111111111").unwrap();
    mount_rpc(
        &server,
        "getAccountInfo",
        account_info_response(Some(remote_account_data(stale))),
    )
    .await;
    mount_rpc(&server, "getLatestBlockhash", blockhash_response()).await;
    mount_rpc_expect(&server, "sendTransaction", send_transaction_response(), 1).await;
    mount_rpc(&server, "getSignatureStatuses", signature_status_response()).await;

    let desired = normalize_peer(DUMMY_PEER_HEX).unwrap();
    let outcome = reconcile::set_remote_peer(&ctx, DUMMY_REMOTE_EID, desired)
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Applied(_)));
    server.verify().await;
}

#[tokio::test]
async fn validate_only_suppresses_transactions() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), true);

    mount_rpc(&server, "getAccountInfo", account_info_response(None)).await;
    mount_rpc_expect(&server, "sendTransaction", send_transaction_response(), 0).await;

    let peer = normalize_peer(DUMMY_PEER_HEX).unwrap();
    let outcome = reconcile::set_remote_peer(&ctx, DUMMY_REMOTE_EID, peer)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::SkippedValidateOnly);
    server.verify().await;
}

// ============================================================================
// LOOKUP TABLE LIST RECONCILIATION
// ============================================================================

#[tokio::test]
async fn lookup_tables_already_set_sends_no_transaction() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    let table = Pubkey::new_unique();
    let data = encode_account(
        LZ_RECEIVE_TYPES_ACCOUNT,
        &LzReceiveTypesAccounts {
            accounts: vec![Pubkey::new_unique()],
            alts: vec![table],
            bump: 253,
        },
    )
    .unwrap();

    mount_rpc(&server, "getAccountInfo", account_info_response(Some(data))).await;
    mount_rpc_expect(&server, "sendTransaction", send_transaction_response(), 0).await;

    let outcome = reconcile::set_lookup_tables(&ctx, vec![table]).await.unwrap();

    assert_eq!(outcome, Outcome::AlreadySet);
    server.verify().await;
}

#[tokio::test]
async fn lookup_table_order_change_is_a_difference() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    let (table_a, table_b) = (Pubkey::new_unique(), Pubkey::new_unique());
    let data = encode_account(
        LZ_RECEIVE_TYPES_ACCOUNT,
        &LzReceiveTypesAccounts {
            accounts: vec![],
            alts: vec![table_a, table_b],
            bump: 253,
        },
    )
    .unwrap();

    mount_rpc(&server, "getAccountInfo", account_info_response(Some(data))).await;
    mount_rpc(&server, "getLatestBlockhash", blockhash_response()).await;
    mount_rpc_expect(&server, "sendTransaction", send_transaction_response(), 1).await;
    mount_rpc(&server, "getSignatureStatuses", signature_status_response()).await;

    // Plan entries reference tables positionally, so order matters.
    let outcome = reconcile::set_lookup_tables(&ctx, vec![table_b, table_a])
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Applied(_)));
    server.verify().await;
}

// ============================================================================
// STATE ERRORS
// ============================================================================

#[tokio::test]
async fn set_receive_config_without_init_is_fatal() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    mount_rpc(&server, "getAccountInfo", account_info_response(None)).await;

    let desired = UlnConfig::new(15, vec![], vec![], 0).unwrap();
    let err = reconcile::set_receive_config(&ctx, DUMMY_REMOTE_EID, &desired)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("No current receive config found"), "{err}");
}

#[tokio::test]
async fn init_governance_skips_when_already_initialized() {
    let server = MockServer::start().await;
    let ctx = build_test_context(&server.uri(), false);

    let data = encode_account(
        governance_sdk::accounts::GOVERNANCE_ACCOUNT,
        &governance_sdk::accounts::GovernanceAccount {
            id: 0,
            admin: ctx.payer(),
            endpoint_program: ctx.governance.endpoint_program,
            bump: 255,
        },
    )
    .unwrap();

    mount_rpc(&server, "getAccountInfo", account_info_response(Some(data))).await;
    mount_rpc_expect(&server, "sendTransaction", send_transaction_response(), 0).await;

    let outcome = reconcile::init_governance(&ctx, vec![]).await.unwrap();

    assert_eq!(outcome, Outcome::AlreadySet);
    server.verify().await;
}
