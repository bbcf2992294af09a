use crate::{base_account_response, tx_not_found, tx_response};
use cosmtx_core::{
    prost::Message,
    types::{proto, AccountState, Address, BroadcastMode, TxHash},
};
use cosmtx_providers::{Middleware, MockResponse, Provider, ProviderError, RpcError};
use serde_json::json;

const ADDRESS: &str = "cosmos12jz2v5psq5hu4px9ld23uztzek8y0xmzdxuheh";

fn address() -> Address {
    ADDRESS.parse().unwrap()
}

#[tokio::test]
async fn resolves_base_account() {
    let (provider, mock) = Provider::mocked();
    mock.push(base_account_response(ADDRESS, 7, 5)).unwrap();

    let account = provider.get_account(&address()).await.unwrap();
    assert_eq!(account, AccountState::new(7, 5));

    let data = proto::QueryAccountRequest { address: ADDRESS.to_string() }.encode_to_vec();
    mock.assert_request(
        "abci_query",
        json!({
            "path": "/cosmos.auth.v1beta1.Query/Account",
            "data": hex::encode(data),
            "height": "0",
            "prove": false
        }),
    )
    .unwrap();
}

#[tokio::test]
async fn resolves_through_references() {
    let (provider, mock) = Provider::mocked();
    mock.push(base_account_response(ADDRESS, 0, 0)).unwrap();

    // `Middleware` is implemented for references and smart pointers too
    let shared = std::sync::Arc::new(provider);
    let account = Middleware::get_account(&shared, &address()).await.unwrap();
    assert_eq!(account, AccountState::new(0, 0));
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let (provider, mock) = Provider::mocked();
    mock.push(json!({
        "response": {
            "code": 22,
            "log": format!("rpc error: code = NotFound desc = account {ADDRESS} not found: key not found"),
            "value": null,
            "height": "120",
            "codespace": "sdk"
        }
    }))
    .unwrap();

    let err = provider.get_account(&address()).await.unwrap_err();
    assert!(matches!(&err, ProviderError::AccountNotFound(addr) if addr == ADDRESS));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn transport_errors_are_propagated() {
    let (provider, mock) = Provider::mocked();
    mock.push_response(MockResponse::Error(cosmtx_providers::JsonRpcError {
        code: -32603,
        message: "Internal error".to_string(),
        data: Some(json!("abci query failed: connection refused")),
    }));

    let err = provider.get_account(&address()).await.unwrap_err();
    assert!(err.is_error_response());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn broadcasts_sync() {
    let (provider, mock) = Provider::mocked();
    let tx_bytes = vec![0x0a, 0x02, 0x0a, 0x00];
    let hash = TxHash::of(&tx_bytes);
    mock.push(json!({ "code": 0, "data": "", "log": "[]", "codespace": "", "hash": hash.to_string() }))
        .unwrap();

    let receipt = provider.broadcast_tx(&tx_bytes, BroadcastMode::Sync).await.unwrap();
    assert!(receipt.accepted);
    assert_eq!(receipt.tx_hash, hash);
    mock.assert_request("broadcast_tx_sync", json!({ "tx": "CgIKAA==" })).unwrap();
}

#[tokio::test]
async fn broadcast_rejection_is_a_receipt() {
    let (provider, mock) = Provider::mocked();
    let log = "account sequence mismatch, expected 6, got 5: incorrect account sequence";
    mock.push(json!({ "code": 32, "data": "", "log": log, "codespace": "sdk", "hash": "" }))
        .unwrap();

    let receipt = provider.broadcast_tx(b"tx", BroadcastMode::Async).await.unwrap();
    assert!(!receipt.accepted);
    assert_eq!(receipt.code, 32);
    assert_eq!(receipt.raw_log, log);
    assert_eq!(receipt.tx_hash, TxHash::of(b"tx"));
    mock.assert_request("broadcast_tx_async", json!({ "tx": "dHg=" })).unwrap();
}

#[tokio::test]
async fn get_tx_maps_not_found_to_none() {
    let (provider, mock) = Provider::mocked();
    let hash = TxHash::of(b"tx");
    mock.push_response(MockResponse::Error(tx_not_found(&hash)));
    mock.push(tx_response(&hash, 42, 0, "")).unwrap();

    assert!(provider.get_tx(hash).await.unwrap().is_none());
    let result = provider.get_tx(hash).await.unwrap().unwrap();
    assert_eq!(result.tx_hash, hash);
    assert_eq!(result.height, 42);
    assert_eq!(result.gas_used, 58021);

    let params = json!({ "hash": cosmtx_core::types::Bytes::from(*hash.as_bytes()).to_base64(), "prove": false });
    mock.assert_request("tx", params.clone()).unwrap();
    mock.assert_request("tx", params).unwrap();
}
