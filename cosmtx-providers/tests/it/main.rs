#![allow(clippy::all)]

mod pending;

mod provider;

use cosmtx_core::{
    prost::Message,
    types::{proto, Bytes, TxHash},
};
use serde_json::{json, Value};

/// An `abci_query` answer carrying a `BaseAccount`
pub fn base_account_response(address: &str, account_number: u64, sequence: u64) -> Value {
    let account = proto::BaseAccount {
        address: address.to_string(),
        pub_key: None,
        account_number,
        sequence,
    };
    let response = proto::QueryAccountResponse {
        account: Some(proto::Any {
            type_url: proto::BASE_ACCOUNT_TYPE_URL.to_string(),
            value: account.encode_to_vec(),
        }),
    };
    json!({
        "response": {
            "code": 0,
            "log": "",
            "info": "",
            "index": "0",
            "key": null,
            "value": Bytes::from(response.encode_to_vec()).to_base64(),
            "proofOps": null,
            "height": "120",
            "codespace": ""
        }
    })
}

/// A `tx` answer for an included transaction
pub fn tx_response(hash: &TxHash, height: u64, code: u32, log: &str) -> Value {
    let codespace = if code == 0 { "" } else { "sdk" };
    json!({
        "hash": hash.to_string(),
        "height": height.to_string(),
        "index": 0,
        "tx_result": {
            "code": code,
            "data": null,
            "log": log,
            "info": "",
            "gas_wanted": "100000",
            "gas_used": "58021",
            "events": [],
            "codespace": codespace
        },
        "tx": "CgA="
    })
}

/// The JSON-RPC error CometBFT returns for unknown transaction hashes
pub fn tx_not_found(hash: &TxHash) -> cosmtx_providers::JsonRpcError {
    cosmtx_providers::JsonRpcError {
        code: -32603,
        message: "Internal error".to_string(),
        data: Some(json!(format!("tx ({hash}) not found"))),
    }
}
