//! Parameters and results of the CometBFT RPC methods the provider calls.
//!
//! CometBFT renders 64-bit integers as strings, byte fields of ABCI results as base64 and
//! hashes as upper-case hex.
use base64::{engine::general_purpose, Engine};
use cosmtx_core::types::{
    serde_helpers::{deserialize_stringified_i64, deserialize_stringified_u64},
    Bytes, ConfirmationResult, SubmissionReceipt, TxHash, TxHashError,
};
use serde::{Deserialize, Serialize};

/// Params of `abci_query`
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct AbciQueryParams<'a> {
    pub path: &'a str,
    /// hex encoded request message
    pub data: String,
    /// `"0"` queries the latest height
    pub height: String,
    pub prove: bool,
}

impl<'a> AbciQueryParams<'a> {
    pub fn latest(path: &'a str, data: &[u8]) -> Self {
        Self { path, data: hex::encode(data), height: "0".to_string(), prove: false }
    }
}

/// Params of `broadcast_tx_sync` and `broadcast_tx_async`
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct BroadcastTxParams {
    pub tx: String,
}

impl BroadcastTxParams {
    pub fn new(tx_bytes: &[u8]) -> Self {
        Self { tx: general_purpose::STANDARD.encode(tx_bytes) }
    }
}

/// Params of `tx`
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct TxParams {
    pub hash: String,
    pub prove: bool,
}

impl TxParams {
    pub fn new(hash: &TxHash) -> Self {
        Self { hash: general_purpose::STANDARD.encode(hash.as_bytes()), prove: false }
    }
}

/// Result of `abci_query`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AbciQueryResult {
    pub response: AbciQueryResponse,
}

/// The ABCI `ResponseQuery` of an application
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AbciQueryResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub info: String,
    #[serde(default, deserialize_with = "deserialize_stringified_i64")]
    pub index: i64,
    #[serde(default)]
    pub value: Bytes,
    #[serde(default, deserialize_with = "deserialize_stringified_i64")]
    pub height: i64,
    #[serde(default)]
    pub codespace: String,
}

impl AbciQueryResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// The query router reports unknown keys through the log, e.g.
    /// `rpc error: code = NotFound desc = account cosmos1.. not found: key not found`
    pub fn is_not_found(&self) -> bool {
        !self.is_ok() && self.log.contains("not found")
    }
}

/// Result of `broadcast_tx_sync` and `broadcast_tx_async`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastTxResponse {
    #[serde(default)]
    pub code: u32,
    /// hex encoded
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub codespace: String,
    /// hex encoded
    #[serde(default)]
    pub hash: String,
}

impl BroadcastTxResponse {
    /// Converts the node's answer into a receipt. The hash is computed locally when the node
    /// does not echo it.
    pub fn into_receipt(self, tx_bytes: &[u8]) -> Result<SubmissionReceipt, TxHashError> {
        let tx_hash = if self.hash.is_empty() { TxHash::of(tx_bytes) } else { self.hash.parse()? };
        Ok(SubmissionReceipt {
            tx_hash,
            accepted: self.code == 0,
            code: self.code,
            codespace: self.codespace,
            raw_log: self.log,
        })
    }
}

/// Result of `tx`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TxResponse {
    pub hash: TxHash,
    #[serde(deserialize_with = "deserialize_stringified_u64")]
    pub height: u64,
    #[serde(default)]
    pub index: u32,
    pub tx_result: ExecTxResult,
    #[serde(default)]
    pub tx: Bytes,
}

/// The outcome of executing a transaction in a block
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecTxResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub info: String,
    #[serde(default, deserialize_with = "deserialize_stringified_u64")]
    pub gas_wanted: u64,
    #[serde(default, deserialize_with = "deserialize_stringified_u64")]
    pub gas_used: u64,
    #[serde(default)]
    pub codespace: String,
}

impl From<TxResponse> for ConfirmationResult {
    fn from(tx: TxResponse) -> Self {
        let TxResponse { hash, height, tx_result, .. } = tx;
        ConfirmationResult {
            tx_hash: hash,
            code: tx_result.code,
            codespace: tx_result.codespace,
            height,
            gas_used: tx_result.gas_used,
            gas_wanted: tx_result.gas_wanted,
            raw_log: tx_result.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "C7A1D5F6E0B14C0C2F4C3E6F1E4B0D2A9B8C7D6E5F4A3B2C1D0E9F8A7B6C5D4E";

    #[test]
    fn abci_query_params() {
        let params = AbciQueryParams::latest("/cosmos.auth.v1beta1.Query/Account", &[0x0a, 0x01]);
        assert_eq!(
            serde_json::to_value(params).unwrap(),
            serde_json::json!({
                "path": "/cosmos.auth.v1beta1.Query/Account",
                "data": "0a01",
                "height": "0",
                "prove": false,
            })
        );
    }

    #[test]
    fn tx_params_use_base64_hash() {
        let hash: TxHash = HASH.parse().unwrap();
        let params = TxParams::new(&hash);
        assert_eq!(
            general_purpose::STANDARD.decode(params.hash).unwrap(),
            hash.as_bytes().to_vec()
        );
    }

    #[test]
    fn deserializes_abci_query() {
        let res: AbciQueryResult = serde_json::from_str(
            r#"{"response":{"code":0,"log":"","info":"","index":"0","key":null,"value":"CgA=","proofOps":null,"height":"1234","codespace":""}}"#,
        )
        .unwrap();
        assert!(res.response.is_ok());
        assert_eq!(res.response.height, 1234);
        assert_eq!(res.response.value.to_vec(), vec![0x0a, 0x00]);
    }

    #[test]
    fn abci_not_found() {
        let res: AbciQueryResult = serde_json::from_str(
            r#"{"response":{"code":22,"log":"rpc error: code = NotFound desc = account cosmos1xyz not found: key not found","value":null,"height":"88","codespace":"sdk"}}"#,
        )
        .unwrap();
        assert!(res.response.is_not_found());
        assert!(res.response.value.is_empty());
    }

    #[test]
    fn receipt_from_broadcast() {
        let res: BroadcastTxResponse = serde_json::from_str(&format!(
            r#"{{"code":32,"data":"","log":"account sequence mismatch, expected 6, got 5: incorrect account sequence","codespace":"sdk","hash":"{HASH}"}}"#
        ))
        .unwrap();
        let receipt = res.into_receipt(b"ignored").unwrap();
        assert!(!receipt.accepted);
        assert_eq!(receipt.code, 32);
        assert_eq!(receipt.codespace, "sdk");
        assert_eq!(receipt.tx_hash.to_string(), HASH);
    }

    #[test]
    fn receipt_hashes_locally_without_hash() {
        let receipt = BroadcastTxResponse::default().into_receipt(b"raw tx").unwrap();
        assert!(receipt.accepted);
        assert_eq!(receipt.tx_hash, TxHash::of(b"raw tx"));
    }

    #[test]
    fn deserializes_tx() {
        let res: TxResponse = serde_json::from_str(&format!(
            r#"{{"hash":"{HASH}","height":"42","index":0,"tx_result":{{"code":0,"data":"EiYKJC9jb3Ntb3MuYmFuay52MWJldGExLk1zZ1NlbmRSZXNwb25zZQ==","log":"","info":"","gas_wanted":"100000","gas_used":"61234","events":[],"codespace":""}},"tx":"CgA="}}"#
        ))
        .unwrap();
        let confirmation = ConfirmationResult::from(res);
        assert!(confirmation.is_success());
        assert_eq!(confirmation.height, 42);
        assert_eq!(confirmation.gas_wanted, 100_000);
        assert_eq!(confirmation.gas_used, 61_234);
        assert_eq!(confirmation.tx_hash.to_string(), HASH);
    }
}
