#![allow(clippy::all)]

mod signer;

use async_trait::async_trait;
use cosmtx_core::{
    prost::Message,
    types::{proto, transaction::SignerData, Bytes, PublicKey, TxHash},
};
use cosmtx_middleware::SignerMiddleware;
use cosmtx_providers::{MockProvider, Provider};
use cosmtx_signers::{KeyStore, KeyringError, LocalKeyring};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const KEY_NAME: &str = "alice";
pub const CHAIN_ID: &str = "local-1";
const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// A [`LocalKeyring`] which counts how often it is asked for keys and signatures
#[derive(Debug, Default)]
pub struct CountingKeyStore {
    pub keyring: LocalKeyring,
    pub public_key_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
}

impl CountingKeyStore {
    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn public_key_calls(&self) -> usize {
        self.public_key_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyStore for CountingKeyStore {
    type Error = KeyringError;

    async fn sign(
        &self,
        key_name: &str,
        message: &[u8],
        signer_data: &SignerData,
    ) -> Result<(Vec<u8>, PublicKey), Self::Error> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.keyring.sign(key_name, message, signer_data).await
    }

    async fn public_key(&self, key_name: &str) -> Result<PublicKey, Self::Error> {
        self.public_key_calls.fetch_add(1, Ordering::SeqCst);
        self.keyring.public_key(key_name).await
    }
}

pub type Client = SignerMiddleware<Provider<MockProvider>, CountingKeyStore>;

/// A client for `alice` on `local-1`, backed by a mocked node
pub async fn client() -> (Client, MockProvider) {
    let keystore = CountingKeyStore::default();
    keystore.keyring.import_mnemonic(KEY_NAME, PHRASE, None).unwrap();
    let (provider, mock) = Provider::mocked();
    let client = SignerMiddleware::new(provider, keystore, KEY_NAME, CHAIN_ID).await.unwrap();
    (client, mock)
}

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
            "height": "64",
            "codespace": ""
        }
    })
}

/// A `broadcast_tx_sync` answer
pub fn broadcast_response(hash: &TxHash, code: u32, codespace: &str, log: &str) -> Value {
    json!({
        "code": code,
        "data": "",
        "log": log,
        "codespace": codespace,
        "hash": hash.to_string()
    })
}

/// A `tx` answer for an included transaction
pub fn tx_response(hash: &TxHash, height: u64, code: u32) -> Value {
    json!({
        "hash": hash.to_string(),
        "height": height.to_string(),
        "index": 0,
        "tx_result": {
            "code": code,
            "data": null,
            "log": "",
            "info": "",
            "gas_wanted": "100000",
            "gas_used": "61203",
            "events": [],
            "codespace": ""
        },
        "tx": null
    })
}
