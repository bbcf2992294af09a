use crate::{
    base_account_response, broadcast_response, client, tx_response, Client, CHAIN_ID, KEY_NAME,
};
use cosmtx_core::{
    prost::Message,
    types::{
        proto,
        transaction::{Drafted, SignerData, TransactionError, UnsignedDocument},
        AccountState, Bytes, Coin, MsgSend, Operation, OperationRegistry, TxHash,
    },
};
use cosmtx_middleware::{Round, SignerConfig, SignerMiddleware, SignerMiddlewareError};
use cosmtx_providers::{JsonRpcError, MiddlewareError, MockResponse, Provider, ProviderError};
use cosmtx_signers::KeyringError;
use serde_json::json;
use std::time::Duration;

fn document(client: &Client) -> UnsignedDocument {
    let send =
        MsgSend::new(client.address(), client.address(), vec![Coin::new(1, "utest").unwrap()]);
    let mut draft = client.draft();
    draft
        .set_operations(vec![Operation::from_msg(&send)])
        .unwrap()
        .set_memo("my test memo")
        .unwrap()
        .set_gas_limit(100_000)
        .unwrap()
        .set_fee(vec![Coin::new(750, "utest").unwrap()])
        .unwrap();
    draft.finalize().unwrap()
}

fn tx_not_found(hash: &TxHash) -> MockResponse {
    MockResponse::Error(JsonRpcError {
        code: -32603,
        message: "Internal error".to_string(),
        data: Some(json!(format!("tx ({hash}) not found"))),
    })
}

fn account_query(client: &Client) -> serde_json::Value {
    let data = proto::QueryAccountRequest { address: client.address().to_string() };
    json!({
        "path": "/cosmos.auth.v1beta1.Query/Account",
        "data": hex::encode(data.encode_to_vec()),
        "height": "0",
        "prove": false
    })
}

#[tokio::test]
async fn signs_at_the_resolved_sequence() {
    let (client, mock) = client().await;
    mock.push(base_account_response(&client.address().to_string(), 7, 5)).unwrap();

    let signed = client.sign_document(document(&client)).await.unwrap();
    signed.verify().unwrap();

    let signer = &signed.signer_data()[0];
    assert_eq!((signer.account_number, signer.sequence), (7, 5));
    assert_eq!(signer.chain_id, CHAIN_ID);
    assert_eq!(signer.public_key, client.public_key());

    let tx = proto::TxRaw::decode(signed.to_bytes().as_slice()).unwrap();
    assert_eq!(tx.signatures.len(), 1);
    assert_eq!(tx.signatures[0].len(), 64);

    let body = proto::TxBody::decode(tx.body_bytes.as_slice()).unwrap();
    assert_eq!(body.memo, "my test memo");
    assert_eq!(body.messages.len(), 1);
    assert_eq!(body.messages[0].type_url, "/cosmos.bank.v1beta1.MsgSend");

    let auth_info = proto::AuthInfo::decode(tx.auth_info_bytes.as_slice()).unwrap();
    assert_eq!(auth_info.signer_infos.len(), 1);
    assert_eq!(auth_info.signer_infos[0].sequence, 5);
    let fee = auth_info.fee.unwrap();
    assert_eq!(fee.gas_limit, 100_000);
    assert_eq!(fee.amount, vec![proto::Coin { denom: "utest".into(), amount: "750".into() }]);

    // the signature covers the sign doc of account 7 on local-1
    let sign_doc = proto::SignDoc {
        body_bytes: tx.body_bytes.clone(),
        auth_info_bytes: tx.auth_info_bytes.clone(),
        chain_id: CHAIN_ID.to_string(),
        account_number: 7,
    };
    assert_eq!(signed.sign_bytes(0).unwrap(), sign_doc.encode_to_vec());

    // one key lookup at construction, one in round 1, one signature in round 2
    assert_eq!(client.keystore().public_key_calls(), 2);
    assert_eq!(client.keystore().sign_calls(), 1);
    mock.assert_request("abci_query", account_query(&client)).unwrap();
}

#[tokio::test]
async fn signing_is_deterministic() {
    let (client, mock) = client().await;
    let address = client.address().to_string();
    mock.push(base_account_response(&address, 7, 5)).unwrap();
    mock.push(base_account_response(&address, 7, 5)).unwrap();

    let a = client.sign_document(document(&client)).await.unwrap();
    let b = client.sign_document(document(&client)).await.unwrap();
    assert_eq!(a.to_bytes(), b.to_bytes());
    assert_eq!(a.hash(), b.hash());
}

#[tokio::test]
async fn sequence_changes_the_signed_bytes() {
    let (client, mock) = client().await;
    let address = client.address().to_string();
    mock.push(base_account_response(&address, 7, 5)).unwrap();
    mock.push(base_account_response(&address, 7, 6)).unwrap();

    let a = client.sign_document(document(&client)).await.unwrap();
    let b = client.sign_document(document(&client)).await.unwrap();
    assert_eq!(a.body_bytes(), b.body_bytes());
    assert_ne!(a.auth_info_bytes(), b.auth_info_bytes());
    assert_ne!(a.hash(), b.hash());
}

#[tokio::test]
async fn sends_and_waits_for_inclusion() {
    let (client, mock) = client().await;
    let address = client.address().to_string();

    mock.push(base_account_response(&address, 7, 5)).unwrap();
    let expected = client.sign_document(document(&client)).await.unwrap();
    let hash = expected.hash();

    mock.push(base_account_response(&address, 7, 5)).unwrap();
    mock.push(broadcast_response(&hash, 0, "", "[]")).unwrap();
    mock.push_response(tx_not_found(&hash));
    mock.push(tx_response(&hash, 12, 0)).unwrap();

    let pending = client.send_document(document(&client)).await.unwrap();
    assert_eq!(pending.tx_hash(), hash);
    let confirmation = pending.interval(Duration::from_millis(10)).await.unwrap();
    assert!(confirmation.is_success());
    assert_eq!(confirmation.tx_hash, hash);
    assert_eq!(confirmation.height, 12);
    assert_eq!(confirmation.gas_used, 61203);

    mock.assert_request("abci_query", account_query(&client)).unwrap();
    mock.assert_request("abci_query", account_query(&client)).unwrap();
    mock.assert_request(
        "broadcast_tx_sync",
        json!({ "tx": Bytes::from(expected.to_bytes()).to_base64() }),
    )
    .unwrap();
    let tx_query = json!({ "hash": Bytes::from(*hash.as_bytes()).to_base64(), "prove": false });
    mock.assert_request("tx", tx_query.clone()).unwrap();
    mock.assert_request("tx", tx_query).unwrap();
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn stale_sequence_is_reported() {
    let (client, mock) = client().await;
    let log = "account sequence mismatch, expected 6, got 5: incorrect account sequence";
    mock.push(base_account_response(&client.address().to_string(), 7, 5)).unwrap();
    mock.push(broadcast_response(&TxHash::of(b"tx"), 32, "sdk", log)).unwrap();

    let Err(err) = client.send_document(document(&client)).await else {
        panic!("stale transaction was accepted")
    };
    match err {
        SignerMiddlewareError::StaleSequence { raw_log } => assert_eq!(raw_log, log),
        err => panic!("unexpected error {err}"),
    }
    // account query and broadcast, no polling
    assert_eq!(mock.pending_requests(), 2);
}

#[tokio::test]
async fn rejection_keeps_the_raw_log() {
    let (client, mock) = client().await;
    let log = "spendable balance 0utest is smaller than 751utest: insufficient funds";
    mock.push(base_account_response(&client.address().to_string(), 7, 5)).unwrap();
    mock.push(broadcast_response(&TxHash::of(b"tx"), 5, "sdk", log)).unwrap();

    let Err(err) = client.send_document(document(&client)).await else {
        panic!("rejected transaction was accepted")
    };
    match err {
        SignerMiddlewareError::Rejected { code, codespace, raw_log } => {
            assert_eq!(code, 5);
            assert_eq!(codespace, "sdk");
            assert_eq!(raw_log, log);
        }
        err => panic!("unexpected error {err}"),
    }
}

#[tokio::test]
async fn sequence_code_of_another_codespace_is_a_rejection() {
    let (client, mock) = client().await;
    mock.push(base_account_response(&client.address().to_string(), 7, 5)).unwrap();
    mock.push(broadcast_response(&TxHash::of(b"tx"), 32, "wasm", "")).unwrap();

    let Err(err) = client.send_document(document(&client)).await else {
        panic!("rejected transaction was accepted")
    };
    assert!(matches!(err, SignerMiddlewareError::Rejected { code: 32, .. }));
}

#[tokio::test]
async fn round_one_never_signs() {
    let (client, _mock) = client().await;
    let drafted = Drafted::new(document(&client));

    let err = client.gather_signers(&drafted, None).await.unwrap_err();
    match err {
        SignerMiddlewareError::MissingAccountState(address) => {
            assert_eq!(&address, client.address())
        }
        err => panic!("unexpected error {err}"),
    }

    // the draft survives the failed round
    let gathered = client.gather_signers(&drafted, Some(AccountState::new(7, 5))).await.unwrap();
    assert_eq!(gathered.document(), drafted.document());
    assert_eq!(gathered.chain_id(), CHAIN_ID);
    assert_eq!(gathered.signer_infos()[0].sequence, 5);
    assert_eq!(gathered.signatures().len(), 1);
    assert_eq!(gathered.signatures()[0].public_key, client.public_key());
    assert!(gathered.signatures()[0].signature.is_empty());
    assert_eq!(client.keystore().sign_calls(), 0);
}

#[tokio::test]
async fn unknown_account_is_a_provider_error() {
    let (client, mock) = client().await;
    mock.push(json!({
        "response": {
            "code": 22,
            "log": format!("rpc error: code = NotFound desc = account {} not found: key not found", client.address()),
            "value": null,
            "height": "64",
            "codespace": "sdk"
        }
    }))
    .unwrap();

    let err = client.sign_document(document(&client)).await.unwrap_err();
    assert!(matches!(err, SignerMiddlewareError::AccountResolution { round: Round::One, .. }));
    assert!(err.is_inner());
    assert!(matches!(err.as_provider_error(), Some(ProviderError::AccountNotFound(_))));
    assert_eq!(client.keystore().public_key_calls(), 1);
    assert_eq!(client.keystore().sign_calls(), 0);
}

#[tokio::test]
async fn missing_key_fails_round_one() {
    let (client, _mock) = client().await;
    client.keystore().keyring.remove(KEY_NAME).unwrap();

    let drafted = Drafted::new(document(&client));
    let err = client.gather_signers(&drafted, Some(AccountState::new(7, 5))).await.unwrap_err();
    match err {
        SignerMiddlewareError::KeyStore { round, source } => {
            assert_eq!(round, Round::One);
            assert!(matches!(source, KeyringError::KeyNotFound(ref name) if name == KEY_NAME));
        }
        err => panic!("unexpected error {err}"),
    }
}

#[tokio::test]
async fn missing_key_fails_round_two() {
    let (client, _mock) = client().await;
    let drafted = Drafted::new(document(&client));
    let gathered = client.gather_signers(&drafted, Some(AccountState::new(7, 5))).await.unwrap();

    client.keystore().keyring.remove(KEY_NAME).unwrap();
    let err = client.sign_gathered(&gathered).await.unwrap_err();
    match err {
        SignerMiddlewareError::KeyStore { round, source } => {
            assert_eq!(round, Round::Two);
            assert!(matches!(source, KeyringError::KeyNotFound(_)));
        }
        err => panic!("unexpected error {err}"),
    }
}

#[tokio::test]
async fn replaced_key_is_a_mismatch() {
    let (client, _mock) = client().await;
    client.keystore().keyring.remove(KEY_NAME).unwrap();
    let other = client.keystore().keyring.generate(KEY_NAME, &mut rand::thread_rng()).unwrap();

    let drafted = Drafted::new(document(&client));
    let err = client.gather_signers(&drafted, Some(AccountState::new(7, 5))).await.unwrap_err();
    match err {
        SignerMiddlewareError::KeyMismatch { round, expected, actual, .. } => {
            assert_eq!(round, Round::One);
            assert_eq!(expected, client.public_key());
            assert_eq!(actual, other);
        }
        err => panic!("unexpected error {err}"),
    }
}

#[tokio::test]
async fn foreign_signer_is_a_round_two_mismatch() {
    let (client, _mock) = client().await;
    let other = client.keystore().keyring.generate("bob", &mut rand::thread_rng()).unwrap();
    let account = AccountState::new(7, 5);
    let gathered = Drafted::new(document(&client))
        .gather_signers(vec![
            SignerData::new(client.public_key(), account, CHAIN_ID),
            SignerData::new(other, AccountState::new(8, 0), CHAIN_ID),
        ])
        .unwrap();

    let err = client.sign_gathered(&gathered).await.unwrap_err();
    match err {
        SignerMiddlewareError::KeyMismatch { round, expected, actual, .. } => {
            assert_eq!(round, Round::Two);
            assert_eq!(expected, other);
            assert_eq!(actual, client.public_key());
        }
        err => panic!("unexpected error {err}"),
    }
    // the first signer was signed for before the mismatch
    assert_eq!(client.keystore().sign_calls(), 1);
}

#[tokio::test]
async fn unsupported_operation_fails_round_two() {
    let (client, _mock) = client().await;
    let client = client.with_registry(OperationRegistry::empty());
    let drafted = Drafted::new(document(&client));
    let gathered = client.gather_signers(&drafted, Some(AccountState::new(7, 5))).await.unwrap();

    let err = client.sign_gathered(&gathered).await.unwrap_err();
    match err {
        SignerMiddlewareError::Transaction { round, source } => {
            assert_eq!(round, Round::Two);
            assert!(
                matches!(source, TransactionError::UnsupportedType(ref url) if url == "/cosmos.bank.v1beta1.MsgSend")
            );
        }
        err => panic!("unexpected error {err}"),
    }
    assert_eq!(client.keystore().sign_calls(), 0);
}

#[tokio::test]
async fn config_drives_polling() {
    let keystore = crate::CountingKeyStore::default();
    keystore.keyring.generate("relayer", &mut rand::thread_rng()).unwrap();
    let config: SignerConfig =
        r#"{ "key_name": "relayer", "chain_id": "testnet-3", "poll_attempts": 2, "poll_interval_ms": 5 }"#
            .parse()
            .unwrap();

    // the provider keeps its default interval of one second
    let (provider, mock) = Provider::mocked();
    let client = SignerMiddleware::from_config(provider, keystore, &config).await.unwrap();
    assert_eq!(client.chain_id(), "testnet-3");
    assert_eq!(client.key_name(), "relayer");

    let mut draft = config.draft_builder(client.address().clone()).unwrap();
    let send =
        MsgSend::new(client.address(), client.address(), vec![Coin::new(1, "utest").unwrap()]);
    draft.set_operations(vec![Operation::from_msg(&send)]).unwrap();
    let document = draft.finalize().unwrap();
    assert_eq!(document.gas_limit, 100_000);
    assert_eq!(document.fee, vec![Coin::new(750, "utest").unwrap()]);

    mock.push(base_account_response(&client.address().to_string(), 0, 0)).unwrap();
    mock.push(broadcast_response(&TxHash::of(b"tx"), 0, "", "")).unwrap();
    mock.push_response(tx_not_found(&TxHash::of(b"tx")));
    mock.push_response(tx_not_found(&TxHash::of(b"tx")));

    let pending = client.send_document(document).await.unwrap();
    let result = tokio::time::timeout(Duration::from_millis(500), pending)
        .await
        .expect("polling should use the configured 5ms interval");
    match result.unwrap_err() {
        ProviderError::ConfirmationTimeout { attempts, .. } => assert_eq!(attempts, 2),
        err => panic!("unexpected error {err:?}"),
    }
}
