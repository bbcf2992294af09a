use crate::{tx_not_found, tx_response};
use cosmtx_core::types::TxHash;
use cosmtx_providers::{MockResponse, Provider, ProviderError, DEFAULT_POLL_ATTEMPTS};
use std::time::Duration;
use tracing_test::traced_test;

fn hash() -> TxHash {
    TxHash::of(b"signed tx")
}

#[tokio::test]
async fn times_out_after_exactly_max_attempts() {
    let (provider, mock) = Provider::mocked();
    for _ in 0..3 {
        mock.push_response(MockResponse::Error(tx_not_found(&hash())));
    }

    let err = provider
        .poll_for_confirmation(hash(), 3, Duration::from_millis(1))
        .await
        .unwrap_err();
    match err {
        ProviderError::ConfirmationTimeout { tx_hash, attempts } => {
            assert_eq!(tx_hash, hash());
            assert_eq!(attempts, 3);
        }
        err => panic!("unexpected error {err:?}"),
    }
    assert_eq!(mock.pending_requests(), 3);
}

#[tokio::test]
async fn returns_as_soon_as_found() {
    let (provider, mock) = Provider::mocked();
    mock.push_response(MockResponse::Error(tx_not_found(&hash())));
    mock.push(tx_response(&hash(), 12, 0, "")).unwrap();
    mock.push(tx_response(&hash(), 13, 0, "")).unwrap();

    let result = provider
        .pending_transaction(hash())
        .retries(5)
        .interval(Duration::from_millis(1))
        .await
        .unwrap();
    assert!(result.is_success());
    assert_eq!(result.height, 12);
    assert_eq!(mock.pending_requests(), 2);
    assert_eq!(mock.pending_responses(), 1);
}

#[tokio::test]
async fn failed_execution_is_final() {
    let (provider, mock) = Provider::mocked();
    mock.push(tx_response(&hash(), 30, 5, "insufficient funds")).unwrap();

    let result = provider
        .poll_for_confirmation(hash(), DEFAULT_POLL_ATTEMPTS, Duration::from_millis(1))
        .await
        .unwrap();
    assert!(!result.is_success());
    assert_eq!(result.code, 5);
    assert_eq!(result.raw_log, "insufficient funds");
    assert_eq!(mock.pending_requests(), 1);
}

#[tokio::test]
async fn no_pause_after_last_attempt() {
    let (provider, mock) = Provider::mocked();
    mock.push_response(MockResponse::Error(tx_not_found(&hash())));

    // a single attempt must not wait out the interval before failing
    let poll = provider.poll_for_confirmation(hash(), 1, Duration::from_secs(3600));
    let err = tokio::time::timeout(Duration::from_secs(5), poll).await.unwrap().unwrap_err();
    assert!(matches!(err, ProviderError::ConfirmationTimeout { attempts: 1, .. }));
}

#[tokio::test]
async fn zero_attempts_never_queries() {
    let (provider, mock) = Provider::mocked();
    let err = provider.poll_for_confirmation(hash(), 0, Duration::ZERO).await.unwrap_err();
    assert!(matches!(err, ProviderError::ConfirmationTimeout { attempts: 0, .. }));
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
#[traced_test]
async fn retries_transient_errors() {
    let (provider, mock) = Provider::mocked();
    mock.push_response(MockResponse::Error(cosmtx_providers::JsonRpcError {
        code: -32603,
        message: "Internal error".to_string(),
        data: Some(serde_json::json!("timed out waiting for tx index")),
    }));
    mock.push(tx_response(&hash(), 99, 0, "")).unwrap();

    let pending = provider.pending_transaction(hash()).retries(2).interval(Duration::from_millis(1));
    assert_eq!(pending, hash());
    let result = pending.await.unwrap();
    assert_eq!(result.height, 99);
    assert!(logs_contain("querying transaction failed"));
}
