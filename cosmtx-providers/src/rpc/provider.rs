use crate::{
    rpc::types::{AbciQueryParams, AbciQueryResult, BroadcastTxParams, TxParams, TxResponse},
    AbciQueryResponse, BroadcastTxResponse, Http as HttpProvider, JsonRpcClient, Middleware,
    MockProvider, PendingTransaction, ProviderError, DEFAULT_POLL_INTERVAL,
};
use async_trait::async_trait;
use cosmtx_core::{
    prost::Message,
    types::{
        proto, AccountState, Address, BroadcastMode, ConfirmationResult, SubmissionReceipt, TxHash,
    },
};
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::{debug, trace};
use tracing_futures::Instrument;
use url::{ParseError, Url};

/// An abstract provider for interacting with the [CometBFT JSON RPC
/// API](https://docs.cometbft.com/v0.37/rpc/). Must be instantiated
/// with a data transport which implements the [`JsonRpcClient`](trait@crate::JsonRpcClient) trait
/// (e.g. [HTTP](crate::Http)).
///
/// # Example
///
/// ```no_run
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use cosmtx_providers::{Middleware, Provider, Http};
/// use cosmtx_core::types::TxHash;
/// use std::convert::TryFrom;
///
/// let provider = Provider::<Http>::try_from("http://localhost:26657")?;
///
/// let hash: TxHash = "C7A1D5F6E0B14C0C2F4C3E6F1E4B0D2A9B8C7D6E5F4A3B2C1D0E9F8A7B6C5D4E".parse()?;
/// if let Some(result) = provider.get_tx(hash).await? {
///     println!("included at height {} with code {}", result.height, result.code);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider<P> {
    inner: P,
    interval: Option<Duration>,
}

impl<P> AsRef<P> for Provider<P> {
    fn as_ref(&self) -> &P {
        &self.inner
    }
}

impl<P: JsonRpcClient> Provider<P> {
    /// Instantiate a new provider with a backend.
    pub fn new(provider: P) -> Self {
        Self { inner: provider, interval: None }
    }

    /// Make an RPC request via the internal connection, and return the result.
    pub async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        let span =
            tracing::trace_span!("rpc", method = method, params = ?serde_json::to_string(&params)?);
        // https://docs.rs/tracing/0.1.22/tracing/span/struct.Span.html#in-asynchronous-code
        let res = async move {
            trace!("tx");
            let res: R = self.inner.request(method, params).await.map_err(Into::into)?;
            trace!(rx = ?serde_json::to_string(&res)?);
            Ok::<_, ProviderError>(res)
        }
        .instrument(span)
        .await?;
        Ok(res)
    }

    /// Runs an ABCI query against the latest height, passing `data` (the protobuf encoded
    /// request) to the application's query router under `path`.
    pub async fn abci_query(
        &self,
        path: &str,
        data: &[u8],
    ) -> Result<AbciQueryResponse, ProviderError> {
        let result: AbciQueryResult =
            self.request("abci_query", AbciQueryParams::latest(path, data)).await?;
        Ok(result.response)
    }

    /// Returns a [`PendingTransaction`] for `tx_hash` using this provider's interval and the
    /// default number of attempts
    pub fn pending_transaction(&self, tx_hash: TxHash) -> PendingTransaction<'_, P> {
        PendingTransaction::new(tx_hash, self)
    }

    /// Polls `tx` for `tx_hash` at most `max_attempts` times, waiting `interval` between two
    /// attempts.
    ///
    /// Resolves as soon as the node knows the transaction, whatever its result code. Fails
    /// with [`ProviderError::ConfirmationTimeout`] once every attempt came back empty.
    pub async fn poll_for_confirmation(
        &self,
        tx_hash: TxHash,
        max_attempts: usize,
        interval: Duration,
    ) -> Result<ConfirmationResult, ProviderError> {
        PendingTransaction::new(tx_hash, self).retries(max_attempts).interval(interval).await
    }

    /// Sets the default polling interval for pending transactions
    /// (default: 1 second)
    pub fn set_interval<T: Into<Duration>>(&mut self, interval: T) -> &mut Self {
        self.interval = Some(interval.into());
        self
    }

    /// Sets the default polling interval for pending transactions
    /// (default: 1 second)
    #[must_use]
    pub fn interval<T: Into<Duration>>(mut self, interval: T) -> Self {
        self.set_interval(interval);
        self
    }

    /// Gets the polling interval which the provider currently uses for pending
    /// transactions (default: 1 second)
    pub fn get_interval(&self) -> Duration {
        self.interval.unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

#[async_trait]
impl<P: JsonRpcClient> Middleware for Provider<P> {
    type Error = ProviderError;
    type Provider = P;
    type Inner = Self;

    fn inner(&self) -> &Self::Inner {
        unreachable!("There is no inner provider here")
    }

    fn provider(&self) -> &Provider<Self::Provider> {
        self
    }

    /// Resolves the account number and sequence through the auth module's `Account` query
    async fn get_account(&self, address: &Address) -> Result<AccountState, ProviderError> {
        let request = proto::QueryAccountRequest { address: address.to_string() };
        let response = self.abci_query(proto::QUERY_ACCOUNT_PATH, &request.encode_to_vec()).await?;

        if response.is_not_found() {
            return Err(ProviderError::AccountNotFound(address.to_string()))
        }
        if !response.is_ok() {
            return Err(ProviderError::AbciQuery {
                code: response.code,
                codespace: response.codespace,
                log: response.log,
            })
        }

        let any = proto::QueryAccountResponse::decode(response.value.as_ref())?
            .account
            .ok_or_else(|| ProviderError::AccountNotFound(address.to_string()))?;
        if any.type_url != proto::BASE_ACCOUNT_TYPE_URL {
            return Err(ProviderError::UnsupportedAccountType(any.type_url))
        }
        let account = proto::BaseAccount::decode(any.value.as_slice())?;

        debug!(
            %address,
            account_number = account.account_number,
            sequence = account.sequence,
            height = response.height,
            "resolved account"
        );
        Ok(AccountState::new(account.account_number, account.sequence))
    }

    async fn broadcast_tx(
        &self,
        tx_bytes: &[u8],
        mode: BroadcastMode,
    ) -> Result<SubmissionReceipt, ProviderError> {
        let response: BroadcastTxResponse =
            self.request(mode.method(), BroadcastTxParams::new(tx_bytes)).await?;
        let receipt = response.into_receipt(tx_bytes)?;
        debug!(
            tx_hash = %receipt.tx_hash,
            code = receipt.code,
            accepted = receipt.accepted,
            "broadcast transaction"
        );
        Ok(receipt)
    }

    async fn get_tx(&self, tx_hash: TxHash) -> Result<Option<ConfirmationResult>, ProviderError> {
        match self.request::<_, TxResponse>("tx", TxParams::new(&tx_hash)).await {
            Ok(tx) => Ok(Some(tx.into())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl Provider<HttpProvider> {
    /// The Url to which requests are made
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// Mutable access to the Url to which requests are made
    pub fn url_mut(&mut self) -> &mut Url {
        self.inner.url_mut()
    }
}

impl Provider<MockProvider> {
    /// Returns a `Provider` instantiated with an internal "mock" transport.
    ///
    /// # Example
    ///
    /// ```
    /// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
    /// use cosmtx_providers::Provider;
    /// // Instantiate the provider
    /// let (provider, mock) = Provider::mocked();
    /// // Push the mock response
    /// mock.push(serde_json::json!({ "response": { "code": 0, "value": "", "height": "7" } }))?;
    /// // Make the call
    /// let response = provider.abci_query("/custom/path", &[1, 2]).await?;
    /// // The response matches
    /// assert_eq!(response.height, 7);
    /// // and the request as well!
    /// mock.assert_request(
    ///     "abci_query",
    ///     serde_json::json!({ "path": "/custom/path", "data": "0102", "height": "0", "prove": false }),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn mocked() -> (Self, MockProvider) {
        let mock = MockProvider::new();
        let mock_clone = mock.clone();
        (Self::new(mock), mock_clone)
    }
}

impl TryFrom<&str> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Ok(Provider::new(HttpProvider::new(Url::parse(src)?)))
    }
}

impl TryFrom<String> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Provider::try_from(src.as_str())
    }
}

impl<'a> TryFrom<&'a String> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: &'a String) -> Result<Self, Self::Error> {
        Provider::try_from(src.as_str())
    }
}
