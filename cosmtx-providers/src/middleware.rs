use async_trait::async_trait;
use auto_impl::auto_impl;
use cosmtx_core::types::{
    AccountState, Address, BroadcastMode, ConfirmationResult, SubmissionReceipt, TxHash,
};
use std::fmt::Debug;

use crate::{JsonRpcClient, MiddlewareError, Provider, ProviderError};

/// A middleware allows customizing requests send and received from a CometBFT node.
///
/// Writing a middleware is as simple as:
/// 1. implementing the [`inner`](crate::Middleware::inner) method to point to the next layer in
/// the "middleware onion",
/// 2. implementing the [`MiddlewareError`](crate::MiddlewareError) trait on your middleware's
/// error type
/// 3. implementing any of the methods you want to override
///
/// ```
/// use cosmtx_providers::{Middleware, MiddlewareError};
/// use cosmtx_core::types::{AccountState, Address};
/// use thiserror::Error;
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct MyMiddleware<M>(M);
///
/// #[derive(Error, Debug)]
/// pub enum MyError<M: Middleware> {
///     #[error("{0}")]
///     MiddlewareError(M::Error),
///
///     // Add your middleware's specific errors here
/// }
///
/// impl<M: Middleware> MiddlewareError for MyError<M> {
///     type Inner = M::Error;
///
///     fn from_err(src: M::Error) -> MyError<M> {
///         MyError::MiddlewareError(src)
///     }
///
///     fn as_inner(&self) -> Option<&Self::Inner> {
///         match self {
///             MyError::MiddlewareError(e) => Some(e),
///         }
///     }
/// }
///
/// #[async_trait]
/// impl<M> Middleware for MyMiddleware<M>
/// where
///     M: Middleware,
/// {
///     type Error = MyError<M>;
///     type Provider = M::Provider;
///     type Inner = M;
///
///     fn inner(&self) -> &M {
///         &self.0
///     }
///
///     /// Overrides the default `get_account` method to log that it was called,
///     /// before forwarding the call to the next layer.
///     async fn get_account(&self, address: &Address) -> Result<AccountState, Self::Error> {
///         println!("Resolving {address}...");
///         self.inner().get_account(address).await.map_err(MiddlewareError::from_err)
///     }
/// }
/// ```
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait Middleware: Sync + Send + Debug {
    /// Error type returned by most operations
    type Error: MiddlewareError<Inner = <<Self as Middleware>::Inner as Middleware>::Error>;
    /// The JSON-RPC client type at the bottom of the stack
    type Provider: JsonRpcClient;
    /// The next-lower middleware in the middleware stack
    type Inner: Middleware<Provider = Self::Provider>;

    /// Get a reference to the next-lower middleware in the middleware stack
    fn inner(&self) -> &Self::Inner;

    /// Convert a provider error into the associated error type by successively
    /// converting it to every intermediate middleware error type
    fn convert_err(p: ProviderError) -> Self::Error {
        Self::Error::from_provider_err(p)
    }

    /// The HTTP or mock provider at the bottom of the stack
    fn provider(&self) -> &Provider<Self::Provider> {
        self.inner().provider()
    }

    /// Returns the account number and current sequence of `address`.
    ///
    /// Fails with [`ProviderError::AccountNotFound`] for addresses that never received
    /// funds.
    async fn get_account(&self, address: &Address) -> Result<AccountState, Self::Error> {
        self.inner().get_account(address).await.map_err(MiddlewareError::from_err)
    }

    /// Submits encoded `TxRaw` bytes. An accepted receipt only means the node's `CheckTx`
    /// passed, not that the transaction was included in a block.
    async fn broadcast_tx(
        &self,
        tx_bytes: &[u8],
        mode: BroadcastMode,
    ) -> Result<SubmissionReceipt, Self::Error> {
        self.inner().broadcast_tx(tx_bytes, mode).await.map_err(MiddlewareError::from_err)
    }

    /// Looks up an included transaction. `None` while the node does not know the hash.
    async fn get_tx(&self, tx_hash: TxHash) -> Result<Option<ConfirmationResult>, Self::Error> {
        self.inner().get_tx(tx_hash).await.map_err(MiddlewareError::from_err)
    }
}
