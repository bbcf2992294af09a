#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::type_complexity)]
//! # Clients for interacting with CometBFT nodes
//!
//! This crate provides asynchronous clients for the
//! [CometBFT JSON-RPC](https://docs.cometbft.com/v0.37/rpc/) interface of Cosmos SDK
//! chains. It covers what a transaction sender needs: resolving account numbers and
//! sequences, broadcasting signed transactions and polling for their inclusion.
//!
//! For more documentation on the available calls, refer to the [`Provider`](crate::Provider)
//! struct.
//!
//! # Examples
//!
//! ```no_run
//! use cosmtx_providers::{Http, Middleware, Provider};
//! use std::{convert::TryFrom, time::Duration};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("http://localhost:26657")?
//!     .interval(Duration::from_millis(500));
//!
//! let address = "cosmos12jz2v5psq5hu4px9ld23uztzek8y0xmzdxuheh".parse()?;
//! let account = provider.get_account(&address).await?;
//! println!("account {} at sequence {}", account.account_number, account.sequence);
//! # Ok(())
//! # }
//! ```
mod rpc;
pub use rpc::*;

mod errors;
pub use errors::{MiddlewareError, ProviderError, RpcError};

mod pending_transaction;
pub use pending_transaction::{PendingTransaction, DEFAULT_POLL_ATTEMPTS};

mod middleware;
pub use middleware::Middleware;

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde::{de::DeserializeOwned, Serialize};
use std::{error::Error, fmt::Debug, future::Future, pin::Pin};

/// The default polling interval for filters and pending transactions
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(1000);

// Helper type alias
pub(crate) type PinBoxFut<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by data transports to be used with the CometBFT
/// JSON-RPC provider.
pub trait JsonRpcClient: Debug + Send + Sync {
    /// A JSON-RPC Error
    type Error: Error + Into<ProviderError>;

    /// Sends a request with the provided JSON-RPC and parameters serialized as JSON
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned;
}
