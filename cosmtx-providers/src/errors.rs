use std::{error::Error, fmt::Debug};
use thiserror::Error;

use crate::JsonRpcError;
use cosmtx_core::{
    prost,
    types::{TxHash, TxHashError},
};

/// An `RpcError` is an abstraction over error types returned by a
/// [`crate::JsonRpcClient`].
///
/// All clients can return [`JsonRpcError`] responses, as
/// well as serde deserialization errors. However, because client errors are
/// typically type-erased via the [`ProviderError`], the error info can be
/// difficult to access. This trait provides convenient access to the
/// underlying error types.
///
/// This trait deals only with behavior that is common to all clients.
/// Client-specific error variants cannot be accessed via this trait.
pub trait RpcError: Error + Debug + Send + Sync {
    /// Access an underlying JSON-RPC error (if any)
    ///
    /// Attempts to access an underlying [`JsonRpcError`]. If the underlying
    /// error is not a JSON-RPC error response, this function will return
    /// `None`.
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// Returns `true` if the underlying error is a JSON-RPC error response
    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    /// Access an underlying `serde_json` error (if any)
    ///
    /// ### Implementor's Note
    ///
    /// When writing a stacked [`crate::JsonRpcClient`] abstraction, be sure to
    /// account for `serde_json` errors at your layer, as well as at lower layers.
    fn as_serde_error(&self) -> Option<&serde_json::Error>;

    /// Returns `true` if the underlying error is a serde_json (de)serialization
    /// error.
    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }
}

/// [`MiddlewareError`] is a companion trait to [`crate::Middleware`]. It
/// describes error behavior that is common to all Middleware errors.
///
/// Like [`crate::Middleware`], it allows moving down through layered errors.
///
/// Like [`RpcError`] it exposes convenient accessors to useful underlying
/// error information.
///
/// The default methods delegate to inner middleware errors, on the assumption
/// that the chain eventually reaches a [`ProviderError`].
pub trait MiddlewareError: Error + Sized + Send + Sync {
    /// The `Inner` type is the next lower middleware layer's error type.
    type Inner: MiddlewareError;

    /// Convert the next lower middleware layer's error to this layer's error
    fn from_err(e: Self::Inner) -> Self;

    /// Attempt to convert this error to the next lower middleware's error.
    /// Conversion fails if the error originates at this middleware layer.
    fn as_inner(&self) -> Option<&Self::Inner>;

    /// Returns `true` if the underlying error stems from a lower middleware
    /// layer
    fn is_inner(&self) -> bool {
        self.as_inner().is_some()
    }

    /// Access an underlying `serde_json` error (if any)
    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        self.as_inner()?.as_serde_error()
    }

    /// Returns `true` if the underlying error is a serde_json (de)serialization
    /// error.
    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }

    /// Attempts to access an underlying [`ProviderError`], usually by
    /// traversing the entire middleware stack.
    fn as_provider_error(&self) -> Option<&ProviderError> {
        self.as_inner()?.as_provider_error()
    }

    /// Convert a [`ProviderError`] to this type, by successively wrapping it
    /// in the error types of all lower middleware
    fn from_provider_err(p: ProviderError) -> Self {
        Self::from_err(Self::Inner::from_provider_err(p))
    }

    /// Access an underlying JSON-RPC error (if any)
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        self.as_inner()?.as_error_response()
    }

    /// Returns `true` if the underlying error is a JSON-RPC error response
    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }
}

#[derive(Debug, Error)]
/// An error thrown when making a call to the provider
pub enum ProviderError {
    /// An internal error in the JSON RPC Client
    #[error("{0}")]
    JsonRpcClientError(Box<dyn crate::RpcError + Send + Sync>),

    /// The queried account does not exist on chain yet
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The account exists but is not a plain `BaseAccount`
    #[error("unsupported account type: {0}")]
    UnsupportedAccountType(String),

    /// The ABCI query was answered with a nonzero code
    #[error("abci query failed with code {code} ({codespace}): {log}")]
    AbciQuery { code: u32, codespace: String, log: String },

    /// The transaction was not found after the configured number of polls
    #[error("transaction {tx_hash} not found after {attempts} attempts")]
    ConfirmationTimeout { tx_hash: TxHash, attempts: usize },

    /// Error in underlying lib `serde_json`
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Error in underlying lib `prost`
    #[error(transparent)]
    ProstDecode(#[from] prost::DecodeError),

    /// A malformed transaction hash
    #[error(transparent)]
    TxHash(#[from] TxHashError),

    /// Error in underlying lib `reqwest`
    #[error(transparent)]
    HTTPError(#[from] reqwest::Error),
}

impl ProviderError {
    /// Returns `true` for node answers that signal a missing resource
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::AccountNotFound(_) => true,
            err => {
                RpcError::as_error_response(err).map(JsonRpcError::is_not_found).unwrap_or(false)
            }
        }
    }
}

impl RpcError for ProviderError {
    fn as_error_response(&self) -> Option<&super::JsonRpcError> {
        if let ProviderError::JsonRpcClientError(err) = self {
            err.as_error_response()
        } else {
            None
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ProviderError::JsonRpcClientError(e) => e.as_serde_error(),
            ProviderError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

// The bottom of every middleware error stack. Keep `as_inner` returning `None` and
// `from_provider_err` returning its argument or traversals never terminate.
impl MiddlewareError for ProviderError {
    type Inner = Self;

    fn as_error_response(&self) -> Option<&super::JsonRpcError> {
        RpcError::as_error_response(self)
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        RpcError::as_serde_error(self)
    }

    fn as_provider_error(&self) -> Option<&ProviderError> {
        Some(self)
    }

    fn from_provider_err(p: ProviderError) -> Self {
        p
    }

    fn from_err(e: Self::Inner) -> Self {
        e
    }

    fn as_inner(&self) -> Option<&Self::Inner> {
        None
    }
}
