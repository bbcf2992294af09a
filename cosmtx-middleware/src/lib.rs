#![cfg_attr(docsrs, feature(doc_cfg))]
//! # cosmtx Middleware
//!
//! cosmtx uses a middleware-based architecture. You start the middleware stack with
//! a [`Provider`](cosmtx_providers::Provider), and wrap it with additional
//! middleware functionalities that you need.
//!
//! ## Available Middleware
//! - [`Signer`](crate::SignerMiddleware): resolves the signing account, signs documents in
//! `SIGN_MODE_DIRECT` with a named key from a [`KeyStore`](cosmtx_signers::KeyStore) and
//! broadcasts them
//!
//! ## Example of a middleware stack
//!
//! ```no_run
//! use cosmtx_middleware::{SignerConfig, SignerMiddleware};
//! use cosmtx_signers::LocalKeyring;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SignerConfig::default();
//!
//! // Start the stack
//! let provider = config.provider();
//!
//! // Sign documents with a key from an in-memory keyring
//! let keyring = LocalKeyring::new();
//! keyring.generate(config.key_name.as_str(), &mut rand::thread_rng())?;
//! let client = SignerMiddleware::from_config(provider, keyring, &config).await?;
//!
//! // ... do something with the client
//! println!("sending from {}", client.address());
//! # Ok(())
//! # }
//! ```

/// Settings of a signing client, loadable from JSON files
pub mod config;
pub use config::{ConfigError, SignerConfig};

/// The [Signer](crate::SignerMiddleware) runs the two-round signing protocol locally and
/// submits the signed transactions
pub mod signer;
pub use signer::{Round, SignerMiddleware, SignerMiddlewareError};
