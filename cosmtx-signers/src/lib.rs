#![cfg_attr(docsrs, feature(doc_cfg))]
//! Provides a unified interface for signing Cosmos transactions with named keys.
//!
//! Implement the [`KeyStore`] trait to plug in other key storage such as an OS keyring or
//! a remote signer. [`LocalKeyring`] keeps secp256k1 keys in memory and is what the
//! signing middleware uses by default.
//!
//! ```
//! use cosmtx_core::types::{transaction::SignerData, AccountState};
//! use cosmtx_signers::{KeyStore, LocalKeyring};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let keyring = LocalKeyring::new();
//! let public_key = keyring.generate("alice", &mut rand::thread_rng())?;
//!
//! let signer_data = SignerData::new(public_key, AccountState::new(7, 5), "local-1");
//! let (signature, key) = keyring.sign("alice", b"sign-bytes", &signer_data).await?;
//! key.verify(b"sign-bytes", &signature)?;
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{MnemonicBuilder, MnemonicBuilderError, Wallet, WalletError};

mod keyring;
pub use keyring::{KeyringError, LocalKeyring};

/// Re-export the BIP-32 crate so that wordlists can be accessed conveniently.
pub use coins_bip39;

use async_trait::async_trait;
use auto_impl::auto_impl;
use cosmtx_core::types::{transaction::SignerData, PublicKey};
use std::error::Error;

/// A store of named signing keys.
///
/// Both calls are async so that implementations may reach out to hardware or a remote
/// service.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait KeyStore: std::fmt::Debug + Send + Sync {
    type Error: Error + Send + Sync + 'static;

    /// Signs `message` with the key named `key_name`.
    ///
    /// Returns the compact 64 byte signature and the public key which produced it.
    /// `signer_data` describes the signer the caller expects, so that a store can refuse
    /// to sign with a different key.
    async fn sign(
        &self,
        key_name: &str,
        message: &[u8],
        signer_data: &SignerData,
    ) -> Result<(Vec<u8>, PublicKey), Self::Error>;

    /// Returns the public key of `key_name` without signing anything
    async fn public_key(&self, key_name: &str) -> Result<PublicKey, Self::Error>;
}
