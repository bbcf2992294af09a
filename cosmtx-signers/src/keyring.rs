use crate::{KeyStore, MnemonicBuilder, Wallet, WalletError};
use async_trait::async_trait;
use coins_bip39::English;
use cosmtx_core::{
    rand::{CryptoRng, Rng},
    types::{transaction::SignerData, Address, AddressError, PublicKey},
};
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
/// Error thrown by the [`LocalKeyring`]
pub enum KeyringError {
    /// No key is stored under the name
    #[error("key {0:?} not found")]
    KeyNotFound(String),
    /// A key is already stored under the name
    #[error("key {0:?} already exists")]
    KeyExists(String),
    /// The stored key is not the one the caller expects to sign with
    #[error("key {key_name:?} is {actual}, expected {expected}")]
    KeyMismatch { key_name: String, expected: PublicKey, actual: PublicKey },
    /// The signature could not be produced
    #[error("signing with key {key_name:?} failed: {source}")]
    Signing {
        key_name: String,
        #[source]
        source: WalletError,
    },
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// An in-memory keyring of named secp256k1 wallets.
///
/// Keys live only as long as the keyring. The keyring can be shared across tasks; wrap it
/// in an `Arc` to hand it to several signers.
#[derive(Default)]
pub struct LocalKeyring {
    keys: RwLock<HashMap<String, Wallet>>,
}

impl LocalKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `wallet` under `key_name`
    pub fn add_wallet(
        &self,
        key_name: impl Into<String>,
        wallet: Wallet,
    ) -> Result<PublicKey, KeyringError> {
        let key_name = key_name.into();
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        if keys.contains_key(&key_name) {
            return Err(KeyringError::KeyExists(key_name))
        }
        let public_key = wallet.public_key();
        keys.insert(key_name, wallet);
        Ok(public_key)
    }

    /// Derives the key at `m/44'/118'/0'/0/0` of an English BIP-39 phrase and stores it
    pub fn import_mnemonic(
        &self,
        key_name: impl Into<String>,
        phrase: &str,
        password: Option<&str>,
    ) -> Result<PublicKey, KeyringError> {
        let mut builder = MnemonicBuilder::<English>::default().phrase(phrase);
        if let Some(password) = password {
            builder = builder.password(password);
        }
        self.add_wallet(key_name, builder.build()?)
    }

    /// Generates a random key and stores it
    pub fn generate<R: Rng + CryptoRng>(
        &self,
        key_name: impl Into<String>,
        rng: &mut R,
    ) -> Result<PublicKey, KeyringError> {
        self.add_wallet(key_name, Wallet::new(rng))
    }

    /// Deletes the key and returns its wallet
    pub fn remove(&self, key_name: &str) -> Result<Wallet, KeyringError> {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key_name)
            .ok_or_else(|| KeyringError::KeyNotFound(key_name.to_string()))
    }

    /// The names of all stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut names: Vec<_> =
            self.keys.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect();
        names.sort();
        names
    }

    /// The address of `key_name` under the given bech32 prefix
    pub fn address(&self, key_name: &str, prefix: &str) -> Result<Address, KeyringError> {
        Ok(self.wallet(key_name)?.address(prefix)?)
    }

    fn wallet(&self, key_name: &str) -> Result<Wallet, KeyringError> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key_name)
            .cloned()
            .ok_or_else(|| KeyringError::KeyNotFound(key_name.to_string()))
    }
}

// do not log the keys
impl std::fmt::Debug for LocalKeyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyring").field("keys", &self.keys()).finish()
    }
}

#[async_trait]
impl KeyStore for LocalKeyring {
    type Error = KeyringError;

    async fn sign(
        &self,
        key_name: &str,
        message: &[u8],
        signer_data: &SignerData,
    ) -> Result<(Vec<u8>, PublicKey), Self::Error> {
        let wallet = self.wallet(key_name)?;
        let public_key = wallet.public_key();
        if public_key != signer_data.public_key {
            return Err(KeyringError::KeyMismatch {
                key_name: key_name.to_string(),
                expected: signer_data.public_key,
                actual: public_key,
            })
        }
        trace!(
            key_name,
            chain_id = %signer_data.chain_id,
            account_number = signer_data.account_number,
            sequence = signer_data.sequence,
            "signing"
        );
        let signature = wallet
            .sign(message)
            .map_err(|source| KeyringError::Signing { key_name: key_name.to_string(), source })?;
        Ok((signature, public_key))
    }

    async fn public_key(&self, key_name: &str) -> Result<PublicKey, Self::Error> {
        Ok(self.wallet(key_name)?.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmtx_core::types::AccountState;

    fn signer_data(public_key: PublicKey) -> SignerData {
        SignerData::new(public_key, AccountState::new(7, 5), "local-1")
    }

    #[tokio::test]
    async fn sign_with_named_key() {
        let keyring = LocalKeyring::new();
        let public_key = keyring.generate("alice", &mut rand::thread_rng()).unwrap();
        assert_eq!(keyring.public_key("alice").await.unwrap(), public_key);

        let (signature, signed_by) =
            keyring.sign("alice", b"sign-bytes", &signer_data(public_key)).await.unwrap();
        assert_eq!(signed_by, public_key);
        public_key.verify(b"sign-bytes", &signature).unwrap();
    }

    #[tokio::test]
    async fn unknown_key() {
        let keyring = LocalKeyring::new();
        let other = Wallet::new(&mut rand::thread_rng()).public_key();
        assert!(matches!(
            keyring.public_key("bob").await,
            Err(KeyringError::KeyNotFound(name)) if name == "bob"
        ));
        assert!(matches!(
            keyring.sign("bob", b"x", &signer_data(other)).await,
            Err(KeyringError::KeyNotFound(_))
        ));
    }

    #[tokio::test]
    async fn refuses_to_sign_for_another_key() {
        let keyring = LocalKeyring::new();
        keyring.generate("alice", &mut rand::thread_rng()).unwrap();
        let other = Wallet::new(&mut rand::thread_rng()).public_key();
        assert!(matches!(
            keyring.sign("alice", b"x", &signer_data(other)).await,
            Err(KeyringError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn manage_keys() {
        let keyring = LocalKeyring::new();
        let wallet: Wallet =
            "0000000000000000000000000000000000000000000000000000000000000001".parse().unwrap();
        keyring.add_wallet("one", wallet.clone()).unwrap();
        assert!(matches!(keyring.add_wallet("one", wallet), Err(KeyringError::KeyExists(_))));
        keyring.generate("two", &mut rand::thread_rng()).unwrap();
        assert_eq!(keyring.keys(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(
            keyring.address("one", "cosmos").unwrap().to_string(),
            "cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c"
        );

        keyring.remove("one").unwrap();
        assert!(matches!(keyring.remove("one"), Err(KeyringError::KeyNotFound(_))));
        assert_eq!(keyring.keys(), vec!["two".to_string()]);
    }

    #[test]
    fn import_mnemonic_is_deterministic() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let a = LocalKeyring::new();
        let b = LocalKeyring::new();
        assert_eq!(
            a.import_mnemonic("k", phrase, None).unwrap(),
            b.import_mnemonic("k", phrase, None).unwrap()
        );
        let c = LocalKeyring::new();
        assert_ne!(
            a.wallet("k").unwrap().public_key(),
            c.import_mnemonic("k", phrase, Some("1234567890")).unwrap()
        );
    }
}
