//! Helpers for loading a raw secp256k1 private key
use super::Wallet;

use crate::wallet::mnemonic::MnemonicBuilderError;
use coins_bip32::Bip32Error;
use coins_bip39::MnemonicError;
use cosmtx_core::{
    k256::{
        ecdsa::{self, SigningKey},
        SecretKey as K256SecretKey,
    },
    rand::{CryptoRng, Rng},
    types::PublicKey,
};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown by the Wallet module
pub enum WalletError {
    /// Error propagated from the BIP-32 crate
    #[error(transparent)]
    Bip32Error(#[from] Bip32Error),
    /// Error propagated from the BIP-39 crate
    #[error(transparent)]
    Bip39Error(#[from] MnemonicError),
    /// Error propagated from k256's ECDSA module
    #[error(transparent)]
    EcdsaError(#[from] ecdsa::Error),
    /// Error propagated from the hex crate.
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
    /// Error propagated from the mnemonic builder module.
    #[error(transparent)]
    MnemonicBuilderError(#[from] MnemonicBuilderError),
}

impl Wallet {
    /// Creates a new random keypair seeded with the provided RNG
    pub fn new<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        SigningKey::random(rng).into()
    }

    /// Loads a wallet from the 32 byte big endian secret scalar
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        Ok(SigningKey::from_bytes(bytes)?.into())
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        self.signer.to_bytes().eq(&other.signer.to_bytes())
    }
}

impl From<SigningKey> for Wallet {
    fn from(signer: SigningKey) -> Self {
        let public_key = PublicKey::from(signer.verifying_key());
        Self { signer, public_key }
    }
}

impl From<K256SecretKey> for Wallet {
    fn from(key: K256SecretKey) -> Self {
        SigningKey::from(key).into()
    }
}

impl FromStr for Wallet {
    type Err = WalletError;

    /// Parses a hex encoded private key, with or without `0x`
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.strip_prefix("0x").unwrap_or(src);
        let src = hex::decode(src)?;
        Self::from_bytes(&src)
    }
}
