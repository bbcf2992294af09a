mod mnemonic;
pub use mnemonic::{MnemonicBuilder, MnemonicBuilderError};

mod private_key;
pub use private_key::WalletError;

use cosmtx_core::{
    k256::ecdsa::{signature::Signer as _, Signature as K256Signature, SigningKey},
    types::{Address, AddressError, PublicKey},
};
use std::fmt;

/// A secp256k1 private-public key pair which can be used for signing `SIGN_MODE_DIRECT`
/// sign-bytes.
///
/// Signatures are 64 byte `r || s` over the SHA-256 digest of the message with a low `s`,
/// which is what the auth module verifies.
///
/// ```
/// use cosmtx_signers::Wallet;
///
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet = Wallet::new(&mut rand::thread_rng());
/// let signature = wallet.sign(b"hello")?;
/// wallet.public_key().verify(b"hello", &signature)?;
/// assert!(wallet.address("cosmos")?.to_string().starts_with("cosmos1"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Wallet {
    /// The Wallet's private Key
    pub(crate) signer: SigningKey,
    /// The wallet's compressed public key
    pub(crate) public_key: PublicKey,
}

impl Wallet {
    /// Signs `message`, returning the compact signature bytes
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        let signature: K256Signature = self.signer.try_sign(message)?;
        Ok(signature.as_ref().to_vec())
    }

    /// Gets the wallet's signer
    pub fn signer(&self) -> &SigningKey {
        &self.signer
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Returns the wallet's address under the given bech32 prefix
    pub fn address(&self, prefix: &str) -> Result<Address, AddressError> {
        self.public_key.to_address(prefix)
    }
}

// do not log the signer
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("public_key", &self.public_key).finish()
    }
}
