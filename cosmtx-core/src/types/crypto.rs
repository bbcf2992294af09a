use super::{
    proto::{self, SECP256K1_PUBKEY_TYPE_URL},
    Address, AddressError, Bytes,
};
use k256::{
    ecdsa::{signature::Verifier, Error as K256SignatureError, Signature as K256Signature, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
};
use prost::Message;
use std::{
    fmt,
    hash::{Hash, Hasher},
};
use thiserror::Error;

/// Length of a compressed secp256k1 public key
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Length of a compact `r || s` secp256k1 signature
pub const SIGNATURE_LENGTH: usize = 64;

/// An error involving a public key or a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Invalid length, compact secp256k1 signatures are 64 bytes
    #[error("invalid signature length, got {0}, expected 64")]
    InvalidLength(usize),
    /// The signature slot still holds the round 1 placeholder
    #[error("signature is missing")]
    Missing,
    /// The public key is not a valid SEC1 encoded secp256k1 point
    #[error("invalid public key")]
    InvalidPublicKey,
    /// The `Any` does not carry a secp256k1 public key
    #[error("unsupported public key type {0}")]
    UnsupportedKeyType(String),
    /// Internal error during parsing or verification
    #[error(transparent)]
    K256Error(#[from] K256SignatureError),
    #[error(transparent)]
    Decode(#[from] prost::DecodeError),
}

/// A secp256k1 public key, as carried in signer infos and `BaseAccount`s.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parses a SEC1 encoded key, compressed or not
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        VerifyingKey::from_sec1_bytes(bytes).map(Self).map_err(|_| SignatureError::InvalidPublicKey)
    }

    /// Decodes a `/cosmos.crypto.secp256k1.PubKey` wrapped in an `Any`
    pub fn from_any(any: &proto::Any) -> Result<Self, SignatureError> {
        if any.type_url != SECP256K1_PUBKEY_TYPE_URL {
            return Err(SignatureError::UnsupportedKeyType(any.type_url.clone()))
        }
        let key = proto::Secp256k1PubKey::decode(any.value.as_slice())?;
        Self::from_bytes(&key.key)
    }

    /// The 33 byte compressed SEC1 encoding
    pub fn to_bytes(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        let point = k256::PublicKey::from(&self.0).to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Wraps the key in the `Any` expected by `SignerInfo.public_key`
    pub fn to_any(&self) -> proto::Any {
        proto::Any {
            type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
            value: proto::Secp256k1PubKey { key: self.to_bytes().to_vec() }.encode_to_vec(),
        }
    }

    /// Derives the account address controlled by this key
    pub fn to_address(&self, prefix: &str) -> Result<Address, AddressError> {
        Address::from_public_key_bytes(prefix, &self.to_bytes())
    }

    /// Verifies a compact signature over `message` (hashed with SHA-256)
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), SignatureError> {
        if signature.is_empty() {
            return Err(SignatureError::Missing)
        }
        if signature.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(signature.len()))
        }
        let signature = K256Signature::try_from(signature)?;
        self.0.verify(message, &signature)?;
        Ok(())
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(key: &VerifyingKey) -> Self {
        Self(*key)
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

/// A signer's public key together with its signature over the sign-bytes.
///
/// Between the two signing rounds `signature` is empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub public_key: PublicKey,
    pub signature: Bytes,
}

impl Signature {
    /// An entry with the real public key and no signature bytes yet
    pub fn placeholder(public_key: PublicKey) -> Self {
        Self { public_key, signature: Bytes::new() }
    }

    pub fn is_placeholder(&self) -> bool {
        self.signature.is_empty()
    }

    /// Verifies this signature over `message`
    pub fn verify(&self, message: &[u8]) -> Result<(), SignatureError> {
        self.public_key.verify(message, &self.signature)
    }
}
