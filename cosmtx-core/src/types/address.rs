use crate::utils::{ripemd160, sha256};
use bech32::{FromBase32, ToBase32, Variant};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The human readable prefix of Cosmos Hub account addresses
pub const DEFAULT_ADDRESS_PREFIX: &str = "cosmos";

/// An error involving an address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The string is not valid bech32
    #[error(transparent)]
    Bech32(#[from] bech32::Error),
    /// Addresses use the original bech32 checksum, not bech32m
    #[error("expected a bech32 address, got bech32m")]
    UnexpectedVariant,
    /// The prefix is empty or the payload has an unsupported length
    #[error("invalid address: {0}")]
    Invalid(String),
}

/// A bech32 account address.
///
/// An account address is `RIPEMD160(SHA256(pubkey))` of the compressed secp256k1 public
/// key, rendered with a chain specific human readable prefix.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    prefix: String,
    bytes: Vec<u8>,
}

impl Address {
    /// Creates an address from its prefix and raw bytes.
    pub fn new(prefix: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<Self, AddressError> {
        let prefix = prefix.into();
        let bytes = bytes.into();
        if prefix.is_empty() || prefix.chars().any(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit())
        {
            return Err(AddressError::Invalid(format!("bad prefix {prefix:?}")))
        }
        // 20 bytes for accounts, 32 for module / contract accounts
        if bytes.is_empty() || bytes.len() > 255 {
            return Err(AddressError::Invalid(format!("bad length {}", bytes.len())))
        }
        Ok(Self { prefix, bytes })
    }

    /// Derives the address of a compressed secp256k1 public key
    pub fn from_public_key_bytes(prefix: &str, public_key: &[u8]) -> Result<Self, AddressError> {
        Self::new(prefix, ripemd160(sha256(public_key)).to_vec())
    }

    /// The human readable part, e.g. `cosmos`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the same account under a different chain prefix
    pub fn with_prefix(&self, prefix: &str) -> Result<Self, AddressError> {
        Self::new(prefix, self.bytes.clone())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // prefix and length are validated on construction
        let encoded = bech32::encode(&self.prefix, self.bytes.to_base32(), Variant::Bech32)
            .map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, data, variant) = bech32::decode(s)?;
        if variant != Variant::Bech32 {
            return Err(AddressError::UnexpectedVariant)
        }
        Self::new(prefix, Vec::<u8>::from_base32(&data)?)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
