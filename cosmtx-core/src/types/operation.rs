use super::{coin::merge_coins, proto, transaction::TransactionError, Address, Bytes, Coin};
use prost::Message;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Message types registered by the auth, bank, staking, slashing, mint and consensus
/// modules. The params module defines no messages of its own.
const DEFAULT_TYPE_URLS: &[&str] = &[
    "/cosmos.auth.v1beta1.MsgUpdateParams",
    "/cosmos.bank.v1beta1.MsgSend",
    "/cosmos.bank.v1beta1.MsgMultiSend",
    "/cosmos.bank.v1beta1.MsgUpdateParams",
    "/cosmos.bank.v1beta1.MsgSetSendEnabled",
    "/cosmos.staking.v1beta1.MsgCreateValidator",
    "/cosmos.staking.v1beta1.MsgEditValidator",
    "/cosmos.staking.v1beta1.MsgDelegate",
    "/cosmos.staking.v1beta1.MsgBeginRedelegate",
    "/cosmos.staking.v1beta1.MsgUndelegate",
    "/cosmos.staking.v1beta1.MsgCancelUnbondingDelegation",
    "/cosmos.staking.v1beta1.MsgUpdateParams",
    "/cosmos.slashing.v1beta1.MsgUnjail",
    "/cosmos.slashing.v1beta1.MsgUpdateParams",
    "/cosmos.mint.v1beta1.MsgUpdateParams",
    "/cosmos.consensus.v1.MsgUpdateParams",
];

/// A ledger defined operation: an encoded protobuf message and its type URL.
///
/// The payload is opaque here; only the [`OperationRegistry`] decides whether a type can
/// be put into a transaction body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub type_url: String,
    pub value: Bytes,
}

impl Operation {
    pub fn new(type_url: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self { type_url: type_url.into(), value: value.into() }
    }

    /// Encodes a typed message
    pub fn from_msg<T: TypedOperation>(msg: &T) -> Self {
        Self::new(T::TYPE_URL, msg.encode_value())
    }
}

/// A message with a fixed type URL and a protobuf encoding
pub trait TypedOperation {
    const TYPE_URL: &'static str;

    fn encode_value(&self) -> Vec<u8>;
}

/// `cosmos.bank.v1beta1.MsgSend`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Vec<Coin>,
}

impl MsgSend {
    /// The amount is put into canonical order: zero coins are dropped, the rest sorted by
    /// denomination and repeated denominations added up.
    pub fn new(from: &Address, to: &Address, amount: Vec<Coin>) -> Self {
        Self { from_address: from.clone(), to_address: to.clone(), amount: merge_coins(amount) }
    }
}

impl TypedOperation for MsgSend {
    const TYPE_URL: &'static str = "/cosmos.bank.v1beta1.MsgSend";

    fn encode_value(&self) -> Vec<u8> {
        proto::MsgSend {
            from_address: self.from_address.to_string(),
            to_address: self.to_address.to_string(),
            amount: self.amount.iter().map(Coin::to_proto).collect(),
        }
        .encode_to_vec()
    }
}

/// The set of message types which may be encoded into a transaction body
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationRegistry {
    type_urls: BTreeSet<String>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self { type_urls: DEFAULT_TYPE_URLS.iter().map(|s| s.to_string()).collect() }
    }
}

impl OperationRegistry {
    /// A registry without any known types
    pub fn empty() -> Self {
        Self { type_urls: BTreeSet::new() }
    }

    #[must_use]
    pub fn register(mut self, type_url: impl Into<String>) -> Self {
        self.type_urls.insert(type_url.into());
        self
    }

    #[must_use]
    pub fn register_type<T: TypedOperation>(self) -> Self {
        self.register(T::TYPE_URL)
    }

    pub fn contains(&self, type_url: &str) -> bool {
        self.type_urls.contains(type_url)
    }

    /// Encodes the operation as the `Any` placed into `TxBody.messages`
    pub fn encode(&self, operation: &Operation) -> Result<proto::Any, TransactionError> {
        if !self.contains(&operation.type_url) {
            return Err(TransactionError::UnsupportedType(operation.type_url.clone()))
        }
        Ok(proto::Any { type_url: operation.type_url.clone(), value: operation.value.to_vec() })
    }
}
