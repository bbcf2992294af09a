//! Cosmos data types
pub mod transaction;

pub mod proto;

mod address;
pub use address::{Address, AddressError, DEFAULT_ADDRESS_PREFIX};

mod bytes;
pub use self::bytes::{deserialize_bytes, serialize_bytes, Bytes};

mod coin;
pub use coin::{Coin, CoinError};

mod account;
pub use account::AccountState;

mod crypto;
pub use crypto::{PublicKey, Signature, SignatureError};

mod hash;
pub use hash::{TxHash, TxHashError};

mod operation;
pub use operation::{MsgSend, Operation, OperationRegistry, TypedOperation};

mod receipt;
pub use receipt::{BroadcastMode, ConfirmationResult, SubmissionReceipt};

pub mod serde_helpers;
