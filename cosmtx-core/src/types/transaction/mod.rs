//! Transaction documents and the two-round `SIGN_MODE_DIRECT` signing protocol.
//!
//! The protocol states are distinct types: [`Drafted`] → [`SignersGathered`] →
//! [`SignedDocument`]. Every transition consumes the previous state.
pub mod draft;
pub use draft::{DraftBuilder, UnsignedDocument, MAX_MEMO_CHARACTERS};

pub mod protocol;
pub use protocol::{Drafted, SignPayload, SignerData, SignerInfo, SignersGathered};

pub mod signed;
pub use signed::SignedDocument;

use super::{AddressError, PublicKey, SignatureError};
use thiserror::Error;

/// An error building, encoding or signing a transaction document
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Bad draft input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The operation registry does not know the message type
    #[error("unsupported operation type {0}")]
    UnsupportedType(String),
    #[error("a transaction needs at least one signer")]
    NoSigners,
    #[error("signer {0} appears more than once")]
    DuplicateSigner(PublicKey),
    #[error("signers disagree on the chain id: expected {expected:?}, got {got:?}")]
    ChainIdMismatch { expected: String, got: String },
    #[error("the first signer controls {got}, but the document names {expected}")]
    SignerAddressMismatch { expected: String, got: String },
    #[error("no signer at index {0}")]
    SignerIndex(usize),
    #[error("expected {expected} signatures, got {got}")]
    SignatureCountMismatch { expected: usize, got: usize },
    /// The sign payload was encoded from a different document or signer list
    #[error("sign payload does not belong to this document")]
    PayloadMismatch,
    #[error("signature {index} does not verify: {source}")]
    InvalidSignature {
        index: usize,
        #[source]
        source: SignatureError,
    },
    #[error(transparent)]
    Address(#[from] AddressError),
}
