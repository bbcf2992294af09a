#![cfg_attr(docsrs, feature(doc_cfg))]
//! Cosmos transaction types, canonical encoding and cryptography.
//! _It is recommended to use the `types` and `utils` re-exports of the `cosmtx` crate
//! instead of depending on this crate directly._
//!
//! This library provides the data types a client needs to build, sign and submit a
//! transaction to a Cosmos-SDK chain using `SIGN_MODE_DIRECT`.
//!
//! ## Building and signing a transaction
//!
//! A transaction goes through three typed states. A
//! [`DraftBuilder`](types::transaction::DraftBuilder) produces an
//! [`UnsignedDocument`](types::transaction::UnsignedDocument), which is wrapped in a
//! [`Drafted`](types::transaction::Drafted) state. Attaching the signer metadata (round 1)
//! yields [`SignersGathered`](types::transaction::SignersGathered), and attaching the real
//! signatures over the canonical sign-bytes (round 2) yields a
//! [`SignedDocument`](types::transaction::SignedDocument).
//!
//! ```
//! use cosmtx_core::{
//!     k256::ecdsa::{signature::Signer, Signature as EcdsaSignature, SigningKey},
//!     types::{
//!         transaction::{DraftBuilder, Drafted, SignerData},
//!         AccountState, Coin, MsgSend, Operation, OperationRegistry, PublicKey,
//!     },
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = SigningKey::random(&mut rand::thread_rng());
//! let public_key = PublicKey::from(key.verifying_key());
//! let from = public_key.to_address("cosmos")?;
//!
//! let send = MsgSend::new(&from, &from, vec![Coin::new(1, "utest")?]);
//! let mut builder = DraftBuilder::new();
//! builder
//!     .set_operations(vec![Operation::from_msg(&send)])?
//!     .set_gas_limit(100_000)?
//!     .set_fee(vec![Coin::new(750, "utest")?])?
//!     .set_signer_address(from);
//! let draft = Drafted::new(builder.finalize()?);
//!
//! // round 1: signer metadata with placeholder signatures
//! let account = AccountState { account_number: 7, sequence: 5 };
//! let signer = SignerData::new(public_key, account, "local-1");
//! let gathered = draft.gather_signers(vec![signer])?;
//!
//! // round 2: canonical encoding and real signatures
//! let payload = gathered.encode(&OperationRegistry::default())?;
//! let signature: EcdsaSignature = key.sign(&payload.sign_bytes(0)?);
//! let signed = gathered.attach_signatures(payload, vec![signature.as_ref().to_vec()])?;
//! signed.verify()?;
//! # Ok(())
//! # }
//! ```
pub mod types;

/// Various utilities
pub mod utils;

// re-export rand to avoid potential confusion when there's rand version mismatches
pub use rand;

// re-export k256
pub use k256;

// re-export prost so downstream crates can define additional typed operations
pub use prost;
