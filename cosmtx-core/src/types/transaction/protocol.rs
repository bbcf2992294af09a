//! The first two states of the signing protocol and the transitions between them.
//!
//! Round 1 ([`Drafted::gather_signers`]) fixes who signs and at which sequence, attaching
//! placeholder signatures. Round 2 first encodes the canonical sign-bytes
//! ([`SignersGathered::encode`]) and then swaps the placeholders for real signatures
//! ([`SignersGathered::attach_signatures`]).
use super::{SignedDocument, TransactionError, UnsignedDocument};
use crate::types::{proto, AccountState, OperationRegistry, PublicKey, Signature};
use prost::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a key store learns about the signer when asked to sign
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerData {
    pub account_number: u64,
    pub sequence: u64,
    pub chain_id: String,
    pub public_key: PublicKey,
}

impl SignerData {
    pub fn new(public_key: PublicKey, account: AccountState, chain_id: impl Into<String>) -> Self {
        Self {
            account_number: account.account_number,
            sequence: account.sequence,
            chain_id: chain_id.into(),
            public_key,
        }
    }

    pub fn signer_info(&self) -> SignerInfo {
        SignerInfo { public_key: self.public_key, sequence: self.sequence }
    }
}

/// A signer entry of the auth info: who signs, at which sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SignerInfo {
    pub public_key: PublicKey,
    pub sequence: u64,
}

impl SignerInfo {
    pub fn to_proto(&self) -> proto::SignerInfo {
        proto::SignerInfo {
            public_key: Some(self.public_key.to_any()),
            mode_info: Some(proto::ModeInfo::direct()),
            sequence: self.sequence,
        }
    }
}

/// A finalized document waiting for its signers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drafted {
    document: UnsignedDocument,
}

impl Drafted {
    pub fn new(document: UnsignedDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &UnsignedDocument {
        &self.document
    }

    pub fn into_document(self) -> UnsignedDocument {
        self.document
    }

    /// Round 1: records the signers with placeholder signatures.
    ///
    /// No signature bytes are produced. The first signer must control the document's
    /// signer address, every signer must appear once and all must agree on the chain id.
    pub fn gather_signers(
        self,
        signers: Vec<SignerData>,
    ) -> Result<SignersGathered, TransactionError> {
        validate_signers(&self.document, &signers)?;
        let signatures = signers.iter().map(|s| Signature::placeholder(s.public_key)).collect();
        Ok(SignersGathered { document: self.document, signers, signatures })
    }
}

fn validate_signers(
    document: &UnsignedDocument,
    signers: &[SignerData],
) -> Result<(), TransactionError> {
    let first = signers.first().ok_or(TransactionError::NoSigners)?;
    if first.chain_id.is_empty() {
        return Err(TransactionError::InvalidArgument("chain id must not be empty".to_string()))
    }

    let mut seen = HashSet::with_capacity(signers.len());
    for signer in signers {
        if signer.chain_id != first.chain_id {
            return Err(TransactionError::ChainIdMismatch {
                expected: first.chain_id.clone(),
                got: signer.chain_id.clone(),
            })
        }
        if !seen.insert(signer.public_key) {
            return Err(TransactionError::DuplicateSigner(signer.public_key))
        }
    }

    let address = first.public_key.to_address(document.signer_address.prefix())?;
    if address != document.signer_address {
        return Err(TransactionError::SignerAddressMismatch {
            expected: document.signer_address.to_string(),
            got: address.to_string(),
        })
    }
    Ok(())
}

/// A document whose signer infos are fixed; every signature is still a placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignersGathered {
    document: UnsignedDocument,
    signers: Vec<SignerData>,
    signatures: Vec<Signature>,
}

impl SignersGathered {
    pub fn document(&self) -> &UnsignedDocument {
        &self.document
    }

    pub fn signer_data(&self) -> &[SignerData] {
        &self.signers
    }

    pub fn signer_infos(&self) -> Vec<SignerInfo> {
        self.signers.iter().map(SignerData::signer_info).collect()
    }

    /// The placeholder entries, one per signer info
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn chain_id(&self) -> &str {
        // gather_signers rejects an empty signer list
        self.signers.first().map(|s| s.chain_id.as_str()).unwrap_or_default()
    }

    /// Round 2, first half: the canonical `SIGN_MODE_DIRECT` encoding.
    ///
    /// `body_bytes` and `auth_info_bytes` are computed once and shared by all signers, each
    /// of which signs its own `SignDoc` (which differs only in the account number).
    pub fn encode(&self, registry: &OperationRegistry) -> Result<SignPayload, TransactionError> {
        let messages = self
            .document
            .operations
            .iter()
            .map(|op| registry.encode(op))
            .collect::<Result<Vec<_>, _>>()?;
        let body = proto::TxBody {
            messages,
            memo: self.document.memo.clone(),
            timeout_height: self.document.timeout_height,
        };
        let body_bytes = body.encode_to_vec();
        let auth_info_bytes = auth_info(&self.document, &self.signers).encode_to_vec();
        let sign_docs =
            self.signers.iter().map(|s| sign_doc(&body_bytes, &auth_info_bytes, s)).collect();

        Ok(SignPayload {
            body_bytes,
            auth_info_bytes,
            sign_docs,
            document: self.document.clone(),
            signers: self.signers.clone(),
        })
    }

    /// Round 2, second half: replaces the placeholders with real signatures.
    ///
    /// `signatures` must hold one compact secp256k1 signature per signer, in signer info
    /// order, each over the corresponding [`SignPayload::sign_bytes`].
    pub fn attach_signatures(
        self,
        payload: SignPayload,
        signatures: Vec<Vec<u8>>,
    ) -> Result<SignedDocument, TransactionError> {
        if payload.document != self.document || payload.signers != self.signers {
            return Err(TransactionError::PayloadMismatch)
        }
        if signatures.len() != self.signatures.len() {
            return Err(TransactionError::SignatureCountMismatch {
                expected: self.signatures.len(),
                got: signatures.len(),
            })
        }

        let signatures = self
            .signatures
            .into_iter()
            .zip(signatures)
            .zip(&payload.sign_docs)
            .enumerate()
            .map(|(index, ((placeholder, bytes), doc))| {
                let entry = Signature { public_key: placeholder.public_key, signature: bytes.into() };
                entry
                    .verify(&doc.encode_to_vec())
                    .map_err(|source| TransactionError::InvalidSignature { index, source })?;
                Ok(entry)
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;

        Ok(SignedDocument::new(
            self.document,
            payload.body_bytes,
            payload.auth_info_bytes,
            self.signers,
            signatures,
        ))
    }
}

/// The canonical bytes of a [`SignersGathered`] document, ready to be signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignPayload {
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
    sign_docs: Vec<proto::SignDoc>,
    document: UnsignedDocument,
    signers: Vec<SignerData>,
}

impl SignPayload {
    pub fn body_bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    pub fn auth_info_bytes(&self) -> &[u8] {
        &self.auth_info_bytes
    }

    pub fn sign_doc(&self, index: usize) -> Option<&proto::SignDoc> {
        self.sign_docs.get(index)
    }

    pub fn signer_data(&self, index: usize) -> Option<&SignerData> {
        self.signers.get(index)
    }

    /// The exact bytes signer `index` must sign
    pub fn sign_bytes(&self, index: usize) -> Result<Vec<u8>, TransactionError> {
        self.sign_doc(index)
            .map(Message::encode_to_vec)
            .ok_or(TransactionError::SignerIndex(index))
    }

    pub fn len(&self) -> usize {
        self.sign_docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sign_docs.is_empty()
    }
}

pub(crate) fn auth_info(document: &UnsignedDocument, signers: &[SignerData]) -> proto::AuthInfo {
    proto::AuthInfo {
        signer_infos: signers.iter().map(|s| s.signer_info().to_proto()).collect(),
        fee: Some(document.fee_proto()),
    }
}

pub(crate) fn sign_doc(
    body_bytes: &[u8],
    auth_info_bytes: &[u8],
    signer: &SignerData,
) -> proto::SignDoc {
    proto::SignDoc {
        body_bytes: body_bytes.to_vec(),
        auth_info_bytes: auth_info_bytes.to_vec(),
        chain_id: signer.chain_id.clone(),
        account_number: signer.account_number,
    }
}
