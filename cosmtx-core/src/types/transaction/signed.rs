use super::{
    protocol::{sign_doc, SignerData, SignerInfo},
    TransactionError, UnsignedDocument,
};
use crate::types::{proto, Signature, TxHash};
use prost::Message;

/// A fully signed transaction. Immutable: the only thing left to do is to broadcast it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedDocument {
    document: UnsignedDocument,
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
    signers: Vec<SignerData>,
    signatures: Vec<Signature>,
}

impl SignedDocument {
    pub(crate) fn new(
        document: UnsignedDocument,
        body_bytes: Vec<u8>,
        auth_info_bytes: Vec<u8>,
        signers: Vec<SignerData>,
        signatures: Vec<Signature>,
    ) -> Self {
        Self { document, body_bytes, auth_info_bytes, signers, signatures }
    }

    pub fn document(&self) -> &UnsignedDocument {
        &self.document
    }

    /// One signature per signer info, in the same order
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn signer_infos(&self) -> Vec<SignerInfo> {
        self.signers.iter().map(SignerData::signer_info).collect()
    }

    pub fn signer_data(&self) -> &[SignerData] {
        &self.signers
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    pub fn auth_info_bytes(&self) -> &[u8] {
        &self.auth_info_bytes
    }

    /// The bytes signer `index` signed
    pub fn sign_bytes(&self, index: usize) -> Result<Vec<u8>, TransactionError> {
        self.signers
            .get(index)
            .map(|signer| sign_doc(&self.body_bytes, &self.auth_info_bytes, signer).encode_to_vec())
            .ok_or(TransactionError::SignerIndex(index))
    }

    /// Checks every signature against its signer's sign-bytes
    pub fn verify(&self) -> Result<(), TransactionError> {
        if self.signatures.len() != self.signers.len() {
            return Err(TransactionError::SignatureCountMismatch {
                expected: self.signers.len(),
                got: self.signatures.len(),
            })
        }
        for (index, signature) in self.signatures.iter().enumerate() {
            let sign_bytes = self.sign_bytes(index)?;
            signature
                .verify(&sign_bytes)
                .map_err(|source| TransactionError::InvalidSignature { index, source })?;
        }
        Ok(())
    }

    pub fn to_tx_raw(&self) -> proto::TxRaw {
        proto::TxRaw {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            signatures: self.signatures.iter().map(|s| s.signature.to_vec()).collect(),
        }
    }

    /// The broadcast encoding, `TxRaw`
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_tx_raw().encode_to_vec()
    }

    /// The hash the node will report for this transaction
    pub fn hash(&self) -> TxHash {
        TxHash::of(self.to_bytes())
    }
}
