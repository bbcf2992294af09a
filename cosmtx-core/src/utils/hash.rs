//! Digest helpers used for transaction hashes and address derivation
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of `bytes`
pub fn sha256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    Sha256::digest(bytes.as_ref()).into()
}

/// Computes the RIPEMD-160 digest of `bytes`
pub fn ripemd160<T: AsRef<[u8]>>(bytes: T) -> [u8; 20] {
    Ripemd160::digest(bytes.as_ref()).into()
}
