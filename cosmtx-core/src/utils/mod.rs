mod hash;
pub use hash::{ripemd160, sha256};

pub use hex;

/// Encodes `data` as upper case hex, the way CometBFT renders transaction hashes
pub fn to_upper_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode_upper(data)
}
