use serde::{Deserialize, Serialize};

/// On-chain numbering of an account, as required by round 1 of signing.
///
/// `account_number` is assigned once when the account first appears in state. `sequence`
/// counts the transactions the account has committed and must match the signer's sequence
/// of the next transaction exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountState {
    pub account_number: u64,
    pub sequence: u64,
}

impl AccountState {
    pub fn new(account_number: u64, sequence: u64) -> Self {
        Self { account_number, sequence }
    }
}
