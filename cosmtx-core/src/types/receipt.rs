use super::TxHash;
use serde::{Deserialize, Serialize};

/// How long a node waits before answering a broadcast
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Wait for CheckTx, not for block inclusion
    #[default]
    Sync,
    /// Return as soon as the transaction is received
    Async,
}

impl BroadcastMode {
    /// The CometBFT RPC method implementing this mode
    pub fn method(&self) -> &'static str {
        match self {
            BroadcastMode::Sync => "broadcast_tx_sync",
            BroadcastMode::Async => "broadcast_tx_async",
        }
    }
}

/// The node's answer to a broadcast. Acceptance only means local validation passed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub tx_hash: TxHash,
    pub accepted: bool,
    pub code: u32,
    pub codespace: String,
    pub raw_log: String,
}

/// The outcome of a transaction included in a block.
///
/// A nonzero `code` is a final failure, not a reason to keep polling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub tx_hash: TxHash,
    pub code: u32,
    pub codespace: String,
    pub height: u64,
    pub gas_used: u64,
    pub gas_wanted: u64,
    pub raw_log: String,
}

impl ConfirmationResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}
