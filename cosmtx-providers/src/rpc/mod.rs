mod provider;
pub use provider::*;

mod transports;
pub use transports::*;

mod types;
pub use types::{AbciQueryResponse, AbciQueryResult, BroadcastTxResponse, ExecTxResult, TxResponse};
