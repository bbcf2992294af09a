use super::TransactionError;
use crate::types::{
    coin::{sort_coins, validate_denom},
    proto, Address, Coin, Operation,
};
use serde::{Deserialize, Serialize};

/// Longest memo accepted by the default `MaxMemoCharacters` auth parameter. The ante handler
/// compares it against the UTF-8 byte length of the memo.
pub const MAX_MEMO_CHARACTERS: usize = 256;

/// Gas budget used when none is set, the SDK client default
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// An assembled, not yet signed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedDocument {
    pub operations: Vec<Operation>,
    pub memo: String,
    pub gas_limit: u64,
    /// Sorted by denomination, without zero amounts
    pub fee: Vec<Coin>,
    pub signer_address: Address,
    /// Block height after which the transaction is no longer valid, 0 for none
    pub timeout_height: u64,
}

impl UnsignedDocument {
    pub(crate) fn fee_proto(&self) -> proto::Fee {
        proto::Fee {
            amount: self.fee.iter().map(Coin::to_proto).collect(),
            gas_limit: self.gas_limit,
            payer: String::new(),
            granter: String::new(),
        }
    }
}

/// Builds an [`UnsignedDocument`].
///
/// Every setter validates its input and leaves the builder untouched on error.
///
/// ```
/// use cosmtx_core::types::{transaction::DraftBuilder, Coin};
///
/// let mut builder = DraftBuilder::new();
/// assert!(builder.set_gas_limit(0).is_err());
/// assert!(builder.set_operations(vec![]).is_err());
/// // fees cannot be negative
/// assert!("-750utest".parse::<Coin>().is_err());
/// // nothing was set, so there is nothing to finalize
/// assert!(builder.finalize().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct DraftBuilder {
    operations: Vec<Operation>,
    memo: String,
    gas_limit: Option<u64>,
    fee: Vec<Coin>,
    signer_address: Option<Address>,
    timeout_height: u64,
}

impl DraftBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_operations(
        &mut self,
        operations: Vec<Operation>,
    ) -> Result<&mut Self, TransactionError> {
        if operations.is_empty() {
            return Err(invalid("a transaction needs at least one operation"))
        }
        if let Some(index) = operations.iter().position(|op| op.type_url.is_empty()) {
            return Err(invalid(format!("operation {index} has no type url")))
        }
        self.operations = operations;
        Ok(self)
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> Result<&mut Self, TransactionError> {
        let memo = memo.into();
        if memo.len() > MAX_MEMO_CHARACTERS {
            return Err(invalid(format!(
                "memo is {} bytes long, at most {MAX_MEMO_CHARACTERS} are allowed",
                memo.len()
            )))
        }
        self.memo = memo;
        Ok(self)
    }

    pub fn set_gas_limit(&mut self, gas_limit: u64) -> Result<&mut Self, TransactionError> {
        if gas_limit == 0 {
            return Err(invalid("gas limit must be positive"))
        }
        self.gas_limit = Some(gas_limit);
        Ok(self)
    }

    /// Sets the fee. Zero amounts are dropped and the coins are sorted by denomination, as
    /// the SDK requires of a valid `Coins` set.
    pub fn set_fee(&mut self, fee: Vec<Coin>) -> Result<&mut Self, TransactionError> {
        for coin in &fee {
            validate_denom(&coin.denom).map_err(|err| invalid(err.to_string()))?;
        }
        let coins = sort_coins(fee);
        if let Some(pair) = coins.windows(2).find(|pair| pair[0].denom == pair[1].denom) {
            return Err(invalid(format!("duplicate fee denomination {}", pair[0].denom)))
        }
        self.fee = coins;
        Ok(self)
    }

    pub fn set_signer_address(&mut self, address: Address) -> &mut Self {
        self.signer_address = Some(address);
        self
    }

    pub fn set_timeout_height(&mut self, height: u64) -> &mut Self {
        self.timeout_height = height;
        self
    }

    /// Assembles the document. Pure: repeated calls produce equal, independent documents.
    pub fn finalize(&self) -> Result<UnsignedDocument, TransactionError> {
        if self.operations.is_empty() {
            return Err(invalid("operations were never set"))
        }
        let signer_address =
            self.signer_address.clone().ok_or_else(|| invalid("signer address was never set"))?;
        Ok(UnsignedDocument {
            operations: self.operations.clone(),
            memo: self.memo.clone(),
            gas_limit: self.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT),
            fee: self.fee.clone(),
            signer_address,
            timeout_height: self.timeout_height,
        })
    }

    /// Discards everything set so far
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }
}

fn invalid(msg: impl Into<String>) -> TransactionError {
    TransactionError::InvalidArgument(msg.into())
}
