use super::proto;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// An error creating or parsing a [`Coin`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoinError {
    #[error("invalid denomination {0:?}")]
    InvalidDenom(String),
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("negative amount {0:?}")]
    NegativeAmount(String),
}

/// An amount of a single denomination, e.g. `750utest`.
///
/// Amounts are unsigned: a negative coin cannot be represented.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Coin {
    pub amount: u128,
    pub denom: String,
}

impl Coin {
    /// Creates a coin, validating the denomination against the SDK's default rules:
    /// 3 to 128 characters, a leading letter, then letters, digits or `/:._-`.
    pub fn new(amount: u128, denom: impl Into<String>) -> Result<Self, CoinError> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self { amount, denom })
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn to_proto(&self) -> proto::Coin {
        proto::Coin { denom: self.denom.clone(), amount: self.amount.to_string() }
    }
}

pub(crate) fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let mut chars = denom.chars();
    let valid = (3..=128).contains(&denom.len()) &&
        chars.next().map_or(false, |c| c.is_ascii_alphabetic()) &&
        chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if valid {
        Ok(())
    } else {
        Err(CoinError::InvalidDenom(denom.to_string()))
    }
}

/// Drops zero amounts and sorts by denomination, the canonical order of an SDK `Coins` set
pub(crate) fn sort_coins(coins: Vec<Coin>) -> Vec<Coin> {
    let mut coins: Vec<_> = coins.into_iter().filter(|coin| !coin.is_zero()).collect();
    coins.sort_by(|a, b| a.denom.cmp(&b.denom));
    coins
}

/// Like [`sort_coins`], but amounts of a repeated denomination are added up
pub(crate) fn merge_coins(coins: Vec<Coin>) -> Vec<Coin> {
    let mut coins = sort_coins(coins);
    coins.dedup_by(|next, kept| {
        let same = next.denom == kept.denom;
        if same {
            kept.amount = kept.amount.saturating_add(next.amount);
        }
        same
    });
    coins
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl fmt::Debug for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coin({self})")
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    /// Parses `<amount><denom>`, e.g. `750utest`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(CoinError::NegativeAmount(s.to_string()))
        }
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(CoinError::InvalidAmount(s.to_string()))
        }
        let amount = amount.parse().map_err(|_| CoinError::InvalidAmount(s.to_string()))?;
        Coin::new(amount, denom.trim_start())
    }
}

impl Serialize for Coin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
