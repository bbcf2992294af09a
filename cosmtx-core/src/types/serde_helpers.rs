//! Some convenient serde helpers
//!
//! CometBFT renders 64-bit integers as JSON strings, while some gateways emit plain numbers.

use serde::{Deserialize, Deserializer};
use std::convert::TryFrom;

/// Helper type to parse both numeric strings and numbers
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum StringifiedNumeric {
    String(String),
    Num(serde_json::Number),
}

impl TryFrom<StringifiedNumeric> for u64 {
    type Error = String;

    fn try_from(value: StringifiedNumeric) -> Result<Self, Self::Error> {
        match value {
            StringifiedNumeric::Num(n) => {
                n.as_u64().ok_or_else(|| format!("{n} is not an unsigned 64 bit integer"))
            }
            StringifiedNumeric::String(s) if s.is_empty() => Ok(0),
            StringifiedNumeric::String(s) => s.parse().map_err(|err| format!("{s:?}: {err}")),
        }
    }
}

impl TryFrom<StringifiedNumeric> for i64 {
    type Error = String;

    fn try_from(value: StringifiedNumeric) -> Result<Self, Self::Error> {
        match value {
            StringifiedNumeric::Num(n) => {
                n.as_i64().ok_or_else(|| format!("{n} is not a 64 bit integer"))
            }
            StringifiedNumeric::String(s) if s.is_empty() => Ok(0),
            StringifiedNumeric::String(s) => s.parse().map_err(|err| format!("{s:?}: {err}")),
        }
    }
}

/// Supports parsing `u64` values rendered as strings
pub fn deserialize_stringified_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let num = StringifiedNumeric::deserialize(deserializer)?;
    u64::try_from(num).map_err(serde::de::Error::custom)
}

/// Supports parsing `i64` values rendered as strings
pub fn deserialize_stringified_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let num = StringifiedNumeric::deserialize(deserializer)?;
    i64::try_from(num).map_err(serde::de::Error::custom)
}

/// Supports parsing optional `u64` values rendered as strings
pub fn deserialize_stringified_u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    if let Some(num) = Option::<StringifiedNumeric>::deserialize(deserializer)? {
        u64::try_from(num).map(Some).map_err(serde::de::Error::custom)
    } else {
        Ok(None)
    }
}
