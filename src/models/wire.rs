//! Decoding helpers for Cachet payload quirks.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

const CACHET_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Cachet encodes enum values as integers, sometimes quoted.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum NumericRepr {
    Int(u64),
    Str(String),
}

impl TryFrom<NumericRepr> for u8 {
    type Error = String;

    fn try_from(value: NumericRepr) -> Result<Self, Self::Error> {
        match value {
            NumericRepr::Int(n) => u8::try_from(n).map_err(|_| n.to_string()),
            NumericRepr::Str(s) => s.trim().parse::<u8>().map_err(|_| s),
        }
    }
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, CACHET_TIMESTAMP)
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_utc()))
        .map_err(|_| format!("unrecognised timestamp: {}", raw))
}

/// Accepts an id, a quoted id, or null (treated as absent)
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumericRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumericRepr::Int(n)) => Ok(Some(n)),
        Some(NumericRepr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(NumericRepr::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {}", s))),
    }
}

pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    optional_id(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing id"))
}
