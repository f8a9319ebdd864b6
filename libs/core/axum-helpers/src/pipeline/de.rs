//! Serde helpers for fields that may arrive from a path or query string.

use serde::{Deserialize, Deserializer, de};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    String(String),
}

/// Accept a JSON number or its decimal string form.
///
/// ```ignore
/// #[serde(default = "default_limit", deserialize_with = "number_or_string")]
/// limit: i64,
/// ```
pub fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(raw) => raw.trim().parse().map_err(de::Error::custom),
    }
}
