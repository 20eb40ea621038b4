//! Deserialization helpers for fields the API sends inconsistently.

use serde::{Deserialize, Deserializer};

/// Accept a string that may be `null` or missing, yielding `""` for both.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
