//! Serde helpers for partial updates.

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent key from an explicit `null`.
///
/// Used together with `#[serde(default)]`: a missing key stays `None`,
/// `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Treats empty or whitespace-only text as absent.
pub(crate) fn non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}
