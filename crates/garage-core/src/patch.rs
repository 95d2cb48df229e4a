//! Partial-update values
//!
//! `Patch<T>` separates the three states a field can have in an update
//! request: not mentioned, explicitly cleared, or set to a value. Deserialize
//! patch fields with `#[serde(default)]` so that a missing key becomes
//! [`Patch::Missing`].
//!
//! The [`lenient`] helpers parse loosely-typed numbers and dates (numeric
//! strings, empty strings, garbage) into "absent" instead of rejecting the
//! request. Schedule inputs use them so partial data is still storable.

use serde::{Deserialize, Deserializer};

/// A single field of a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field not present in the request
    Missing,
    /// Field present and explicitly null
    Null,
    /// Field present with a value
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether the request mentioned this field at all
    pub fn is_present(&self) -> bool {
        !self.is_missing()
    }

    /// The value, if one was set
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Apply the patch on top of the stored value
    pub fn merge(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Missing => current,
            Self::Null => None,
            Self::Set(v) => Some(v),
        }
    }

}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

/// Forgiving parsers for numeric and date fields
pub mod lenient {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Patch;

    fn value_to_int(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn value_to_date(value: &Value) -> Option<NaiveDate> {
        match value {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    /// Integer or numeric string; anything else is absent
    pub fn int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value_to_int(&value))
    }

    /// `YYYY-MM-DD` string; anything else is absent
    pub fn date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value_to_date(&value))
    }

    /// Patch variant of [`int`]: malformed input counts as `Null`
    pub fn int_patch<'de, D>(deserializer: D) -> std::result::Result<Patch<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value_to_int(&value).into())
    }

    /// Patch variant of [`date`]: malformed input counts as `Null`
    pub fn date_patch<'de, D>(deserializer: D) -> std::result::Result<Patch<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value_to_date(&value).into())
    }
}
