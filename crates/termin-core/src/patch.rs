//! # Partial Update Fields
//!
//! [`Patch<T>`] is the field type of every update request.
//!
//! ## Three States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON body                       Patch value        Effect             │
//! │  ─────────────────────────────   ───────────────   ─────────────────   │
//! │  { }                             Patch::Unset       field untouched    │
//! │  { "beschreibung": null }        Patch::Null        field cleared      │
//! │  { "beschreibung": "Zahnarzt" }  Patch::Value(..)   field overwritten  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A plain `Option<T>` cannot tell the first two rows apart. Fields must be
//! declared with `#[serde(default)]` so that a missing key yields `Unset`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A field of a partial update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field was omitted; keep the stored value.
    #[default]
    Unset,
    /// Field was explicitly set to null.
    Null,
    /// Field was set to a value.
    Value(T),
}

impl<T> Patch<T> {
    /// True when the field was omitted.
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    /// Converts into the change to apply to a nullable column.
    ///
    /// `None` means "no change", `Some(None)` means "set to NULL".
    pub fn into_change(self) -> Option<Option<T>> {
        match self {
            Patch::Unset => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    /// Converts into the change to apply to a NOT NULL column.
    ///
    /// ## Errors
    /// `ValidationError::Required` if the field was explicitly null.
    pub fn into_required(self, field: &str) -> Result<Option<T>, ValidationError> {
        match self {
            Patch::Unset => Ok(None),
            Patch::Null => Err(ValidationError::required(field)),
            Patch::Value(v) => Ok(Some(v)),
        }
    }

    /// Maps the contained value with a fallible mapping, keeping the state.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)?),
        })
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

// A present key is never Unset: absence is handled by `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

// Unset serializes as null; pair with `skip_serializing_if = "Patch::is_unset"`.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            Patch::Unset | Patch::Null => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Patch::is_unset")]
        text: Patch<String>,
    }

    #[test]
    fn test_missing_key_is_unset() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.text, Patch::Unset);
    }

    #[test]
    fn test_null_is_null() {
        let probe: Probe = serde_json::from_str(r#"{"text": null}"#).unwrap();
        assert_eq!(probe.text, Patch::Null);
    }

    #[test]
    fn test_value_is_value() {
        let probe: Probe = serde_json::from_str(r#"{"text": "hallo"}"#).unwrap();
        assert_eq!(probe.text, Patch::Value("hallo".to_string()));
    }

    #[test]
    fn test_unset_is_skipped_on_serialize() {
        let json = serde_json::to_string(&Probe { text: Patch::Unset }).unwrap();
        assert_eq!(json, "{}");
        let json = serde_json::to_string(&Probe { text: Patch::Null }).unwrap();
        assert_eq!(json, r#"{"text":null}"#);
    }

    #[test]
    fn test_into_required_rejects_null() {
        assert_eq!(Patch::<i32>::Unset.into_required("beginn"), Ok(None));
        assert_eq!(Patch::Value(3).into_required("beginn"), Ok(Some(3)));
        assert_eq!(
            Patch::<i32>::Null.into_required("beginn"),
            Err(ValidationError::required("beginn"))
        );
    }
}
