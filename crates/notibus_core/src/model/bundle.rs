//! String key/value sub-dictionary carried inside a notification.
//!
//! A bundle is stored and transported in a flattened JSON object form.
//! An empty flattened form decodes to "no bundle".

use crate::error::{NotiError, NotiResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle(BTreeMap<String, String>);

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the bundle into its flattened text form.
    pub fn flatten(&self) -> String {
        // A string-to-string map always serializes.
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// Parses a flattened bundle. Empty input yields `None`.
    pub fn parse(flattened: &str) -> NotiResult<Option<Self>> {
        if flattened.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(flattened)
            .map(Some)
            .map_err(|err| NotiError::InvalidData(format!("malformed bundle: {err}")))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Flattens an optional bundle for storage; `None` stays `None`.
pub(crate) fn flatten_opt(bundle: Option<&Bundle>) -> Option<String> {
    bundle.map(Bundle::flatten)
}

/// Parses an optional flattened bundle; `None` and `""` both yield `None`.
pub(crate) fn parse_opt(flattened: Option<&str>) -> NotiResult<Option<Bundle>> {
    match flattened {
        Some(value) => Bundle::parse(value),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::Bundle;

    #[test]
    fn empty_flattened_form_is_absent() {
        assert_eq!(Bundle::parse("").unwrap(), None);
        assert_eq!(Bundle::parse("   ").unwrap(), None);
    }

    #[test]
    fn flatten_then_parse_keeps_pairs() {
        let bundle: Bundle = [("op", "open"), ("uri", "app://inbox")].into_iter().collect();
        let parsed = Bundle::parse(&bundle.flatten()).unwrap().unwrap();
        assert_eq!(parsed.get("uri"), Some("app://inbox"));
        assert_eq!(parsed, bundle);
    }

    #[test]
    fn malformed_text_is_rejected() {
        let err = Bundle::parse("{not json").unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }
}
