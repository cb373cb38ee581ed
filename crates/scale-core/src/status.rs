//! Dependency status values
//!
//! Every dependency check produces the same shape:
//!
//! ```json
//! {"OK": false, "detail": {...}, "errors": [{"CODE": "message"}], "warnings": []}
//! ```
//!
//! `errors` and `warnings` are always present; `detail` is omitted when the
//! check has nothing to echo back.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One `{code: message}` entry in an error or warning list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub code: String,
    pub message: String,
}

impl StatusMessage {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl Serialize for StatusMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.code, &self.message)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatusMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut entries = entries.into_iter();
        match (entries.next(), entries.next()) {
            (Some((code, message)), None) => Ok(StatusMessage { code, message }),
            _ => Err(de::Error::custom(
                "status entry must contain exactly one code",
            )),
        }
    }
}

/// Health of a single dependency at the moment it was checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyStatus {
    #[serde(rename = "OK")]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default)]
    pub errors: Vec<StatusMessage>,
    #[serde(default)]
    pub warnings: Vec<StatusMessage>,
}

impl DependencyStatus {
    /// A passing status with nothing to report yet.
    pub fn healthy() -> Self {
        Self {
            ok: true,
            detail: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A failing status carrying a single error.
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::healthy().with_error(code, message)
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Adds a hard failure; the status is no longer OK.
    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.push_error(code, message);
        self
    }

    /// Adds a soft failure; OK is left untouched.
    pub fn with_warning(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.push_warning(code, message);
        self
    }

    pub fn push_error(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.ok = false;
        self.errors.push(StatusMessage::new(code, message));
    }

    pub fn push_warning(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(StatusMessage::new(code, message));
    }

    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    pub fn error_codes(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.code.as_str()).collect()
    }

    pub fn warning_codes(&self) -> Vec<&str> {
        self.warnings.iter().map(|w| w.code.as_str()).collect()
    }

    /// True when there is no detail, or the detail is an empty object.
    pub fn detail_is_empty(&self) -> bool {
        match &self.detail {
            None | Some(Value::Null) => true,
            Some(Value::Object(map)) => map.is_empty(),
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;
    use serde_json::json;

    #[test]
    fn test_status_serializes_with_single_key_entries() {
        let status = DependencyStatus::failed(codes::NO_SILO_DEFINED, "No silo URL defined");

        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({
                "OK": false,
                "errors": [{"NO_SILO_DEFINED": "No silo URL defined"}],
                "warnings": []
            })
        );
    }

    #[test]
    fn test_warning_does_not_clear_ok() {
        let status = DependencyStatus::healthy()
            .with_detail(json!({"url": "http://silo"}))
            .with_warning(codes::LARGE_BUFFER, "too long");

        assert!(status.ok);
        assert!(status.has_warning(codes::LARGE_BUFFER));
        assert!(!status.detail_is_empty());
    }

    #[test]
    fn test_status_round_trips_through_json() {
        let raw = json!({
            "OK": true,
            "detail": "Database alive and well",
            "errors": [],
            "warnings": [{"LARGE_BUFFER": "Length of log buffer is too long: 20 > 10"}]
        });

        let status: DependencyStatus = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(status.warning_codes(), vec![codes::LARGE_BUFFER]);
        assert_eq!(serde_json::to_value(&status).unwrap(), raw);
    }

    #[test]
    fn test_entry_with_two_codes_is_rejected() {
        let raw = json!({"OK": false, "errors": [{"A": "a", "B": "b"}], "warnings": []});
        assert!(serde_json::from_value::<DependencyStatus>(raw).is_err());
    }
}
