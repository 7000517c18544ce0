//! Record identifiers with mixed numeric/text encodings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An identifier as stored in the row stores.
///
/// The portal's tables started out with integer sequence ids and are
/// migrating to UUID text ids, so both encodings are live in production
/// data and foreign-key columns may hold either form. The variants compare
/// by exact encoding: `Numeric(2)` and `Text("2")` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Numeric(i64),
    Text(String),
}

impl RecordId {
    /// Returns the numeric id re-encoded as text, or `None` for text ids.
    ///
    /// Foreign-key resolution retries a failed numeric lookup with this
    /// form because user ids were re-written as text during the UUID
    /// migration while attendance rows kept numerals. The reverse
    /// (text rendered as a numeral) is intentionally never attempted;
    /// legacy reports behaved that way and downstream consumers rely on
    /// the records it drops staying dropped.
    pub fn coerced_to_text(&self) -> Option<RecordId> {
        match self {
            RecordId::Numeric(n) => Some(RecordId::Text(n.to_string())),
            RecordId::Text(_) => None,
        }
    }

    /// Renders the id as a JSON value for filter maps.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Numeric(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.clone()),
        }
    }

    /// Parses an id from its path/query string form.
    ///
    /// A purely numeric string becomes a numeric id, anything else is
    /// text. This mirrors how the stores themselves type the column.
    pub fn parse(raw: &str) -> RecordId {
        match raw.parse::<i64>() {
            Ok(n) => RecordId::Numeric(n),
            Err(_) => RecordId::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Numeric(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Numeric(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_both_encodings() {
        let numeric: RecordId = serde_json::from_str("7").unwrap();
        assert_eq!(numeric, RecordId::Numeric(7));

        let text: RecordId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(text, RecordId::Text("7".to_string()));

        let uuid: RecordId =
            serde_json::from_str("\"5f4c9a52-9e6f-4c7a-9a1e-2e3de3a0c001\"").unwrap();
        assert!(matches!(uuid, RecordId::Text(_)));
    }

    #[test]
    fn test_encodings_are_distinct() {
        assert_ne!(RecordId::Numeric(2), RecordId::Text("2".to_string()));
    }

    #[test]
    fn test_coercion_is_one_directional() {
        assert_eq!(
            RecordId::Numeric(2).coerced_to_text(),
            Some(RecordId::Text("2".to_string()))
        );
        assert_eq!(RecordId::Text("2".to_string()).coerced_to_text(), None);
    }

    #[test]
    fn test_parse_from_path() {
        assert_eq!(RecordId::parse("42"), RecordId::Numeric(42));
        assert_eq!(
            RecordId::parse("abc-123"),
            RecordId::Text("abc-123".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordId::Numeric(5).to_string(), "5");
        assert_eq!(RecordId::Text("u-5".into()).to_string(), "u-5");
    }

    #[test]
    fn test_to_value() {
        assert_eq!(RecordId::Numeric(5).to_value(), serde_json::json!(5));
        assert_eq!(RecordId::Text("5".into()).to_value(), serde_json::json!("5"));
    }
}
