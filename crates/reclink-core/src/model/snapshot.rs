use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record_type::RecordType;
use super::RecordKey;

/// One line of a projected sublist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(rename = "lineIndex")]
    pub line_index: usize,

    #[serde(rename = "lineKey", default, skip_serializing_if = "Option::is_none")]
    pub line_key: Option<RecordKey>,

    /// Requested line fields; absent values are omitted, never null
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl Line {
    pub fn new(line_index: usize) -> Self {
        Self {
            line_index,
            line_key: None,
            values: BTreeMap::new(),
        }
    }
}

/// Flat projection of one remote record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(rename = "type")]
    pub record_type: RecordType,

    pub key: RecordKey,

    #[serde(default)]
    pub fields: BTreeMap<String, Value>,

    #[serde(default)]
    pub sublists: BTreeMap<String, Vec<Line>>,
}

impl RecordSnapshot {
    /// A snapshot carrying only the primary key
    pub fn key_only(record_type: RecordType, key: RecordKey) -> Self {
        Self {
            record_type,
            key,
            fields: BTreeMap::new(),
            sublists: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_wire_shape() {
        let mut snapshot = RecordSnapshot::key_only(RecordType::Customer, 42);
        snapshot.fields.insert("email".to_string(), json!("a@example.com"));
        let mut line = Line::new(0);
        line.line_key = Some(5);
        line.values.insert("city".to_string(), json!("Oslo"));
        snapshot.sublists.insert("addressbook".to_string(), vec![line]);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "customer",
                "key": 42,
                "fields": {"email": "a@example.com"},
                "sublists": {"addressbook": [{"lineIndex": 0, "lineKey": 5, "city": "Oslo"}]}
            })
        );
    }

    #[test]
    fn test_line_without_key_omits_line_key() {
        let value = serde_json::to_value(Line::new(3)).unwrap();
        assert_eq!(value, json!({"lineIndex": 3}));
    }
}
