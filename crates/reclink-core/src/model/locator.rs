use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::SearchOperator;
use super::record_type::RecordType;

/// A single identifier value as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Empty text is the only empty scalar
    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.trim().is_empty())
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(i) => Value::from(*i),
            Scalar::Float(f) => Value::from(*f),
            Scalar::Text(s) => Value::String(s.clone()),
        }
    }

    /// Text form used when comparing against stored values
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Bool(true) => "T".to_string(),
            Scalar::Bool(false) => "F".to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// The value of an identifier candidate: one scalar, or an intentional list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl IdValue {
    /// A list value was supplied on purpose, so many matches are expected
    pub fn is_multi(&self) -> bool {
        matches!(self, IdValue::Many(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IdValue::One(s) => s.is_empty(),
            IdValue::Many(values) => values.is_empty() || values.iter().all(Scalar::is_empty),
        }
    }

    pub fn to_vec(&self) -> Vec<Scalar> {
        match self {
            IdValue::One(s) => vec![s.clone()],
            IdValue::Many(values) => values.clone(),
        }
    }
}

impl std::fmt::Display for IdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdValue::One(s) => write!(f, "{}", s),
            IdValue::Many(values) => {
                let parts: Vec<String> = values.iter().map(Scalar::as_text).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// One way to look up a record: `property OP value`
#[derive(Debug, Clone, PartialEq)]
pub struct IdCandidate {
    pub property: String,
    pub operator: SearchOperator,
    pub value: IdValue,
}

impl IdCandidate {
    pub fn new(property: impl Into<String>, operator: SearchOperator, value: IdValue) -> Self {
        Self {
            property: property.into(),
            operator,
            value,
        }
    }

    /// Shorthand for a scalar `is` candidate
    pub fn is(property: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(property, SearchOperator::Is, IdValue::One(value.into()))
    }
}

impl std::fmt::Display for IdCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.property, self.operator, self.value)
    }
}

/// A record type plus its ordered identifier candidates
///
/// Candidates are tried in order; the order belongs to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLocator {
    pub record_type: RecordType,
    pub candidates: Vec<IdCandidate>,
}

impl RecordLocator {
    pub fn new(record_type: RecordType, candidates: Vec<IdCandidate>) -> Self {
        Self {
            record_type,
            candidates,
        }
    }
}
