use serde::{Deserialize, Serialize};

use super::locator::{IdCandidate, Scalar};
use super::record_type::NotValid;
use super::RecordKey;

/// Pseudo-field distinguishing a record's summary row from its line rows
pub const MAINLINE_FIELD: &str = "mainline";

/// Search filter operators understood by the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOperator {
    Is,
    IsNot,
    AnyOf,
    NoneOf,
    EqualTo,
    NotEqualTo,
    Contains,
    DoesNotContain,
    StartsWith,
    HasKeywords,
    IsEmpty,
    IsNotEmpty,
    LessThan,
    GreaterThan,
}

impl SearchOperator {
    pub const ALL: [SearchOperator; 14] = [
        SearchOperator::Is,
        SearchOperator::IsNot,
        SearchOperator::AnyOf,
        SearchOperator::NoneOf,
        SearchOperator::EqualTo,
        SearchOperator::NotEqualTo,
        SearchOperator::Contains,
        SearchOperator::DoesNotContain,
        SearchOperator::StartsWith,
        SearchOperator::HasKeywords,
        SearchOperator::IsEmpty,
        SearchOperator::IsNotEmpty,
        SearchOperator::LessThan,
        SearchOperator::GreaterThan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::Is => "is",
            SearchOperator::IsNot => "isnot",
            SearchOperator::AnyOf => "anyof",
            SearchOperator::NoneOf => "noneof",
            SearchOperator::EqualTo => "equalto",
            SearchOperator::NotEqualTo => "notequalto",
            SearchOperator::Contains => "contains",
            SearchOperator::DoesNotContain => "doesnotcontain",
            SearchOperator::StartsWith => "startswith",
            SearchOperator::HasKeywords => "haskeywords",
            SearchOperator::IsEmpty => "isempty",
            SearchOperator::IsNotEmpty => "isnotempty",
            SearchOperator::LessThan => "lessthan",
            SearchOperator::GreaterThan => "greaterthan",
        }
    }

    /// Validate a wire operator (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `NotValid` for operators outside the closed set.
    pub fn parse(value: &str) -> Result<SearchOperator, NotValid> {
        let wanted = value.trim().to_ascii_lowercase();
        SearchOperator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == wanted)
            .ok_or_else(|| NotValid {
                kind: "search operator",
                value: value.to_string(),
            })
    }
}

impl std::fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `property OP values`, as handed to the record store
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub property: String,
    pub operator: SearchOperator,
    pub values: Vec<Scalar>,
}

impl SearchFilter {
    pub fn new(property: impl Into<String>, operator: SearchOperator, values: Vec<Scalar>) -> Self {
        Self {
            property: property.into(),
            operator,
            values,
        }
    }

    pub fn from_candidate(candidate: &IdCandidate) -> Self {
        Self::new(
            candidate.property.clone(),
            candidate.operator,
            candidate.value.to_vec(),
        )
    }

    /// `property anyof [keys]`
    pub fn any_of_keys(property: impl Into<String>, keys: &[RecordKey]) -> Self {
        Self::new(
            property,
            SearchOperator::AnyOf,
            keys.iter().map(|k| Scalar::Int(*k)).collect(),
        )
    }

    /// Excludes summary rows so only line rows match
    pub fn exclude_summary_rows() -> Self {
        Self::new(MAINLINE_FIELD, SearchOperator::Is, vec![Scalar::Bool(false)])
    }
}

impl std::fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.values.iter().map(Scalar::as_text).collect();
        write!(f, "{} {} [{}]", self.property, self.operator, values.join(", "))
    }
}
