//! Wire requests and their structural validation.
//!
//! Two request shapes are accepted:
//! - single record: `{ recordType, idOptions, responseOptions? }`
//! - related records: `{ parentRecordType, idOptions, childOptions }`
//!
//! Anything malformed is a `ValidationError` naming the offending path and
//! never reaches the store.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use reclink_core::errors::ValidationError;
use reclink_core::model::{
    ChildRelationSpec, IdCandidate, IdValue, ProjectionSpec, RecordLocator, RecordType,
    SearchOperator,
};

/// A field list given as one id or a list of ids
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(id) => vec![id],
            OneOrMany::Many(ids) => ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdOption {
    pub property: String,
    pub operator: String,
    pub value: IdValue,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseOptions {
    #[serde(default)]
    pub fields: Option<OneOrMany>,
    #[serde(default)]
    pub sublists: BTreeMap<String, OneOrMany>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub record_type: String,
    pub id_options: Vec<IdOption>,
    #[serde(default)]
    pub response_options: Option<ResponseOptions>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOption {
    pub child_record_type: String,
    pub field_id: String,
    #[serde(default)]
    pub sublist_id: Option<String>,
    #[serde(default)]
    pub response_options: Option<ResponseOptions>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedRecordRequest {
    pub parent_record_type: String,
    pub id_options: Vec<IdOption>,
    pub child_options: Vec<ChildOption>,
}

/// A validated query ready to run
#[derive(Debug, Clone, PartialEq)]
pub enum RecordQuery {
    Record {
        locator: RecordLocator,
        projection: ProjectionSpec,
    },
    Related {
        parent: RecordLocator,
        children: Vec<ChildRelationSpec>,
    },
}

/// Validate a raw request body into a [`RecordQuery`].
///
/// A body carrying `parentRecordType` is a related-record request; any
/// other object must be a single-record request.
///
/// # Errors
///
/// Returns the first structural problem found, with its path.
pub fn parse_request(raw: &Value) -> Result<RecordQuery, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    if object.contains_key("parentRecordType") {
        let request: RelatedRecordRequest = decode(raw)?;
        return related_query(request);
    }
    if !object.contains_key("recordType") {
        return Err(ValidationError::MissingProperty {
            path: "recordType".to_string(),
        });
    }
    let request: RecordRequest = decode(raw)?;
    record_query(request)
}

fn decode<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T, ValidationError> {
    serde_json::from_value(raw.clone()).map_err(|e| ValidationError::WrongShape {
        path: "request".to_string(),
        reason: e.to_string(),
    })
}

fn record_query(request: RecordRequest) -> Result<RecordQuery, ValidationError> {
    let locator = locator(&request.record_type, "recordType", request.id_options)?;
    let projection = request
        .response_options
        .map(projection)
        .unwrap_or_default();
    Ok(RecordQuery::Record {
        locator,
        projection,
    })
}

fn related_query(request: RelatedRecordRequest) -> Result<RecordQuery, ValidationError> {
    let parent = locator(
        &request.parent_record_type,
        "parentRecordType",
        request.id_options,
    )?;
    if request.child_options.is_empty() {
        return Err(ValidationError::EmptyList {
            path: "childOptions".to_string(),
        });
    }

    let mut children = Vec::with_capacity(request.child_options.len());
    for (i, option) in request.child_options.into_iter().enumerate() {
        let path = format!("childOptions[{}]", i);
        let child_type = record_type(
            &option.child_record_type,
            &format!("{}.childRecordType", path),
        )?;
        let join_field = non_empty(&option.field_id, &format!("{}.fieldId", path))?;

        let mut spec = ChildRelationSpec::new(child_type, join_field);
        if let Some(sublist_id) = option.sublist_id {
            let sublist_id = non_empty(&sublist_id, &format!("{}.sublistId", path))?;
            spec = spec.with_scope_sublist(sublist_id);
        }
        if let Some(options) = option.response_options {
            spec = spec.with_projection(projection(options));
        }
        children.push(spec);
    }

    Ok(RecordQuery::Related { parent, children })
}

fn locator(
    type_name: &str,
    type_path: &str,
    id_options: Vec<IdOption>,
) -> Result<RecordLocator, ValidationError> {
    let record_type = record_type(type_name, type_path)?;
    if id_options.is_empty() {
        return Err(ValidationError::EmptyList {
            path: "idOptions".to_string(),
        });
    }

    let mut candidates = Vec::with_capacity(id_options.len());
    for (i, option) in id_options.into_iter().enumerate() {
        let path = format!("idOptions[{}]", i);
        let property = non_empty(&option.property, &format!("{}.property", path))?;
        let operator_path = format!("{}.operator", path);
        non_empty(&option.operator, &operator_path)?;
        let operator = SearchOperator::parse(&option.operator).map_err(|e| {
            ValidationError::InvalidOperator {
                path: operator_path,
                value: e.value,
            }
        })?;
        if option.value.is_empty() {
            return Err(ValidationError::EmptyValue {
                path: format!("{}.value", path),
            });
        }
        candidates.push(IdCandidate::new(property, operator, option.value));
    }

    Ok(RecordLocator::new(record_type, candidates))
}

fn record_type(value: &str, path: &str) -> Result<RecordType, ValidationError> {
    non_empty(value, path)?;
    RecordType::parse(value).map_err(|e| ValidationError::InvalidRecordType {
        path: path.to_string(),
        value: e.value,
    })
}

fn non_empty(value: &str, path: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyString {
            path: path.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn projection(options: ResponseOptions) -> ProjectionSpec {
    let mut spec = ProjectionSpec::key_only();
    if let Some(fields) = options.fields {
        spec = spec.with_fields(fields.into_vec());
    }
    for (sublist_id, ids) in options.sublists {
        spec = spec.with_sublist(&sublist_id, ids.into_vec());
    }
    spec
}
