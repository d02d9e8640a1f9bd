use serde_json::{Map, Value};

use crate::errors::{SkipReason, StoreError};
use crate::model::{
    FieldSelection, Line, ProjectionSpec, RecordKey, RecordSnapshot, RecordType,
};
use crate::request_log::RequestLog;
use crate::store::{RecordHandle, RecordStore};

/// Fields whose values are nested records rather than plain values
pub const SUBRECORD_FIELDS: [&str; 4] = [
    "addressbookaddress",
    "billingaddress",
    "shippingaddress",
    "inventorydetail",
];

/// Line field holding the line's own key
pub const LINE_KEY_FIELD: &str = "id";

pub fn is_subrecord_field(field_id: &str) -> bool {
    SUBRECORD_FIELDS.contains(&field_id)
}

/// Projects a loaded record into a flat snapshot.
///
/// The snapshot always carries `key`. Requested fields with no value are
/// left out rather than set to null. A failure reading one field, one line
/// or one sublist is logged and only that unit is skipped:
/// - unknown sublist: WARN, sublist omitted
/// - field read failure: ERROR, field omitted
/// - line failure: ERROR, line omitted
///
/// # Arguments
/// * `record` - The loaded record
/// * `record_type` / `key` - Identity assigned by the store
/// * `spec` - Fields and sublists to project (ids already normalized)
/// * `log` - The request log
pub fn project(
    record: &dyn RecordHandle,
    record_type: RecordType,
    key: RecordKey,
    spec: &ProjectionSpec,
    log: &mut RequestLog,
) -> RecordSnapshot {
    let mut snapshot = RecordSnapshot::key_only(record_type, key);

    for field_id in &spec.fields {
        match read_body_field(record, field_id) {
            Ok(Some(value)) => {
                snapshot.fields.insert(field_id.clone(), value);
            }
            Ok(None) => {}
            Err(skip) => {
                log.error(
                    "Field skipped",
                    format!("{} {}: {}", record_type, key, skip),
                );
            }
        }
    }

    for (sublist_id, selection) in &spec.sublists {
        match project_sublist(record, sublist_id, selection, log) {
            Ok(lines) => {
                snapshot.sublists.insert(sublist_id.clone(), lines);
            }
            Err(skip) => {
                let detail = format!("{} {}: {}", record_type, key, skip);
                if matches!(skip.cause, StoreError::UnknownSublist { .. }) {
                    log.warn("Sublist skipped", detail);
                } else {
                    log.error("Sublist skipped", detail);
                }
            }
        }
    }

    snapshot
}

/// Load `key` and project it. A key-only spec never touches the store; a
/// failed load is logged and degrades to a key-only snapshot.
pub fn load_and_project(
    store: &dyn RecordStore,
    record_type: RecordType,
    key: RecordKey,
    spec: &ProjectionSpec,
    log: &mut RequestLog,
) -> RecordSnapshot {
    if spec.is_key_only() {
        return RecordSnapshot::key_only(record_type, key);
    }
    match store.load(record_type, key) {
        Ok(record) => project(record.as_ref(), record_type, key, spec, log),
        Err(e) => {
            log.error("Record load failed", format!("{} {}: {}", record_type, key, e));
            RecordSnapshot::key_only(record_type, key)
        }
    }
}

fn read_body_field(record: &dyn RecordHandle, field_id: &str) -> Result<Option<Value>, SkipReason> {
    let unit = || format!("field '{}'", field_id);
    let value = if is_subrecord_field(field_id) {
        match record
            .get_subrecord(field_id)
            .map_err(|e| SkipReason::new(unit(), e))?
        {
            Some(sub) => Some(subrecord_value(sub.as_ref()).map_err(|e| SkipReason::new(unit(), e))?),
            None => None,
        }
    } else {
        record
            .get_value(field_id)
            .map_err(|e| SkipReason::new(unit(), e))?
    };
    Ok(value.filter(|v| !v.is_null()))
}

fn project_sublist(
    record: &dyn RecordHandle,
    sublist_id: &str,
    selection: &FieldSelection,
    log: &mut RequestLog,
) -> Result<Vec<Line>, SkipReason> {
    let unit = || format!("sublist '{}'", sublist_id);
    if !record.has_sublist(sublist_id) {
        return Err(SkipReason::new(
            unit(),
            StoreError::UnknownSublist {
                sublist_id: sublist_id.to_string(),
            },
        ));
    }

    let count = record
        .get_line_count(sublist_id)
        .map_err(|e| SkipReason::new(unit(), e))?;
    let field_ids = match selection {
        FieldSelection::All => record
            .sublist_field_ids(sublist_id)
            .map_err(|e| SkipReason::new(unit(), e))?,
        FieldSelection::Named(ids) => ids.clone(),
    };

    let mut lines = Vec::with_capacity(count);
    for index in 0..count {
        match project_line(record, sublist_id, &field_ids, index, log) {
            Ok(line) => lines.push(line),
            Err(skip) => {
                log.error("Line skipped", skip.to_string());
            }
        }
    }
    Ok(lines)
}

fn project_line(
    record: &dyn RecordHandle,
    sublist_id: &str,
    field_ids: &[String],
    index: usize,
    log: &mut RequestLog,
) -> Result<Line, SkipReason> {
    let mut line = Line::new(index);
    line.line_key = record
        .get_sublist_value(sublist_id, LINE_KEY_FIELD, index)
        .map_err(|e| SkipReason::new(format!("{} line {}", sublist_id, index), e))?
        .as_ref()
        .and_then(value_as_key);

    for field_id in field_ids {
        match read_line_field(record, sublist_id, field_id, index) {
            Ok(Some(value)) => {
                line.values.insert(field_id.clone(), value);
            }
            Ok(None) => {}
            Err(skip) => {
                log.error(
                    "Line field skipped",
                    format!("{} line {}: {}", sublist_id, index, skip),
                );
            }
        }
    }
    Ok(line)
}

fn read_line_field(
    record: &dyn RecordHandle,
    sublist_id: &str,
    field_id: &str,
    index: usize,
) -> Result<Option<Value>, SkipReason> {
    let unit = || format!("field '{}'", field_id);
    let value = if is_subrecord_field(field_id) {
        match record
            .get_sublist_subrecord(sublist_id, field_id, index)
            .map_err(|e| SkipReason::new(unit(), e))?
        {
            Some(sub) => Some(subrecord_value(sub.as_ref()).map_err(|e| SkipReason::new(unit(), e))?),
            None => None,
        }
    } else {
        record
            .get_sublist_value(sublist_id, field_id, index)
            .map_err(|e| SkipReason::new(unit(), e))?
    };
    Ok(value.filter(|v| !v.is_null()))
}

/// A subrecord becomes an object of its own non-null body fields
fn subrecord_value(sub: &dyn RecordHandle) -> Result<Value, StoreError> {
    let mut object = Map::new();
    for field_id in sub.field_ids() {
        if let Some(value) = sub.get_value(&field_id)?.filter(|v| !v.is_null()) {
            object.insert(field_id, value);
        }
    }
    Ok(Value::Object(object))
}

fn value_as_key(value: &Value) -> Option<RecordKey> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
