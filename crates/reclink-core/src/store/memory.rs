//! In-memory record store
//!
//! Searches run over *rows* the way the record platform's searches do: each
//! record contributes one summary row (`mainline = true`) plus one row per
//! sublist line (`mainline = false`) carrying the body fields overlaid with
//! that line's values. A record whose lines match several times therefore
//! appears several times in a result set.
//!
//! Failures can be injected per search property, per field and per load.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PageRange, PagedSearch, RecordHandle, RecordStore, SearchHandle, StoreResult};
use crate::errors::StoreError;
use crate::model::{
    normalize_field_id, RecordKey, RecordType, Scalar, SearchFilter, SearchOperator,
    MAINLINE_FIELD,
};

/// One sublist line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryLine {
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
    #[serde(default)]
    pub subrecords: BTreeMap<String, MemoryRecord>,
}

impl MemoryLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, field_id: &str, value: Value) -> Self {
        self.values.insert(normalize_field_id(field_id), value);
        self
    }

    pub fn subrecord(mut self, field_id: &str, record: MemoryRecord) -> Self {
        self.subrecords.insert(normalize_field_id(field_id), record);
        self
    }
}

/// A stored record: body fields, subrecords and sublists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub subrecords: BTreeMap<String, MemoryRecord>,
    #[serde(default)]
    pub sublists: BTreeMap<String, Vec<MemoryLine>>,
}

impl MemoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field_id: &str, value: Value) -> Self {
        self.fields.insert(normalize_field_id(field_id), value);
        self
    }

    pub fn subrecord(mut self, field_id: &str, record: MemoryRecord) -> Self {
        self.subrecords.insert(normalize_field_id(field_id), record);
        self
    }

    /// Append a line to a sublist, creating the sublist if needed
    pub fn line(mut self, sublist_id: &str, line: MemoryLine) -> Self {
        self.sublists
            .entry(normalize_field_id(sublist_id))
            .or_default()
            .push(line);
        self
    }

    /// Declare a sublist with no lines
    pub fn empty_sublist(mut self, sublist_id: &str) -> Self {
        self.sublists.entry(normalize_field_id(sublist_id)).or_default();
        self
    }

    /// Summary row followed by one row per line, in sublist order
    fn rows(&self) -> Vec<BTreeMap<String, Value>> {
        let mut summary = self.fields.clone();
        summary.insert(MAINLINE_FIELD.to_string(), Value::Bool(true));

        let mut rows = vec![summary];
        for lines in self.sublists.values() {
            for line in lines {
                let mut row = self.fields.clone();
                row.extend(line.values.iter().map(|(k, v)| (k.clone(), v.clone())));
                row.insert(MAINLINE_FIELD.to_string(), Value::Bool(false));
                rows.push(row);
            }
        }
        rows
    }
}

/// Record store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<(RecordType, RecordKey), MemoryRecord>,
    failing_search_properties: HashSet<String>,
    failing_fields: HashSet<(RecordType, RecordKey, String)>,
    failing_loads: HashSet<(RecordType, RecordKey)>,
    failing_pages: HashSet<(RecordType, usize)>,
    search_calls: Cell<usize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record_type: RecordType, key: RecordKey, record: MemoryRecord) {
        self.records.insert((record_type, key), record);
    }

    /// Builder form of [`MemoryRecordStore::insert`]
    pub fn with_record(mut self, record_type: RecordType, key: RecordKey, record: MemoryRecord) -> Self {
        self.insert(record_type, key, record);
        self
    }

    /// Any search filtering on `property` fails
    pub fn fail_search_on(&mut self, property: &str) {
        self.failing_search_properties
            .insert(normalize_field_id(property));
    }

    /// Reading `field_id` on this record fails, on the body and on every line
    pub fn fail_field(&mut self, record_type: RecordType, key: RecordKey, field_id: &str) {
        self.failing_fields
            .insert((record_type, key, normalize_field_id(field_id)));
    }

    pub fn fail_load(&mut self, record_type: RecordType, key: RecordKey) {
        self.failing_loads.insert((record_type, key));
    }

    /// Fetching page `index` of any paged search over `record_type` fails
    pub fn fail_page(&mut self, record_type: RecordType, index: usize) {
        self.failing_pages.insert((record_type, index));
    }

    /// Number of searches built so far
    pub fn search_calls(&self) -> usize {
        self.search_calls.get()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn search(
        &self,
        record_type: RecordType,
        filters: &[SearchFilter],
    ) -> StoreResult<Box<dyn SearchHandle + '_>> {
        self.search_calls.set(self.search_calls.get() + 1);

        if let Some(filter) = filters.iter().find(|f| {
            self.failing_search_properties
                .contains(&normalize_field_id(&f.property))
        }) {
            return Err(StoreError::SearchFailed {
                reason: format!("filter on '{}' rejected", filter.property),
            });
        }

        let mut hits = Vec::new();
        for ((t, key), record) in &self.records {
            if *t != record_type {
                continue;
            }
            for row in record.rows() {
                if filters.iter().all(|f| row_matches(&row, f)) {
                    hits.push(*key);
                }
            }
        }
        let failing_pages = self
            .failing_pages
            .iter()
            .filter(|(t, _)| *t == record_type)
            .map(|(_, index)| *index)
            .collect();
        Ok(Box::new(MemorySearch {
            hits,
            failing_pages,
        }))
    }

    fn load(
        &self,
        record_type: RecordType,
        key: RecordKey,
    ) -> StoreResult<Box<dyn RecordHandle + '_>> {
        if self.failing_loads.contains(&(record_type, key)) {
            return Err(StoreError::Unavailable {
                reason: format!("load of {} {} failed", record_type, key),
            });
        }
        let record = self
            .records
            .get(&(record_type, key))
            .ok_or_else(|| StoreError::RecordMissing {
                record_type: record_type.to_string(),
                key,
            })?;
        let failing = self
            .failing_fields
            .iter()
            .filter(|(t, k, _)| *t == record_type && *k == key)
            .map(|(_, _, f)| f.clone())
            .collect();
        Ok(Box::new(MemoryRecordView { record, failing }))
    }
}

/// Materialized result rows of one search
struct MemorySearch {
    hits: Vec<RecordKey>,
    failing_pages: BTreeSet<usize>,
}

impl SearchHandle for MemorySearch {
    fn get_range(&self, start: usize, end: usize) -> StoreResult<Vec<RecordKey>> {
        let end = end.min(self.hits.len());
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self.hits[start..end].to_vec())
    }

    fn run_paged(&self, page_size: usize) -> StoreResult<Box<dyn PagedSearch + '_>> {
        if page_size == 0 {
            return Err(StoreError::SearchFailed {
                reason: "page size must be positive".to_string(),
            });
        }
        Ok(Box::new(MemoryPages {
            hits: &self.hits,
            page_size,
            failing_pages: &self.failing_pages,
        }))
    }
}

struct MemoryPages<'a> {
    hits: &'a [RecordKey],
    page_size: usize,
    failing_pages: &'a BTreeSet<usize>,
}

impl PagedSearch for MemoryPages<'_> {
    fn page_ranges(&self) -> Vec<PageRange> {
        (0..self.hits.len())
            .step_by(self.page_size)
            .enumerate()
            .map(|(index, start)| PageRange {
                index,
                start,
                len: self.page_size.min(self.hits.len() - start),
            })
            .collect()
    }

    fn fetch(&self, index: usize) -> StoreResult<Vec<RecordKey>> {
        if self.failing_pages.contains(&index) {
            return Err(StoreError::Unavailable {
                reason: format!("fetch of page {} failed", index),
            });
        }
        let start = index * self.page_size;
        if start >= self.hits.len() {
            return Err(StoreError::SearchFailed {
                reason: format!("page {} does not exist", index),
            });
        }
        let end = (start + self.page_size).min(self.hits.len());
        Ok(self.hits[start..end].to_vec())
    }
}

struct MemoryRecordView<'a> {
    record: &'a MemoryRecord,
    failing: BTreeSet<String>,
}

impl MemoryRecordView<'_> {
    fn check(&self, field_id: &str) -> StoreResult<String> {
        let field_id = normalize_field_id(field_id);
        if self.failing.contains(&field_id) {
            return Err(StoreError::FieldRead {
                field_id,
                reason: "injected failure".to_string(),
            });
        }
        Ok(field_id)
    }

    fn line(&self, sublist_id: &str, line: usize) -> StoreResult<&MemoryLine> {
        let sublist_id = normalize_field_id(sublist_id);
        let lines = self
            .record
            .sublists
            .get(&sublist_id)
            .ok_or_else(|| StoreError::UnknownSublist {
                sublist_id: sublist_id.clone(),
            })?;
        lines
            .get(line)
            .ok_or(StoreError::LineOutOfRange { sublist_id, line })
    }
}

impl RecordHandle for MemoryRecordView<'_> {
    fn get_value(&self, field_id: &str) -> StoreResult<Option<Value>> {
        let field_id = self.check(field_id)?;
        Ok(self.record.fields.get(&field_id).cloned())
    }

    fn get_subrecord(&self, field_id: &str) -> StoreResult<Option<Box<dyn RecordHandle + '_>>> {
        let field_id = self.check(field_id)?;
        Ok(self.record.subrecords.get(&field_id).map(|record| {
            Box::new(MemoryRecordView {
                record,
                failing: BTreeSet::new(),
            }) as Box<dyn RecordHandle + '_>
        }))
    }

    fn field_ids(&self) -> Vec<String> {
        self.record
            .fields
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn has_sublist(&self, sublist_id: &str) -> bool {
        self.record
            .sublists
            .contains_key(&normalize_field_id(sublist_id))
    }

    fn get_line_count(&self, sublist_id: &str) -> StoreResult<usize> {
        let sublist_id = normalize_field_id(sublist_id);
        self.record
            .sublists
            .get(&sublist_id)
            .map(Vec::len)
            .ok_or(StoreError::UnknownSublist { sublist_id })
    }

    fn sublist_field_ids(&self, sublist_id: &str) -> StoreResult<Vec<String>> {
        let sublist_id = normalize_field_id(sublist_id);
        let lines = self
            .record
            .sublists
            .get(&sublist_id)
            .ok_or(StoreError::UnknownSublist { sublist_id })?;
        let ids: BTreeSet<String> = lines
            .iter()
            .flat_map(|l| l.values.keys().chain(l.subrecords.keys()))
            .cloned()
            .collect();
        Ok(ids.into_iter().collect())
    }

    fn get_sublist_value(
        &self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
    ) -> StoreResult<Option<Value>> {
        let field_id = self.check(field_id)?;
        Ok(self.line(sublist_id, line)?.values.get(&field_id).cloned())
    }

    fn get_sublist_subrecord(
        &self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
    ) -> StoreResult<Option<Box<dyn RecordHandle + '_>>> {
        let field_id = self.check(field_id)?;
        let line = self.line(sublist_id, line)?;
        Ok(line.subrecords.get(&field_id).map(|record| {
            Box::new(MemoryRecordView {
                record,
                failing: BTreeSet::new(),
            }) as Box<dyn RecordHandle + '_>
        }))
    }
}

// ---------------------------------------------------------------------------
// Filter evaluation
// ---------------------------------------------------------------------------

fn row_matches(row: &BTreeMap<String, Value>, filter: &SearchFilter) -> bool {
    let stored = stored_texts(row.get(&normalize_field_id(&filter.property)));
    let operands: Vec<String> = filter
        .values
        .iter()
        .map(|s| s.as_text().to_lowercase())
        .collect();

    match filter.operator {
        SearchOperator::Is | SearchOperator::AnyOf => any_equal(&stored, &operands),
        SearchOperator::IsNot | SearchOperator::NoneOf => !any_equal(&stored, &operands),
        SearchOperator::EqualTo => compare(&stored, &filter.values, |a, b| a == b),
        SearchOperator::NotEqualTo => !compare(&stored, &filter.values, |a, b| a == b),
        SearchOperator::LessThan => compare(&stored, &filter.values, |a, b| a < b),
        SearchOperator::GreaterThan => compare(&stored, &filter.values, |a, b| a > b),
        SearchOperator::Contains | SearchOperator::HasKeywords => stored
            .iter()
            .any(|s| operands.iter().any(|o| s.contains(o.as_str()))),
        SearchOperator::DoesNotContain => !stored
            .iter()
            .any(|s| operands.iter().any(|o| s.contains(o.as_str()))),
        SearchOperator::StartsWith => stored
            .iter()
            .any(|s| operands.iter().any(|o| s.starts_with(o.as_str()))),
        SearchOperator::IsEmpty => stored.iter().all(|s| s.is_empty()),
        SearchOperator::IsNotEmpty => stored.iter().any(|s| !s.is_empty()),
    }
}

/// Lower-cased text forms of a stored value; multi-select arrays expand
fn stored_texts(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().flat_map(|v| stored_texts(Some(v))).collect(),
        Some(Value::Bool(true)) => vec!["t".to_string()],
        Some(Value::Bool(false)) => vec!["f".to_string()],
        Some(Value::String(s)) => vec![s.to_lowercase()],
        Some(other) => vec![other.to_string().to_lowercase()],
    }
}

fn any_equal(stored: &[String], operands: &[String]) -> bool {
    stored.iter().any(|s| operands.iter().any(|o| o == s))
}

fn compare(stored: &[String], operands: &[Scalar], cmp: impl Fn(f64, f64) -> bool) -> bool {
    let numbers: Vec<f64> = operands
        .iter()
        .filter_map(|s| s.as_text().parse::<f64>().ok())
        .collect();
    stored
        .iter()
        .filter_map(|s| s.parse::<f64>().ok())
        .any(|s| numbers.iter().any(|n| cmp(s, *n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invoice_with_lines(entity: i64, lines: usize) -> MemoryRecord {
        let mut record = MemoryRecord::new().field("entity", json!(entity));
        for i in 0..lines {
            record = record.line("item", MemoryLine::new().value("item", json!(100 + i as i64)));
        }
        record
    }

    #[test]
    fn test_summary_and_line_rows_are_both_hits() {
        let store = MemoryRecordStore::new().with_record(RecordType::Invoice, 7, invoice_with_lines(42, 2));

        let search = store
            .search(RecordType::Invoice, &[SearchFilter::any_of_keys("entity", &[42])])
            .unwrap();
        assert_eq!(search.get_range(0, 10).unwrap(), vec![7, 7, 7]);
    }

    #[test]
    fn test_exclude_summary_rows_keeps_lines_only() {
        let store = MemoryRecordStore::new().with_record(RecordType::Invoice, 7, invoice_with_lines(42, 2));

        let search = store
            .search(
                RecordType::Invoice,
                &[
                    SearchFilter::any_of_keys("entity", &[42]),
                    SearchFilter::exclude_summary_rows(),
                ],
            )
            .unwrap();
        assert_eq!(search.get_range(0, 10).unwrap(), vec![7, 7]);
    }

    #[test]
    fn test_paged_run_splits_rows() {
        let store = MemoryRecordStore::new()
            .with_record(RecordType::Invoice, 7, invoice_with_lines(42, 5))
            .with_record(RecordType::Invoice, 9, invoice_with_lines(42, 0));

        let search = store
            .search(RecordType::Invoice, &[SearchFilter::any_of_keys("entity", &[42])])
            .unwrap();
        let paged = search.run_paged(5).unwrap();
        let ranges = paged.page_ranges();

        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1], PageRange { index: 1, start: 5, len: 2 });
        assert_eq!(paged.fetch(1).unwrap(), vec![7, 9]);
        assert!(paged.fetch(2).is_err());
    }

    #[test]
    fn test_text_operators_are_case_insensitive() {
        let store = MemoryRecordStore::new().with_record(
            RecordType::Customer,
            1,
            MemoryRecord::new().field("email", json!("Ada@Example.com")),
        );

        let is = store
            .search(RecordType::Customer, &[SearchFilter::new("email", SearchOperator::Is, vec!["ada@example.com".into()])])
            .unwrap();
        assert_eq!(is.get_range(0, 10).unwrap(), vec![1]);

        let starts = store
            .search(RecordType::Customer, &[SearchFilter::new("email", SearchOperator::StartsWith, vec!["ADA".into()])])
            .unwrap();
        assert_eq!(starts.get_range(0, 10).unwrap(), vec![1]);

        let empty = store
            .search(RecordType::Customer, &[SearchFilter::new("phone", SearchOperator::IsEmpty, vec![])])
            .unwrap();
        assert_eq!(empty.get_range(0, 10).unwrap(), vec![1]);
    }

    #[test]
    fn test_injected_failures() {
        let mut store = MemoryRecordStore::new().with_record(
            RecordType::Customer,
            1,
            MemoryRecord::new().field("email", json!("a@b.c")),
        );
        store.fail_search_on("externalid");
        store.fail_field(RecordType::Customer, 1, "email");

        assert!(matches!(
            store.search(RecordType::Customer, &[SearchFilter::new("externalid", SearchOperator::Is, vec!["x".into()])]),
            Err(StoreError::SearchFailed { .. })
        ));
        assert_eq!(store.search_calls(), 1);

        let record = store.load(RecordType::Customer, 1).unwrap();
        assert!(matches!(record.get_value("email"), Err(StoreError::FieldRead { .. })));
        drop(record);

        store.fail_load(RecordType::Customer, 1);
        assert!(store.load(RecordType::Customer, 1).is_err());
    }

    #[test]
    fn test_load_missing_record() {
        let store = MemoryRecordStore::new();
        assert!(matches!(
            store.load(RecordType::Customer, 5),
            Err(StoreError::RecordMissing { key: 5, .. })
        ));
    }

    #[test]
    fn test_sublist_accessors() {
        let record = MemoryRecord::new()
            .line("addressbook", MemoryLine::new().value("id", json!(11)).value("city", json!("Oslo")))
            .line(
                "addressbook",
                MemoryLine::new()
                    .value("id", json!(12))
                    .subrecord("addressbookaddress", MemoryRecord::new().field("zip", json!("0150"))),
            );
        let store = MemoryRecordStore::new().with_record(RecordType::Customer, 1, record);
        let handle = store.load(RecordType::Customer, 1).unwrap();

        assert!(handle.has_sublist("AddressBook"));
        assert_eq!(handle.get_line_count("addressbook").unwrap(), 2);
        assert_eq!(
            handle.sublist_field_ids("addressbook").unwrap(),
            vec!["addressbookaddress", "city", "id"]
        );
        assert_eq!(handle.get_sublist_value("addressbook", "city", 1).unwrap(), None);
        let sub = handle
            .get_sublist_subrecord("addressbook", "addressbookaddress", 1)
            .unwrap()
            .unwrap();
        assert_eq!(sub.get_value("zip").unwrap(), Some(json!("0150")));
        assert!(matches!(
            handle.get_sublist_value("addressbook", "city", 2),
            Err(StoreError::LineOutOfRange { line: 2, .. })
        ));
        assert!(matches!(
            handle.get_line_count("item"),
            Err(StoreError::UnknownSublist { .. })
        ));
    }
}
