use std::collections::BTreeMap;

use reclink_core::errors::StoreError;
use reclink_core::model::{RecordKey, RecordType, SearchFilter};
use reclink_core::store::{
    MemoryLine, MemoryRecord, MemoryRecordStore, PageRange, PagedSearch, RecordHandle,
    RecordStore, SearchHandle, StoreResult,
};
use serde_json::{json, Value};

/// Store whose searches for scripted record types return fixed pages
///
/// Other searches and every load go to the wrapped memory store.
#[allow(dead_code)]
pub struct ScriptedStore {
    pub inner: MemoryRecordStore,
    pages: BTreeMap<RecordType, Vec<Vec<RecordKey>>>,
}

#[allow(dead_code)]
impl ScriptedStore {
    pub fn new(inner: MemoryRecordStore) -> Self {
        Self {
            inner,
            pages: BTreeMap::new(),
        }
    }

    pub fn with_pages(mut self, record_type: RecordType, pages: Vec<Vec<RecordKey>>) -> Self {
        self.pages.insert(record_type, pages);
        self
    }
}

impl RecordStore for ScriptedStore {
    fn search(
        &self,
        record_type: RecordType,
        filters: &[SearchFilter],
    ) -> StoreResult<Box<dyn SearchHandle + '_>> {
        match self.pages.get(&record_type) {
            Some(pages) => Ok(Box::new(ScriptedSearch { pages })),
            None => self.inner.search(record_type, filters),
        }
    }

    fn load(
        &self,
        record_type: RecordType,
        key: RecordKey,
    ) -> StoreResult<Box<dyn RecordHandle + '_>> {
        self.inner.load(record_type, key)
    }
}

struct ScriptedSearch<'a> {
    pages: &'a [Vec<RecordKey>],
}

impl SearchHandle for ScriptedSearch<'_> {
    fn get_range(&self, start: usize, end: usize) -> StoreResult<Vec<RecordKey>> {
        Ok(self
            .pages
            .iter()
            .flatten()
            .skip(start)
            .take(end.saturating_sub(start))
            .copied()
            .collect())
    }

    fn run_paged(&self, _page_size: usize) -> StoreResult<Box<dyn PagedSearch + '_>> {
        Ok(Box::new(ScriptedSearch { pages: self.pages }))
    }
}

impl PagedSearch for ScriptedSearch<'_> {
    fn page_ranges(&self) -> Vec<PageRange> {
        let mut start = 0;
        self.pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let range = PageRange {
                    index,
                    start,
                    len: page.len(),
                };
                start += page.len();
                range
            })
            .collect()
    }

    fn fetch(&self, index: usize) -> StoreResult<Vec<RecordKey>> {
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| StoreError::SearchFailed {
                reason: format!("page {} does not exist", index),
            })
    }
}

/// Customer 42 with two address book lines, the second without a city
#[allow(dead_code)]
pub fn customer_42() -> MemoryRecord {
    MemoryRecord::new()
        .field("email", json!("ada@example.com"))
        .field("externalid", json!("EXT-42"))
        .line(
            "addressbook",
            MemoryLine::new().value("id", json!(301)).value("city", json!("London")),
        )
        .line(
            "addressbook",
            MemoryLine::new().value("id", json!(302)).value("label", json!("Warehouse")),
        )
}

#[allow(dead_code)]
pub fn invoice(customer: i64, tran_id: &str) -> MemoryRecord {
    MemoryRecord::new()
        .field("entity", json!(customer))
        .field("tranid", json!(tran_id))
        .line(
            "item",
            MemoryLine::new().value("id", json!(1)).value("amount", json!(50.0)),
        )
}

/// Customer 42 plus invoices 7 and 9 billed to it
#[allow(dead_code)]
pub fn seeded_store() -> MemoryRecordStore {
    MemoryRecordStore::new()
        .with_record(RecordType::Customer, 42, customer_42())
        .with_record(RecordType::Invoice, 7, invoice(42, "INV-7"))
        .with_record(RecordType::Invoice, 9, invoice(42, "INV-9"))
}

/// Single-record request body for a customer by external id
#[allow(dead_code)]
pub fn customer_request(external_id: &str, response_options: Option<Value>) -> Value {
    let mut body = json!({
        "recordType": "customer",
        "idOptions": [{"property": "externalid", "operator": "is", "value": external_id}]
    });
    if let Some(options) = response_options {
        body["responseOptions"] = options;
    }
    body
}
