//! Remote record store seam
//!
//! The engine reads records only through these traits. Every call is a
//! synchronous, possibly blocking call into the collaborator; latency and
//! timeouts belong to the implementation.
//!
//! - `RecordStore`: search by filters, load by key
//! - `SearchHandle`: a built search, run as a bounded window or paged
//! - `PagedSearch`: page ranges of a paged run, each fetched on demand
//! - `RecordHandle`: body, subrecord and sublist accessors of a loaded record
//!
//! `memory::MemoryRecordStore` implements all of them in memory.

use serde_json::Value;

use crate::errors::StoreError;
use crate::model::{RecordKey, RecordType, SearchFilter};

pub mod memory;

pub use memory::{MemoryLine, MemoryRecord, MemoryRecordStore};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One page of a paged search: `index` is passed back to `fetch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub index: usize,
    pub start: usize,
    pub len: usize,
}

/// The record store collaborator
pub trait RecordStore {
    /// Build a search over `record_type` rows matching every filter
    fn search(
        &self,
        record_type: RecordType,
        filters: &[SearchFilter],
    ) -> StoreResult<Box<dyn SearchHandle + '_>>;

    /// Load one record by primary key
    fn load(
        &self,
        record_type: RecordType,
        key: RecordKey,
    ) -> StoreResult<Box<dyn RecordHandle + '_>>;
}

/// A search ready to run
pub trait SearchHandle {
    /// Keys of result rows `start..end` (bounded window)
    fn get_range(&self, start: usize, end: usize) -> StoreResult<Vec<RecordKey>>;

    /// Run in paged mode
    fn run_paged(&self, page_size: usize) -> StoreResult<Box<dyn PagedSearch + '_>>;
}

/// Pages of a paged search run
pub trait PagedSearch {
    fn page_ranges(&self) -> Vec<PageRange>;

    /// Keys of the result rows on page `index`
    fn fetch(&self, index: usize) -> StoreResult<Vec<RecordKey>>;
}

/// A loaded record, or a subrecord reached through a field
///
/// Value accessors return `Ok(None)` for a field with no value.
pub trait RecordHandle {
    fn get_value(&self, field_id: &str) -> StoreResult<Option<Value>>;

    fn get_subrecord(&self, field_id: &str) -> StoreResult<Option<Box<dyn RecordHandle + '_>>>;

    /// Ids of the body fields holding a value
    fn field_ids(&self) -> Vec<String>;

    fn has_sublist(&self, sublist_id: &str) -> bool;

    fn get_line_count(&self, sublist_id: &str) -> StoreResult<usize>;

    /// Ids of the fields present on any line of a sublist
    fn sublist_field_ids(&self, sublist_id: &str) -> StoreResult<Vec<String>>;

    fn get_sublist_value(
        &self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
    ) -> StoreResult<Option<Value>>;

    fn get_sublist_subrecord(
        &self,
        sublist_id: &str,
        field_id: &str,
        line: usize,
    ) -> StoreResult<Option<Box<dyn RecordHandle + '_>>>;
}
