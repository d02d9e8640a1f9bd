use std::collections::BTreeMap;

use super::record_type::RecordType;
use super::selection::ProjectionSpec;
use super::snapshot::RecordSnapshot;

/// A one-to-many relation from a parent record to child records
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRelationSpec {
    pub child_type: RecordType,

    /// Field on the child holding the parent's key
    pub join_field: String,

    /// Set when the join field is a sublist column on the child
    pub scope_sublist: Option<String>,

    /// Children are loaded and projected only when this is set
    pub projection: Option<ProjectionSpec>,
}

impl ChildRelationSpec {
    pub fn new(child_type: RecordType, join_field: impl Into<String>) -> Self {
        Self {
            child_type,
            join_field: join_field.into(),
            scope_sublist: None,
            projection: None,
        }
    }

    pub fn with_scope_sublist(mut self, sublist_id: impl Into<String>) -> Self {
        self.scope_sublist = Some(sublist_id.into());
        self
    }

    pub fn with_projection(mut self, projection: ProjectionSpec) -> Self {
        self.projection = Some(projection);
        self
    }
}

/// Child snapshots grouped by child type, unique by key within a type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalResult {
    by_type: BTreeMap<RecordType, Vec<RecordSnapshot>>,
}

impl TraversalResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot unless one with the same key is already held for its type
    ///
    /// Returns `false` when the snapshot was a duplicate.
    pub fn insert(&mut self, snapshot: RecordSnapshot) -> bool {
        let list = self.by_type.entry(snapshot.record_type).or_default();
        if list.iter().any(|s| s.key == snapshot.key) {
            return false;
        }
        list.push(snapshot);
        true
    }

    pub fn get(&self, child_type: RecordType) -> &[RecordSnapshot] {
        self.by_type
            .get(&child_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn child_types(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.by_type.keys().copied()
    }

    /// Total number of snapshots across all child types
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into one list, grouped by child type
    pub fn into_snapshots(self) -> Vec<RecordSnapshot> {
        self.by_type.into_values().flatten().collect()
    }
}
