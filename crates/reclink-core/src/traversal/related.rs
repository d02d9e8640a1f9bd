use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::errors::SkipReason;
use crate::model::{
    ChildRelationSpec, ProjectionSpec, RecordKey, RecordType, SearchFilter, TraversalResult,
};
use crate::ops::load_and_project;
use crate::request_log::RequestLog;
use crate::store::RecordStore;

/// Collect the children of `parent_key` for every relation in `specs`.
///
/// Each relation runs one paged search for children whose `join_field`
/// holds the parent key. Searches list a child once per matching row, so
/// keys are deduplicated per child type across pages and across relations
/// sharing a child type. A child is projected with the projection of the
/// relation that discovered it first; relations with no projection yield
/// key-only snapshots.
///
/// A relation whose search cannot be built or run is dropped. A page that
/// fails to fetch is skipped and the relation keeps its other pages.
///
/// # Arguments
/// * `store` - The record store
/// * `parent_key` - Key of the resolved parent
/// * `specs` - Relations to follow, in request order
/// * `config` - Supplies the page size
/// * `log` - The request log
pub fn traverse(
    store: &dyn RecordStore,
    parent_key: RecordKey,
    specs: &[ChildRelationSpec],
    config: &EngineConfig,
    log: &mut RequestLog,
) -> TraversalResult {
    // child type -> (key, index of discovering relation), in discovery order
    let mut discovered: BTreeMap<RecordType, Vec<(RecordKey, usize)>> = BTreeMap::new();

    for (index, spec) in specs.iter().enumerate() {
        let keys = match collect_child_keys(store, parent_key, spec, config.page_size, log) {
            Ok(keys) => keys,
            Err(skip) => {
                log.error(
                    "Child search failed",
                    format!("{} via {}: {}", spec.child_type, spec.join_field, skip),
                );
                continue;
            }
        };

        let known = discovered.entry(spec.child_type).or_default();
        let mut added = 0;
        for key in keys {
            if !known.iter().any(|(k, _)| *k == key) {
                known.push((key, index));
                added += 1;
            }
        }
        log.debug(
            "Children discovered",
            format!(
                "{} via {}: {} new, {} known",
                spec.child_type,
                spec.join_field,
                added,
                known.len()
            ),
        );
    }

    let key_only = ProjectionSpec::key_only();
    let mut result = TraversalResult::new();
    for (child_type, entries) in discovered {
        for (key, index) in entries {
            let projection = specs[index].projection.as_ref().unwrap_or(&key_only);
            result.insert(load_and_project(store, child_type, key, projection, log));
        }
        log.audit(
            "Related records collected",
            format!(
                "parent {}: {} {} record(s)",
                parent_key,
                result.get(child_type).len(),
                child_type
            ),
        );
    }
    result
}

/// Distinct child keys of one relation in the order the pages list them
fn collect_child_keys(
    store: &dyn RecordStore,
    parent_key: RecordKey,
    spec: &ChildRelationSpec,
    page_size: usize,
    log: &mut RequestLog,
) -> Result<Vec<RecordKey>, SkipReason> {
    let unit = || format!("relation {}.{}", spec.child_type, spec.join_field);

    let mut filters = vec![SearchFilter::any_of_keys(spec.join_field.clone(), &[parent_key])];
    if spec.scope_sublist.is_some() {
        filters.push(SearchFilter::exclude_summary_rows());
    }

    let search = store
        .search(spec.child_type, &filters)
        .map_err(|e| SkipReason::new(unit(), e))?;
    let paged = search
        .run_paged(page_size)
        .map_err(|e| SkipReason::new(unit(), e))?;

    let mut keys: Vec<RecordKey> = Vec::new();
    for range in paged.page_ranges() {
        let page = match paged.fetch(range.index) {
            Ok(page) => page,
            Err(e) => {
                let skip = SkipReason::new(format!("{} page {}", unit(), range.index), e);
                log.error("Child page skipped", skip.to_string());
                continue;
            }
        };
        tracing::debug!(
            child_type = %spec.child_type,
            page = range.index,
            rows = page.len(),
            "fetched child page"
        );
        for key in page {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}
