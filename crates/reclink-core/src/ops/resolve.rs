//! Identifier resolution.
//!
//! Turns a `RecordLocator` into one primary key by probing each identifier
//! candidate in order:
//!
//! - no match: try the next candidate
//! - exactly one match: return it, later candidates are never searched
//! - several matches for a scalar value: ambiguous; warn, keep the first
//!   match as a tentative key if none is held yet, try the next candidate
//! - several matches for a list value: expected, no warning, no key taken
//!
//! When every candidate is exhausted the tentative key (if any) is returned.
//! The tentative key was never confirmed unique; callers relying on it get
//! whatever the ambiguous search listed first.

use crate::config::EngineConfig;
use crate::errors::SkipReason;
use crate::model::{IdCandidate, RecordKey, RecordLocator, RecordType, SearchFilter};
use crate::request_log::RequestLog;
use crate::store::RecordStore;

/// Outcome of resolving a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Candidate `candidate` matched exactly one record.
    Unique { key: RecordKey, candidate: usize },
    /// No candidate was unique; the first ambiguous match is returned.
    Tentative { key: RecordKey, candidate: usize },
    /// Nothing matched.
    NotFound,
}

impl Resolution {
    pub fn key(&self) -> Option<RecordKey> {
        match self {
            Resolution::Unique { key, .. } | Resolution::Tentative { key, .. } => Some(*key),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.key().is_some()
    }
}

/// Classification of one candidate's probe window
#[derive(Debug, Clone, PartialEq, Eq)]
enum Probe {
    NoMatch,
    Unique(RecordKey),
    Ambiguous { first: RecordKey, seen: usize },
    ExpectedMany { seen: usize },
}

/// Resolve `locator` to a single primary key.
///
/// Search failures are logged and count as no match for that candidate.
pub fn resolve(
    store: &dyn RecordStore,
    locator: &RecordLocator,
    config: &EngineConfig,
    log: &mut RequestLog,
) -> Resolution {
    let mut tentative: Option<(RecordKey, usize)> = None;

    for (index, candidate) in locator.candidates.iter().enumerate() {
        let probe = match probe_candidate(store, locator.record_type, candidate, config.probe_size) {
            Ok(probe) => probe,
            Err(skip) => {
                log.error(
                    "Identifier search failed",
                    format!("{} (candidate {} of {})", skip, index + 1, locator.candidates.len()),
                );
                continue;
            }
        };

        match probe {
            Probe::NoMatch => {
                log.debug(
                    "No match for identifier",
                    format!("{} {}", locator.record_type, candidate),
                );
            }
            Probe::Unique(key) => {
                log.audit(
                    "Record resolved",
                    format!("{} {} via {}", locator.record_type, key, candidate),
                );
                return Resolution::Unique {
                    key,
                    candidate: index,
                };
            }
            Probe::Ambiguous { first, seen } => {
                log.warn(
                    "Ambiguous identifier",
                    format!(
                        "{} {} matched {} records; first is {}",
                        locator.record_type, candidate, seen, first
                    ),
                );
                if tentative.is_none() {
                    tentative = Some((first, index));
                }
            }
            Probe::ExpectedMany { seen } => {
                log.debug(
                    "Multi-value identifier matched several records",
                    format!("{} {} matched {} records", locator.record_type, candidate, seen),
                );
            }
        }
    }

    match tentative {
        Some((key, candidate)) => {
            log.audit(
                "Record resolved tentatively",
                format!("{} {} from an ambiguous identifier", locator.record_type, key),
            );
            Resolution::Tentative { key, candidate }
        }
        None => Resolution::NotFound,
    }
}

/// Run the bounded probe for one candidate and classify it
fn probe_candidate(
    store: &dyn RecordStore,
    record_type: RecordType,
    candidate: &IdCandidate,
    probe_size: usize,
) -> Result<Probe, SkipReason> {
    let unit = format!("candidate '{}'", candidate);
    let filters = [SearchFilter::from_candidate(candidate)];
    let search = store
        .search(record_type, &filters)
        .map_err(|e| SkipReason::new(unit.clone(), e))?;

    // Searches list a record once per matching row, so one record with many
    // lines can fill a whole window. Read further windows until `probe_size`
    // records are seen or the rows run out.
    let window = probe_size.max(1);
    let mut keys: Vec<RecordKey> = Vec::new();
    let mut start = 0;
    loop {
        let rows = search
            .get_range(start, start + window)
            .map_err(|e| SkipReason::new(unit.clone(), e))?;
        let exhausted = rows.len() < window;
        for key in rows {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        if exhausted || keys.len() >= window {
            break;
        }
        start += window;
    }

    Ok(match keys.as_slice() {
        [] => Probe::NoMatch,
        [key] => Probe::Unique(*key),
        [first, ..] if !candidate.value.is_multi() => Probe::Ambiguous {
            first: *first,
            seen: keys.len(),
        },
        _ => Probe::ExpectedMany { seen: keys.len() },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IdValue, Scalar, SearchOperator};
    use crate::request_log::{LogLimits, LogSeverity};
    use crate::store::{MemoryLine, MemoryRecord, MemoryRecordStore};
    use serde_json::json;

    fn customer(email: &str, external_id: &str) -> MemoryRecord {
        MemoryRecord::new()
            .field("email", json!(email))
            .field("externalid", json!(external_id))
    }

    fn store() -> MemoryRecordStore {
        MemoryRecordStore::new()
            .with_record(RecordType::Customer, 1, customer("shared@x.io", "EXT-1"))
            .with_record(RecordType::Customer, 2, customer("shared@x.io", "EXT-2"))
            .with_record(RecordType::Customer, 3, customer("solo@x.io", "EXT-3"))
    }

    fn run(store: &MemoryRecordStore, candidates: Vec<IdCandidate>) -> (Resolution, RequestLog) {
        let mut log = RequestLog::new(LogLimits::default());
        let locator = RecordLocator::new(RecordType::Customer, candidates);
        let r = resolve(store, &locator, &EngineConfig::default(), &mut log);
        (r, log)
    }

    #[test]
    fn test_unique_match_short_circuits() {
        let store = store();
        let (r, _) = run(
            &store,
            vec![
                IdCandidate::is("externalid", "EXT-3"),
                IdCandidate::is("email", "shared@x.io"),
            ],
        );

        assert_eq!(r, Resolution::Unique { key: 3, candidate: 0 });
        assert_eq!(store.search_calls(), 1);
    }

    #[test]
    fn test_ambiguous_then_unique_returns_unique() {
        let store = store();
        let (r, log) = run(
            &store,
            vec![
                IdCandidate::is("email", "shared@x.io"),
                IdCandidate::is("externalid", "EXT-2"),
            ],
        );

        assert_eq!(r, Resolution::Unique { key: 2, candidate: 1 });
        assert_eq!(log.count(LogSeverity::Warn), 1);
    }

    #[test]
    fn test_only_ambiguous_returns_first_tentative() {
        let store = store();
        let (r, _) = run(&store, vec![IdCandidate::is("email", "shared@x.io")]);

        assert_eq!(r, Resolution::Tentative { key: 1, candidate: 0 });
        assert_eq!(r.key(), Some(1));
    }

    #[test]
    fn test_multi_value_list_is_not_ambiguous() {
        let store = store();
        let many = IdCandidate::new(
            "externalid",
            SearchOperator::AnyOf,
            IdValue::Many(vec![Scalar::from("EXT-1"), Scalar::from("EXT-2")]),
        );
        let (r, log) = run(&store, vec![many]);

        assert_eq!(r, Resolution::NotFound);
        assert_eq!(log.count(LogSeverity::Warn), 0);
    }

    #[test]
    fn test_search_failure_moves_to_next_candidate() {
        let mut store = store();
        store.fail_search_on("externalid");
        let (r, log) = run(
            &store,
            vec![
                IdCandidate::is("externalid", "EXT-3"),
                IdCandidate::is("email", "solo@x.io"),
            ],
        );

        assert_eq!(r, Resolution::Unique { key: 3, candidate: 1 });
        assert_eq!(log.count(LogSeverity::Error), 1);
    }

    #[test]
    fn test_record_filling_probe_window_still_ambiguous() {
        let mut many_lines = customer("shared@x.io", "EXT-1");
        for id in 0..12 {
            many_lines = many_lines.line("addressbook", MemoryLine::new().value("id", json!(id)));
        }
        let store = MemoryRecordStore::new()
            .with_record(RecordType::Customer, 1, many_lines)
            .with_record(RecordType::Customer, 2, customer("shared@x.io", "EXT-2"));

        let (r, log) = run(&store, vec![IdCandidate::is("email", "shared@x.io")]);

        assert_eq!(r, Resolution::Tentative { key: 1, candidate: 0 });
        assert_eq!(log.count(LogSeverity::Warn), 1);
    }

    #[test]
    fn test_no_candidates_match() {
        let store = store();
        let (r, _) = run(&store, vec![IdCandidate::is("externalid", "nope")]);
        assert_eq!(r, Resolution::NotFound);
        assert!(!r.is_found());
    }
}
