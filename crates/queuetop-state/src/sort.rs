//! Row ordering.
//!
//! Counts compare numerically, with non-numeric tokens ranking as zero.
//! Names compare case-insensitively. Sorting is stable, and descending
//! order is the reversed comparator so equal rows keep their relative
//! position in both directions.

use std::cmp::Ordering;

use queuetop_protocol::{Snapshot, SortKey, SortSpec, StatusRow};

/// Ascending comparison of two rows by `key`.
pub fn compare(key: SortKey, a: &StatusRow, b: &StatusRow) -> Ordering {
    match key {
        SortKey::Name => compare_names(&a.name, &b.name),
        SortKey::Queued => a.queued.value().cmp(&b.queued.value()),
        SortKey::Running => a.running.value().cmp(&b.running.value()),
        SortKey::Workers => a.workers.value().cmp(&b.workers.value()),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn directed(spec: SortSpec, a: &StatusRow, b: &StatusRow) -> Ordering {
    let ordering = compare(spec.key, a, b);
    if spec.ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

/// Sort a slice of rows in place.
pub fn sort_rows(rows: &mut [StatusRow], spec: SortSpec) {
    rows.sort_by(|a, b| directed(spec, a, b));
}

/// Reorder a snapshot's rows in place.
pub fn sort_snapshot(snapshot: &mut Snapshot, spec: SortSpec) {
    snapshot.sort_by(|a, b| directed(spec, a, b));
}
