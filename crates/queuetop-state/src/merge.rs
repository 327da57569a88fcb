//! Combine per-host status tables into one table keyed by job name.
//!
//! Rows sharing a name have their queued, running and worker counts
//! summed. Rows unique to one host pass through unchanged. The output
//! keeps first-seen order: host order, then row order within a host.

use std::collections::HashMap;

use queuetop_protocol::StatusRow;

/// Merge the row sets of several hosts.
///
/// The result holds at most one row per distinct name, including when a
/// single host repeats a name.
pub fn merge<I>(hosts: I) -> Vec<StatusRow>
where
    I: IntoIterator<Item = Vec<StatusRow>>,
{
    let mut merged: Vec<StatusRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for rows in hosts {
        for row in rows {
            match index.get(&row.name) {
                Some(&i) => {
                    let existing = &mut merged[i];
                    existing.queued = existing.queued.combine(&row.queued);
                    existing.running = existing.running.combine(&row.running);
                    existing.workers = existing.workers.combine(&row.workers);
                }
                None => {
                    index.insert(row.name.clone(), merged.len());
                    merged.push(row);
                }
            }
        }
    }

    merged
}
