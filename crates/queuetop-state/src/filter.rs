//! Row visibility rules.
//!
//! Evaluated in a fixed order:
//! 1. idle queues are hidden unless `show_all` is set,
//! 2. a name containing any exclude term is hidden,
//! 3. with include terms present, a name must contain at least one.
//!
//! Term matching is a case-insensitive substring test.

use queuetop_protocol::StatusRow;

/// Visibility rules fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    show_all: bool,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Filter {
    /// Build a filter from comma-separated include/exclude lists.
    pub fn new(show_all: bool, include_csv: &str, exclude_csv: &str) -> Self {
        let filter = Self {
            show_all,
            include: split_terms(include_csv),
            exclude: split_terms(exclude_csv),
        };
        tracing::debug!(
            show_all,
            include = ?filter.include,
            exclude = ?filter.exclude,
            "Filter initialised"
        );
        filter
    }

    /// A filter that keeps every row, idle ones included.
    pub fn show_everything() -> Self {
        Self {
            show_all: true,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn include_terms(&self) -> &[String] {
        &self.include
    }

    pub fn exclude_terms(&self) -> &[String] {
        &self.exclude
    }

    /// Whether a row should be visible.
    pub fn accepts(&self, row: &StatusRow) -> bool {
        if !self.show_all && row.is_idle() {
            return false;
        }
        if self.include.is_empty() && self.exclude.is_empty() {
            return true;
        }

        let name = row.name.to_lowercase();
        if self.exclude.iter().any(|term| name.contains(term.as_str())) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|term| name.contains(term.as_str()))
    }

    /// Drop rows this filter rejects, keeping order.
    pub fn apply(&self, rows: &mut Vec<StatusRow>) {
        rows.retain(|row| self.accepts(row));
    }
}

/// Lowercase and split a comma-separated list, dropping blank terms.
fn split_terms(csv: &str) -> Vec<String> {
    let mut terms: Vec<String> = csv
        .to_lowercase()
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect();
    terms.dedup();
    terms
}
