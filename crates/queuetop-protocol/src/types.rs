use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::constants::*;
use crate::error::ProtocolError;

/// A numeric status field as reported by a queue daemon.
///
/// Daemons are expected to report integers, but a token that does not
/// parse is kept verbatim instead of rejecting the whole line. Integers
/// written in a non-canonical form (`00`, `+0`, `007`) are kept verbatim
/// too: they still count by value, but only a literal `0` is idle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Counter {
    /// A canonically written integer count.
    Count(i64),
    /// Any other token, shown as-is unless it parses as an integer.
    Raw(String),
}

impl Counter {
    /// Parse a token leniently. Never fails.
    pub fn parse(token: &str) -> Self {
        match token.parse::<i64>() {
            Ok(n) if n.to_string() == token => Counter::Count(n),
            _ => Counter::Raw(token.to_string()),
        }
    }

    fn parsed(&self) -> Option<i64> {
        match self {
            Counter::Count(n) => Some(*n),
            Counter::Raw(raw) => raw.parse().ok(),
        }
    }

    /// Numeric value, with non-numeric tokens treated as zero.
    pub fn value(&self) -> i64 {
        self.parsed().unwrap_or(0)
    }

    /// True only for a token reading exactly `0`.
    pub fn is_zero(&self) -> bool {
        matches!(self, Counter::Count(0))
    }

    /// Whether the token is an integer in any form.
    pub fn is_numeric(&self) -> bool {
        self.parsed().is_some()
    }

    /// Number of terminal cells the rendered value occupies.
    pub fn display_len(&self) -> usize {
        match self {
            Counter::Count(n) => n.to_string().len(),
            Counter::Raw(raw) => match raw.parse::<i64>() {
                Ok(n) => n.to_string().len(),
                Err(_) => raw.chars().count(),
            },
        }
    }

    /// Sum two counters. Non-numeric tokens contribute zero and the result
    /// is always a count.
    pub fn combine(&self, other: &Counter) -> Counter {
        Counter::Count(self.value().saturating_add(other.value()))
    }
}

impl Default for Counter {
    fn default() -> Self {
        Counter::Count(0)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counter::Count(n) => write!(f, "{}", n),
            Counter::Raw(s) => f.write_str(s),
        }
    }
}

/// One job queue as reported by a daemon: name plus queued, running and
/// worker counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusRow {
    pub name: String,
    pub queued: Counter,
    pub running: Counter,
    pub workers: Counter,
}

impl StatusRow {
    pub fn new(name: impl Into<String>, queued: i64, running: i64, workers: i64) -> Self {
        Self {
            name: name.into(),
            queued: Counter::Count(queued),
            running: Counter::Count(running),
            workers: Counter::Count(workers),
        }
    }

    /// A queue with nothing queued, nothing running and no workers.
    pub fn is_idle(&self) -> bool {
        self.queued.is_zero() && self.running.is_zero() && self.workers.is_zero()
    }

    /// Parse one line of a `status` response.
    ///
    /// The line must contain exactly four whitespace-separated tokens:
    /// `<name> <queued> <running> <workers>`.
    pub fn parse_line(line: &str) -> Result<Self, ProtocolError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != STATUS_FIELD_COUNT {
            return Err(ProtocolError::MalformedLine {
                expected: STATUS_FIELD_COUNT,
                got: parts.len(),
            });
        }
        Ok(Self {
            name: parts[0].to_string(),
            queued: Counter::parse(parts[1]),
            running: Counter::parse(parts[2]),
            workers: Counter::parse(parts[3]),
        })
    }
}

impl FromStr for StatusRow {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusRow::parse_line(s)
    }
}

/// Parse a whole `status` response body, skipping malformed lines and
/// stopping at the `.` terminator if present.
pub fn parse_status_response(text: &str) -> Vec<StatusRow> {
    text.lines()
        .map(str::trim_end)
        .take_while(|line| *line != STATUS_TERMINATOR)
        .filter_map(|line| StatusRow::parse_line(line).ok())
        .collect()
}

/// Display widths of the four table columns, padding included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub name: usize,
    pub queued: usize,
    pub running: usize,
    pub workers: usize,
}

impl ColumnWidths {
    /// Widths of a table containing only the header labels.
    pub fn from_labels() -> Self {
        Self {
            name: NAME_LABEL.chars().count() + COLUMN_PADDING,
            queued: QUEUED_LABEL.len() + COLUMN_PADDING,
            running: RUNNING_LABEL.len() + COLUMN_PADDING,
            workers: WORKERS_LABEL.len() + COLUMN_PADDING,
        }
    }

    /// `max(label length, longest field) + padding` for each column.
    pub fn compute(rows: &[StatusRow]) -> Self {
        rows.iter().fold(Self::from_labels(), |w, row| Self {
            name: w.name.max(row.name.chars().count() + COLUMN_PADDING),
            queued: w.queued.max(row.queued.display_len() + COLUMN_PADDING),
            running: w.running.max(row.running.display_len() + COLUMN_PADDING),
            workers: w.workers.max(row.workers.display_len() + COLUMN_PADDING),
        })
    }

    /// Combined width of the three numeric columns.
    pub fn numeric_total(&self) -> usize {
        self.queued + self.running + self.workers
    }
}

/// One complete, merged and filtered status table as of one poll cycle.
///
/// The row set and the column widths are fixed at construction. The only
/// permitted mutation is reordering, which leaves both untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    rows: Vec<StatusRow>,
    widths: ColumnWidths,
    taken_at: DateTime<Utc>,
    host_count: usize,
}

impl Snapshot {
    pub fn new(rows: Vec<StatusRow>, host_count: usize) -> Self {
        Self::at(rows, host_count, Utc::now())
    }

    /// Build a snapshot with an explicit timestamp.
    pub fn at(rows: Vec<StatusRow>, host_count: usize, taken_at: DateTime<Utc>) -> Self {
        let widths = ColumnWidths::compute(&rows);
        Self {
            rows,
            widths,
            taken_at,
            host_count,
        }
    }

    pub fn rows(&self) -> &[StatusRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn widths(&self) -> ColumnWidths {
        self.widths
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn host_count(&self) -> usize {
        self.host_count
    }

    /// Stable reorder of the rows.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&StatusRow, &StatusRow) -> Ordering,
    {
        self.rows.sort_by(compare);
    }
}

/// Column a table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Queued,
    Running,
    Workers,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Name,
        SortKey::Queued,
        SortKey::Running,
        SortKey::Workers,
    ];

    /// Map a 1-based column index to a key.
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Map a key-press (`'1'`..`'4'`) to a key.
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| Self::from_index(d as usize))
    }

    pub fn index(&self) -> usize {
        match self {
            SortKey::Name => 1,
            SortKey::Queued => 2,
            SortKey::Running => 3,
            SortKey::Workers => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => NAME_LABEL,
            SortKey::Queued => QUEUED_LABEL,
            SortKey::Running => RUNNING_LABEL,
            SortKey::Workers => WORKERS_LABEL,
        }
    }

    /// Direction a column starts in when it becomes the active key.
    /// Names read naturally A-Z, counts are most useful largest first.
    pub fn default_ascending(&self) -> bool {
        matches!(self, SortKey::Name)
    }
}

impl FromStr for SortKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(SortKey::from_index)
            .ok_or_else(|| ProtocolError::InvalidSortIndex(s.to_string()))
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortSpec {
    /// The sort in effect after selecting `key` with no prior selection.
    pub fn initial(key: SortKey) -> Self {
        Self {
            key,
            ascending: key.default_ascending(),
        }
    }

    /// Apply a sort key-press.
    ///
    /// Pressing the active key flips the direction. Switching to another
    /// key resets the direction to that key's default.
    pub fn press(&mut self, key: SortKey) {
        if self.key == key {
            self.ascending = !self.ascending;
        } else {
            *self = Self::initial(key);
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::initial(SortKey::Name)
    }
}
