/// Default gearmand admin port.
pub const DEFAULT_PORT: u16 = 4730;

/// Host polled when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Default poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default TCP connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

/// Default upper bound on a single `status` round trip in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;

/// Admin command that asks the daemon for its queue table.
pub const STATUS_COMMAND: &[u8] = b"status\n";

/// Line that terminates a `status` response.
pub const STATUS_TERMINATOR: &str = ".";

/// Number of whitespace-separated tokens in a status line.
pub const STATUS_FIELD_COUNT: usize = 4;

/// Extra cells added to every computed column width.
pub const COLUMN_PADDING: usize = 1;

/// Cells between two adjacent columns.
pub const COLUMN_SEPARATOR_WIDTH: usize = 1;

/// Number of column separators in a rendered line.
pub const COLUMN_SEPARATORS: usize = 3;

/// Rows reserved for the header line.
pub const HEADER_ROWS: usize = 1;

/// Rows reserved for the footer line.
pub const FOOTER_ROWS: usize = 1;

/// Column header labels, in display order.
pub const NAME_LABEL: &str = "Job name";
pub const QUEUED_LABEL: &str = "Queued";
pub const RUNNING_LABEL: &str = "Running";
pub const WORKERS_LABEL: &str = "Workers";
