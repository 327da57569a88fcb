//! queuetop protocol - shared types for the queue status dashboard
//!
//! Defines the data that flows between the status sources, the
//! aggregation engine and the terminal renderer:
//! - `StatusRow` and its lenient `Counter` fields, parsed from the
//!   gearmand admin `status` text protocol
//! - `Snapshot` with derived `ColumnWidths`
//! - `SortKey` / `SortSpec` with the key-press toggle rule
//! - `HostSpec` parsing for `HOST[:PORT][;HOST[:PORT]...]`

pub mod constants;
pub mod error;
pub mod host;
pub mod types;

pub use constants::*;
pub use error::*;
pub use host::*;
pub use types::*;
