//! queuetop state - the status aggregation engine
//!
//! Pure, synchronous building blocks driven by the poll loop and the
//! coordination loop:
//! - `Filter` for idle-queue hiding and include/exclude name terms
//! - `merge` to collapse rows from several daemons by job name
//! - `sort` with one comparator per `SortKey`
//! - `Viewport` for clamped scrolling over the current table

pub mod filter;
pub mod merge;
pub mod sort;
pub mod viewport;

pub use filter::Filter;
pub use merge::merge;
pub use sort::{compare, sort_rows, sort_snapshot};
pub use viewport::{ScrollDirection, Viewport};
