//! queuetop console - live terminal dashboard for job-queue daemons
//!
//! Wires the status sources, the aggregation engine and the terminal
//! together:
//! - `poller` fetches every host on a fixed interval and publishes snapshots
//! - `events` decodes terminal input on a dedicated thread
//! - `dashboard` owns all view state and reconciles both into redraws
//! - `tui` draws the table with ratatui
//!
//! Configuration comes from a TOML file, `QUEUETOP_*` environment
//! variables and command-line flags, in increasing precedence.

pub mod config;
pub mod dashboard;
pub mod events;
pub mod poller;
pub mod tui;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardChannels, DashboardError};
pub use poller::{PollUpdate, Poller};
