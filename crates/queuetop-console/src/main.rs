//! CLI binary entry point for the queuetop dashboard.
//!
//! Usage:
//!   queuetop [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>      Path to configuration TOML file
//!   -a, --all                Show idle queues too
//!       --include <CSV>      Only show queues whose name contains one of these
//!       --exclude <CSV>      Hide queues whose name contains one of these
//!   -H, --host <HOSTS>       HOST[:PORT][;HOST[:PORT]...]
//!   -p, --port <PORT>        Port for hosts given without one
//!   -s, --sort <1-4>         Initial sort column
//!   -i, --interval <MS>      Poll interval in milliseconds
//!   -l, --log                Write a debug log
//!       --log-file <FILE>    Debug log location

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tokio::sync::mpsc;

use queuetop_console::config::{DashboardConfig, LoggingConfig};
use queuetop_console::events::{self, CONTROL_QUEUE_DEPTH, SCROLL_QUEUE_DEPTH};
use queuetop_console::poller::UPDATE_QUEUE_DEPTH;
use queuetop_console::{tui, Dashboard, DashboardChannels, Poller};
use queuetop_network::TcpStatusSource;

/// Exit status for connectivity, parse and startup failures.
const EXIT_FATAL: u8 = 2;

/// queuetop - live job-queue status for one or more daemons.
#[derive(Parser, Debug)]
#[command(name = "queuetop")]
#[command(about = "Live, sortable view of job-queue daemon status")]
#[command(version)]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show all queues, even if they have no workers or jobs.
    #[arg(short, long)]
    all: bool,

    /// Include queues containing any of these comma-separated strings.
    #[arg(long, value_name = "CSV")]
    include: Option<String>,

    /// Exclude queues containing any of these comma-separated strings.
    #[arg(long, value_name = "CSV")]
    exclude: Option<String>,

    /// Daemons to connect to (e.g., gm1:4730;gm2).
    #[arg(short = 'H', long, value_name = "HOST[:PORT][;...]")]
    host: Option<String>,

    /// Port for hosts given without one.
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Index of the column to sort by (1-4).
    #[arg(short, long, value_name = "INDEX", value_parser = clap::value_parser!(u8).range(1..=4))]
    sort: Option<u8>,

    /// Poll interval in milliseconds.
    #[arg(short, long, value_name = "MS")]
    interval: Option<u64>,

    /// Log debug output to the log file.
    #[arg(short, long)]
    log: bool,

    /// Debug log location.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply CLI overrides on top of file and environment configuration.
    fn apply(self, config: &mut DashboardConfig) {
        if self.all {
            config.filter.show_all = true;
        }
        if let Some(include) = self.include {
            config.filter.include = include;
        }
        if let Some(exclude) = self.exclude {
            config.filter.exclude = exclude;
        }
        if let Some(host) = self.host {
            config.sources.hosts = vec![host];
        }
        if let Some(port) = self.port {
            config.sources.default_port = port;
        }
        if let Some(sort) = self.sort {
            config.display.sort = sort as usize;
        }
        if let Some(interval) = self.interval {
            config.poll.interval_ms = interval;
        }
        if self.log {
            config.logging.enabled = true;
        }
        if let Some(file) = self.log_file {
            config.logging.file = file;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting");
            eprintln!("{}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> Result<(), anyhow::Error> {
    // Load configuration.
    let config_path = DashboardConfig::resolve_path(cli.config.as_deref());
    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    init_logging(&config.logging)?;
    match &config_path {
        Some(path) => tracing::debug!(path = %path.display(), "Loaded config file"),
        None => tracing::debug!("No config file, using defaults"),
    }

    let hosts = config.host_specs()?;
    let sort = config.sort_spec()?;
    let tcp_config = config.tcp_config();

    tracing::info!(
        hosts = ?hosts.iter().map(ToString::to_string).collect::<Vec<_>>(),
        interval_ms = config.poll.interval_ms,
        sort = sort.key.label(),
        "Starting queuetop"
    );

    let sources = hosts
        .into_iter()
        .map(|spec| TcpStatusSource::new(spec, tcp_config))
        .collect();
    let poller = Poller::new(sources, config.filter(), config.poll_interval());

    let (update_tx, update_rx) = mpsc::channel(UPDATE_QUEUE_DEPTH);
    let (control_tx, control_rx) = mpsc::channel(CONTROL_QUEUE_DEPTH);
    let (scroll_tx, scroll_rx) = mpsc::channel(SCROLL_QUEUE_DEPTH);

    tui::install_panic_hook();
    let terminal = tui::setup_terminal()?;
    let mut dashboard = Dashboard::new(terminal, sort);

    tokio::spawn(poller.run(update_tx));
    if let Err(e) = events::spawn_input_thread(control_tx, scroll_tx) {
        tui::restore_terminal(dashboard.terminal_mut())?;
        return Err(e.into());
    }

    let result = dashboard
        .run(DashboardChannels {
            updates: update_rx,
            control: control_rx,
            scroll: scroll_rx,
        })
        .await;

    // Restore terminal state before any error is printed.
    let restored = tui::restore_terminal(dashboard.terminal_mut());
    settle(result.map_err(Into::into), restored.map_err(Into::into))
}

/// Pick the error to report once the terminal has been restored. A
/// dashboard failure outranks a restore failure, which is only logged.
fn settle(
    dashboard: Result<(), anyhow::Error>,
    restored: Result<(), anyhow::Error>,
) -> Result<(), anyhow::Error> {
    match (dashboard, restored) {
        (Err(e), Err(restore)) => {
            tracing::warn!(error = %restore, "Failed to restore terminal");
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

/// Initialize file logging. Nothing is installed when logging is off,
/// since the dashboard owns stdout.
fn init_logging(logging: &LoggingConfig) -> Result<(), anyhow::Error> {
    if !logging.enabled {
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(())
}
