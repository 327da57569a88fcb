//! Configuration loading from TOML and environment variables.
//!
//! The dashboard reads its configuration from:
//! 1. A TOML config file (default: `<config dir>/queuetop/queuetop.toml`)
//! 2. Environment variables (override TOML values)
//! 3. Command-line flags (override both, applied by the binary)
//!
//! Environment variable prefix: QUEUETOP_

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use queuetop_network::TcpSourceConfig;
use queuetop_protocol::{
    parse_host_list, HostSpec, ProtocolError, SortKey, SortSpec, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_MS,
};
use queuetop_state::Filter;

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Queue daemons to poll.
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Poll loop timing.
    #[serde(default)]
    pub poll: PollConfig,
    /// Row visibility rules.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Initial presentation.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Debug log file.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Queue daemon addresses and connection limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Entries of the form `HOST[:PORT]`; an entry may itself hold a
    /// `;`-separated list.
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,
    /// Port used for hosts given without one.
    #[serde(default = "default_port")]
    pub default_port: u16,
    /// TCP connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Timeout for one status round trip in milliseconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Time between the starts of two poll cycles, in milliseconds.
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Show queues with nothing queued, running or attached.
    #[serde(default)]
    pub show_all: bool,
    /// Comma-separated name substrings to include.
    #[serde(default)]
    pub include: String,
    /// Comma-separated name substrings to exclude.
    #[serde(default)]
    pub exclude: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// 1-based index of the initial sort column.
    #[serde(default = "default_sort")]
    pub sort: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to write a debug log at all.
    #[serde(default)]
    pub enabled: bool,
    /// Log level filter (e.g., "debug", "queuetop_network=trace").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// File the log is appended to.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

// -- Defaults --

fn default_hosts() -> Vec<String> {
    vec![queuetop_protocol::DEFAULT_HOST.to_string()]
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}
fn default_read_timeout() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}
fn default_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_sort() -> usize {
    SortKey::Name.index()
}
fn default_log_level() -> String {
    "debug".to_string()
}
fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("queuetop.log")
}

// -- Trait impls --

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            default_port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sort: default_sort(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: DashboardConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Default location of the config file, if the platform has a config
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("queuetop").join("queuetop.toml"))
    }

    /// The file `load` reads: the explicit path if given, otherwise the
    /// default path when that file exists.
    pub fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
        match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        }
    }

    /// Load configuration from a TOML file, with environment variable overrides.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file silently yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let mut config = match Self::resolve_path(path) {
            Some(path) => Self::from_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `QUEUETOP_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("QUEUETOP_HOSTS") {
            self.sources.hosts = vec![val];
        }
        if let Some(val) = lookup("QUEUETOP_PORT") {
            if let Ok(port) = val.parse() {
                self.sources.default_port = port;
            }
        }
        if let Some(val) = lookup("QUEUETOP_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                self.poll.interval_ms = ms;
            }
        }
        if let Some(val) = lookup("QUEUETOP_SHOW_ALL") {
            self.filter.show_all = val == "true" || val == "1";
        }
        if let Some(val) = lookup("QUEUETOP_INCLUDE") {
            self.filter.include = val;
        }
        if let Some(val) = lookup("QUEUETOP_EXCLUDE") {
            self.filter.exclude = val;
        }
        if let Some(val) = lookup("QUEUETOP_SORT") {
            if let Ok(sort) = val.parse() {
                self.display.sort = sort;
            }
        }
        if let Some(val) = lookup("QUEUETOP_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("QUEUETOP_LOG_FILE") {
            self.logging.file = PathBuf::from(val);
        }
    }

    /// Parse the configured host entries.
    pub fn host_specs(&self) -> Result<Vec<HostSpec>, ProtocolError> {
        parse_host_list(&self.sources.hosts.join(";"), self.sources.default_port)
    }

    pub fn filter(&self) -> Filter {
        Filter::new(
            self.filter.show_all,
            &self.filter.include,
            &self.filter.exclude,
        )
    }

    /// The sort in effect at startup.
    pub fn sort_spec(&self) -> Result<SortSpec, ProtocolError> {
        SortKey::from_index(self.display.sort)
            .map(SortSpec::initial)
            .ok_or_else(|| ProtocolError::InvalidSortIndex(self.display.sort.to_string()))
    }

    pub fn tcp_config(&self) -> TcpSourceConfig {
        TcpSourceConfig {
            connect_timeout: Duration::from_millis(self.sources.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.sources.read_timeout_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }
}
