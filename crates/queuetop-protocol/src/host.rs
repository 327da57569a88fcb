//! Parsing of `HOST[:PORT][;HOST[:PORT]...]` host lists.

use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT};
use crate::error::ProtocolError;

/// Address of one queue daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostSpec {
    pub host: String,
    pub port: u16,
}

impl HostSpec {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a single `HOST[:PORT]` entry, using `default_port` when the
    /// port is omitted. IPv6 literals must be bracketed: `[::1]:4730`.
    pub fn parse_with_default(entry: &str, default_port: u16) -> Result<Self, ProtocolError> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(ProtocolError::InvalidHost(entry.to_string()));
        }

        let (host, port) = if let Some(rest) = entry.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| ProtocolError::InvalidHost(entry.to_string()))?;
            match after {
                "" => (host, None),
                _ => match after.strip_prefix(':') {
                    Some(port) => (host, Some(port)),
                    None => return Err(ProtocolError::InvalidHost(entry.to_string())),
                },
            }
        } else {
            match entry.split_once(':') {
                Some((_, rest)) if rest.contains(':') => {
                    return Err(ProtocolError::InvalidHost(entry.to_string()));
                }
                Some((host, port)) => (host, Some(port)),
                None => (entry, None),
            }
        };

        if host.is_empty() {
            return Err(ProtocolError::InvalidHost(entry.to_string()));
        }

        let port = match port {
            Some(p) => p.parse::<u16>().map_err(|_| ProtocolError::InvalidPort {
                host: host.to_string(),
                port: p.to_string(),
            })?,
            None => default_port,
        };

        Ok(Self::new(host, port))
    }

    /// `host:port` form accepted by `tokio::net::TcpStream::connect`.
    pub fn connect_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for HostSpec {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.connect_addr())
    }
}

impl FromStr for HostSpec {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostSpec::parse_with_default(s, DEFAULT_PORT)
    }
}

/// Parse a `;`-separated host list. Empty entries are skipped; an empty
/// list yields the default host.
pub fn parse_host_list(list: &str, default_port: u16) -> Result<Vec<HostSpec>, ProtocolError> {
    let mut hosts = list
        .split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| HostSpec::parse_with_default(entry, default_port))
        .collect::<Result<Vec<_>, _>>()?;

    if hosts.is_empty() {
        hosts.push(HostSpec::new(DEFAULT_HOST, default_port));
    }
    Ok(hosts)
}
