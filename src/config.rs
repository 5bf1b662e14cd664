//! Gateway Configuration
//!
//! Settings are read from environment variables:
//! - `GATEWAY_BIND`: listen address (default `127.0.0.1:8080`).
//! - `DISCOVERY_URL`: base URL of the topology discovery backend, or
//! - `PARTITION_ENDPOINTS`: static table, e.g. `0=http://10.0.0.1:8081,4=http://10.0.0.2:8081`.
//! - `PARTITION_COUNT`: size of the partition space (default 10, one per item category).
//! - `DISPATCH_MAX_ATTEMPTS`: attempt budget per invocation (default 5).
//! - `DISPATCH_ATTEMPT_TIMEOUT_MS`: per-attempt deadline (default 2000).

use crate::invoker::policy::RetryPolicy;
use crate::routing::types::{Endpoint, PartitionId};

use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_PARTITION_COUNT: u32 = 10;

/// Where partition endpoints come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
    Discovery { url: String },
    Static { endpoints: Vec<(PartitionId, Endpoint)> },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub topology: TopologySource,
    pub partition_count: u32,
    pub policy: RetryPolicy,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("GATEWAY_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .context("GATEWAY_BIND is not a socket address")?;

        let topology = match (lookup("DISCOVERY_URL"), lookup("PARTITION_ENDPOINTS")) {
            (Some(url), _) if !url.trim().is_empty() => TopologySource::Discovery {
                url: url.trim().to_string(),
            },
            (_, Some(table)) => TopologySource::Static {
                endpoints: parse_endpoint_table(&table)?,
            },
            _ => bail!("either DISCOVERY_URL or PARTITION_ENDPOINTS must be set"),
        };

        let partition_count = match lookup("PARTITION_COUNT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .context("PARTITION_COUNT is not a number")?,
            None => DEFAULT_PARTITION_COUNT,
        };
        if partition_count == 0 {
            bail!("PARTITION_COUNT must be positive");
        }

        let mut policy = RetryPolicy::default();
        if let Some(raw) = lookup("DISPATCH_MAX_ATTEMPTS") {
            let max_attempts = raw
                .trim()
                .parse::<u32>()
                .context("DISPATCH_MAX_ATTEMPTS is not a number")?;
            policy = policy.with_max_attempts(max_attempts);
        }
        if let Some(raw) = lookup("DISPATCH_ATTEMPT_TIMEOUT_MS") {
            let timeout_ms = raw
                .trim()
                .parse::<u64>()
                .context("DISPATCH_ATTEMPT_TIMEOUT_MS is not a number")?;
            policy = policy.with_attempt_timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self {
            bind_addr,
            topology,
            partition_count,
            policy,
        })
    }
}

/// Parses `"<partition>=<base url>"` pairs separated by commas.
pub fn parse_endpoint_table(table: &str) -> Result<Vec<(PartitionId, Endpoint)>> {
    let mut endpoints = Vec::new();

    for pair in table.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (partition, url) = pair
            .split_once('=')
            .with_context(|| format!("invalid partition endpoint '{}'", pair))?;
        let partition: u32 = partition
            .trim()
            .parse()
            .with_context(|| format!("invalid partition number in '{}'", pair))?;
        let url = url.trim();
        if url.is_empty() {
            bail!("missing endpoint for partition {}", partition);
        }
        endpoints.push((PartitionId(partition), Endpoint::new(url)));
    }

    if endpoints.is_empty() {
        bail!("PARTITION_ENDPOINTS is empty");
    }
    Ok(endpoints)
}
