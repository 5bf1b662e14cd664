//! Topology Discovery Backends
//!
//! A discovery backend answers which replica currently serves a partition. Lookups
//! are idempotent and side-effect free from the resolver's point of view, so they can
//! be repeated freely whenever a cached endpoint turns out to be stale.

use super::protocol::{ENDPOINT_PARTITIONS, PartitionLocation};
use super::types::{Endpoint, PartitionId};

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use thiserror::Error;

/// Failure to find the current owner of a partition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// The discovery backend could not be reached or did not answer in time.
    #[error("discovery backend unreachable for partition {partition}: {reason}")]
    Unreachable { partition: PartitionId, reason: String },

    /// The backend answered but no replica currently owns the partition.
    #[error("no owner registered for partition {partition}")]
    NoOwner { partition: PartitionId },

    /// The backend answered with something that is not a usable location.
    #[error("malformed discovery answer for partition {partition}: {reason}")]
    Malformed { partition: PartitionId, reason: String },
}

/// Source of truth for the service topology.
#[async_trait]
pub trait TopologyDiscovery: Send + Sync {
    async fn resolve_partition(&self, partition: PartitionId) -> Result<Endpoint, ResolutionError>;
}

/// Discovery over HTTP: `GET {base}/partitions/{id}`.
pub struct HttpTopologyDiscovery {
    base_url: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpTopologyDiscovery {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl TopologyDiscovery for HttpTopologyDiscovery {
    async fn resolve_partition(&self, partition: PartitionId) -> Result<Endpoint, ResolutionError> {
        let url = format!("{}{}/{}", self.base_url, ENDPOINT_PARTITIONS, partition);

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ResolutionError::Unreachable {
                partition,
                reason: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolutionError::NoOwner { partition });
        }
        if !response.status().is_success() {
            return Err(ResolutionError::Unreachable {
                partition,
                reason: format!("discovery returned {}", response.status()),
            });
        }

        let location: PartitionLocation =
            response
                .json()
                .await
                .map_err(|e| ResolutionError::Malformed {
                    partition,
                    reason: e.to_string(),
                })?;

        if location.partition != partition.0 {
            return Err(ResolutionError::Malformed {
                partition,
                reason: format!("answer refers to partition {}", location.partition),
            });
        }
        if location.endpoint.trim().is_empty() {
            return Err(ResolutionError::NoOwner { partition });
        }

        Ok(Endpoint::new(location.endpoint))
    }
}

/// In-process topology table.
///
/// Used when partition endpoints are configured directly. `relocate` moves a
/// partition to a new replica at runtime, which is also how tests simulate a
/// primary moving.
#[derive(Debug, Default)]
pub struct StaticTopology {
    locations: DashMap<PartitionId, Endpoint>,
}

impl StaticTopology {
    pub fn new() -> Self {
        Self {
            locations: DashMap::new(),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (PartitionId, Endpoint)>) -> Self {
        let topology = Self::new();
        for (partition, endpoint) in pairs {
            topology.relocate(partition, endpoint);
        }
        topology
    }

    pub fn relocate(&self, partition: PartitionId, endpoint: Endpoint) {
        tracing::debug!("Partition {} now served by {}", partition, endpoint);
        self.locations.insert(partition, endpoint);
    }

    pub fn remove(&self, partition: PartitionId) {
        self.locations.remove(&partition);
    }
}

#[async_trait]
impl TopologyDiscovery for StaticTopology {
    async fn resolve_partition(&self, partition: PartitionId) -> Result<Endpoint, ResolutionError> {
        self.locations
            .get(&partition)
            .map(|entry| entry.value().clone())
            .ok_or(ResolutionError::NoOwner { partition })
    }
}
