use super::cache::EndpointCache;
use super::discovery::{ResolutionError, TopologyDiscovery};
use super::types::{Endpoint, PartitionId, PartitionKey};

use async_trait::async_trait;
use std::sync::Arc;

/// Produces the current target for a partition and accepts reports that a target is stale.
#[async_trait]
pub trait Resolvable: Send + Sync {
    /// Size of the partition space keys are mapped into.
    fn partition_count(&self) -> u32;

    async fn resolve_partition(&self, partition: PartitionId) -> Result<Endpoint, ResolutionError>;

    fn invalidate(&self, partition: PartitionId);

    /// Reports that `stale` failed for `partition`.
    ///
    /// Implementations may keep a newer endpoint that replaced `stale` in the meantime.
    fn invalidate_endpoint(&self, partition: PartitionId, stale: &Endpoint) {
        let _ = stale;
        self.invalidate(partition);
    }
}

/// Endpoint resolved for a key, together with the partition it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub partition: PartitionId,
    pub endpoint: Endpoint,
}

/// Cache-backed resolver.
///
/// Both collaborators are injected so tests can substitute a fake backend and
/// inspect the cache.
pub struct PartitionResolver {
    partition_count: u32,
    cache: Arc<EndpointCache>,
    discovery: Arc<dyn TopologyDiscovery>,
}

impl PartitionResolver {
    pub fn new(
        partition_count: u32,
        cache: Arc<EndpointCache>,
        discovery: Arc<dyn TopologyDiscovery>,
    ) -> Self {
        Self {
            partition_count: partition_count.max(1),
            cache,
            discovery,
        }
    }

    pub fn partition_of<K: PartitionKey + ?Sized>(&self, key: &K) -> PartitionId {
        key.partition_id(self.partition_count)
    }

    /// Maps `key` to its partition and returns the endpoint currently believed to serve it.
    pub async fn resolve<K: PartitionKey + ?Sized>(
        &self,
        key: &K,
    ) -> Result<ResolvedEndpoint, ResolutionError> {
        let partition = self.partition_of(key);
        let endpoint = self.resolve_partition(partition).await?;
        Ok(ResolvedEndpoint {
            partition,
            endpoint,
        })
    }

    pub fn cache(&self) -> &Arc<EndpointCache> {
        &self.cache
    }
}

#[async_trait]
impl Resolvable for PartitionResolver {
    fn partition_count(&self) -> u32 {
        self.partition_count
    }

    async fn resolve_partition(&self, partition: PartitionId) -> Result<Endpoint, ResolutionError> {
        if let Some(endpoint) = self.cache.get(partition) {
            tracing::debug!("Partition {} resolved from cache: {}", partition, endpoint);
            return Ok(endpoint);
        }

        // Concurrent misses may both ask discovery; lookups are idempotent.
        let endpoint = self.discovery.resolve_partition(partition).await?;
        tracing::info!("Partition {} resolved via discovery: {}", partition, endpoint);
        self.cache.put(partition, endpoint.clone());

        Ok(endpoint)
    }

    fn invalidate(&self, partition: PartitionId) {
        if self.cache.invalidate(partition).is_some() {
            tracing::debug!("Invalidated cached endpoint for partition {}", partition);
        }
    }

    fn invalidate_endpoint(&self, partition: PartitionId, stale: &Endpoint) {
        if self.cache.invalidate_if(partition, stale) {
            tracing::debug!(
                "Invalidated stale endpoint {} for partition {}",
                stale,
                partition
            );
        }
    }
}
