use super::types::{Endpoint, PartitionId};

use dashmap::DashMap;

/// Last-known endpoint per partition.
///
/// Absence of an entry means "unknown or stale". Entries have no expiry; they are
/// only removed when a caller reports the endpoint as wrong. Endpoints are replaced
/// whole, readers never observe a partially written value.
#[derive(Debug, Default)]
pub struct EndpointCache {
    entries: DashMap<PartitionId, Endpoint>,
}

impl EndpointCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, partition: PartitionId) -> Option<Endpoint> {
        self.entries
            .get(&partition)
            .map(|entry| entry.value().clone())
    }

    pub fn put(&self, partition: PartitionId, endpoint: Endpoint) {
        self.entries.insert(partition, endpoint);
    }

    /// Drops the entry for `partition`, forcing the next resolution to ask discovery.
    pub fn invalidate(&self, partition: PartitionId) -> Option<Endpoint> {
        self.entries.remove(&partition).map(|(_, endpoint)| endpoint)
    }

    /// Drops the entry only while it still points at `stale`.
    ///
    /// A concurrent invocation may already have refreshed the partition; its newer
    /// endpoint is kept.
    pub fn invalidate_if(&self, partition: PartitionId, stale: &Endpoint) -> bool {
        self.entries
            .remove_if(&partition, |_, current| current == stale)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
