use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of a disjoint shard of the service keyspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(pub u32);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base URL of the replica currently serving a partition.
///
/// Stored without a trailing slash so resource paths can be appended directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self(base_url.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a resource path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.0, path)
        } else {
            format!("{}/{}", self.0, path)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value that selects the partition owning an operation.
///
/// The mapping must be deterministic and cover the whole partition space.
pub trait PartitionKey {
    fn partition_id(&self, partition_count: u32) -> PartitionId;
}

impl PartitionKey for str {
    fn partition_id(&self, partition_count: u32) -> PartitionId {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        let hash = hasher.finish() as u32;
        PartitionId(hash % partition_count.max(1))
    }
}

impl PartitionKey for String {
    fn partition_id(&self, partition_count: u32) -> PartitionId {
        self.as_str().partition_id(partition_count)
    }
}

impl PartitionKey for PartitionId {
    fn partition_id(&self, partition_count: u32) -> PartitionId {
        PartitionId(self.0 % partition_count.max(1))
    }
}
