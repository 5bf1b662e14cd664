//! Topology Discovery Protocol
//!
//! The HTTP contract spoken with the discovery backend. The backend answers which
//! replica is the primary of a partition at the time of the request.

use serde::{Deserialize, Serialize};

/// Endpoint returning the current location of a partition: `{ENDPOINT_PARTITIONS}/{id}`.
pub const ENDPOINT_PARTITIONS: &str = "/partitions";

/// Discovery answer for a single partition.
#[derive(Debug, Serialize, Deserialize)]
pub struct PartitionLocation {
    /// The partition the answer refers to.
    pub partition: u32,
    /// Base URL of the partition's primary replica.
    pub endpoint: String,
}
