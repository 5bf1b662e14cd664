//! Partition Routing Module
//!
//! Resolves logical keys to the network endpoint of the replica currently serving them.
//!
//! ## Core Concepts
//! - **Partitioning**: A key maps deterministically to a fixed partition identifier.
//! - **Caching**: `EndpointCache` keeps the last-known endpoint per partition. Entries are
//!   believed valid, never guaranteed; staleness is discovered by failed calls.
//! - **Discovery**: `TopologyDiscovery` backends answer "who serves partition N right now".
//! - **Resolution**: `PartitionResolver` combines the three and supports invalidation.

pub mod cache;
pub mod discovery;
pub mod protocol;
pub mod resolver;
pub mod types;
