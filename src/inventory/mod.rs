//! Inventory Service Module
//!
//! The inventory catalog is partitioned by item category: every operation is routed to
//! the replica that owns the category's partition.
//!
//! ## Submodules
//! - **`types`**: Item model, categories and request/response envelopes.
//! - **`protocol`**: Resource paths of the inventory backend API.
//! - **`operations`**: Request builders and response classifiers handed to the invoker.
//! - **`handlers`**: HTTP handlers of the gateway binary.

pub mod handlers;
pub mod operations;
pub mod protocol;
pub mod types;

#[cfg(test)]
mod tests;
