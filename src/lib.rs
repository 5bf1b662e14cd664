//! Partition-Aware Dispatch Library
//!
//! Routes logical operations to the replica that currently owns their partition and
//! runs the remote call with automatic recovery from stale routing information.
//! The binary (`main.rs`) hosts an HTTP gateway on top of it for the inventory service.
//!
//! ## Architecture Modules
//! - **`routing`**: Partition addressing. Maps logical keys to partition identifiers,
//!   caches the last-known endpoint per partition and refreshes it through topology discovery.
//! - **`invoker`**: The retry layer. Executes a unit of work against a resolved endpoint,
//!   classifies failures (routing vs application) and re-resolves with bounded backoff.
//! - **`inventory`**: The inventory operations (list, get, create, adjust quantity)
//!   expressed as request/response functions handed to the invoker, plus the gateway handlers.
//! - **`config`**: Environment-driven settings for the gateway binary.

pub mod config;
pub mod inventory;
pub mod invoker;
pub mod routing;

#[cfg(test)]
pub(crate) mod test_support;
