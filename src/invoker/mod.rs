//! Retrying Invocation Module
//!
//! Executes a unit of remote work against the endpoint that currently serves a
//! partition and recovers from stale routing.
//!
//! ## Failure Model
//! - **Routing failures** (refused connection, timeout, "not primary" signal): the cached
//!   endpoint is invalidated, the partition re-resolved and the call retried with backoff.
//! - **Application failures** (the service answered and rejected the request): surfaced
//!   immediately as an operation error; the answer would not change on retry.
//! - **Resolution failures**: the discovery backend is in trouble; retried with a
//!   separate, slower backoff.
//! - **Cancellation**: cooperative and per invocation, checked before every attempt and
//!   raced against every suspension point.
//!
//! ## Submodules
//! - **`error`**: Per-attempt classification and the terminal error taxonomy.
//! - **`policy`**: Attempt budget, per-attempt timeout and backoff schedules.
//! - **`invoker`**: The bounded retry loop.

pub mod error;
pub mod invoker;
pub mod policy;
