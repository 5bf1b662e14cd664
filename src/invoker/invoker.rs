//! Bounded Retry Loop
//!
//! One invocation is a sequence of attempts. Each attempt resolves the partition
//! (cache first, discovery on a miss) and runs the operation against the endpoint.
//!
//! ## Attempt Lifecycle
//! 1. **Cancellation check**: a cancelled token ends the invocation before any work.
//! 2. **Resolve**: failures back off on the resolution schedule and count as an attempt.
//! 3. **Execute**: the operation runs under the per-attempt timeout.
//! 4. **Classify**: success returns, application failures return at once, routing
//!    failures invalidate the endpoint and retry while the budget allows.

use super::error::{AttemptError, DispatchError, Retryable};
use super::policy::RetryPolicy;
use crate::routing::resolver::Resolvable;
use crate::routing::types::{Endpoint, PartitionKey};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs operations against the current owner of a partition, healing stale routes.
///
/// Holds no per-invocation state; any number of invocations may run concurrently
/// against the same resolver.
pub struct RetryingInvoker<R: Resolvable> {
    resolver: Arc<R>,
    policy: RetryPolicy,
}

impl<R: Resolvable> RetryingInvoker<R> {
    pub fn new(resolver: Arc<R>, policy: RetryPolicy) -> Self {
        Self { resolver, policy }
    }

    pub fn resolver(&self) -> &Arc<R> {
        &self.resolver
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invokes `operation` with the attempt budget of the configured policy.
    pub async fn invoke<K, T, F, Fut>(
        &self,
        key: &K,
        cancel: &CancellationToken,
        operation: F,
    ) -> Result<T, DispatchError>
    where
        K: PartitionKey + ?Sized,
        F: FnMut(Endpoint) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        self.invoke_with_retry(key, operation, self.policy.max_attempts, cancel)
            .await
    }

    /// Invokes `operation` against the partition owning `key`, performing at most
    /// `max_attempts` resolution + call cycles.
    pub async fn invoke_with_retry<K, T, F, Fut>(
        &self,
        key: &K,
        mut operation: F,
        max_attempts: u32,
        cancel: &CancellationToken,
    ) -> Result<T, DispatchError>
    where
        K: PartitionKey + ?Sized,
        F: FnMut(Endpoint) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = max_attempts.max(1);
        let partition = key.partition_id(self.resolver.partition_count());
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(
                    "Invocation for partition {} cancelled before attempt {}",
                    partition,
                    attempt + 1
                );
                return Err(DispatchError::Cancelled);
            }
            attempt += 1;

            let resolved = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
                resolved = self.resolver.resolve_partition(partition) => resolved,
            };

            let endpoint = match resolved {
                Ok(endpoint) => endpoint,
                Err(err) => {
                    if !err.is_retryable() || attempt >= max_attempts {
                        return Err(DispatchError::Resolution {
                            partition,
                            attempts: attempt,
                            source: err,
                        });
                    }
                    tracing::warn!(
                        "Attempt {}/{}: resolution failed: {}",
                        attempt,
                        max_attempts,
                        err
                    );
                    self.pause(self.policy.resolution_backoff.delay(attempt), cancel)
                        .await?;
                    continue;
                }
            };

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
                outcome = tokio::time::timeout(
                    self.policy.attempt_timeout,
                    operation(endpoint.clone()),
                ) => outcome,
            };

            let failure = match outcome {
                Ok(Ok(value)) => {
                    if attempt > 1 {
                        tracing::info!(
                            "Partition {} succeeded on {} after {} attempt(s)",
                            partition,
                            endpoint,
                            attempt
                        );
                    }
                    return Ok(value);
                }
                Ok(Err(failure)) => failure,
                Err(_) => AttemptError::routing(format!(
                    "no response from {} within {:?}",
                    endpoint, self.policy.attempt_timeout
                )),
            };

            if !failure.is_retryable() {
                return Err(match failure {
                    AttemptError::Application { status, reason } => {
                        DispatchError::Operation { status, reason }
                    }
                    AttemptError::Routing { reason } => DispatchError::Transport {
                        partition,
                        attempts: attempt,
                        reason,
                    },
                });
            }

            self.resolver.invalidate_endpoint(partition, &endpoint);

            if attempt >= max_attempts {
                return Err(DispatchError::Transport {
                    partition,
                    attempts: attempt,
                    reason: failure.to_string(),
                });
            }

            tracing::warn!(
                "Attempt {}/{} against {} for partition {} failed: {}",
                attempt,
                max_attempts,
                endpoint,
                partition,
                failure
            );
            self.pause(self.policy.routing_backoff.delay(attempt), cancel)
                .await?;
        }
    }

    async fn pause(&self, delay: Duration, cancel: &CancellationToken) -> Result<(), DispatchError> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DispatchError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
