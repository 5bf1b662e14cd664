//! Shared fixtures for the module tests: scripted discovery backends and
//! throwaway HTTP servers bound to ephemeral ports.

use crate::invoker::policy::{Backoff, RetryPolicy};
use crate::routing::discovery::{ResolutionError, TopologyDiscovery};
use crate::routing::types::{Endpoint, PartitionId};

use async_trait::async_trait;
use axum::Router;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Discovery backend that answers from a script, then repeats its fallback forever.
pub struct ScriptedDiscovery {
    script: Mutex<VecDeque<Result<Endpoint, ResolutionError>>>,
    fallback: Result<Endpoint, ResolutionError>,
    lookups: AtomicUsize,
}

impl ScriptedDiscovery {
    pub fn always(endpoint: &str) -> Self {
        Self::scripted(Vec::new(), Ok(Endpoint::new(endpoint)))
    }

    pub fn failing(error: ResolutionError) -> Self {
        Self::scripted(Vec::new(), Err(error))
    }

    pub fn scripted(
        script: Vec<Result<Endpoint, ResolutionError>>,
        fallback: Result<Endpoint, ResolutionError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopologyDiscovery for ScriptedDiscovery {
    async fn resolve_partition(&self, _partition: PartitionId) -> Result<Endpoint, ResolutionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Retry policy without sleeps, so tests only wait on the calls themselves.
pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        attempt_timeout: Duration::from_millis(500),
        routing_backoff: Backoff::none(),
        resolution_backoff: Backoff::none(),
    }
}

/// Serves `app` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(app: Router) -> Endpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Endpoint::new(format!("http://{}", addr))
}

/// An endpoint nobody listens on: connections are refused.
pub async fn closed_endpoint() -> Endpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Endpoint::new(format!("http://{}", addr))
}
