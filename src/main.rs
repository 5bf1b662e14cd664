use partition_dispatch::config::{GatewayConfig, TopologySource};
use partition_dispatch::inventory::handlers::{GatewayState, router};
use partition_dispatch::inventory::operations::InventoryClient;
use partition_dispatch::invoker::invoker::RetryingInvoker;
use partition_dispatch::routing::cache::EndpointCache;
use partition_dispatch::routing::discovery::{
    HttpTopologyDiscovery, StaticTopology, TopologyDiscovery,
};
use partition_dispatch::routing::resolver::PartitionResolver;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;

    // 1. Topology discovery:
    let discovery: Arc<dyn TopologyDiscovery> = match &config.topology {
        TopologySource::Discovery { url } => {
            tracing::info!("Resolving partitions via discovery at {}", url);
            Arc::new(HttpTopologyDiscovery::new(url, config.policy.attempt_timeout))
        }
        TopologySource::Static { endpoints } => {
            tracing::info!("Using static topology with {} partition(s)", endpoints.len());
            Arc::new(StaticTopology::from_pairs(endpoints.clone()))
        }
    };

    // 2. Routing and retry layers:
    let cache = Arc::new(EndpointCache::new());
    let resolver = Arc::new(PartitionResolver::new(
        config.partition_count,
        cache,
        discovery,
    ));
    let invoker = Arc::new(RetryingInvoker::new(resolver, config.policy.clone()));

    // 3. HTTP Router:
    let shutdown = CancellationToken::new();
    let state = Arc::new(GatewayState {
        client: InventoryClient::new(invoker.clone()),
        shutdown: shutdown.clone(),
    });
    let app = router(state);

    // 4. Start HTTP server:
    tracing::info!(
        "Inventory gateway listening on {} (max {} attempts, {:?} per attempt)",
        config.bind_addr,
        invoker.policy().max_attempts,
        invoker.policy().attempt_timeout
    );
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down, cancelling in-flight invocations");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
