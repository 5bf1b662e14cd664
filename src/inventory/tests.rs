//! Inventory Module Tests
//!
//! Exercises the operation definitions end to end against in-process replicas.
//!
//! ## Test Scopes
//! - **Data Types**: Category ordinals as partition numbers, display labels, request mapping.
//! - **Operations**: Request paths and response classification against a fake backend.
//! - **Relocation**: A refused or "not primary" replica is abandoned for the new primary.
//! - **Gateway**: HTTP handlers map dispatch outcomes to status codes.

#[cfg(test)]
mod tests {
    use crate::inventory::handlers::{
        AdjustResponse, ErrorResponse, GatewayState, ItemDetailResponse, ItemListResponse, router,
    };
    use crate::inventory::operations::InventoryClient;
    use crate::inventory::types::{
        InventoryItem, InventoryItemType, InventoryRequest, InventoryResponse, QuantityChange,
    };
    use crate::invoker::error::DispatchError;
    use crate::invoker::invoker::RetryingInvoker;
    use crate::routing::cache::EndpointCache;
    use crate::routing::discovery::StaticTopology;
    use crate::routing::resolver::PartitionResolver;
    use crate::routing::types::{Endpoint, PartitionId, PartitionKey};
    use crate::test_support::{closed_endpoint, fast_policy, spawn_server};
    use axum::{
        Json, Router,
        extract::{Extension, Path},
        http::StatusCode,
        routing::{get, post},
    };
    use dashmap::DashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    // ============================================================
    // FAKE INVENTORY REPLICA
    // ============================================================

    #[derive(Default)]
    struct Replica {
        items: DashMap<Uuid, InventoryItem>,
        requests: AtomicUsize,
    }

    async fn list(Extension(replica): Extension<Arc<Replica>>) -> Json<Vec<InventoryItem>> {
        replica.requests.fetch_add(1, Ordering::SeqCst);
        Json(replica.items.iter().map(|e| e.value().clone()).collect())
    }

    async fn create(
        Extension(replica): Extension<Arc<Replica>>,
        Json(item): Json<InventoryItem>,
    ) -> (StatusCode, Json<InventoryItem>) {
        replica.requests.fetch_add(1, Ordering::SeqCst);
        replica.items.insert(item.item_id, item.clone());
        (StatusCode::CREATED, Json(item))
    }

    async fn get_one(
        Extension(replica): Extension<Arc<Replica>>,
        Path(item_id): Path<Uuid>,
    ) -> Result<Json<InventoryItem>, (StatusCode, &'static str)> {
        replica.requests.fetch_add(1, Ordering::SeqCst);
        replica
            .items
            .get(&item_id)
            .map(|e| Json(e.value().clone()))
            .ok_or((StatusCode::NOT_FOUND, "item not found"))
    }

    async fn add(
        Extension(replica): Extension<Arc<Replica>>,
        Path((item_id, quantity)): Path<(Uuid, i32)>,
    ) -> Result<StatusCode, (StatusCode, &'static str)> {
        replica.requests.fetch_add(1, Ordering::SeqCst);
        let mut item = replica
            .items
            .get_mut(&item_id)
            .ok_or((StatusCode::NOT_FOUND, "item not found"))?;
        item.inventory_count += quantity;
        Ok(StatusCode::OK)
    }

    async fn remove(
        Extension(replica): Extension<Arc<Replica>>,
        Path((item_id, quantity)): Path<(Uuid, i32)>,
    ) -> Result<StatusCode, (StatusCode, &'static str)> {
        replica.requests.fetch_add(1, Ordering::SeqCst);
        let mut item = replica
            .items
            .get_mut(&item_id)
            .ok_or((StatusCode::NOT_FOUND, "item not found"))?;
        if item.inventory_count < quantity {
            return Err((StatusCode::BAD_REQUEST, "insufficient stock"));
        }
        item.inventory_count -= quantity;
        Ok(StatusCode::OK)
    }

    async fn spawn_replica(replica: Arc<Replica>) -> Endpoint {
        let app = Router::new()
            .route("/api/inventory", get(list).post(create))
            .route("/api/inventory/:item_id", get(get_one))
            .route("/api/inventory/:item_id/addinventory/:quantity", post(add))
            .route("/api/inventory/:item_id/removeinventory/:quantity", post(remove))
            .layer(Extension(replica));
        spawn_server(app).await
    }

    /// A replica that lost its primary role: answers everything with 421.
    async fn spawn_demoted_replica(hits: Arc<AtomicUsize>) -> Endpoint {
        let app = Router::new().fallback(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::MISDIRECTED_REQUEST, "not primary")
            }
        });
        spawn_server(app).await
    }

    fn client_for(topology: Arc<StaticTopology>, max_attempts: u32) -> InventoryClient<PartitionResolver> {
        let resolver = Arc::new(PartitionResolver::new(
            10,
            Arc::new(EndpointCache::new()),
            topology,
        ));
        InventoryClient::new(Arc::new(RetryingInvoker::new(
            resolver,
            fast_policy(max_attempts),
        )))
    }

    fn stocked(replica: &Replica, item_type: InventoryItemType, name: &str, count: i32) -> InventoryItem {
        let mut item = InventoryItem::new(item_type, name);
        item.inventory_count = count;
        replica.items.insert(item.item_id, item.clone());
        item
    }

    // ============================================================
    // DATA TYPE TESTS
    // ============================================================

    #[test]
    fn test_category_ordinal_is_partition() {
        for (ordinal, item_type) in InventoryItemType::ALL.iter().enumerate() {
            assert_eq!(item_type.partition_id(10), PartitionId(ordinal as u32));
        }
        assert_eq!(InventoryItemType::Hardware.partition_id(10), PartitionId(4));
        assert_eq!(InventoryItemType::PowerTools.partition_id(4), PartitionId(1));
    }

    #[test]
    fn test_display_label() {
        let item = InventoryItem::new(InventoryItemType::HandTools, "Claw hammer");
        assert_eq!(item.display_label(), "Claw hammer (HandTools)");
        assert_eq!(item.inventory_count, 0);
    }

    #[test]
    fn test_item_json_shape() {
        let item = InventoryItem::new(InventoryItemType::LawnGarden, "Rake");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["item_type"], "LawnGarden");
        assert_eq!(json["name"], "Rake");
        assert_eq!(json["item_id"], item.item_id.to_string());
        assert_eq!(json["inventory_count"], 0);
        assert!(json.get("ItemType").is_none());
    }

    #[test]
    fn test_quantity_change_maps_to_request() {
        let item_id = Uuid::new_v4();
        let add: InventoryRequest = QuantityChange {
            item_id,
            item_type: InventoryItemType::Paint,
            is_add: true,
            quantity: 3,
        }
        .into();
        assert_eq!(add, InventoryRequest::IncreaseQuantity { item_id, quantity: 3 });
        assert_eq!(add.kind(), "increase_quantity");

        let remove: InventoryRequest = QuantityChange {
            item_id,
            item_type: InventoryItemType::Paint,
            is_add: false,
            quantity: 2,
        }
        .into();
        assert_eq!(remove, InventoryRequest::DecreaseQuantity { item_id, quantity: 2 });
    }

    // ============================================================
    // OPERATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let replica = Arc::new(Replica::default());
        let nails = stocked(&replica, InventoryItemType::Hardware, "Nails", 100);
        stocked(&replica, InventoryItemType::Paint, "Primer", 4);
        let endpoint = spawn_replica(replica.clone()).await;

        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(4), endpoint)]));
        let client = client_for(topology, 3);
        let cancel = CancellationToken::new();

        let items = client
            .list_items(InventoryItemType::Hardware, &cancel)
            .await
            .unwrap();
        assert_eq!(items, vec![nails]);
    }

    #[tokio::test]
    async fn test_create_get_and_adjust_quantity() {
        let replica = Arc::new(Replica::default());
        let endpoint = spawn_replica(replica.clone()).await;
        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(7), endpoint)]));
        let client = client_for(topology, 3);
        let cancel = CancellationToken::new();

        let created = client
            .create_item(InventoryItem::new(InventoryItemType::Paint, "Gloss white"), &cancel)
            .await
            .unwrap();
        assert_eq!(created.name, "Gloss white");

        client
            .adjust_quantity(
                QuantityChange {
                    item_id: created.item_id,
                    item_type: InventoryItemType::Paint,
                    is_add: true,
                    quantity: 5,
                },
                &cancel,
            )
            .await
            .unwrap();
        client
            .decrease_quantity(InventoryItemType::Paint, created.item_id, 2, &cancel)
            .await
            .unwrap();

        let fetched = client
            .get_item(InventoryItemType::Paint, created.item_id, &cancel)
            .await
            .unwrap();
        assert_eq!(fetched.inventory_count, 3);
        assert_eq!(fetched.display_label(), "Gloss white (Paint)");
    }

    #[tokio::test]
    async fn test_dispatch_routes_every_kind() {
        let replica = Arc::new(Replica::default());
        let item = stocked(&replica, InventoryItemType::Plumbing, "Pipe wrench", 1);
        let endpoint = spawn_replica(replica.clone()).await;
        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(8), endpoint)]));
        let client = client_for(topology, 3);
        let cancel = CancellationToken::new();

        let listed = client
            .dispatch(InventoryItemType::Plumbing, InventoryRequest::List, &cancel)
            .await
            .unwrap();
        assert_eq!(listed, InventoryResponse::Items(vec![item.clone()]));

        let adjusted = client
            .dispatch(
                InventoryItemType::Plumbing,
                InventoryRequest::IncreaseQuantity {
                    item_id: item.item_id,
                    quantity: 4,
                },
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(adjusted, InventoryResponse::Adjusted);

        let fetched = client
            .dispatch(
                InventoryItemType::Plumbing,
                InventoryRequest::Get {
                    item_id: item.item_id,
                },
                &cancel,
            )
            .await
            .unwrap();
        match fetched {
            InventoryResponse::Item(fetched) => assert_eq!(fetched.inventory_count, 5),
            other => panic!("expected item, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_item_is_operation_error_after_one_request() {
        let replica = Arc::new(Replica::default());
        let endpoint = spawn_replica(replica.clone()).await;
        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(4), endpoint.clone())]));
        let client = client_for(topology, 5);
        let cancel = CancellationToken::new();

        let err = client
            .get_item(InventoryItemType::Hardware, Uuid::new_v4(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DispatchError::Operation {
                status: 404,
                reason: "item not found".to_string()
            }
        );
        assert_eq!(replica.requests.load(Ordering::SeqCst), 1);
        assert_eq!(
            client.invoker().resolver().cache().get(PartitionId(4)),
            Some(endpoint)
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_not_retried() {
        let replica = Arc::new(Replica::default());
        let item = stocked(&replica, InventoryItemType::Flooring, "Oak plank", 1);
        let endpoint = spawn_replica(replica.clone()).await;
        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(2), endpoint)]));
        let client = client_for(topology, 5);
        let cancel = CancellationToken::new();

        let err = client
            .decrease_quantity(InventoryItemType::Flooring, item.item_id, 10, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Operation { status: 400, .. }));
        assert_eq!(replica.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_with_mismatched_key_is_rejected_before_routing() {
        let replica = Arc::new(Replica::default());
        let endpoint = spawn_replica(replica.clone()).await;
        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(4), endpoint)]));
        let client = client_for(topology, 3);
        let cancel = CancellationToken::new();

        let paint = InventoryItem::new(InventoryItemType::Paint, "Eggshell blue");
        let err = client
            .dispatch(
                InventoryItemType::Hardware,
                InventoryRequest::Create(paint),
                &cancel,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Operation { status: 400, .. }));
        assert_eq!(replica.requests.load(Ordering::SeqCst), 0);
        assert!(client.invoker().resolver().cache().is_empty());
    }

    #[tokio::test]
    async fn test_truncated_error_body_falls_back_to_status_reason() {
        // Promises 64 bytes of body, sends 5, then hangs up.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let server_hits = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                server_hits.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 64\r\n\r\nshort")
                    .await;
            }
        });
        let endpoint = Endpoint::new(format!("http://{}", addr));
        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(5), endpoint)]));
        let client = client_for(topology, 3);
        let cancel = CancellationToken::new();

        let err = client
            .get_item(InventoryItemType::HeatingCooling, Uuid::new_v4(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DispatchError::Operation {
                status: 404,
                reason: "Not Found".to_string()
            }
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    // ============================================================
    // RELOCATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_refused_replica_heals_to_new_primary() {
        let replica = Arc::new(Replica::default());
        let item = stocked(&replica, InventoryItemType::Hardware, "Hinge", 12);
        let new_primary = spawn_replica(replica.clone()).await;
        let old_primary = closed_endpoint().await;

        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(4), old_primary)]));
        let client = client_for(topology.clone(), 3);
        let cancel = CancellationToken::new();

        // Warm the cache with the old location, then move the partition.
        client
            .invoker()
            .resolver()
            .resolve(&InventoryItemType::Hardware)
            .await
            .unwrap();
        topology.relocate(PartitionId(4), new_primary.clone());

        let items = client
            .list_items(InventoryItemType::Hardware, &cancel)
            .await
            .unwrap();
        assert_eq!(items, vec![item]);
        assert_eq!(
            client.invoker().resolver().cache().get(PartitionId(4)),
            Some(new_primary)
        );
    }

    #[tokio::test]
    async fn test_not_primary_signal_triggers_reresolution() {
        let demoted_hits = Arc::new(AtomicUsize::new(0));
        let demoted = spawn_demoted_replica(demoted_hits.clone()).await;
        let replica = Arc::new(Replica::default());
        let primary = spawn_replica(replica.clone()).await;

        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(9), demoted)]));
        let client = client_for(topology.clone(), 3);
        let cancel = CancellationToken::new();

        client
            .invoker()
            .resolver()
            .resolve(&InventoryItemType::PowerTools)
            .await
            .unwrap();
        topology.relocate(PartitionId(9), primary);

        let created = client
            .create_item(InventoryItem::new(InventoryItemType::PowerTools, "Drill"), &cancel)
            .await
            .unwrap();

        assert_eq!(demoted_hits.load(Ordering::SeqCst), 1);
        assert!(replica.items.contains_key(&created.item_id));
    }

    #[tokio::test]
    async fn test_unreachable_partition_surfaces_transport_error() {
        let topology = Arc::new(StaticTopology::from_pairs(vec![(
            PartitionId(0),
            closed_endpoint().await,
        )]));
        let client = client_for(topology, 3);
        let cancel = CancellationToken::new();

        let err = client
            .list_items(InventoryItemType::Appliances, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Transport {
                partition: PartitionId(0),
                attempts: 3,
                ..
            }
        ));
    }

    // ============================================================
    // GATEWAY TESTS
    // ============================================================

    #[tokio::test]
    async fn test_gateway_end_to_end() {
        let replica = Arc::new(Replica::default());
        let endpoint = spawn_replica(replica.clone()).await;
        let topology = Arc::new(StaticTopology::from_pairs(vec![(PartitionId(5), endpoint)]));
        let state = Arc::new(GatewayState {
            client: client_for(topology, 3),
            shutdown: CancellationToken::new(),
        });
        let gateway = spawn_server(router(state)).await;
        let http = reqwest::Client::new();

        let created: InventoryItem = http
            .post(gateway.url("/inventory"))
            .json(&serde_json::json!({"item_type": "HeatingCooling", "name": "Radiator"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(created.item_type, InventoryItemType::HeatingCooling);

        let response = http
            .post(gateway.url(&format!(
                "/inventory/HeatingCooling/{}/add/2",
                created.item_id
            )))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let adjusted: AdjustResponse = response.json().await.unwrap();
        assert!(adjusted.is_add);

        let detail: ItemDetailResponse = http
            .get(gateway.url(&format!("/inventory/HeatingCooling/{}", created.item_id)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(detail.item.inventory_count, 2);
        assert_eq!(detail.display, "Radiator (HeatingCooling)");

        let listed: ItemListResponse = http
            .get(gateway.url("/inventory/HeatingCooling"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.items.len(), 1);

        let response = http
            .post(gateway.url(&format!(
                "/inventory/HeatingCooling/{}/remove/9",
                created.item_id
            )))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let error: ErrorResponse = response.json().await.unwrap();
        assert_eq!(error.kind, "operation");
    }

    #[tokio::test]
    async fn test_gateway_maps_unresolvable_partition_to_503() {
        let state = Arc::new(GatewayState {
            client: client_for(Arc::new(StaticTopology::new()), 2),
            shutdown: CancellationToken::new(),
        });
        let gateway = spawn_server(router(state)).await;

        let response = reqwest::get(gateway.url("/inventory/Electrical")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let error: ErrorResponse = response.json().await.unwrap();
        assert_eq!(error.kind, "resolution");
    }
}
