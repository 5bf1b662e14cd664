use super::operations::InventoryClient;
use super::types::{InventoryItem, InventoryItemType, QuantityChange};
use crate::invoker::error::DispatchError;
use crate::routing::resolver::PartitionResolver;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Shared state of the gateway.
pub struct GatewayState {
    pub client: InventoryClient<PartitionResolver>,
    /// Parent of every per-request token; cancelled on shutdown.
    pub shutdown: CancellationToken,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemListResponse {
    pub item_type: InventoryItemType,
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemDetailResponse {
    pub item: InventoryItem,
    pub display: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub item_type: InventoryItemType,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdjustResponse {
    pub item_id: Uuid,
    pub item_type: InventoryItemType,
    pub is_add: bool,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub error: String,
}

type HandlerResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ErrorResponse>)>;

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/inventory", post(handle_create_item))
        .route("/inventory/:item_type", get(handle_list_items))
        .route("/inventory/:item_type/:item_id", get(handle_get_item))
        .route(
            "/inventory/:item_type/:item_id/add/:quantity",
            post(handle_add_inventory),
        )
        .route(
            "/inventory/:item_type/:item_id/remove/:quantity",
            post(handle_remove_inventory),
        )
        .layer(Extension(state))
}

pub async fn handle_list_items(
    Extension(state): Extension<Arc<GatewayState>>,
    Path(item_type): Path<InventoryItemType>,
) -> HandlerResult<ItemListResponse> {
    let cancel = request_token(&state);
    let _guard = cancel.clone().drop_guard();

    match state.client.list_items(item_type, &cancel).await {
        Ok(items) => Ok((StatusCode::OK, Json(ItemListResponse { item_type, items }))),
        Err(e) => Err(error_response("list", e)),
    }
}

pub async fn handle_get_item(
    Extension(state): Extension<Arc<GatewayState>>,
    Path((item_type, item_id)): Path<(InventoryItemType, Uuid)>,
) -> HandlerResult<ItemDetailResponse> {
    let cancel = request_token(&state);
    let _guard = cancel.clone().drop_guard();

    match state.client.get_item(item_type, item_id, &cancel).await {
        Ok(item) => {
            let display = item.display_label();
            Ok((StatusCode::OK, Json(ItemDetailResponse { item, display })))
        }
        Err(e) => Err(error_response("get", e)),
    }
}

pub async fn handle_create_item(
    Extension(state): Extension<Arc<GatewayState>>,
    Json(req): Json<CreateItemRequest>,
) -> HandlerResult<InventoryItem> {
    let cancel = request_token(&state);
    let _guard = cancel.clone().drop_guard();

    let item = InventoryItem::new(req.item_type, req.name);
    match state.client.create_item(item, &cancel).await {
        Ok(created) => {
            tracing::info!("Created item {} in {}", created.item_id, created.item_type);
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(e) => Err(error_response("create", e)),
    }
}

pub async fn handle_add_inventory(
    Extension(state): Extension<Arc<GatewayState>>,
    Path((item_type, item_id, quantity)): Path<(InventoryItemType, Uuid, u32)>,
) -> HandlerResult<AdjustResponse> {
    adjust(
        &state,
        QuantityChange {
            item_id,
            item_type,
            is_add: true,
            quantity,
        },
    )
    .await
}

pub async fn handle_remove_inventory(
    Extension(state): Extension<Arc<GatewayState>>,
    Path((item_type, item_id, quantity)): Path<(InventoryItemType, Uuid, u32)>,
) -> HandlerResult<AdjustResponse> {
    adjust(
        &state,
        QuantityChange {
            item_id,
            item_type,
            is_add: false,
            quantity,
        },
    )
    .await
}

async fn adjust(state: &GatewayState, change: QuantityChange) -> HandlerResult<AdjustResponse> {
    let cancel = request_token(state);
    let _guard = cancel.clone().drop_guard();

    let response = AdjustResponse {
        item_id: change.item_id,
        item_type: change.item_type,
        is_add: change.is_add,
        quantity: change.quantity,
    };
    match state.client.adjust_quantity(change, &cancel).await {
        Ok(()) => Ok((StatusCode::OK, Json(response))),
        Err(e) => Err(error_response("adjust", e)),
    }
}

/// A token that ends with the request: cancelled on shutdown or when the handler
/// future is dropped (client went away).
fn request_token(state: &GatewayState) -> CancellationToken {
    state.shutdown.child_token()
}

fn error_response(operation: &str, err: DispatchError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_cancelled() {
        tracing::debug!("{} cancelled", operation);
    } else {
        tracing::error!("{} failed: {}", operation, err);
    }

    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        Json(ErrorResponse {
            kind: err.kind().to_string(),
            error: err.to_string(),
        }),
    )
}
