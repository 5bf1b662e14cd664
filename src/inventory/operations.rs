//! Inventory Operations
//!
//! Each operation builds one HTTP request against a resolved replica and classifies
//! the answer for the invoker:
//! - **2xx**: success, the body is decoded into the typed result.
//! - **Reachable, non-2xx**: `AttemptError::from_status` (application failure, except
//!   the "not primary" statuses).
//! - **No answer** (refused, reset, timeout): routing failure.

use super::protocol::{ENDPOINT_INVENTORY, add_inventory_path, item_path, remove_inventory_path};
use super::types::{
    InventoryItem, InventoryItemType, InventoryRequest, InventoryResponse, QuantityChange,
};
use crate::invoker::error::{AttemptError, DispatchError};
use crate::invoker::invoker::RetryingInvoker;
use crate::routing::resolver::Resolvable;
use crate::routing::types::Endpoint;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Partition-aware client of the inventory service.
pub struct InventoryClient<R: Resolvable> {
    invoker: Arc<RetryingInvoker<R>>,
    http_client: reqwest::Client,
}

impl<R: Resolvable> InventoryClient<R> {
    pub fn new(invoker: Arc<RetryingInvoker<R>>) -> Self {
        Self {
            invoker,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn invoker(&self) -> &Arc<RetryingInvoker<R>> {
        &self.invoker
    }

    /// Routes `request` to the partition owning `item_type` and runs it with retries.
    ///
    /// A `Create` whose item belongs to another category is rejected with a 400
    /// before anything is resolved.
    pub async fn dispatch(
        &self,
        item_type: InventoryItemType,
        request: InventoryRequest,
        cancel: &CancellationToken,
    ) -> Result<InventoryResponse, DispatchError> {
        tracing::debug!("Dispatching {} for {}", request.kind(), item_type);

        match request {
            InventoryRequest::List => self
                .list_items(item_type, cancel)
                .await
                .map(InventoryResponse::Items),
            InventoryRequest::Get { item_id } => self
                .get_item(item_type, item_id, cancel)
                .await
                .map(InventoryResponse::Item),
            InventoryRequest::Create(item) if item.item_type != item_type => {
                Err(DispatchError::Operation {
                    status: 400,
                    reason: format!(
                        "item category {} does not match routing key {}",
                        item.item_type, item_type
                    ),
                })
            }
            InventoryRequest::Create(item) => self
                .create_item(item, cancel)
                .await
                .map(InventoryResponse::Item),
            InventoryRequest::IncreaseQuantity { item_id, quantity } => self
                .increase_quantity(item_type, item_id, quantity, cancel)
                .await
                .map(|_| InventoryResponse::Adjusted),
            InventoryRequest::DecreaseQuantity { item_id, quantity } => self
                .decrease_quantity(item_type, item_id, quantity, cancel)
                .await
                .map(|_| InventoryResponse::Adjusted),
        }
    }

    /// Lists the items of one category.
    ///
    /// The backend returns every item of the partition; the category filter is applied here.
    pub async fn list_items(
        &self,
        item_type: InventoryItemType,
        cancel: &CancellationToken,
    ) -> Result<Vec<InventoryItem>, DispatchError> {
        let client = &self.http_client;
        let items: Vec<InventoryItem> = self
            .invoker
            .invoke(&item_type, cancel, |endpoint| {
                fetch_json(client, endpoint, ENDPOINT_INVENTORY.to_string())
            })
            .await?;

        Ok(items
            .into_iter()
            .filter(|item| item.item_type == item_type)
            .collect())
    }

    pub async fn get_item(
        &self,
        item_type: InventoryItemType,
        item_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<InventoryItem, DispatchError> {
        let client = &self.http_client;
        self.invoker
            .invoke(&item_type, cancel, |endpoint| {
                fetch_json(client, endpoint, item_path(item_id))
            })
            .await
    }

    /// Creates `item` in the partition of its own category.
    pub async fn create_item(
        &self,
        item: InventoryItem,
        cancel: &CancellationToken,
    ) -> Result<InventoryItem, DispatchError> {
        let client = &self.http_client;
        let item_type = item.item_type;
        let item = &item;
        self.invoker
            .invoke(&item_type, cancel, |endpoint| post_item(client, endpoint, item))
            .await
    }

    pub async fn increase_quantity(
        &self,
        item_type: InventoryItemType,
        item_id: Uuid,
        quantity: u32,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let client = &self.http_client;
        self.invoker
            .invoke(&item_type, cancel, |endpoint| {
                post_empty(client, endpoint, add_inventory_path(item_id, quantity))
            })
            .await
    }

    pub async fn decrease_quantity(
        &self,
        item_type: InventoryItemType,
        item_id: Uuid,
        quantity: u32,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let client = &self.http_client;
        self.invoker
            .invoke(&item_type, cancel, |endpoint| {
                post_empty(client, endpoint, remove_inventory_path(item_id, quantity))
            })
            .await
    }

    pub async fn adjust_quantity(
        &self,
        change: QuantityChange,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        if change.is_add {
            self.increase_quantity(change.item_type, change.item_id, change.quantity, cancel)
                .await
        } else {
            self.decrease_quantity(change.item_type, change.item_id, change.quantity, cancel)
                .await
        }
    }
}

async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: Endpoint,
    path: String,
) -> Result<T, AttemptError> {
    let response = client.get(endpoint.url(&path)).send().await?;
    decode(check_status(response).await?).await
}

async fn post_item(
    client: &reqwest::Client,
    endpoint: Endpoint,
    item: &InventoryItem,
) -> Result<InventoryItem, AttemptError> {
    let response = client
        .post(endpoint.url(ENDPOINT_INVENTORY))
        .json(item)
        .send()
        .await?;
    decode(check_status(response).await?).await
}

async fn post_empty(
    client: &reqwest::Client,
    endpoint: Endpoint,
    path: String,
) -> Result<(), AttemptError> {
    let response = client.post(endpoint.url(&path)).send().await?;
    check_status(response).await?;
    Ok(())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AttemptError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Failed to read error body ({}): {}", status, e);
            String::new()
        }
    };
    Err(AttemptError::from_status(status, &body))
}

/// Decodes a 2xx body. A body that does not parse is an application failure.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AttemptError> {
    let status = response.status().as_u16();
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            AttemptError::Application {
                status,
                reason: format!("invalid response body: {}", e),
            }
        } else {
            AttemptError::from(e)
        }
    })
}
