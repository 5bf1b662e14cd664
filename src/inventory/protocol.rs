//! Inventory Backend Protocol
//!
//! Resource paths of the partitioned inventory API, relative to a replica's base URL.
//! Items travel as JSON (`InventoryItem`); quantity changes carry no body.

use uuid::Uuid;

/// Collection endpoint: `GET` lists every item of the partition, `POST` creates one.
pub const ENDPOINT_INVENTORY: &str = "/api/inventory";

pub fn item_path(item_id: Uuid) -> String {
    format!("{}/{}", ENDPOINT_INVENTORY, item_id)
}

pub fn add_inventory_path(item_id: Uuid, quantity: u32) -> String {
    format!("{}/{}/addinventory/{}", ENDPOINT_INVENTORY, item_id, quantity)
}

pub fn remove_inventory_path(item_id: Uuid, quantity: u32) -> String {
    format!("{}/{}/removeinventory/{}", ENDPOINT_INVENTORY, item_id, quantity)
}
