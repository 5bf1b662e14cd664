use crate::routing::types::{PartitionId, PartitionKey};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Item category. Doubles as the partition key of the inventory service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InventoryItemType {
    Appliances,
    Electrical,
    Flooring,
    HandTools,
    Hardware,
    HeatingCooling,
    LawnGarden,
    Paint,
    Plumbing,
    PowerTools,
}

impl InventoryItemType {
    pub const ALL: [InventoryItemType; 10] = [
        Self::Appliances,
        Self::Electrical,
        Self::Flooring,
        Self::HandTools,
        Self::Hardware,
        Self::HeatingCooling,
        Self::LawnGarden,
        Self::Paint,
        Self::Plumbing,
        Self::PowerTools,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Appliances => "Appliances",
            Self::Electrical => "Electrical",
            Self::Flooring => "Flooring",
            Self::HandTools => "HandTools",
            Self::Hardware => "Hardware",
            Self::HeatingCooling => "HeatingCooling",
            Self::LawnGarden => "LawnGarden",
            Self::Paint => "Paint",
            Self::Plumbing => "Plumbing",
            Self::PowerTools => "PowerTools",
        }
    }
}

impl fmt::Display for InventoryItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartitionKey for InventoryItemType {
    /// The category ordinal is the partition number.
    fn partition_id(&self, partition_count: u32) -> PartitionId {
        PartitionId(self.ordinal() % partition_count.max(1))
    }
}

/// A stocked item as exchanged with the inventory backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryItem {
    pub item_id: Uuid,
    pub item_type: InventoryItemType,
    pub name: String,
    pub inventory_count: i32,
}

impl InventoryItem {
    /// A new, not yet stocked item.
    pub fn new(item_type: InventoryItemType, name: impl Into<String>) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            item_type,
            name: name.into(),
            inventory_count: 0,
        }
    }

    /// Human-readable label, e.g. `"Claw hammer (HandTools)"`.
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.item_type)
    }
}

/// A stock adjustment for one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantityChange {
    pub item_id: Uuid,
    pub item_type: InventoryItemType,
    pub is_add: bool,
    pub quantity: u32,
}

/// The operations the dispatcher can route, with their payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryRequest {
    List,
    Get { item_id: Uuid },
    Create(InventoryItem),
    IncreaseQuantity { item_id: Uuid, quantity: u32 },
    DecreaseQuantity { item_id: Uuid, quantity: u32 },
}

impl InventoryRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get { .. } => "get",
            Self::Create(_) => "create",
            Self::IncreaseQuantity { .. } => "increase_quantity",
            Self::DecreaseQuantity { .. } => "decrease_quantity",
        }
    }
}

impl From<QuantityChange> for InventoryRequest {
    fn from(change: QuantityChange) -> Self {
        if change.is_add {
            Self::IncreaseQuantity {
                item_id: change.item_id,
                quantity: change.quantity,
            }
        } else {
            Self::DecreaseQuantity {
                item_id: change.item_id,
                quantity: change.quantity,
            }
        }
    }
}

/// Successful result of an `InventoryRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryResponse {
    Items(Vec<InventoryItem>),
    Item(InventoryItem),
    Adjusted,
}
