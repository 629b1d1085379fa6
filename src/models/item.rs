//! Inventory item model and related types
//!
//! The catalog (creation, naming, photos) is managed by an external
//! collaborator; this server only reads items and mutates their
//! quantity/status/condition through the inventory ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{ItemStatus, Sensitivity};

/// Item row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemRow {
    pub id: i32,
    pub name: String,
    pub total_quantity: i32,
    pub free_quantity: i32,
    pub status: i16,
    pub sensitivity: i16,
    pub low_stock_threshold: i32,
    pub condition_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Item with decoded enums for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub total_quantity: i32,
    pub free_quantity: i32,
    pub status: ItemStatus,
    pub sensitivity: Sensitivity,
    pub low_stock_threshold: i32,
    pub condition_notes: Option<String>,
    pub is_low_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        let is_low_stock = row.free_quantity <= row.low_stock_threshold;
        Item {
            id: row.id,
            name: row.name,
            total_quantity: row.total_quantity,
            free_quantity: row.free_quantity,
            status: ItemStatus::from(row.status),
            sensitivity: Sensitivity::from(row.sensitivity),
            low_stock_threshold: row.low_stock_threshold,
            condition_notes: row.condition_notes,
            is_low_stock,
            created_at: row.created_at,
        }
    }
}

/// Manual quantity adjustment on the ledger
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustQuantity {
    /// Signed change applied to the item's free quantity
    pub delta: i32,
    /// Reason recorded in the history log
    pub reason: String,
}
