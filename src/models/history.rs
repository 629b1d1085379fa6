//! History (audit log) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::HistoryAction;

/// History row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRow {
    pub id: i32,
    pub item_id: i32,
    pub actor_id: Option<i32>,
    pub action: i16,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// History entry with decoded action for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    pub id: i32,
    pub item_id: i32,
    /// None for system-originated entries
    pub actor_id: Option<i32>,
    pub action: HistoryAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            id: row.id,
            item_id: row.item_id,
            actor_id: row.actor_id,
            action: HistoryAction::from(row.action),
            old_value: row.old_value,
            new_value: row.new_value,
            note: row.note,
            created_at: row.created_at,
        }
    }
}
