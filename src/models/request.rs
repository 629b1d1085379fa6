//! Borrow request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::RequestStatus;

/// Borrow request row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BorrowRequestRow {
    pub id: i32,
    pub item_id: i32,
    pub requester_id: i32,
    pub quantity: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub purpose: String,
    pub status: i16,
    pub approver_id: Option<i32>,
    pub approved_at: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
    pub returned_at: Option<DateTime<Utc>>,
    pub return_condition: Option<String>,
    pub checked_out: bool,
    pub created_at: DateTime<Utc>,
}

impl BorrowRequestRow {
    pub fn status(&self) -> RequestStatus {
        RequestStatus::from(self.status)
    }
}

/// Borrow request with decoded status for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub item_id: i32,
    pub requester_id: i32,
    pub quantity: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub purpose: String,
    pub status: RequestStatus,
    pub approver_id: Option<i32>,
    pub approved_at: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
    pub returned_at: Option<DateTime<Utc>>,
    pub return_condition: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BorrowRequestRow> for BorrowRequest {
    fn from(row: BorrowRequestRow) -> Self {
        BorrowRequest {
            id: row.id,
            item_id: row.item_id,
            requester_id: row.requester_id,
            quantity: row.quantity,
            date_from: row.date_from,
            date_to: row.date_to,
            purpose: row.purpose,
            status: RequestStatus::from(row.status),
            approver_id: row.approver_id,
            approved_at: row.approved_at,
            decline_reason: row.decline_reason,
            returned_at: row.returned_at,
            return_condition: row.return_condition,
            created_at: row.created_at,
        }
    }
}

/// Submit a new borrow request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitRequest {
    pub item_id: i32,
    pub quantity: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub purpose: String,
}

/// Return a borrowed item
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Condition of the returned units, stored on the request
    pub condition: Option<String>,
    /// Free-text note appended to the item history
    pub notes: Option<String>,
}

/// Decline a pending request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeclineRequest {
    pub reason: String,
}

/// Extend an approved request's borrow window
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExtendRequest {
    pub new_date_to: NaiveDate,
}
