//! Borrow requests repository
//!
//! Holds the request rows plus the overlap aggregation the availability
//! calculator is built on. Overlap uses the half-open rule: `[a,b)` and
//! `[c,d)` overlap iff `a < d AND c < b`, so a window ending exactly where
//! another starts does not conflict.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestStatus,
        request::{BorrowRequestRow, SubmitRequest},
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequestRow> {
        sqlx::query_as::<_, BorrowRequestRow>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// List requests created by a requester, newest first
    pub async fn list_for_requester(&self, requester_id: i32) -> AppResult<Vec<BorrowRequestRow>> {
        let rows = sqlx::query_as::<_, BorrowRequestRow>(
            "SELECT * FROM borrow_requests WHERE requester_id = $1 ORDER BY created_at DESC",
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Persist a new Pending request
    pub async fn create(
        &self,
        requester_id: i32,
        submit: &SubmitRequest,
    ) -> AppResult<BorrowRequestRow> {
        let row = sqlx::query_as::<_, BorrowRequestRow>(
            r#"
            INSERT INTO borrow_requests
                (item_id, requester_id, quantity, date_from, date_to, purpose, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(submit.item_id)
        .bind(requester_id)
        .bind(submit.quantity)
        .bind(submit.date_from)
        .bind(submit.date_to)
        .bind(&submit.purpose)
        .bind(i16::from(RequestStatus::Pending))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Re-fetch a request inside the caller's transaction.
    ///
    /// The engine locks the item row first; re-reading the request under
    /// that lock guarantees the state it validates is the state it commits.
    pub async fn get_in_tx(conn: &mut PgConnection, id: i32) -> AppResult<BorrowRequestRow> {
        sqlx::query_as::<_, BorrowRequestRow>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// Sum of quantities committed to Approved requests overlapping
    /// `[date_from, date_to)`, optionally excluding one request.
    pub async fn reserved_quantity(
        conn: &mut PgConnection,
        item_id: i32,
        date_from: NaiveDate,
        date_to: NaiveDate,
        exclude_request_id: Option<i32>,
    ) -> AppResult<i64> {
        let reserved: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::bigint
            FROM borrow_requests
            WHERE item_id = $1
              AND status = $2
              AND date_from < $4
              AND $3 < date_to
              AND ($5::int IS NULL OR id != $5)
            "#,
        )
        .bind(item_id)
        .bind(i16::from(RequestStatus::Approved))
        .bind(date_from)
        .bind(date_to)
        .bind(exclude_request_id)
        .fetch_one(conn)
        .await?;
        Ok(reserved)
    }

    /// Mark a request Approved
    pub async fn mark_approved(
        conn: &mut PgConnection,
        id: i32,
        approver_id: i32,
        approved_at: DateTime<Utc>,
        checked_out: bool,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = $2, approver_id = $3, approved_at = $4, checked_out = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(i16::from(RequestStatus::Approved))
        .bind(approver_id)
        .bind(approved_at)
        .bind(checked_out)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Mark a request Declined with a reason. Guarded on the Pending
    /// status so a concurrent approval is never overwritten; returns
    /// whether the row actually changed.
    pub async fn mark_declined(
        &self,
        id: i32,
        approver_id: i32,
        reason: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = $2, approver_id = $3, decline_reason = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(id)
        .bind(i16::from(RequestStatus::Declined))
        .bind(approver_id)
        .bind(reason)
        .bind(i16::from(RequestStatus::Pending))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a request Returned with timestamp and condition
    pub async fn mark_returned(
        conn: &mut PgConnection,
        id: i32,
        returned_at: DateTime<Utc>,
        condition: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = $2, returned_at = $3, return_condition = $4, checked_out = FALSE
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(i16::from(RequestStatus::Returned))
        .bind(returned_at)
        .bind(condition)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Mark a request Cancelled
    pub async fn mark_cancelled(conn: &mut PgConnection, id: i32) -> AppResult<()> {
        sqlx::query(
            "UPDATE borrow_requests SET status = $2, checked_out = FALSE WHERE id = $1",
        )
        .bind(id)
        .bind(i16::from(RequestStatus::Cancelled))
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Grow an approved request's date_to (extension)
    pub async fn update_date_to(
        conn: &mut PgConnection,
        id: i32,
        new_date_to: NaiveDate,
    ) -> AppResult<()> {
        sqlx::query("UPDATE borrow_requests SET date_to = $2 WHERE id = $1")
            .bind(id)
            .bind(new_date_to)
            .execute(conn)
            .await?;
        Ok(())
    }
}
