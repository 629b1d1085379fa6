//! Items repository for inventory ledger operations
//!
//! Pool-bound methods serve plain reads. The lifecycle engine runs its
//! mutations inside a transaction, so the write path is exposed as
//! associated functions over a `PgConnection` — the caller owns the
//! transaction and the item row lock.

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item::ItemRow,
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ItemRow> {
        sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// List all items
    pub async fn list(&self) -> AppResult<Vec<ItemRow>> {
        let rows = sqlx::query_as::<_, ItemRow>("SELECT * FROM items ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Lock and fetch an item row inside the caller's transaction.
    ///
    /// `SELECT ... FOR UPDATE` serializes concurrent lifecycle operations
    /// on the same item; the availability re-check and the mutation that
    /// follows both happen under this lock.
    pub async fn get_for_update(conn: &mut PgConnection, id: i32) -> AppResult<ItemRow> {
        sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Write back free quantity and status for a locked item row.
    ///
    /// Refuses any write that would leave `free` outside `[0, total]`.
    pub async fn update_free_quantity(
        conn: &mut PgConnection,
        id: i32,
        free_quantity: i32,
        status: i16,
    ) -> AppResult<ItemRow> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items
            SET free_quantity = $2, status = $3, modif_date = $4
            WHERE id = $1 AND $2 >= 0 AND $2 <= total_quantity
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(free_quantity)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?;

        row.ok_or_else(|| {
            AppError::Validation(format!(
                "Quantity adjustment on item {} would leave stock out of bounds",
                id
            ))
        })
    }

    /// Update condition notes for a locked item row
    pub async fn update_condition_notes(
        conn: &mut PgConnection,
        id: i32,
        condition_notes: &str,
    ) -> AppResult<()> {
        sqlx::query("UPDATE items SET condition_notes = $2, modif_date = $3 WHERE id = $1")
            .bind(id)
            .bind(condition_notes)
            .bind(Utc::now())
            .execute(conn)
            .await?;
        Ok(())
    }
}
