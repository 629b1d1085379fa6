//! History repository: append-only audit log
//!
//! Entries are inserted on the same connection as the mutation they
//! describe, so a rolled-back transaction leaves no orphaned history.

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    models::{enums::HistoryAction, history::HistoryRow},
};

#[derive(Clone)]
pub struct HistoryRepository {
    pool: Pool<Postgres>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List history for an item, newest first
    pub async fn list_for_item(&self, item_id: i32) -> AppResult<Vec<HistoryRow>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT * FROM history WHERE item_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Append one entry inside the caller's transaction
    pub async fn append(
        conn: &mut PgConnection,
        item_id: i32,
        actor_id: Option<i32>,
        action: HistoryAction,
        old_value: Option<&str>,
        new_value: Option<&str>,
        note: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO history (item_id, actor_id, action, old_value, new_value, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item_id)
        .bind(actor_id)
        .bind(i16::from(action))
        .bind(old_value)
        .bind(new_value)
        .bind(note)
        .bind(Utc::now())
        .execute(conn)
        .await?;
        Ok(())
    }
}
