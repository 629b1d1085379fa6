//! Inventory ledger service
//!
//! Manual stock corrections and explicit status changes, outside the
//! request lifecycle. Each mutation commits together with its history
//! entry or not at all.

use sqlx::{Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{HistoryAction, ItemStatus},
        item::Item,
    },
    repository::{history::HistoryRepository, items::ItemsRepository, Repository},
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Verify the database connection is usable
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }

    /// List all items
    pub async fn list(&self) -> AppResult<Vec<Item>> {
        let rows = self.repository.items.list().await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Get one item by id
    pub async fn get_by_id(&self, id: i32) -> AppResult<Item> {
        Ok(Item::from(self.repository.items.get_by_id(id).await?))
    }

    /// Apply a signed correction to an item's free stock.
    ///
    /// Rejects adjustments that would leave free quantity outside
    /// `[0, total]`; the item status follows the new free quantity unless
    /// an administrative status is in force.
    pub async fn adjust_quantity(
        &self,
        item_id: i32,
        delta: i32,
        actor_id: i32,
        reason: &str,
    ) -> AppResult<Item> {
        if delta == 0 {
            return Err(AppError::Validation("Delta must be non-zero".to_string()));
        }
        if reason.trim().is_empty() {
            return Err(AppError::Validation("Reason must not be empty".to_string()));
        }

        let mut tx: Transaction<'_, Postgres> = self.repository.pool.begin().await?;
        let item = ItemsRepository::get_for_update(&mut tx, item_id).await?;

        let new_free = item.free_quantity + delta;
        let current = ItemStatus::from(item.status);
        let new_status = if current.is_administrative() {
            current
        } else if new_free == 0 {
            ItemStatus::CheckedOut
        } else {
            ItemStatus::Available
        };

        let updated =
            ItemsRepository::update_free_quantity(&mut tx, item_id, new_free, i16::from(new_status))
                .await?;

        HistoryRepository::append(
            &mut tx,
            item_id,
            Some(actor_id),
            HistoryAction::QuantityAdjusted,
            Some(&item.free_quantity.to_string()),
            Some(&new_free.to_string()),
            Some(reason),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(item_id, delta, actor_id, "Inventory quantity adjusted");
        Ok(Item::from(updated))
    }

    /// Set an item's status explicitly, with an audit entry
    pub async fn set_status(
        &self,
        item_id: i32,
        status: ItemStatus,
        actor_id: i32,
    ) -> AppResult<Item> {
        let mut tx: Transaction<'_, Postgres> = self.repository.pool.begin().await?;
        let item = ItemsRepository::get_for_update(&mut tx, item_id).await?;

        let updated = ItemsRepository::update_free_quantity(
            &mut tx,
            item_id,
            item.free_quantity,
            i16::from(status),
        )
        .await?;

        HistoryRepository::append(
            &mut tx,
            item_id,
            Some(actor_id),
            HistoryAction::StatusChanged,
            Some(&ItemStatus::from(item.status).to_string()),
            Some(&status.to_string()),
            None,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(item_id, %status, actor_id, "Item status changed");
        Ok(Item::from(updated))
    }
}
