//! History service: read-only feed over the audit log

use crate::{error::AppResult, models::history::HistoryEntry, repository::Repository};

#[derive(Clone)]
pub struct HistoryService {
    repository: Repository,
}

impl HistoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List an item's history, newest first
    pub async fn list_for_item(&self, item_id: i32) -> AppResult<Vec<HistoryEntry>> {
        // Verify the item exists so unknown ids surface as 404, not []
        self.repository.items.get_by_id(item_id).await?;
        let rows = self.repository.history.list_for_item(item_id).await?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }
}
