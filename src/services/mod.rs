//! Business logic services

pub mod availability;
pub mod history;
pub mod inventory;
pub mod lifecycle;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub lifecycle: lifecycle::LifecycleService,
    pub inventory: inventory::InventoryService,
    pub history: history::HistoryService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, max_conflict_retries: u32) -> Self {
        Self {
            lifecycle: lifecycle::LifecycleService::new(repository.clone(), max_conflict_retries),
            inventory: inventory::InventoryService::new(repository.clone()),
            history: history::HistoryService::new(repository),
        }
    }
}
