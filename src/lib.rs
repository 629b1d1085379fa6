//! Stockroom Asset Borrowing Server
//!
//! Tracks physical assets that can be borrowed for a bounded date window
//! and returned, exposing a REST JSON API over the borrow-request
//! lifecycle and the inventory-reservation engine behind it.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
