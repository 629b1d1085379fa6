//! Data models for Stockroom

pub mod enums;
pub mod history;
pub mod item;
pub mod request;

// Re-export commonly used types
pub use enums::{HistoryAction, ItemStatus, RequestStatus, Role, Sensitivity};
pub use history::HistoryEntry;
pub use item::{Item, ItemRow};
pub use request::{BorrowRequest, BorrowRequestRow, SubmitRequest};
