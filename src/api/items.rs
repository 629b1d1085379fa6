//! Inventory item endpoints (read-only browse + ledger operations)

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{enums::ItemStatus, history::HistoryEntry, item::{AdjustQuantity, Item}},
};

use super::Actor;

/// Explicit status change on an item
#[derive(Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub status: ItemStatus,
}

/// List all items
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    responses(
        (status = 200, description = "All inventory items", body = Vec<Item>)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    _actor: Actor,
) -> AppResult<Json<Vec<Item>>> {
    let items = state.services.inventory.list().await?;
    Ok(Json(items))
}

/// Get one item
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    _actor: Actor,
    Path(item_id): Path<i32>,
) -> AppResult<Json<Item>> {
    let item = state.services.inventory.get_by_id(item_id).await?;
    Ok(Json(item))
}

/// Adjust an item's free stock (admin)
#[utoipa::path(
    post,
    path = "/items/{id}/adjust",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    request_body = AdjustQuantity,
    responses(
        (status = 200, description = "Adjusted item", body = Item),
        (status = 400, description = "Adjustment would leave stock out of bounds"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn adjust_quantity(
    State(state): State<crate::AppState>,
    actor: Actor,
    Path(item_id): Path<i32>,
    Json(request): Json<AdjustQuantity>,
) -> AppResult<Json<Item>> {
    if !actor.role.is_admin() {
        return Err(AppError::InsufficientPrivilege(
            "Adjusting inventory requires admin authority".to_string(),
        ));
    }
    let item = state
        .services
        .inventory
        .adjust_quantity(item_id, request.delta, actor.id, &request.reason)
        .await?;
    Ok(Json(item))
}

/// Set an item's status (admin)
#[utoipa::path(
    put,
    path = "/items/{id}/status",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Updated item", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn set_status(
    State(state): State<crate::AppState>,
    actor: Actor,
    Path(item_id): Path<i32>,
    Json(request): Json<SetStatusRequest>,
) -> AppResult<Json<Item>> {
    if !actor.role.is_admin() {
        return Err(AppError::InsufficientPrivilege(
            "Changing item status requires admin authority".to_string(),
        ));
    }
    let item = state
        .services
        .inventory
        .set_status(item_id, request.status, actor.id)
        .await?;
    Ok(Json(item))
}

/// List an item's history, newest first
#[utoipa::path(
    get,
    path = "/items/{id}/history",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Audit trail for the item", body = Vec<HistoryEntry>),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item_history(
    State(state): State<crate::AppState>,
    _actor: Actor,
    Path(item_id): Path<i32>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = state.services.history.list_for_item(item_id).await?;
    Ok(Json(entries))
}
