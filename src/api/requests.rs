//! Borrow request lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::request::{
        BorrowRequest, DeclineRequest, ExtendRequest, ReturnRequest, SubmitRequest,
    },
};

use super::Actor;

/// Response for lifecycle verbs that return no body of their own
#[derive(Serialize, ToSchema)]
pub struct LifecycleResponse {
    pub status: String,
}

/// Availability probe parameters
#[derive(Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    pub item_id: i32,
    pub quantity: i32,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// Availability probe result
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Requester filter for listing requests
#[derive(Deserialize, IntoParams)]
pub struct RequestListQuery {
    pub requester_id: Option<i32>,
}

/// Submit a new borrow request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowRequest),
        (status = 400, description = "Malformed dates, quantity or purpose"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Insufficient quantity over the window")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    actor: Actor,
    Json(request): Json<SubmitRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let row = state.services.lifecycle.submit(actor.id, request).await?;
    Ok((StatusCode::CREATED, Json(BorrowRequest::from(row))))
}

/// List borrow requests for a requester
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<BorrowRequest>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    actor: Actor,
    Query(query): Query<RequestListQuery>,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    // Non-admins only see their own requests
    let requester_id = if actor.role.is_admin() {
        query.requester_id.unwrap_or(actor.id)
    } else {
        actor.id
    };
    let rows = state.services.lifecycle.list_for_requester(requester_id).await?;
    Ok(Json(rows.into_iter().map(BorrowRequest::from).collect()))
}

/// Get one borrow request
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = BorrowRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    _actor: Actor,
    Path(request_id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let row = state.services.lifecycle.get_request(request_id).await?;
    Ok(Json(BorrowRequest::from(row)))
}

/// Approve a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = LifecycleResponse),
        (status = 403, description = "Admin (or super-admin for sensitive items) required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Not pending, or capacity no longer available")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    actor: Actor,
    Path(request_id): Path<i32>,
) -> AppResult<Json<LifecycleResponse>> {
    state
        .services
        .lifecycle
        .approve(request_id, actor.id, actor.role)
        .await?;
    Ok(Json(LifecycleResponse {
        status: "approved".to_string(),
    }))
}

/// Decline a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/decline",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = DeclineRequest,
    responses(
        (status = 200, description = "Request declined", body = LifecycleResponse),
        (status = 403, description = "Admin authority required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn decline_request(
    State(state): State<crate::AppState>,
    actor: Actor,
    Path(request_id): Path<i32>,
    Json(request): Json<DeclineRequest>,
) -> AppResult<Json<LifecycleResponse>> {
    state
        .services
        .lifecycle
        .decline(request_id, actor.id, actor.role, &request.reason)
        .await?;
    Ok(Json(LifecycleResponse {
        status: "declined".to_string(),
    }))
}

/// Return an approved request
#[utoipa::path(
    post,
    path = "/requests/{id}/return",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Units returned to stock", body = LifecycleResponse),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not approved")
    )
)]
pub async fn return_request(
    State(state): State<crate::AppState>,
    actor: Actor,
    Path(request_id): Path<i32>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<LifecycleResponse>> {
    state
        .services
        .lifecycle
        .return_request(
            request_id,
            actor.id,
            actor.role,
            request.condition.as_deref(),
            request.notes.as_deref(),
        )
        .await?;
    Ok(Json(LifecycleResponse {
        status: "returned".to_string(),
    }))
}

/// Cancel a request
#[utoipa::path(
    post,
    path = "/requests/{id}/cancel",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request cancelled", body = LifecycleResponse),
        (status = 403, description = "Not the requester, or admin required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already terminal")
    )
)]
pub async fn cancel_request(
    State(state): State<crate::AppState>,
    actor: Actor,
    Path(request_id): Path<i32>,
) -> AppResult<Json<LifecycleResponse>> {
    state
        .services
        .lifecycle
        .cancel(request_id, actor.id, actor.role)
        .await?;
    Ok(Json(LifecycleResponse {
        status: "cancelled".to_string(),
    }))
}

/// Extend an approved request's borrow window
#[utoipa::path(
    post,
    path = "/requests/{id}/extend",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    request_body = ExtendRequest,
    responses(
        (status = 200, description = "Window extended", body = LifecycleResponse),
        (status = 400, description = "new_date_to does not grow the window"),
        (status = 403, description = "Admin authority required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Not approved, or extension window conflicts")
    )
)]
pub async fn extend_request(
    State(state): State<crate::AppState>,
    actor: Actor,
    Path(request_id): Path<i32>,
    Json(request): Json<ExtendRequest>,
) -> AppResult<Json<LifecycleResponse>> {
    state
        .services
        .lifecycle
        .extend(request_id, actor.id, actor.role, request.new_date_to)
        .await?;
    Ok(Json(LifecycleResponse {
        status: "extended".to_string(),
    }))
}

/// Check whether a quantity is free over a date window
#[utoipa::path(
    get,
    path = "/availability",
    tag = "requests",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability verdict", body = AvailabilityResponse),
        (status = 400, description = "Malformed quantity or dates"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    _actor: Actor,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let available = state
        .services
        .lifecycle
        .check_availability(query.item_id, query.quantity, query.date_from, query.date_to)
        .await?;
    Ok(Json(AvailabilityResponse { available }))
}
