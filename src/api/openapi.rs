//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, items, requests};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.3.0",
        description = "Asset borrowing and inventory reservation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Items
        items::list_items,
        items::get_item,
        items::adjust_quantity,
        items::set_status,
        items::get_item_history,
        // Requests
        requests::submit_request,
        requests::list_requests,
        requests::get_request,
        requests::approve_request,
        requests::decline_request,
        requests::return_request,
        requests::cancel_request,
        requests::extend_request,
        requests::check_availability,
    ),
    components(
        schemas(
            // Items
            crate::models::item::Item,
            crate::models::item::AdjustQuantity,
            crate::models::enums::ItemStatus,
            crate::models::enums::Sensitivity,
            items::SetStatusRequest,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::SubmitRequest,
            crate::models::request::ReturnRequest,
            crate::models::request::DeclineRequest,
            crate::models::request::ExtendRequest,
            crate::models::enums::RequestStatus,
            crate::models::enums::Role,
            requests::LifecycleResponse,
            requests::AvailabilityResponse,
            // History
            crate::models::history::HistoryEntry,
            crate::models::enums::HistoryAction,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Inventory ledger and audit trail"),
        (name = "requests", description = "Borrow request lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
