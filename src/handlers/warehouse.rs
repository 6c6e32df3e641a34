use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::{created, ok, JsonBody};
use crate::entities::{product, replenishment_request};
use crate::errors::ServiceError;
use crate::services::requests::{RequestView, SubmitRequest};
use crate::{ApiResponse, ApiResult, AppState};

/// Units to add to or remove from a product's stock.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StockAdjustment {
    #[validate(range(min = 1))]
    pub amount: i32,
}

pub fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id/increase", post(increase_stock))
        .route("/products/:id/decrease", post(decrease_stock))
        .route(
            "/stock-requests",
            post(submit_stock_request).get(list_stock_requests),
        )
        .route("/stock-requests/:id/processed", post(mark_stock_request_processed))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouse/products",
    summary = "Stock levels",
    responses(
        (status = 200, description = "Products, lowest stock first", body = ApiResponse<Vec<product::Model>>),
    ),
    tag = "warehouse"
)]
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<product::Model>> {
    Ok(ok(state.services.catalog.in_stock_list().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouse/products/{id}/increase",
    summary = "Increase stock",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid amount or unknown product", body = crate::errors::ErrorResponse),
    ),
    tag = "warehouse"
)]
pub async fn increase_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<StockAdjustment>,
) -> ApiResult<product::Model> {
    body.validate()?;
    Ok(ok(state.services.stock.increase(id, body.amount).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouse/products/{id}/decrease",
    summary = "Decrease stock",
    description = "Remove units from stock. The count may go negative.",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid amount or unknown product", body = crate::errors::ErrorResponse),
    ),
    tag = "warehouse"
)]
pub async fn decrease_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(body): JsonBody<StockAdjustment>,
) -> ApiResult<product::Model> {
    body.validate()?;
    Ok(ok(state.services.stock.decrease(id, body.amount).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouse/stock-requests",
    summary = "Request stock",
    description = "Ask for more of a product; `product_id` names the subject",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Request submitted", body = ApiResponse<replenishment_request::Model>),
        (status = 400, description = "Unknown product or invalid quantity", body = crate::errors::ErrorResponse),
    ),
    tag = "warehouse"
)]
pub async fn submit_stock_request(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SubmitRequest>,
) -> Result<(StatusCode, Json<ApiResponse<replenishment_request::Model>>), ServiceError> {
    let submitted = state.services.stock_requests.submit(request).await?;
    Ok(created(submitted))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouse/stock-requests",
    summary = "Recent stock requests",
    responses(
        (status = 200, description = "Latest stock requests", body = ApiResponse<Vec<RequestView>>),
    ),
    tag = "warehouse"
)]
pub async fn list_stock_requests(State(state): State<AppState>) -> ApiResult<Vec<RequestView>> {
    Ok(ok(state.services.stock_requests.latest().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouse/stock-requests/{id}/processed",
    summary = "Mark stock request processed",
    params(("id" = Uuid, Path, description = "Stock request ID")),
    responses(
        (status = 200, description = "Request processed", body = ApiResponse<replenishment_request::Model>),
        (status = 400, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    tag = "warehouse"
)]
pub async fn mark_stock_request_processed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<replenishment_request::Model> {
    Ok(ok(state.services.stock_requests.mark_processed(id).await?))
}
