use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created, ok, parse_date, JsonBody};
use crate::entities::{raw_material, replenishment_request};
use crate::errors::ServiceError;
use crate::services::requests::{RequestView, SubmitRequest};
use crate::{ApiResponse, ApiResult, AppState};

pub fn factory_routes() -> Router<AppState> {
    Router::new()
        .route("/raw-materials", get(list_raw_materials))
        .route("/material-requests", post(submit_material_request))
        // both routes share the `:id` segment name; the day route reads it as a date
        .route("/material-requests/:id", get(material_requests_on_day))
        .route(
            "/material-requests/:id/processed",
            post(mark_material_request_processed),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/factory/raw-materials",
    summary = "Raw material stock",
    responses(
        (status = 200, description = "Raw materials, lowest stock first", body = ApiResponse<Vec<raw_material::Model>>),
    ),
    tag = "factory"
)]
pub async fn list_raw_materials(
    State(state): State<AppState>,
) -> ApiResult<Vec<raw_material::Model>> {
    Ok(ok(state.services.catalog.list_raw_materials().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/factory/material-requests",
    summary = "Request raw material",
    description = "Ask to buy a raw material; `raw_material_id` names the subject and a positive budget is required",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Request submitted", body = ApiResponse<replenishment_request::Model>),
        (status = 400, description = "Unknown material, invalid quantity or budget", body = crate::errors::ErrorResponse),
    ),
    tag = "factory"
)]
pub async fn submit_material_request(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SubmitRequest>,
) -> Result<(StatusCode, Json<ApiResponse<replenishment_request::Model>>), ServiceError> {
    let submitted = state.services.material_requests.submit(request).await?;
    Ok(created(submitted))
}

#[utoipa::path(
    get,
    path = "/api/v1/factory/material-requests/{date}",
    summary = "Material requests of a day",
    description = "Requests created on the local calendar day, up to now when the day is today",
    params(("date" = String, Path, description = "Local calendar day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Requests with material names", body = ApiResponse<Vec<RequestView>>),
        (status = 400, description = "Malformed date", body = crate::errors::ErrorResponse),
    ),
    tag = "factory"
)]
pub async fn material_requests_on_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Vec<RequestView>> {
    let date = parse_date(&date)?;
    Ok(ok(state
        .services
        .material_requests
        .created_on_day(date)
        .await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/factory/material-requests/{id}/processed",
    summary = "Mark material request processed",
    params(("id" = Uuid, Path, description = "Material request ID")),
    responses(
        (status = 200, description = "Request processed", body = ApiResponse<replenishment_request::Model>),
        (status = 400, description = "Request not found", body = crate::errors::ErrorResponse),
    ),
    tag = "factory"
)]
pub async fn mark_material_request_processed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<replenishment_request::Model> {
    Ok(ok(state
        .services
        .material_requests
        .mark_processed(id)
        .await?))
}
