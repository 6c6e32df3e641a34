use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{created, ok, parse_date, JsonBody, PaginationParams};
use crate::entities::{product, raw_material, recipe, required_material};
use crate::errors::ServiceError;
use crate::services::{
    analytics::{OverviewCount, StatusDimension, StatusGroup},
    catalog::{
        AddRequiredMaterialRequest, CreateProductRequest, CreateRawMaterialRequest,
        CreateRecipeRequest, RecipeDetails,
    },
    employees::{CreateEmployeeRequest, EmployeePage, EmployeeView},
    requests::{ApproveRequests, BulkApproval},
    time_windows::TimeWindow,
};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct OverviewParams {
    /// Day whose month is summarised, YYYY-MM-DD. Defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct OrderAnalyticsParams {
    /// `order_status` (default) or `delivery_status`
    pub dimension: Option<String>,
    /// `day`, `week`, `month` or `year` (also `daily` ... `yearly`)
    #[serde(alias = "period")]
    pub window: Option<String>,
}

impl OrderAnalyticsParams {
    fn parse(&self) -> Result<(StatusDimension, TimeWindow), ServiceError> {
        let dimension = match self.dimension.as_deref() {
            None => StatusDimension::OrderStatus,
            Some(raw) => StatusDimension::from_str(raw.trim()).map_err(|_| {
                ServiceError::ValidationError(format!("unknown dimension '{}'", raw))
            })?,
        };
        let raw_window = self
            .window
            .as_deref()
            .ok_or_else(|| ServiceError::ValidationError("window is required".to_string()))?;
        let window = TimeWindow::from_str(raw_window.trim()).map_err(|_| {
            ServiceError::ValidationError(format!("unknown window '{}'", raw_window))
        })?;
        Ok((dimension, window))
    }
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", post(create_employee).get(list_employees))
        .route("/products", post(create_product))
        .route("/products/:id", delete(remove_product))
        .route("/raw-materials", post(create_raw_material))
        .route("/recipes", post(create_recipe))
        .route("/recipes/:id", get(recipe_details))
        .route("/recipes/:id/materials", post(add_required_material))
        .route("/stock-requests/approve", patch(approve_stock_requests))
        .route("/material-requests/approve", patch(approve_material_requests))
        .route("/overview", get(overview))
        .route("/analytics/orders", get(order_analytics))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/employees",
    summary = "Create employee",
    description = "Register an employee in a department. Admins use the `admin` department.",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = ApiResponse<EmployeeView>),
        (status = 400, description = "Invalid data or duplicate email", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EmployeeView>>), ServiceError> {
    let employee = state.services.employees.create_employee(request).await?;
    Ok(created(employee))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/employees",
    summary = "List employees",
    params(PaginationParams),
    responses(
        (status = 200, description = "Employees, newest first", body = ApiResponse<EmployeePage>),
    ),
    tag = "admin"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<EmployeePage> {
    let (page, limit) = params.resolve(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );
    Ok(ok(state.services.employees.list_employees(page, limit).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    summary = "Create product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<product::Model>),
        (status = 400, description = "Invalid stock or duplicate name", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<product::Model>>), ServiceError> {
    let product = state.services.catalog.create_product(request).await?;
    Ok(created(product))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    summary = "Remove product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product removed", body = ApiResponse<Uuid>),
        (status = 400, description = "Product not found or still ordered", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn remove_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Uuid> {
    state.services.catalog.remove_product(id).await?;
    Ok(ok(id))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/raw-materials",
    summary = "Create raw material",
    request_body = CreateRawMaterialRequest,
    responses(
        (status = 201, description = "Raw material created", body = ApiResponse<raw_material::Model>),
        (status = 400, description = "Duplicate name", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn create_raw_material(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateRawMaterialRequest>,
) -> Result<(StatusCode, Json<ApiResponse<raw_material::Model>>), ServiceError> {
    let material = state.services.catalog.create_raw_material(request).await?;
    Ok(created(material))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/recipes",
    summary = "Create recipe",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = ApiResponse<recipe::Model>),
        (status = 400, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<recipe::Model>>), ServiceError> {
    let recipe = state.services.catalog.create_recipe(request).await?;
    Ok(created(recipe))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/recipes/{id}",
    summary = "Recipe details",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe with its materials", body = ApiResponse<RecipeDetails>),
        (status = 400, description = "Recipe not found", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn recipe_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RecipeDetails> {
    Ok(ok(state.services.catalog.recipe_details(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/recipes/{id}/materials",
    summary = "Add material to recipe",
    params(("id" = Uuid, Path, description = "Recipe ID")),
    request_body = AddRequiredMaterialRequest,
    responses(
        (status = 201, description = "Material added", body = ApiResponse<required_material::Model>),
        (status = 400, description = "Unknown recipe or material", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn add_required_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<AddRequiredMaterialRequest>,
) -> Result<(StatusCode, Json<ApiResponse<required_material::Model>>), ServiceError> {
    let line = state
        .services
        .catalog
        .add_required_material(id, request)
        .await?;
    Ok(created(line))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/stock-requests/approve",
    summary = "Approve stock requests",
    request_body = ApproveRequests,
    responses(
        (status = 200, description = "Approved and unknown ids", body = ApiResponse<BulkApproval>),
        (status = 400, description = "Empty id list", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn approve_stock_requests(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ApproveRequests>,
) -> ApiResult<BulkApproval> {
    Ok(ok(state.services.stock_requests.approve(request).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/material-requests/approve",
    summary = "Approve material requests",
    request_body = ApproveRequests,
    responses(
        (status = 200, description = "Approved and unknown ids", body = ApiResponse<BulkApproval>),
        (status = 400, description = "Empty id list", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn approve_material_requests(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ApproveRequests>,
) -> ApiResult<BulkApproval> {
    Ok(ok(state.services.material_requests.approve(request).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/overview",
    summary = "Monthly overview",
    description = "Orders, delivering trucks and new customers for the month of `date`",
    params(OverviewParams),
    responses(
        (status = 200, description = "Counts", body = ApiResponse<Vec<OverviewCount>>),
        (status = 400, description = "Malformed date", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<OverviewParams>,
) -> ApiResult<Vec<OverviewCount>> {
    let date = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    Ok(ok(state.services.analytics.monthly_overall_counts(date).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics/orders",
    summary = "Order status analytics",
    description = "Orders created in the current window, grouped by the chosen status field",
    params(OrderAnalyticsParams),
    responses(
        (status = 200, description = "One row per status value: the status under the dimension name, `count` and `created_dates`"),
        (status = 400, description = "Missing or unknown window or dimension", body = crate::errors::ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn order_analytics(
    State(state): State<AppState>,
    Query(params): Query<OrderAnalyticsParams>,
) -> ApiResult<Vec<StatusGroup>> {
    let (dimension, window) = params.parse()?;
    Ok(ok(state
        .services
        .analytics
        .count_by_status_in_window(dimension, window)
        .await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn analytics_params_default_to_order_status() {
        let params = OrderAnalyticsParams {
            dimension: None,
            window: Some("weekly".into()),
        };
        assert_eq!(
            params.parse().unwrap(),
            (StatusDimension::OrderStatus, TimeWindow::Week)
        );
    }

    #[test]
    fn analytics_params_require_known_window() {
        let missing = OrderAnalyticsParams::default();
        assert_matches!(missing.parse(), Err(ServiceError::ValidationError(_)));

        let unknown = OrderAnalyticsParams {
            dimension: Some("delivery_status".into()),
            window: Some("hourly".into()),
        };
        assert_matches!(unknown.parse(), Err(ServiceError::ValidationError(_)));
    }
}
