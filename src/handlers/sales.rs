use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{created, ok, parse_date, JsonBody};
use crate::entities::{customer, order_line_item, product};
use crate::errors::ServiceError;
use crate::repositories::CustomerFilter;
use crate::services::{
    customers::CreateCustomerRequest,
    orders::{AttachProductRequest, CreateOrderRequest, OrderDetails, OrderView},
};
use crate::{ApiResponse, ApiResult, AppState};

/// Customer search filters; at least one must be set.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct CustomerSearchParams {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
    pub role: Option<String>,
}

impl From<CustomerSearchParams> for CustomerFilter {
    fn from(params: CustomerSearchParams) -> Self {
        Self {
            name: params.name,
            phone: params.phone,
            delivery_address: params.delivery_address,
            role: params.role,
        }
    }
}

pub fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/pending", get(pending_orders))
        .route("/orders/placed/:date", get(orders_placed_on))
        .route("/orders/due/:date", get(orders_due_on))
        .route("/orders/month/:date", get(orders_in_month))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/items", post(attach_product))
        .route("/orders/:id/confirm", post(confirm_order))
        .route("/customers", post(create_customer).get(latest_customers))
        .route("/customers/search", get(search_customers))
        .route("/products", get(list_products))
}

#[utoipa::path(
    post,
    path = "/api/v1/sales/orders",
    summary = "Create order",
    description = "Open a pending order for an existing customer",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderView>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request or unknown customer", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn create_order(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderView>>), ServiceError> {
    let order = state.services.orders.create_order(request).await?;
    Ok(created(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/orders/pending",
    summary = "Pending orders",
    description = "Orders whose order and delivery status are both pending",
    responses(
        (status = 200, description = "Pending orders", body = ApiResponse<Vec<OrderView>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn pending_orders(State(state): State<AppState>) -> ApiResult<Vec<OrderView>> {
    Ok(ok(state.services.orders.pending_orders().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/orders/placed/{date}",
    summary = "Orders placed on a day",
    params(("date" = String, Path, description = "UTC calendar day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Orders created that day", body = ApiResponse<Vec<OrderView>>),
        (status = 400, description = "Malformed date", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn orders_placed_on(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Vec<OrderView>> {
    let date = parse_date(&date)?;
    Ok(ok(state.services.orders.orders_by_placement_day(date).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/orders/due/{date}",
    summary = "Orders due on a day",
    params(("date" = String, Path, description = "UTC calendar day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Orders expected that day", body = ApiResponse<Vec<OrderView>>),
        (status = 400, description = "Malformed date", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn orders_due_on(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Vec<OrderView>> {
    let date = parse_date(&date)?;
    Ok(ok(state.services.orders.orders_by_delivery_day(date).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/orders/month/{date}",
    summary = "Orders placed in a month",
    params(("date" = String, Path, description = "Any day of the month, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Orders created that month", body = ApiResponse<Vec<OrderView>>),
        (status = 400, description = "Malformed date", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn orders_in_month(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Vec<OrderView>> {
    let date = parse_date(&date)?;
    Ok(ok(state.services.orders.orders_by_month(date).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/orders/{id}",
    summary = "Order details",
    description = "An order with its line items and product names",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<OrderDetails>),
        (status = 400, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderDetails> {
    Ok(ok(state.services.orders.order_details(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/sales/orders/{id}/items",
    summary = "Attach product",
    description = "Reserve stock of a product for the order",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = AttachProductRequest,
    responses(
        (status = 201, description = "Line item created", body = ApiResponse<order_line_item::Model>),
        (status = 400, description = "Insufficient stock, unknown order or product", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn attach_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<AttachProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<order_line_item::Model>>), ServiceError> {
    let line_item = state.services.orders.attach_product(id, request).await?;
    Ok(created(line_item))
}

#[utoipa::path(
    post,
    path = "/api/v1/sales/orders/{id}/confirm",
    summary = "Confirm order",
    description = "Move the order to processing and notify the floor",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order confirmed", body = ApiResponse<OrderView>),
        (status = 400, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderView> {
    Ok(ok(state.services.orders.confirm_processing(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/sales/customers",
    summary = "Create customer",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<customer::Model>),
        (status = 400, description = "Missing fields", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<customer::Model>>), ServiceError> {
    let customer = state.services.customers.create_customer(request).await?;
    Ok(created(customer))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/customers",
    summary = "Latest customers",
    responses(
        (status = 200, description = "Most recently created customers", body = ApiResponse<Vec<customer::Model>>),
    ),
    tag = "sales"
)]
pub async fn latest_customers(State(state): State<AppState>) -> ApiResult<Vec<customer::Model>> {
    Ok(ok(state.services.customers.latest_customers().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/customers/search",
    summary = "Search customers",
    params(CustomerSearchParams),
    responses(
        (status = 200, description = "Matching customers", body = ApiResponse<Vec<customer::Model>>),
        (status = 400, description = "No filter given", body = crate::errors::ErrorResponse),
    ),
    tag = "sales"
)]
pub async fn search_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerSearchParams>,
) -> ApiResult<Vec<customer::Model>> {
    Ok(ok(state
        .services
        .customers
        .search_customers(params.into())
        .await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/products",
    summary = "Products in stock",
    description = "Products ordered by remaining stock, lowest first",
    responses(
        (status = 200, description = "Products", body = ApiResponse<Vec<product::Model>>),
    ),
    tag = "sales"
)]
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<product::Model>> {
    Ok(ok(state.services.catalog.in_stock_list().await?))
}
