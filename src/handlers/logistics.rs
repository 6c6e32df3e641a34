use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created, ok, JsonBody};
use crate::entities::{delivery_route, truck};
use crate::errors::ServiceError;
use crate::services::{
    delivery_routes::{AssignRouteRequest, RouteDetails, RouteView},
    orders::OrderView,
    trucks::CreateTruckRequest,
};
use crate::{ApiResponse, ApiResult, AppState};

pub fn logistics_routes() -> Router<AppState> {
    Router::new()
        .route("/trucks", post(create_truck).get(list_trucks))
        .route("/orders/pending", get(incoming_orders))
        .route("/orders/:id/route", get(route_of_order))
        .route("/routes", post(assign_route).get(ongoing_routes))
        .route("/routes/:id", get(route_details))
}

#[utoipa::path(
    post,
    path = "/api/v1/logistics/trucks",
    summary = "Register truck",
    request_body = CreateTruckRequest,
    responses(
        (status = 201, description = "Truck registered", body = ApiResponse<truck::Model>),
        (status = 400, description = "Invalid truck data", body = crate::errors::ErrorResponse),
    ),
    tag = "logistics"
)]
pub async fn create_truck(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateTruckRequest>,
) -> Result<(StatusCode, Json<ApiResponse<truck::Model>>), ServiceError> {
    let truck = state.services.trucks.create_truck(request).await?;
    Ok(created(truck))
}

#[utoipa::path(
    get,
    path = "/api/v1/logistics/trucks",
    summary = "List trucks",
    description = "Trucks by capacity, largest first",
    responses(
        (status = 200, description = "Trucks", body = ApiResponse<Vec<truck::Model>>),
    ),
    tag = "logistics"
)]
pub async fn list_trucks(State(state): State<AppState>) -> ApiResult<Vec<truck::Model>> {
    Ok(ok(state.services.trucks.list_trucks().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/logistics/orders/pending",
    summary = "Incoming orders",
    description = "Orders not yet confirmed or routed",
    responses(
        (status = 200, description = "Pending orders", body = ApiResponse<Vec<OrderView>>),
    ),
    tag = "logistics"
)]
pub async fn incoming_orders(State(state): State<AppState>) -> ApiResult<Vec<OrderView>> {
    Ok(ok(state.services.orders.pending_orders().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/logistics/orders/{id}/route",
    summary = "Route of an order",
    description = "The most recent delivery route containing the order, or null",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Route lookup result", body = ApiResponse<Option<delivery_route::Model>>),
        (status = 400, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "logistics"
)]
pub async fn route_of_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Option<delivery_route::Model>> {
    Ok(ok(state.services.routes.route_of_order(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/logistics/routes",
    summary = "Assign delivery route",
    description = "Dispatch a truck with a batch of orders and mark them delivering",
    request_body = AssignRouteRequest,
    responses(
        (status = 201, description = "Route created", body = ApiResponse<RouteView>),
        (status = 400, description = "Unknown truck or invalid route", body = crate::errors::ErrorResponse),
    ),
    tag = "logistics"
)]
pub async fn assign_route(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AssignRouteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RouteView>>), ServiceError> {
    let route = state.services.routes.assign_delivery_route(request).await?;
    Ok(created(route))
}

#[utoipa::path(
    get,
    path = "/api/v1/logistics/routes",
    summary = "Ongoing routes",
    responses(
        (status = 200, description = "Routes currently on the road", body = ApiResponse<Vec<RouteView>>),
    ),
    tag = "logistics"
)]
pub async fn ongoing_routes(State(state): State<AppState>) -> ApiResult<Vec<RouteView>> {
    Ok(ok(state.services.routes.ongoing_routes().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/logistics/routes/{id}",
    summary = "Route details",
    params(("id" = Uuid, Path, description = "Delivery route ID")),
    responses(
        (status = 200, description = "Route with its orders", body = ApiResponse<RouteDetails>),
        (status = 400, description = "Route not found", body = crate::errors::ErrorResponse),
    ),
    tag = "logistics"
)]
pub async fn route_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RouteDetails> {
    Ok(ok(state.services.routes.route_details(id).await?))
}
