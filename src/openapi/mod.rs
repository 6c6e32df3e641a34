use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FlavorWave API",
        version = "0.1.0",
        description = r#"
# FlavorWave Operations API

Order management backend for the sales, logistics, warehouse, admin and factory departments.

## Features

- **Sales**: open orders for customers, reserve product stock, confirm orders
- **Logistics**: register trucks and dispatch delivery routes
- **Warehouse**: adjust stock levels and raise stock requests
- **Admin**: staff, catalog, recipes, request approval and dashboards
- **Factory**: raw material stock and material purchase requests
- **Notifications**: workflow transitions are pushed to a realtime sink through an outbox

## Error Handling

Every failure uses the same body. Validation failures, unknown references and
conflicts (including insufficient stock) answer 400; store or sink failures answer 500.

```json
{
  "error": "Bad Request",
  "message": "Not found: Order 550e8400-e29b-41d4-a716-446655440000 not found",
  "request_id": "6f1c...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "sales", description = "Orders and customers"),
        (name = "logistics", description = "Trucks and delivery routes"),
        (name = "warehouse", description = "Stock levels and stock requests"),
        (name = "admin", description = "Staff, catalog, approvals and analytics"),
        (name = "factory", description = "Raw materials and material requests"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Sales
        crate::handlers::sales::create_order,
        crate::handlers::sales::pending_orders,
        crate::handlers::sales::orders_placed_on,
        crate::handlers::sales::orders_due_on,
        crate::handlers::sales::orders_in_month,
        crate::handlers::sales::get_order,
        crate::handlers::sales::attach_product,
        crate::handlers::sales::confirm_order,
        crate::handlers::sales::create_customer,
        crate::handlers::sales::latest_customers,
        crate::handlers::sales::search_customers,
        crate::handlers::sales::list_products,

        // Logistics
        crate::handlers::logistics::create_truck,
        crate::handlers::logistics::list_trucks,
        crate::handlers::logistics::incoming_orders,
        crate::handlers::logistics::route_of_order,
        crate::handlers::logistics::assign_route,
        crate::handlers::logistics::ongoing_routes,
        crate::handlers::logistics::route_details,

        // Warehouse
        crate::handlers::warehouse::list_products,
        crate::handlers::warehouse::increase_stock,
        crate::handlers::warehouse::decrease_stock,
        crate::handlers::warehouse::submit_stock_request,
        crate::handlers::warehouse::list_stock_requests,
        crate::handlers::warehouse::mark_stock_request_processed,

        // Admin
        crate::handlers::admin::create_employee,
        crate::handlers::admin::list_employees,
        crate::handlers::admin::create_product,
        crate::handlers::admin::remove_product,
        crate::handlers::admin::create_raw_material,
        crate::handlers::admin::create_recipe,
        crate::handlers::admin::recipe_details,
        crate::handlers::admin::add_required_material,
        crate::handlers::admin::approve_stock_requests,
        crate::handlers::admin::approve_material_requests,
        crate::handlers::admin::overview,
        crate::handlers::admin::order_analytics,

        // Factory
        crate::handlers::factory::list_raw_materials,
        crate::handlers::factory::submit_material_request,
        crate::handlers::factory::material_requests_on_day,
        crate::handlers::factory::mark_material_request_processed,

        crate::health_check,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,
            crate::entities::status::OrderStatus,
            crate::entities::status::DeliveryStatus,
            crate::entities::status::PaidStatus,
            crate::entities::status::RequestStatus,
            crate::entities::status::AdminStatus,
            crate::entities::status::Department,
            crate::services::analytics::StatusDimension,
            crate::services::time_windows::TimeWindow,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_department_routes() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("FlavorWave API"));
        assert!(json.contains("/api/v1/sales/orders/{id}/items"));
        assert!(json.contains("/api/v1/logistics/routes"));
        assert!(json.contains("/api/v1/admin/stock-requests/approve"));
        assert!(json.contains("/api/v1/factory/material-requests/{date}"));
    }
}
