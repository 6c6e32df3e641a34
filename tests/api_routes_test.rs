mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Local, Utc};
use common::{json_body, TestApp};
use serde_json::{json, Value};
use uuid::Uuid;

async fn created_id(app: &TestApp, uri: &str, body: Value) -> String {
    let response = app.post(uri, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {}", uri);
    let json = json_body(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_database_and_echoes_request_id() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "healthy");
}

#[tokio::test]
async fn sales_flow_creates_fills_and_confirms_an_order() {
    let app = TestApp::new().await;

    let customer_id = created_id(
        &app,
        "/api/v1/sales/customers",
        json!({
            "name": "Bayview Deli",
            "phone": "555-0101",
            "delivery_address": "1 Pier Road",
            "role": "retailer"
        }),
    )
    .await;
    let product_id = created_id(
        &app,
        "/api/v1/admin/products",
        json!({ "name": "Orange Syrup", "in_stock_count": 5 }),
    )
    .await;
    let order_id = created_id(
        &app,
        "/api/v1/sales/orders",
        json!({
            "customer_id": customer_id,
            "expected_date": (Utc::now() + Duration::days(2)).to_rfc3339()
        }),
    )
    .await;

    let response = app
        .post(
            &format!("/api/v1/sales/orders/{}/items", order_id),
            json!({ "product_id": product_id, "count": 5 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post(
            &format!("/api/v1/sales/orders/{}/items", order_id),
            json!({ "product_id": product_id, "count": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["error"], "Bad Request");
    assert!(error["message"]
        .as_str()
        .unwrap()
        .starts_with("Insufficient stock"));

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/sales/orders/{}/confirm", order_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let confirmed = json_body(response).await;
    assert_eq!(confirmed["data"]["order_status"], "processing");
    assert_eq!(confirmed["data"]["delivery_status"], "processing");
    assert_eq!(confirmed["data"]["product_list"].as_array().unwrap().len(), 1);

    let details = json_body(app.get(&format!("/api/v1/sales/orders/{}", order_id)).await).await;
    assert_eq!(details["data"]["line_items"][0]["product_name"], "Orange Syrup");
}

#[tokio::test]
async fn client_errors_answer_400_with_error_body() {
    let app = TestApp::new().await;

    let unknown_customer = app
        .post(
            "/api/v1/sales/orders",
            json!({ "customer_id": Uuid::new_v4(), "expected_date": Utc::now().to_rfc3339() }),
        )
        .await;
    assert_eq!(unknown_customer.status(), StatusCode::BAD_REQUEST);
    let body = json_body(unknown_customer).await;
    assert!(body["message"].as_str().unwrap().contains("Customer"));
    assert!(body["timestamp"].is_string());

    let malformed = app
        .post("/api/v1/sales/orders", json!({ "customer_id": "not-a-uuid" }))
        .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let no_filter = app.get("/api/v1/sales/customers/search").await;
    assert_eq!(no_filter.status(), StatusCode::BAD_REQUEST);

    let bad_date = app.get("/api/v1/sales/orders/placed/15-03-2024").await;
    assert_eq!(bad_date.status(), StatusCode::BAD_REQUEST);

    let bad_day = app.get("/api/v1/factory/material-requests/yesterday").await;
    assert_eq!(bad_day.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logistics_dispatches_routes_for_pending_orders() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Ridge Foods").await;
    let order_id = created_id(
        &app,
        "/api/v1/sales/orders",
        json!({ "customer_id": customer.id, "expected_date": Utc::now().to_rfc3339() }),
    )
    .await;

    let incoming = json_body(app.get("/api/v1/logistics/orders/pending").await).await;
    assert_eq!(incoming["data"].as_array().unwrap().len(), 1);

    let truck_id = created_id(
        &app,
        "/api/v1/logistics/trucks",
        json!({ "truck_id_card": "TRK-100", "capacity": 30, "driver": "Sam" }),
    )
    .await;

    let departure = Utc::now();
    let response = app
        .post(
            "/api/v1/logistics/routes",
            json!({
                "truck_id": truck_id,
                "departure_date": departure.to_rfc3339(),
                "completed_date": (departure + Duration::hours(4)).to_rfc3339(),
                "order_ids": [order_id]
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let route = json_body(response).await;
    let route_id = route["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(route["data"]["status"], "ongoing");

    let owner = json_body(
        app.get(&format!("/api/v1/logistics/orders/{}/route", order_id))
            .await,
    )
    .await;
    assert_eq!(owner["data"]["id"], route_id.as_str());

    let details = json_body(app.get(&format!("/api/v1/logistics/routes/{}", route_id)).await).await;
    assert_eq!(details["data"]["orders"][0]["delivery_status"], "delivering");

    let ongoing = json_body(app.get("/api/v1/logistics/routes").await).await;
    assert_eq!(ongoing["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn warehouse_and_admin_handle_stock_requests() {
    let app = TestApp::new().await;
    let product = app.seed_product("Cocoa Syrup", 2).await;

    let raised = app
        .post(
            &format!("/api/v1/warehouse/products/{}/increase", product.id),
            json!({ "amount": 3 }),
        )
        .await;
    assert_eq!(raised.status(), StatusCode::OK);
    assert_eq!(json_body(raised).await["data"]["in_stock_count"], 5);

    let zero = app
        .post(
            &format!("/api/v1/warehouse/products/{}/decrease", product.id),
            json!({ "amount": 0 }),
        )
        .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let request_id = created_id(
        &app,
        "/api/v1/warehouse/stock-requests",
        json!({ "product_id": product.id, "quantity": 40 }),
    )
    .await;

    let ghost = Uuid::new_v4();
    let response = app
        .request(
            Method::PATCH,
            "/api/v1/admin/stock-requests/approve",
            Some(json!({ "request_ids": [request_id, ghost] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = json_body(response).await;
    assert_eq!(outcome["data"]["approved"], json!([request_id]));
    assert_eq!(outcome["data"]["not_found"], json!([ghost]));

    let listed = json_body(app.get("/api/v1/warehouse/stock-requests").await).await;
    assert_eq!(listed["data"][0]["admin_status"], "approved");
    assert_eq!(listed["data"][0]["subject_name"], "Cocoa Syrup");

    let processed = app
        .request(
            Method::POST,
            &format!("/api/v1/warehouse/stock-requests/{}/processed", request_id),
            None,
        )
        .await;
    assert_eq!(processed.status(), StatusCode::OK);
    assert_eq!(json_body(processed).await["data"]["status"], "processed");
}

#[tokio::test]
async fn factory_material_requests_are_listed_by_day() {
    let app = TestApp::new().await;
    let malt = app.seed_raw_material("Malt", 4).await;

    let missing_budget = app
        .post(
            "/api/v1/factory/material-requests",
            json!({ "raw_material_id": malt.id, "quantity": 10 }),
        )
        .await;
    assert_eq!(missing_budget.status(), StatusCode::BAD_REQUEST);

    created_id(
        &app,
        "/api/v1/factory/material-requests",
        json!({ "raw_material_id": malt.id, "quantity": 10, "budget": "320.50" }),
    )
    .await;

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let listed = json_body(
        app.get(&format!("/api/v1/factory/material-requests/{}", today))
            .await,
    )
    .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["subject_name"], "Malt");
    assert_eq!(listed["data"][0]["status"], "pending");

    let materials = json_body(app.get("/api/v1/factory/raw-materials").await).await;
    assert_eq!(materials["data"][0]["name"], "Malt");
}

#[tokio::test]
async fn admin_manages_staff_and_catalog() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/v1/admin/employees",
            json!({
                "name": "Jordan Lee",
                "email": "Jordan.Lee@FlavorWave.example",
                "phone": "555-0199",
                "role": "manager",
                "department": "warehouse",
                "password": "correct horse battery"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let employee = json_body(response).await;
    assert_eq!(employee["data"]["email"], "jordan.lee@flavorwave.example");
    assert!(employee["data"].get("password_hash").is_none());

    let page = json_body(app.get("/api/v1/admin/employees?page=1&limit=5").await).await;
    assert_eq!(page["data"]["total"], 1);
    assert_eq!(page["data"]["limit"], 5);

    let product_id = created_id(
        &app,
        "/api/v1/admin/products",
        json!({ "name": "Apple Juice", "in_stock_count": 0 }),
    )
    .await;
    let duplicate = app
        .post(
            "/api/v1/admin/products",
            json!({ "name": "Apple Juice", "in_stock_count": 1 }),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let material_id = created_id(
        &app,
        "/api/v1/admin/raw-materials",
        json!({ "name": "Apples", "in_stock_count": 100 }),
    )
    .await;
    let recipe_id = created_id(
        &app,
        "/api/v1/admin/recipes",
        json!({ "product_id": product_id }),
    )
    .await;
    let response = app
        .post(
            &format!("/api/v1/admin/recipes/{}/materials", recipe_id),
            json!({ "raw_material_id": material_id, "required_quantity": 3 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let recipe = json_body(app.get(&format!("/api/v1/admin/recipes/{}", recipe_id)).await).await;
    assert_eq!(
        recipe["data"]["required_materials"][0]["material_name"],
        "Apples"
    );

    let removed = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/products/{}", product_id),
            None,
        )
        .await;
    assert_eq!(removed.status(), StatusCode::OK);
    let again = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/products/{}", product_id),
            None,
        )
        .await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_dashboards_summarise_orders() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Dashboard Shop").await;
    created_id(
        &app,
        "/api/v1/sales/orders",
        json!({ "customer_id": customer.id, "expected_date": Utc::now().to_rfc3339() }),
    )
    .await;

    let overview = json_body(app.get("/api/v1/admin/overview").await).await;
    let counts = overview["data"].as_array().unwrap();
    assert_eq!(counts.len(), 3);
    assert_eq!(counts[0]["name"], "orders");
    assert_eq!(counts[0]["count"], 1);
    assert_eq!(counts[2]["name"], "customers");
    assert_eq!(counts[2]["count"], 1);

    let missing_window = app.get("/api/v1/admin/analytics/orders").await;
    assert_eq!(missing_window.status(), StatusCode::BAD_REQUEST);

    let unknown_dimension = app
        .get("/api/v1/admin/analytics/orders?window=week&dimension=colour")
        .await;
    assert_eq!(unknown_dimension.status(), StatusCode::BAD_REQUEST);

    let groups = json_body(
        app.get("/api/v1/admin/analytics/orders?window=year&dimension=delivery_status")
            .await,
    )
    .await;
    assert_eq!(groups["data"][0]["delivery_status"], "pending");
    assert_eq!(groups["data"][0]["count"], 1);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["info"]["title"], "FlavorWave API");
}
