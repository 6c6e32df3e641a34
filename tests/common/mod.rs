#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use flavorwave_api::{
    config::AppConfig,
    db,
    entities::{customer, product, raw_material, truck},
    services::{
        catalog::{CreateProductRequest, CreateRawMaterialRequest},
        customers::CreateCustomerRequest,
        trucks::CreateTruckRequest,
    },
    AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Development config over a private in-memory SQLite database.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18_080,
        "development".to_string(),
    );
    // one connection keeps every query on the same in-memory database
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg
}

/// Fresh migrated database, not yet wrapped in an application.
pub async fn test_db() -> Arc<DatabaseConnection> {
    migrated(&test_config()).await
}

async fn migrated(cfg: &AppConfig) -> Arc<DatabaseConnection> {
    let pool = db::establish_connection_from_app_config(cfg)
        .await
        .expect("failed to create test database");
    db::run_migrations(&pool)
        .await
        .expect("failed to run migrations in tests");
    Arc::new(pool)
}

/// Helper harness for driving the full router against an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: Option<TempDir>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config(), None).await
    }

    /// SQLite database file in a temporary directory, shared by a pool of
    /// `connections` so transactions really overlap.
    pub async fn file_backed(connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("flavorwave-test.db");

        let mut cfg = test_config();
        cfg.database_url = format!("sqlite://{}?mode=rwc", path.display());
        cfg.db_max_connections = connections;
        cfg.db_min_connections = 1;
        Self::with_config(cfg, Some(dir)).await
    }

    async fn with_config(cfg: AppConfig, dir: Option<TempDir>) -> Self {
        let db = migrated(&cfg).await;
        let state = AppState::new(db, cfg);
        let router = flavorwave_api::build_router(state.clone()).expect("router builds");
        Self {
            router,
            state,
            _dir: dir,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// Send a request through the router, with a JSON body when given.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> axum::response::Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn seed_customer(&self, name: &str) -> customer::Model {
        self.state
            .services
            .customers
            .create_customer(CreateCustomerRequest {
                name: name.to_string(),
                phone: "0123 456 789".to_string(),
                delivery_address: format!("{} Street 1", name),
                role: "retailer".to_string(),
            })
            .await
            .expect("seed customer")
    }

    pub async fn seed_product(&self, name: &str, in_stock_count: i32) -> product::Model {
        self.state
            .services
            .catalog
            .create_product(CreateProductRequest {
                name: name.to_string(),
                in_stock_count,
            })
            .await
            .expect("seed product")
    }

    pub async fn seed_raw_material(&self, name: &str, in_stock_count: i32) -> raw_material::Model {
        self.state
            .services
            .catalog
            .create_raw_material(CreateRawMaterialRequest {
                name: name.to_string(),
                in_stock_count,
            })
            .await
            .expect("seed raw material")
    }

    pub async fn seed_truck(&self, card: &str, capacity: i32) -> truck::Model {
        self.state
            .services
            .trucks
            .create_truck(CreateTruckRequest {
                truck_id_card: card.to_string(),
                capacity,
                driver: "Alex".to_string(),
            })
            .await
            .expect("seed truck")
    }
}

/// Reads the whole response body as JSON.
pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
