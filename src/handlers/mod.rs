pub mod admin;
pub mod common;
pub mod factory;
pub mod logistics;
pub mod sales;
pub mod warehouse;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::services::{
    analytics::AnalyticsService,
    catalog::CatalogService,
    customers::CustomerService,
    delivery_routes::DeliveryRouteService,
    employees::EmployeeService,
    orders::OrderWorkflow,
    requests::{MaterialRequestWorkflow, StockRequestWorkflow},
    stock_ledger::StockLedger,
    trucks::TruckService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderWorkflow>,
    pub stock: Arc<StockLedger>,
    pub routes: Arc<DeliveryRouteService>,
    pub stock_requests: Arc<StockRequestWorkflow>,
    pub material_requests: Arc<MaterialRequestWorkflow>,
    pub analytics: Arc<AnalyticsService>,
    pub customers: Arc<CustomerService>,
    pub employees: Arc<EmployeeService>,
    pub catalog: Arc<CatalogService>,
    pub trucks: Arc<TruckService>,
}

impl AppServices {
    /// Builds every service over one shared pool.
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        let ledger = StockLedger::new(db_pool.clone());
        Self {
            orders: Arc::new(OrderWorkflow::new(db_pool.clone(), ledger.clone())),
            stock: Arc::new(ledger),
            routes: Arc::new(DeliveryRouteService::new(db_pool.clone())),
            stock_requests: Arc::new(StockRequestWorkflow::new(db_pool.clone())),
            material_requests: Arc::new(MaterialRequestWorkflow::new(db_pool.clone())),
            analytics: Arc::new(AnalyticsService::new(db_pool.clone())),
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            employees: Arc::new(EmployeeService::new(db_pool.clone())),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            trucks: Arc::new(TruckService::new(db_pool)),
        }
    }
}
