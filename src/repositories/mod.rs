//! Data access for the workflow services.
//!
//! Repositories are stateless; every method takes the connection to run on so
//! the same code serves the pool and an open transaction.

pub mod customer_repository;
pub mod delivery_route_repository;
pub mod order_repository;
pub mod product_repository;
pub mod request_repository;

pub use customer_repository::{CustomerFilter, CustomerRepository};
pub use delivery_route_repository::DeliveryRouteRepository;
pub use order_repository::OrderRepository;
pub use product_repository::{Decrement, ProductRepository};
pub use request_repository::RequestRepository;
