//! Business workflows. Services hold the shared pool and compose the
//! stateless repositories; handlers only translate HTTP to service calls.

use validator::ValidationError;

// Order lifecycle
pub mod delivery_routes;
pub mod orders;
pub mod stock_ledger;

// Replenishment
pub mod requests;

// Reference data
pub mod catalog;
pub mod customers;
pub mod employees;
pub mod trucks;

// Dashboards
pub mod analytics;
pub mod time_windows;

/// Rejects empty and whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
