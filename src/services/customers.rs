use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::entities::customer;
use crate::errors::ServiceError;
use crate::repositories::{CustomerFilter, CustomerRepository};

const CUSTOMER_LIST_LIMIT: u64 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(custom = "not_blank")]
    pub phone: String,
    #[validate(custom = "not_blank")]
    pub delivery_address: String,
    #[validate(custom = "not_blank")]
    pub role: String,
}

/// Service for the sales department's customer book
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DatabaseConnection>,
    customers: CustomerRepository,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            customers: CustomerRepository::new(),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let created = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            phone: Set(request.phone.trim().to_string()),
            delivery_address: Set(request.delivery_address.trim().to_string()),
            role: Set(request.role.trim().to_string()),
            created_date: Set(now),
            updated_date: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(customer_id = %created.id, "customer created");
        Ok(created)
    }

    /// Newest matches first. At least one filter must be set.
    pub async fn search_customers(
        &self,
        filter: CustomerFilter,
    ) -> Result<Vec<customer::Model>, ServiceError> {
        if filter.is_empty() {
            return Err(ServiceError::ValidationError(
                "at least one search filter is required".to_string(),
            ));
        }
        Ok(self
            .customers
            .search(&*self.db_pool, &filter, CUSTOMER_LIST_LIMIT)
            .await?)
    }

    pub async fn latest_customers(&self) -> Result<Vec<customer::Model>, ServiceError> {
        Ok(self
            .customers
            .latest(&*self.db_pool, CUSTOMER_LIST_LIMIT)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        let request = CreateCustomerRequest {
            name: "Ana".into(),
            phone: " ".into(),
            delivery_address: "12 Mill Road".into(),
            role: "retail".into(),
        };
        assert!(request.validate().is_err());
    }
}
