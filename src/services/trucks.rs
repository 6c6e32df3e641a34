use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::entities::truck;
use crate::errors::ServiceError;

const TRUCK_LIST_LIMIT: u64 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTruckRequest {
    #[validate(custom = "not_blank")]
    pub truck_id_card: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[validate(custom = "not_blank")]
    pub driver: String,
}

#[derive(Clone)]
pub struct TruckService {
    db_pool: Arc<DatabaseConnection>,
}

impl TruckService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(truck_id_card = %request.truck_id_card))]
    pub async fn create_truck(
        &self,
        request: CreateTruckRequest,
    ) -> Result<truck::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let created = truck::ActiveModel {
            id: Set(Uuid::new_v4()),
            truck_id_card: Set(request.truck_id_card.trim().to_string()),
            capacity: Set(request.capacity),
            driver: Set(request.driver.trim().to_string()),
            created_date: Set(now),
            updated_date: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(truck_id = %created.id, "truck registered");
        Ok(created)
    }

    /// Largest capacity first.
    pub async fn list_trucks(&self) -> Result<Vec<truck::Model>, ServiceError> {
        Ok(truck::Entity::find()
            .order_by_desc(truck::Column::Capacity)
            .limit(TRUCK_LIST_LIMIT)
            .all(&*self.db_pool)
            .await?)
    }
}
