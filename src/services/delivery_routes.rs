use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::{
    delivery_route, order,
    status::{DeliveryStatus, RouteStatus},
    truck,
};
use crate::errors::ServiceError;
use crate::events::{outbox, DomainEvent, NotificationChannel};
use crate::repositories::{DeliveryRouteRepository, OrderRepository};

const ROUTE_LIST_LIMIT: u64 = 50;

/// Request to dispatch a truck with a batch of orders.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_route_window"))]
pub struct AssignRouteRequest {
    pub truck_id: Uuid,
    pub departure_date: DateTime<Utc>,
    pub completed_date: DateTime<Utc>,
    #[validate(length(min = 1))]
    pub order_ids: Vec<Uuid>,
}

fn validate_route_window(request: &AssignRouteRequest) -> Result<(), ValidationError> {
    if request.completed_date < request.departure_date {
        let mut err = ValidationError::new("completed_before_departure");
        err.message = Some("completed_date must not be before departure_date".into());
        return Err(err);
    }
    Ok(())
}

/// A route with the ids of the orders it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RouteView {
    #[serde(flatten)]
    pub route: delivery_route::Model,
    pub order_ids: Vec<Uuid>,
}

/// A route with its full order documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RouteDetails {
    pub route: delivery_route::Model,
    pub orders: Vec<order::Model>,
}

#[derive(Clone)]
pub struct DeliveryRouteService {
    db_pool: Arc<DatabaseConnection>,
    routes: DeliveryRouteRepository,
    orders: OrderRepository,
}

impl DeliveryRouteService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            routes: DeliveryRouteRepository::new(),
            orders: OrderRepository::new(),
        }
    }

    /// Creates an `ongoing` route owning `order_ids` and marks those orders `delivering`.
    ///
    /// Orders are not checked for existence or prior state; ids the store does
    /// not hold are kept on the route and simply match no order row.
    #[instrument(skip(self, request), fields(truck_id = %request.truck_id, orders = request.order_ids.len()))]
    pub async fn assign_delivery_route(
        &self,
        request: AssignRouteRequest,
    ) -> Result<RouteView, ServiceError> {
        request.validate()?;
        let txn = self.db_pool.begin().await?;

        let truck = truck::Entity::find_by_id(request.truck_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Truck", request.truck_id))?;

        let mut order_ids = Vec::with_capacity(request.order_ids.len());
        for id in request.order_ids {
            if !order_ids.contains(&id) {
                order_ids.push(id);
            }
        }

        let now = Utc::now();
        let route = self
            .routes
            .insert_with_orders(
                &txn,
                delivery_route::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    truck_id: Set(truck.id),
                    departure_date: Set(request.departure_date),
                    completed_date: Set(request.completed_date),
                    status: Set(RouteStatus::Ongoing),
                    created_date: Set(now),
                },
                &order_ids,
            )
            .await?;

        let touched = self
            .orders
            .set_delivery_status(&txn, &order_ids, DeliveryStatus::Delivering, now)
            .await?;
        if touched < order_ids.len() as u64 {
            warn!(
                route_id = %route.id,
                requested = order_ids.len(),
                touched,
                "route lists orders that do not exist"
            );
        }

        outbox::enqueue(
            &txn,
            &DomainEvent::new(NotificationChannel::NewDeliveryRouteEvent, route.id),
        )
        .await?;
        txn.commit().await?;

        counter!("flavorwave_routes.created", 1);
        info!(route_id = %route.id, "delivery route assigned");
        Ok(RouteView { route, order_ids })
    }

    pub async fn ongoing_routes(&self) -> Result<Vec<RouteView>, ServiceError> {
        let db = &*self.db_pool;
        let routes = self.routes.list_ongoing(db, ROUTE_LIST_LIMIT).await?;

        let mut views = Vec::with_capacity(routes.len());
        for route in routes {
            let order_ids = self.routes.order_ids(db, route.id).await?;
            views.push(RouteView { route, order_ids });
        }
        Ok(views)
    }

    #[instrument(skip(self), fields(route_id = %route_id))]
    pub async fn route_details(&self, route_id: Uuid) -> Result<RouteDetails, ServiceError> {
        let db = &*self.db_pool;
        let route = self
            .routes
            .find_by_id(db, route_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Delivery route", route_id))?;

        let order_ids = self.routes.order_ids(db, route_id).await?;
        let mut found = order::Entity::find()
            .filter(order::Column::Id.is_in(order_ids.iter().copied()))
            .all(db)
            .await?;
        // keep the submitted order
        found.sort_by_key(|o| order_ids.iter().position(|id| *id == o.id));

        Ok(RouteDetails {
            route,
            orders: found,
        })
    }

    /// Route currently owning the order; `None` if it was never routed.
    pub async fn route_of_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<delivery_route::Model>, ServiceError> {
        let db = &*self.db_pool;
        if self.orders.find_by_id(db, order_id).await?.is_none() {
            return Err(ServiceError::not_found("Order", order_id));
        }
        Ok(self.routes.route_of_order(db, order_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn route_window_and_order_list_are_validated() {
        let now = Utc::now();
        let mut request = AssignRouteRequest {
            truck_id: Uuid::new_v4(),
            departure_date: now,
            completed_date: now - Duration::hours(1),
            order_ids: vec![Uuid::new_v4()],
        };
        assert!(request.validate().is_err());

        request.completed_date = now;
        assert!(request.validate().is_ok());

        request.order_ids.clear();
        assert!(request.validate().is_err());
    }
}
