use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{
    delivery_route::{self, Entity as DeliveryRoute, Model as RouteModel},
    delivery_route_order::{self, Entity as DeliveryRouteOrder},
    status::RouteStatus,
};

/// Repository for delivery routes and the orders they own
#[derive(Debug, Default, Clone, Copy)]
pub struct DeliveryRouteRepository;

impl DeliveryRouteRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
    ) -> Result<Option<RouteModel>, DbErr> {
        DeliveryRoute::find_by_id(id).one(conn).await
    }

    /// Inserts the route row followed by one link row per order, keeping list order.
    pub async fn insert_with_orders(
        &self,
        conn: &impl ConnectionTrait,
        route: delivery_route::ActiveModel,
        order_ids: &[Uuid],
    ) -> Result<RouteModel, DbErr> {
        let route = route.insert(conn).await?;

        let links = order_ids
            .iter()
            .enumerate()
            .map(|(position, order_id)| delivery_route_order::ActiveModel {
                route_id: Set(route.id),
                order_id: Set(*order_id),
                position: Set(position as i32),
            });
        DeliveryRouteOrder::insert_many(links).exec(conn).await?;

        Ok(route)
    }

    /// Order ids owned by a route, in submitted order.
    pub async fn order_ids(
        &self,
        conn: &impl ConnectionTrait,
        route_id: Uuid,
    ) -> Result<Vec<Uuid>, DbErr> {
        let links = DeliveryRouteOrder::find()
            .filter(delivery_route_order::Column::RouteId.eq(route_id))
            .order_by_asc(delivery_route_order::Column::Position)
            .all(conn)
            .await?;
        Ok(links.into_iter().map(|l| l.order_id).collect())
    }

    /// Most recently created route owning the order, if any.
    pub async fn route_of_order(
        &self,
        conn: &impl ConnectionTrait,
        order_id: Uuid,
    ) -> Result<Option<RouteModel>, DbErr> {
        DeliveryRoute::find()
            .inner_join(DeliveryRouteOrder)
            .filter(delivery_route_order::Column::OrderId.eq(order_id))
            .order_by_desc(delivery_route::Column::CreatedDate)
            .one(conn)
            .await
    }

    /// Batch form of [`Self::route_of_order`]: order id to owning route id.
    pub async fn routes_of_orders(
        &self,
        conn: &impl ConnectionTrait,
        order_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Uuid>, DbErr> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = DeliveryRouteOrder::find()
            .filter(delivery_route_order::Column::OrderId.is_in(order_ids.iter().copied()))
            .find_also_related(DeliveryRoute)
            .all(conn)
            .await?;

        let mut latest: HashMap<Uuid, RouteModel> = HashMap::new();
        for (link, route) in links {
            let Some(route) = route else { continue };
            let newer = latest
                .get(&link.order_id)
                .map(|current| route.created_date > current.created_date)
                .unwrap_or(true);
            if newer {
                latest.insert(link.order_id, route);
            }
        }

        Ok(latest
            .into_iter()
            .map(|(order_id, route)| (order_id, route.id))
            .collect())
    }

    pub async fn list_ongoing(
        &self,
        conn: &impl ConnectionTrait,
        limit: u64,
    ) -> Result<Vec<RouteModel>, DbErr> {
        DeliveryRoute::find()
            .filter(delivery_route::Column::Status.eq(RouteStatus::Ongoing))
            .order_by_desc(delivery_route::Column::DepartureDate)
            .limit(limit)
            .all(conn)
            .await
    }
}
