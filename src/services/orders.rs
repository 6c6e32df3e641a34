use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    customer, order, order_line_item,
    status::{DeliveryStatus, OrderStatus, PaidStatus},
};
use crate::errors::ServiceError;
use crate::events::{outbox, DomainEvent, NotificationChannel};
use crate::repositories::{CustomerRepository, DeliveryRouteRepository, OrderRepository};
use crate::services::stock_ledger::StockLedger;

/// Request to open a new order for a customer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub expected_date: DateTime<Utc>,
    #[serde(default)]
    pub paid: Option<PaidStatus>,
}

/// Request to reserve stock of one product for an order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttachProductRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub count: i32,
}

/// Order as exposed to clients, joined with its customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub delivery_address: Option<String>,
    /// Line item ids in insertion order.
    pub product_list: Vec<Uuid>,
    pub order_status: OrderStatus,
    pub delivery_status: DeliveryStatus,
    pub paid: PaidStatus,
    pub created_date: DateTime<Utc>,
    pub expected_date: DateTime<Utc>,
    /// Most recent route owning this order.
    pub delivery_route_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub count: i32,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetails {
    pub order: OrderView,
    pub line_items: Vec<LineItemView>,
}

/// `[date 00:00 UTC, date 23:59:59.999 UTC)`.
pub fn utc_day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// `[1st of month 00:00 UTC, last day 23:59:59.999 UTC)`.
pub fn utc_month_range(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let first = date
        .with_day(1)
        .ok_or_else(|| ServiceError::ValidationError(format!("invalid date {}", date)))?;
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .ok_or_else(|| ServiceError::ValidationError(format!("date out of range: {}", date)))?;

    let start = Utc.from_utc_datetime(&first.and_time(chrono::NaiveTime::MIN));
    let end = Utc.from_utc_datetime(&next_first.and_time(chrono::NaiveTime::MIN))
        - Duration::milliseconds(1);
    Ok((start, end))
}

/// Order lifecycle: creation, stock reservation, confirmation and reads.
#[derive(Clone)]
pub struct OrderWorkflow {
    db_pool: Arc<DatabaseConnection>,
    ledger: StockLedger,
    orders: OrderRepository,
    customers: CustomerRepository,
    routes: DeliveryRouteRepository,
}

impl OrderWorkflow {
    pub fn new(db_pool: Arc<DatabaseConnection>, ledger: StockLedger) -> Self {
        Self {
            db_pool,
            ledger,
            orders: OrderRepository::new(),
            customers: CustomerRepository::new(),
            routes: DeliveryRouteRepository::new(),
        }
    }

    /// Opens an order in `pending/pending` with no line items.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderView, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let customer = self
            .customers
            .find_by_id(db, request.customer_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", request.customer_id))?;

        let now = Utc::now();
        let created = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer.id),
            order_status: Set(OrderStatus::Pending),
            delivery_status: Set(DeliveryStatus::Pending),
            paid: Set(request.paid.unwrap_or(PaidStatus::No)),
            created_date: Set(now),
            expected_date: Set(request.expected_date),
            updated_date: Set(now),
        }
        .insert(db)
        .await?;

        counter!("flavorwave_orders.created", 1);
        info!(order_id = %created.id, "order created");

        Ok(OrderView::assemble(created, Some(&customer), Vec::new(), None))
    }

    /// Reserves stock for the order and records the line item atomically.
    #[instrument(skip(self, request), fields(order_id = %order_id, product_id = %request.product_id))]
    pub async fn attach_product(
        &self,
        order_id: Uuid,
        request: AttachProductRequest,
    ) -> Result<order_line_item::Model, ServiceError> {
        request.validate()?;
        let txn = self.db_pool.begin().await?;

        if self.orders.find_by_id(&txn, order_id).await?.is_none() {
            return Err(ServiceError::not_found("Order", order_id));
        }

        let line_item = self
            .ledger
            .reserve_in(&txn, order_id, request.product_id, request.count)
            .await?;

        txn.commit().await?;
        info!(line_item_id = %line_item.id, "product attached to order");
        Ok(line_item)
    }

    /// Moves both status fields to `processing` and queues `NewOrderEvent`.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn confirm_processing(&self, order_id: Uuid) -> Result<OrderView, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let updated = self
            .orders
            .set_statuses(
                &txn,
                order_id,
                OrderStatus::Processing,
                DeliveryStatus::Processing,
                Utc::now(),
            )
            .await?;
        if !updated {
            return Err(ServiceError::not_found("Order", order_id));
        }

        outbox::enqueue(
            &txn,
            &DomainEvent::new(NotificationChannel::NewOrderEvent, order_id),
        )
        .await?;
        txn.commit().await?;

        counter!("flavorwave_orders.confirmed", 1);
        info!("order confirmed for processing");
        self.order_view(order_id).await
    }

    pub async fn pending_orders(&self) -> Result<Vec<OrderView>, ServiceError> {
        let db = &*self.db_pool;
        let rows = self.orders.list_pending(db).await?;
        self.assemble_views(db, rows).await
    }

    pub async fn orders_by_placement_day(&self, date: NaiveDate) -> Result<Vec<OrderView>, ServiceError> {
        let (start, end) = utc_day_range(date);
        self.orders_in_range(order::Column::CreatedDate, start, end).await
    }

    pub async fn orders_by_delivery_day(&self, date: NaiveDate) -> Result<Vec<OrderView>, ServiceError> {
        let (start, end) = utc_day_range(date);
        self.orders_in_range(order::Column::ExpectedDate, start, end).await
    }

    pub async fn orders_by_month(&self, date: NaiveDate) -> Result<Vec<OrderView>, ServiceError> {
        let (start, end) = utc_month_range(date)?;
        self.orders_in_range(order::Column::CreatedDate, start, end).await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_details(&self, order_id: Uuid) -> Result<OrderDetails, ServiceError> {
        let db = &*self.db_pool;
        let order = self.order_view(order_id).await?;

        let line_items = self
            .orders
            .line_items_with_products(db, order_id)
            .await?
            .into_iter()
            .map(|(item, product)| LineItemView {
                id: item.id,
                product_id: item.product_id,
                product_name: product.map(|p| p.name),
                count: item.count,
                created_date: item.created_date,
            })
            .collect();

        Ok(OrderDetails { order, line_items })
    }

    async fn order_view(&self, order_id: Uuid) -> Result<OrderView, ServiceError> {
        let db = &*self.db_pool;
        let row = self
            .orders
            .find_with_customer(db, order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

        self.assemble_views(db, vec![row])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Order", order_id))
    }

    async fn orders_in_range(
        &self,
        column: order::Column,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderView>, ServiceError> {
        let db = &*self.db_pool;
        let rows = self.orders.list_in_range(db, column, start, end).await?;
        self.assemble_views(db, rows).await
    }

    /// Attaches derived product lists and route ids to a batch of orders.
    async fn assemble_views(
        &self,
        conn: &impl ConnectionTrait,
        rows: Vec<(order::Model, Option<customer::Model>)>,
    ) -> Result<Vec<OrderView>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|(o, _)| o.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut product_lists: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let items = order_line_item::Entity::find()
            .filter(order_line_item::Column::OrderId.is_in(ids.iter().copied()))
            .order_by_asc(order_line_item::Column::CreatedDate)
            .all(conn)
            .await?;
        for item in items {
            product_lists.entry(item.order_id).or_default().push(item.id);
        }

        let route_ids = self.routes.routes_of_orders(conn, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|(order, customer)| {
                let id = order.id;
                OrderView::assemble(
                    order,
                    customer.as_ref(),
                    product_lists.remove(&id).unwrap_or_default(),
                    route_ids.get(&id).copied(),
                )
            })
            .collect())
    }
}

impl OrderView {
    fn assemble(
        order: order::Model,
        customer: Option<&customer::Model>,
        product_list: Vec<Uuid>,
        delivery_route_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            customer_name: customer.map(|c| c.name.clone()),
            delivery_address: customer.map(|c| c.delivery_address.clone()),
            product_list,
            order_status: order.order_status,
            delivery_status: order.delivery_status,
            paid: order.paid,
            created_date: order.created_date,
            expected_date: order.expected_date,
            delivery_route_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_day_range_spans_the_calendar_day() {
        let (start, end) = utc_day_range(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(start.to_rfc3339(), "2024-03-09T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1) - Duration::milliseconds(1));
    }

    #[test]
    fn utc_month_range_handles_december_and_leap_february() {
        let (start, end) = utc_month_range(NaiveDate::from_ymd_opt(2023, 12, 17).unwrap()).unwrap();
        assert_eq!(start.to_rfc3339(), "2023-12-01T00:00:00+00:00");
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        let (_, end) = utc_month_range(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()).unwrap();
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
