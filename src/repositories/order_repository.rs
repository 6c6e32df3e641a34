use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entities::{
    customer::Model as CustomerModel,
    order::{self, Entity as Order, Model as OrderModel},
    order_line_item::{self, Entity as OrderLineItem, Model as LineItemModel},
    product::{Entity as Product, Model as ProductModel},
    status::{DeliveryStatus, OrderStatus},
};

/// Repository for orders and their line items
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderRepository;

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    /// Find an order by ID
    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
    ) -> Result<Option<OrderModel>, DbErr> {
        Order::find_by_id(id).one(conn).await
    }

    pub async fn find_with_customer(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
    ) -> Result<Option<(OrderModel, Option<CustomerModel>)>, DbErr> {
        Order::find_by_id(id)
            .find_also_related(crate::entities::customer::Entity)
            .one(conn)
            .await
    }

    /// Orders matching `condition`, newest first, each with its customer.
    pub async fn list_with_customer(
        &self,
        conn: &impl ConnectionTrait,
        condition: Condition,
    ) -> Result<Vec<(OrderModel, Option<CustomerModel>)>, DbErr> {
        Order::find()
            .filter(condition)
            .order_by_desc(order::Column::CreatedDate)
            .find_also_related(crate::entities::customer::Entity)
            .all(conn)
            .await
    }

    pub async fn list_pending(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<(OrderModel, Option<CustomerModel>)>, DbErr> {
        self.list_with_customer(
            conn,
            Condition::all()
                .add(order::Column::OrderStatus.eq(OrderStatus::Pending))
                .add(order::Column::DeliveryStatus.eq(DeliveryStatus::Pending)),
        )
        .await
    }

    /// Orders whose `column` lies in `[start, end)`.
    pub async fn list_in_range(
        &self,
        conn: &impl ConnectionTrait,
        column: order::Column,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(OrderModel, Option<CustomerModel>)>, DbErr> {
        self.list_with_customer(
            conn,
            Condition::all().add(column.gte(start)).add(column.lt(end)),
        )
        .await
    }

    pub async fn line_items_with_products(
        &self,
        conn: &impl ConnectionTrait,
        order_id: Uuid,
    ) -> Result<Vec<(LineItemModel, Option<ProductModel>)>, DbErr> {
        OrderLineItem::find()
            .filter(order_line_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_line_item::Column::CreatedDate)
            .find_also_related(Product)
            .all(conn)
            .await
    }

    /// Sets both status fields. Returns false when the order is absent.
    pub async fn set_statuses(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
        order_status: OrderStatus,
        delivery_status: DeliveryStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = Order::update_many()
            .col_expr(order::Column::OrderStatus, Expr::value(order_status))
            .col_expr(order::Column::DeliveryStatus, Expr::value(delivery_status))
            .col_expr(order::Column::UpdatedDate, Expr::value(now))
            .filter(order::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Bulk-sets `delivery_status` on every listed order; returns rows touched.
    pub async fn set_delivery_status(
        &self,
        conn: &impl ConnectionTrait,
        ids: &[Uuid],
        delivery_status: DeliveryStatus,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let result = Order::update_many()
            .col_expr(order::Column::DeliveryStatus, Expr::value(delivery_status))
            .col_expr(order::Column::UpdatedDate, Expr::value(now))
            .filter(order::Column::Id.is_in(ids.iter().copied()))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
