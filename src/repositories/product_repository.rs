use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::product::{self, Entity as Product, Model as ProductModel};

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    Applied,
    Insufficient { available: i32 },
    Missing,
}

/// Repository for product stock rows
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
    ) -> Result<Option<ProductModel>, DbErr> {
        Product::find_by_id(id).one(conn).await
    }

    pub async fn find_by_name(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<Option<ProductModel>, DbErr> {
        Product::find()
            .filter(product::Column::Name.eq(name))
            .one(conn)
            .await
    }

    /// Decrements stock only while enough remains, as a single statement.
    pub async fn decrement_if_available(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
        count: i32,
    ) -> Result<Decrement, DbErr> {
        let result = Product::update_many()
            .col_expr(
                product::Column::InStockCount,
                Expr::col(product::Column::InStockCount).sub(count),
            )
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::InStockCount.gte(count))
            .exec(conn)
            .await?;

        if result.rows_affected > 0 {
            return Ok(Decrement::Applied);
        }

        Ok(match self.find_by_id(conn, id).await? {
            Some(p) => Decrement::Insufficient {
                available: p.in_stock_count,
            },
            None => Decrement::Missing,
        })
    }

    /// Applies a signed delta with no lower bound. Returns false when the product is absent.
    pub async fn apply_delta(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
        delta: i32,
    ) -> Result<bool, DbErr> {
        let result = Product::update_many()
            .col_expr(
                product::Column::InStockCount,
                Expr::col(product::Column::InStockCount).add(delta),
            )
            .filter(product::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Lowest stock first.
    pub async fn lowest_stock(
        &self,
        conn: &impl ConnectionTrait,
        limit: u64,
    ) -> Result<Vec<ProductModel>, DbErr> {
        Product::find()
            .order_by_asc(product::Column::InStockCount)
            .order_by_asc(product::Column::Name)
            .limit(limit)
            .all(conn)
            .await
    }
}
