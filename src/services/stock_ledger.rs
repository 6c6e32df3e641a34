//! Stock ledger: the only place product stock counts change.
//!
//! Reservations decrement stock with one conditional statement and insert the
//! line item in the same transaction, so concurrent reservations can never push
//! a product below zero. Warehouse adjustments have no lower bound and may
//! leave a negative count.

use chrono::Utc;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::{order_line_item, product};
use crate::errors::ServiceError;
use crate::repositories::{Decrement, ProductRepository};

#[derive(Clone)]
pub struct StockLedger {
    db_pool: Arc<DatabaseConnection>,
    products: ProductRepository,
}

impl StockLedger {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            products: ProductRepository::new(),
        }
    }

    /// Reserves `count` units for `order_id` in its own transaction.
    #[instrument(skip(self), fields(order_id = %order_id, product_id = %product_id))]
    pub async fn reserve(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        count: i32,
    ) -> Result<order_line_item::Model, ServiceError> {
        let txn = self.db_pool.begin().await?;
        match self.reserve_in(&txn, order_id, product_id, count).await {
            Ok(line_item) => {
                txn.commit().await?;
                Ok(line_item)
            }
            Err(err) => {
                txn.rollback().await?;
                Err(err)
            }
        }
    }

    /// Reservation steps on a caller-owned connection or transaction.
    ///
    /// A request for exactly the remaining stock succeeds.
    pub async fn reserve_in(
        &self,
        conn: &impl ConnectionTrait,
        order_id: Uuid,
        product_id: Uuid,
        count: i32,
    ) -> Result<order_line_item::Model, ServiceError> {
        if count <= 0 {
            return Err(ServiceError::ValidationError(
                "count must be greater than 0".to_string(),
            ));
        }

        match self
            .products
            .decrement_if_available(conn, product_id, count)
            .await?
        {
            Decrement::Applied => {}
            Decrement::Missing => return Err(ServiceError::not_found("Product", product_id)),
            Decrement::Insufficient { available } => {
                counter!("flavorwave_stock.insufficient", 1);
                warn!(%product_id, requested = count, available, "insufficient stock");
                return Err(ServiceError::InsufficientStock(format!(
                    "requested {} of product {}, {} available",
                    count, product_id, available
                )));
            }
        }

        let line_item = order_line_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(product_id),
            count: Set(count),
            created_date: Set(Utc::now()),
        }
        .insert(conn)
        .await?;

        counter!("flavorwave_stock.reserved", 1);
        info!(line_item_id = %line_item.id, count, "stock reserved");
        Ok(line_item)
    }

    /// Applies a signed delta without a lower bound.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn adjust(&self, product_id: Uuid, delta: i32) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;
        if !self.products.apply_delta(db, product_id, delta).await? {
            return Err(ServiceError::not_found("Product", product_id));
        }
        let updated = self
            .products
            .find_by_id(db, product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

        counter!("flavorwave_stock.adjusted", 1);
        info!(delta, in_stock_count = updated.in_stock_count, "stock adjusted");
        Ok(updated)
    }

    pub async fn increase(&self, product_id: Uuid, amount: i32) -> Result<product::Model, ServiceError> {
        validate_amount(amount)?;
        self.adjust(product_id, amount).await
    }

    pub async fn decrease(&self, product_id: Uuid, amount: i32) -> Result<product::Model, ServiceError> {
        validate_amount(amount)?;
        self.adjust(product_id, -amount).await
    }
}

fn validate_amount(amount: i32) -> Result<(), ServiceError> {
    if amount <= 0 {
        return Err(ServiceError::ValidationError(
            "amount must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
