//! Dashboard aggregations over orders, routes and customers.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use sea_orm::{
    ActiveEnum, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};
use tracing::instrument;
use utoipa::ToSchema;

use crate::entities::{customer, delivery_route, order};
use crate::errors::ServiceError;
use crate::services::time_windows::{month_to_date_bounds, window_bounds, TimeRange, TimeWindow};

/// Order field used to group the analytics rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StatusDimension {
    #[strum(to_string = "order_status", serialize = "order")]
    OrderStatus,
    #[strum(to_string = "delivery_status", serialize = "delivery")]
    DeliveryStatus,
}

impl StatusDimension {
    fn key_of(&self, order: &order::Model) -> String {
        match self {
            StatusDimension::OrderStatus => order.order_status.to_value(),
            StatusDimension::DeliveryStatus => order.delivery_status.to_value(),
        }
    }
}

/// One status bucket. Serialized with the dimension name as the key field,
/// e.g. `{"order_status": "pending", "count": 2, "created_dates": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGroup {
    pub dimension: StatusDimension,
    pub key: String,
    pub count: u64,
    pub created_dates: Vec<DateTime<Utc>>,
}

impl Serialize for StatusGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(self.dimension.as_ref(), &self.key)?;
        map.serialize_entry("count", &self.count)?;
        map.serialize_entry("created_dates", &self.created_dates)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverviewCount {
    pub name: String,
    pub count: u64,
}

/// Groups orders by `dimension`: count plus distinct ascending creation times, keys sorted.
pub fn group_by_status(dimension: StatusDimension, orders: &[order::Model]) -> Vec<StatusGroup> {
    let mut buckets: BTreeMap<String, (u64, BTreeSet<DateTime<Utc>>)> = BTreeMap::new();
    for order in orders {
        let entry = buckets.entry(dimension.key_of(order)).or_default();
        entry.0 += 1;
        entry.1.insert(order.created_date);
    }

    buckets
        .into_iter()
        .map(|(key, (count, dates))| StatusGroup {
            dimension,
            key,
            count,
            created_dates: dates.into_iter().collect(),
        })
        .collect()
}

fn created_in<E, C>(select: Select<E>, column: C, range: &TimeRange) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    if range.end_inclusive {
        select.filter(column.between(range.start, range.end))
    } else {
        select
            .filter(column.gte(range.start))
            .filter(column.lt(range.end))
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    pub async fn count_by_status_in_window(
        &self,
        dimension: StatusDimension,
        window: TimeWindow,
    ) -> Result<Vec<StatusGroup>, ServiceError> {
        self.count_by_status_in_window_at(dimension, window, &Local::now())
            .await
    }

    /// Same as [`Self::count_by_status_in_window`] with an explicit clock and zone.
    #[instrument(skip(self, now), fields(dimension = %dimension, window = %window))]
    pub async fn count_by_status_in_window_at<Tz: TimeZone>(
        &self,
        dimension: StatusDimension,
        window: TimeWindow,
        now: &DateTime<Tz>,
    ) -> Result<Vec<StatusGroup>, ServiceError> {
        let range = window_bounds(window, now)?;
        let orders = created_in(order::Entity::find(), order::Column::CreatedDate, &range)
            .order_by_asc(order::Column::CreatedDate)
            .all(&*self.db_pool)
            .await?;
        Ok(group_by_status(dimension, &orders))
    }

    pub async fn monthly_overall_counts(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<OverviewCount>, ServiceError> {
        self.monthly_overall_counts_at(date, &Local::now()).await
    }

    /// Orders, routes and customers created from the 1st of `date`'s month
    /// up to now (if `date` is today) or the end of that month.
    #[instrument(skip(self, now), fields(date = %date))]
    pub async fn monthly_overall_counts_at<Tz: TimeZone>(
        &self,
        date: NaiveDate,
        now: &DateTime<Tz>,
    ) -> Result<Vec<OverviewCount>, ServiceError> {
        let range = month_to_date_bounds(date, now)?;
        let db = &*self.db_pool;

        let (orders, routes, customers) = futures::try_join!(
            created_in(order::Entity::find(), order::Column::CreatedDate, &range).count(db),
            created_in(
                delivery_route::Entity::find(),
                delivery_route::Column::CreatedDate,
                &range
            )
            .count(db),
            created_in(customer::Entity::find(), customer::Column::CreatedDate, &range).count(db),
        )?;

        Ok(vec![
            OverviewCount {
                name: "orders".to_string(),
                count: orders,
            },
            OverviewCount {
                name: "deliveringTrucks".to_string(),
                count: routes,
            },
            OverviewCount {
                name: "customers".to_string(),
                count: customers,
            },
        ])
    }
}
