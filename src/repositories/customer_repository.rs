use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::customer::{self, Entity as Customer, Model as CustomerModel};

/// Optional customer filters; unset fields do not constrain the search.
#[derive(Debug, Default, Clone)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub delivery_address: Option<String>,
    pub role: Option<String>,
}

impl CustomerFilter {
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.phone, &self.delivery_address, &self.role]
            .iter()
            .all(|f| f.as_deref().map(str::trim).unwrap_or("").is_empty())
    }

    fn to_condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(name) = non_blank(&self.name) {
            condition = condition.add(contains_ci(customer::Column::Name, name));
        }
        if let Some(address) = non_blank(&self.delivery_address) {
            condition = condition.add(contains_ci(customer::Column::DeliveryAddress, address));
        }
        if let Some(phone) = non_blank(&self.phone) {
            condition = condition.add(customer::Column::Phone.eq(phone));
        }
        if let Some(role) = non_blank(&self.role) {
            condition = condition.add(customer::Column::Role.eq(role));
        }
        condition
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

const LIKE_ESCAPE: char = '!';

/// `LOWER(column) LIKE %needle%`, portable across Postgres and SQLite.
/// Wildcards in `needle` match literally.
fn contains_ci(column: customer::Column, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for customers
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: Uuid,
    ) -> Result<Option<CustomerModel>, DbErr> {
        Customer::find_by_id(id).one(conn).await
    }

    pub async fn search(
        &self,
        conn: &impl ConnectionTrait,
        filter: &CustomerFilter,
        limit: u64,
    ) -> Result<Vec<CustomerModel>, DbErr> {
        Customer::find()
            .filter(filter.to_condition())
            .order_by_desc(customer::Column::CreatedDate)
            .limit(limit)
            .all(conn)
            .await
    }

    pub async fn latest(
        &self,
        conn: &impl ConnectionTrait,
        limit: u64,
    ) -> Result<Vec<CustomerModel>, DbErr> {
        Customer::find()
            .order_by_desc(customer::Column::CreatedDate)
            .limit(limit)
            .all(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_count_as_empty() {
        let filter = CustomerFilter {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(filter.is_empty());

        let filter = CustomerFilter {
            role: Some("retail".into()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");
        assert_eq!(escape_like("plain"), "plain");
    }
}
