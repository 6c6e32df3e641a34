use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::{
    replenishment_request::{self, Entity as ReplenishmentRequest, Model as RequestModel},
    status::{RequestKind, RequestStatus},
};

/// Repository for stock and material requests, always scoped by kind
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestRepository;

impl RequestRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Option<RequestModel>, DbErr> {
        ReplenishmentRequest::find_by_id(id)
            .filter(replenishment_request::Column::Kind.eq(kind))
            .one(conn)
            .await
    }

    /// Ids among `ids` that exist for `kind`.
    pub async fn existing_ids(
        &self,
        conn: &impl ConnectionTrait,
        kind: RequestKind,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DbErr> {
        let rows = ReplenishmentRequest::find()
            .filter(replenishment_request::Column::Kind.eq(kind))
            .filter(replenishment_request::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    /// Writes `column = value` on the listed requests of `kind` that also match `guard`.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_column(
        &self,
        conn: &impl ConnectionTrait,
        kind: RequestKind,
        ids: &[Uuid],
        column: replenishment_request::Column,
        value: SimpleExpr,
        guard: Condition,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let result = ReplenishmentRequest::update_many()
            .col_expr(column, value)
            .col_expr(replenishment_request::Column::UpdatedDate, Expr::value(now))
            .filter(replenishment_request::Column::Kind.eq(kind))
            .filter(replenishment_request::Column::Id.is_in(ids.iter().copied()))
            .filter(guard)
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn set_status(
        &self,
        conn: &impl ConnectionTrait,
        kind: RequestKind,
        id: Uuid,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let touched = self
            .set_column(
                conn,
                kind,
                &[id],
                replenishment_request::Column::Status,
                Expr::value(status),
                Condition::all(),
                now,
            )
            .await?;
        Ok(touched > 0)
    }

    pub async fn latest(
        &self,
        conn: &impl ConnectionTrait,
        kind: RequestKind,
        limit: u64,
    ) -> Result<Vec<RequestModel>, DbErr> {
        ReplenishmentRequest::find()
            .filter(replenishment_request::Column::Kind.eq(kind))
            .order_by_desc(replenishment_request::Column::CreatedDate)
            .limit(limit)
            .all(conn)
            .await
    }

    /// Requests of `kind` created in the inclusive range `[start, end]`.
    pub async fn created_between(
        &self,
        conn: &impl ConnectionTrait,
        kind: RequestKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RequestModel>, DbErr> {
        ReplenishmentRequest::find()
            .filter(replenishment_request::Column::Kind.eq(kind))
            .filter(replenishment_request::Column::CreatedDate.between(start, end))
            .order_by_asc(replenishment_request::Column::CreatedDate)
            .all(conn)
            .await
    }
}
