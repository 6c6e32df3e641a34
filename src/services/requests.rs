//! Replenishment requests: one two-stage approval workflow shared by stock
//! requests (subject: product) and material requests (subject: raw material).

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    product, raw_material, replenishment_request,
    status::{AdminStatus, RequestKind, RequestStatus},
};
use crate::errors::ServiceError;
use crate::events::{outbox, DomainEvent, NotificationChannel};
use crate::repositories::RequestRepository;
use crate::services::time_windows::day_to_date_bounds;

const REQUEST_LIST_LIMIT: u64 = 50;

/// What distinguishes one request kind from the other.
#[async_trait]
pub trait RequestKindPolicy: Send + Sync + 'static {
    const KIND: RequestKind;
    /// Metric label and log name.
    const LABEL: &'static str;
    /// Entity name used in not-found messages for the subject.
    const SUBJECT: &'static str;
    const CHANNEL: NotificationChannel;
    const REQUIRES_BUDGET: bool;
    const INITIAL_STATUS: RequestStatus;
    const INITIAL_ADMIN_STATUS: Option<AdminStatus>;

    /// Column and value written by the approval stage.
    fn approval() -> (replenishment_request::Column, SimpleExpr);

    /// Rows the approval stage may still touch. Statuses only move forward.
    fn approval_guard() -> Condition {
        Condition::all()
    }

    /// Names of the subjects among `ids` that exist.
    async fn subject_names<C>(conn: &C, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DbErr>
    where
        C: ConnectionTrait;
}

/// Finished-product replenishment, approved by an admin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockRequests;

/// Raw-material purchase with a budget, raised by the factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialRequests;

#[async_trait]
impl RequestKindPolicy for StockRequests {
    const KIND: RequestKind = RequestKind::Stock;
    const LABEL: &'static str = "stock";
    const SUBJECT: &'static str = "Product";
    const CHANNEL: NotificationChannel = NotificationChannel::NewStockRequestEvent;
    const REQUIRES_BUDGET: bool = false;
    const INITIAL_STATUS: RequestStatus = RequestStatus::Processing;
    const INITIAL_ADMIN_STATUS: Option<AdminStatus> = Some(AdminStatus::Processing);

    fn approval() -> (replenishment_request::Column, SimpleExpr) {
        (
            replenishment_request::Column::AdminStatus,
            Expr::value(AdminStatus::Approved),
        )
    }

    async fn subject_names<C>(conn: &C, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|p| (p.id, p.name)).collect())
    }
}

#[async_trait]
impl RequestKindPolicy for MaterialRequests {
    const KIND: RequestKind = RequestKind::Material;
    const LABEL: &'static str = "material";
    const SUBJECT: &'static str = "Raw material";
    const CHANNEL: NotificationChannel = NotificationChannel::NewMaterialRequestEvent;
    const REQUIRES_BUDGET: bool = true;
    const INITIAL_STATUS: RequestStatus = RequestStatus::Pending;
    const INITIAL_ADMIN_STATUS: Option<AdminStatus> = None;

    fn approval() -> (replenishment_request::Column, SimpleExpr) {
        (
            replenishment_request::Column::Status,
            Expr::value(RequestStatus::Approved),
        )
    }

    fn approval_guard() -> Condition {
        Condition::all().add(replenishment_request::Column::Status.ne(RequestStatus::Processed))
    }

    async fn subject_names<C>(conn: &C, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = raw_material::Entity::find()
            .filter(raw_material::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|m| (m.id, m.name)).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitRequest {
    /// Product id for stock requests, raw material id for material requests.
    #[serde(alias = "product_id", alias = "raw_material_id")]
    pub subject_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Required, and positive, for material requests. Ignored for stock requests.
    #[schema(value_type = Option<String>, example = "1250.00")]
    pub budget: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApproveRequests {
    #[validate(length(min = 1))]
    pub request_ids: Vec<Uuid>,
}

/// Outcome of a bulk approval; unknown ids are reported, not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkApproval {
    pub approved: Vec<Uuid>,
    pub not_found: Vec<Uuid>,
}

/// A request together with the name of the product or material it concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: replenishment_request::Model,
    pub subject_name: Option<String>,
}

pub struct RequestWorkflow<K: RequestKindPolicy> {
    db_pool: Arc<DatabaseConnection>,
    requests: RequestRepository,
    kind: PhantomData<K>,
}

impl<K: RequestKindPolicy> Clone for RequestWorkflow<K> {
    fn clone(&self) -> Self {
        Self {
            db_pool: self.db_pool.clone(),
            requests: self.requests,
            kind: PhantomData,
        }
    }
}

pub type StockRequestWorkflow = RequestWorkflow<StockRequests>;
pub type MaterialRequestWorkflow = RequestWorkflow<MaterialRequests>;

impl<K: RequestKindPolicy> RequestWorkflow<K> {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            requests: RequestRepository::new(),
            kind: PhantomData,
        }
    }

    fn budget_for(budget: Option<Decimal>) -> Result<Option<Decimal>, ServiceError> {
        if !K::REQUIRES_BUDGET {
            return Ok(None);
        }
        match budget {
            Some(b) if b > Decimal::ZERO => Ok(Some(b)),
            Some(_) => Err(ServiceError::ValidationError(
                "budget must be greater than 0".to_string(),
            )),
            None => Err(ServiceError::ValidationError(
                "budget is required".to_string(),
            )),
        }
    }

    /// Records a new request for an existing subject and queues its notification.
    #[instrument(skip(self, request), fields(kind = K::LABEL, subject_id = %request.subject_id))]
    pub async fn submit(
        &self,
        request: SubmitRequest,
    ) -> Result<replenishment_request::Model, ServiceError> {
        request.validate()?;
        let budget = Self::budget_for(request.budget)?;

        let txn = self.db_pool.begin().await?;
        if K::subject_names(&txn, &[request.subject_id])
            .await?
            .is_empty()
        {
            return Err(ServiceError::not_found(K::SUBJECT, request.subject_id));
        }

        let now = Utc::now();
        let created = replenishment_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(K::KIND),
            subject_id: Set(request.subject_id),
            quantity: Set(request.quantity),
            budget: Set(budget),
            status: Set(K::INITIAL_STATUS),
            admin_status: Set(K::INITIAL_ADMIN_STATUS),
            created_date: Set(now),
            updated_date: Set(now),
        }
        .insert(&txn)
        .await?;

        outbox::enqueue(&txn, &DomainEvent::new(K::CHANNEL, created.id)).await?;
        txn.commit().await?;

        counter!("flavorwave_requests.submitted", 1, "kind" => K::LABEL);
        info!(request_id = %created.id, quantity = created.quantity, "request submitted");
        Ok(created)
    }

    /// Approves every known id; re-approving, or approving a processed request,
    /// changes nothing and still reports the id.
    #[instrument(skip(self, request), fields(kind = K::LABEL, ids = request.request_ids.len()))]
    pub async fn approve(&self, request: ApproveRequests) -> Result<BulkApproval, ServiceError> {
        request.validate()?;

        let mut ids = Vec::with_capacity(request.request_ids.len());
        for id in request.request_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let txn = self.db_pool.begin().await?;
        let existing = self.requests.existing_ids(&txn, K::KIND, &ids).await?;
        if !existing.is_empty() {
            let (column, value) = K::approval();
            self.requests
                .set_column(
                    &txn,
                    K::KIND,
                    &existing,
                    column,
                    value,
                    K::approval_guard(),
                    Utc::now(),
                )
                .await?;
        }
        txn.commit().await?;

        let (approved, not_found): (Vec<Uuid>, Vec<Uuid>) =
            ids.into_iter().partition(|id| existing.contains(id));

        counter!("flavorwave_requests.approved", approved.len() as u64, "kind" => K::LABEL);
        info!(
            approved = approved.len(),
            not_found = not_found.len(),
            "requests approved"
        );
        Ok(BulkApproval {
            approved,
            not_found,
        })
    }

    #[instrument(skip(self), fields(kind = K::LABEL, request_id = %id))]
    pub async fn mark_processed(
        &self,
        id: Uuid,
    ) -> Result<replenishment_request::Model, ServiceError> {
        let db = &*self.db_pool;
        let touched = self
            .requests
            .set_status(db, K::KIND, id, RequestStatus::Processed, Utc::now())
            .await?;
        if !touched {
            return Err(ServiceError::not_found(Self::entity_name(), id));
        }

        let updated = self
            .requests
            .find_by_id(db, K::KIND, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Self::entity_name(), id))?;
        info!("request processed");
        Ok(updated)
    }

    fn entity_name() -> &'static str {
        match K::KIND {
            RequestKind::Stock => "Stock request",
            RequestKind::Material => "Material request",
        }
    }

    /// The most recent requests of this kind.
    pub async fn latest(&self) -> Result<Vec<RequestView>, ServiceError> {
        let rows = self
            .requests
            .latest(&*self.db_pool, K::KIND, REQUEST_LIST_LIMIT)
            .await?;
        self.with_subject_names(rows).await
    }

    /// Requests created on `date` in local time, up to now when `date` is today.
    pub async fn created_on_day(&self, date: NaiveDate) -> Result<Vec<RequestView>, ServiceError> {
        let range = day_to_date_bounds(date, &Local::now())?;
        let rows = self
            .requests
            .created_between(&*self.db_pool, K::KIND, range.start, range.end)
            .await?;
        self.with_subject_names(rows).await
    }

    async fn with_subject_names(
        &self,
        rows: Vec<replenishment_request::Model>,
    ) -> Result<Vec<RequestView>, ServiceError> {
        let mut subject_ids: Vec<Uuid> = rows.iter().map(|r| r.subject_id).collect();
        subject_ids.sort_unstable();
        subject_ids.dedup();
        let names = K::subject_names(&*self.db_pool, &subject_ids).await?;

        Ok(rows
            .into_iter()
            .map(|request| RequestView {
                subject_name: names.get(&request.subject_id).cloned(),
                request,
            })
            .collect())
    }
}
