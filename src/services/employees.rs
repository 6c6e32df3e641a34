use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::entities::{employee, status::Department};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeeRequest {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub phone: String,
    #[validate(custom = "not_blank")]
    pub role: String,
    pub department: Department,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Employee as exposed over the API; the password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub department: Department,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl From<employee::Model> for EmployeeView {
    fn from(model: employee::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            department: model.department,
            created_date: model.created_date,
            updated_date: model.updated_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeePage {
    pub items: Vec<EmployeeView>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Clone)]
pub struct EmployeeService {
    db_pool: Arc<DatabaseConnection>,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(department = ?request.department))]
    pub async fn create_employee(
        &self,
        request: CreateEmployeeRequest,
    ) -> Result<EmployeeView, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let email = request.email.trim().to_lowercase();

        let existing = employee::Entity::find()
            .filter(employee::Column::Email.eq(email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "employee with email {} already exists",
                email
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let created = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            email: Set(email.clone()),
            phone: Set(request.phone.trim().to_string()),
            role: Set(request.role.trim().to_string()),
            department: Set(request.department),
            password_hash: Set(password_hash),
            created_date: Set(now),
            updated_date: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| {
            ServiceError::on_unique_violation(e, || {
                format!("employee with email {} already exists", email)
            })
        })?;

        info!(employee_id = %created.id, "employee created");
        Ok(created.into())
    }

    /// Newest first; `page` is 1-based.
    pub async fn list_employees(&self, page: u64, limit: u64) -> Result<EmployeePage, ServiceError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let paginator = employee::Entity::find()
            .order_by_desc(employee::Column::CreatedDate)
            .paginate(&*self.db_pool, limit);

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page - 1)
            .await?
            .into_iter()
            .map(EmployeeView::from)
            .collect();

        Ok(EmployeePage {
            items,
            page,
            limit,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_are_salted() {
        let first = hash_password("correct horse").unwrap();
        let second = hash_password("correct horse").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));
        assert!(verify_password("correct horse", &first).unwrap());
        assert!(!verify_password("wrong horse", &first).unwrap());
    }

    #[test]
    fn view_drops_password_hash() {
        let now = Utc::now();
        let model = employee::Model {
            id: Uuid::new_v4(),
            name: "Lin".into(),
            email: "lin@flavorwave.test".into(),
            phone: "555-0101".into(),
            role: "manager".into(),
            department: Department::Admin,
            password_hash: "$argon2id$secret".into(),
            created_date: now,
            updated_date: now,
        };
        let json = serde_json::to_value(EmployeeView::from(model)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["department"], "admin");
    }

    #[test]
    fn short_passwords_are_rejected() {
        let request = CreateEmployeeRequest {
            name: "Lin".into(),
            email: "lin@flavorwave.test".into(),
            phone: "555-0101".into(),
            role: "manager".into(),
            department: Department::Sales,
            password: "short".into(),
        };
        assert!(request.validate().is_err());
    }
}
