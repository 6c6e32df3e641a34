//! Products, raw materials and the recipes that link them.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::entities::{order_line_item, product, raw_material, recipe, required_material};
use crate::errors::ServiceError;
use crate::repositories::ProductRepository;

const STOCK_LIST_LIMIT: u64 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(range(min = 0))]
    pub in_stock_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRawMaterialRequest {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(range(min = 0))]
    pub in_stock_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddRequiredMaterialRequest {
    pub raw_material_id: Uuid,
    #[validate(range(min = 1))]
    pub required_quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequiredMaterialView {
    pub id: Uuid,
    pub raw_material_id: Uuid,
    pub material_name: Option<String>,
    pub required_quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetails {
    pub recipe: recipe::Model,
    pub required_materials: Vec<RequiredMaterialView>,
}

#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DatabaseConnection>,
    products: ProductRepository,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            products: ProductRepository::new(),
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let name = request.name.trim().to_string();

        if self.products.find_by_name(db, &name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "product {} already exists",
                name
            )));
        }

        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            in_stock_count: Set(request.in_stock_count),
            created_date: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(|e| {
            ServiceError::on_unique_violation(e, || format!("product {} already exists", name))
        })?;

        info!(product_id = %created.id, "product created");
        Ok(created)
    }

    /// Lowest stock first.
    pub async fn in_stock_list(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(self
            .products
            .lowest_stock(&*self.db_pool, STOCK_LIST_LIMIT)
            .await?)
    }

    /// Deletes a product that no order references. Its recipes go with it.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let product = self
            .products
            .find_by_id(db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;

        let references = order_line_item::Entity::find()
            .filter(order_line_item::Column::ProductId.eq(id))
            .count(db)
            .await?;
        if references > 0 {
            return Err(ServiceError::Conflict(format!(
                "product {} is referenced by {} order line items",
                id, references
            )));
        }

        product.delete(db).await?;
        info!("product removed");
        Ok(())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_raw_material(
        &self,
        request: CreateRawMaterialRequest,
    ) -> Result<raw_material::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let name = request.name.trim().to_string();

        let duplicate = raw_material::Entity::find()
            .filter(raw_material::Column::Name.eq(name.as_str()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "raw material {} already exists",
                name
            )));
        }

        let created = raw_material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            in_stock_count: Set(request.in_stock_count),
            created_date: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(|e| {
            ServiceError::on_unique_violation(e, || format!("raw material {} already exists", name))
        })?;

        info!(raw_material_id = %created.id, "raw material created");
        Ok(created)
    }

    pub async fn list_raw_materials(&self) -> Result<Vec<raw_material::Model>, ServiceError> {
        Ok(raw_material::Entity::find()
            .order_by_asc(raw_material::Column::InStockCount)
            .order_by_asc(raw_material::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn create_recipe(
        &self,
        request: CreateRecipeRequest,
    ) -> Result<recipe::Model, ServiceError> {
        let db = &*self.db_pool;
        if self.products.find_by_id(db, request.product_id).await?.is_none() {
            return Err(ServiceError::not_found("Product", request.product_id));
        }

        let created = recipe::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(request.product_id),
            created_date: Set(Utc::now()),
        }
        .insert(db)
        .await?;

        info!(recipe_id = %created.id, "recipe created");
        Ok(created)
    }

    #[instrument(skip(self, request), fields(recipe_id = %recipe_id))]
    pub async fn add_required_material(
        &self,
        recipe_id: Uuid,
        request: AddRequiredMaterialRequest,
    ) -> Result<required_material::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        if recipe::Entity::find_by_id(recipe_id).one(db).await?.is_none() {
            return Err(ServiceError::not_found("Recipe", recipe_id));
        }
        if raw_material::Entity::find_by_id(request.raw_material_id)
            .one(db)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found(
                "Raw material",
                request.raw_material_id,
            ));
        }

        let created = required_material::ActiveModel {
            id: Set(Uuid::new_v4()),
            recipe_id: Set(recipe_id),
            raw_material_id: Set(request.raw_material_id),
            required_quantity: Set(request.required_quantity),
        }
        .insert(db)
        .await?;

        info!(required_material_id = %created.id, "material added to recipe");
        Ok(created)
    }

    pub async fn recipe_details(&self, recipe_id: Uuid) -> Result<RecipeDetails, ServiceError> {
        let db = &*self.db_pool;
        let recipe = recipe::Entity::find_by_id(recipe_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Recipe", recipe_id))?;

        let lines = required_material::Entity::find()
            .filter(required_material::Column::RecipeId.eq(recipe_id))
            .all(db)
            .await?;

        let names: HashMap<Uuid, String> = raw_material::Entity::find()
            .filter(raw_material::Column::Id.is_in(lines.iter().map(|l| l.raw_material_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let required_materials = lines
            .into_iter()
            .map(|line| RequiredMaterialView {
                material_name: names.get(&line.raw_material_id).cloned(),
                id: line.id,
                raw_material_id: line.raw_material_id,
                required_quantity: line.required_quantity,
            })
            .collect();

        Ok(RecipeDetails {
            recipe,
            required_materials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_stock_is_invalid() {
        let request = CreateProductRequest {
            name: "Mango Sorbet".into(),
            in_stock_count: -1,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn required_quantity_must_be_positive() {
        let request = AddRequiredMaterialRequest {
            raw_material_id: Uuid::new_v4(),
            required_quantity: 0,
        };
        assert!(request.validate().is_err());
    }
}
