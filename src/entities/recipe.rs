use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "recipes")]
#[schema(as = Recipe)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub created_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::required_material::Entity")]
    RequiredMaterials,
}

impl Related<super::required_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequiredMaterials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
