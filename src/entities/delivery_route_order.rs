use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ownership link from a delivery route to one of its orders.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_route_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub route_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: Uuid,
    /// Position of the order in the route's submitted list.
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::delivery_route::Entity",
        from = "Column::RouteId",
        to = "super::delivery_route::Column::Id"
    )]
    Route,
}

impl Related<super::delivery_route::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Route.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
