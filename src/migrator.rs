use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_reference_tables::Migration),
            Box::new(m20240301_000002_create_orders_tables::Migration),
            Box::new(m20240301_000003_create_delivery_route_tables::Migration),
            Box::new(m20240301_000004_create_recipe_tables::Migration),
            Box::new(m20240301_000005_create_replenishment_requests_table::Migration),
            Box::new(m20240301_000006_create_outbox_events_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().not_null())
                        .col(ColumnDef::new(Customers::DeliveryAddress).string().not_null())
                        .col(ColumnDef::new(Customers::Role).string().not_null())
                        .col(
                            ColumnDef::new(Customers::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_created_date")
                        .table(Customers::Table)
                        .col(Customers::CreatedDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Employees::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Employees::Name).string().not_null())
                        .col(
                            ColumnDef::new(Employees::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Employees::Phone).string().not_null())
                        .col(ColumnDef::new(Employees::Role).string().not_null())
                        .col(ColumnDef::new(Employees::Department).string_len(16).not_null())
                        .col(ColumnDef::new(Employees::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Employees::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Employees::UpdatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Products::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::InStockCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Trucks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Trucks::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Trucks::TruckIdCard).string().not_null())
                        .col(ColumnDef::new(Trucks::Capacity).integer().not_null())
                        .col(ColumnDef::new(Trucks::Driver).string().not_null())
                        .col(
                            ColumnDef::new(Trucks::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Trucks::UpdatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RawMaterials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RawMaterials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RawMaterials::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(RawMaterials::InStockCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RawMaterials::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RawMaterials::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Trucks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Phone,
        DeliveryAddress,
        Role,
        CreatedDate,
        UpdatedDate,
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Role,
        Department,
        PasswordHash,
        CreatedDate,
        UpdatedDate,
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        InStockCount,
        CreatedDate,
    }

    #[derive(DeriveIden)]
    pub(super) enum Trucks {
        Table,
        Id,
        TruckIdCard,
        Capacity,
        Driver,
        CreatedDate,
        UpdatedDate,
    }

    #[derive(DeriveIden)]
    pub(super) enum RawMaterials {
        Table,
        Id,
        Name,
        InStockCount,
        CreatedDate,
    }
}

mod m20240301_000002_create_orders_tables {

    use super::m20240301_000001_create_reference_tables::{Customers, Products};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::OrderStatus).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Orders::DeliveryStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::Paid).string_len(8).not_null())
                        .col(
                            ColumnDef::new(Orders::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ExpectedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_date")
                        .table(Orders::Table)
                        .col(Orders::CreatedDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_delivery_status")
                        .table(Orders::Table)
                        .col(Orders::DeliveryStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLineItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderLineItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderLineItems::Count).integer().not_null())
                        .col(
                            ColumnDef::new(OrderLineItems::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_line_items_order")
                                .from(OrderLineItems::Table, OrderLineItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_line_items_product")
                                .from(OrderLineItems::Table, OrderLineItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_line_items_order_id")
                        .table(OrderLineItems::Table)
                        .col(OrderLineItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLineItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        OrderStatus,
        DeliveryStatus,
        Paid,
        CreatedDate,
        ExpectedDate,
        UpdatedDate,
    }

    #[derive(DeriveIden)]
    enum OrderLineItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Count,
        CreatedDate,
    }
}

mod m20240301_000003_create_delivery_route_tables {

    use super::m20240301_000001_create_reference_tables::Trucks;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_delivery_route_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DeliveryRoutes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryRoutes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DeliveryRoutes::TruckId).uuid().not_null())
                        .col(
                            ColumnDef::new(DeliveryRoutes::DepartureDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryRoutes::CompletedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DeliveryRoutes::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(DeliveryRoutes::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_routes_truck")
                                .from(DeliveryRoutes::Table, DeliveryRoutes::TruckId)
                                .to(Trucks::Table, Trucks::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // order_id is not a foreign key: routes may list orders the store does not hold.
            manager
                .create_table(
                    Table::create()
                        .table(DeliveryRouteOrders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(DeliveryRouteOrders::RouteId).uuid().not_null())
                        .col(ColumnDef::new(DeliveryRouteOrders::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(DeliveryRouteOrders::Position)
                                .integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(DeliveryRouteOrders::RouteId)
                                .col(DeliveryRouteOrders::OrderId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_route_orders_route")
                                .from(DeliveryRouteOrders::Table, DeliveryRouteOrders::RouteId)
                                .to(DeliveryRoutes::Table, DeliveryRoutes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_delivery_route_orders_order_id")
                        .table(DeliveryRouteOrders::Table)
                        .col(DeliveryRouteOrders::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DeliveryRouteOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DeliveryRoutes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DeliveryRoutes {
        Table,
        Id,
        TruckId,
        DepartureDate,
        CompletedDate,
        Status,
        CreatedDate,
    }

    #[derive(DeriveIden)]
    enum DeliveryRouteOrders {
        Table,
        RouteId,
        OrderId,
        Position,
    }
}

mod m20240301_000004_create_recipe_tables {

    use super::m20240301_000001_create_reference_tables::{Products, RawMaterials};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_recipe_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Recipes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Recipes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Recipes::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(Recipes::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recipes_product")
                                .from(Recipes::Table, Recipes::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequiredMaterials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequiredMaterials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RequiredMaterials::RecipeId).uuid().not_null())
                        .col(
                            ColumnDef::new(RequiredMaterials::RawMaterialId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequiredMaterials::RequiredQuantity)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_required_materials_recipe")
                                .from(RequiredMaterials::Table, RequiredMaterials::RecipeId)
                                .to(Recipes::Table, Recipes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_required_materials_raw_material")
                                .from(RequiredMaterials::Table, RequiredMaterials::RawMaterialId)
                                .to(RawMaterials::Table, RawMaterials::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RequiredMaterials::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Recipes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Recipes {
        Table,
        Id,
        ProductId,
        CreatedDate,
    }

    #[derive(DeriveIden)]
    enum RequiredMaterials {
        Table,
        Id,
        RecipeId,
        RawMaterialId,
        RequiredQuantity,
    }
}

mod m20240301_000005_create_replenishment_requests_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_replenishment_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // subject_id references products or raw_materials depending on kind,
            // so it carries no foreign key.
            manager
                .create_table(
                    Table::create()
                        .table(ReplenishmentRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReplenishmentRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::Kind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::SubjectId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::Budget)
                                .decimal_len(14, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::AdminStatus)
                                .string_len(32)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReplenishmentRequests::UpdatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_replenishment_requests_kind_created")
                        .table(ReplenishmentRequests::Table)
                        .col(ReplenishmentRequests::Kind)
                        .col(ReplenishmentRequests::CreatedDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReplenishmentRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ReplenishmentRequests {
        Table,
        Id,
        Kind,
        SubjectId,
        Quantity,
        Budget,
        Status,
        AdminStatus,
        CreatedDate,
        UpdatedDate,
    }
}

mod m20240301_000006_create_outbox_events_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_outbox_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OutboxEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboxEvents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxEvents::Channel).string().not_null())
                        .col(ColumnDef::new(OutboxEvents::AggregateId).uuid().null())
                        .col(ColumnDef::new(OutboxEvents::Payload).text().not_null())
                        .col(ColumnDef::new(OutboxEvents::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(OutboxEvents::Attempts)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::AvailableAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboxEvents::LastError).text().null())
                        .col(
                            ColumnDef::new(OutboxEvents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboxEvents::ProcessedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_outbox_events_status_available")
                        .table(OutboxEvents::Table)
                        .col(OutboxEvents::Status)
                        .col(OutboxEvents::AvailableAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OutboxEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OutboxEvents {
        Table,
        Id,
        Channel,
        AggregateId,
        Payload,
        Status,
        Attempts,
        AvailableAt,
        LastError,
        CreatedAt,
        ProcessedAt,
    }
}
