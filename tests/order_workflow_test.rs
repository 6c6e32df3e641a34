mod common;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveTime, TimeZone, Utc};
use common::TestApp;
use flavorwave_api::entities::{
    order, outbox_event,
    status::{DeliveryStatus, OrderStatus, PaidStatus},
};
use flavorwave_api::errors::ServiceError;
use flavorwave_api::services::orders::{AttachProductRequest, CreateOrderRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::test]
async fn new_orders_start_pending_with_no_line_items() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Harbor Cafe").await;

    let order = app
        .state
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: customer.id,
            expected_date: Utc::now() + Duration::days(3),
            paid: Some(PaidStatus::Yes),
        })
        .await
        .unwrap();

    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.delivery_status, DeliveryStatus::Pending);
    assert_eq!(order.paid, PaidStatus::Yes);
    assert!(order.product_list.is_empty());
    assert_eq!(order.customer_name.as_deref(), Some("Harbor Cafe"));
    assert_eq!(order.delivery_route_id, None);
}

#[tokio::test]
async fn orders_for_unknown_customers_are_rejected() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            expected_date: Utc::now(),
            paid: None,
        })
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(order::Entity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn attach_and_confirm_runs_the_full_lifecycle() {
    let app = TestApp::new().await;
    let orders = &app.state.services.orders;
    let customer = app.seed_customer("Lakeside Market").await;
    let syrup = app.seed_product("Peach Syrup", 10).await;
    let base = app.seed_product("Tonic Base", 4).await;

    let created = orders
        .create_order(CreateOrderRequest {
            customer_id: customer.id,
            expected_date: Utc::now() + Duration::days(1),
            paid: None,
        })
        .await
        .unwrap();

    let first = orders
        .attach_product(
            created.id,
            AttachProductRequest {
                product_id: syrup.id,
                count: 6,
            },
        )
        .await
        .unwrap();
    let second = orders
        .attach_product(
            created.id,
            AttachProductRequest {
                product_id: base.id,
                count: 4,
            },
        )
        .await
        .unwrap();

    let confirmed = orders.confirm_processing(created.id).await.unwrap();
    assert_eq!(confirmed.order_status, OrderStatus::Processing);
    assert_eq!(confirmed.delivery_status, DeliveryStatus::Processing);
    assert_eq!(confirmed.product_list, vec![first.id, second.id]);

    let details = orders.order_details(created.id).await.unwrap();
    assert_eq!(details.line_items.len(), 2);
    assert_eq!(details.line_items[0].product_name.as_deref(), Some("Peach Syrup"));
    assert_eq!(details.line_items[1].count, 4);

    let queued = outbox_event::Entity::find()
        .filter(outbox_event::Column::Channel.eq("NewOrderEvent"))
        .filter(outbox_event::Column::AggregateId.eq(created.id))
        .count(app.db())
        .await
        .unwrap();
    assert_eq!(queued, 1);

    // confirmed orders leave the pending list
    assert!(orders.pending_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn attaching_to_unknown_order_reserves_nothing() {
    let app = TestApp::new().await;
    let product = app.seed_product("Berry Mix", 5).await;

    let err = app
        .state
        .services
        .orders
        .attach_product(
            Uuid::new_v4(),
            AttachProductRequest {
                product_id: product.id,
                count: 2,
            },
        )
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(_));
    let stock = flavorwave_api::entities::product::Entity::find_by_id(product.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap()
        .in_stock_count;
    assert_eq!(stock, 5);
}

#[tokio::test]
async fn confirming_unknown_order_is_not_found_and_queues_nothing() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .orders
        .confirm_processing(Uuid::new_v4())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(outbox_event::Entity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn day_and_month_listings_follow_utc_calendar() {
    let app = TestApp::new().await;
    let orders = &app.state.services.orders;
    let customer = app.seed_customer("Night Owl").await;

    let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let at = |d: chrono::NaiveDate, h: u32| {
        Utc.from_utc_datetime(&d.and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap()))
    };

    let placed = orders
        .create_order(CreateOrderRequest {
            customer_id: customer.id,
            expected_date: at(day, 9),
            paid: None,
        })
        .await
        .unwrap();

    // backdate creation into the target day
    let mut active: order::ActiveModel = order::Entity::find_by_id(placed.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap()
        .into();
    active.created_date = Set(at(day, 23));
    active.update(app.db()).await.unwrap();

    let on_day = orders.orders_by_placement_day(day).await.unwrap();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].id, placed.id);

    let next_day = day.succ_opt().unwrap();
    assert!(orders.orders_by_placement_day(next_day).await.unwrap().is_empty());

    let due = orders.orders_by_delivery_day(day).await.unwrap();
    assert_eq!(due.len(), 1);

    let march = orders
        .orders_by_month(chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        .await
        .unwrap();
    assert_eq!(march.len(), 1);
    let april = orders
        .orders_by_month(chrono::NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
        .await
        .unwrap();
    assert!(april.is_empty());
}
