mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::TestApp;
use flavorwave_api::entities::{
    delivery_route, outbox_event,
    status::{DeliveryStatus, RouteStatus},
};
use flavorwave_api::errors::ServiceError;
use flavorwave_api::services::delivery_routes::AssignRouteRequest;
use flavorwave_api::services::orders::{CreateOrderRequest, OrderView};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

async fn open_orders(app: &TestApp, n: usize) -> Vec<OrderView> {
    let customer = app.seed_customer("Route Customer").await;
    let mut orders = Vec::with_capacity(n);
    for _ in 0..n {
        orders.push(
            app.state
                .services
                .orders
                .create_order(CreateOrderRequest {
                    customer_id: customer.id,
                    expected_date: Utc::now() + Duration::days(1),
                    paid: None,
                })
                .await
                .unwrap(),
        );
    }
    orders
}

fn route_request(truck_id: Uuid, order_ids: Vec<Uuid>) -> AssignRouteRequest {
    let departure = Utc::now();
    AssignRouteRequest {
        truck_id,
        departure_date: departure,
        completed_date: departure + Duration::hours(6),
        order_ids,
    }
}

#[tokio::test]
async fn assigning_a_route_marks_orders_delivering() {
    let app = TestApp::new().await;
    let truck = app.seed_truck("TRK-001", 40).await;
    let orders = open_orders(&app, 2).await;
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let route = app
        .state
        .services
        .routes
        .assign_delivery_route(route_request(truck.id, ids.clone()))
        .await
        .unwrap();

    assert_eq!(route.route.status, RouteStatus::Ongoing);
    assert_eq!(route.route.truck_id, truck.id);
    assert_eq!(route.order_ids, ids);

    for id in &ids {
        let details = app.state.services.orders.order_details(*id).await.unwrap();
        assert_eq!(details.order.delivery_status, DeliveryStatus::Delivering);
        assert_eq!(details.order.delivery_route_id, Some(route.route.id));
    }

    let queued = outbox_event::Entity::find()
        .filter(outbox_event::Column::Channel.eq("NewDeliveryRouteEvent"))
        .count(app.db())
        .await
        .unwrap();
    assert_eq!(queued, 1);
}

#[tokio::test]
async fn unknown_truck_creates_no_route() {
    let app = TestApp::new().await;
    let orders = open_orders(&app, 1).await;

    let err = app
        .state
        .services
        .routes
        .assign_delivery_route(route_request(Uuid::new_v4(), vec![orders[0].id]))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(delivery_route::Entity::find().count(app.db()).await.unwrap(), 0);
    let details = app
        .state
        .services
        .orders
        .order_details(orders[0].id)
        .await
        .unwrap();
    assert_eq!(details.order.delivery_status, DeliveryStatus::Pending);
}

#[tokio::test]
async fn empty_order_list_and_inverted_window_are_invalid() {
    let app = TestApp::new().await;
    let truck = app.seed_truck("TRK-002", 10).await;
    let routes = &app.state.services.routes;

    assert_matches!(
        routes
            .assign_delivery_route(route_request(truck.id, vec![]))
            .await,
        Err(ServiceError::ValidationError(_))
    );

    let mut inverted = route_request(truck.id, vec![Uuid::new_v4()]);
    inverted.completed_date = inverted.departure_date - Duration::hours(1);
    assert_matches!(
        routes.assign_delivery_route(inverted).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn duplicate_and_unknown_order_ids_are_tolerated() {
    let app = TestApp::new().await;
    let truck = app.seed_truck("TRK-003", 12).await;
    let orders = open_orders(&app, 1).await;
    let ghost = Uuid::new_v4();

    let route = app
        .state
        .services
        .routes
        .assign_delivery_route(route_request(
            truck.id,
            vec![orders[0].id, ghost, orders[0].id],
        ))
        .await
        .unwrap();

    assert_eq!(route.order_ids, vec![orders[0].id, ghost]);

    let details = app
        .state
        .services
        .routes
        .route_details(route.route.id)
        .await
        .unwrap();
    assert_eq!(details.orders.len(), 1);
    assert_eq!(details.orders[0].id, orders[0].id);
}

#[tokio::test]
async fn later_routes_take_over_the_order() {
    let app = TestApp::new().await;
    let truck = app.seed_truck("TRK-004", 20).await;
    let orders = open_orders(&app, 1).await;
    let routes = &app.state.services.routes;

    assert_eq!(routes.route_of_order(orders[0].id).await.unwrap(), None);

    let first = routes
        .assign_delivery_route(route_request(truck.id, vec![orders[0].id]))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = routes
        .assign_delivery_route(route_request(truck.id, vec![orders[0].id]))
        .await
        .unwrap();
    assert_ne!(first.route.id, second.route.id);

    let owner = routes.route_of_order(orders[0].id).await.unwrap().unwrap();
    assert_eq!(owner.id, second.route.id);

    let ongoing = routes.ongoing_routes().await.unwrap();
    assert_eq!(ongoing.len(), 2);

    assert_matches!(
        routes.route_of_order(Uuid::new_v4()).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        routes.route_details(Uuid::new_v4()).await,
        Err(ServiceError::NotFound(_))
    );
}
