mod common;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use common::TestApp;
use flavorwave_api::entities::{
    customer, delivery_route, order,
    status::{DeliveryStatus, OrderStatus, PaidStatus, RouteStatus},
};
use flavorwave_api::services::analytics::{OverviewCount, StatusDimension};
use flavorwave_api::services::time_windows::TimeWindow;
use rstest::rstest;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

fn local(ts: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(ts).unwrap()
}

fn utc(ts: &str) -> DateTime<Utc> {
    local(ts).with_timezone(&Utc)
}

/// Wednesday noon, two hours east of UTC.
fn now() -> DateTime<FixedOffset> {
    local("2024-05-15T12:00:00+02:00")
}

async fn insert_order(
    app: &TestApp,
    customer_id: Uuid,
    created: &str,
    status: OrderStatus,
    delivery: DeliveryStatus,
) {
    let created = utc(created);
    order::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        order_status: Set(status),
        delivery_status: Set(delivery),
        paid: Set(PaidStatus::No),
        created_date: Set(created),
        expected_date: Set(created),
        updated_date: Set(created),
    }
    .insert(app.db())
    .await
    .unwrap();
}

/// Seeds one order per window boundary case around [`now`].
async fn seeded_app() -> TestApp {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Analytics Buyer").await;
    let id = customer.id;

    // today
    insert_order(&app, id, "2024-05-15T08:00:00+02:00", OrderStatus::Pending, DeliveryStatus::Pending).await;
    // this week, before today
    insert_order(&app, id, "2024-05-14T23:30:00+02:00", OrderStatus::Processing, DeliveryStatus::Delivering).await;
    // first minutes of the local month, still April in UTC
    insert_order(&app, id, "2024-05-01T00:30:00+02:00", OrderStatus::Processing, DeliveryStatus::Processing).await;
    // previous month, same year
    insert_order(&app, id, "2024-04-30T23:00:00+02:00", OrderStatus::Pending, DeliveryStatus::Pending).await;
    // previous year
    insert_order(&app, id, "2023-12-31T23:59:00+02:00", OrderStatus::Pending, DeliveryStatus::Pending).await;

    app
}

fn counts(groups: &[flavorwave_api::services::analytics::StatusGroup]) -> Vec<(String, u64)> {
    groups.iter().map(|g| (g.key.clone(), g.count)).collect()
}

#[rstest]
#[case(TimeWindow::Day, vec![("pending", 1)])]
#[case(TimeWindow::Week, vec![("pending", 1), ("processing", 1)])]
#[case(TimeWindow::Month, vec![("pending", 1), ("processing", 2)])]
#[case(TimeWindow::Year, vec![("pending", 2), ("processing", 2)])]
#[tokio::test]
async fn order_status_counts_follow_local_windows(
    #[case] window: TimeWindow,
    #[case] expected: Vec<(&str, u64)>,
) {
    let app = seeded_app().await;

    let groups = app
        .state
        .services
        .analytics
        .count_by_status_in_window_at(StatusDimension::OrderStatus, window, &now())
        .await
        .unwrap();

    let expected: Vec<(String, u64)> = expected
        .into_iter()
        .map(|(k, c)| (k.to_string(), c))
        .collect();
    assert_eq!(counts(&groups), expected);
}

#[tokio::test]
async fn delivery_dimension_groups_by_delivery_status() {
    let app = seeded_app().await;

    let groups = app
        .state
        .services
        .analytics
        .count_by_status_in_window_at(StatusDimension::DeliveryStatus, TimeWindow::Month, &now())
        .await
        .unwrap();

    assert_eq!(
        counts(&groups),
        vec![
            ("delivering".to_string(), 1),
            ("pending".to_string(), 1),
            ("processing".to_string(), 1),
        ]
    );

    let json = serde_json::to_value(&groups[0]).unwrap();
    assert_eq!(json["delivery_status"], "delivering");
    assert_eq!(json["count"], 1);
    assert_eq!(json["created_dates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_window_yields_no_groups() {
    let app = TestApp::new().await;
    let groups = app
        .state
        .services
        .analytics
        .count_by_status_in_window_at(StatusDimension::OrderStatus, TimeWindow::Year, &now())
        .await
        .unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn monthly_overview_counts_orders_routes_and_customers() {
    let app = seeded_app().await;

    // customer and route created inside May, local time
    let mut buyer: customer::ActiveModel = app.seed_customer("May Buyer").await.into();
    buyer.created_date = Set(utc("2024-05-10T09:00:00+02:00"));
    buyer.update(app.db()).await.unwrap();

    let truck = app.seed_truck("TRK-77", 15).await;
    let departure = utc("2024-05-12T07:00:00+02:00");
    delivery_route::ActiveModel {
        id: Set(Uuid::new_v4()),
        truck_id: Set(truck.id),
        departure_date: Set(departure),
        completed_date: Set(departure),
        status: Set(RouteStatus::Ongoing),
        created_date: Set(departure),
    }
    .insert(app.db())
    .await
    .unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
    let overview = app
        .state
        .services
        .analytics
        .monthly_overall_counts_at(today, &now())
        .await
        .unwrap();

    assert_eq!(
        overview,
        vec![
            OverviewCount {
                name: "orders".into(),
                count: 3
            },
            OverviewCount {
                name: "deliveringTrucks".into(),
                count: 1
            },
            OverviewCount {
                name: "customers".into(),
                count: 1
            },
        ]
    );
}

#[tokio::test]
async fn past_month_overview_covers_the_whole_month() {
    let app = seeded_app().await;

    let april = NaiveDate::from_ymd_opt(2024, 4, 3).unwrap();
    let overview = app
        .state
        .services
        .analytics
        .monthly_overall_counts_at(april, &now())
        .await
        .unwrap();

    assert_eq!(overview[0].count, 1);
    assert_eq!(overview[1].count, 0);
    let names: Vec<_> = overview.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["orders", "deliveringTrucks", "customers"]);

    // nothing was created in the far past
    let empty = app
        .state
        .services
        .analytics
        .monthly_overall_counts_at(NaiveDate::from_ymd_opt(2010, 6, 1).unwrap(), &now())
        .await
        .unwrap();
    assert!(empty.iter().all(|c| c.count == 0));
}
