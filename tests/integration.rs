//! Integration tests against a real Postgres instance.
//!
//! Run with a `DATABASE_URL` pointing at a throwaway database:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/piscine_poney_test cargo test -- --ignored
//! ```

use chrono::{TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use piscine_poney_api::error::ApiError;
use piscine_poney_api::models::activity::{Activity, ActivityPayload};
use piscine_poney_api::models::child::ChildPayload;
use piscine_poney_api::models::parent::{Parent, ParentPayload};
use piscine_poney_api::models::transport::{
    Transport, TransportPayload, TransportType, TransportVehiclePayload,
};
use piscine_poney_api::models::vehicle::CreateVehiclePayload;
use piscine_poney_api::services::activities::ActivityService;
use piscine_poney_api::services::children::ChildService;
use piscine_poney_api::services::parents::ParentService;
use piscine_poney_api::services::transports::TransportService;
use piscine_poney_api::services::vehicles::VehicleService;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for integration tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

async fn make_activity(pool: &PgPool, name: &str) -> Activity {
    ActivityService::create(
        pool,
        &ActivityPayload { name: name.into(), address: "Pool Rd".into() },
    )
    .await
    .unwrap()
}

async fn make_parent(pool: &PgPool) -> Parent {
    ParentService::create(
        pool,
        &ParentPayload {
            name: "J. Doe".into(),
            email: "j@x.com".into(),
            phone: "0612345678".into(),
        },
    )
    .await
    .unwrap()
}

async fn make_transport(pool: &PgPool, activity_id: i64, parent_id: i64) -> Transport {
    TransportService::create(
        pool,
        &TransportPayload {
            transport_type: TransportType::Outward,
            date_start: Utc.timestamp_millis_opt(100).unwrap(),
            date_end: Utc.timestamp_millis_opt(200).unwrap(),
            pickup_location: "School".into(),
            activity_id,
            vehicle: Some(TransportVehiclePayload {
                parent_id: Some(parent_id),
                available_seats: 4,
            }),
        },
    )
    .await
    .unwrap()
}

async fn vehicle_count(pool: &PgPool, vehicle_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn failed_second_statement_rolls_back_the_first() {
    let pool = test_pool().await;
    let parent = make_parent(&pool).await;

    // Vehicle insert succeeds, transport insert then fails on an unknown
    // activity. The unit must leave no orphan vehicle behind.
    let mut tx = pool.begin().await.unwrap();

    let vehicle_id: i64 = sqlx::query_scalar(
        "INSERT INTO vehicles (parent_id, available_seats) VALUES ($1, $2) RETURNING id",
    )
    .bind(parent.id)
    .bind(4)
    .fetch_one(&mut *tx)
    .await
    .unwrap();

    let result = sqlx::query(
        "INSERT INTO transports
             (transport_type, date_start, date_end, pickup_location, activity_id, vehicle_id)
         VALUES ('OUTWARD', NOW(), NOW() + interval '1 hour', 'School', $1, $2)",
    )
    .bind(999_999_999_i64)
    .bind(vehicle_id)
    .execute(&mut *tx)
    .await;
    assert!(result.is_err());

    drop(tx); // rollback

    assert_eq!(vehicle_count(&pool, vehicle_id).await, 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn failed_child_association_insert_leaves_no_partial_child() {
    let pool = test_pool().await;

    let payload = ChildPayload {
        name: "orphan-check".into(),
        parent_id: Some(999_999_999),
        activity_ids: vec![],
    };

    // The parent association insert fails on the foreign key after the
    // child row went in; the whole unit must be rolled back.
    let result = ChildService::create(&pool, &payload).await;
    assert!(result.is_err());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM children WHERE name = $1")
        .bind("orphan-check")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn deleting_a_transport_cascades_to_its_vehicle() {
    let pool = test_pool().await;
    let activity = make_activity(&pool, "Riding").await;
    let parent = make_parent(&pool).await;
    let transport = make_transport(&pool, activity.id, parent.id).await;
    let vehicle_id = transport.vehicle.id;

    TransportService::delete(&pool, transport.id).await.unwrap();

    assert!(matches!(
        TransportService::get(&pool, transport.id).await,
        Err(ApiError::NotFound(_))
    ));
    assert_eq!(vehicle_count(&pool, vehicle_id).await, 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn update_transport_rewrites_scalars_and_its_vehicle_seats() {
    let pool = test_pool().await;
    let activity = make_activity(&pool, "Swimming").await;
    let other_activity = make_activity(&pool, "Riding").await;
    let parent = make_parent(&pool).await;
    let transport = make_transport(&pool, activity.id, parent.id).await;
    let vehicle_id = transport.vehicle.id;

    let updated = TransportService::update(
        &pool,
        transport.id,
        &TransportPayload {
            transport_type: TransportType::Return,
            date_start: Utc.timestamp_millis_opt(300).unwrap(),
            date_end: Utc.timestamp_millis_opt(500).unwrap(),
            pickup_location: "Stables".into(),
            activity_id: other_activity.id,
            vehicle: Some(TransportVehiclePayload { parent_id: None, available_seats: 7 }),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.transport_type, TransportType::Return);
    assert_eq!(updated.date_start, Utc.timestamp_millis_opt(300).unwrap());
    assert_eq!(updated.date_end, Utc.timestamp_millis_opt(500).unwrap());
    assert_eq!(updated.pickup_location, "Stables");
    assert_eq!(updated.activity.id, other_activity.id);

    // The vehicle payload adjusts the transport's existing vehicle in place.
    assert_eq!(updated.vehicle.id, vehicle_id);
    assert_eq!(updated.vehicle.available_seats, 7);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn update_transport_without_vehicle_payload_leaves_seats_alone() {
    let pool = test_pool().await;
    let activity = make_activity(&pool, "Sailing").await;
    let parent = make_parent(&pool).await;
    let transport = make_transport(&pool, activity.id, parent.id).await;

    let updated = TransportService::update(
        &pool,
        transport.id,
        &TransportPayload {
            transport_type: TransportType::Return,
            date_start: Utc.timestamp_millis_opt(100).unwrap(),
            date_end: Utc.timestamp_millis_opt(200).unwrap(),
            pickup_location: "Harbour".into(),
            activity_id: activity.id,
            vehicle: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.pickup_location, "Harbour");
    assert_eq!(updated.vehicle.id, transport.vehicle.id);
    assert_eq!(updated.vehicle.available_seats, 4);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn updating_an_absent_transport_is_not_found() {
    let pool = test_pool().await;
    let activity = make_activity(&pool, "Chess").await;

    let result = TransportService::update(
        &pool,
        999_999_999,
        &TransportPayload {
            transport_type: TransportType::Outward,
            date_start: Utc.timestamp_millis_opt(100).unwrap(),
            date_end: Utc.timestamp_millis_opt(200).unwrap(),
            pickup_location: "School".into(),
            activity_id: activity.id,
            vehicle: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn deleting_an_absent_transport_touches_no_vehicle() {
    let pool = test_pool().await;
    let parent = make_parent(&pool).await;
    let vehicle = VehicleService::create(
        &pool,
        &CreateVehiclePayload { parent_id: parent.id, available_seats: 4 },
    )
    .await
    .unwrap();

    let result = TransportService::delete(&pool, 999_999_999).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));

    assert_eq!(vehicle_count(&pool, vehicle.id).await, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn set_parent_leaves_exactly_one_association_row() {
    let pool = test_pool().await;
    let first = make_parent(&pool).await;
    let second = make_parent(&pool).await;
    let child = ChildService::create(
        &pool,
        &ChildPayload { name: "Ana".into(), parent_id: Some(first.id), activity_ids: vec![] },
    )
    .await
    .unwrap();

    let updated = ChildService::set_parent(&pool, child.id, second.id).await.unwrap();
    assert_eq!(updated.parent.as_ref().unwrap().id, second.id);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parent_children WHERE child_id = $1")
        .bind(child.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn update_child_replaces_activity_set_wholesale() {
    let pool = test_pool().await;
    let a1 = make_activity(&pool, "Swimming").await;
    let a2 = make_activity(&pool, "Riding").await;
    let a3 = make_activity(&pool, "Climbing").await;

    let child = ChildService::create(
        &pool,
        &ChildPayload { name: "Ben".into(), parent_id: None, activity_ids: vec![a1.id, a2.id] },
    )
    .await
    .unwrap();

    let updated = ChildService::update(
        &pool,
        child.id,
        &ChildPayload { name: "Ben".into(), parent_id: None, activity_ids: vec![a2.id, a3.id] },
    )
    .await
    .unwrap();

    let mut ids: Vec<i64> = updated.activities.iter().map(|a| a.id).collect();
    ids.sort_unstable();
    let mut expected = vec![a2.id, a3.id];
    expected.sort_unstable();
    assert_eq!(ids, expected);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn vehicle_creation_rejects_non_positive_seats() {
    let pool = test_pool().await;
    let parent = make_parent(&pool).await;

    let result = VehicleService::create(
        &pool,
        &CreateVehiclePayload { parent_id: parent.id, available_seats: 0 },
    )
    .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn vehicle_in_use_cannot_be_deleted_until_released() {
    let pool = test_pool().await;
    let activity = make_activity(&pool, "Sailing").await;
    let parent = make_parent(&pool).await;
    let vehicle = VehicleService::create(
        &pool,
        &CreateVehiclePayload { parent_id: parent.id, available_seats: 4 },
    )
    .await
    .unwrap();

    // Reference the standalone vehicle from a transport row.
    let transport_id: i64 = sqlx::query_scalar(
        "INSERT INTO transports
             (transport_type, date_start, date_end, pickup_location, activity_id, vehicle_id)
         VALUES ('RETURN', NOW(), NOW() + interval '1 hour', 'School', $1, $2)
         RETURNING id",
    )
    .bind(activity.id)
    .bind(vehicle.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let blocked = VehicleService::delete(&pool, vehicle.id).await;
    assert!(matches!(blocked, Err(ApiError::Conflict(_))));
    assert_eq!(vehicle_count(&pool, vehicle.id).await, 1);

    sqlx::query("DELETE FROM transports WHERE id = $1")
        .bind(transport_id)
        .execute(&pool)
        .await
        .unwrap();

    VehicleService::delete(&pool, vehicle.id).await.unwrap();
    assert_eq!(vehicle_count(&pool, vehicle.id).await, 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn availability_is_a_pure_seat_comparison() {
    let pool = test_pool().await;
    let parent = make_parent(&pool).await;
    let vehicle = VehicleService::create(
        &pool,
        &CreateVehiclePayload { parent_id: parent.id, available_seats: 4 },
    )
    .await
    .unwrap();

    assert!(VehicleService::check_availability(&pool, vehicle.id, 4).await.unwrap());
    assert!(!VehicleService::check_availability(&pool, vehicle.id, 5).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn create_then_delete_transport_end_to_end() {
    let pool = test_pool().await;
    let activity = make_activity(&pool, "Swimming").await;
    let parent = make_parent(&pool).await;

    let transport = make_transport(&pool, activity.id, parent.id).await;

    assert_eq!(transport.transport_type, TransportType::Outward);
    assert_eq!(transport.activity.name, "Swimming");
    assert_eq!(transport.vehicle.available_seats, 4);
    assert_eq!(transport.vehicle.parent.as_ref().unwrap().id, parent.id);
    assert_eq!(transport.date_start, Utc.timestamp_millis_opt(100).unwrap());
    assert_eq!(transport.date_end, Utc.timestamp_millis_opt(200).unwrap());

    let vehicle_id = transport.vehicle.id;
    TransportService::delete(&pool, transport.id).await.unwrap();
    assert_eq!(vehicle_count(&pool, vehicle_id).await, 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn child_graph_hydrates_without_duplication() {
    let pool = test_pool().await;
    let parent = make_parent(&pool).await;
    let a1 = make_activity(&pool, "Swimming").await;
    let a2 = make_activity(&pool, "Riding").await;

    let child = ChildService::create(
        &pool,
        &ChildPayload {
            name: "Ana".into(),
            parent_id: Some(parent.id),
            activity_ids: vec![a1.id, a2.id],
        },
    )
    .await
    .unwrap();

    // The join returns one row per activity; the hydrated child must carry
    // one parent and each activity exactly once.
    let fetched = ChildService::get(&pool, child.id).await.unwrap();
    assert_eq!(fetched.parent.as_ref().unwrap().id, parent.id);
    assert_eq!(fetched.activities.len(), 2);

    let by_parent = ChildService::list_by_parent(&pool, parent.id).await.unwrap();
    assert_eq!(by_parent.iter().filter(|c| c.id == child.id).count(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn deleting_a_child_removes_its_association_rows() {
    let pool = test_pool().await;
    let parent = make_parent(&pool).await;
    let activity = make_activity(&pool, "Chess").await;

    let child = ChildService::create(
        &pool,
        &ChildPayload {
            name: "Cam".into(),
            parent_id: Some(parent.id),
            activity_ids: vec![activity.id],
        },
    )
    .await
    .unwrap();

    ChildService::delete(&pool, child.id).await.unwrap();

    let links: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM parent_children WHERE child_id = $1)
              + (SELECT COUNT(*) FROM child_activities WHERE child_id = $1)",
    )
    .bind(child.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(links, 0);
    assert!(matches!(
        ChildService::get(&pool, child.id).await,
        Err(ApiError::NotFound(_))
    ));
}
