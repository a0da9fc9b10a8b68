//! End-to-end flows through the library API against an in-memory store.

use steeple::db;
use steeple::geo::EARTH_RADIUS_M;
use steeple::ingest::{self, CategoryFilter};
use steeple::model::{ChurchPatch, NewChurch};

async fn setup_pool() -> db::Pool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

fn lon_offset(lon: f64, meters: f64) -> f64 {
    lon + (meters / EARTH_RADIUS_M).to_degrees()
}

#[tokio::test]
async fn full_lifecycle_create_update_search_delete() {
    let pool = setup_pool().await;

    let created = db::create_church(
        &pool,
        &NewChurch {
            latitude: 48.8530,
            longitude: 2.3499,
            osm_id: Some(17807753),
            name: Some("Notre-Dame de Paris".into()),
            denomination: Some("catholic".into()),
            religion: Some("christian".into()),
            amenity: Some("place_of_worship".into()),
            address: Some("6 Parvis Notre-Dame".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(created.latitude, Some(48.8530));
    assert_eq!(created.longitude, Some(2.3499));

    // Sparse patch: move longitude only, add a phone number.
    let updated = db::update_church(
        &pool,
        created.id,
        &ChurchPatch {
            longitude: Some(2.3500),
            phone: Some("+33 1 42 34 56 10".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.latitude, Some(48.8530));
    assert_eq!(updated.longitude, Some(2.3500));
    assert_eq!(updated.phone.as_deref(), Some("+33 1 42 34 56 10"));
    assert_eq!(updated.name.as_deref(), Some("Notre-Dame de Paris"));

    // Both search strategies see the row.
    let by_text = db::search_churches(&pool, "notre-dame", 10).await.unwrap();
    assert_eq!(by_text.len(), 1);

    let nearby = db::find_nearby_churches(&pool, 48.8530, 2.3500, 1.0, 10)
        .await
        .unwrap();
    assert_eq!(nearby.len(), 1);
    assert!(nearby[0].distance_meters < 1.0);

    // Hard delete, then every read path misses.
    assert!(db::delete_church(&pool, created.id).await.unwrap());
    assert!(matches!(
        db::get_church(&pool, created.id).await,
        Err(db::StoreError::NotFound(_))
    ));
    assert!(db::search_churches(&pool, "notre-dame", 10)
        .await
        .unwrap()
        .is_empty());
    assert!(!db::delete_church(&pool, created.id).await.unwrap());
}

#[tokio::test]
async fn proximity_results_are_ordered_and_bounded() {
    let pool = setup_pool().await;
    let (lat, lon) = (51.5007, -0.1246);

    let mut ids = Vec::new();
    for meters in [900.0, 300.0, 600.0] {
        let c = db::create_church(
            &pool,
            &NewChurch {
                latitude: lat,
                longitude: lon_offset(lon, meters),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ids.push(c.id);
    }

    // Radius excludes the farthest row, order is nearest first.
    let hits = db::find_nearby_churches(&pool, lat, lon, 0.7, 10)
        .await
        .unwrap();
    let hit_ids: Vec<i64> = hits.iter().map(|h| h.church.id).collect();
    assert_eq!(hit_ids, vec![ids[1], ids[2]]);
    assert!(hits[0].distance_meters < hits[1].distance_meters);
    assert!((hits[0].distance_meters - 300.0).abs() < 1e-6);
    assert!((hits[1].distance_meters - 600.0).abs() < 1e-6);
}

#[tokio::test]
async fn import_then_query_round_trip() {
    let pool = setup_pool().await;
    let dump = ingest::parse_dump(
        r#"{
            "elements": [
                {
                    "type": "node",
                    "id": 555,
                    "lat": 41.9022,
                    "lon": 12.4533,
                    "tags": {
                        "amenity": "place_of_worship",
                        "religion": "christian",
                        "denomination": "catholic",
                        "name": "St. Peter's Basilica"
                    }
                }
            ]
        }"#,
    )
    .unwrap();

    let report = ingest::import_dump(&pool, &dump, &CategoryFilter::default())
        .await
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 0);

    let nearby = db::find_nearby_churches(&pool, 41.9029, 12.4534, 5.0, 10)
        .await
        .unwrap();
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].church.osm_id, Some(555));
    assert!(nearby[0].distance_meters > 0.0);

    // Re-running the import adds nothing.
    let again = ingest::import_dump(&pool, &dump, &CategoryFilter::default())
        .await
        .unwrap();
    assert_eq!(again.added, 0);
    assert_eq!(again.skipped, 1);
}

#[tokio::test]
async fn duplicate_osm_id_create_is_rejected_after_import() {
    let pool = setup_pool().await;
    db::create_church(
        &pool,
        &NewChurch {
            latitude: 1.0,
            longitude: 1.0,
            osm_id: Some(77),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = db::create_church(
        &pool,
        &NewChurch {
            latitude: 2.0,
            longitude: 2.0,
            osm_id: Some(77),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, db::StoreError::DuplicateOsmId(77)));
}
