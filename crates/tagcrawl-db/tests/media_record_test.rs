//! Media record repository tests against a real Postgres.
//!
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::{record, setup_test_db};
use tagcrawl_core::AppError;
use tagcrawl_db::MetadataStore;

#[tokio::test]
async fn test_insert_then_exists() {
    let db = setup_test_db().await;

    assert!(!db.repo.exists("17900000000000001").await.unwrap());

    db.repo
        .insert(&record("17900000000000001", "sunset", "instagram", 0))
        .await
        .unwrap();

    assert!(db.repo.exists("17900000000000001").await.unwrap());
    assert!(!db.repo.exists("17900000000000002").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_insert_is_conflict_and_keeps_first_row() {
    let db = setup_test_db().await;
    let first = record("A", "sunset", "instagram", 0);
    db.repo.insert(&first).await.unwrap();

    let mut second = record("A", "sunset", "instagram", 30);
    second.storage_key = "images/instagram/tag_sunset_A_copy.jpg".to_string();
    let err = db.repo.insert(&second).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
    assert!(err.is_conflict());

    let stored = db.repo.list_by_tag("sunset", "instagram").await.unwrap();
    assert_eq!(stored, vec![first]);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crawled_media")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_list_by_tag_filters_and_orders_newest_first() {
    let db = setup_test_db().await;
    let older = record("B", "sunset", "instagram", 5);
    let newest = record("C", "sunset", "instagram", 40);
    // Same capture time as `older`; media_id breaks the tie.
    let tied = record("A", "sunset", "instagram", 5);
    let other_tag = record("D", "ocean", "instagram", 50);
    let other_platform = record("E", "sunset", "tiktok", 55);

    for r in [&older, &newest, &tied, &other_tag, &other_platform] {
        db.repo.insert(r).await.unwrap();
    }

    let listed = db.repo.list_by_tag("sunset", "instagram").await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|r| r.media_id.as_str()).collect();
    assert_eq!(ids, vec!["C", "A", "B"]);
    assert_eq!(listed[0], newest);

    assert!(db.repo.list_by_tag("mountains", "instagram").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_inserts_of_same_id_index_once() {
    let db = setup_test_db().await;
    let candidate = record("F", "sunset", "instagram", 0);

    let (left, right) = tokio::join!(db.repo.insert(&candidate), db.repo.insert(&candidate));
    let results = [left, right];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(AppError::is_conflict));
    assert_eq!(db.repo.list_by_tag("sunset", "instagram").await.unwrap().len(), 1);
}
