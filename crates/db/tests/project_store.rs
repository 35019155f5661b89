//! Integration tests for the project store.
//!
//! Runs the repository against an in-memory SQLite database with the
//! embedded migrations applied:
//! - Create / find / list round trips
//! - Duplicate id rejection
//! - Validated read-modify-write updates
//! - Concurrent updates to one project

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use content_engine_core::error::CoreError;
use content_engine_core::project::{Output, ProjectState, ProjectStatus};
use content_engine_db::repositories::ProjectRepo;
use content_engine_db::{health_check, run_migrations, DbPool, StoreError};
use sqlx::sqlite::SqlitePoolOptions;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn test_pool() -> DbPool {
    // A single connection keeps the in-memory database alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

fn output() -> Output {
    Output {
        video_url: "https://cdn.example.com/final.mp4".to_string(),
        title: String::new(),
        description: String::new(),
        hashtags: Vec::new(),
        platform_urls: Default::default(),
        rating: None,
    }
}

fn project(id: &str, minutes_after_epoch: i64) -> ProjectState {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
    ProjectState::new(id, base + Duration::minutes(minutes_after_epoch))
}

// ---------------------------------------------------------------------------
// Test: Create and read back
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_and_find() {
    let pool = test_pool().await;
    health_check(&pool).await.unwrap();

    let mut draft = project("proj_abc", 0);
    draft.set_default_intent("Why cities are quiet", draft.created_at).unwrap();
    ProjectRepo::create(&pool, &draft).await.unwrap();

    let found = ProjectRepo::find_by_id(&pool, "proj_abc").await.unwrap();
    assert_eq!(found, Some(draft));
}

#[tokio::test]
async fn test_find_missing_returns_none() {
    let pool = test_pool().await;
    assert_eq!(ProjectRepo::find_by_id(&pool, "proj_nope").await.unwrap(), None);
}

#[tokio::test]
async fn test_duplicate_id_rejected() {
    let pool = test_pool().await;
    ProjectRepo::create(&pool, &project("proj_dup", 0)).await.unwrap();

    let err = ProjectRepo::create(&pool, &project("proj_dup", 1)).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_document_not_stored() {
    let pool = test_pool().await;
    let mut bad = project("proj_bad", 0);
    bad.updated_at = bad.created_at - Duration::seconds(1);

    let err = ProjectRepo::create(&pool, &bad).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
    assert!(ProjectRepo::find_by_id(&pool, "proj_bad").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_empty_store() {
    let pool = test_pool().await;
    assert!(ProjectRepo::list(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_newest_first() {
    let pool = test_pool().await;
    for (id, minutes) in [("proj_old", 0), ("proj_new", 30), ("proj_mid", 10)] {
        ProjectRepo::create(&pool, &project(id, minutes)).await.unwrap();
    }

    let ids: Vec<_> = ProjectRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, ["proj_new", "proj_mid", "proj_old"]);
}

// ---------------------------------------------------------------------------
// Test: Updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_update_persists_mutation() {
    let pool = test_pool().await;
    let created = project("proj_upd", 0);
    ProjectRepo::create(&pool, &created).await.unwrap();

    let later = created.created_at + Duration::minutes(5);
    let (updated, previous) = ProjectRepo::update(&pool, "proj_upd", |p| {
        let previous = p.status;
        p.advance_to(ProjectStatus::Intent, later)?;
        Ok(previous)
    })
    .await
    .unwrap();

    assert_eq!(previous, ProjectStatus::Draft);
    assert_eq!(updated.status, ProjectStatus::Intent);
    assert_eq!(updated.updated_at, later);

    let stored = ProjectRepo::find_by_id(&pool, "proj_upd").await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_update_missing_project_is_not_found() {
    let pool = test_pool().await;
    let err = ProjectRepo::update(&pool, "proj_missing", |_| Ok(()))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_rejected_mutation_leaves_row_untouched() {
    let pool = test_pool().await;
    let mut created = project("proj_back", 0);
    created.advance_to(ProjectStatus::Script, created.created_at).unwrap();
    ProjectRepo::create(&pool, &created).await.unwrap();

    let err = ProjectRepo::update(&pool, "proj_back", |p| {
        p.advance_to(ProjectStatus::Intent, Utc::now())
    })
    .await
    .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));

    let stored = ProjectRepo::find_by_id(&pool, "proj_back").await.unwrap().unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn test_update_validates_before_write() {
    let pool = test_pool().await;
    let created = project("proj_val", 0);
    ProjectRepo::create(&pool, &created).await.unwrap();

    // Stage data without the matching status must not be persisted.
    let err = ProjectRepo::update(&pool, "proj_val", |p| {
        p.output = Some(output());
        Ok(())
    })
    .await
    .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
    assert!(ProjectRepo::find_by_id(&pool, "proj_val")
        .await
        .unwrap()
        .unwrap()
        .output
        .is_none());
}

#[tokio::test]
async fn test_concurrent_updates_are_all_applied() {
    let pool = test_pool().await;
    let created = project("proj_race", 0);
    ProjectRepo::create(&pool, &created).await.unwrap();

    let writers = 6;
    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let pool = pool.clone();
            let at = created.created_at + Duration::seconds(i + 1);
            tokio::spawn(async move {
                ProjectRepo::update(&pool, "proj_race", move |p| {
                    let hashtags = &mut p
                        .output
                        .get_or_insert_with(output)
                        .hashtags;
                    hashtags.push(format!("#w{i}"));
                    p.advance_to(ProjectStatus::Rendering, at)?;
                    Ok(())
                })
                .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = ProjectRepo::find_by_id(&pool, "proj_race").await.unwrap().unwrap();
    let mut tags = stored.output.unwrap().hashtags;
    tags.sort();
    assert_eq!(tags, (0..writers).map(|i| format!("#w{i}")).collect::<Vec<_>>());
}
