//! Repository tests that exercise a live PostgreSQL instance. They are
//! ignored by default; point DATABASE_URL at a scratch database and run
//! them with `cargo test -p flimix-core -- --ignored`.

use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use flimix_core::content::model::MovieInput;
use flimix_core::content::{ContentKind, ContentRef, ContentRepo};
use flimix_core::page::PageRepo;
use flimix_core::section::{CreateSection, SectionRepo};
use flimix_core::CoreError;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for repo tests");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to the test database");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}")
}

fn movie_input(title: &str) -> MovieInput {
    MovieInput {
        title: title.to_string(),
        description: "A test description".to_string(),
        poster_url: "https://img.example/poster.jpg".to_string(),
        background_url: "https://img.example/background.jpg".to_string(),
        link: None,
        duration_minutes: Some(120),
        release_year: Some(2024),
    }
}

fn manual_section(name: &str) -> CreateSection {
    CreateSection {
        name: name.to_string(),
        section_type: "carousel".to_string(),
        strategy: None,
        auto_genre_id: None,
        settings: None,
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn activation_is_mutually_exclusive_and_get_active_is_idempotent() {
    let pool = pool().await;
    let pages = PageRepo::new(pool.clone());

    let first = pages.create(&unique("page-a")).await.unwrap();
    let second = pages.create(&unique("page-b")).await.unwrap();

    pages.activate(first.id).await.unwrap();
    pages.activate(second.id).await.unwrap();

    let active_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM landing_pages WHERE is_active")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(active_count, 1);

    let active = pages.get_or_create_active().await.unwrap();
    assert_eq!(active.id, second.id);

    // A second call must return the same page without creating a new row.
    let again = pages.get_or_create_active().await.unwrap();
    assert_eq!(again.id, active.id);
    let still_one: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM landing_pages WHERE is_active")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(still_one, 1);

    // The active page cannot be deleted; an inactive one can.
    let refused = pages.delete(second.id).await;
    assert!(matches!(refused, Err(CoreError::InvariantViolation(_))));
    pages.delete(first.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn concurrent_item_adds_get_distinct_positions() {
    let pool = pool().await;
    let content = ContentRepo::new(pool.clone());
    let sections = SectionRepo::new(pool.clone());

    let section = sections
        .create(&manual_section(&unique("race-section")))
        .await
        .unwrap();
    let a = content.create_movie(&movie_input(&unique("race-a"))).await.unwrap();
    let b = content.create_movie(&movie_input(&unique("race-b"))).await.unwrap();

    let repo_a = sections.clone();
    let repo_b = sections.clone();
    let section_id = section.id;
    let add_a = tokio::spawn(async move {
        repo_a
            .add_item(section_id, ContentRef::new(ContentKind::Movie, a.id))
            .await
    });
    let add_b = tokio::spawn(async move {
        repo_b
            .add_item(section_id, ContentRef::new(ContentKind::Movie, b.id))
            .await
    });
    add_a.await.unwrap().unwrap();
    add_b.await.unwrap().unwrap();

    let items = sections.items(section.id).await.unwrap();
    let positions: Vec<i32> = items.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1]);

    sections.delete(section.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn reorder_skips_stale_ids_and_assigns_increasing_positions() {
    let pool = pool().await;
    let content = ContentRepo::new(pool.clone());
    let sections = SectionRepo::new(pool.clone());

    let section = sections
        .create(&manual_section(&unique("reorder-section")))
        .await
        .unwrap();
    let m1 = content.create_movie(&movie_input(&unique("first"))).await.unwrap();
    let m2 = content.create_movie(&movie_input(&unique("second"))).await.unwrap();
    let m3 = content.create_movie(&movie_input(&unique("third"))).await.unwrap();

    let i1 = sections
        .add_item(section.id, ContentRef::new(ContentKind::Movie, m1.id))
        .await
        .unwrap();
    let i2 = sections
        .add_item(section.id, ContentRef::new(ContentKind::Movie, m2.id))
        .await
        .unwrap();
    let i3 = sections
        .add_item(section.id, ContentRef::new(ContentKind::Movie, m3.id))
        .await
        .unwrap();

    // Deleting the movie cascades its section item, leaving i2 stale.
    content.delete_movie(m2.id).await.unwrap();

    sections
        .reorder_items(section.id, &[i3.id, i2.id, i1.id])
        .await
        .unwrap();

    let items = sections.items(section.id).await.unwrap();
    let ordered: Vec<(i64, i32)> = items.iter().map(|i| (i.id, i.position)).collect();
    assert_eq!(ordered, vec![(i3.id, 0), (i1.id, 1)]);

    sections.delete(section.id).await.unwrap();
}
