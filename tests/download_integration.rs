//! Integration tests for the book download flow.
//!
//! These drive a real [`DownloadController`] with a real HTTP client
//! against a mock server, persisting into a file-backed SQLite cache.

use std::sync::Arc;
use std::time::Duration;

use biblesync_core::canon::{self, chapter_key};
use biblesync_core::fetch::{RetryPolicy, VerseFetchClient, VerseSource};
use biblesync_core::job::{DownloadController, JobStatus};
use biblesync_core::{Database, NetworkStatusMonitor, VerseCache};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts every chapter of `book` on the server with a one-verse body.
async fn mount_book(server: &MockServer, book: &str) {
    let chapters = canon::find_book(book).expect("known book").chapters;
    for chapter in 1..=chapters {
        Mock::given(method("GET"))
            .and(path(format!("/{book}+{chapter}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "verses": [{ "verse": 1, "text": format!("{book} {chapter}:1 text") }]
            })))
            .mount(server)
            .await;
    }
}

fn controller_for(cache: Arc<VerseCache>, server_uri: &str) -> DownloadController {
    let client = VerseFetchClient::with_base_url(server_uri)
        .expect("mock server uri parses")
        .with_retry_policy(RetryPolicy::with_max_attempts(1));
    DownloadController::new(
        cache,
        Arc::new(client) as Arc<dyn VerseSource>,
        NetworkStatusMonitor::new(),
    )
}

#[tokio::test]
async fn test_full_book_download_persists_every_chapter() {
    let server = MockServer::start().await;
    mount_book(&server, "Ruth").await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("cache.db"))
        .await
        .expect("db opens");
    let cache = Arc::new(VerseCache::new(db));

    let controller = controller_for(Arc::clone(&cache), &server.uri());
    let outcome = controller.download_book("Ruth").await.expect("job starts");

    assert_eq!(outcome.status, JobStatus::Completed);
    assert_eq!(outcome.total, 4);
    assert!(outcome.failed_chapters.is_empty());

    for chapter in 1..=4 {
        let key = chapter_key("Ruth", chapter).expect("valid chapter");
        assert!(cache.has(&key).await.expect("cache readable"));
    }
    let ruth = canon::find_book("Ruth").expect("known book");
    assert!(cache.is_book_downloaded(ruth).await.expect("cache readable"));
}

#[tokio::test]
async fn test_failed_chapter_leaves_placeholder_and_rerun_heals() {
    let server = MockServer::start().await;
    // Chapters 1, 2 and 4 succeed; chapter 3 always 500s.
    for chapter in [1u32, 2, 4] {
        Mock::given(method("GET"))
            .and(path(format!("/Ruth+{chapter}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "verses": [{ "verse": 1, "text": format!("Ruth {chapter}:1 text") }]
            })))
            .mount(&server)
            .await;
    }
    let failing = Mock::given(method("GET"))
        .and(path("/Ruth+3"))
        .respond_with(ResponseTemplate::new(500))
        .mount_as_scoped(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("cache.db"))
        .await
        .expect("db opens");
    let cache = Arc::new(VerseCache::new(db));

    let controller = controller_for(Arc::clone(&cache), &server.uri());
    let outcome = controller.download_book("Ruth").await.expect("job starts");

    assert_eq!(outcome.status, JobStatus::CompletedWithErrors);
    assert_eq!(outcome.failed_chapters, vec![3]);

    let gap = chapter_key("Ruth", 3).expect("valid chapter");
    assert!(
        !cache.has(&gap).await.expect("cache readable"),
        "placeholder chapter must not count as downloaded"
    );
    let entry = cache.get(&gap).await.expect("cache readable").expect("entry present");
    assert!(entry.provisional);
    assert_eq!(entry.verses.len(), 10);
    assert!(entry.verses[0].text.starts_with("Loading Ruth 3:"));

    // Server recovers; a rerun fetches only the gap.
    drop(failing);
    Mock::given(method("GET"))
        .and(path("/Ruth+3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "verses": [{ "verse": 1, "text": "Ruth 3:1 text" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(Arc::clone(&cache), &server.uri());
    let outcome = controller.download_book("Ruth").await.expect("job starts");

    assert_eq!(outcome.status, JobStatus::Completed);
    assert!(outcome.failed_chapters.is_empty());
    assert!(cache.has(&gap).await.expect("cache readable"));
}

#[tokio::test]
async fn test_cache_survives_reopen() {
    let server = MockServer::start().await;
    mount_book(&server, "Philemon").await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("cache.db");

    {
        let db = Database::new(&db_path).await.expect("db opens");
        let cache = Arc::new(VerseCache::new(db));
        let controller = controller_for(Arc::clone(&cache), &server.uri());
        let outcome = controller.download_book("Philemon").await.expect("job starts");
        assert_eq!(outcome.status, JobStatus::Completed);
        cache.close().await;
    }

    // A fresh process sees the downloaded content without the network.
    let db = Database::new(&db_path).await.expect("db reopens");
    let cache = VerseCache::new(db);
    let key = chapter_key("Philemon", 1).expect("valid chapter");
    assert!(cache.has(&key).await.expect("cache readable"));
    let entry = cache.get(&key).await.expect("cache readable").expect("entry present");
    assert_eq!(entry.verses[0].text, "Philemon 1:1 text");
}

#[tokio::test]
async fn test_offline_download_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("cache.db"))
        .await
        .expect("db opens");
    let cache = Arc::new(VerseCache::new(db));

    let client = VerseFetchClient::with_base_url(&server.uri()).expect("uri parses");
    let controller = DownloadController::new(
        cache,
        Arc::new(client) as Arc<dyn VerseSource>,
        NetworkStatusMonitor::with_initial(false),
    );

    let result = controller.download_book("Ruth").await;
    assert!(matches!(
        result,
        Err(biblesync_core::JobError::Offline)
    ));
}

#[tokio::test]
async fn test_progress_reaches_total_on_completion() {
    let server = MockServer::start().await;
    mount_book(&server, "Ruth").await;

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("cache.db"))
        .await
        .expect("db opens");
    let cache = Arc::new(VerseCache::new(db));

    let controller = Arc::new(controller_for(cache, &server.uri()));
    let mut rx = controller.subscribe();

    let runner = Arc::clone(&controller);
    let handle = tokio::spawn(async move { runner.download_book("Ruth").await });

    let terminal = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            rx.changed().await.expect("sender alive");
            let progress = rx.borrow().clone();
            if progress.status.is_terminal() {
                return progress;
            }
        }
    })
    .await
    .expect("job finishes in time");

    assert_eq!(terminal.status, JobStatus::Completed);
    assert_eq!(terminal.current, terminal.total);
    assert_eq!(terminal.total, 4);

    let outcome = handle.await.expect("task joins").expect("job ran");
    assert!(outcome.is_complete());
}
