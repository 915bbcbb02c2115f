use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use disbox::api::webhook_id;
use disbox::{
    ClientConfig, DisboxClient, DisboxError, DownloadOutcome, FileEntry, TransferProgress,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOOK_PATH: &str = "/api/webhooks/1/token";

fn webhook_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), HOOK_PATH)
}

fn client_for(server: &MockServer) -> DisboxClient {
    let config = ClientConfig::new()
        .with_server_url(server.uri())
        .with_task_interval(Duration::from_millis(10));
    DisboxClient::with_config(&webhook_url(server), config).unwrap()
}

fn file_json(id: i64, name: &str, size: u64, chunks: &[&str]) -> Value {
    let content = format!(
        "[{}]",
        chunks
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(",")
    );
    json!({
        "id": id,
        "type": "file",
        "name": name,
        "size": size,
        "content": content,
        "created_at": "2023-04-01T10:20:30.123Z",
        "updated_at": "2023-04-01T10:20:30.123Z"
    })
}

async fn mount_tree(server: &MockServer, children: Value) {
    let tenant = webhook_id(&webhook_url(server));
    Mock::given(method("GET"))
        .and(path(format!("/files/get/{}", tenant)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "children": children })))
        .mount(server)
        .await;
}

/// Serve chunk `reference` with `body`, answering after `delay`.
async fn mount_chunk(server: &MockServer, reference: &str, body: &[u8], delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("{}/messages/{}", HOOK_PATH, reference)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": reference,
            "attachments": [{ "url": format!("{}/attachments/{}", server.uri(), reference) }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/attachments/{}", reference)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

fn sample_tree() -> Value {
    json!({
        "test folder": {
            "id": 100,
            "type": "directory",
            "name": "test folder",
            "children": {
                "a.txt": file_json(1, "a.txt", 6, &["a1", "a2"]),
                "nested": {"id": 2, "type": "directory", "name": "nested", "children": {}},
                "b.txt": file_json(3, "b.txt", 6, &["b1", "b2"])
            }
        },
        "root.bin": file_json(4, "root.bin", 3, &["r1"])
    })
}

#[tokio::test]
async fn test_get_file_info_by_id_and_name() {
    let server = MockServer::start().await;
    mount_tree(&server, sample_tree()).await;
    let client = client_for(&server);

    let by_id = client.get_file_info(3, Some("test folder")).await.unwrap();
    assert_eq!(by_id.name, "b.txt");
    assert_eq!(by_id.content, vec!["b1", "b2"]);

    let by_name = client.get_file_info("root.bin", None).await.unwrap();
    assert_eq!(by_name.id, 4);
    assert!(by_name.created_at.is_some());
}

#[tokio::test]
async fn test_get_file_info_errors() {
    let server = MockServer::start().await;
    mount_tree(&server, sample_tree()).await;
    let client = client_for(&server);

    let err = client.get_file_info("test folder", None).await.unwrap_err();
    assert!(matches!(err, DisboxError::NotAFile(_)));

    let err = client.get_file_info(2, Some("test folder")).await.unwrap_err();
    assert!(err.is_not_found());

    let err = client.get_file_info("a.txt", Some("missing")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_files_skips_directories() {
    let server = MockServer::start().await;
    mount_tree(&server, sample_tree()).await;
    let client = client_for(&server);

    let names: Vec<String> = client
        .list_files(Some("test folder"))
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);

    let random = client.random_file(Some("test folder")).await.unwrap();
    assert!(random.name == "a.txt" || random.name == "b.txt");

    let err = client.random_file(Some("test folder/nested")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_tree_server_error_is_transfer_error() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client.list_files(None).await.unwrap_err();
    assert!(err.is_transfer());
}

#[tokio::test]
async fn test_fetch_bytes() {
    let server = MockServer::start().await;
    mount_chunk(&server, "m1", b"payload", Duration::ZERO).await;
    let client = client_for(&server);

    let bytes = client.webhook().fetch_bytes("m1").await.unwrap();
    assert_eq!(bytes, b"payload");
}

#[tokio::test]
async fn test_fetch_bytes_without_attachments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/messages/empty", HOOK_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "attachments": [] })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client.webhook().fetch_bytes("empty").await.unwrap_err();
    assert!(matches!(err, DisboxError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_fetch_bytes_missing_message() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client.webhook().fetch_bytes("gone").await.unwrap_err();
    assert!(matches!(err, DisboxError::HttpError(404)));
}

#[tokio::test]
async fn test_download_file_preserves_chunk_order() {
    let server = MockServer::start().await;
    mount_tree(&server, sample_tree()).await;
    mount_chunk(&server, "a1", b"abc", Duration::from_millis(100)).await;
    mount_chunk(&server, "a2", b"def", Duration::ZERO).await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let outcome = client
        .download_file("a.txt", Some("test folder"), Some(&out), false)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Downloaded {
            path: out.join("a.txt"),
            size: 6
        }
    );
    assert_eq!(std::fs::read(out.join("a.txt")).unwrap(), b"abcdef");
}

#[tokio::test]
async fn test_download_existing_without_force_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("a.txt");
    std::fs::write(&target, b"local copy").unwrap();

    let entry = FileEntry {
        id: 1,
        name: "a.txt".to_string(),
        size: 6,
        content: vec!["a1".to_string(), "a2".to_string()],
        created_at: None,
        updated_at: None,
    };
    let outcome = client
        .download_entry(&entry, Some(dir.path()), false)
        .await
        .unwrap();

    assert_eq!(outcome, DownloadOutcome::AlreadyExists { path: target.clone() });
    assert_eq!(std::fs::read(&target).unwrap(), b"local copy");
}

#[tokio::test]
async fn test_download_with_force_refetches() {
    let server = MockServer::start().await;
    mount_chunk(&server, "a1", b"abc", Duration::ZERO).await;
    mount_chunk(&server, "a2", b"def", Duration::ZERO).await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("a.txt");
    std::fs::write(&target, b"stale and longer than the real file").unwrap();

    let entry = FileEntry {
        id: 1,
        name: "a.txt".to_string(),
        size: 6,
        content: vec!["a1".to_string(), "a2".to_string()],
        created_at: None,
        updated_at: None,
    };
    let outcome = client
        .download_entry(&entry, Some(dir.path()), true)
        .await
        .unwrap();

    assert!(outcome.was_downloaded());
    assert_eq!(std::fs::read(&target).unwrap(), b"abcdef");
}

#[tokio::test]
async fn test_download_failure_leaves_no_file_when_resolution_fails() {
    let server = MockServer::start().await;
    mount_tree(&server, sample_tree()).await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();

    let err = client
        .download_file("missing.txt", Some("test folder"), Some(dir.path()), false)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!dir.path().join("missing.txt").exists());
}

#[tokio::test]
async fn test_progress_callback_can_cancel() {
    let server = MockServer::start().await;
    mount_chunk(&server, "a1", b"abc", Duration::ZERO).await;
    mount_chunk(&server, "a2", b"def", Duration::ZERO).await;
    let mut client = client_for(&server);
    client.watch_status(Arc::new(|_: &TransferProgress| false));
    let dir = TempDir::new().unwrap();

    let entry = FileEntry {
        id: 1,
        name: "a.txt".to_string(),
        size: 6,
        content: vec!["a1".to_string(), "a2".to_string()],
        created_at: None,
        updated_at: None,
    };
    let err = client
        .download_entry(&entry, Some(dir.path()), false)
        .await
        .unwrap_err();

    assert!(matches!(err, DisboxError::Cancelled(_)));
}

fn folder_tree() -> Value {
    json!({
        "batch": {
            "id": 10,
            "type": "directory",
            "name": "batch",
            "children": {
                "one.bin": file_json(11, "one.bin", 4, &["o1", "o2"]),
                "sub": {"id": 12, "type": "directory", "name": "sub", "children": {}},
                "two.bin": file_json(13, "two.bin", 4, &["t1", "t2"]),
                "three.bin": file_json(14, "three.bin", 4, &["h1", "h2"])
            }
        }
    })
}

#[tokio::test]
async fn test_download_folder_reassembles_every_file() {
    let server = MockServer::start().await;
    mount_tree(&server, folder_tree()).await;
    // First chunks answer slowest so completion order differs from chunk order.
    mount_chunk(&server, "o1", b"O1", Duration::from_millis(120)).await;
    mount_chunk(&server, "o2", b"O2", Duration::ZERO).await;
    mount_chunk(&server, "t1", b"T1", Duration::from_millis(80)).await;
    mount_chunk(&server, "t2", b"T2", Duration::ZERO).await;
    mount_chunk(&server, "h1", b"H1", Duration::from_millis(40)).await;
    mount_chunk(&server, "h2", b"H2", Duration::ZERO).await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("batch");

    let outcomes = client.download_folder_to("batch", &out, false).await.unwrap();

    let paths: Vec<_> = outcomes.iter().map(|o| o.path().to_path_buf()).collect();
    assert_eq!(
        paths,
        vec![out.join("one.bin"), out.join("two.bin"), out.join("three.bin")]
    );
    assert_eq!(std::fs::read(out.join("one.bin")).unwrap(), b"O1O2");
    assert_eq!(std::fs::read(out.join("two.bin")).unwrap(), b"T1T2");
    assert_eq!(std::fs::read(out.join("three.bin")).unwrap(), b"H1H2");
    assert!(!out.join("sub").exists());
}

#[tokio::test]
async fn test_download_folder_with_concurrency_cap() {
    let server = MockServer::start().await;
    mount_tree(&server, folder_tree()).await;
    let delay = Duration::from_millis(40);
    for (reference, body) in [
        ("o1", "O1"),
        ("o2", "O2"),
        ("t1", "T1"),
        ("t2", "T2"),
        ("h1", "H1"),
        ("h2", "H2"),
    ] {
        mount_chunk(&server, reference, body.as_bytes(), delay).await;
    }
    let config = ClientConfig::new()
        .with_server_url(server.uri())
        .with_task_interval(Duration::ZERO)
        .with_max_concurrent_downloads(1);
    let mut client = DisboxClient::with_config(&webhook_url(&server), config).unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let seen = events.clone();
    client.watch_status(Arc::new(move |p: &TransferProgress| {
        seen.lock().unwrap().push(p.filename.clone());
        true
    }));
    let dir = TempDir::new().unwrap();

    let started = Instant::now();
    let outcomes = client
        .download_folder_to("batch", dir.path(), false)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.was_downloaded()));
    assert_eq!(std::fs::read(dir.path().join("two.bin")).unwrap(), b"T1T2");

    // With one slot, each file's progress events form one uninterrupted run.
    let mut runs: Vec<String> = events.lock().unwrap().clone();
    runs.dedup();
    assert_eq!(runs.len(), 3, "interleaved progress: {:?}", runs);
    let mut distinct = runs.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 3);

    // Six delayed attachment fetches, none overlapping.
    assert!(elapsed >= delay * 6, "finished in {:?}", elapsed);
}

#[tokio::test]
async fn test_download_folder_failure_does_not_stop_siblings() {
    let server = MockServer::start().await;
    mount_tree(&server, folder_tree()).await;
    mount_chunk(&server, "o1", b"O1", Duration::ZERO).await;
    mount_chunk(&server, "o2", b"O2", Duration::ZERO).await;
    // t1 has no mock and answers 404.
    mount_chunk(&server, "t2", b"T2", Duration::ZERO).await;
    mount_chunk(&server, "h1", b"H1", Duration::from_millis(50)).await;
    mount_chunk(&server, "h2", b"H2", Duration::ZERO).await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();

    let err = client
        .download_folder_to("batch", dir.path(), false)
        .await
        .unwrap_err();

    assert!(matches!(err, DisboxError::HttpError(404)));
    assert_eq!(std::fs::read(dir.path().join("one.bin")).unwrap(), b"O1O2");
    assert_eq!(std::fs::read(dir.path().join("three.bin")).unwrap(), b"H1H2");
}

#[tokio::test]
async fn test_download_folder_skips_existing_files() {
    let server = MockServer::start().await;
    mount_tree(&server, folder_tree()).await;
    mount_chunk(&server, "o1", b"O1", Duration::ZERO).await;
    mount_chunk(&server, "o2", b"O2", Duration::ZERO).await;
    mount_chunk(&server, "h1", b"H1", Duration::ZERO).await;
    mount_chunk(&server, "h2", b"H2", Duration::ZERO).await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("two.bin"), b"mine").unwrap();

    let outcomes = client
        .download_folder_to("batch", dir.path(), false)
        .await
        .unwrap();

    assert!(!outcomes[1].was_downloaded());
    assert_eq!(std::fs::read(dir.path().join("two.bin")).unwrap(), b"mine");
}

#[tokio::test]
async fn test_update_file_sends_fields_and_timestamp() {
    let server = MockServer::start().await;
    let tenant = webhook_id(&webhook_url(&server));
    Mock::given(method("POST"))
        .and(path(format!("/files/update/{}/7", tenant)))
        .and(body_partial_json(json!({ "name": "renamed.txt" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    client
        .update_file(7, json!({ "name": "renamed.txt" }))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["updated_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_update_file_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client
        .update_file(7, json!({ "bogus": true }))
        .await
        .unwrap_err();
    assert!(matches!(err, DisboxError::RemoteUpdate(400)));
}

#[tokio::test]
async fn test_rename_file() {
    let server = MockServer::start().await;
    mount_tree(&server, sample_tree()).await;
    let tenant = webhook_id(&webhook_url(&server));
    Mock::given(method("POST"))
        .and(path(format!("/files/update/{}/1", tenant)))
        .and(body_partial_json(json!({ "name": "c.txt" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    client
        .rename_file("a.txt", "c.txt", Some("test folder"))
        .await
        .unwrap();

    let err = client
        .rename_file("a.txt", "b.txt", Some("test folder"))
        .await
        .unwrap_err();
    assert!(matches!(err, DisboxError::AlreadyExists(name) if name == "b.txt"));
}

#[tokio::test]
async fn test_requests_are_counted_per_chunk() {
    let server = MockServer::start().await;
    mount_tree(&server, sample_tree()).await;
    mount_chunk(&server, "r1", b"xyz", Duration::ZERO).await;
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let mut client = client_for(&server);
    client.watch_status(Arc::new(move |p: &TransferProgress| {
        seen.fetch_add(1, Ordering::SeqCst);
        assert_eq!(p.filename, "root.bin");
        true
    }));
    let dir = TempDir::new().unwrap();

    client
        .download_file(4, None, Some(dir.path()), false)
        .await
        .unwrap();

    assert!(calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(std::fs::read(dir.path().join("root.bin")).unwrap(), b"xyz");
    // tree + message + attachment
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_request_timeout_is_transfer_error() {
    let server = MockServer::start().await;
    let tenant = webhook_id(&webhook_url(&server));
    Mock::given(method("GET"))
        .and(path(format!("/files/get/{}", tenant)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "children": sample_tree() }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    let config = ClientConfig::new()
        .with_server_url(server.uri())
        .with_request_timeout(Duration::from_millis(100));
    let client = DisboxClient::with_config(&webhook_url(&server), config).unwrap();

    let err = client.list_files(None).await.unwrap_err();
    assert!(err.is_transfer(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_dropping_folder_download_aborts_tasks() {
    let server = MockServer::start().await;
    mount_tree(&server, folder_tree()).await;
    for reference in ["o1", "t1", "h1"] {
        mount_chunk(&server, reference, b"X1", Duration::from_millis(500)).await;
    }
    for reference in ["o2", "t2", "h2"] {
        mount_chunk(&server, reference, b"X2", Duration::ZERO).await;
    }
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();

    let result = tokio::time::timeout(
        Duration::from_millis(150),
        client.download_folder_to("batch", dir.path(), false),
    )
    .await;
    assert!(result.is_err());

    // Long enough for the slow first chunks to have answered had the tasks survived.
    tokio::time::sleep(Duration::from_millis(800)).await;

    let second_chunks: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.url.path().to_string())
        .filter(|p| p.ends_with("/o2") || p.ends_with("/t2") || p.ends_with("/h2"))
        .collect();
    assert!(second_chunks.is_empty(), "requests after drop: {:?}", second_chunks);
}

#[tokio::test]
async fn test_download_refuses_names_escaping_target_folder() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let absolute = dir.path().join("escaped.txt");
    mount_tree(
        &server,
        json!({
            "abs": file_json(20, &absolute.to_string_lossy(), 3, &["e1"]),
            "dots": file_json(21, "../dots.txt", 3, &["e1"])
        }),
    )
    .await;
    mount_chunk(&server, "e1", b"bad", Duration::ZERO).await;
    let client = client_for(&server);
    let out = dir.path().join("out");

    for id in [20, 21] {
        let err = client
            .download_file(id, None, Some(&out), false)
            .await
            .unwrap_err();
        assert!(err.is_malformed(), "unexpected error: {}", err);
    }

    assert!(!absolute.exists());
    assert!(!dir.path().join("dots.txt").exists());
    let fetched_chunks = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path().contains("/messages/"))
        .count();
    assert_eq!(fetched_chunks, 0);
}

#[tokio::test]
async fn test_file_without_chunk_list_is_not_written() {
    let server = MockServer::start().await;
    mount_tree(
        &server,
        json!({
            "big.bin": {"id": 30, "type": "file", "name": "big.bin", "size": 5000, "content": null},
            "small.bin": file_json(31, "small.bin", 3, &["s1"])
        }),
    )
    .await;
    mount_chunk(&server, "s1", b"abc", Duration::ZERO).await;
    let client = client_for(&server);
    let dir = TempDir::new().unwrap();

    let err = client
        .download_file("big.bin", None, Some(dir.path()), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DisboxError::MalformedResponse(_)));
    assert!(!dir.path().join("big.bin").exists());

    // The readable sibling is still reachable by name and id.
    let outcome = client
        .download_file(31, None, Some(dir.path()), false)
        .await
        .unwrap();
    assert!(outcome.was_downloaded());
}

#[tokio::test]
async fn test_bad_entry_does_not_hide_other_folders() {
    let server = MockServer::start().await;
    let mut tree = sample_tree();
    tree["broken"] = json!({
        "id": 200,
        "type": "directory",
        "name": "broken",
        "children": {
            "link": {"id": 201, "type": "shortcut", "name": "link"}
        }
    });
    mount_tree(&server, tree).await;
    let client = client_for(&server);

    let files = client.list_files(Some("test folder")).await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(client.get_file_info("root.bin", None).await.unwrap().id, 4);

    let err = client.list_files(Some("broken")).await.unwrap_err();
    assert!(err.is_malformed());
}

#[tokio::test]
async fn test_non_json_message_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/messages/html", HOOK_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client.webhook().fetch_bytes("html").await.unwrap_err();
    assert!(err.is_malformed(), "unexpected error: {}", err);
    assert!(!err.is_transfer());
}
