// Tests for the request log store

use std::thread;
use std::time::Duration;

use scrape_dispatch::logstore::{LogEntry, LogStore};
use scrape_dispatch::providers::ProviderId;
use tempfile::TempDir;

fn create_test_store() -> (TempDir, LogStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = LogStore::open(temp_dir.path().join("logs").join("user_logs.db")).unwrap();
    (temp_dir, store)
}

fn entry(user: &str, url: &str) -> LogEntry {
    LogEntry::new(user, ProviderId::DeepAi, url, "summarize", Duration::from_millis(1500))
}

#[test]
fn test_open_creates_parent_directories() {
    let (_temp_dir, store) = create_test_store();
    assert!(store.path().exists());
}

#[test]
fn test_open_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("user_logs.db");

    let first = LogStore::open(&path).unwrap();
    first.append(&entry("admin", "https://a.example")).unwrap();

    let second = LogStore::open(&path).unwrap();
    assert_eq!(second.recent(10).unwrap().len(), 1);
}

#[test]
fn test_append_round_trips_columns() {
    let (_temp_dir, store) = create_test_store();
    let written = entry("admin", "https://example.com");

    let id = store.append(&written).unwrap();
    assert!(id > 0);

    let rows = store.recent(1).unwrap();
    assert_eq!(rows, vec![written]);
    assert_eq!(rows[0].duration_seconds, 1.5);
}

#[test]
fn test_recent_returns_newest_first() {
    let (_temp_dir, store) = create_test_store();
    for url in ["https://1.example", "https://2.example", "https://3.example"] {
        store.append(&entry("admin", url)).unwrap();
    }

    let urls: Vec<String> = store.recent(2).unwrap().into_iter().map(|e| e.url).collect();
    assert_eq!(urls, vec!["https://3.example", "https://2.example"]);
}

#[test]
fn test_concurrent_appends_all_land() {
    let (_temp_dir, store) = create_test_store();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .append(&entry(&format!("user-{worker}"), &format!("https://{i}.example")))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.recent(1000).unwrap().len(), 80);
}

#[test]
fn test_open_fails_when_parent_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("logs");
    std::fs::write(&blocker, b"not a directory").unwrap();

    assert!(LogStore::open(blocker.join("user_logs.db")).is_err());
}
