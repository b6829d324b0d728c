//! Edge case tests for mosaic-net
//!
//! File serving, canned transports and scheme dispatch.

use mosaic_net::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn asset_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mosaic-net-{}-{name}", std::process::id()));
    std::fs::create_dir_all(dir.join("assets/page-configs")).unwrap();
    std::fs::write(dir.join("assets/page-configs/home.json"), r#"{"layout":"grid","components":[]}"#).unwrap();
    std::fs::write(dir.join("bundle.js"), "customElements.define('x-a', A);").unwrap();
    dir
}

fn scheme_transport(root: PathBuf) -> SchemeTransport {
    SchemeTransport::new(HttpTransport::new(HttpConfig::default()).unwrap(), FileTransport::new(root))
}

// ============================================================================
// FILE TRANSPORT TESTS
// ============================================================================

#[test]
fn test_file_fetch_existing() {
    let transport = FileTransport::new(asset_dir("existing"));
    let resp = smol::block_on(transport.fetch("/assets/page-configs/home.json")).unwrap();

    assert!(resp.ok());
    assert_eq!(resp.url(), "/assets/page-configs/home.json");
    let value: serde_json::Value = resp.json().unwrap();
    assert_eq!(value["layout"], "grid");
}

#[test]
fn test_file_fetch_missing_is_404() {
    let transport = FileTransport::new(asset_dir("missing"));
    let resp = smol::block_on(transport.fetch("/nope.json")).unwrap();

    assert_eq!(resp.status(), 404);
    assert!(matches!(resp.error_for_status(), Err(NetError::HttpError { status: 404 })));
}

#[test]
fn test_file_fetch_traversal_is_error() {
    let transport = FileTransport::new(asset_dir("traversal"));
    let result = smol::block_on(transport.fetch("/../secret"));
    assert!(matches!(result, Err(NetError::InvalidUrl(_))));
}

// ============================================================================
// MEMORY TRANSPORT TESTS
// ============================================================================

#[test]
fn test_memory_clones_share_state() {
    let transport = MemoryTransport::new();
    let handle = transport.clone();
    transport.insert("/a", "alpha");

    let resp = smol::block_on(handle.fetch("/a")).unwrap();

    assert_eq!(resp.text().unwrap(), "alpha");
    assert_eq!(transport.request_count("/a"), 1);
}

#[test]
fn test_memory_error_response() {
    let transport = MemoryTransport::new();
    transport.respond("/down", Err(NetError::Network("refused".into())));

    let result = smol::block_on(transport.fetch("/down"));
    assert!(matches!(result, Err(NetError::Network(_))));
}

#[test]
fn test_memory_delay() {
    let transport = MemoryTransport::new();
    transport.insert("/slow", "x").delay("/slow", Duration::from_millis(30));

    let started = Instant::now();
    smol::block_on(transport.fetch("/slow")).unwrap();
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_memory_request_log_order() {
    let transport = MemoryTransport::new();
    smol::block_on(async {
        let _ = transport.fetch("/1").await;
        let _ = transport.fetch("/2").await;
        let _ = transport.fetch("/1").await;
    });
    assert_eq!(transport.requests(), vec!["/1", "/2", "/1"]);
}

// ============================================================================
// SCHEME DISPATCH TESTS
// ============================================================================

#[test]
fn test_relative_urls_served_from_assets() {
    let transport = scheme_transport(asset_dir("relative"));
    let resp = smol::block_on(transport.fetch("/bundle.js")).unwrap();
    assert!(resp.text().unwrap().contains("x-a"));
}

#[test]
fn test_file_urls_read_directly() {
    let dir = asset_dir("file-url");
    let url = Url::from_file_path(dir.join("bundle.js")).unwrap();
    let transport = scheme_transport(PathBuf::from("/nonexistent"));

    let resp = smol::block_on(transport.fetch(url.as_str())).unwrap();
    assert!(resp.ok());
}

#[test]
fn test_unsupported_scheme() {
    let transport = scheme_transport(asset_dir("scheme"));
    let result = smol::block_on(transport.fetch("ftp://example.com/a.js"));
    assert!(matches!(result, Err(NetError::InvalidUrl(_))));
}
