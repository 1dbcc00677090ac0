use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use finlib::server;
use finlib_core::catalog::Catalog;
use tempfile::TempDir;
use tokio::net::TcpListener;

fn finlib_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_finlib"))
}

fn write_config(base_url: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("finlib.toml");
    let content = format!(
        r#"[api]
base_url = "{}"
timeout_secs = 2
max_retries = 0
page_size = 3

[logging]
level = "warn"
"#,
        base_url
    );
    fs::write(&config_path, content).unwrap();
    (tmp, config_path)
}

fn run_finlib(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = finlib_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run finlib binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

async fn start_service() -> String {
    let catalog = Catalog::from_json(include_str!("../data/catalog.json")).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, Arc::new(catalog)));
    format!("http://{}", addr)
}

#[test]
fn test_link_canonicalizes_without_config() {
    let (stdout, stderr, success) = run_finlib(
        Path::new("/nonexistent/finlib.toml"),
        &["link", "https://lib.example/?page=2&query=보험&utm=x"],
    );
    assert!(success, "link failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("link: ?query=%EB%B3%B4%ED%97%98&page=2"));
    assert!(stdout.contains("state: query=보험 category=all featured=any page=2"));
}

#[test]
fn test_link_corrects_tampered_page() {
    let (stdout, _, success) = run_finlib(Path::new("/nonexistent/finlib.toml"), &["link", "page=-3"]);
    assert!(success);
    assert!(stdout.contains("link: (none)"));
    assert!(stdout.contains("page=1"));
}

#[test]
fn test_missing_config_errors() {
    let (_, stderr, success) = run_finlib(Path::new("/nonexistent/finlib.toml"), &["categories"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_invalid_page_size_errors() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("finlib.toml");
    fs::write(&config_path, "[api]\npage_size = 0\n").unwrap();

    let (_, stderr, success) = run_finlib(&config_path, &["categories"]);
    assert!(!success);
    assert!(stderr.contains("page_size"));
}

#[test]
fn test_list_unreachable_service_fails() {
    let (_tmp, config_path) = write_config("http://127.0.0.1:9");
    let (stdout, _, success) = run_finlib(&config_path, &["list"]);
    assert!(!success);
    assert!(stdout.contains("Error: failed to load documents"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_against_service() {
    let base = start_service().await;
    let (_tmp, config_path) = write_config(&base);

    let (stdout, stderr, success) = tokio::task::spawn_blocking(move || {
        run_finlib(&config_path, &["list", "--query", "보험", "--page", "1"])
    })
    .await
    .unwrap();
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("link: ?query=%EB%B3%B4%ED%97%98"));
    assert!(stdout.contains("3 documents"));
    assert!(stdout.contains("실손의료보험 제도 개선 방안"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_no_results() {
    let base = start_service().await;
    let (_tmp, config_path) = write_config(&base);

    let (stdout, stderr, success) = tokio::task::spawn_blocking(move || {
        run_finlib(&config_path, &["list", "--query", "금융정책"])
    })
    .await
    .unwrap();
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("No results."));
    assert!(!stdout.contains("Error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_pagination_controls() {
    let base = start_service().await;
    let (_tmp, config_path) = write_config(&base);

    let (stdout, _, success) = tokio::task::spawn_blocking(move || {
        run_finlib(&config_path, &["list", "--link", "page=2"])
    })
    .await
    .unwrap();
    assert!(success);
    assert!(stdout.contains("link: ?page=2"));
    assert!(stdout.contains("1 [2] 3"));
    assert!(stdout.contains("(page 2 of 3)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_prints_detail() {
    let base = start_service().await;
    let (_tmp, config_path) = write_config(&base);

    let (stdout, stderr, success) =
        tokio::task::spawn_blocking(move || run_finlib(&config_path, &["get", "6"]))
            .await
            .unwrap();
    assert!(success, "get failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("title:        공매도 제도 개선과 시장 영향"));
    assert!(stdout.contains("views:        55"));
    assert!(stdout.contains("/pdfs/short_selling_reform.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_missing_document() {
    let base = start_service().await;
    let (_tmp, config_path) = write_config(&base);

    let (_, stderr, success) =
        tokio::task::spawn_blocking(move || run_finlib(&config_path, &["get", "404"]))
            .await
            .unwrap();
    assert!(!success);
    assert!(stderr.contains("404"));
}
