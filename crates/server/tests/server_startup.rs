//! Server startup integration tests.
//!
//! Spawns the real binary against a temp database and exercises the HTTP
//! surface from the outside.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::TempDir;
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn write_config(dir: &TempDir, port: u16) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[server]
host = "127.0.0.1"
port = {}

[database]
path = "{}"
"#,
        port,
        dir.path().join("cinefeed.db").display()
    )
    .unwrap();
    path
}

/// Spawn the server and return a handle
fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_cinefeed"))
        .env("CINEFEED_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(client: &Client, port: u16, max_attempts: u32) -> bool {
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/health", port))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
        {
            return true;
        }
        sleep(Duration::from_millis(100)).await;
    }
    false
}

#[tokio::test]
async fn test_server_starts_and_serves() {
    let temp_dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_config(&temp_dir, port);

    let _server = spawn_server(&config_path);
    let client = Client::new();
    assert!(
        wait_for_server(&client, port, 50).await,
        "server did not become ready"
    );

    // manifest is served with both catalogs
    let manifest: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/manifest.json", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(manifest["resources"][0], "catalog");
    assert_eq!(manifest["catalogs"].as_array().unwrap().len(), 2);

    // empty catalog lists cleanly
    let catalog: serde_json::Value = client
        .get(format!(
            "http://127.0.0.1:{}/catalog/movie/cinefeed_films.json",
            port
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(catalog["metas"].as_array().unwrap().is_empty());

    // a sync without feed/API configuration is rejected up front
    let response = client
        .post(format!("http://127.0.0.1:{}/api/sync", port))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // the status snapshot is idle
    let status: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/sync/status", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["running"], false);
    assert_eq!(status["stage"], "idle");
}
