//! Shared helpers for the HTTP-mock integration tests.
#![allow(dead_code)] // each test binary uses a different subset

use std::path::PathBuf;
use std::time::Duration;

use morphbox_client::{Client, ClientConfig};
use morphbox_types::Identity;

/// Client pointed at a mock server, with credentials isolated in a
/// tempdir so tests never touch the real config directory.
pub fn test_client(server: &mockito::ServerGuard) -> (tempfile::TempDir, Client) {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = client_with_credentials(server, dir.path().join("credentials.json"));
    (dir, client)
}

pub fn client_with_credentials(server: &mockito::ServerGuard, path: PathBuf) -> Client {
    let config = ClientConfig {
        base_url: server.url(),
        poll_interval: Duration::from_millis(50),
        request_timeout: Duration::from_secs(5),
        credentials_path: Some(path),
    };
    Client::new(config).expect("client")
}

pub fn identity() -> Identity {
    Identity {
        id: 1,
        email: "user@example.com".into(),
        username: "user".into(),
        role: "user".into(),
    }
}

/// Install a session directly in the store, as if a login had happened.
pub fn sign_in(client: &Client) {
    client
        .session
        .set("test-access".into(), "test-refresh".into(), identity())
        .expect("set session");
}

pub fn job_json(id: &str, status: &str, progress: u8) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "user": 1,
        "user_email": "user@example.com",
        "input_filename": "song.mp3",
        "output_filename": "song.wav",
        "input_format": "mp3",
        "output_format": "wav",
        "status": status,
        "progress": progress,
        "file_size": 2_097_152,
        "error_message": null,
        "tool_used": "ffmpeg",
        "created_at": "2026-03-01T10:00:00Z",
        "started_at": null,
        "completed_at": null
    })
}

pub fn page_json(jobs: &[serde_json::Value]) -> String {
    serde_json::json!({
        "count": jobs.len(),
        "next": null,
        "previous": null,
        "results": jobs,
    })
    .to_string()
}
