//! Integration tests for the Startosphere POS data server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p startosphere-integration-tests
//! ```
//!
//! Each test boots the real router on `127.0.0.1:0` with its own temporary
//! data directory, so tests run in parallel without sharing a data file.
//!
//! # Test Categories
//!
//! - `data_api` - Fetch/Replace behaviour of `/api/data`
//! - `front_end` - Entry page, health check and cross-cutting headers

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use reqwest::Client;
use startosphere_server::config::ServerConfig;
use startosphere_server::routes;
use startosphere_server::state::AppState;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Contents written to the temporary front-end page.
pub const INDEX_HTML: &str = "<!doctype html><title>POS Startosphere</title>";

/// A running server bound to an ephemeral port.
///
/// The server task is aborted and the data directory removed on drop.
pub struct TestServer {
    base_url: String,
    data_file: PathBuf,
    client: Client,
    handle: JoinHandle<()>,
    _dir: TempDir,
}

impl TestServer {
    /// Start a server with no data file.
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Start a server whose data file already holds `contents`.
    pub async fn start_with_data(contents: impl AsRef<[u8]>) -> Self {
        Self::start_with(Some(contents.as_ref())).await
    }

    async fn start_with(contents: Option<&[u8]>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let data_file = dir.path().join("data.json");
        let index_file = dir.path().join("index.html");

        std::fs::write(&index_file, INDEX_HTML).expect("Failed to write index page");
        if let Some(contents) = contents {
            std::fs::write(&data_file, contents).expect("Failed to write data file");
        }

        let mut config = ServerConfig::new(&data_file, &index_file);
        config.host = [127, 0, 0, 1].into();
        config.port = 0;

        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = routes::app(AppState::new(config));
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            data_file,
            client: Client::new(),
            handle,
            _dir: dir,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Shared HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Location of the data file.
    #[must_use]
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Raw contents of the data file, if it exists.
    #[must_use]
    pub fn read_data_file(&self) -> Option<Vec<u8>> {
        std::fs::read(&self.data_file).ok()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
