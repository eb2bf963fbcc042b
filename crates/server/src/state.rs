//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::DataStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It holds no copy of the
/// document; handlers go through the [`DataStore`] on every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: DataStore,
}

impl AppState {
    /// Create a new application state with a store at `config.data_file`.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let store = DataStore::new(config.data_file.clone());

        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &DataStore {
        &self.inner.store
    }
}
