use std::sync::Arc;

use cursus_db::store::DocumentStore;

use crate::completion::ResourceExtractor;
use crate::config::ServerConfig;
use crate::inflight::InFlightSet;
use crate::storage::FileStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Catalog and identity documents.
    pub store: Arc<dyn DocumentStore>,
    /// Uploaded resource files.
    pub files: Arc<dyn FileStorage>,
    pub config: Arc<ServerConfig>,
    /// Bulk-import extractor; `None` when no completion API is configured.
    pub extractor: Option<Arc<dyn ResourceExtractor>>,
    /// Users whose admin marker is currently being toggled.
    pub admin_toggles: InFlightSet,
}

impl AppState {
    /// The store as a trait object, for repository calls.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}
