// crates/client/src/catalog.rs
//! Fetches and caches the server's conversion matrix.

use std::sync::{Arc, RwLock};

use morphbox_types::FormatCatalog;

use crate::error::Result;
use crate::transport::Transport;

/// Caching client for the format catalog.
///
/// The catalog is immutable once fetched: the first successful round trip
/// is cached for the client's lifetime, `refresh()` refetches on demand.
/// A failed fetch leaves the cache untouched (empty stays empty, never
/// partially populated) so callers can show an explicit failure state.
pub struct CatalogClient {
    transport: Arc<Transport>,
    cached: RwLock<Option<FormatCatalog>>,
}

impl CatalogClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            cached: RwLock::new(None),
        }
    }

    /// The catalog, from cache or one round trip.
    pub async fn fetch(&self) -> Result<FormatCatalog> {
        if let Some(catalog) = self.cached() {
            return Ok(catalog);
        }
        self.refresh().await
    }

    /// Force a refetch, replacing the cache on success only.
    pub async fn refresh(&self) -> Result<FormatCatalog> {
        let catalog: FormatCatalog = self
            .transport
            .get_json("/conversions/formats/", &[])
            .await?;
        match self.cached.write() {
            Ok(mut guard) => *guard = Some(catalog.clone()),
            Err(e) => tracing::error!("RwLock poisoned writing catalog cache: {e}"),
        }
        Ok(catalog)
    }

    /// Cached catalog without touching the network.
    pub fn cached(&self) -> Option<FormatCatalog> {
        match self.cached.read() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading catalog cache: {e}");
                None
            }
        }
    }
}
