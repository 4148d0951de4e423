//! # Catalog Cache
//!
//! Holds the current catalog snapshot and revalidates it from the
//! provider once the revalidation interval elapses. A failed refetch
//! keeps serving the previous snapshot instead of surfacing the error
//! to shoppers; the failure is only an error when no snapshot exists
//! yet.

use shop_core::{BoxedPaymentProvider, Catalog, ShopResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared, revalidating catalog snapshot
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<RwLock<Option<Arc<Catalog>>>>,
}

impl CatalogCache {
    /// Create an empty cache; the first read triggers a fetch
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Current catalog, refetched when the snapshot has gone stale
    pub async fn catalog(&self, provider: &BoxedPaymentProvider) -> ShopResult<Arc<Catalog>> {
        // Fast path: fresh snapshot under the read lock
        {
            let guard = self.inner.read().await;
            if let Some(catalog) = guard.as_ref() {
                if !catalog.is_stale() {
                    return Ok(Arc::clone(catalog));
                }
            }
        }

        self.revalidate(provider).await
    }

    /// Refetch from the provider, holding the write lock so concurrent
    /// requests wait for one fetch instead of issuing their own
    pub async fn revalidate(&self, provider: &BoxedPaymentProvider) -> ShopResult<Arc<Catalog>> {
        let mut guard = self.inner.write().await;

        // Another task may have revalidated while we waited for the lock
        if let Some(catalog) = guard.as_ref() {
            if !catalog.is_stale() {
                return Ok(Arc::clone(catalog));
            }
        }

        match provider.list_products().await {
            Ok(products) => {
                let catalog = Arc::new(Catalog::new(products));
                info!("Catalog revalidated: {} products", catalog.len());
                *guard = Some(Arc::clone(&catalog));
                Ok(catalog)
            }
            Err(e) => match guard.as_ref() {
                Some(stale) => {
                    warn!("Catalog refetch failed, serving stale snapshot: {}", e);
                    Ok(Arc::clone(stale))
                }
                None => Err(e),
            },
        }
    }

    /// Seed the cache with a snapshot (tests)
    #[cfg(test)]
    pub(crate) async fn prime(&self, catalog: Catalog) {
        *self.inner.write().await = Some(Arc::new(catalog));
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}
