//! Application session shared across front-end commands.
//!
//! The session owns the cart store and the catalog client for one run of the
//! application. Front-ends receive it explicitly rather than reaching for a
//! global, and the cart lives exactly as long as the session does.

use std::sync::Arc;

use tracing::info;

use crate::cart::CartStore;
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::screen::CatalogScreen;
use crate::storage::{FileStorage, KeyValueStorage};

/// Application state for one session.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone, Debug)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    config: StorefrontConfig,
    cart: CartStore,
    catalog: CatalogClient,
}

impl Session {
    /// Start a session backed by file storage under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted cart cannot be loaded or the catalog
    /// client cannot be built.
    pub async fn start(config: StorefrontConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.data_dir));
        info!(data_dir = %config.data_dir.display(), "Using file storage");
        Self::with_storage(config, storage).await
    }

    /// Start a session on an arbitrary storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted cart cannot be loaded or the catalog
    /// client cannot be built.
    pub async fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let cart = CartStore::load(storage, config.cart_key.clone()).await?;

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                cart,
                catalog,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Mount a catalog screen on this session's catalog and cart.
    pub async fn catalog_screen(&self) -> CatalogScreen {
        CatalogScreen::mount(
            &self.inner.catalog,
            self.inner.cart.clone(),
            self.inner.config.currency,
        )
        .await
    }
}
