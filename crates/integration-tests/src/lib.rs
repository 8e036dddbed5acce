//! Integration tests for GoMarketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! The tests need no external services: each one starts a throwaway `axum`
//! catalog on an ephemeral local port and keeps cart state in a fresh
//! directory under the system temp dir.
//!
//! # Test Categories
//!
//! - `catalog_screen` - Catalog fetch over HTTP and the add control
//! - `cart_persistence` - Cart state surviving restarts on file storage

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::get;
use go_marketplace_storefront::config::StorefrontConfig;
use tokio::task::JoinHandle;

/// A catalog service running on a local port.
///
/// The server task is aborted when this value is dropped.
pub struct CatalogServer {
    /// Base URL to configure the client with.
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl CatalogServer {
    /// Serve `body` with `status` at `GET /products`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        let body: String = body.into();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let app = Router::new().route(
            "/products",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let body = body.clone();
                async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind catalog server");
        let addr = listener.local_addr().expect("Catalog server has no address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
            handle,
        }
    }

    /// Serve the sample catalog.
    pub async fn sample() -> Self {
        Self::start(StatusCode::OK, sample_catalog_json()).await
    }

    /// Number of requests served so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for CatalogServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Two products, `p1` Widget at 9.99 and `p2` Gadget at 25.00.
#[must_use]
pub fn sample_catalog_json() -> String {
    serde_json::json!([
        {"id": "p1", "title": "Widget", "image_url": "u", "price": 9.99},
        {"id": "p2", "title": "Gadget", "image_url": "https://img.example/p2.png", "price": 25}
    ])
    .to_string()
}

/// A directory that does not exist yet, unique to the caller.
#[must_use]
pub fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("gomarket-it-{}", uuid::Uuid::new_v4()))
}

/// Storefront configuration pointing at `base_url` and storing under `data_dir`.
///
/// Prices are formatted in USD.
///
/// # Panics
///
/// Panics if `base_url` is not a valid URL.
#[must_use]
pub fn config(base_url: &str, data_dir: &Path) -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| match key {
        "MARKETPLACE_API_URL" => Some(base_url.to_string()),
        "MARKETPLACE_DATA_DIR" => Some(data_dir.display().to_string()),
        "MARKETPLACE_CURRENCY" => Some("USD".to_string()),
        _ => None,
    })
    .expect("Test configuration should be valid")
}
