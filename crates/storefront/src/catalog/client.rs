//! HTTP catalog client.

use std::sync::Arc;

use async_trait::async_trait;
use go_marketplace_core::Product;
use tracing::{debug, error, instrument};
use url::Url;

use super::{CatalogError, CatalogSource};
use crate::config::CatalogConfig;

/// Number of body characters kept in logs and errors.
const BODY_PREVIEW_CHARS: usize = 200;

/// Client for the catalog service.
///
/// Cheaply cloneable via `Arc`; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

#[derive(Debug)]
struct CatalogClientInner {
    client: reqwest::Client,
    products_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidUrl`] if the products resource cannot be
    /// resolved against the base URL, or [`CatalogError::Http`] if the HTTP
    /// client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                products_url: products_url(&config.base_url)?,
            }),
        })
    }

    /// The URL products are fetched from.
    #[must_use]
    pub fn products_url(&self) -> &Url {
        &self.inner.products_url
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    #[instrument(skip(self), fields(url = %self.inner.products_url))]
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .inner
            .client
            .get(self.inner.products_url.clone())
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %preview(&body),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let products: Vec<Product> = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %preview(&body), "Failed to parse catalog response");
            CatalogError::Parse(e)
        })?;

        debug!(count = products.len(), "Catalog fetched");
        Ok(products)
    }
}

/// Resolve `products` against `base`, treating the base path as a directory.
fn products_url(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("products")
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
