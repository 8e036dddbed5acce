//! Remote product catalog.
//!
//! # API
//!
//! One resource: `GET {base_url}/products` returning a JSON array of
//! `{id, title, image_url, price}` records. No query parameters, headers or
//! pagination.
//!
//! [`CatalogSource`] is the seam the catalog screen is written against;
//! [`CatalogClient`] is the HTTP implementation.

mod client;

use async_trait::async_trait;
use go_marketplace_core::Product;
use thiserror::Error;

pub use client::CatalogClient;

/// Errors that can occur when fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body, for diagnostics.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot address the products resource.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Anything that can produce the full product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every product, in the order the service lists them.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
}
