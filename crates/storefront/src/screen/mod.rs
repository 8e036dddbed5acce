//! Catalog screen.
//!
//! Lists every product from the catalog with its formatted price and an
//! "add" control. Pressing add increments the product if it is already in
//! the cart and adds it otherwise; membership is derived from the cart on
//! every call, so the screen never caches cart state of its own.

mod summary;

use std::fmt;

use go_marketplace_core::{CurrencyCode, Product, ProductId};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cart::{CartError, CartStore, CartUpdate};
use crate::catalog::{CatalogError, CatalogSource};
use crate::error::add_breadcrumb;

pub use summary::{CartSummary, SUBTOTAL_OVERFLOW};

/// Errors raised by screen actions.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The pressed product is not among the displayed products.
    #[error("Product {0} is not displayed")]
    UnknownProduct(ProductId),

    /// The cart rejected the change.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

/// One rendered catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Unit price formatted in the display currency.
    pub price: String,
    /// Units of this product currently in the cart.
    pub in_cart: u32,
    /// Stable hook for automated tests, `add-to-cart-{id}`.
    pub test_id: String,
}

impl fmt::Display for ProductRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12} {:<32} {:>14}", self.id, self.title, self.price)?;
        if self.in_cart > 0 {
            write!(f, "  x{}", self.in_cart)?;
        }
        write!(f, "  [+] {}", self.test_id)
    }
}

/// The catalog screen's display state.
#[derive(Debug)]
pub struct CatalogScreen {
    products: Vec<Product>,
    cart: CartStore,
    currency: CurrencyCode,
    load_error: Option<CatalogError>,
}

impl CatalogScreen {
    /// Mount the screen: fetch the catalog once and keep it as display state.
    ///
    /// A failed fetch is logged and leaves the screen with no products; the
    /// error stays available through [`load_error`](Self::load_error).
    #[instrument(skip_all)]
    pub async fn mount(
        catalog: &dyn CatalogSource,
        cart: CartStore,
        currency: CurrencyCode,
    ) -> Self {
        let (products, load_error) = match catalog.fetch_products().await {
            Ok(products) => {
                info!(count = products.len(), "Catalog screen mounted");
                (products, None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                (Vec::new(), Some(e))
            }
        };

        Self {
            products,
            cart,
            currency,
            load_error,
        }
    }

    /// Products as returned by the catalog, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Why the catalog could not be loaded, if it could not.
    #[must_use]
    pub const fn load_error(&self) -> Option<&CatalogError> {
        self.load_error.as_ref()
    }

    /// Keep the screen only if the catalog loaded.
    ///
    /// # Errors
    ///
    /// Returns the fetch error recorded at mount time.
    pub fn into_loaded(self) -> Result<Self, CatalogError> {
        match self.load_error {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }

    /// The cart this screen adds to.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Handle a press on the add control of product `id`.
    ///
    /// Increments the product when the cart already holds it, adds it otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::UnknownProduct`] if `id` is not displayed, and
    /// [`ScreenError::Cart`] if the cart rejects the change.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn press_add(&self, id: &ProductId) -> Result<CartUpdate, ScreenError> {
        let product = self
            .products
            .iter()
            .find(|product| product.id == *id)
            .ok_or_else(|| ScreenError::UnknownProduct(id.clone()))?;

        let in_cart = self.cart.products().iter().any(|item| item.id == *id);
        let update = if in_cart {
            self.cart.increment(id)?
        } else {
            self.cart.add_to_cart(product.clone())?
        };

        add_breadcrumb(
            "cart",
            "Pressed add to cart",
            Some(&[("product_id", id.as_str())]),
        );
        Ok(update)
    }

    /// Display rows with in-cart state derived from the current cart.
    #[must_use]
    pub fn rows(&self) -> Vec<ProductRow> {
        let cart = self.cart.products();

        self.products
            .iter()
            .map(|product| ProductRow {
                id: product.id.clone(),
                title: product.title.clone(),
                image_url: product.image_url.clone(),
                price: product.price.display(self.currency),
                in_cart: cart
                    .iter()
                    .find(|item| item.id == product.id)
                    .map_or(0, |item| item.quantity.get()),
                test_id: format!("add-to-cart-{}", product.id),
            })
            .collect()
    }

    /// Summary of the cart for the floating cart badge.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_items(&self.cart.products(), self.currency)
    }

    /// Draw the screen as plain text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.rows().iter().map(ToString::to_string).collect();
        if lines.is_empty() {
            lines.push("(no products)".to_string());
        }
        lines.push(String::new());
        lines.push(self.summary().to_string());
        lines.join("\n")
    }
}
