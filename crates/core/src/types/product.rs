//! Catalog products and cart line-items.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A purchasable product as returned by the catalog API.
///
/// Wire shape: `{"id": "...", "title": "...", "image_url": "...", "price": 9.99}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier, unique across the catalog.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Image reference (usually a URL).
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

/// A product in the cart together with how many units were added.
///
/// The quantity is a [`NonZeroU32`], so a line-item with zero units cannot be
/// constructed or decoded; decrementing the last unit removes the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
    pub quantity: NonZeroU32,
}

impl CartItem {
    /// Create a line-item with a single unit of `product`.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: NonZeroU32::MIN,
        }
    }

    /// The product this line-item refers to, without its quantity.
    #[must_use]
    pub fn product(&self) -> Product {
        Product {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }

    /// Unit price times quantity, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.price.checked_mul(self.quantity.get())
    }
}

/// Sum of every line total in `items`.
///
/// Returns `None` if any line total or the running sum overflows, so a line is
/// never silently left out of the result.
#[must_use]
pub fn subtotal<'a>(items: impl IntoIterator<Item = &'a CartItem>) -> Option<Price> {
    items
        .into_iter()
        .try_fold(Price::ZERO, |acc, item| acc.checked_add(item.line_total()?))
}
