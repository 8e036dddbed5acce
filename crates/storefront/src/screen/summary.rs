//! Floating cart summary shown under the catalog.

use std::fmt;

use go_marketplace_core::{CartItem, CurrencyCode};

/// Shown in place of a subtotal that overflows.
pub const SUBTOTAL_OVERFLOW: &str = "(subtotal too large)";

/// Item count and formatted subtotal for the cart badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    /// Total units across all line-items.
    pub item_count: u64,
    /// Subtotal formatted in the display currency, or [`SUBTOTAL_OVERFLOW`]
    /// when the amount is too large to represent.
    pub subtotal: String,
}

impl CartSummary {
    /// Summarize `items` in `currency`.
    #[must_use]
    pub fn from_items(items: &[CartItem], currency: CurrencyCode) -> Self {
        let item_count = items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum();
        let subtotal = go_marketplace_core::subtotal(items)
            .map_or_else(|| SUBTOTAL_OVERFLOW.to_string(), |total| total.display(currency));

        Self {
            item_count,
            subtotal,
        }
    }
}

impl fmt::Display for CartSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.item_count == 1 { "item" } else { "items" };
        write!(f, "[cart] {} {noun} | {}", self.item_count, self.subtotal)
    }
}
