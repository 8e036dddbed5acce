//! Cart commands.

use go_marketplace_core::ProductId;
use go_marketplace_storefront::Session;
use go_marketplace_storefront::cart::CartUpdate;
use go_marketplace_storefront::error::Result;
use go_marketplace_storefront::screen::CartSummary;
use tracing::info;

/// Print every line-item followed by the cart summary.
pub fn show(session: &Session) {
    let currency = session.config().currency;
    let items = session.cart().products();

    let mut lines: Vec<String> = items
        .iter()
        .map(|item| {
            let line_total = item
                .line_total()
                .map_or_else(|| "-".to_string(), |total| total.display(currency));
            format!(
                "{:<12} {:<32} {:>4} x {:>14} = {:>14}",
                item.id,
                item.title,
                item.quantity,
                item.price.display(currency),
                line_total
            )
        })
        .collect();
    if lines.is_empty() {
        lines.push("(cart is empty)".to_string());
    }

    #[allow(clippy::print_stdout)]
    {
        println!("{}", lines.join("\n"));
        println!();
        println!("{}", CartSummary::from_items(&items, currency));
    }
}

/// Add one unit of a product already in the cart.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the cart cannot be persisted.
pub async fn increment(session: &Session, id: &ProductId) -> Result<()> {
    let update = session.cart().increment(id)?;
    saved(session, update).await
}

/// Remove one unit of a product in the cart.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the cart cannot be persisted.
pub async fn decrement(session: &Session, id: &ProductId) -> Result<()> {
    let update = session.cart().decrement(id)?;
    saved(session, update).await
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be persisted.
pub async fn clear(session: &Session) -> Result<()> {
    let update = session.cart().clear()?;
    saved(session, update).await
}

/// Wait for the write behind `update`, then print the new summary.
async fn saved(session: &Session, update: CartUpdate) -> Result<()> {
    update.write.await?;
    info!(change = ?update.change, "Cart saved");

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{}",
            CartSummary::from_items(&session.cart().products(), session.config().currency)
        );
    }
    Ok(())
}
