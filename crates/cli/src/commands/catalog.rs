//! Catalog screen commands.

use go_marketplace_core::ProductId;
use go_marketplace_storefront::Session;
use go_marketplace_storefront::error::Result;
use tracing::info;

/// Mount the catalog screen and print it.
pub async fn show(session: &Session) {
    let screen = session.catalog_screen().await;

    if let Some(e) = screen.load_error() {
        tracing::warn!("Catalog unavailable: {e}");
    }

    #[allow(clippy::print_stdout)]
    {
        println!("{}", screen.render());
    }
}

/// Press the add control of product `id` on the catalog screen.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the product is not in
/// it, the cart rejects the change, or the cart cannot be persisted.
pub async fn add(session: &Session, id: &ProductId) -> Result<()> {
    let screen = session.catalog_screen().await.into_loaded()?;
    let update = screen.press_add(id)?;
    update.write.await?;

    info!(product_id = %id, change = ?update.change, "Cart saved");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", screen.summary());
    }
    Ok(())
}
