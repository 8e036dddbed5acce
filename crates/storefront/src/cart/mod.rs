//! Shopping cart state.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the authoritative list of line-items, in insertion order
//! - Every mutation replaces the list wholesale and notifies subscribers
//!   (`tokio::sync::watch`) before any I/O happens
//! - The new list is then handed to a single background writer which mirrors
//!   it to [`KeyValueStorage`](crate::storage::KeyValueStorage) under one key
//! - Writes are applied in the order mutations were issued, so once the queue
//!   drains the stored blob equals the in-memory list
//!
//! # Example
//!
//! ```rust,ignore
//! use go_marketplace_storefront::cart::CartStore;
//!
//! let cart = CartStore::load(storage, DEFAULT_CART_KEY).await?;
//!
//! let update = cart.add_to_cart(product)?;
//! update.write.await?; // optional: wait for the blob to hit storage
//!
//! cart.increment(&product_id)?;
//! cart.decrement(&product_id)?;
//! ```

mod persist;
mod store;

use go_marketplace_core::ProductId;
use thiserror::Error;

use crate::storage::StorageError;

pub use persist::PendingWrite;
pub use store::CartStore;

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "@GoMarketPlace:products";

/// Errors that can occur when loading or mutating the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The persisted blob is not a valid cart.
    #[error("Stored cart could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    /// The cart could not be serialized for storage.
    #[error("Cart could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    /// The persisted blob lists the same product twice.
    #[error("Stored cart contains product {0} more than once")]
    DuplicateItem(ProductId),

    /// Increment or decrement targeted a product that is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Incrementing would exceed the maximum representable quantity.
    #[error("Quantity for product {0} cannot be increased further")]
    QuantityOverflow(ProductId),

    /// Reading from storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What a successful mutation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line-item with quantity 1 was appended.
    Added,
    /// An existing line-item's quantity went up by one.
    Incremented,
    /// An existing line-item's quantity went down by one.
    Decremented,
    /// The line-item's last unit was removed, and the item with it.
    Removed,
    /// Every line-item was removed.
    Cleared,
}

/// Result of a successful mutation.
///
/// The in-memory cart already reflects [`change`](Self::change). The
/// [`write`](Self::write) handle resolves once the resulting list has been
/// stored; dropping it leaves the write running in the background.
#[derive(Debug)]
pub struct CartUpdate {
    /// What happened.
    pub change: CartChange,
    /// Completion of the storage write for this mutation.
    pub write: PendingWrite,
}
