//! The cart store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use go_marketplace_core::{CartItem, Price, Product, ProductId};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, instrument, warn};

use super::persist::{self, LastError, PendingWrite, WriteRequest};
use super::{CartChange, CartError, CartUpdate};
use crate::storage::{KeyValueStorage, StorageError};

/// Owner of the cart's line-items.
///
/// Cheaply cloneable via `Arc`; clones share the same cart and write queue.
/// Must be created inside a Tokio runtime, since loading spawns the writer.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    key: String,
    items: watch::Sender<Vec<CartItem>>,
    writer: mpsc::UnboundedSender<WriteRequest>,
    next_seq: AtomicU64,
    last_error: LastError,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("items", &*self.inner.items.borrow())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart persisted under `key`, or start empty if nothing (or only
    /// whitespace) is stored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the read fails, [`CartError::Decode`]
    /// if the stored blob is not a list of cart items, and
    /// [`CartError::DuplicateItem`] if it lists a product twice.
    #[instrument(skip(storage, key), fields(key))]
    pub async fn load(
        storage: Arc<dyn KeyValueStorage>,
        key: impl Into<String>,
    ) -> Result<Self, CartError> {
        let key = key.into();
        tracing::Span::current().record("key", key.as_str());

        let items = match storage.get(&key).await? {
            Some(blob) if !blob.trim().is_empty() => decode(&blob)?,
            _ => Vec::new(),
        };
        info!(items = items.len(), "Cart loaded");

        let last_error = LastError::default();
        let writer = persist::spawn_writer(storage, key.clone(), Arc::clone(&last_error));
        let (items, _) = watch::channel(items);

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                key,
                items,
                writer,
                next_seq: AtomicU64::new(0),
                last_error,
            }),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the current line-items, in the order they were added.
    #[must_use]
    pub fn products(&self) -> Vec<CartItem> {
        self.inner.items.borrow().clone()
    }

    /// Receiver that observes every new version of the cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.inner.items.subscribe()
    }

    /// Whether a line-item for `id` exists.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.inner.items.borrow().iter().any(|item| item.id == *id)
    }

    /// The line-item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<CartItem> {
        self.inner
            .items
            .borrow()
            .iter()
            .find(|item| item.id == *id)
            .cloned()
    }

    /// Units of `id` in the cart; zero when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.quantity.get())
    }

    /// Number of line-items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Whether the cart has no line-items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Total units across all line-items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.inner
            .items
            .borrow()
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of unit price times quantity across all line-items, or `None` if
    /// the sum overflows.
    #[must_use]
    pub fn subtotal(&self) -> Option<Price> {
        go_marketplace_core::subtotal(self.inner.items.borrow().iter())
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// The most recent persistence failure, if any write has failed.
    #[must_use]
    pub fn last_write_error(&self) -> Option<StorageError> {
        self.inner
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`.
    ///
    /// A product that is not yet in the cart is appended with quantity 1.
    /// A product already in the cart is incremented instead, so the cart
    /// never holds two line-items for the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] if the product is present and
    /// already at the maximum quantity, or [`CartError::Encode`] if the new
    /// list cannot be serialized.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&self, product: Product) -> Result<CartUpdate, CartError> {
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.id == product.id) {
                item.quantity = item
                    .quantity
                    .checked_add(1)
                    .ok_or_else(|| CartError::QuantityOverflow(product.id.clone()))?;
                return Ok(CartChange::Incremented);
            }
            items.push(CartItem::new(product));
            Ok(CartChange::Added)
        })
    }

    /// Add one unit of the product already in the cart under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if no line-item matches `id`, and
    /// [`CartError::QuantityOverflow`] if the quantity is already at its maximum.
    /// Neither case changes the cart or touches storage.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn increment(&self, id: &ProductId) -> Result<CartUpdate, CartError> {
        self.mutate(|items| {
            let item = items
                .iter_mut()
                .find(|item| item.id == *id)
                .ok_or_else(|| CartError::NotInCart(id.clone()))?;
            item.quantity = item
                .quantity
                .checked_add(1)
                .ok_or_else(|| CartError::QuantityOverflow(id.clone()))?;
            Ok(CartChange::Incremented)
        })
    }

    /// Remove one unit of the product under `id`, dropping the line-item
    /// entirely when its last unit goes.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if no line-item matches `id`; the cart
    /// and storage are left untouched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn decrement(&self, id: &ProductId) -> Result<CartUpdate, CartError> {
        self.mutate(|items| {
            let position = items
                .iter()
                .position(|item| item.id == *id)
                .ok_or_else(|| CartError::NotInCart(id.clone()))?;
            let item = items
                .get_mut(position)
                .ok_or_else(|| CartError::NotInCart(id.clone()))?;

            if let Some(quantity) = std::num::NonZeroU32::new(item.quantity.get() - 1) {
                item.quantity = quantity;
                Ok(CartChange::Decremented)
            } else {
                items.remove(position);
                Ok(CartChange::Removed)
            }
        })
    }

    /// Remove every line-item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Encode`] if the empty list cannot be serialized.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<CartUpdate, CartError> {
        self.mutate(|items| {
            items.clear();
            Ok(CartChange::Cleared)
        })
    }

    /// Wait until every write queued before this call has been processed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::WriterClosed`] if the writer has stopped.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let (done, rx) = oneshot::channel();
        self.inner
            .writer
            .send(WriteRequest::Flush(done))
            .map_err(|_| StorageError::WriterClosed)?;
        rx.await.map_err(|_| StorageError::WriterClosed)
    }

    /// Apply `op` to a copy of the list, then publish and persist the copy.
    ///
    /// The watch lock is held across publish and enqueue, so the order of
    /// queued writes always matches the order of in-memory versions.
    fn mutate<F>(&self, op: F) -> Result<CartUpdate, CartError>
    where
        F: FnOnce(&mut Vec<CartItem>) -> Result<CartChange, CartError>,
    {
        let mut outcome: Option<Result<CartUpdate, CartError>> = None;

        self.inner.items.send_if_modified(|items| {
            let mut next = items.clone();
            let change = match op(&mut next) {
                Ok(change) => change,
                Err(e) => {
                    outcome = Some(Err(e));
                    return false;
                }
            };
            let blob = match serde_json::to_string(&next) {
                Ok(blob) => blob,
                Err(e) => {
                    outcome = Some(Err(CartError::Encode(e)));
                    return false;
                }
            };

            *items = next;
            let write = self.enqueue(blob);
            outcome = Some(Ok(CartUpdate { change, write }));
            true
        });

        match outcome {
            Some(Ok(update)) => {
                info!(change = ?update.change, items = self.len(), "Cart updated");
                Ok(update)
            }
            Some(Err(e)) => {
                warn!(error = %e, "Cart mutation rejected");
                Err(e)
            }
            // send_if_modified always runs the closure exactly once.
            None => Err(StorageError::WriterClosed.into()),
        }
    }

    fn enqueue(&self, blob: String) -> PendingWrite {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let (done, rx) = oneshot::channel();
        if let Err(mpsc::error::SendError(request)) =
            self.inner.writer.send(WriteRequest::Write { seq, blob, done })
        {
            // Writer is gone; resolve the handle with an error right away.
            if let WriteRequest::Write { done, .. } = request {
                let _ = done.send(Err(StorageError::WriterClosed));
            }
        }
        PendingWrite::new(rx)
    }
}

/// Decode a stored cart, rejecting lists that repeat a product.
fn decode(blob: &str) -> Result<Vec<CartItem>, CartError> {
    let items: Vec<CartItem> = serde_json::from_str(blob).map_err(CartError::Decode)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if !seen.insert(&item.id) {
            return Err(CartError::DuplicateItem(item.id.clone()));
        }
    }
    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::DEFAULT_CART_KEY;
    use crate::storage::MemoryStorage;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://img.example/{id}.png"),
            price: Price::new(Decimal::new(cents, 2)).unwrap(),
        }
    }

    fn widget() -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Widget".to_string(),
            image_url: "u".to_string(),
            price: Price::new(Decimal::new(999, 2)).unwrap(),
        }
    }

    async fn empty_store() -> (CartStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        let store = CartStore::load(Arc::new(storage.clone()), DEFAULT_CART_KEY)
            .await
            .unwrap();
        (store, storage)
    }

    fn quantities(store: &CartStore) -> Vec<(String, u32)> {
        store
            .products()
            .into_iter()
            .map(|item| (item.id.into_inner(), item.quantity.get()))
            .collect()
    }

    /// Storage whose writes always fail.
    struct BrokenStorage;

    #[async_trait]
    impl KeyValueStorage for BrokenStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_missing_key_is_empty() {
        let (store, _) = empty_store().await;
        assert!(store.is_empty());
        assert_eq!(store.key(), DEFAULT_CART_KEY);
    }

    #[tokio::test]
    async fn test_load_blank_blob_is_empty() {
        for blob in ["", "  \n"] {
            let storage = MemoryStorage::with_entry(DEFAULT_CART_KEY, blob);
            let store = CartStore::load(Arc::new(storage), DEFAULT_CART_KEY)
                .await
                .unwrap();
            assert!(store.is_empty());
        }
    }

    #[tokio::test]
    async fn test_load_malformed_blob_fails() {
        let storage = MemoryStorage::with_entry(DEFAULT_CART_KEY, "{not json");
        let err = CartStore::load(Arc::new(storage), DEFAULT_CART_KEY)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Decode(_)));
    }

    #[tokio::test]
    async fn test_load_zero_quantity_fails() {
        let blob = r#"[{"id":"p1","title":"Widget","image_url":"u","price":9.99,"quantity":0}]"#;
        let storage = MemoryStorage::with_entry(DEFAULT_CART_KEY, blob);
        let err = CartStore::load(Arc::new(storage), DEFAULT_CART_KEY)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Decode(_)));
    }

    #[tokio::test]
    async fn test_load_duplicate_fails() {
        let blob = r#"[
            {"id":"p1","title":"Widget","image_url":"u","price":9.99,"quantity":1},
            {"id":"p1","title":"Widget","image_url":"u","price":9.99,"quantity":2}
        ]"#;
        let storage = MemoryStorage::with_entry(DEFAULT_CART_KEY, blob);
        let err = CartStore::load(Arc::new(storage), DEFAULT_CART_KEY)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::DuplicateItem(ref id) if id.as_str() == "p1"));
    }

    #[tokio::test]
    async fn test_widget_scenario() {
        let (store, _) = empty_store().await;
        let id = ProductId::new("p1");

        let update = store.add_to_cart(widget()).unwrap();
        assert_eq!(update.change, CartChange::Added);
        assert_eq!(quantities(&store), vec![("p1".to_string(), 1)]);

        store.increment(&id).unwrap();
        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);

        assert_eq!(store.decrement(&id).unwrap().change, CartChange::Decremented);
        assert_eq!(store.decrement(&id).unwrap().change, CartChange::Removed);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_new_product_appends_with_quantity_one() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("a", 100)).unwrap();
        store.add_to_cart(product("b", 200)).unwrap();

        let items = store.products();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_str(), "a");
        assert_eq!(items[1].id.as_str(), "b");
        assert_eq!(items[1].quantity.get(), 1);
        assert_eq!(items[1].product(), product("b", 200));
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_instead_of_duplicating() {
        let (store, _) = empty_store().await;
        store.add_to_cart(widget()).unwrap();

        let update = store.add_to_cart(widget()).unwrap();
        assert_eq!(update.change, CartChange::Incremented);
        assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_increment_touches_only_target() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("a", 100)).unwrap();
        store.add_to_cart(product("b", 200)).unwrap();
        store.add_to_cart(product("c", 300)).unwrap();

        store.increment(&ProductId::new("b")).unwrap();

        assert_eq!(
            quantities(&store),
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );
    }

    #[tokio::test]
    async fn test_decrement_last_unit_keeps_order_of_rest() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("a", 100)).unwrap();
        store.add_to_cart(product("b", 200)).unwrap();
        store.add_to_cart(product("c", 300)).unwrap();

        store.decrement(&ProductId::new("b")).unwrap();

        assert_eq!(
            quantities(&store),
            vec![("a".to_string(), 1), ("c".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_unknown_id_is_rejected_without_write() {
        let (store, storage) = empty_store().await;
        let id = ProductId::new("ghost");

        assert!(matches!(store.increment(&id), Err(CartError::NotInCart(_))));
        assert!(matches!(store.decrement(&id), Err(CartError::NotInCart(_))));

        store.flush().await.unwrap();
        assert!(storage.is_empty().await);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_increment_overflow_leaves_cart_unchanged() {
        let blob = format!(
            r#"[{{"id":"p1","title":"Widget","image_url":"u","price":9.99,"quantity":{}}}]"#,
            u32::MAX
        );
        let storage = MemoryStorage::with_entry(DEFAULT_CART_KEY, blob);
        let store = CartStore::load(Arc::new(storage), DEFAULT_CART_KEY)
            .await
            .unwrap();
        let id = ProductId::new("p1");

        assert!(matches!(
            store.increment(&id),
            Err(CartError::QuantityOverflow(_))
        ));
        assert_eq!(store.quantity_of(&id), u32::MAX);
    }

    #[tokio::test]
    async fn test_every_mutation_persists_full_list() {
        let (store, storage) = empty_store().await;
        store.add_to_cart(widget()).unwrap();
        store.add_to_cart(product("p2", 500)).unwrap();
        store.increment(&ProductId::new("p1")).unwrap().write.await.unwrap();

        let blob = storage.get(DEFAULT_CART_KEY).await.unwrap().unwrap();
        let stored: Vec<CartItem> = serde_json::from_str(&blob).unwrap();
        assert_eq!(stored, store.products());
    }

    #[tokio::test]
    async fn test_reload_round_trip() {
        let (store, storage) = empty_store().await;
        store.add_to_cart(widget()).unwrap();
        store.add_to_cart(product("p2", 1250)).unwrap();
        store.increment(&ProductId::new("p2")).unwrap();
        store.flush().await.unwrap();
        let before = store.products();
        drop(store);

        let reloaded = CartStore::load(Arc::new(storage), DEFAULT_CART_KEY)
            .await
            .unwrap();
        assert_eq!(reloaded.products(), before);
    }

    #[tokio::test]
    async fn test_rapid_mutations_store_final_state() {
        let (store, storage) = empty_store().await;
        let id = ProductId::new("p1");
        store.add_to_cart(widget()).unwrap();
        for _ in 0..50 {
            let _ = store.increment(&id).unwrap();
        }
        for _ in 0..20 {
            let _ = store.decrement(&id).unwrap();
        }
        store.flush().await.unwrap();

        let blob = storage.get(DEFAULT_CART_KEY).await.unwrap().unwrap();
        let stored: Vec<CartItem> = serde_json::from_str(&blob).unwrap();
        assert_eq!(stored[0].quantity.get(), 31);
        assert_eq!(stored, store.products());
    }

    #[tokio::test]
    async fn test_write_failure_is_observable() {
        let store = CartStore::load(Arc::new(BrokenStorage), DEFAULT_CART_KEY)
            .await
            .unwrap();

        let update = store.add_to_cart(widget()).unwrap();
        // The in-memory cart proceeds optimistically.
        assert_eq!(store.len(), 1);

        let err = update.write.await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(matches!(
            store.last_write_error(),
            Some(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribers_see_each_change() {
        let (store, _) = empty_store().await;
        let mut rx = store.subscribe();

        store.add_to_cart(widget()).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.clear().unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_mutation_does_not_notify() {
        let (store, _) = empty_store().await;
        let rx = store.subscribe();

        let _ = store.increment(&ProductId::new("ghost"));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_totals() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("a", 150)).unwrap();
        store.add_to_cart(product("b", 1000)).unwrap();
        store.increment(&ProductId::new("a")).unwrap();

        assert_eq!(store.total_quantity(), 3);
        assert_eq!(store.subtotal().unwrap().amount(), Decimal::new(1300, 2));
        assert!(store.contains(&ProductId::new("b")));
        assert_eq!(store.quantity_of(&ProductId::new("zzz")), 0);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (store, _) = empty_store().await;
        let other = store.clone();
        store.add_to_cart(widget()).unwrap();
        assert!(other.contains(&ProductId::new("p1")));
    }
}
